use std::collections::HashSet;

use tracing::debug;

use super::naming::{same_concept, similarity};
use super::types::Entity;

/// Names closer than this (normalized edit distance) count as related.
pub const RELATED_THRESHOLD: f32 = 0.5;

/// Insertion-ordered set of link names.
#[derive(Default)]
struct LinkSet {
    seen: HashSet<String>,
    ordered: Vec<String>,
}

impl LinkSet {
    fn from_existing(links: &[String]) -> Self {
        let mut set = Self::default();
        for link in links {
            set.insert(link);
        }
        set
    }

    fn insert(&mut self, name: &str) -> bool {
        if self.seen.insert(name.to_string()) {
            self.ordered.push(name.to_string());
            true
        } else {
            false
        }
    }
}

/// Whether `entity` should link to `other` on name or column evidence.
fn infer_link(entity: &Entity, other: &Entity) -> bool {
    // A shorter, similar name reads as a prefix of the longer one ("order" vs "order_item").
    if entity.name.chars().count() < other.name.chars().count()
        && similarity(&entity.name, &other.name) < RELATED_THRESHOLD
    {
        return true;
    }

    other.columns.iter().any(|column| {
        same_concept(&entity.name, column) || similarity(&entity.name, column) < RELATED_THRESHOLD
    })
}

/// Add inferred links to every entity's `linked_entities`, keeping the links
/// already present. Never adds a self link and never removes one.
pub fn discover_linked_entities(entities: &mut [Entity]) {
    let mut link_sets: Vec<LinkSet> = entities
        .iter()
        .map(|e| LinkSet::from_existing(&e.linked_entities))
        .collect();

    let mut inferred = 0usize;
    for (i, entity) in entities.iter().enumerate() {
        for (j, other) in entities.iter().enumerate() {
            if i == j {
                continue;
            }
            if infer_link(entity, other) && link_sets[i].insert(&other.name) {
                inferred += 1;
            }
        }
    }

    for (entity, links) in entities.iter_mut().zip(link_sets) {
        entity.linked_entities = links.ordered;
    }

    debug!(entities = entities.len(), inferred, "discovered linked entities");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linked(entities: &[Entity], a: &str, b: &str) -> bool {
        let find = |n: &str| entities.iter().find(|e| e.name == n).unwrap();
        find(a).is_linked_to(b) || find(b).is_linked_to(a)
    }

    #[test]
    fn test_foreign_key_column_links_entities() {
        let mut entities = vec![
            Entity::new("1", "Customer").with_columns(["id", "name"]),
            Entity::new("2", "Invoice").with_columns(["id", "customer_id", "total"]),
        ];
        discover_linked_entities(&mut entities);
        assert_eq!(entities[0].linked_entities, vec!["Invoice"]);
        assert!(entities[1].linked_entities.is_empty());
    }

    #[test]
    fn test_plural_column_name_links_entities() {
        let mut entities = vec![
            Entity::new("1", "Tag").with_columns(["id"]),
            Entity::new("2", "Article").with_columns(["id", "tags"]),
        ];
        discover_linked_entities(&mut entities);
        assert!(entities[0].is_linked_to("Article"));
    }

    #[test]
    fn test_shorter_similar_name_links_to_longer() {
        let mut entities = vec![Entity::new("1", "Order"), Entity::new("2", "OrderLine")];
        discover_linked_entities(&mut entities);
        assert_eq!(entities[0].linked_entities, vec!["OrderLine"]);
        assert!(entities[1].linked_entities.is_empty());
    }

    #[test]
    fn test_threshold_is_strict() {
        // "ab" vs "abcd": distance 2 over length 4 is exactly 0.5.
        let mut entities = vec![Entity::new("1", "ab"), Entity::new("2", "abcd")];
        discover_linked_entities(&mut entities);
        assert!(entities[0].linked_entities.is_empty());
        assert!(entities[1].linked_entities.is_empty());
    }

    #[test]
    fn test_existing_links_are_kept_and_not_duplicated() {
        let mut entities = vec![
            Entity::new("1", "Customer").with_links(["Region", "Invoice", "Region"]),
            Entity::new("2", "Invoice").with_columns(["customer_id"]),
        ];
        discover_linked_entities(&mut entities);
        assert_eq!(entities[0].linked_entities, vec!["Region", "Invoice"]);
    }

    #[test]
    fn test_unrelated_entities_stay_unlinked() {
        let mut entities = vec![
            Entity::new("1", "Warehouse").with_columns(["id", "location"]),
            Entity::new("2", "Employee").with_columns(["id", "salary"]),
        ];
        discover_linked_entities(&mut entities);
        assert!(entities.iter().all(|e| e.linked_entities.is_empty()));
    }

    #[test]
    fn test_order_scenario() {
        let mut entities = vec![
            Entity::new("1", "Order").with_columns(["id", "customer_id"]),
            Entity::new("2", "Customer").with_columns(["id", "name"]),
            Entity::new("3", "OrderItem").with_columns(["order_id", "product_id"]),
        ];
        discover_linked_entities(&mut entities);
        assert!(linked(&entities, "Order", "Customer"));
        assert!(linked(&entities, "OrderItem", "Order"));
        assert!(!linked(&entities, "Customer", "OrderItem"));
    }

    #[test]
    fn test_discovery_is_idempotent_and_has_no_self_links() {
        let mut entities = vec![
            Entity::new("1", "Order").with_columns(["id", "customer_id"]),
            Entity::new("2", "Customer").with_columns(["id", "order"]),
            Entity::new("3", "OrderItem").with_columns(["order_id", "product_id"]),
            Entity::new("4", "Product").with_columns(["id", "sku"]),
        ];
        discover_linked_entities(&mut entities);
        let first = entities.clone();
        discover_linked_entities(&mut entities);

        for (before, after) in first.iter().zip(&entities) {
            assert_eq!(before.linked_entities, after.linked_entities);
            assert!(!after.is_linked_to(&after.name));
        }
    }

    #[test]
    fn test_entities_without_columns_only_link_by_name() {
        let mut entities = vec![Entity::new("1", "Item"), Entity::new("2", "Items")];
        discover_linked_entities(&mut entities);
        assert_eq!(entities[0].linked_entities, vec!["Items"]);
        assert!(entities[1].linked_entities.is_empty());
    }
}
