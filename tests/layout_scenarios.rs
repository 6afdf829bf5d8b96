//! End-to-end runs: entity JSON in, laid-out entities and SVG out.

use erd_layout::config::ErdConfig;
use erd_layout::erd::{
    Canvas, Entity, LayoutEngine, LayoutOptions, SeededRandom, parse_entities, render_erd_document,
};
use erd_layout::fonts::MonospaceMeasure;

const ORDER_SCHEMA: &str = r#"[
    {"id": "1", "name": "Order", "columns": ["id", "customer_id", "placed_at"]},
    {"id": "2", "name": "Customer", "description": "People who buy things", "columns": ["id", "name"]},
    {"id": "3", "name": "OrderItem", "columns": ["order_id", "product_id", "quantity"]}
]"#;

fn layout(entities: Vec<Entity>, canvas: Canvas, options: &LayoutOptions, seed: u64) -> Vec<Entity> {
    let mut measure = MonospaceMeasure::default();
    let mut rng = SeededRandom::new(seed);
    let mut engine = LayoutEngine::new(&mut measure, &mut rng, 14.0);
    engine.apply(entities, canvas, options).unwrap()
}

fn find<'a>(entities: &'a [Entity], name: &str) -> &'a Entity {
    entities.iter().find(|e| e.name == name).unwrap()
}

fn linked(entities: &[Entity], a: &str, b: &str) -> bool {
    find(entities, a).is_linked_to(b) || find(entities, b).is_linked_to(a)
}

fn assert_no_overlap(entities: &[Entity]) {
    for (i, a) in entities.iter().enumerate() {
        for b in &entities[i + 1..] {
            assert!(
                !(a.shares_band(b) && a.overlaps_vertically(b)),
                "{} overlaps {}",
                a.name,
                b.name
            );
        }
    }
}

#[test]
fn order_schema_discovers_links_and_places_every_entity() {
    let entities = parse_entities(ORDER_SCHEMA).unwrap();
    let options = LayoutOptions {
        discover_linked_entities: true,
        ..LayoutOptions::default()
    };
    let result = layout(entities, Canvas::new(1000.0, 800.0), &options, 7);

    assert_eq!(result.len(), 3);
    assert!(linked(&result, "Order", "Customer"));
    assert!(linked(&result, "OrderItem", "Order"));
    assert!(!linked(&result, "Customer", "OrderItem"));
    assert_no_overlap(&result);

    for entity in &result {
        assert!(entity.width > 0.0 && entity.height > 0.0);
        assert!(!entity.dcolumns.is_empty());
        assert!(entity.dcolumns.iter().all(|&c| c < 5));
        assert!(entity.y >= 0.0 && entity.bottom() <= 800.0);
    }

    // Order is linked to both others, so it ranks first.
    assert_eq!(result[0].name, "Order");
    assert_eq!(find(&result, "Customer").description.as_deref(), Some("People who buy things"));
}

#[test]
fn order_schema_renders_to_svg() {
    let entities = parse_entities(ORDER_SCHEMA).unwrap();
    let options = LayoutOptions {
        discover_linked_entities: true,
        ..LayoutOptions::default()
    };
    let canvas = Canvas::new(1000.0, 800.0);
    let result = layout(entities, canvas, &options, 11);

    let config = ErdConfig::default();
    let svg = render_erd_document(&result, canvas, &config.diagram_style()).unwrap();
    assert_eq!(svg.matches(r#"class="entity""#).count(), 3);
    assert_eq!(svg.matches(r#"class="link""#).count(), 2);
    assert!(svg.contains(">OrderItem</text>"));
    assert!(svg.contains(">product_id</text>"));
}

#[test]
fn focus_on_chain_end_keeps_two_hops() {
    let entities = vec![
        Entity::new("a", "A").with_links(["B"]),
        Entity::new("b", "B").with_links(["C"]),
        Entity::new("c", "C").with_links(["D"]),
        Entity::new("d", "D").with_links(["E"]),
        Entity::new("e", "E"),
    ];
    let result = layout(
        entities,
        Canvas::new(1200.0, 800.0),
        &LayoutOptions::focused("A"),
        3,
    );

    let mut names: Vec<&str> = result.iter().map(|e| e.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["A", "B", "C"]);
}

#[test]
fn same_seed_reproduces_layout() {
    let entities = parse_entities(ORDER_SCHEMA).unwrap();
    let options = LayoutOptions {
        discover_linked_entities: true,
        ..LayoutOptions::default()
    };
    let canvas = Canvas::new(900.0, 600.0);
    let first = layout(entities.clone(), canvas, &options, 99);
    let second = layout(entities, canvas, &options, 99);
    assert_eq!(first, second);
}

#[test]
fn laid_out_entities_serialize_in_camel_case() {
    let entities = parse_entities(ORDER_SCHEMA).unwrap();
    let result = layout(
        entities,
        Canvas::new(1000.0, 800.0),
        &LayoutOptions::default(),
        5,
    );
    let json = serde_json::to_string(&result).unwrap();
    assert!(json.contains("\"linkedEntities\""));
    assert!(json.contains("\"secondImportance\""));
    assert!(json.contains("\"dcolumns\""));

    let reparsed = parse_entities(&json).unwrap();
    assert_eq!(reparsed, result);
}

#[test]
fn config_limits_entity_count() {
    let config = ErdConfig::from_toml("max_entities = 2\ncanvas_width = 1000\n").unwrap();
    let entities = parse_entities(ORDER_SCHEMA).unwrap();
    let result = layout(entities, config.canvas(), &config.layout_options(), 1);
    assert_eq!(result.len(), 2);
    assert_eq!(result[0].name, "Order");
}
