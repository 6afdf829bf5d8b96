use serde::{Deserialize, Serialize};

/// A table-like record in the diagram.
///
/// The layout fields (`x` through `second_importance`) carry no meaning until
/// [`LayoutEngine::apply`](super::LayoutEngine::apply) has run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub linked_entities: Vec<String>,

    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default)]
    pub column: usize,
    #[serde(default)]
    pub dcolumns: Vec<usize>,
    #[serde(default)]
    pub importance: u32,
    #[serde(default)]
    pub second_importance: u32,
}

impl Entity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_links<I, S>(mut self, links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.linked_entities = links.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_linked_to(&self, name: &str) -> bool {
        self.linked_entities.iter().any(|l| l == name)
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether both boxes claim at least one common column band.
    pub fn shares_band(&self, other: &Entity) -> bool {
        self.dcolumns.iter().any(|c| other.dcolumns.contains(c))
    }

    /// Half-open vertical span intersection.
    pub fn overlaps_vertically(&self, other: &Entity) -> bool {
        self.y < other.bottom() && self.bottom() > other.y
    }
}

/// Drawing surface the layout targets, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
}

impl Canvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutOptions {
    /// Restrict the diagram to this entity and its two-hop neighborhood.
    #[serde(default)]
    pub focus_entity_name: Option<String>,
    /// Upper bound on rendered entities; 0 keeps everything.
    #[serde(default)]
    pub max_entities: usize,
    #[serde(default)]
    pub truncate: bool,
    #[serde(default)]
    pub discover_linked_entities: bool,
}

impl LayoutOptions {
    pub fn focused(name: impl Into<String>) -> Self {
        Self {
            focus_entity_name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn limited(max_entities: usize) -> Self {
        Self {
            max_entities,
            truncate: true,
            ..Self::default()
        }
    }

    pub(crate) fn cap(&self) -> Option<usize> {
        (self.truncate && self.max_entities > 0).then_some(self.max_entities)
    }
}
