//! Entity-relationship diagrams: link discovery, column-band layout and SVG output.

mod discover;
mod error;
mod layout;
mod naming;
mod random;
mod render;
mod types;

pub use discover::{RELATED_THRESHOLD, discover_linked_entities};
pub use error::{ErdError, Result, parse_entities, validate_canvas, validate_entities};
pub use layout::{
    COLUMN_FONT_SCALE, FOCUS_HOPS, LayoutEngine, MAX_VISIBLE_COLUMNS, OVERFLOW_MARKER,
    column_labels, compute_importance, neighborhood, rank_entities,
};
pub use naming::{levenshtein_distance, pluralize, same_concept, similarity, singularize};
pub use random::{RandomSource, SeededRandom, SequenceRandom};
pub use render::{DiagramStyle, render_erd, render_erd_document};
pub use types::{Canvas, Entity, LayoutOptions};
