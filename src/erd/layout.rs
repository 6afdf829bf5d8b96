use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, trace, warn};

use crate::fonts::{LINE_HEIGHT_FACTOR, TextMeasure};

use super::discover::discover_linked_entities;
use super::error::{Result, validate_canvas, validate_entities};
use super::random::RandomSource;
use super::types::{Canvas, Entity, LayoutOptions};

/// Column lines shown in a box before the overflow marker.
pub const MAX_VISIBLE_COLUMNS: usize = 8;
pub const OVERFLOW_MARKER: &str = "...";
/// Neighborhood radius kept around a focus entity.
pub const FOCUS_HOPS: usize = 2;

/// Ratio of column label size to title size.
pub const COLUMN_FONT_SCALE: f32 = 0.85;

/// Labels drawn under the title: the first `max_visible` columns, then the
/// overflow marker if any were cut.
pub fn column_labels(entity: &Entity, max_visible: usize) -> Vec<&str> {
    let mut labels: Vec<&str> = entity
        .columns
        .iter()
        .take(max_visible)
        .map(String::as_str)
        .collect();
    if entity.columns.len() > max_visible {
        labels.push(OVERFLOW_MARKER);
    }
    labels
}

fn name_index(entities: &[Entity]) -> HashMap<&str, usize> {
    entities
        .iter()
        .enumerate()
        .map(|(i, e)| (e.name.as_str(), i))
        .collect()
}

/// Distinct link targets of every entity that resolve to another entity.
fn resolved_links(entities: &[Entity]) -> Vec<Vec<usize>> {
    let index = name_index(entities);
    entities
        .iter()
        .enumerate()
        .map(|(i, entity)| {
            let mut seen = HashSet::new();
            entity
                .linked_entities
                .iter()
                .filter_map(|name| index.get(name.as_str()).copied())
                .filter(|&j| j != i && seen.insert(j))
                .collect()
        })
        .collect()
}

/// Score connectivity. Every resolvable link credits both of its ends, then
/// each entity also collects the importance of its link partners.
pub fn compute_importance(entities: &mut [Entity]) {
    let links = resolved_links(entities);

    let mut importance = vec![0u32; entities.len()];
    for (i, targets) in links.iter().enumerate() {
        for &j in targets {
            importance[i] += 1;
            importance[j] += 1;
        }
    }

    let mut second = importance.clone();
    for (i, targets) in links.iter().enumerate() {
        for &j in targets {
            second[i] += importance[j];
            second[j] += importance[i];
        }
    }

    for (i, entity) in entities.iter_mut().enumerate() {
        entity.importance = importance[i];
        entity.second_importance = second[i];
    }
}

/// Keep `focus` and everything within [`FOCUS_HOPS`] links of it, treating
/// links as undirected. Input order is preserved; an unknown focus keeps nothing.
pub fn neighborhood(entities: Vec<Entity>, focus: &str) -> Vec<Entity> {
    let Some(start) = entities.iter().position(|e| e.name == focus) else {
        return Vec::new();
    };

    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); entities.len()];
    for (i, targets) in resolved_links(&entities).into_iter().enumerate() {
        for j in targets {
            adjacency[i].push(j);
            adjacency[j].push(i);
        }
    }

    let mut depth: Vec<Option<usize>> = vec![None; entities.len()];
    depth[start] = Some(0);
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        let d = depth[current].unwrap_or(0);
        if d == FOCUS_HOPS {
            continue;
        }
        for &next in &adjacency[current] {
            if depth[next].is_none() {
                depth[next] = Some(d + 1);
                queue.push_back(next);
            }
        }
    }

    entities
        .into_iter()
        .zip(depth)
        .filter_map(|(entity, d)| d.map(|_| entity))
        .collect()
}

/// Stable sort, most important first.
pub fn rank_entities(entities: &mut [Entity]) {
    entities.sort_by(|a, b| b.second_importance.cmp(&a.second_importance));
}

/// Column-band layout engine for entity boxes.
pub struct LayoutEngine<'a, T: TextMeasure, R: RandomSource> {
    measure: &'a mut T,
    rng: &'a mut R,
    font_size: f32,
    pub band_count: usize,
    pub max_vertical_trials: usize,
    pub max_visible_columns: usize,
    pub node_padding_h: f32,
    pub node_padding_v: f32,
}

impl<'a, T: TextMeasure, R: RandomSource> LayoutEngine<'a, T, R> {
    pub fn new(measure: &'a mut T, rng: &'a mut R, font_size: f32) -> Self {
        Self {
            measure,
            rng,
            font_size,
            band_count: 5,
            max_vertical_trials: 100,
            max_visible_columns: MAX_VISIBLE_COLUMNS,
            node_padding_h: 20.0,
            node_padding_v: 10.0,
        }
    }

    fn bands(&self) -> usize {
        self.band_count.max(1)
    }

    /// Run the whole pipeline: optional discovery, focus filter, sizing,
    /// scoring, ranking, truncation, band assignment and vertical placement.
    pub fn apply(
        &mut self,
        mut entities: Vec<Entity>,
        canvas: Canvas,
        options: &LayoutOptions,
    ) -> Result<Vec<Entity>> {
        validate_canvas(canvas)?;
        validate_entities(&entities)?;

        if options.discover_linked_entities {
            discover_linked_entities(&mut entities);
        }

        if let Some(focus) = options.focus_entity_name.as_deref() {
            entities = neighborhood(entities, focus);
            debug!(focus, kept = entities.len(), "applied focus filter");
        }

        for entity in &mut entities {
            let (width, height) = self.calculate_entity_size(entity);
            entity.width = width;
            entity.height = height;
        }

        compute_importance(&mut entities);
        rank_entities(&mut entities);
        if let Some(cap) = options.cap() {
            entities.truncate(cap);
        }

        let band_width = canvas.width / self.bands() as f32;
        for entity in &mut entities {
            let start = self.random_band();
            self.assign_columns(entity, start, band_width);
        }

        for idx in 0..entities.len() {
            let (placed, rest) = entities.split_at_mut(idx);
            self.place_entity(&mut rest[0], placed, canvas, band_width);
        }

        debug!(
            entities = entities.len(),
            canvas_width = canvas.width,
            canvas_height = canvas.height,
            "layout complete"
        );
        Ok(entities)
    }

    /// Box size from the bold title plus the visible column lines.
    pub fn calculate_entity_size(&mut self, entity: &Entity) -> (f32, f32) {
        let title_font = self.font_size;
        let column_font = self.font_size * COLUMN_FONT_SCALE;

        let mut max_w = self.measure.measure_text(&entity.name, title_font, true).0;
        let labels = column_labels(entity, self.max_visible_columns);
        for label in &labels {
            max_w = max_w.max(self.measure.measure_text(label, column_font, false).0);
        }

        let width = max_w + self.node_padding_h * 2.0;
        let height = self.node_padding_v * 2.0
            + title_font * LINE_HEIGHT_FACTOR
            + labels.len() as f32 * column_font * LINE_HEIGHT_FACTOR;
        (width, height)
    }

    fn random_band(&mut self) -> usize {
        let bands = self.bands();
        ((self.rng.next_f32() * bands as f32) as usize).min(bands - 1)
    }

    /// Anchor the box at band `start`, spanning as many bands as its width
    /// needs, and center it across them. Spans that would run off the right
    /// edge are pulled left.
    pub fn assign_columns(&self, entity: &mut Entity, start: usize, band_width: f32) {
        let bands = self.bands();
        // Boxes wider than the canvas claim every band.
        let span = if band_width > 0.0 {
            ((entity.width / band_width).ceil() as usize).clamp(1, bands)
        } else {
            1
        };
        let start = start.min(bands - span);

        entity.column = start;
        entity.dcolumns = (start..start + span).collect();
        let span_width = span as f32 * band_width;
        entity.x = start as f32 * band_width + (span_width - entity.width) / 2.0;
    }

    fn place_entity(&mut self, entity: &mut Entity, placed: &[Entity], canvas: Canvas, band_width: f32) {
        let bands = self.bands();
        let original = entity.column;

        for shift in 0..bands {
            if shift > 0 {
                self.assign_columns(entity, (original + shift) % bands, band_width);
            }
            if let Some(y) = self.find_free_y(entity, placed, canvas) {
                entity.y = y;
                trace!(entity = %entity.name, column = entity.column, y, "placed entity");
                return;
            }
        }

        // Every band is full: stack under the lowest box sharing the original bands.
        self.assign_columns(entity, original, band_width);
        entity.y = placed
            .iter()
            .filter(|other| entity.shares_band(other))
            .map(Entity::bottom)
            .fold(0.0, f32::max);
        warn!(
            entity = %entity.name,
            column = entity.column,
            y = entity.y,
            "no free slot on canvas, stacked below existing boxes"
        );
    }

    fn find_free_y(&mut self, entity: &Entity, placed: &[Entity], canvas: Canvas) -> Option<f32> {
        let free = (canvas.height - entity.height).max(0.0);
        let centered_at =
            |fraction: f32| (canvas.height * fraction - entity.height / 2.0).clamp(0.0, free);

        for trial in 0..self.max_vertical_trials {
            let y = match trial {
                0 => centered_at(0.5),
                1 => centered_at(0.25),
                2 => centered_at(0.75),
                _ => self.rng.next_f32() * free,
            };
            if !collides(entity, y, placed) {
                return Some(y);
            }
        }
        None
    }
}

fn collides(entity: &Entity, y: f32, placed: &[Entity]) -> bool {
    placed
        .iter()
        .any(|other| entity.shares_band(other) && y < other.bottom() && y + entity.height > other.y)
}
