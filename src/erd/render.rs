use std::collections::{HashMap, HashSet};

use crate::fonts::LINE_HEIGHT_FACTOR;
use crate::xml::{attr, escape_xml};

use super::layout::{COLUMN_FONT_SCALE, MAX_VISIBLE_COLUMNS, column_labels};
use super::types::{Canvas, Entity};

/// Colors and text metrics for the SVG writer.
#[derive(Debug, Clone)]
pub struct DiagramStyle {
    pub entity_fill: String,
    pub entity_stroke: String,
    pub entity_text: String,
    pub link_stroke: String,
    pub background: String,
    pub font_family: String,
    pub font_size: f32,
    /// Must match the layout engine's paddings for text to fit its boxes.
    pub text_inset_x: f32,
    pub text_inset_y: f32,
    /// Must match `LayoutEngine::max_visible_columns`.
    pub max_visible_columns: usize,
}

impl Default for DiagramStyle {
    fn default() -> Self {
        Self {
            entity_fill: "#add8e6".to_string(),
            entity_stroke: "#1f3a5f".to_string(),
            entity_text: "#1b1f23".to_string(),
            link_stroke: "#4a5568".to_string(),
            background: "#ffffff".to_string(),
            font_family: "sans-serif".to_string(),
            font_size: 14.0,
            text_inset_x: 20.0,
            text_inset_y: 10.0,
            max_visible_columns: MAX_VISIBLE_COLUMNS,
        }
    }
}

impl DiagramStyle {
    /// Use `text` on entity boxes unless `fallback` reads better against `fill`.
    pub fn with_colors(fill: &str, stroke: &str, text: &str, fallback: &str, link: &str) -> Self {
        Self {
            entity_fill: fill.to_string(),
            entity_stroke: stroke.to_string(),
            entity_text: pick_higher_contrast(fill, text, fallback),
            link_stroke: link.to_string(),
            background: fallback.to_string(),
            ..Self::default()
        }
    }
}

fn parse_hex_rgb(value: &str) -> Option<(f32, f32, f32)> {
    let hex = value.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let channel = |range: std::ops::Range<usize>| -> Option<f32> {
        Some(u8::from_str_radix(hex.get(range)?, 16).ok()? as f32 / 255.0)
    };
    let r = channel(0..2)?;
    let g = channel(2..4)?;
    let b = channel(4..6)?;
    Some((r, g, b))
}

fn relative_luminance(color: (f32, f32, f32)) -> f32 {
    let linear = |v: f32| {
        if v <= 0.03928 {
            v / 12.92
        } else {
            ((v + 0.055) / 1.055).powf(2.4)
        }
    };

    let (r, g, b) = color;
    0.2126 * linear(r) + 0.7152 * linear(g) + 0.0722 * linear(b)
}

fn contrast_ratio(a: &str, b: &str) -> Option<f32> {
    let l1 = relative_luminance(parse_hex_rgb(a)?);
    let l2 = relative_luminance(parse_hex_rgb(b)?);
    let (hi, lo) = if l1 >= l2 { (l1, l2) } else { (l2, l1) };
    Some((hi + 0.05) / (lo + 0.05))
}

fn pick_higher_contrast(base: &str, primary: &str, secondary: &str) -> String {
    let p = contrast_ratio(base, primary).unwrap_or(0.0);
    let s = contrast_ratio(base, secondary).unwrap_or(0.0);

    if s > p {
        secondary.to_string()
    } else {
        primary.to_string()
    }
}

/// Render laid-out entities as SVG elements. Returns the markup and the
/// extent of the drawing.
pub fn render_erd(entities: &[Entity], style: &DiagramStyle) -> Result<(String, f32, f32), String> {
    if entities.is_empty() {
        return Ok(("<g></g>".to_string(), 100.0, 50.0));
    }

    let mut svg = String::new();
    let padding = 20.0;

    // Links first so boxes paint over line ends.
    let by_name: HashMap<&str, &Entity> = entities.iter().map(|e| (e.name.as_str(), e)).collect();
    let mut drawn: HashSet<(&str, &str)> = HashSet::new();
    for entity in entities {
        for link in &entity.linked_entities {
            let Some(other) = by_name.get(link.as_str()) else {
                continue;
            };
            if other.name == entity.name {
                continue;
            }
            let key = if entity.name <= other.name {
                (entity.name.as_str(), other.name.as_str())
            } else {
                (other.name.as_str(), entity.name.as_str())
            };
            if drawn.insert(key) {
                svg.push_str(&render_link(entity, other, style));
            }
        }
    }

    for entity in entities {
        svg.push_str(&render_entity(entity, style)?);
    }

    let right = entities.iter().map(|e| e.x + e.width).fold(0.0, f32::max);
    let bottom = entities.iter().map(Entity::bottom).fold(0.0, f32::max);

    Ok((svg, right + padding, bottom + padding))
}

/// A standalone SVG document at least as large as `canvas`.
pub fn render_erd_document(
    entities: &[Entity],
    canvas: Canvas,
    style: &DiagramStyle,
) -> Result<String, String> {
    let (inner, width, height) = render_erd(entities, style)?;
    let total_w = width.max(canvas.width);
    let total_h = height.max(canvas.height);

    Ok(format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" id="erd-svg" width="{total_w}" height="{total_h}" viewBox="0 0 {total_w} {total_h}">
<rect width="{total_w}" height="{total_h}" fill="{background}"/>
{inner}
</svg>"#,
        background = escape_xml(&style.background),
    ))
}

fn render_entity(entity: &Entity, style: &DiagramStyle) -> Result<String, String> {
    let mut svg = String::new();

    let payload = serde_json::to_string(entity)
        .map_err(|e| format!("Failed to serialize entity {}: {}", entity.name, e))?;
    svg.push_str(&format!(
        r#"<g class="entity"{}{} transform="translate({:.2}, {:.2})">"#,
        attr("id", &entity.id),
        attr("data-entity", &payload),
        entity.x,
        entity.y
    ));

    svg.push_str(&format!(
        r#"<rect x="0" y="0" width="{:.2}" height="{:.2}" fill="{}" stroke="{}" stroke-width="1.5" />"#,
        entity.width,
        entity.height,
        escape_xml(&style.entity_fill),
        escape_xml(&style.entity_stroke)
    ));

    let title_font = style.font_size;
    let column_font = style.font_size * COLUMN_FONT_SCALE;
    let mut y = style.text_inset_y + title_font;

    svg.push_str(&format!(
        r#"<text x="{:.2}" y="{:.2}" font-family="{}" font-size="{:.1}" fill="{}" font-weight="bold">{}</text>"#,
        style.text_inset_x,
        y,
        escape_xml(&style.font_family),
        title_font,
        escape_xml(&style.entity_text),
        escape_xml(&entity.name)
    ));

    y += (title_font * LINE_HEIGHT_FACTOR - title_font) + column_font * LINE_HEIGHT_FACTOR;
    for label in column_labels(entity, style.max_visible_columns) {
        svg.push_str(&format!(
            r#"<text x="{:.2}" y="{:.2}" font-family="{}" font-size="{:.1}" fill="{}">{}</text>"#,
            style.text_inset_x,
            y,
            escape_xml(&style.font_family),
            column_font,
            escape_xml(&style.entity_text),
            escape_xml(label)
        ));
        y += column_font * LINE_HEIGHT_FACTOR;
    }

    svg.push_str("</g>");
    Ok(svg)
}

fn render_link(from: &Entity, to: &Entity, style: &DiagramStyle) -> String {
    let (from_cx, from_cy) = from.center();
    let (to_cx, to_cy) = to.center();
    let angle = (to_cy - from_cy).atan2(to_cx - from_cx);
    let (x1, y1) = rect_boundary_point(from, angle);
    let (x2, y2) = rect_boundary_point(to, angle + std::f32::consts::PI);

    format!(
        r#"<line class="link" x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="1.2" />"#,
        x1,
        y1,
        x2,
        y2,
        escape_xml(&style.link_stroke)
    )
}

/// Where a ray from the box center at `angle` leaves the box.
fn rect_boundary_point(entity: &Entity, angle: f32) -> (f32, f32) {
    let (cx, cy) = entity.center();
    let dx = angle.cos();
    let dy = angle.sin();
    let half_w = entity.width / 2.0;
    let half_h = entity.height / 2.0;

    let tx = if dx.abs() > 1e-5 {
        half_w / dx.abs()
    } else {
        f32::INFINITY
    };
    let ty = if dy.abs() > 1e-5 {
        half_h / dy.abs()
    } else {
        f32::INFINITY
    };
    let t = tx.min(ty);

    (cx + dx * t, cy + dy * t)
}
