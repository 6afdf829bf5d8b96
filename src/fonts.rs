use std::num::NonZeroUsize;

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, Weight};
use lru::LruCache;

use crate::xml::sanitized_char_count;

/// Line height as a multiple of the font size, shared by every measurer.
pub const LINE_HEIGHT_FACTOR: f32 = 1.2;

const MEASURE_CACHE_SIZE: usize = 4096;

#[derive(Hash, PartialEq, Eq, Clone)]
struct MeasureKey {
    text: String,
    font_size_bits: u32,
    is_bold: bool,
}

/// Measures a single line of label text as `(width, height)`.
pub trait TextMeasure {
    fn measure_text(&mut self, text: &str, font_size: f32, is_bold: bool) -> (f32, f32);
}

/// Shapes text with the system fonts through cosmic-text.
pub struct CosmicTextMeasure {
    font_system: FontSystem,
    cache: LruCache<MeasureKey, (f32, f32)>,
}

impl CosmicTextMeasure {
    pub fn new() -> Result<Self, String> {
        let capacity = NonZeroUsize::new(MEASURE_CACHE_SIZE)
            .ok_or_else(|| "measure cache size must be non-zero".to_string())?;
        Ok(Self {
            font_system: FontSystem::new(),
            cache: LruCache::new(capacity),
        })
    }
}

impl TextMeasure for CosmicTextMeasure {
    fn measure_text(&mut self, text: &str, font_size: f32, is_bold: bool) -> (f32, f32) {
        let key = MeasureKey {
            text: text.to_string(),
            font_size_bits: font_size.to_bits(),
            is_bold,
        };

        if let Some(cached) = self.cache.get(&key) {
            return *cached;
        }

        let line_height = font_size * LINE_HEIGHT_FACTOR;
        let mut buffer = Buffer::new(
            &mut self.font_system,
            Metrics {
                font_size,
                line_height,
            },
        );

        buffer.set_size(&mut self.font_system, None, None);

        let attrs = Attrs::new().family(Family::SansSerif).weight(if is_bold {
            Weight::BOLD
        } else {
            Weight::NORMAL
        });

        buffer.set_text(&mut self.font_system, text, &attrs, Shaping::Advanced, None);

        let mut total_width: f32 = 0.0;
        let mut total_height: f32 = 0.0;

        for run in buffer.layout_runs() {
            total_width = total_width.max(run.line_w);
            total_height += run.line_height;
        }

        let measured = (total_width, total_height.max(line_height));
        self.cache.put(key, measured);
        measured
    }
}

/// Font-free approximation for headless runs: every character is
/// `char_width_factor × font_size` wide.
#[derive(Debug, Clone, Copy)]
pub struct MonospaceMeasure {
    pub char_width_factor: f32,
}

impl Default for MonospaceMeasure {
    fn default() -> Self {
        Self {
            char_width_factor: 0.6,
        }
    }
}

impl TextMeasure for MonospaceMeasure {
    fn measure_text(&mut self, text: &str, font_size: f32, is_bold: bool) -> (f32, f32) {
        let mut char_width = font_size * self.char_width_factor;
        if is_bold {
            char_width *= 1.05;
        }
        let width = sanitized_char_count(text) as f32 * char_width;
        (width, font_size * LINE_HEIGHT_FACTOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monospace_width_scales_with_characters() {
        let mut measure = MonospaceMeasure::default();
        let (w4, h) = measure.measure_text("abcd", 10.0, false);
        let (w8, _) = measure.measure_text("abcdefgh", 10.0, false);
        assert!((w4 - 24.0).abs() < 1e-4);
        assert!((w8 - 2.0 * w4).abs() < 1e-4);
        assert!((h - 12.0).abs() < 1e-4);
    }

    #[test]
    fn monospace_bold_is_wider() {
        let mut measure = MonospaceMeasure::default();
        let (regular, _) = measure.measure_text("Customer", 14.0, false);
        let (bold, _) = measure.measure_text("Customer", 14.0, true);
        assert!(bold > regular);
    }

    #[test]
    fn monospace_ignores_invalid_xml_chars() {
        let mut measure = MonospaceMeasure::default();
        let (clean, _) = measure.measure_text("ab", 10.0, false);
        let (dirty, _) = measure.measure_text("a\u{0007}b", 10.0, false);
        assert_eq!(clean, dirty);
    }
}
