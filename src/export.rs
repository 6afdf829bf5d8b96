use std::path::Path;

use resvg::usvg;
use tiny_skia::{Pixmap, Transform};
use tracing::debug;

const LOCAL_FONTS_DIR: &str = "fonts";

/// Generic family names resolved to concrete installed families.
#[derive(Debug, Default, PartialEq)]
struct FallbackFamilies {
    sans: Option<String>,
    serif: Option<String>,
    mono: Option<String>,
}

fn pick_fallbacks<'a>(families: impl IntoIterator<Item = &'a str>) -> FallbackFamilies {
    let mut sans_family: Option<&str> = None;
    let mut serif_family: Option<&str> = None;
    let mut mono_family: Option<&str> = None;
    let mut first_family: Option<&str> = None;

    for family in families {
        if first_family.is_none() {
            first_family = Some(family);
        }

        let lower = family.to_ascii_lowercase();
        if sans_family.is_none() && lower.contains("sans") {
            sans_family = Some(family);
        }
        if serif_family.is_none() && lower.contains("serif") {
            serif_family = Some(family);
        }
        if mono_family.is_none() && (lower.contains("mono") || lower.contains("code")) {
            mono_family = Some(family);
        }
    }

    FallbackFamilies {
        sans: sans_family.or(first_family).map(str::to_string),
        serif: serif_family.or(first_family).map(str::to_string),
        mono: mono_family
            .or(sans_family)
            .or(first_family)
            .map(str::to_string),
    }
}

// resvg and svg2pdf may pin different fontdb versions, so the database
// setup is spelled out once per type.
macro_rules! prepare_fontdb {
    ($fontdb:expr) => {{
        let fontdb = $fontdb;
        fontdb.load_system_fonts();

        let local_fonts = Path::new(LOCAL_FONTS_DIR);
        if local_fonts.is_dir() {
            fontdb.load_fonts_dir(local_fonts);
        }

        let picks = pick_fallbacks(
            fontdb
                .faces()
                .flat_map(|face| face.families.iter().map(|(name, _)| name.as_str())),
        );
        debug!(?picks, "font fallbacks");

        if let Some(family) = picks.sans.as_deref() {
            fontdb.set_sans_serif_family(family);
        }
        if let Some(family) = picks.serif.as_deref() {
            fontdb.set_serif_family(family);
        }
        if let Some(family) = picks.mono.as_deref() {
            fontdb.set_monospace_family(family);
        }
    }};
}

/// Rasterize an SVG document. `scale` multiplies the output resolution.
pub fn svg_to_png(svg: &str, scale: f32) -> Result<Vec<u8>, String> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(format!("Invalid --png-scale value: {}", scale));
    }

    let mut opts = usvg::Options::default();
    prepare_fontdb!(opts.fontdb_mut());

    let tree =
        usvg::Tree::from_str(svg, &opts).map_err(|e| format!("Failed to parse SVG: {}", e))?;

    let svg_width = (tree.size().width() * scale).ceil() as u32;
    let svg_height = (tree.size().height() * scale).ceil() as u32;

    let mut pixmap = Pixmap::new(svg_width, svg_height).ok_or("Failed to create pixmap")?;
    let transform = Transform::from_scale(scale, scale);

    resvg::render(&tree, transform, &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| format!("Failed to encode PNG: {}", e))
}

/// Convert an SVG document to a single-page PDF with text drawn as paths.
pub fn svg_to_pdf(svg: &str) -> Result<Vec<u8>, String> {
    use svg2pdf::usvg::fontdb;

    let mut fontdb = fontdb::Database::new();
    prepare_fontdb!(&mut fontdb);

    let opts = svg2pdf::usvg::Options {
        fontdb: std::sync::Arc::new(fontdb),
        ..Default::default()
    };

    let tree = svg2pdf::usvg::Tree::from_str(svg, &opts)
        .map_err(|e| format!("Failed to parse SVG: {}", e))?;

    let options = svg2pdf::ConversionOptions {
        embed_text: false,
        ..Default::default()
    };
    let page_options = svg2pdf::PageOptions::default();

    svg2pdf::to_pdf(&tree, options, page_options)
        .map_err(|e| format!("Failed to convert SVG to PDF: {}", e))
}
