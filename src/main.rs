use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use erd_layout::config::ErdConfig;
use erd_layout::erd::{self, Entity, LayoutEngine, RandomSource, SeededRandom};
use erd_layout::export::{svg_to_pdf, svg_to_png};
use erd_layout::fonts::{CosmicTextMeasure, MonospaceMeasure, TextMeasure};

/// Lay out an entity-relationship diagram and render it to SVG, PNG or PDF
#[derive(Parser, Debug)]
#[command(name = "erd-layout")]
#[command(about = "Discover entity relationships and lay them out in column bands", long_about = None)]
struct Args {
    /// Input entities JSON file (use "-" for stdin)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file path (extension determines format: .svg, .png, .pdf or .json)
    #[arg(short, long, value_name = "OUTPUT")]
    output: PathBuf,

    /// Path to a layout config file (TOML or YAML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Canvas width in pixels
    #[arg(long)]
    width: Option<f32>,

    /// Canvas height in pixels
    #[arg(long)]
    height: Option<f32>,

    /// Only show this entity and its two-hop neighborhood
    #[arg(short, long, value_name = "ENTITY")]
    focus: Option<String>,

    /// Keep only the N most connected entities (0 keeps all)
    #[arg(short, long, value_name = "N")]
    max_entities: Option<usize>,

    /// Skip name-based relationship discovery
    #[arg(long)]
    no_discover: bool,

    /// Seed for reproducible layouts
    #[arg(long)]
    seed: Option<u64>,

    /// Measure text with a fixed-width approximation instead of system fonts
    #[arg(long)]
    monospace: bool,

    /// Raster scale multiplier for PNG output (e.g. 2.0 for sharper output)
    #[arg(long, default_value_t = 1.0)]
    png_scale: f32,
}

fn main() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match args.config.as_deref() {
        Some(path) => ErdConfig::load(path)?,
        None => ErdConfig::default(),
    };
    apply_overrides(&mut config, &args);

    let input = read_input(&args.input)?;
    let entities = erd::parse_entities(&input).map_err(|e| e.to_string())?;
    info!(count = entities.len(), "loaded entities");

    let output_ext = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .ok_or("Output file has no extension")?
        .to_ascii_lowercase();
    if !matches!(output_ext.as_str(), "svg" | "png" | "pdf" | "json") {
        return Err(format!(
            "Unsupported output format: .{} (use .svg, .png, .pdf or .json)",
            output_ext
        ));
    }

    let mut rng = match config.seed {
        Some(seed) => SeededRandom::new(seed),
        None => SeededRandom::from_entropy(),
    };

    let laid_out = if args.monospace {
        let mut measure = MonospaceMeasure::default();
        run_layout(entities, &config, &mut measure, &mut rng)?
    } else {
        let mut measure = CosmicTextMeasure::new()?;
        run_layout(entities, &config, &mut measure, &mut rng)?
    };

    if output_ext == "json" {
        let json = serde_json::to_string_pretty(&laid_out)
            .map_err(|e| format!("Failed to serialize entities: {}", e))?;
        std::fs::write(&args.output, json).map_err(|e| format!("Failed to write JSON: {}", e))?;
        eprintln!("JSON saved to: {}", args.output.display());
        return Ok(());
    }

    let svg = erd::render_erd_document(&laid_out, config.canvas(), &config.diagram_style())?;

    match output_ext.as_str() {
        "png" => {
            let png_data = svg_to_png(&svg, args.png_scale)?;
            std::fs::write(&args.output, png_data)
                .map_err(|e| format!("Failed to write PNG: {}", e))?;
            eprintln!("PNG saved to: {}", args.output.display());
        }
        "pdf" => {
            let pdf_data = svg_to_pdf(&svg)?;
            std::fs::write(&args.output, pdf_data)
                .map_err(|e| format!("Failed to write PDF: {}", e))?;
            eprintln!("PDF saved to: {}", args.output.display());
        }
        _ => {
            std::fs::write(&args.output, svg).map_err(|e| format!("Failed to write SVG: {}", e))?;
            eprintln!("SVG saved to: {}", args.output.display());
        }
    }

    Ok(())
}

/// Flags win over config file values.
fn apply_overrides(config: &mut ErdConfig, args: &Args) {
    if let Some(width) = args.width {
        config.canvas_width = width;
    }
    if let Some(height) = args.height {
        config.canvas_height = height;
    }
    if let Some(focus) = &args.focus {
        config.focus_entity_name = Some(focus.clone());
    }
    if let Some(max) = args.max_entities {
        config.max_entities = max;
    }
    if args.no_discover {
        config.discover_linked_entities = false;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
}

fn read_input(path: &Path) -> Result<String, String> {
    if path.to_str() == Some("-") {
        let mut buffer = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read input file: {}", e))
    }
}

fn run_layout<T: TextMeasure, R: RandomSource>(
    entities: Vec<Entity>,
    config: &ErdConfig,
    measure: &mut T,
    rng: &mut R,
) -> Result<Vec<Entity>, String> {
    let mut engine = LayoutEngine::new(measure, rng, config.font_size);
    engine
        .apply(entities, config.canvas(), &config.layout_options())
        .map_err(|e| e.to_string())
}
