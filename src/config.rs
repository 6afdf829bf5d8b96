use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::erd::{Canvas, DiagramStyle, LayoutOptions};

const DEFAULT_CANVAS_WIDTH: f32 = 1200.0;
const DEFAULT_CANVAS_HEIGHT: f32 = 800.0;
const DEFAULT_FONT_SIZE: f32 = 14.0;

const LIGHTBLUE: &str = "#add8e6";
const SLATE_STROKE: &str = "#1f3a5f";
const INK: &str = "#1b1f23";
const LINK_GRAY: &str = "#4a5568";
const WHITE: &str = "#ffffff";

/// Defaults for a layout run. Every field may be omitted from the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErdConfig {
    #[serde(default = "default_canvas_width")]
    pub canvas_width: f32,
    #[serde(default = "default_canvas_height")]
    pub canvas_height: f32,
    /// 0 keeps every entity.
    #[serde(default)]
    pub max_entities: usize,
    #[serde(default = "default_discover")]
    pub discover_linked_entities: bool,
    #[serde(default)]
    pub focus_entity_name: Option<String>,
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default = "default_font_family")]
    pub font_family: String,

    #[serde(default = "default_entity_fill")]
    pub entity_fill: String,
    #[serde(default = "default_entity_stroke")]
    pub entity_stroke: String,
    #[serde(default = "default_text_color")]
    pub text_color: String,
    #[serde(default = "default_link_stroke")]
    pub link_stroke: String,
    #[serde(default = "default_background")]
    pub background: String,
}

fn default_canvas_width() -> f32 {
    DEFAULT_CANVAS_WIDTH
}

fn default_canvas_height() -> f32 {
    DEFAULT_CANVAS_HEIGHT
}

fn default_discover() -> bool {
    true
}

fn default_font_size() -> f32 {
    DEFAULT_FONT_SIZE
}

fn default_font_family() -> String {
    "sans-serif".to_string()
}

fn default_entity_fill() -> String {
    LIGHTBLUE.to_string()
}

fn default_entity_stroke() -> String {
    SLATE_STROKE.to_string()
}

fn default_text_color() -> String {
    INK.to_string()
}

fn default_link_stroke() -> String {
    LINK_GRAY.to_string()
}

fn default_background() -> String {
    WHITE.to_string()
}

impl Default for ErdConfig {
    fn default() -> Self {
        Self {
            canvas_width: default_canvas_width(),
            canvas_height: default_canvas_height(),
            max_entities: 0,
            discover_linked_entities: default_discover(),
            focus_entity_name: None,
            seed: None,
            font_size: default_font_size(),
            font_family: default_font_family(),
            entity_fill: default_entity_fill(),
            entity_stroke: default_entity_stroke(),
            text_color: default_text_color(),
            link_stroke: default_link_stroke(),
            background: default_background(),
        }
    }
}

impl ErdConfig {
    pub fn from_toml(content: &str) -> Result<Self, String> {
        let config: Self =
            toml::from_str(content).map_err(|e| format!("Failed to parse TOML config: {}", e))?;
        config.validate()
    }

    pub fn from_yaml(content: &str) -> Result<Self, String> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| format!("Failed to parse YAML config: {}", e))?;
        config.validate()
    }

    fn validate(self) -> Result<Self, String> {
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(format!(
                "Invalid font_size: {} (must be a positive number)",
                self.font_size
            ));
        }
        Ok(self)
    }

    /// Read a config file, trying TOML before YAML.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.is_file() {
            return Err(format!("Config file not found: {}", path.display()));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: Self = if let Ok(config) = toml::from_str(&content) {
            config
        } else if let Ok(config) = serde_yaml::from_str(&content) {
            config
        } else {
            return Err("Failed to parse config file as TOML or YAML".to_string());
        };
        config.validate()
    }

    pub fn canvas(&self) -> Canvas {
        Canvas::new(self.canvas_width, self.canvas_height)
    }

    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            focus_entity_name: self.focus_entity_name.clone(),
            max_entities: self.max_entities,
            truncate: self.max_entities > 0,
            discover_linked_entities: self.discover_linked_entities,
        }
    }

    pub fn diagram_style(&self) -> DiagramStyle {
        let mut style = DiagramStyle::with_colors(
            &self.entity_fill,
            &self.entity_stroke,
            &self.text_color,
            &self.background,
            &self.link_stroke,
        );
        style.font_family = self.font_family.clone();
        style.font_size = self.font_size;
        style
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = ErdConfig::from_toml("").unwrap();
        assert_eq!(config, ErdConfig::default());
        assert_eq!(config.canvas(), Canvas::new(1200.0, 800.0));
        assert!(config.layout_options().discover_linked_entities);
        assert!(!config.layout_options().truncate);
    }

    #[test]
    fn toml_overrides_selected_fields() {
        let config = ErdConfig::from_toml(
            r##"
canvas_width = 1000
max_entities = 15
focus_entity_name = "Order"
entity_fill = "#ffeeaa"
"##,
        )
        .unwrap();

        assert_eq!(config.canvas_width, 1000.0);
        assert_eq!(config.canvas_height, 800.0);
        let options = config.layout_options();
        assert_eq!(options.max_entities, 15);
        assert!(options.truncate);
        assert_eq!(options.focus_entity_name.as_deref(), Some("Order"));
        assert_eq!(config.diagram_style().entity_fill, "#ffeeaa");
    }

    #[test]
    fn yaml_is_accepted() {
        let config = ErdConfig::from_yaml(
            "discover_linked_entities: false\nseed: 42\nfont_size: 12\n",
        )
        .unwrap();
        assert!(!config.discover_linked_entities);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.diagram_style().font_size, 12.0);
    }

    #[test]
    fn dark_fill_switches_text_to_background() {
        let config = ErdConfig {
            entity_fill: "#102030".to_string(),
            text_color: "#1b1f23".to_string(),
            background: "#ffffff".to_string(),
            ..ErdConfig::default()
        };
        assert_eq!(config.diagram_style().entity_text, "#ffffff");
    }

    #[test]
    fn non_positive_font_size_is_rejected() {
        let err = ErdConfig::from_toml("font_size = 0").unwrap_err();
        assert!(err.contains("font_size"), "{err}");
        assert!(ErdConfig::from_yaml("font_size: -3\n").is_err());
        assert!(ErdConfig::from_toml("font_size = nan").is_err());
    }

    #[test]
    fn load_rejects_bad_font_size() {
        let path = std::env::temp_dir().join(format!("erd-font-{}.toml", std::process::id()));
        std::fs::write(&path, "font_size = -1.5\n").unwrap();
        let err = ErdConfig::load(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(err.contains("font_size"), "{err}");
    }

    #[test]
    fn load_reports_missing_file() {
        let err = ErdConfig::load(Path::new("does/not/exist.toml")).unwrap_err();
        assert!(err.contains("not found"));
    }

    #[test]
    fn load_falls_back_to_yaml() {
        let path = std::env::temp_dir().join(format!("erd-config-{}.yaml", std::process::id()));
        std::fs::write(&path, "canvas_height: 640\nbackground: \"#000000\"\n").unwrap();
        let config = ErdConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(config.canvas_height, 640.0);
        assert_eq!(config.background, "#000000");
    }
}
