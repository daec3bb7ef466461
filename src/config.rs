use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::export::{GridLayout, MAX_CANVAS_PIXELS};

/// Geometry and colours of the exported composite, in pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub margin: u32,
    pub padding: u32,
    pub panel_width: u32,
    pub panel_height: u32,
    /// Caption band below each panel
    pub text_height: u32,
    pub title_height: u32,
    pub columns: u32,
    pub border_width: u32,
    pub title_size: f32,
    /// Title baseline, measured from the top margin
    pub title_baseline: u32,
    pub caption_size: f32,
    pub caption_line_height: u32,
    /// First caption baseline, measured from the bottom of the panel image
    pub caption_offset: u32,
    pub background: String,
    pub ink: String,
    pub panel_backing: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin: 40,
            padding: 20,
            panel_width: 400,
            panel_height: 400,
            text_height: 100,
            title_height: 80,
            columns: 2,
            border_width: 4,
            title_size: 40.0,
            title_baseline: 40,
            caption_size: 20.0,
            caption_line_height: 24,
            caption_offset: 30,
            background: "#fcf5e5".to_owned(),
            ink: "#2d2d2d".to_owned(),
            panel_backing: "#ffffff".to_owned(),
        }
    }
}

/// Settings for compositing and writing the export image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub layout: LayoutConfig,
    /// TrueType/OpenType font for title and captions; egui's bundled font if unset
    pub font_path: Option<PathBuf>,
    /// Export files are named `<prefix>-<unix millis>.png`
    pub file_prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            font_path: None,
            file_prefix: "comic".to_owned(),
        }
    }
}

/// Top-level settings for a drawing session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Pixel resolution of every panel surface
    pub panel_width: u32,
    pub panel_height: u32,
    /// Number of beats a generated story must have
    pub panel_count: usize,
    pub export: ExportConfig,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            panel_width: 400,
            panel_height: 400,
            panel_count: 4,
            export: ExportConfig::default(),
        }
    }
}

impl StudioConfig {
    /// Parses and validates a JSON config; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects sizes that can't be allocated or laid out.
    ///
    /// Panel surfaces and the export canvas must both be non-empty and
    /// within [`MAX_CANVAS_PIXELS`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let surface = u64::from(self.panel_width) * u64::from(self.panel_height);
        if surface == 0 || surface > MAX_CANVAS_PIXELS {
            return Err(ConfigError::Invalid(format!(
                "panel size {}x{} is out of range",
                self.panel_width, self.panel_height
            )));
        }

        let layout = GridLayout::new(self.export.layout.clone());
        match layout.canvas_size(self.panel_count) {
            Some((w, h)) if w > 0 && h > 0 && u64::from(w) * u64::from(h) <= MAX_CANVAS_PIXELS => {}
            _ => {
                return Err(ConfigError::Invalid(format!(
                    "export layout for {} panels is too large",
                    self.panel_count
                )));
            }
        }

        let cell = (self.export.layout.panel_width, self.export.layout.panel_height);
        if cell != (self.panel_width, self.panel_height) {
            log::warn!(
                "Panel surfaces are {}x{} but export cells are {}x{}; panels will be rescaled",
                self.panel_width,
                self.panel_height,
                cell.0,
                cell.1
            );
        }
        Ok(())
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        log::info!("Loading config from {}", path.display());
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}
