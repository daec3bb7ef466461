use egui::Color32;
use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::surface::BACKGROUND;

/// Preset swatches offered by the colour picker, as `#rrggbb`
pub const PALETTE: [&str; 12] = [
    "#000000", "#2d2d2d", "#ef4444", "#f97316", "#eab308", "#22c55e", "#3b82f6", "#a855f7",
    "#ec4899", "#8b4513", "#9ca3af", "#ffffff",
];

/// Opacity the marker paints with
pub const MARKER_OPACITY: f32 = 0.5;

/// Range of user-selectable stroke widths
pub const MIN_WIDTH: f32 = 1.0;
pub const MAX_WIDTH: f32 = 50.0;

/// Drawing modes a panel understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolMode {
    Pencil,
    Pen,
    Marker,
    Fill,
    Eraser,
}

impl ToolMode {
    pub fn all() -> &'static [ToolMode] {
        &[
            ToolMode::Pencil,
            ToolMode::Pen,
            ToolMode::Marker,
            ToolMode::Fill,
            ToolMode::Eraser,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolMode::Pencil => "pencil",
            ToolMode::Pen => "pen",
            ToolMode::Marker => "marker",
            ToolMode::Fill => "fill",
            ToolMode::Eraser => "eraser",
        }
    }

    /// Width applied when switching into this mode. `None` keeps the current width.
    pub fn default_width(&self) -> Option<f32> {
        match self {
            ToolMode::Pencil => Some(2.0),
            ToolMode::Pen => Some(5.0),
            ToolMode::Marker => Some(15.0),
            ToolMode::Eraser => Some(20.0),
            ToolMode::Fill => None,
        }
    }

    pub fn opacity(&self) -> f32 {
        match self {
            ToolMode::Marker => MARKER_OPACITY,
            _ => 1.0,
        }
    }
}

/// Current drawing configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    mode: ToolMode,
    color: Color32,
    width: f32,
    opacity: f32,
}

impl Default for Tool {
    fn default() -> Self {
        Self {
            mode: ToolMode::Pencil,
            color: Color32::BLACK,
            width: 3.0,
            opacity: 1.0,
        }
    }
}

impl Tool {
    /// Builds a tool in `mode` with that mode's defaults
    pub fn new(mode: ToolMode, color: Color32) -> Self {
        let mut tool = Self::default();
        tool.set_color(color);
        tool.set_mode(mode);
        tool
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Switches mode, applying the mode's default width and opacity
    pub fn set_mode(&mut self, mode: ToolMode) {
        self.mode = mode;
        if let Some(width) = mode.default_width() {
            self.width = width;
        }
        self.opacity = mode.opacity();
    }

    /// Overrides the width chosen by the last mode switch, clamped to
    /// [`MIN_WIDTH`]..=[`MAX_WIDTH`]
    pub fn set_width(&mut self, width: f32) {
        self.width = if width.is_finite() {
            width.clamp(MIN_WIDTH, MAX_WIDTH)
        } else {
            MIN_WIDTH
        };
    }

    /// Tools only carry RGB; any alpha is dropped
    pub fn set_color(&mut self, color: Color32) {
        self.color = Color32::from_rgb(color.r(), color.g(), color.b());
    }

    /// Colour that actually lands on the surface for this mode
    pub fn paint_color(&self) -> Rgba<u8> {
        match self.mode {
            ToolMode::Eraser => BACKGROUND,
            _ => to_rgba(self.color),
        }
    }

    /// Opacity that actually lands on the surface for this mode
    pub fn paint_opacity(&self) -> f32 {
        match self.mode {
            ToolMode::Eraser => 1.0,
            _ => self.opacity,
        }
    }
}

/// Converts an egui colour to an unmultiplied image pixel
pub fn to_rgba(color: Color32) -> Rgba<u8> {
    Rgba(color.to_srgba_unmultiplied())
}

/// Parses `#rrggbb` (the `#` is optional, hex digits are case-insensitive)
pub fn parse_hex_color(hex: &str) -> Option<Color32> {
    let digits = hex.trim().strip_prefix('#').unwrap_or(hex.trim());
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?))
}

/// Like [`parse_hex_color`], but malformed input falls back to opaque black
pub fn parse_hex_color_or_black(hex: &str) -> Color32 {
    parse_hex_color(hex).unwrap_or_else(|| {
        log::debug!("Malformed colour {:?}, falling back to black", hex);
        Color32::BLACK
    })
}
