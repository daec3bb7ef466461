use image::imageops::{self, FilterType};
use image::{ImageError, Rgba, RgbaImage};
use std::future::Future;

use super::DEFAULT_TITLE;
use super::layout::{GridLayout, PixelRect};
use super::text::{Typeface, wrap_text};
use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::panel::Panel;
use crate::tools::{parse_hex_color_or_black, to_rgba};

/// Largest composite accepted, in pixels (1 GiB of RGBA)
pub const MAX_CANVAS_PIXELS: u64 = 1 << 28;

/// Turns an encoded panel raster back into pixels.
///
/// Decoding is asynchronous so that a host can hand it to a platform image
/// loader; the compositor awaits each decode before touching the next panel.
pub trait RasterDecoder {
    fn decode(&self, encoded: Vec<u8>) -> impl Future<Output = Result<RgbaImage, ImageError>>;
}

/// Decodes in place with the `image` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct PngDecoder;

impl RasterDecoder for PngDecoder {
    fn decode(&self, encoded: Vec<u8>) -> impl Future<Output = Result<RgbaImage, ImageError>> {
        futures::future::ready(image::load_from_memory(&encoded).map(|decoded| decoded.to_rgba8()))
    }
}

/// Progress reported while compositing, in panel order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportEvent {
    DecodeStarted { index: usize },
    PanelPlaced { index: usize },
    CaptionDrawn { index: usize, lines: usize },
}

/// Renders all panels onto a single page
#[derive(Debug, Clone)]
pub struct Compositor {
    layout: GridLayout,
    typeface: Typeface,
    background: Rgba<u8>,
    ink: Rgba<u8>,
    backing: Rgba<u8>,
}

impl Compositor {
    /// Uses the configured font file, or egui's bundled font if none is set
    pub fn new(config: &ExportConfig) -> Result<Self, ExportError> {
        let typeface = Typeface::load(config.font_path.as_deref())?;
        Ok(Self::with_typeface(config, typeface))
    }

    pub fn with_typeface(config: &ExportConfig, typeface: Typeface) -> Self {
        let layout = &config.layout;
        let color = |hex: &str| to_rgba(parse_hex_color_or_black(hex));
        Self {
            background: color(&layout.background),
            ink: color(&layout.ink),
            backing: color(&layout.panel_backing),
            layout: GridLayout::new(layout.clone()),
            typeface,
        }
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn typeface(&self) -> &Typeface {
        &self.typeface
    }

    /// Composites `panels` with [`PngDecoder`] and no progress reporting
    pub async fn compose(&self, panels: &[Panel], title: &str) -> Result<RgbaImage, ExportError> {
        self.compose_with(panels, title, &PngDecoder, |_| {}).await
    }

    /// Composites `panels` in order, awaiting each panel's decode before
    /// placing it and drawing its caption.
    pub async fn compose_with<D, F>(
        &self,
        panels: &[Panel],
        title: &str,
        decoder: &D,
        mut observer: F,
    ) -> Result<RgbaImage, ExportError>
    where
        D: RasterDecoder,
        F: FnMut(ExportEvent),
    {
        if panels.is_empty() {
            return Err(ExportError::NoPanels);
        }

        let config = self.layout.config();
        let (width, height) = self
            .layout
            .canvas_size(panels.len())
            .filter(|&(w, h)| u64::from(w) * u64::from(h) <= MAX_CANVAS_PIXELS)
            .ok_or(ExportError::CanvasTooLarge {
                panels: panels.len(),
            })?;
        log::info!("Compositing {} panels onto {}x{}", panels.len(), width, height);

        let mut canvas = RgbaImage::from_pixel(width, height, self.background);

        let title = if title.trim().is_empty() { DEFAULT_TITLE } else { title };
        self.typeface.at_size(config.title_size).draw_centered(
            &mut canvas,
            title,
            width as f32 / 2.0,
            self.layout.title_baseline() as f32,
            self.ink,
        );

        let caption_font = self.typeface.at_size(config.caption_size);
        for (index, panel) in panels.iter().enumerate() {
            let cell = self.layout.cell(index);

            observer(ExportEvent::DecodeStarted { index });
            let encoded = panel.export_raster()?;
            let decoded = decoder
                .decode(encoded)
                .await
                .map_err(|source| ExportError::Decode { index, source })?;

            self.place_panel(&mut canvas, cell.image, &decoded);
            observer(ExportEvent::PanelPlaced { index });

            let lines = wrap_text(panel.caption(), cell.image.width as f32, &caption_font);
            for (n, line) in lines.iter().enumerate() {
                let offset = (n as u32).saturating_mul(config.caption_line_height);
                let baseline = cell.caption_baseline.saturating_add(offset);
                caption_font.draw_centered(
                    &mut canvas,
                    line,
                    cell.caption_center_x as f32,
                    baseline as f32,
                    self.ink,
                );
            }
            observer(ExportEvent::CaptionDrawn {
                index,
                lines: lines.len(),
            });
        }

        Ok(canvas)
    }

    fn place_panel(&self, canvas: &mut RgbaImage, rect: PixelRect, raster: &RgbaImage) {
        fill_rect(
            canvas,
            i64::from(rect.x),
            i64::from(rect.y),
            rect.width,
            rect.height,
            self.backing,
        );

        if raster.dimensions() == (rect.width, rect.height) {
            imageops::overlay(canvas, raster, i64::from(rect.x), i64::from(rect.y));
        } else {
            log::debug!(
                "Resizing panel raster {:?} to {}x{}",
                raster.dimensions(),
                rect.width,
                rect.height
            );
            let scaled = imageops::resize(raster, rect.width, rect.height, FilterType::Triangle);
            imageops::overlay(canvas, &scaled, i64::from(rect.x), i64::from(rect.y));
        }

        stroke_rect(canvas, rect, self.layout.config().border_width, self.ink);
    }
}

/// Fills a rectangle, clipped to the canvas
fn fill_rect(canvas: &mut RgbaImage, x: i64, y: i64, width: u32, height: u32, color: Rgba<u8>) {
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + i64::from(width)).min(i64::from(canvas.width()));
    let y1 = (y + i64::from(height)).min(i64::from(canvas.height()));
    for py in y0..y1 {
        for px in x0..x1 {
            canvas.put_pixel(px as u32, py as u32, color);
        }
    }
}

/// Outlines `rect` with a line of `line_width` pixels centred on its edge
fn stroke_rect(canvas: &mut RgbaImage, rect: PixelRect, line_width: u32, color: Rgba<u8>) {
    if line_width == 0 {
        return;
    }
    let half = i64::from(line_width / 2);
    let left = i64::from(rect.x) - half;
    let top = i64::from(rect.y) - half;
    let right = i64::from(rect.x) + i64::from(rect.width) - half;
    let bottom = i64::from(rect.y) + i64::from(rect.height) - half;
    let outer_width = rect.width.saturating_add(line_width);
    let outer_height = rect.height.saturating_add(line_width);

    fill_rect(canvas, left, top, outer_width, line_width, color);
    fill_rect(canvas, left, bottom, outer_width, line_width, color);
    fill_rect(canvas, left, top, line_width, outer_height, color);
    fill_rect(canvas, right, top, line_width, outer_height, color);
}
