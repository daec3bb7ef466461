use crate::config::LayoutConfig;

/// Pixel rectangle on the composite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Where one panel and its caption go on the composite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellGeometry {
    pub column: u32,
    pub row: u32,
    /// Area the panel image is drawn into
    pub image: PixelRect,
    /// Baseline of the first caption line
    pub caption_baseline: u32,
    /// Horizontal centre of the caption lines
    pub caption_center_x: u32,
}

/// Fixed-column grid: a title band on top, then cells of
/// `panel + caption band` separated by padding, all inside a uniform margin.
#[derive(Debug, Clone)]
pub struct GridLayout {
    config: LayoutConfig,
}

impl GridLayout {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn columns(&self) -> u32 {
        self.config.columns.max(1)
    }

    pub fn rows(&self, panel_count: usize) -> u32 {
        u32::try_from(panel_count)
            .unwrap_or(u32::MAX)
            .div_ceil(self.columns())
    }

    /// Total composite size for `panel_count` panels, or `None` if it
    /// doesn't fit in `u32`
    pub fn canvas_size(&self, panel_count: usize) -> Option<(u32, u32)> {
        let c = &self.config;
        let cols = self.columns();
        let rows = u32::try_from(panel_count).ok()?.div_ceil(cols);

        let width = (c.margin.checked_mul(2)?)
            .checked_add(c.panel_width.checked_mul(cols)?)?
            .checked_add(c.padding.checked_mul(cols - 1)?)?;
        let row_height = c.panel_height.checked_add(c.text_height)?;
        let height = (c.margin.checked_mul(2)?)
            .checked_add(c.title_height)?
            .checked_add(row_height.checked_mul(rows)?)?
            .checked_add(c.padding.checked_mul(rows.saturating_sub(1))?)?;
        Some((width, height))
    }

    /// Top-left corner of the cell at `index` (row-major). Saturates instead
    /// of overflowing; cells of a layout whose [`GridLayout::canvas_size`] is
    /// `Some` never saturate.
    pub fn cell_origin(&self, index: usize) -> (u32, u32) {
        let c = &self.config;
        let column = index as u32 % self.columns();
        let row = index as u32 / self.columns();
        let x = c
            .margin
            .saturating_add(column.saturating_mul(c.panel_width.saturating_add(c.padding)));
        let row_pitch = c
            .panel_height
            .saturating_add(c.text_height)
            .saturating_add(c.padding);
        let y = c
            .margin
            .saturating_add(c.title_height)
            .saturating_add(row.saturating_mul(row_pitch));
        (x, y)
    }

    pub fn cell(&self, index: usize) -> CellGeometry {
        let c = &self.config;
        let (x, y) = self.cell_origin(index);
        CellGeometry {
            column: index as u32 % self.columns(),
            row: index as u32 / self.columns(),
            image: PixelRect {
                x,
                y,
                width: c.panel_width,
                height: c.panel_height,
            },
            caption_baseline: y.saturating_add(c.panel_height).saturating_add(c.caption_offset),
            caption_center_x: x.saturating_add(c.panel_width / 2),
        }
    }

    /// Baseline of the title line
    pub fn title_baseline(&self) -> u32 {
        self.config.margin.saturating_add(self.config.title_baseline)
    }
}
