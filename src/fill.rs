use egui::{Color32, Pos2};
use image::Rgba;

use crate::surface::{CHANNELS, RasterSurface};
use crate::tools::{parse_hex_color_or_black, to_rgba};

/// What a flood fill did to the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOutcome {
    /// The region was recoloured
    Filled { pixels: usize },
    /// The seed already had the fill colour; nothing changed
    AlreadyFilled,
    /// The seed lies outside the surface; nothing changed
    OutOfBounds,
}

impl FillOutcome {
    /// Whether the surface was modified (and therefore needs a snapshot)
    pub fn changed(&self) -> bool {
        matches!(self, FillOutcome::Filled { .. })
    }
}

/// Recolours the 4-connected region of pixels exactly matching the seed's colour.
///
/// Seed coordinates are truncated to whole pixels. Matching compares all four
/// channels against the colour captured at the seed before any pixel is
/// written. Uses an explicit stack of column seeds: each popped seed climbs
/// to the top of its vertical run, then walks down painting, and queues the
/// left/right neighbour columns once per contiguous matching stretch.
pub fn flood_fill(surface: &mut RasterSurface, seed: Pos2, fill: Color32) -> FillOutcome {
    fill_rgba(surface, seed, to_rgba(fill))
}

/// [`flood_fill`] taking a `#rrggbb` colour; malformed input fills with black
pub fn flood_fill_hex(surface: &mut RasterSurface, seed: Pos2, fill: &str) -> FillOutcome {
    flood_fill(surface, seed, parse_hex_color_or_black(fill))
}

fn fill_rgba(surface: &mut RasterSurface, seed: Pos2, fill: Rgba<u8>) -> FillOutcome {
    if !seed.is_finite() {
        return FillOutcome::OutOfBounds;
    }
    let seed_x = seed.x.floor() as i64;
    let seed_y = seed.y.floor() as i64;
    if !surface.contains(seed_x, seed_y) {
        log::debug!("Fill seed ({}, {}) outside surface", seed.x, seed.y);
        return FillOutcome::OutOfBounds;
    }

    let width = surface.width() as usize;
    let height = surface.height() as usize;
    let (seed_x, seed_y) = (seed_x as usize, seed_y as usize);

    let data = surface.pixels_mut();
    let target = pixel_at(data, seed_y * width + seed_x);
    if target == fill.0 {
        return FillOutcome::AlreadyFilled;
    }

    let mut stack: Vec<(usize, usize)> = vec![(seed_x, seed_y)];
    let mut painted = 0usize;

    while let Some((x, mut y)) = stack.pop() {
        while y > 0 && pixel_at(data, (y - 1) * width + x) == target {
            y -= 1;
        }

        let mut reach_left = false;
        let mut reach_right = false;

        while y < height && pixel_at(data, y * width + x) == target {
            let idx = y * width + x;
            data[idx * CHANNELS..(idx + 1) * CHANNELS].copy_from_slice(&fill.0);
            painted += 1;

            if x > 0 {
                if pixel_at(data, idx - 1) == target {
                    if !reach_left {
                        stack.push((x - 1, y));
                        reach_left = true;
                    }
                } else {
                    reach_left = false;
                }
            }

            if x + 1 < width {
                if pixel_at(data, idx + 1) == target {
                    if !reach_right {
                        stack.push((x + 1, y));
                        reach_right = true;
                    }
                } else {
                    reach_right = false;
                }
            }

            y += 1;
        }
    }

    log::debug!("Flood fill from ({seed_x}, {seed_y}) painted {painted} pixels");
    FillOutcome::Filled { pixels: painted }
}

#[inline(always)]
fn pixel_at(data: &[u8], idx: usize) -> [u8; 4] {
    let o = idx * CHANNELS;
    [data[o], data[o + 1], data[o + 2], data[o + 3]]
}
