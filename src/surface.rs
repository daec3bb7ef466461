use image::{Rgba, RgbaImage};
use std::fmt;

/// Background colour every surface starts with and that the eraser paints.
pub const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Number of bytes per pixel (R, G, B, A)
pub const CHANNELS: usize = 4;

/// Immutable capture of a surface's full pixel state.
///
/// Snapshots are only created by [`RasterSurface::snapshot`] and never change
/// afterwards; restoring one copies its bytes back into the surface.
#[derive(Clone, PartialEq, Eq)]
pub struct Snapshot {
    width: u32,
    height: u32,
    pixels: Box<[u8]>,
}

impl Snapshot {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

// Pixel dumps are useless in test output
impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

/// Fixed-resolution RGBA pixel buffer owned by one panel.
///
/// The dimensions are set once in [`RasterSurface::new`]; there is no resize.
#[derive(Clone)]
pub struct RasterSurface {
    image: RgbaImage,
}

impl RasterSurface {
    /// Creates a surface of the given size, fully opaque white
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, BACKGROUND),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn size(&self) -> [u32; 2] {
        [self.image.width(), self.image.height()]
    }

    /// Raw RGBA bytes, row-major
    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Captures the current pixel state
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            width: self.width(),
            height: self.height(),
            pixels: self.image.as_raw().clone().into_boxed_slice(),
        }
    }

    /// Overwrites the whole buffer with a snapshot's content.
    ///
    /// Returns false (and leaves the surface untouched) if the snapshot was
    /// taken from a surface of different dimensions.
    pub fn restore(&mut self, snapshot: &Snapshot) -> bool {
        if snapshot.width != self.width() || snapshot.height != self.height() {
            log::warn!(
                "Refusing to restore {}x{} snapshot into {}x{} surface",
                snapshot.width,
                snapshot.height,
                self.width(),
                self.height()
            );
            return false;
        }
        let raw: &mut [u8] = &mut self.image;
        raw.copy_from_slice(&snapshot.pixels);
        true
    }

    /// Whether signed pixel coordinates fall inside the buffer
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < i64::from(self.width()) && y < i64::from(self.height())
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        if x < self.width() && y < self.height() {
            Some(*self.image.get_pixel(x, y))
        } else {
            None
        }
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, color: Rgba<u8>) {
        if x < self.width() && y < self.height() {
            self.image.put_pixel(x, y, color);
        }
    }

    /// Source-over composite of `color` at `opacity` onto one pixel.
    /// An opacity of 1.0 (or more) replaces the pixel outright.
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: Rgba<u8>, opacity: f32) {
        if x >= self.width() || y >= self.height() {
            return;
        }
        if opacity >= 1.0 {
            self.image.put_pixel(x, y, color);
            return;
        }
        let alpha = opacity.max(0.0);
        let dst = self.image.get_pixel_mut(x, y);
        for c in 0..CHANNELS {
            let src = if c == 3 { 255.0 } else { f32::from(color.0[c]) };
            let out = src * alpha + f32::from(dst.0[c]) * (1.0 - alpha);
            dst.0[c] = out.round().clamp(0.0, 255.0) as u8;
        }
    }

    /// Paints every pixel with one colour
    pub fn fill(&mut self, color: Rgba<u8>) {
        for pixel in self.image.pixels_mut() {
            *pixel = color;
        }
    }

    /// Mutable access to the raw bytes for whole-buffer algorithms
    pub(crate) fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.image
    }
}

impl fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterSurface")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_surface_is_opaque_white() {
        let surface = RasterSurface::new(8, 6);
        assert_eq!(surface.size(), [8, 6]);
        assert_eq!(surface.pixels().len(), 8 * 6 * CHANNELS);
        assert!(surface.pixels().iter().all(|&b| b == 255));
    }

    #[test]
    fn test_out_of_bounds_access_is_ignored() {
        let mut surface = RasterSurface::new(4, 4);
        surface.put_pixel(4, 0, Rgba([0, 0, 0, 255]));
        surface.put_pixel(0, 99, Rgba([0, 0, 0, 255]));
        assert_eq!(surface.get_pixel(4, 0), None);
        assert!(surface.pixels().iter().all(|&b| b == 255));
        assert!(!surface.contains(-1, 0));
        assert!(surface.contains(3, 3));
    }

    #[test]
    fn test_snapshot_restore() {
        let mut surface = RasterSurface::new(4, 4);
        let blank = surface.snapshot();

        surface.put_pixel(1, 2, Rgba([10, 20, 30, 255]));
        let marked = surface.snapshot();
        assert_ne!(blank, marked);

        assert!(surface.restore(&blank));
        assert_eq!(surface.pixels(), blank.pixels());

        assert!(surface.restore(&marked));
        assert_eq!(surface.get_pixel(1, 2), Some(Rgba([10, 20, 30, 255])));
    }

    #[test]
    fn test_restore_rejects_mismatched_dimensions() {
        let mut surface = RasterSurface::new(4, 4);
        let other = RasterSurface::new(2, 2).snapshot();
        assert!(!surface.restore(&other));
        assert_eq!(surface.size(), [4, 4]);
    }

    #[test]
    fn test_half_opacity_blend_over_white() {
        let mut surface = RasterSurface::new(1, 1);
        surface.blend_pixel(0, 0, Rgba([0, 0, 0, 255]), 0.5);
        assert_eq!(surface.get_pixel(0, 0), Some(Rgba([128, 128, 128, 255])));

        // A second pass darkens further
        surface.blend_pixel(0, 0, Rgba([0, 0, 0, 255]), 0.5);
        assert_eq!(surface.get_pixel(0, 0), Some(Rgba([64, 64, 64, 255])));
    }
}
