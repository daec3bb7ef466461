//! Composite export: lays every panel out on one page with a title and
//! wrapped captions, then encodes the result as PNG.

pub mod compositor;
pub mod layout;
pub mod text;

use image::{ImageFormat, RgbaImage};
use std::fs::{self, OpenOptions};
use std::io::{Cursor, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::ExportError;

pub use compositor::{Compositor, ExportEvent, MAX_CANVAS_PIXELS, PngDecoder, RasterDecoder};
pub use layout::{CellGeometry, GridLayout, PixelRect};
pub use text::{MeasureText, Typeface, wrap_text};

/// Title used when the user leaves it empty
pub const DEFAULT_TITLE: &str = "My Magical Comic Adventure";

/// Encodes an RGBA image as PNG bytes
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, ImageFormat::Png)
        .map_err(ExportError::Encode)?;
    Ok(bytes.into_inner())
}

/// `<prefix>-<millis>.png`
pub fn export_file_name(prefix: &str, millis: u64) -> String {
    format!("{prefix}-{millis}.png")
}

/// Writes `png` into `dir` as `<prefix>-<millis>.png`.
///
/// An existing file is never overwritten: on a name clash the timestamp is
/// bumped until a free name is found.
pub fn write_export(
    dir: impl AsRef<Path>,
    prefix: &str,
    millis: u64,
    png: &[u8],
) -> Result<PathBuf, ExportError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let mut stamp = millis;
    loop {
        let path = dir.join(export_file_name(prefix, stamp));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(png)?;
                log::info!("Exported comic to {}", path.display());
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                log::debug!("{} exists, trying next name", path.display());
                stamp += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
}
