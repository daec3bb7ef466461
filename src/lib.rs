#![warn(clippy::all, rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod export;
pub mod fill;
pub mod history;
pub mod input;
pub mod panel;
pub mod state;
pub mod story;
pub mod stroke;
pub mod surface;
pub mod tools;
pub mod util;

pub use config::{ExportConfig, LayoutConfig, StudioConfig};
pub use error::{ConfigError, ExportError, StoryError, StudioError};
pub use export::{Compositor, ExportEvent, PngDecoder, RasterDecoder};
pub use fill::{FillOutcome, flood_fill};
pub use history::SnapshotHistory;
pub use input::{InputLocation, to_panel_space};
pub use panel::Panel;
pub use state::{PanelHandle, Studio};
pub use story::{StoryBeat, StoryGenerator};
pub use stroke::{StrokeSession, render_segment};
pub use surface::{RasterSurface, Snapshot};
pub use tools::{Tool, ToolMode};
