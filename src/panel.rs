use egui::{Color32, Pos2};

use crate::error::ExportError;
use crate::export::encode_png;
use crate::fill::{self, FillOutcome};
use crate::history::SnapshotHistory;
use crate::story::StoryBeat;
use crate::stroke::StrokeSession;
use crate::surface::{BACKGROUND, RasterSurface};
use crate::tools::{Tool, ToolMode};

/// One drawable comic frame: its caption, drawing guidance, pixels and history.
///
/// All editing goes through the panel so that every completed stroke, fill
/// and clear records exactly one snapshot.
#[derive(Debug)]
pub struct Panel {
    id: usize,
    caption: String,
    guidance: String,
    surface: RasterSurface,
    history: SnapshotHistory,
    stroke: Option<StrokeSession>,
}

impl Panel {
    /// Creates a blank panel; `id` is 1-based and never changes
    pub fn new(id: usize, beat: StoryBeat, width: u32, height: u32) -> Self {
        let surface = RasterSurface::new(width, height);
        let history = SnapshotHistory::new(&surface);
        Self {
            id,
            caption: beat.caption,
            guidance: beat.guidance,
            surface,
            history,
            stroke: None,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn guidance(&self) -> &str {
        &self.guidance
    }

    pub fn surface(&self) -> &RasterSurface {
        &self.surface
    }

    pub fn history(&self) -> &SnapshotHistory {
        &self.history
    }

    /// Whether a drag gesture is in progress
    pub fn is_drawing(&self) -> bool {
        self.stroke.is_some()
    }

    /// Pointer down. Fill mode fills immediately; every other mode draws a
    /// dot and starts a stroke that [`Panel::end_stroke`] will record.
    pub fn begin_stroke(&mut self, point: Pos2, tool: &Tool) {
        // A gesture whose pointer-up never arrived still counts as one action
        self.end_stroke();

        if tool.mode() == ToolMode::Fill {
            self.fill_at(point, tool.color());
            return;
        }
        self.stroke = Some(StrokeSession::begin(&mut self.surface, point, *tool));
    }

    /// Pointer move. Ignored unless a stroke is in progress.
    pub fn continue_stroke(&mut self, point: Pos2) {
        if let Some(stroke) = &mut self.stroke {
            stroke.extend(&mut self.surface, point);
        }
    }

    /// Pointer up (or leave). Records the finished stroke; returns false if
    /// no stroke was in progress.
    pub fn end_stroke(&mut self) -> bool {
        match self.stroke.take() {
            Some(stroke) => {
                log::debug!(
                    "Panel {}: {} stroke finished after {} segment(s)",
                    self.id,
                    stroke.tool().mode().name(),
                    stroke.segments()
                );
                self.history.record(&self.surface);
                true
            }
            None => false,
        }
    }

    /// Flood fills from `point`. Records a snapshot only if pixels changed.
    pub fn fill_at(&mut self, point: Pos2, color: Color32) -> FillOutcome {
        let outcome = fill::flood_fill(&mut self.surface, point, color);
        if outcome.changed() {
            self.history.record(&self.surface);
        }
        outcome
    }

    /// Repaints the panel white as a regular undoable action
    pub fn clear(&mut self) {
        self.end_stroke();
        self.surface.fill(BACKGROUND);
        self.history.record(&self.surface);
    }

    pub fn undo(&mut self) -> bool {
        self.end_stroke();
        self.history.undo(&mut self.surface)
    }

    pub fn redo(&mut self) -> bool {
        self.end_stroke();
        self.history.redo(&mut self.surface)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Serializes the current pixels as PNG
    pub fn export_raster(&self) -> Result<Vec<u8>, ExportError> {
        encode_png(self.surface.image())
    }
}
