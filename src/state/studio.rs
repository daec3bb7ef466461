use egui::{Color32, Pos2, Rect};
use std::cell::OnceCell;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::StudioConfig;
use crate::error::{ExportError, StudioError};
use crate::export::{self, Compositor, DEFAULT_TITLE, ExportEvent, RasterDecoder, Typeface};
use crate::input;
use crate::panel::Panel;
use crate::story::{self, StoryBeat, StoryGenerator};
use crate::tools::{Tool, ToolMode, parse_hex_color_or_black};
use crate::util::time::timestamp_millis;

/// Refers to one panel of one particular story.
///
/// Handles stop resolving once a new story replaces the panels they were
/// taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PanelHandle {
    story: Uuid,
    index: usize,
}

impl PanelHandle {
    pub fn story(&self) -> Uuid {
        self.story
    }

    /// Zero-based position in the story
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Top-level application state: the current story's panels, which one is
/// selected, the drawing tool and the comic title.
#[derive(Debug)]
pub struct Studio {
    config: StudioConfig,
    story_id: Option<Uuid>,
    panels: Vec<Panel>,
    active: Option<usize>,
    tool: Tool,
    title: String,
    /// Loaded on first export and reused so glyphs stay cached
    typeface: OnceCell<Typeface>,
}

impl Default for Studio {
    fn default() -> Self {
        Self::new(StudioConfig::default())
    }
}

impl Studio {
    pub fn new(config: StudioConfig) -> Self {
        if let Err(e) = config.validate() {
            log::warn!("Studio created with unusable config: {}", e);
        }
        Self {
            config,
            story_id: None,
            panels: Vec::new(),
            active: None,
            tool: Tool::default(),
            title: DEFAULT_TITLE.to_owned(),
            typeface: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn story_id(&self) -> Option<Uuid> {
        self.story_id
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    /// Handles for every panel of the current story, in order
    pub fn handles(&self) -> Vec<PanelHandle> {
        match self.story_id {
            Some(story) => (0..self.panels.len())
                .map(|index| PanelHandle { story, index })
                .collect(),
            None => Vec::new(),
        }
    }

    /// Replaces all panels with blank ones built from `beats`.
    ///
    /// A story of the wrong length is rejected and the current panels are
    /// kept. On success the selection is dropped and the title reset.
    pub fn install_story(&mut self, beats: Vec<StoryBeat>) -> Result<(), StudioError> {
        story::validate_beats(&beats, self.config.panel_count)?;

        let (width, height) = (self.config.panel_width, self.config.panel_height);
        self.panels = beats
            .into_iter()
            .enumerate()
            .map(|(i, beat)| Panel::new(i + 1, beat, width, height))
            .collect();

        let story = Uuid::new_v4();
        self.story_id = Some(story);
        self.active = None;
        self.title = DEFAULT_TITLE.to_owned();
        log::info!("Installed story {} with {} panels", story, self.panels.len());
        Ok(())
    }

    /// Asks `generator` for a new story and installs it.
    ///
    /// Any failure leaves the current panels untouched.
    pub async fn generate_story<G: StoryGenerator>(
        &mut self,
        generator: &G,
    ) -> Result<(), StudioError> {
        let beats = match generator.generate().await {
            Ok(beats) => beats,
            Err(e) => {
                log::warn!("Story generation failed: {}", e);
                return Err(e.into());
            }
        };
        self.install_story(beats)
    }

    pub fn panel(&self, handle: PanelHandle) -> Result<&Panel, StudioError> {
        let index = self.resolve(handle)?;
        Ok(&self.panels[index])
    }

    fn resolve(&self, handle: PanelHandle) -> Result<usize, StudioError> {
        if self.story_id == Some(handle.story) && handle.index < self.panels.len() {
            Ok(handle.index)
        } else {
            log::warn!("Ignoring stale handle for panel {}", handle.index + 1);
            Err(StudioError::StalePanel(handle.index))
        }
    }

    fn panel_mut(&mut self, handle: PanelHandle) -> Result<&mut Panel, StudioError> {
        let index = self.resolve(handle)?;
        Ok(&mut self.panels[index])
    }

    pub fn select_panel(&mut self, handle: PanelHandle) -> Result<(), StudioError> {
        let index = self.resolve(handle)?;
        self.active = Some(index);
        Ok(())
    }

    pub fn deselect(&mut self) {
        self.active = None;
    }

    pub fn active_handle(&self) -> Option<PanelHandle> {
        let story = self.story_id?;
        self.active.map(|index| PanelHandle { story, index })
    }

    pub fn active_panel(&self) -> Option<&Panel> {
        self.active.map(|index| &self.panels[index])
    }

    fn active_panel_mut(&mut self) -> Result<&mut Panel, StudioError> {
        match self.active {
            Some(index) => Ok(&mut self.panels[index]),
            None => Err(StudioError::NoActivePanel),
        }
    }

    pub fn clear_active(&mut self) -> Result<(), StudioError> {
        self.active_panel_mut()?.clear();
        Ok(())
    }

    /// Returns whether there was anything to undo
    pub fn undo_active(&mut self) -> Result<bool, StudioError> {
        Ok(self.active_panel_mut()?.undo())
    }

    /// Returns whether there was anything to redo
    pub fn redo_active(&mut self) -> Result<bool, StudioError> {
        Ok(self.active_panel_mut()?.redo())
    }

    /// Clears every panel; each clear is undoable on its own panel
    pub fn clear_all(&mut self) {
        for panel in &mut self.panels {
            panel.clear();
        }
    }

    pub fn tool(&self) -> &Tool {
        &self.tool
    }

    pub fn set_tool_mode(&mut self, mode: ToolMode) {
        self.tool.set_mode(mode);
    }

    pub fn set_tool_color(&mut self, color: Color32) {
        self.tool.set_color(color);
    }

    /// Accepts `#rrggbb`; anything else selects black
    pub fn set_tool_color_hex(&mut self, hex: &str) {
        self.tool.set_color(parse_hex_color_or_black(hex));
    }

    pub fn set_tool_width(&mut self, width: f32) {
        self.tool.set_width(width);
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Pointer pressed on the panel displayed at `display`. Selects the
    /// panel and starts a stroke (or fills) with the current tool.
    pub fn pointer_down(
        &mut self,
        handle: PanelHandle,
        screen: Pos2,
        display: Rect,
    ) -> Result<(), StudioError> {
        let index = self.resolve(handle)?;
        self.active = Some(index);

        let tool = self.tool;
        let panel = &mut self.panels[index];
        if let Some(point) = input::to_panel_space(screen, display, panel.surface().size()) {
            panel.begin_stroke(point, &tool);
        }
        Ok(())
    }

    pub fn pointer_move(
        &mut self,
        handle: PanelHandle,
        screen: Pos2,
        display: Rect,
    ) -> Result<(), StudioError> {
        let panel = self.panel_mut(handle)?;
        if let Some(point) = input::to_panel_space(screen, display, panel.surface().size()) {
            panel.continue_stroke(point);
        }
        Ok(())
    }

    /// Pointer released or left the panel
    pub fn pointer_up(&mut self, handle: PanelHandle) -> Result<(), StudioError> {
        self.panel_mut(handle)?.end_stroke();
        Ok(())
    }

    fn compositor(&self) -> Result<Compositor, ExportError> {
        let typeface = match self.typeface.get() {
            Some(typeface) => typeface.clone(),
            None => {
                let typeface = Typeface::load(self.config.export.font_path.as_deref())?;
                self.typeface.get_or_init(|| typeface).clone()
            }
        };
        Ok(Compositor::with_typeface(&self.config.export, typeface))
    }

    /// Composites the current story into PNG bytes
    pub async fn export(&self) -> Result<Vec<u8>, StudioError> {
        let compositor = self.compositor()?;
        let image = compositor.compose(&self.panels, &self.title).await?;
        Ok(export::encode_png(&image)?)
    }

    /// Like [`Studio::export`], with a custom decoder and progress observer
    pub async fn export_with<D, F>(&self, decoder: &D, observer: F) -> Result<Vec<u8>, StudioError>
    where
        D: RasterDecoder,
        F: FnMut(ExportEvent),
    {
        let compositor = self.compositor()?;
        let image = compositor
            .compose_with(&self.panels, &self.title, decoder, observer)
            .await?;
        Ok(export::encode_png(&image)?)
    }

    /// Exports and writes `<prefix>-<millis>.png` into `dir`
    pub async fn export_to_dir(&self, dir: impl AsRef<Path>) -> Result<PathBuf, StudioError> {
        let png = self.export().await?;
        let prefix = &self.config.export.file_prefix;
        Ok(export::write_export(dir, prefix, timestamp_millis(), &png)?)
    }
}
