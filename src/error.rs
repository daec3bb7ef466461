use thiserror::Error;

/// Failures of the story-generation collaborator or of its response
#[derive(Debug, Error)]
pub enum StoryError {
    #[error("No content generated")]
    EmptyResponse,

    #[error("Failed to process story data: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Expected {expected} story panels, got {actual}")]
    UnexpectedPanelCount { expected: usize, actual: usize },

    #[error("Story generation failed: {0}")]
    Generator(String),
}

/// Errors that can occur while compositing or writing the export image
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("There are no panels to export")]
    NoPanels,

    #[error("Layout for {panels} panels is too large to render")]
    CanvasTooLarge { panels: usize },

    #[error("Failed to decode panel {index}: {source}")]
    Decode {
        index: usize,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Failed to load font: {0}")]
    Font(String),

    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced to the user by the top-level controller
#[derive(Debug, Error)]
pub enum StudioError {
    #[error("Select a panel first")]
    NoActivePanel,

    #[error("Panel {0} does not belong to the current story")]
    StalePanel(usize),

    #[error(transparent)]
    Story(#[from] StoryError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
