//! Contract with the external story generator.
//!
//! The generator produces an ordered list of beats, one per panel. This module
//! only defines the shape of that list and how to read the generator's JSON
//! response; producing the story is someone else's job.

use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::error::StoryError;

/// Caption and drawing guidance for one panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryBeat {
    /// Narration or dialogue shown under the panel
    #[serde(rename = "text")]
    pub caption: String,
    /// What the user is asked to draw
    #[serde(rename = "sceneDescription")]
    pub guidance: String,
}

impl StoryBeat {
    pub fn new(caption: impl Into<String>, guidance: impl Into<String>) -> Self {
        Self {
            caption: caption.into(),
            guidance: guidance.into(),
        }
    }
}

/// Anything that can produce a story, typically a network-backed text model
pub trait StoryGenerator {
    fn generate(&self) -> impl Future<Output = Result<Vec<StoryBeat>, StoryError>>;
}

/// Parses the generator's JSON response: an array of `{text, sceneDescription}`
pub fn parse_story_response(body: &str) -> Result<Vec<StoryBeat>, StoryError> {
    if body.trim().is_empty() {
        return Err(StoryError::EmptyResponse);
    }
    let beats: Vec<StoryBeat> = serde_json::from_str(body).map_err(|e| {
        log::error!("Failed to parse story JSON: {}", e);
        StoryError::from(e)
    })?;
    Ok(beats)
}

/// Rejects a story whose length doesn't match the number of panels
pub fn validate_beats(beats: &[StoryBeat], expected: usize) -> Result<(), StoryError> {
    if beats.len() != expected {
        return Err(StoryError::UnexpectedPanelCount {
            expected,
            actual: beats.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response() {
        let body = r#"[
            {"text": "A fox finds a key.", "sceneDescription": "Fox in a forest"},
            {"text": "The key opens a door.", "sceneDescription": "Door in a tree"}
        ]"#;
        let beats = parse_story_response(body).unwrap();
        assert_eq!(beats.len(), 2);
        assert_eq!(beats[0].caption, "A fox finds a key.");
        assert_eq!(beats[1].guidance, "Door in a tree");
    }

    #[test]
    fn test_parse_empty_and_malformed() {
        assert!(matches!(parse_story_response("  "), Err(StoryError::EmptyResponse)));
        assert!(matches!(parse_story_response("{nope"), Err(StoryError::Malformed(_))));
        assert!(matches!(
            parse_story_response(r#"[{"text": "missing guidance"}]"#),
            Err(StoryError::Malformed(_))
        ));
    }

    #[test]
    fn test_validate_count() {
        let beats = vec![StoryBeat::new("a", "b"); 3];
        assert!(validate_beats(&beats, 3).is_ok());
        assert!(matches!(
            validate_beats(&beats, 4),
            Err(StoryError::UnexpectedPanelCount {
                expected: 4,
                actual: 3
            })
        ));
    }
}
