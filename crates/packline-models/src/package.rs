//! Package input artifacts produced by stream selection.

use serde::{Deserialize, Serialize};

/// Type tag of a selected package input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Video,
    Audio,
}

/// One selected media rendition, keyed for downstream manifest generation.
///
/// Order is significant: video inputs always precede audio inputs, and keys
/// are unique within one job's result set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageInput {
    #[serde(rename = "type")]
    pub kind: InputType,
    pub key: String,
    pub filename: String,
}

impl PackageInput {
    pub fn video(key: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            kind: InputType::Video,
            key: key.into(),
            filename: filename.into(),
        }
    }

    pub fn audio(key: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            kind: InputType::Audio,
            key: key.into(),
            filename: filename.into(),
        }
    }
}

/// Key templates for selected streams, with `$VIDEOIDX$`, `$AUDIOIDX$`,
/// `$TOTALIDX$` and `$BITRATE$` placeholders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreamKeyTemplates {
    pub video: String,
    pub audio: String,
}

impl Default for StreamKeyTemplates {
    fn default() -> Self {
        Self {
            video: "$VIDEOIDX$_$BITRATE$".to_string(),
            audio: "$AUDIOIDX$".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_type_tag_lowercase() {
        let input = PackageInput::video("0_2980", "/data/out/a.mp4");
        let json = serde_json::to_string(&input).unwrap();
        assert!(json.contains(r#""type":"video""#));
    }

    #[test]
    fn default_templates() {
        let templates = StreamKeyTemplates::default();
        assert_eq!(templates.video, "$VIDEOIDX$_$BITRATE$");
        assert_eq!(templates.audio, "$AUDIOIDX$");
    }
}
