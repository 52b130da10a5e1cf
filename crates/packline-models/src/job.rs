//! Encode job description as served by the transcoder.

use serde::{Deserialize, Serialize};

/// Lifecycle state of an encode job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    New,
    Queued,
    InProgress,
    Successful,
    Failed,
    Cancelled,
    /// Statuses introduced by newer transcoder versions.
    #[serde(other)]
    Unknown,
}

/// A finished transcoding job, fetched by dereferencing `QueueMessage.url`.
///
/// Read-only within the worker; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodeJob {
    pub id: String,
    /// Caller-supplied id, only consulted by the `$EXTERNALID$` placeholder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    pub status: JobStatus,
    /// Media outputs produced by the transcoder. Absent until the job finishes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Vec<Output>>,
    #[serde(default)]
    pub inputs: Vec<EncodeInput>,
}

/// Source media reference of an encode job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodeInput {
    pub uri: String,
}

/// Media file type of an encoder output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OutputType {
    VideoFile,
    AudioFile,
    #[serde(other)]
    Other,
}

/// One media file produced by the transcoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Output {
    #[serde(rename = "type")]
    pub kind: OutputType,
    #[serde(default)]
    pub format: String,
    pub file: String,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub overall_bitrate: u64,
    #[serde(default)]
    pub video_streams: Vec<VideoStream>,
    #[serde(default)]
    pub audio_streams: Vec<AudioStream>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoStream {
    #[serde(default)]
    pub codec: String,
    #[serde(default)]
    pub bitrate: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioStream {
    #[serde(default)]
    pub codec: String,
    #[serde(default)]
    pub bitrate: u64,
    #[serde(default)]
    pub channels: u32,
}

impl Output {
    /// Whether this output carries at least one stereo audio stream.
    pub fn has_stereo_audio(&self) -> bool {
        self.audio_streams.iter().any(|a| a.channels == 2)
    }
}
