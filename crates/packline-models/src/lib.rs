//! Shared data models for the Packline backend.
//!
//! This crate provides Serde-serializable types for:
//! - Queue messages popped from the broker (with validation)
//! - Encode job descriptions fetched from the transcoder
//! - Package inputs handed to the packaging engine

pub mod job;
pub mod message;
pub mod package;

// Re-export common types
pub use job::{AudioStream, EncodeInput, EncodeJob, JobStatus, Output, OutputType, VideoStream};
pub use message::{MessageError, QueueMessage};
pub use package::{InputType, PackageInput, StreamKeyTemplates};
