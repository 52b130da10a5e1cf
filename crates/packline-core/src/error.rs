//! Core error types.

use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Job not successful or without outputs. Terminal for that job.
    #[error("invalid job state: {0}")]
    InvalidJobState(String),

    /// Path templates cannot be resolved without a first input.
    #[error("encode job has no inputs")]
    NoInputs,

    /// Job description or input retrieval failed. Terminal for that job.
    #[error("failed to fetch encode job: {0}")]
    Fetch(String),

    #[error("invalid destination: {0}")]
    InvalidDestination(String),

    /// The packaging engine reported a failure.
    #[error("packaging failed: {0}")]
    PackageFailed(String),

    #[error("no MPEG-4 video outputs in encode job")]
    NoMp4Outputs,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    pub fn invalid_job_state(msg: impl Into<String>) -> Self {
        Self::InvalidJobState(msg.into())
    }

    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    pub fn package_failed(msg: impl Into<String>) -> Self {
        Self::PackageFailed(msg.into())
    }
}
