//! Placeholder substitution for stream keys, paths and manifest names.

use std::path::Path;

use packline_models::EncodeJob;

use crate::error::{CoreError, CoreResult};

pub const JOBID: &str = "$JOBID$";
pub const EXTERNALID: &str = "$EXTERNALID$";
pub const INPUTNAME: &str = "$INPUTNAME$";
pub const VIDEOIDX: &str = "$VIDEOIDX$";
pub const AUDIOIDX: &str = "$AUDIOIDX$";
pub const TOTALIDX: &str = "$TOTALIDX$";
pub const BITRATE: &str = "$BITRATE$";

/// Literal, non-recursive substitution of every occurrence of each bound
/// placeholder. Unknown placeholders are left untouched; call sites own the
/// placeholder set, this function substitutes whatever map it is given.
pub fn resolve<'a, I>(template: &str, bindings: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut resolved = template.to_string();
    for (placeholder, value) in bindings {
        resolved = resolved.replace(placeholder, value);
    }
    resolved
}

/// Index/bitrate values for a stream key template.
#[derive(Debug, Clone, Copy)]
pub struct KeyValues {
    pub video_idx: usize,
    pub audio_idx: usize,
    pub total_idx: usize,
    pub bitrate_kb: u64,
}

/// Resolve a stream key template against index and bitrate values.
pub fn stream_key(template: &str, values: KeyValues) -> String {
    let video_idx = values.video_idx.to_string();
    let audio_idx = values.audio_idx.to_string();
    let total_idx = values.total_idx.to_string();
    let bitrate = values.bitrate_kb.to_string();
    resolve(
        template,
        [
            (VIDEOIDX, video_idx.as_str()),
            (AUDIOIDX, audio_idx.as_str()),
            (TOTALIDX, total_idx.as_str()),
            (BITRATE, bitrate.as_str()),
        ],
    )
}

/// Resolve a path template (`$JOBID$`, `$EXTERNALID$`, `$INPUTNAME$`)
/// against a job.
///
/// `$INPUTNAME$` is always the first input's basename with the extension
/// stripped; `external_id` is only consulted by the `$EXTERNALID$`
/// placeholder, never as a fallback for `$INPUTNAME$`.
pub fn resolve_job_template(template: &str, job: &EncodeJob) -> CoreResult<String> {
    let input = job.inputs.first().ok_or(CoreError::NoInputs)?;
    let input_name = basename_without_extension(&input.uri);
    let external_id = job.external_id.as_deref().unwrap_or("");
    Ok(resolve(
        template,
        [
            (EXTERNALID, external_id),
            (JOBID, job.id.as_str()),
            (INPUTNAME, input_name.as_str()),
        ],
    ))
}

fn basename_without_extension(uri: &str) -> String {
    Path::new(uri)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
