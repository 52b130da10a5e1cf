//! Output destination resolution.

use std::path::Path;

use packline_models::EncodeJob;
use url::Url;

use crate::error::{CoreError, CoreResult};
use crate::template::resolve_job_template;

/// Compute the final output location for a job.
///
/// An `s3:`-prefixed output root is joined with the resolved subfolder by
/// plain string concatenation and re-parsed as a URL; anything else is a
/// local path join.
pub fn resolve_destination(
    job: &EncodeJob,
    output_root: &str,
    subfolder_template: &str,
) -> CoreResult<String> {
    let subfolder = resolve_job_template(subfolder_template, job)?;
    if output_root.starts_with("s3:") {
        let url = Url::parse(&format!("{output_root}{subfolder}"))
            .map_err(|e| CoreError::InvalidDestination(e.to_string()))?;
        Ok(url.to_string())
    } else {
        Ok(Path::new(output_root)
            .join(subfolder)
            .to_string_lossy()
            .into_owned())
    }
}
