//! Shaka packager subprocess adapter.
//!
//! Thin boundary implementation of [`PackageEngine`]: builds one stream
//! descriptor per package input plus the manifest output flags and shells out
//! to the shaka packager executable. The engine itself is an external
//! collaborator; nothing here inspects media.

use std::process::Stdio;

use async_trait::async_trait;
use packline_models::{InputType, PackageInput};
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{CoreError, CoreResult};
use crate::packager::{PackageEngine, PackageSpec};

const DEFAULT_EXECUTABLE: &str = "packager";
const DEFAULT_DASH_MANIFEST: &str = "manifest.mpd";
const DEFAULT_HLS_MANIFEST: &str = "index.m3u8";

pub struct ShakaPackager {
    executable: String,
}

impl ShakaPackager {
    pub fn new(executable: Option<String>) -> Self {
        Self {
            executable: executable.unwrap_or_else(|| DEFAULT_EXECUTABLE.to_string()),
        }
    }

    fn stream_descriptor(input: &PackageInput, destination: &str) -> String {
        let stream = match input.kind {
            InputType::Video => "video",
            InputType::Audio => "audio",
        };
        format!(
            "in={},stream={},init_segment={dest}/{key}/init.mp4,segment_template={dest}/{key}/$Number$.m4s,playlist_name={key}.m3u8",
            input.filename,
            stream,
            dest = destination,
            key = input.key,
        )
    }

    fn build_args(&self, spec: &PackageSpec) -> Vec<String> {
        let mut args: Vec<String> = spec
            .inputs
            .iter()
            .map(|input| Self::stream_descriptor(input, &spec.destination))
            .collect();

        let dash = spec
            .format_options
            .dash_manifest_name
            .as_deref()
            .unwrap_or(DEFAULT_DASH_MANIFEST);
        args.push("--mpd_output".to_string());
        args.push(format!("{}/{}", spec.destination, dash));

        let hls = spec
            .format_options
            .hls_manifest_name
            .as_deref()
            .unwrap_or(DEFAULT_HLS_MANIFEST);
        args.push("--hls_master_playlist_output".to_string());
        args.push(format!("{}/{}", spec.destination, hls));

        if let Some(staging_dir) = &spec.staging_dir {
            args.push("--temp_dir".to_string());
            args.push(staging_dir.to_string_lossy().into_owned());
        }

        args
    }
}

#[async_trait]
impl PackageEngine for ShakaPackager {
    async fn package(&self, spec: &PackageSpec) -> CoreResult<()> {
        let args = self.build_args(spec);
        debug!(executable = %self.executable, ?args, "invoking shaka packager");

        let mut command = Command::new(&self.executable);
        command.args(&args).stdout(Stdio::null()).stderr(Stdio::piped());
        if let Some(endpoint) = &spec.s3_endpoint_url {
            command.env("S3_ENDPOINT_URL", endpoint);
        }
        if let Some(origin) = &spec.source_origin {
            command.env("SOURCE_ORIGIN", origin);
        }

        let output = command
            .output()
            .await
            .map_err(|e| CoreError::package_failed(format!("failed to spawn packager: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CoreError::package_failed(format!(
                "packager exited with {}: {}",
                output.status,
                stderr.trim(),
            )));
        }

        info!(destination = %spec.destination, "shaka packager finished");
        Ok(())
    }
}
