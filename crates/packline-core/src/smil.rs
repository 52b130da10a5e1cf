//! SMIL playlist generation.
//!
//! Builds a SMIL 2.0 switch document over a job's MPEG-4 video renditions,
//! one `<video>` entry per file with a `system-bitrate` attribute. Transfer of
//! the referenced files is not handled here; playlists are only written into
//! local destinations.

use std::path::{Path, PathBuf};

use packline_models::{EncodeJob, OutputType};
use tracing::debug;

use crate::error::{CoreError, CoreResult};

const PLAYLIST_FILE_NAME: &str = "playlist.smil";

#[derive(Debug, Clone, PartialEq, Eq)]
struct SmilEntry {
    file: String,
    bitrate: u64,
}

/// Generate the SMIL document for a job's MPEG-4 video outputs.
pub fn generate(job: &EncodeJob, base_url: &str) -> CoreResult<String> {
    let outputs = job
        .output
        .as_deref()
        .ok_or_else(|| CoreError::invalid_job_state("encode job has no output"))?;

    let entries: Vec<SmilEntry> = outputs
        .iter()
        .filter(|output| output.kind == OutputType::VideoFile && output.format == "MPEG-4")
        .map(|output| SmilEntry {
            file: basename(&output.file),
            bitrate: output.overall_bitrate,
        })
        .collect();

    if entries.is_empty() {
        return Err(CoreError::NoMp4Outputs);
    }

    Ok(render(&entries, base_url))
}

/// Generate and write `playlist.smil` into a local destination directory.
pub async fn write_playlist(
    destination: &Path,
    job: &EncodeJob,
    base_url: &str,
) -> CoreResult<PathBuf> {
    let content = generate(job, base_url)?;
    tokio::fs::create_dir_all(destination).await?;
    let path = destination.join(PLAYLIST_FILE_NAME);
    tokio::fs::write(&path, content).await?;
    debug!(path = %path.display(), "wrote SMIL playlist");
    Ok(path)
}

fn render(entries: &[SmilEntry], base_url: &str) -> String {
    let videos = entries
        .iter()
        .map(|entry| {
            let bitrate_attr = if entry.bitrate > 0 {
                format!(" system-bitrate=\"{}\"", entry.bitrate)
            } else {
                String::new()
            };
            format!("    <video src=\"{}\"{} />", entry.file, bitrate_attr)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<smil xmlns="http://www.w3.org/2001/SMIL20/Language">
  <head>
    <meta base="{base_url}" />
  </head>
  <body>
    <switch>
{videos}
    </switch>
  </body>
</smil>"#
    )
}

fn basename(file: &str) -> String {
    Path::new(file)
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.to_string())
}
