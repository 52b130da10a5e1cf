//! Packaging orchestration.
//!
//! Drives one job end to end: fetch the encode job, select streams, resolve
//! the destination and manifest names, invoke the packaging engine and
//! optionally drop a SMIL playlist next to the output.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use packline_models::{EncodeJob, PackageInput};
use tracing::info;
use url::Url;

use crate::config::PackagingConfig;
use crate::destination::resolve_destination;
use crate::error::{CoreError, CoreResult};
use crate::fetch::JobFetcher;
use crate::smil;
use crate::streams::select_inputs;
use crate::template::resolve_job_template;

/// Manifest file name overrides for the packaging engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageFormatOptions {
    pub dash_manifest_name: Option<String>,
    pub hls_manifest_name: Option<String>,
}

/// Everything the packaging engine needs for one job.
#[derive(Debug, Clone)]
pub struct PackageSpec {
    pub destination: String,
    pub inputs: Vec<PackageInput>,
    /// Origin to resolve relative input files against
    pub source_origin: Option<String>,
    pub staging_dir: Option<PathBuf>,
    pub s3_endpoint_url: Option<String>,
    pub format_options: PackageFormatOptions,
}

/// The opaque media segmentation/packaging engine.
///
/// Takes a destination and a list of typed inputs and either succeeds or
/// fails; everything about how it segments and uploads is its own business.
#[async_trait]
pub trait PackageEngine: Send + Sync {
    async fn package(&self, spec: &PackageSpec) -> CoreResult<()>;
}

/// Per-job orchestration invoked by the queue worker for every message.
pub struct JobPackager {
    config: Arc<PackagingConfig>,
    fetcher: JobFetcher,
    engine: Arc<dyn PackageEngine>,
}

impl JobPackager {
    pub fn new(config: Arc<PackagingConfig>, engine: Arc<dyn PackageEngine>) -> Self {
        let fetcher = JobFetcher::new(&config);
        Self {
            config,
            fetcher,
            engine,
        }
    }

    /// Package one encode job. All-or-nothing: any failure fails the job.
    /// Returns the resolved destination on success.
    pub async fn package(&self, job_url: &str) -> CoreResult<String> {
        let job = self.fetcher.fetch(job_url).await?;
        let inputs = select_inputs(&job, &self.config.stream_key_templates)?;
        let destination = self.destination(&job)?;
        let spec = PackageSpec {
            destination: destination.clone(),
            inputs,
            source_origin: self
                .config
                .service_access_token
                .as_ref()
                .and_then(|_| source_origin(job_url)),
            staging_dir: self.config.staging_dir.as_ref().map(PathBuf::from),
            s3_endpoint_url: self.config.s3_endpoint_url.clone(),
            format_options: self.format_options(&job)?,
        };
        self.engine.package(&spec).await?;

        if self.config.generate_smil && !destination.starts_with("s3:") {
            let playlist =
                smil::write_playlist(Path::new(&destination), &job, &self.config.smil_base_url)
                    .await?;
            info!(playlist = %playlist.display(), job_id = %job.id, "wrote SMIL playlist");
        }

        info!(job_id = %job.id, destination = %destination, "finished packaging");
        Ok(destination)
    }

    /// Resolve the output destination for a job.
    pub fn destination(&self, job: &EncodeJob) -> CoreResult<String> {
        resolve_destination(
            job,
            &self.config.output_folder,
            &self.config.output_subfolder_template,
        )
    }

    fn format_options(&self, job: &EncodeJob) -> CoreResult<PackageFormatOptions> {
        let dash_manifest_name = self
            .config
            .dash_manifest_name_template
            .as_deref()
            .map(|template| resolve_job_template(template, job))
            .transpose()?;
        let hls_manifest_name = self
            .config
            .hls_manifest_name_template
            .as_deref()
            .map(|template| resolve_job_template(template, job))
            .transpose()?;
        Ok(PackageFormatOptions {
            dash_manifest_name,
            hls_manifest_name,
        })
    }
}

/// Origin of the job URL, used by the engine to absolutize relative input
/// file paths when they have to be fetched through the transcoder itself.
/// Only relevant when a service access token is configured.
fn source_origin(job_url: &str) -> Option<String> {
    let url = Url::parse(job_url).ok()?;
    let origin = url.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}
