//! Packaging service binary.

use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use packline_api::{create_router, ApiConfig, AppState};
use packline_core::{
    CallbackConfig, CallbackListener, JobPackager, NotificationDispatcher, PackageListener,
    PackagingConfig, ShakaPackager,
};
use packline_queue::RedisBroker;
use packline_worker::{QueueWorker, WorkerConfig};

#[derive(Parser, Debug)]
#[command(name = "packline", version, about = "Package finished transcoding jobs")]
struct Cli {
    /// Package a single job by URL and exit instead of running as a service
    #[arg(short, long)]
    url: Option<String>,
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("packline=info".parse().expect("static directive"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    let cli = Cli::parse();
    let config = Arc::new(PackagingConfig::from_env());

    let engine = Arc::new(ShakaPackager::new(config.shaka_executable.clone()));
    let packager = Arc::new(JobPackager::new(config.clone(), engine));

    // One-shot mode: package a single job and exit.
    if let Some(url) = cli.url {
        match packager.package(&url).await {
            Ok(destination) => {
                info!(%destination, "packaging done");
            }
            Err(e) => {
                error!(error = %e, "packaging failed");
                std::process::exit(1);
            }
        }
        return;
    }

    info!("Starting packline");

    let broker: Arc<RedisBroker> = match RedisBroker::from_env() {
        Ok(b) => Arc::new(b),
        Err(e) => {
            error!(error = %e, "failed to create broker");
            std::process::exit(1);
        }
    };

    let listener: Option<Arc<dyn PackageListener>> = CallbackConfig::from_env().map(|cb| {
        info!(url = %cb.url, "lifecycle callbacks enabled");
        Arc::new(CallbackListener::new(
            cb,
            config.service_access_token.clone(),
        )) as Arc<dyn PackageListener>
    });
    let dispatcher = Arc::new(NotificationDispatcher::new(listener));

    let worker_config = WorkerConfig {
        concurrency: config.concurrency,
        ..WorkerConfig::from_env()
    };
    let worker = Arc::new(QueueWorker::new(
        worker_config,
        broker.clone(),
        packager,
        dispatcher,
    ));

    // Health/retry server, unless disabled.
    let api_config = ApiConfig::from_env();
    if api_config.disabled {
        info!("healthcheck server disabled");
    } else {
        let router = create_router(AppState::new(broker.clone()));
        let addr = format!("{}:{}", api_config.host, api_config.port);
        tokio::spawn(async move {
            let listener = match tokio::net::TcpListener::bind(&addr).await {
                Ok(l) => l,
                Err(e) => {
                    error!(error = %e, %addr, "failed to bind healthcheck server");
                    return;
                }
            };
            info!(%addr, "healthcheck server listening");
            if let Err(e) = axum::serve(listener, router).await {
                error!(error = %e, "healthcheck server error");
            }
        });
    }

    // Graceful shutdown on ctrl-c.
    let shutdown_worker = worker.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("received shutdown signal");
            shutdown_worker.stop();
        }
    });

    worker.run().await;

    info!("shutdown complete");
}
