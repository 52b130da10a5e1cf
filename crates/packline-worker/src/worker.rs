//! The bounded-concurrency queue worker.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use packline_core::{CoreError, JobPackager, ListenerEvent, NotificationDispatcher};
use packline_models::QueueMessage;
use packline_queue::Broker;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::WorkerConfig;

/// Processing seam the worker drives for every valid message.
#[async_trait]
pub trait JobProcessor: Send + Sync {
    /// Handle one job by URL, returning the resolved output destination.
    async fn process(&self, job_url: &str) -> Result<String, CoreError>;
}

#[async_trait]
impl JobProcessor for JobPackager {
    async fn process(&self, job_url: &str) -> Result<String, CoreError> {
        self.package(job_url).await
    }
}

/// Polls the broker and dispatches handling tasks, at most
/// `config.concurrency` in flight at any instant.
///
/// Broker unavailability is never fatal: connection failures re-enter a
/// fixed-backoff retry loop until `stop()` is called. Per-job failures are
/// reported through the notification dispatcher and the loop keeps polling.
pub struct QueueWorker {
    config: WorkerConfig,
    broker: Arc<dyn Broker>,
    processor: Arc<dyn JobProcessor>,
    dispatcher: Arc<NotificationDispatcher>,
    in_flight: Arc<AtomicUsize>,
    shutdown: watch::Sender<bool>,
}

impl QueueWorker {
    pub fn new(
        config: WorkerConfig,
        broker: Arc<dyn Broker>,
        processor: Arc<dyn JobProcessor>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            config,
            broker,
            processor,
            dispatcher,
            in_flight: Arc::new(AtomicUsize::new(0)),
            shutdown,
        }
    }

    /// Number of jobs currently being handled.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Signal cooperative shutdown. The poll loop exits after its current
    /// wait elapses; in-flight handling tasks are not cancelled.
    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Run until `stop()` is called.
    pub async fn run(&self) {
        info!(
            concurrency = self.config.concurrency,
            "starting queue worker"
        );
        let mut shutdown_rx = self.shutdown.subscribe();
        while !*shutdown_rx.borrow() {
            if let Err(e) = self.broker.connect().await {
                warn!(error = %e, "broker connection failed, retrying");
                tokio::time::sleep(self.config.connect_backoff).await;
                continue;
            }
            self.poll(&mut shutdown_rx).await;
        }
        self.broker.disconnect().await;
        info!("queue worker stopped");
    }

    /// Poll until shutdown or a broker error. Errors return to the outer
    /// backoff-and-reconnect loop.
    async fn poll(&self, shutdown_rx: &mut watch::Receiver<bool>) {
        loop {
            if *shutdown_rx.borrow() {
                return;
            }
            if self.in_flight.load(Ordering::SeqCst) >= self.config.concurrency {
                // Backpressure: no dequeue is attempted while saturated.
                tokio::time::sleep(self.config.saturation_sleep).await;
                continue;
            }
            match self.broker.pop(self.config.poll_timeout).await {
                Ok(Some(payload)) => self.handle_message(payload).await,
                Ok(None) => {}
                Err(e) => {
                    warn!(error = %e, "error when polling queue");
                    return;
                }
            }
        }
    }

    /// Parse, account and spawn handling for one raw message, returning
    /// without waiting for the handling task.
    async fn handle_message(&self, payload: String) {
        debug!(payload = %payload, "received message");
        let message = match QueueMessage::parse(&payload) {
            Ok(message) => message,
            Err(e) => {
                // Not retried: malformed deliveries are surfaced and dropped.
                warn!(error = %e, "discarding malformed message");
                self.dispatcher
                    .notify(ListenerEvent::Fail {
                        message: payload,
                        error: e.to_string(),
                    })
                    .await;
                return;
            }
        };

        // Counted before the task starts, so the poll loop sees the slot as
        // taken as soon as it resumes.
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let in_flight = Arc::clone(&self.in_flight);
        let processor = Arc::clone(&self.processor);
        let dispatcher = Arc::clone(&self.dispatcher);

        tokio::spawn(async move {
            let _slot = scopeguard::guard(in_flight, |counter| {
                counter.fetch_sub(1, Ordering::SeqCst);
            });
            info!(job_id = %message.job_id, "handling packaging job");
            dispatcher
                .notify(ListenerEvent::Start {
                    job_url: message.url.clone(),
                    job_id: message.job_id.clone(),
                })
                .await;
            match processor.process(&message.url).await {
                Ok(destination) => {
                    info!(job_id = %message.job_id, destination = %destination, "job packaged");
                    dispatcher
                        .notify(ListenerEvent::Done {
                            job_url: message.url,
                            job_id: message.job_id,
                            output_path: Some(destination),
                        })
                        .await;
                }
                Err(e) => {
                    error!(job_id = %message.job_id, error = %e, "packaging job failed");
                    dispatcher
                        .notify(ListenerEvent::Fail {
                            message: payload,
                            error: e.to_string(),
                        })
                        .await;
                }
            }
        });
    }
}
