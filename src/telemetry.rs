//! Request and error reporting to an external collector.
//!
//! Handlers never talk to the collector directly. The [`track_requests`]
//! middleware turns every sampled request into a transaction event and every
//! failure that went through the error pipeline into an error event. Events go
//! through a bounded queue to a background worker, so a slow or unreachable
//! collector never holds up a response.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::{sync::mpsc, task::JoinHandle};

use std::time::{Duration, Instant};

use crate::{config::TelemetryConfig, error::FailureReport, middleware::request_id::REQUEST_ID_HEADER};

const QUEUE_CAPACITY: usize = 1024;
const SEND_TIMEOUT: Duration = Duration::from_secs(5);
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TelemetryEvent {
    Transaction {
        request_id: Option<String>,
        method: String,
        path: String,
        status: u16,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
    Error {
        request_id: Option<String>,
        method: String,
        path: String,
        status: u16,
        message: String,
        timestamp: DateTime<Utc>,
    },
}

#[derive(Debug, Clone)]
pub struct Telemetry {
    sender: Option<mpsc::Sender<TelemetryEvent>>,
    traces_sample_rate: f64,
}

impl Telemetry {
    /// Drops every event.
    pub const fn disabled() -> Self {
        Self {
            sender: None,
            traces_sample_rate: 0.0,
        }
    }

    /// Sends events into a caller-owned channel instead of a collector.
    pub const fn from_sender(sender: mpsc::Sender<TelemetryEvent>, traces_sample_rate: f64) -> Self {
        Self {
            sender: Some(sender),
            traces_sample_rate,
        }
    }

    pub fn start(config: &TelemetryConfig) -> Result<(Self, TelemetryWorker), reqwest::Error> {
        let client = reqwest::Client::builder().timeout(SEND_TIMEOUT).build()?;
        let (sender, receiver) = mpsc::channel(QUEUE_CAPACITY);

        match &config.dsn {
            Some(dsn) => tracing::info!("Telemetry events are sent to {}", dsn),
            None => tracing::info!("No telemetry endpoint configured, events are only logged"),
        }

        let handle = tokio::spawn(deliver(receiver, client, config.dsn.clone()));

        Ok((
            Self::from_sender(sender, config.traces_sample_rate),
            TelemetryWorker { handle },
        ))
    }

    pub fn capture(&self, event: TelemetryEvent) {
        let Some(sender) = &self.sender else {
            return;
        };

        match sender.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!("Telemetry queue is full, dropping event");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!("Telemetry worker stopped, dropping event");
            }
        }
    }

    fn sample_trace(&self) -> bool {
        if self.traces_sample_rate >= 1.0 {
            return true;
        }
        self.traces_sample_rate > 0.0 && rand::random::<f64>() < self.traces_sample_rate
    }
}

pub struct TelemetryWorker {
    handle: JoinHandle<()>,
}

impl TelemetryWorker {
    /// Closes the queue by dropping `telemetry` and waits for queued events to
    /// be delivered. Gives up after a few seconds if other handles are still alive.
    pub async fn shutdown(self, telemetry: Telemetry) {
        drop(telemetry);

        let abort = self.handle.abort_handle();
        match tokio::time::timeout(DRAIN_TIMEOUT, self.handle).await {
            Ok(Ok(())) => tracing::info!("Telemetry queue drained"),
            Ok(Err(e)) => tracing::error!("Telemetry worker failed: {e}"),
            Err(_) => {
                tracing::warn!("Telemetry queue not drained in time, discarding remaining events");
                abort.abort();
            }
        }
    }
}

async fn deliver(
    mut receiver: mpsc::Receiver<TelemetryEvent>,
    client: reqwest::Client,
    dsn: Option<String>,
) {
    while let Some(event) = receiver.recv().await {
        let Some(dsn) = &dsn else {
            tracing::debug!(target: "telemetry", ?event, "telemetry event");
            continue;
        };

        let result = client
            .post(dsn)
            .json(&event)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status);

        if let Err(e) = result {
            tracing::warn!("Failed to deliver telemetry event: {}", e);
        }
    }
}

/// Records a transaction for sampled requests and an error event for every
/// response produced by the error pipeline.
pub async fn track_requests(
    State(telemetry): State<Telemetry>,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let response = next.run(request).await;
    let status = response.status().as_u16();

    if let Some(failure) = response.extensions().get::<FailureReport>() {
        telemetry.capture(TelemetryEvent::Error {
            request_id: request_id.clone(),
            method: method.clone(),
            path: path.clone(),
            status,
            message: failure.message().to_string(),
            timestamp: Utc::now(),
        });
    }

    if telemetry.sample_trace() {
        telemetry.capture(TelemetryEvent::Transaction {
            request_id,
            method,
            path,
            status,
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            timestamp: Utc::now(),
        });
    }

    response
}
