// Backend trait for host-metrics API access
use crate::domain::metrics::{MetricSnapshot, TimeSeriesBundle};
use crate::domain::range::HistoryQuery;
use crate::domain::service::ServiceCommand;
use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    /// The request could not complete (connect, send, read body).
    #[error("request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },

    /// The response arrived but was not the expected shape.
    #[error("malformed response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    /// The backend answered with a non-success status.
    #[error("{message}")]
    Rejected { status: u16, message: String },
}

impl BackendError {
    pub fn transport(endpoint: &str, err: impl std::fmt::Display) -> Self {
        BackendError::Transport {
            endpoint: endpoint.to_string(),
            message: err.to_string(),
        }
    }

    pub fn decode(endpoint: &str, err: impl std::fmt::Display) -> Self {
        BackendError::Decode {
            endpoint: endpoint.to_string(),
            message: err.to_string(),
        }
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

#[async_trait]
pub trait MetricsBackend: Send + Sync {
    /// Fetch one time-series bundle, scoped by exactly one query mechanism
    async fn fetch_history(&self, query: &HistoryQuery) -> BackendResult<TimeSeriesBundle>;

    /// Fetch the current point-in-time snapshot
    async fn fetch_snapshot(&self) -> BackendResult<MetricSnapshot>;

    /// Fetch the `{name -> state}` service mapping
    async fn fetch_services(&self) -> BackendResult<BTreeMap<String, String>>;

    /// Issue a start/stop/restart command. Any 2xx is success.
    async fn control_service(&self, command: &ServiceCommand) -> BackendResult<()>;
}
