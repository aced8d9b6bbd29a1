// HTTP implementation of the host-metrics backend
use crate::application::metrics_backend::{BackendError, BackendResult, MetricsBackend};
use crate::domain::metrics::{MetricSnapshot, TimeSeriesBundle};
use crate::domain::range::HistoryQuery;
use crate::domain::service::ServiceCommand;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct HttpMetricsBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpMetricsBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// `/history` with exactly one query mechanism.
    pub fn history_url(&self, query: &HistoryQuery) -> String {
        let params: Vec<String> = query
            .query_pairs()
            .into_iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect();
        format!("{}/history?{}", self.base_url, params.join("&"))
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str, url: &str) -> BackendResult<T> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| BackendError::transport(endpoint, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::decode(
                endpoint,
                format!("unexpected status {}: {}", status, body),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| BackendError::transport(endpoint, e))?;
        serde_json::from_slice(&body).map_err(|e| BackendError::decode(endpoint, e))
    }
}

#[async_trait]
impl MetricsBackend for HttpMetricsBackend {
    async fn fetch_history(&self, query: &HistoryQuery) -> BackendResult<TimeSeriesBundle> {
        let url = self.history_url(query);
        tracing::debug!(url = %url, "fetching history");
        self.get_json("/history", &url).await
    }

    async fn fetch_snapshot(&self) -> BackendResult<MetricSnapshot> {
        let url = format!("{}/stats", self.base_url);
        self.get_json("/stats", &url).await
    }

    async fn fetch_services(&self) -> BackendResult<BTreeMap<String, String>> {
        let url = format!("{}/services", self.base_url);
        self.get_json("/services", &url).await
    }

    async fn control_service(&self, command: &ServiceCommand) -> BackendResult<()> {
        let endpoint = "/service/control";
        let url = format!("{}{}", self.base_url, endpoint);

        let response = self
            .client
            .post(&url)
            .json(command)
            .send()
            .await
            .map_err(|e| BackendError::transport(endpoint, e))?;

        let status = response.status();
        if status.is_success() {
            // Body (if any) is ignored.
            return Ok(());
        }

        let message = response
            .text()
            .await
            .map_err(|e| BackendError::transport(endpoint, e))?;
        Err(BackendError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::service::ServiceAction;
    use axum::extract::{Json, RawQuery};
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::Router;
    use std::sync::{Arc, Mutex};

    /// Stand-in for the metrics API on an ephemeral port.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_history_url_uses_one_mechanism() {
        let backend = HttpMetricsBackend::new("http://monitor.lan:5000/");

        let preset = backend.history_url(&HistoryQuery::Preset("7d".to_string()));
        assert_eq!(preset, "http://monitor.lan:5000/history?range=7d");

        let window = backend.history_url(&HistoryQuery::resolve(
            "today",
            Some("2025-10-29T00:00:00+02:00"),
            Some("2025-10-30"),
        ));
        assert_eq!(
            window,
            "http://monitor.lan:5000/history?start=2025-10-29T00%3A00%3A00%2B02%3A00&end=2025-10-30T23%3A59%3A59Z"
        );
        assert!(!window.contains("range="));
    }

    #[tokio::test]
    async fn test_fetch_history_sends_query_and_parses_bundle() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let router = Router::new().route(
            "/history",
            get({
                let seen = seen.clone();
                move |RawQuery(query): RawQuery| async move {
                    seen.lock().unwrap().push(query.unwrap_or_default());
                    Json(serde_json::json!({
                        "labels": ["2025-10-29T10:00:00Z", "2025-10-29T10:01:00Z"],
                        "cpu": [1.5, 2.5],
                        "memory": [40.0, 41.0],
                        "net_rx": [0.1, 0.2],
                        "net_tx": [0.0, 0.05]
                    }))
                }
            }),
        );
        let backend = HttpMetricsBackend::new(serve(router).await);

        let bundle = backend
            .fetch_history(&HistoryQuery::Preset("today".to_string()))
            .await
            .unwrap();

        assert_eq!(bundle.len(), 2);
        assert_eq!(bundle.cpu, vec![1.5, 2.5]);
        assert_eq!(seen.lock().unwrap().as_slice(), &["range=today".to_string()]);
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let router = Router::new().route("/stats", get(|| async { "<html>login</html>" }));
        let backend = HttpMetricsBackend::new(serve(router).await);

        let err = backend.fetch_snapshot().await.unwrap_err();
        assert!(matches!(err, BackendError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        // Bind and drop to get a port nobody listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let backend = HttpMetricsBackend::new(format!("http://{}", addr));

        let err = backend.fetch_services().await.unwrap_err();
        assert!(matches!(err, BackendError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_control_service_success_and_rejection() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let router = Router::new().route(
            "/service/control",
            post({
                let received = received.clone();
                move |Json(command): Json<ServiceCommand>| async move {
                    received.lock().unwrap().push(command.clone());
                    if command.service == "nginx" {
                        (StatusCode::INTERNAL_SERVER_ERROR, "permission denied".to_string())
                    } else {
                        (StatusCode::OK, r#"{"success": true, "output": ""}"#.to_string())
                    }
                }
            }),
        );
        let backend = HttpMetricsBackend::new(serve(router).await);

        backend
            .control_service(&ServiceCommand::new("cron", ServiceAction::Restart))
            .await
            .unwrap();

        let err = backend
            .control_service(&ServiceCommand::new("nginx", ServiceAction::Stop))
            .await
            .unwrap_err();
        match err {
            BackendError::Rejected { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "permission denied");
            }
            other => panic!("expected rejection, got {:?}", other),
        }

        assert_eq!(
            received.lock().unwrap().as_slice(),
            &[
                ServiceCommand::new("cron", ServiceAction::Restart),
                ServiceCommand::new("nginx", ServiceAction::Stop),
            ]
        );
    }
}
