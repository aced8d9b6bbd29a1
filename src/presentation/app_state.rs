// Application state for HTTP handlers
use crate::application::refresh_controller::RefreshController;
use crate::application::service_gateway::ServiceGateway;
use crate::infrastructure::dashboard_registry::DashboardRegistry;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<RefreshController>,
    pub gateway: ServiceGateway,
    pub registry: Arc<DashboardRegistry>,
    /// Flips to `true` when the process is shutting down.
    pub shutdown: watch::Receiver<bool>,
}
