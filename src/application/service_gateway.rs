// Service control gateway - service list and start/stop/restart commands
use crate::application::dashboard_surface::{DashboardSurface, Notifier};
use crate::application::metrics_backend::{BackendError, MetricsBackend};
use crate::domain::notification::{Notification, NotificationKind};
use crate::domain::service::{ServiceAction, ServiceCommand, ServiceList};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "message", rename_all = "snake_case")]
pub enum ControlOutcome {
    /// Accepted by the backend; the list was re-fetched.
    Applied,
    /// Refused by the backend with this message.
    Rejected(String),
    /// The command never reached the backend or its answer was lost.
    Failed(String),
}

#[derive(Clone)]
pub struct ServiceGateway {
    backend: Arc<dyn MetricsBackend>,
    surface: Arc<dyn DashboardSurface>,
    notifier: Arc<dyn Notifier>,
}

impl ServiceGateway {
    pub fn new(
        backend: Arc<dyn MetricsBackend>,
        surface: Arc<dyn DashboardSurface>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            backend,
            surface,
            notifier,
        }
    }

    /// Fetch, sort and render the service list. On failure the previous
    /// list stays on screen and `None` is returned.
    pub async fn list_services(&self) -> Option<ServiceList> {
        match self.backend.fetch_services().await {
            Ok(statuses) => {
                let list = ServiceList::from_statuses(statuses);
                tracing::debug!(services = list.entries.len(), "service list refreshed");
                self.surface.render_services(list.clone());
                Some(list)
            }
            Err(e) => {
                tracing::warn!(
                    operation = "fetch_services",
                    error = %e,
                    "service list refresh failed, keeping previous list"
                );
                None
            }
        }
    }

    /// Send a command. Success triggers exactly one list re-fetch; a
    /// rejection surfaces the backend's text and leaves the list alone.
    pub async fn control_service(&self, name: &str, action: ServiceAction) -> ControlOutcome {
        let command = ServiceCommand::new(name, action);
        let title = format!("Failed to {} {}", action, name);

        match self.backend.control_service(&command).await {
            Ok(()) => {
                tracing::info!(service = name, action = %action, "service command applied");
                self.list_services().await;
                ControlOutcome::Applied
            }
            Err(BackendError::Rejected { status, message }) => {
                tracing::warn!(
                    service = name,
                    action = %action,
                    status,
                    message = %message,
                    "service command rejected"
                );
                self.notifier.notify(Notification::new(
                    NotificationKind::CommandRejected,
                    title,
                    message.clone(),
                ));
                ControlOutcome::Rejected(message)
            }
            Err(e) => {
                tracing::error!(
                    service = name,
                    action = %action,
                    error = %e,
                    "service control error"
                );
                self.notifier.notify(Notification::new(
                    NotificationKind::TransportFailure,
                    title,
                    e.to_string(),
                ));
                ControlOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::metrics_backend::BackendResult;
    use crate::domain::metrics::{MetricSnapshot, TimeSeriesBundle};
    use crate::domain::range::HistoryQuery;
    use crate::infrastructure::dashboard_registry::DashboardRegistry;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum ControlReply {
        Ok,
        Rejected(u16, &'static str),
        Unreachable,
    }

    struct FakeBackend {
        services: Mutex<Option<BTreeMap<String, String>>>,
        reply: ControlReply,
        list_calls: AtomicUsize,
        commands: Mutex<Vec<ServiceCommand>>,
    }

    impl FakeBackend {
        fn new(services: &[(&str, &str)], reply: ControlReply) -> Self {
            let services = services
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            Self {
                services: Mutex::new(Some(services)),
                reply,
                list_calls: AtomicUsize::new(0),
                commands: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MetricsBackend for FakeBackend {
        async fn fetch_history(&self, _query: &HistoryQuery) -> BackendResult<TimeSeriesBundle> {
            Ok(TimeSeriesBundle::default())
        }

        async fn fetch_snapshot(&self) -> BackendResult<MetricSnapshot> {
            Ok(MetricSnapshot::default())
        }

        async fn fetch_services(&self) -> BackendResult<BTreeMap<String, String>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            self.services
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| BackendError::transport("/services", "connection reset"))
        }

        async fn control_service(&self, command: &ServiceCommand) -> BackendResult<()> {
            self.commands.lock().unwrap().push(command.clone());
            match self.reply {
                ControlReply::Ok => Ok(()),
                ControlReply::Rejected(status, message) => Err(BackendError::Rejected {
                    status,
                    message: message.to_string(),
                }),
                ControlReply::Unreachable => {
                    Err(BackendError::transport("/service/control", "connection refused"))
                }
            }
        }
    }

    fn gateway(backend: Arc<FakeBackend>) -> (ServiceGateway, Arc<DashboardRegistry>) {
        let registry = Arc::new(DashboardRegistry::new(16, 16));
        let gateway = ServiceGateway::new(backend, registry.clone(), registry.clone());
        (gateway, registry)
    }

    #[tokio::test]
    async fn test_list_services_renders_sorted_list() {
        let backend = Arc::new(FakeBackend::new(&[("b", "active"), ("a", "inactive")], ControlReply::Ok));
        let (gateway, registry) = gateway(backend);

        gateway.list_services().await;

        let list = registry.services().unwrap();
        assert_eq!(list.entries[0].name, "a");
        assert_eq!(list.entries[0].actions, vec![ServiceAction::Start, ServiceAction::Restart]);
        assert_eq!(list.entries[1].name, "b");
        assert_eq!(list.entries[1].actions, vec![ServiceAction::Stop, ServiceAction::Restart]);
    }

    #[tokio::test]
    async fn test_empty_service_list_is_valid() {
        let backend = Arc::new(FakeBackend::new(&[], ControlReply::Ok));
        let (gateway, registry) = gateway(backend);

        let list = gateway.list_services().await.unwrap();

        assert!(list.is_empty());
        assert_eq!(registry.services(), Some(ServiceList::default()));
    }

    #[tokio::test]
    async fn test_failed_list_keeps_previous() {
        let backend = Arc::new(FakeBackend::new(&[("nginx", "active")], ControlReply::Ok));
        let (gateway, registry) = gateway(backend.clone());
        gateway.list_services().await;

        *backend.services.lock().unwrap() = None;
        assert!(gateway.list_services().await.is_none());

        assert_eq!(registry.services().unwrap().entries[0].name, "nginx");
        assert!(registry.notifications().is_empty(), "background failures stay silent");
    }

    #[tokio::test]
    async fn test_rejected_command_surfaces_text_without_refetch() {
        let backend = Arc::new(FakeBackend::new(
            &[("nginx", "active")],
            ControlReply::Rejected(500, "permission denied"),
        ));
        let (gateway, registry) = gateway(backend.clone());

        let outcome = gateway.control_service("nginx", ServiceAction::Stop).await;

        assert_eq!(outcome, ControlOutcome::Rejected("permission denied".to_string()));
        assert_eq!(backend.list_calls.load(Ordering::SeqCst), 0);
        let notifications = registry.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::CommandRejected);
        assert_eq!(notifications[0].detail, "permission denied");
        assert_eq!(notifications[0].title, "Failed to stop nginx");
    }

    #[tokio::test]
    async fn test_applied_command_refetches_once() {
        let backend = Arc::new(FakeBackend::new(&[("nginx", "inactive")], ControlReply::Ok));
        let (gateway, registry) = gateway(backend.clone());

        let outcome = gateway.control_service("nginx", ServiceAction::Start).await;

        assert_eq!(outcome, ControlOutcome::Applied);
        assert_eq!(backend.list_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            backend.commands.lock().unwrap().as_slice(),
            &[ServiceCommand::new("nginx", ServiceAction::Start)]
        );
        assert!(registry.services().is_some());
        assert!(registry.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_alerts_user() {
        let backend = Arc::new(FakeBackend::new(&[], ControlReply::Unreachable));
        let (gateway, registry) = gateway(backend.clone());

        let outcome = gateway.control_service("nginx", ServiceAction::Restart).await;

        assert!(matches!(outcome, ControlOutcome::Failed(_)));
        assert_eq!(backend.list_calls.load(Ordering::SeqCst), 0);
        let notifications = registry.notifications();
        assert_eq!(notifications[0].kind, NotificationKind::TransportFailure);
        assert_eq!(notifications[0].title, "Failed to restart nginx");
    }
}
