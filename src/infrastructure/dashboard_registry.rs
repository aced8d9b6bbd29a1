// In-memory dashboard registry - owns the state of every view
use crate::application::dashboard_surface::{DashboardSurface, Notifier};
use crate::domain::chart::{ChartFrame, ChartView};
use crate::domain::notification::Notification;
use crate::domain::service::ServiceList;
use crate::domain::status::{GaugeReading, StatusSummary};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;

/// One change to the dashboard, as pushed to stream subscribers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashboardEvent {
    Chart { view: ChartView, frame: ChartFrame },
    Status { summary: StatusSummary },
    Services { services: ServiceList },
    Notification { notification: Notification },
}

/// Full dashboard snapshot.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardState {
    pub charts: BTreeMap<ChartView, ChartFrame>,
    pub gauges: BTreeMap<ChartView, GaugeReading>,
    pub status: Option<StatusSummary>,
    pub services: Option<ServiceList>,
    pub notifications: Vec<Notification>,
}

#[derive(Default)]
struct RegistryState {
    charts: BTreeMap<ChartView, ChartFrame>,
    status: Option<StatusSummary>,
    services: Option<ServiceList>,
    notifications: VecDeque<Notification>,
}

/// Every widget keeps its own state; each render replaces it (last write wins).
pub struct DashboardRegistry {
    state: Mutex<RegistryState>,
    notification_capacity: usize,
    events: broadcast::Sender<DashboardEvent>,
}

impl DashboardRegistry {
    pub fn new(event_capacity: usize, notification_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(event_capacity.max(1));
        Self {
            state: Mutex::new(RegistryState::default()),
            notification_capacity,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> DashboardState {
        let state = self.lock();
        let gauges = state
            .status
            .iter()
            .flat_map(|summary| summary.cards.iter())
            .map(|card| (card.gauge_view, card.gauge))
            .collect();

        DashboardState {
            charts: state.charts.clone(),
            gauges,
            status: state.status.clone(),
            services: state.services.clone(),
            notifications: state.notifications.iter().cloned().collect(),
        }
    }

    #[cfg(test)]
    pub fn chart(&self, view: ChartView) -> Option<ChartFrame> {
        self.lock().charts.get(&view).cloned()
    }

    #[cfg(test)]
    pub fn status(&self) -> Option<StatusSummary> {
        self.lock().status.clone()
    }

    pub fn services(&self) -> Option<ServiceList> {
        self.lock().services.clone()
    }

    /// Oldest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().notifications.iter().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, event: DashboardEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

impl DashboardSurface for DashboardRegistry {
    fn render_chart(&self, view: ChartView, frame: ChartFrame) {
        self.lock().charts.insert(view, frame.clone());
        self.publish(DashboardEvent::Chart { view, frame });
    }

    fn render_status(&self, summary: StatusSummary) {
        self.lock().status = Some(summary.clone());
        self.publish(DashboardEvent::Status { summary });
    }

    fn render_services(&self, services: ServiceList) {
        self.lock().services = Some(services.clone());
        self.publish(DashboardEvent::Services { services });
    }
}

impl Notifier for DashboardRegistry {
    fn notify(&self, notification: Notification) {
        tracing::warn!(kind = ?notification.kind, "{}", notification.message());
        {
            let mut state = self.lock();
            state.notifications.push_back(notification.clone());
            while state.notifications.len() > self.notification_capacity {
                state.notifications.pop_front();
            }
        }
        self.publish(DashboardEvent::Notification { notification });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::status_aggregator::summarize;
    use crate::domain::chart::Dataset;
    use crate::domain::metrics::MetricSnapshot;
    use crate::domain::notification::NotificationKind;

    fn frame(value: f64) -> ChartFrame {
        ChartFrame::new(vec!["10:00".to_string()], vec![Dataset::new("CPU %", vec![value])])
    }

    #[test]
    fn test_last_write_wins_per_view() {
        let registry = DashboardRegistry::new(8, 8);
        registry.render_chart(ChartView::Cpu, frame(1.0));
        registry.render_chart(ChartView::Memory, frame(2.0));
        registry.render_chart(ChartView::Cpu, frame(3.0));

        assert_eq!(registry.chart(ChartView::Cpu), Some(frame(3.0)));
        assert_eq!(registry.chart(ChartView::Memory), Some(frame(2.0)));
        assert_eq!(registry.snapshot().charts.len(), 2);
    }

    #[test]
    fn test_snapshot_exposes_gauges_by_view() {
        let registry = DashboardRegistry::new(8, 8);
        registry.render_status(summarize(&MetricSnapshot::default()));

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.gauges.len(), 4);
        assert_eq!(snapshot.gauges[&ChartView::DiskGauge], GaugeReading::new(0.0));
    }

    #[test]
    fn test_notifications_are_bounded() {
        let registry = DashboardRegistry::new(8, 2);
        for i in 0..3 {
            registry.notify(Notification::new(
                NotificationKind::InvalidInput,
                format!("n{}", i),
                "",
            ));
        }
        let titles: Vec<String> = registry.notifications().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["n1", "n2"]);
    }

    #[tokio::test]
    async fn test_changes_are_broadcast() {
        let registry = DashboardRegistry::new(8, 8);
        let mut rx = registry.subscribe();

        registry.render_services(ServiceList::default());

        match rx.recv().await.unwrap() {
            DashboardEvent::Services { services } => assert!(services.is_empty()),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_event_json_shape() {
        let event = DashboardEvent::Chart {
            view: ChartView::LoadLeft,
            frame: frame(4.0),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "chart");
        assert_eq!(json["view"], "load-left");
        assert_eq!(json["frame"]["datasets"][0]["values"][0], 4.0);
    }
}
