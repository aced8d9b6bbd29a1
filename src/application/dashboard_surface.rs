// Rendering and notification capabilities the use cases push into
use crate::domain::chart::{ChartFrame, ChartView};
use crate::domain::notification::Notification;
use crate::domain::service::ServiceList;
use crate::domain::status::StatusSummary;

/// Anything able to display dashboard state. Each call replaces the
/// previous state of the addressed widget.
pub trait DashboardSurface: Send + Sync {
    fn render_chart(&self, view: ChartView, frame: ChartFrame);

    fn render_status(&self, summary: StatusSummary);

    fn render_services(&self, services: ServiceList);
}

/// User-facing alerts for direct user actions.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}
