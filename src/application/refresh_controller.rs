// Refresh controller - fetches history bundles and routes them to chart views
use crate::application::dashboard_surface::{DashboardSurface, Notifier};
use crate::application::label_formatter::format_labels;
use crate::application::metrics_backend::MetricsBackend;
use crate::application::series_synthesizer::load_series;
use crate::domain::chart::{ChartFrame, ChartView, Dataset, Target};
use crate::domain::metrics::TimeSeriesBundle;
use crate::domain::notification::{Notification, NotificationKind};
use crate::domain::range::{HistoryQuery, RangeError, RangeSelection};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Formats a bundle's labels for display.
pub type LabelFn = fn(&[String]) -> Vec<String>;

/// No request ids are tracked: overlapping refreshes for the same card are
/// applied in the order their responses arrive.
pub struct RefreshController {
    backend: Arc<dyn MetricsBackend>,
    surface: Arc<dyn DashboardSurface>,
    notifier: Arc<dyn Notifier>,
    default_range: String,
    format_labels: LabelFn,
    selections: Mutex<HashMap<Target, RangeSelection>>,
}

impl RefreshController {
    pub fn new(
        backend: Arc<dyn MetricsBackend>,
        surface: Arc<dyn DashboardSurface>,
        notifier: Arc<dyn Notifier>,
        default_range: impl Into<String>,
    ) -> Self {
        let default_range = default_range.into();
        let selections = Target::CARDS
            .iter()
            .map(|card| (*card, RangeSelection::preset(default_range.clone())))
            .collect();

        Self {
            backend,
            surface,
            notifier,
            default_range,
            format_labels,
            selections: Mutex::new(selections),
        }
    }

    /// Replace the label formatter (e.g. to pin the time zone).
    pub fn with_label_formatter(mut self, format_labels: LabelFn) -> Self {
        self.format_labels = format_labels;
        self
    }

    pub fn selection(&self, card: Target) -> RangeSelection {
        self.selections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&card)
            .cloned()
            .unwrap_or_else(|| RangeSelection::preset(self.default_range.clone()))
    }

    /// Current selection of every card, in card order.
    pub fn selections(&self) -> Vec<(Target, RangeSelection)> {
        Target::CARDS
            .iter()
            .map(|card| (*card, self.selection(*card)))
            .collect()
    }

    /// One fetch for `range`, pushed to every series view.
    pub async fn refresh_all(&self, range: &str) {
        let query = HistoryQuery::Preset(range.to_string());
        self.refresh_views(&query, Target::All.views()).await;
    }

    /// One fetch scoped to a preset or an explicit window, pushed only to
    /// the views of `target`.
    pub async fn refresh_target(
        &self,
        range: &str,
        target: Target,
        custom_start: Option<&str>,
        custom_end: Option<&str>,
    ) {
        let query = HistoryQuery::resolve(range, custom_start, custom_end);
        self.refresh_views(&query, target.views()).await;
    }

    /// Store a card's new selection and refetch that card immediately.
    /// `all` moves every card.
    pub async fn select_range(&self, target: Target, selection: RangeSelection) {
        {
            let mut selections = self.selections.lock().unwrap_or_else(PoisonError::into_inner);
            let cards: &[Target] = match target {
                Target::All => &Target::CARDS,
                _ => std::slice::from_ref(&target),
            };
            for card in cards {
                selections.insert(*card, selection.clone());
            }
        }

        tracing::info!(target_card = %target, selection = ?selection, "range selected");
        let (start, end) = selection.custom_bounds();
        self.refresh_target(selection.range_name(), target, start, end)
            .await;
    }

    /// Range change coming straight from the user. Incomplete input is
    /// reported through the notifier and nothing is fetched.
    pub async fn apply_user_range(
        &self,
        target: Target,
        range: &str,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<(), RangeError> {
        match RangeSelection::from_request(range, start, end) {
            Ok(selection) => {
                self.select_range(target, selection).await;
                Ok(())
            }
            Err(e) => {
                tracing::debug!(target_card = %target, error = %e, "range change rejected");
                self.notifier.notify(Notification::new(
                    NotificationKind::InvalidInput,
                    e.to_string(),
                    "",
                ));
                Err(e)
            }
        }
    }

    /// Timer tick: refresh only the cards following the default range.
    pub async fn live_tick(&self) {
        let live: Vec<Target> = self
            .selections()
            .into_iter()
            .filter(|(_, selection)| selection.is_live(&self.default_range))
            .map(|(card, _)| card)
            .collect();

        if live.len() == Target::CARDS.len() {
            self.refresh_all(&self.default_range).await;
            return;
        }
        if live.is_empty() {
            tracing::debug!("no live cards, skipping history refresh");
            return;
        }
        for card in live {
            self.refresh_target(&self.default_range, card, None, None)
                .await;
        }
    }

    async fn refresh_views(&self, query: &HistoryQuery, views: &[ChartView]) {
        let bundle = match self.backend.fetch_history(query).await {
            Ok(bundle) => bundle,
            Err(e) => {
                tracing::warn!(
                    operation = "fetch_history",
                    query = %query.describe(),
                    error = %e,
                    "history refresh failed, keeping previous charts"
                );
                return;
            }
        };

        if let Some(series) = bundle.mismatched_series() {
            tracing::warn!(
                operation = "fetch_history",
                query = %query.describe(),
                series,
                labels = bundle.len(),
                "history bundle has mismatched series lengths, keeping previous charts"
            );
            return;
        }

        if bundle.is_empty() {
            tracing::debug!(query = %query.describe(), "history bundle is empty");
        }

        let labels = (self.format_labels)(&bundle.labels);
        for view in views {
            if let Some(frame) = build_frame(*view, &labels, &bundle) {
                self.surface.render_chart(*view, frame);
            }
        }

        tracing::debug!(
            query = %query.describe(),
            samples = bundle.len(),
            views = views.len(),
            "history applied"
        );
    }
}

/// Frame for one series view. Each frame owns copies of its data.
fn build_frame(view: ChartView, labels: &[String], bundle: &TimeSeriesBundle) -> Option<ChartFrame> {
    let datasets = match view {
        ChartView::Cpu => vec![Dataset::new("CPU %", bundle.cpu.clone())],
        ChartView::Memory => vec![Dataset::new("Memory %", bundle.memory.clone())],
        ChartView::Network => vec![
            Dataset::new("Download (MB/s)", bundle.net_rx.clone()),
            Dataset::new("Upload (MB/s)", bundle.net_tx.clone()),
        ],
        ChartView::LoadLeft => vec![Dataset::new("System resource usage", bundle.cpu.clone())],
        ChartView::LoadRight => {
            let [one, five, fifteen] = load_series(&bundle.cpu);
            vec![
                Dataset::new("Load 1m", one),
                Dataset::new("Load 5m", five),
                Dataset::new("Load 15m", fifteen),
            ]
        }
        ChartView::Overview => vec![Dataset::new("", bundle.cpu.clone())],
        _ => return None,
    };
    Some(ChartFrame::new(labels.to_vec(), datasets))
}
