// Refresh scheduler - three independent timers driving the dashboard
use crate::application::refresh_controller::RefreshController;
use crate::application::service_gateway::ServiceGateway;
use crate::application::status_aggregator::StatusMonitor;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior, interval};

/// Periods of the three timers. They share no state and may interleave.
#[derive(Debug, Clone, Copy)]
pub struct Cadence {
    pub history: Duration,
    pub status: Duration,
    pub services: Duration,
}

impl Default for Cadence {
    fn default() -> Self {
        Self {
            history: Duration::from_secs(60),
            status: Duration::from_secs(5),
            services: Duration::from_secs(30),
        }
    }
}

pub struct SchedulerDeps {
    pub controller: Arc<RefreshController>,
    pub status: Arc<StatusMonitor>,
    pub services: ServiceGateway,
}

/// Spawns the timers. The first tick of each fires immediately, which doubles
/// as the startup refresh. Every tick runs as its own task, so a request that
/// never answers only loses that tick's update. All timers stop once
/// `shutdown` changes; ticks already in flight are left to finish.
pub fn spawn(
    deps: SchedulerDeps,
    cadence: Cadence,
    shutdown: watch::Receiver<bool>,
) -> Vec<JoinHandle<()>> {
    let SchedulerDeps {
        controller,
        status,
        services,
    } = deps;

    vec![
        spawn_timer("history", cadence.history, shutdown.clone(), move || {
            let controller = controller.clone();
            async move { controller.live_tick().await }
        }),
        spawn_timer("status", cadence.status, shutdown.clone(), move || {
            let status = status.clone();
            async move { status.refresh().await }
        }),
        spawn_timer("services", cadence.services, shutdown, move || {
            let services = services.clone();
            async move {
                services.list_services().await;
            }
        }),
    ]
}

fn spawn_timer<F, Fut>(
    name: &'static str,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
    mut job: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut tick = interval(period);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::debug!(timer = name, period_ms = period.as_millis() as u64, "timer started");

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    tokio::spawn(job());
                }
                _ = shutdown.changed() => break,
            }
        }

        tracing::debug!(timer = name, "timer stopped");
    })
}
