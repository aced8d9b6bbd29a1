// Status aggregation - snapshot to status cards, gauges and disk rows
use crate::application::dashboard_surface::DashboardSurface;
use crate::application::metrics_backend::MetricsBackend;
use crate::domain::metrics::MetricSnapshot;
use crate::domain::status::{
    DiskAggregate, DiskRow, GaugeReading, StatusCard, StatusCardId, StatusSummary,
};
use std::sync::Arc;

const BYTE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
const MIB: f64 = 1024.0 * 1024.0;
const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Human readable byte count: largest fitting unit, at most 2 decimals,
/// trailing zeros dropped.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut unit = 0;
    let mut scale: u64 = 1;
    while unit + 1 < BYTE_UNITS.len() && bytes / scale >= 1024 {
        scale *= 1024;
        unit += 1;
    }

    let scaled = format!("{:.2}", bytes as f64 / scale as f64);
    let scaled = scaled.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", scaled, BYTE_UNITS[unit])
}

/// Mean percent across mounts (unweighted) and summed byte totals.
pub fn aggregate_disks(snapshot: &MetricSnapshot) -> DiskAggregate {
    if snapshot.disk.is_empty() {
        return DiskAggregate::default();
    }

    let count = snapshot.disk.len() as f64;
    DiskAggregate {
        percent: snapshot.disk.values().map(|d| d.percent).sum::<f64>() / count,
        total_bytes: snapshot.disk.values().map(|d| d.total).sum(),
        used_bytes: snapshot.disk.values().map(|d| d.used).sum(),
    }
}

/// Reduce a snapshot to the four status cards plus the disk list.
/// Values are passed through unclamped.
pub fn summarize(snapshot: &MetricSnapshot) -> StatusSummary {
    let cpu = snapshot.cpu.avg;
    let memory = &snapshot.memory;
    let disk = aggregate_disks(snapshot);

    let used_mib = (memory.total.saturating_sub(memory.available) as f64 / MIB).round();
    let total_mib = (memory.total as f64 / MIB).round();

    let cards = StatusCardId::ALL
        .iter()
        .map(|id| {
            let (value, detail) = match id {
                StatusCardId::Load => (cpu, "Smooth operation".to_string()),
                StatusCardId::Cpu => (cpu, format!("{} Core(s)", snapshot.cpu.cores)),
                StatusCardId::Ram => (
                    memory.percent,
                    format!("{} / {}MB", used_mib, total_mib),
                ),
                StatusCardId::Disk => (
                    disk.percent,
                    format!(
                        "{:.1}G / {:.1}G",
                        disk.used_bytes as f64 / GIB,
                        disk.total_bytes as f64 / GIB
                    ),
                ),
            };
            StatusCard {
                id: *id,
                gauge_view: id.gauge(),
                value: value.round() as i64,
                detail,
                gauge: GaugeReading::new(value),
            }
        })
        .collect();

    let disks = snapshot
        .disk
        .iter()
        .map(|(mount, usage)| DiskRow {
            mount: mount.clone(),
            fstype: usage.fstype.clone(),
            percent: usage.percent,
            total: format_bytes(usage.total),
            used: format_bytes(usage.used),
            free: format_bytes(usage.free),
        })
        .collect();

    StatusSummary { cards, disk, disks }
}

/// Polls `/stats` and pushes the summary to the surface.
pub struct StatusMonitor {
    backend: Arc<dyn MetricsBackend>,
    surface: Arc<dyn DashboardSurface>,
}

impl StatusMonitor {
    pub fn new(backend: Arc<dyn MetricsBackend>, surface: Arc<dyn DashboardSurface>) -> Self {
        Self { backend, surface }
    }

    pub async fn refresh(&self) {
        match self.backend.fetch_snapshot().await {
            Ok(snapshot) => {
                let summary = summarize(&snapshot);
                tracing::debug!(
                    cpu = snapshot.cpu.avg,
                    memory = snapshot.memory.percent,
                    disk = summary.disk.percent,
                    mounts = summary.disks.len(),
                    "status refreshed"
                );
                self.surface.render_status(summary);
            }
            Err(e) => {
                tracing::warn!(
                    operation = "fetch_snapshot",
                    error = %e,
                    "status refresh failed, keeping previous status"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::{CpuStats, DiskUsage, MemoryStats};

    fn card(summary: &StatusSummary, id: StatusCardId) -> &StatusCard {
        summary.cards.iter().find(|c| c.id == id).unwrap()
    }

    fn disk(percent: f64, total: u64, used: u64) -> DiskUsage {
        DiskUsage {
            total,
            used,
            free: total - used,
            percent,
            fstype: "ext4".to_string(),
        }
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1024), "1 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1_073_741_824), "1 GB");
        assert_eq!(format_bytes(1_288_490_189), "1.2 GB");
        assert_eq!(format_bytes(5 * 1024u64.pow(4)), "5 TB");
        assert_eq!(format_bytes(2048 * 1024u64.pow(4)), "2048 TB");
    }

    #[test]
    fn test_disk_aggregate_is_unweighted_mean() {
        let mut snapshot = MetricSnapshot::default();
        snapshot.disk.insert("/".to_string(), disk(50.0, 100, 50));
        snapshot.disk.insert("/data".to_string(), disk(100.0, 1000, 1000));

        let aggregate = aggregate_disks(&snapshot);
        assert_eq!(aggregate.percent, 75.0);
        assert_eq!(aggregate.total_bytes, 1100);
        assert_eq!(aggregate.used_bytes, 1050);
    }

    #[test]
    fn test_zero_mounts() {
        let summary = summarize(&MetricSnapshot::default());
        assert_eq!(summary.disk, DiskAggregate::default());
        assert!(summary.disks.is_empty());

        let card = card(&summary, StatusCardId::Disk);
        assert_eq!(card.value, 0);
        assert_eq!(card.detail, "0.0G / 0.0G");
        assert_eq!(card.gauge, GaugeReading::new(0.0));
    }

    #[test]
    fn test_cards_keyed_by_id() {
        let snapshot = MetricSnapshot {
            cpu: CpuStats {
                avg: 37.6,
                cores: 8,
            },
            memory: MemoryStats {
                total: 8 * 1024 * 1024 * 1024,
                available: 6 * 1024 * 1024 * 1024,
                percent: 25.0,
            },
            ..Default::default()
        };
        let summary = summarize(&snapshot);

        let load = card(&summary, StatusCardId::Load);
        assert_eq!(load.value, 38);
        assert_eq!(load.detail, "Smooth operation");
        assert_eq!(load.gauge.remainder, 100.0 - 37.6);

        let cpu = card(&summary, StatusCardId::Cpu);
        assert_eq!(cpu.detail, "8 Core(s)");

        let ram = card(&summary, StatusCardId::Ram);
        assert_eq!(ram.value, 25);
        assert_eq!(ram.detail, "2048 / 8192MB");
        assert_eq!(ram.gauge_view, crate::domain::chart::ChartView::RamGauge);
    }

    #[test]
    fn test_values_are_not_clamped() {
        let snapshot = MetricSnapshot {
            cpu: CpuStats {
                avg: 120.0,
                cores: 1,
            },
            ..Default::default()
        };
        let card = summarize(&snapshot).cards[1].clone();
        assert_eq!(card.gauge.value, 120.0);
        assert_eq!(card.gauge.remainder, -20.0);
    }

    #[test]
    fn test_disk_rows() {
        let mut snapshot = MetricSnapshot::default();
        snapshot.disk.insert("/".to_string(), disk(50.0, 2048, 1024));

        let rows = summarize(&snapshot).disks;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].mount, "/");
        assert_eq!(rows[0].fstype, "ext4");
        assert_eq!(rows[0].total, "2 KB");
        assert_eq!(rows[0].used, "1 KB");
        assert_eq!(rows[0].free, "1 KB");
    }
}
