// Status card domain models
use super::chart::ChartView;
use serde::Serialize;

/// Stable identifiers for the four status cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusCardId {
    Load,
    Cpu,
    Ram,
    Disk,
}

impl StatusCardId {
    pub const ALL: [StatusCardId; 4] = [
        StatusCardId::Load,
        StatusCardId::Cpu,
        StatusCardId::Ram,
        StatusCardId::Disk,
    ];

    pub fn gauge(self) -> ChartView {
        match self {
            StatusCardId::Load => ChartView::LoadGauge,
            StatusCardId::Cpu => ChartView::CpuGauge,
            StatusCardId::Ram => ChartView::RamGauge,
            StatusCardId::Disk => ChartView::DiskGauge,
        }
    }
}

/// Ratio gauge slices: `value` against `100 - value`. Not clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GaugeReading {
    pub value: f64,
    pub remainder: f64,
}

impl GaugeReading {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            remainder: 100.0 - value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCard {
    pub id: StatusCardId,
    pub gauge_view: ChartView,
    /// Rounded value shown in the card body.
    pub value: i64,
    pub detail: String,
    pub gauge: GaugeReading,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskRow {
    pub mount: String,
    pub fstype: String,
    pub percent: f64,
    pub total: String,
    pub used: String,
    pub free: String,
}

/// Cross-mount totals. `percent` is the unweighted mean of the mounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DiskAggregate {
    pub percent: f64,
    pub total_bytes: u64,
    pub used_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSummary {
    pub cards: Vec<StatusCard>,
    pub disk: DiskAggregate,
    pub disks: Vec<DiskRow>,
}
