// Chart domain models
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every rendering target on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartView {
    Cpu,
    Memory,
    Network,
    LoadLeft,
    LoadRight,
    Overview,
    LoadGauge,
    CpuGauge,
    RamGauge,
    DiskGauge,
}

impl ChartView {
    /// Views fed from a `/history` bundle, in render order.
    pub const SERIES: [ChartView; 6] = [
        ChartView::Cpu,
        ChartView::Memory,
        ChartView::Network,
        ChartView::LoadLeft,
        ChartView::LoadRight,
        ChartView::Overview,
    ];
}

/// The subset of series views a refresh is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Top,
    Cpu,
    Memory,
    All,
}

impl Target {
    /// Cards that own a range selection of their own.
    pub const CARDS: [Target; 3] = [Target::Top, Target::Cpu, Target::Memory];

    pub fn views(self) -> &'static [ChartView] {
        match self {
            Target::Top => &[ChartView::LoadLeft, ChartView::LoadRight, ChartView::Overview],
            Target::Cpu => &[ChartView::Cpu],
            Target::Memory => &[ChartView::Memory],
            Target::All => &ChartView::SERIES,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Target::Top => "top",
            Target::Cpu => "cpu",
            Target::Memory => "memory",
            Target::All => "all",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(Target::Top),
            "cpu" => Ok(Target::Cpu),
            "memory" => Ok(Target::Memory),
            "all" => Ok(Target::All),
            other => Err(format!("unknown target: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    pub values: Vec<f64>,
}

impl Dataset {
    pub fn new(label: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            values,
        }
    }
}

/// Labels plus datasets owned by a single chart view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartFrame {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

impl ChartFrame {
    pub fn new(labels: Vec<String>, datasets: Vec<Dataset>) -> Self {
        Self { labels, datasets }
    }
}
