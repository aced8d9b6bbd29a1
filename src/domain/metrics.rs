// Metrics domain models - wire shapes of the host-metrics API
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Treat an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Point-in-time read of the host, as served by `/stats`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MetricSnapshot {
    #[serde(default, deserialize_with = "null_as_default")]
    pub cpu: CpuStats,
    #[serde(default, deserialize_with = "null_as_default")]
    pub memory: MemoryStats,
    #[serde(default, deserialize_with = "null_as_default")]
    pub disk: BTreeMap<String, DiskUsage>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub services: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CpuStats {
    #[serde(default, deserialize_with = "null_as_default")]
    pub avg: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cores: u32,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MemoryStats {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub available: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub percent: f64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DiskUsage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub used: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub free: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub percent: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fstype: String,
}

/// Historical samples returned by `/history`. All arrays run parallel to `labels`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TimeSeriesBundle {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub cpu: Vec<f64>,
    #[serde(default)]
    pub memory: Vec<f64>,
    #[serde(default)]
    pub net_rx: Vec<f64>,
    #[serde(default)]
    pub net_tx: Vec<f64>,
}

impl TimeSeriesBundle {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Returns the name of the first series whose length differs from `labels`.
    pub fn mismatched_series(&self) -> Option<&'static str> {
        let expected = self.labels.len();
        [
            ("cpu", self.cpu.len()),
            ("memory", self.memory.len()),
            ("net_rx", self.net_rx.len()),
            ("net_tx", self.net_tx.len()),
        ]
        .into_iter()
        .find(|(_, len)| *len != expected)
        .map(|(name, _)| name)
    }
}
