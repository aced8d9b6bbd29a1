// Time range selection for history charts
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use thiserror::Error;

/// Preset keyword that switches a card into explicit start/end mode.
pub const CUSTOM_RANGE: &str = "custom";

#[derive(Debug, Error, PartialEq)]
pub enum RangeError {
    #[error("Please select both start and end dates")]
    MissingBounds,
    #[error("invalid date or timestamp: {0}")]
    InvalidBound(String),
    #[error("range must not be empty")]
    EmptyRange,
}

/// Range currently selected on a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum RangeSelection {
    Preset { range: String },
    Custom { start: String, end: String },
}

impl RangeSelection {
    pub fn preset(range: impl Into<String>) -> Self {
        RangeSelection::Preset {
            range: range.into(),
        }
    }

    /// Builds a selection from a user action. `custom` requires both bounds.
    pub fn from_request(
        range: &str,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Self, RangeError> {
        let range = range.trim();
        if range.is_empty() {
            return Err(RangeError::EmptyRange);
        }
        if range != CUSTOM_RANGE {
            return Ok(RangeSelection::preset(range));
        }

        let (start, end) = match (non_empty(start), non_empty(end)) {
            (Some(s), Some(e)) => (s, e),
            _ => return Err(RangeError::MissingBounds),
        };
        let start = normalize_start(start).ok_or_else(|| RangeError::InvalidBound(start.into()))?;
        let end = normalize_end(end).ok_or_else(|| RangeError::InvalidBound(end.into()))?;
        Ok(RangeSelection::Custom { start, end })
    }

    /// Live cards follow the default preset and are auto-refreshed.
    pub fn is_live(&self, default_range: &str) -> bool {
        matches!(self, RangeSelection::Preset { range } if range == default_range)
    }

    /// Preset name to pass alongside a custom pair; `custom` for explicit windows.
    pub fn range_name(&self) -> &str {
        match self {
            RangeSelection::Preset { range } => range,
            RangeSelection::Custom { .. } => CUSTOM_RANGE,
        }
    }

    pub fn custom_bounds(&self) -> (Option<&str>, Option<&str>) {
        match self {
            RangeSelection::Preset { .. } => (None, None),
            RangeSelection::Custom { start, end } => (Some(start), Some(end)),
        }
    }
}

/// Exactly one of the two `/history` query mechanisms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryQuery {
    Preset(String),
    Window { start: String, end: String },
}

impl HistoryQuery {
    /// A valid custom pair takes priority over the preset name.
    pub fn resolve(range: &str, custom_start: Option<&str>, custom_end: Option<&str>) -> Self {
        let start = non_empty(custom_start).and_then(normalize_start);
        let end = non_empty(custom_end).and_then(normalize_end);
        match (start, end) {
            (Some(start), Some(end)) => HistoryQuery::Window { start, end },
            _ => HistoryQuery::Preset(range.to_string()),
        }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        match self {
            HistoryQuery::Preset(range) => vec![("range", range.as_str())],
            HistoryQuery::Window { start, end } => {
                vec![("start", start.as_str()), ("end", end.as_str())]
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            HistoryQuery::Preset(range) => range.clone(),
            HistoryQuery::Window { start, end } => format!("{}..{}", start, end),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn is_timestamp(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
}

fn is_date(value: &str) -> bool {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Bare dates start at midnight UTC.
fn normalize_start(value: &str) -> Option<String> {
    if is_date(value) {
        Some(format!("{}T00:00:00Z", value))
    } else if is_timestamp(value) {
        Some(value.to_string())
    } else {
        None
    }
}

/// Bare dates end on the last second of the day.
fn normalize_end(value: &str) -> Option<String> {
    if is_date(value) {
        Some(format!("{}T23:59:59Z", value))
    } else if is_timestamp(value) {
        Some(value.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_prefers_valid_custom_pair() {
        let query = HistoryQuery::resolve("today", Some("2025-10-01"), Some("2025-10-03"));
        assert_eq!(
            query,
            HistoryQuery::Window {
                start: "2025-10-01T00:00:00Z".to_string(),
                end: "2025-10-03T23:59:59Z".to_string(),
            }
        );
    }

    #[test]
    fn test_resolve_falls_back_to_preset() {
        assert_eq!(
            HistoryQuery::resolve("7d", Some("2025-10-01"), None),
            HistoryQuery::Preset("7d".to_string())
        );
        assert_eq!(
            HistoryQuery::resolve("7d", Some("yesterday-ish"), Some("2025-10-03")),
            HistoryQuery::Preset("7d".to_string())
        );
    }

    #[test]
    fn test_query_pairs_never_mix_mechanisms() {
        let preset = HistoryQuery::Preset("today".to_string());
        assert_eq!(preset.query_pairs(), vec![("range", "today")]);

        let window = HistoryQuery::resolve("today", Some("2025-10-29T08:00:00Z"), Some("2025-10-29T09:00:00Z"));
        let keys: Vec<&str> = window.query_pairs().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["start", "end"]);
    }

    #[test]
    fn test_custom_selection_requires_both_bounds() {
        assert_eq!(
            RangeSelection::from_request("custom", Some("2025-10-01"), Some("  ")),
            Err(RangeError::MissingBounds)
        );
        assert_eq!(
            RangeSelection::from_request("custom", Some("tomorrow"), Some("2025-10-02")),
            Err(RangeError::InvalidBound("tomorrow".to_string()))
        );
        assert_eq!(RangeSelection::from_request(" ", None, None), Err(RangeError::EmptyRange));
    }

    #[test]
    fn test_preset_selection_ignores_bounds() {
        let selection = RangeSelection::from_request("yesterday", Some("2025-10-01"), None).unwrap();
        assert_eq!(selection, RangeSelection::preset("yesterday"));
        assert!(!selection.is_live("today"));
        assert!(RangeSelection::preset("today").is_live("today"));
    }

    #[test]
    fn test_custom_selection_is_never_live() {
        let selection =
            RangeSelection::from_request("custom", Some("2025-10-01"), Some("2025-10-02")).unwrap();
        assert!(!selection.is_live("today"));
        assert_eq!(selection.range_name(), "custom");
        assert_eq!(
            selection.custom_bounds(),
            (Some("2025-10-01T00:00:00Z"), Some("2025-10-02T23:59:59Z"))
        );
    }
}
