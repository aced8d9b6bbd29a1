// Label formatting - compact axis labels sized to the covered time span
use chrono::{DateTime, Datelike, Local, NaiveDateTime, TimeDelta, TimeZone, Timelike, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelGranularity {
    /// `HH:MM`
    TimeOfDay,
    /// `M-DD`
    MonthDay,
}

impl LabelGranularity {
    pub fn for_span(span: TimeDelta) -> Self {
        if span <= TimeDelta::days(1) {
            LabelGranularity::TimeOfDay
        } else {
            LabelGranularity::MonthDay
        }
    }
}

/// Parse an ISO-8601 timestamp. Values without an offset are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Labels rendered in local time.
pub fn format_labels(raw: &[String]) -> Vec<String> {
    format_labels_in(raw, &Local)
}

/// Produce one label per timestamp. Granularity depends only on the span
/// between the first and the last sample.
pub fn format_labels_in<Tz: TimeZone>(raw: &[String], tz: &Tz) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }

    let parsed: Vec<Option<DateTime<Utc>>> = raw.iter().map(|s| parse_timestamp(s)).collect();
    let span = match (parsed.first(), parsed.last()) {
        (Some(Some(first)), Some(Some(last))) => *last - *first,
        _ => TimeDelta::zero(),
    };
    let granularity = LabelGranularity::for_span(span);

    raw.iter()
        .zip(parsed)
        .map(|(text, ts)| match ts {
            Some(ts) => format_label(&ts.with_timezone(tz), granularity),
            None => text.clone(),
        })
        .collect()
}

fn format_label<Tz: TimeZone>(ts: &DateTime<Tz>, granularity: LabelGranularity) -> String {
    match granularity {
        LabelGranularity::TimeOfDay => format!("{:02}:{:02}", ts.hour(), ts.minute()),
        LabelGranularity::MonthDay => format!("{}-{:02}", ts.month(), ts.day()),
    }
}
