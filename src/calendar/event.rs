//! Calendar event model and reply formatting

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::core::time;

/// Title shown for events without a summary
pub const UNTITLED: &str = "(제목없음)";

/// Subset of a Calendar v3 event resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub start: Option<EventTime>,
    #[serde(default)]
    pub end: Option<EventTime>,
    #[serde(default)]
    pub html_link: Option<String>,
}

/// Either an all-day `date` or a precise `dateTime`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub date_time: Option<DateTime<FixedOffset>>,
}

impl Event {
    pub fn title(&self) -> &str {
        self.summary.as_deref().unwrap_or(UNTITLED)
    }

    pub fn is_all_day(&self) -> bool {
        self.start.as_ref().is_some_and(|s| s.date.is_some())
    }

    /// Start instant of a timed event
    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        self.start
            .as_ref()
            .and_then(|s| s.date_time)
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// One-line rendering used in list replies
    pub fn display_line(&self) -> String {
        if self.is_all_day() {
            return format!("{} (종일)", self.title());
        }
        match self.starts_at() {
            Some(start) => format!("{} ({})", self.title(), time::pretty(start)),
            None => self.title().to_string(),
        }
    }
}
