//! Typed parameters extracted by command matchers

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Parameters produced by a successful match
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandParams {
    ListEvents(ListQuery),
    CreateEvent(NewEvent),
}

/// Which listing the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListLabel {
    Today,
    Tomorrow,
    Next,
}

impl ListLabel {
    /// Korean word used in replies
    pub fn word(self) -> &'static str {
        match self {
            ListLabel::Today => "오늘",
            ListLabel::Tomorrow => "내일",
            ListLabel::Next => "다음",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListQuery {
    pub label: ListLabel,
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
    pub max_results: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewEvent {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}
