//! "오늘/내일/다음 일정" listings

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::calendar::Event;
use crate::command::context::CommandContext;
use crate::command::params::{CommandParams, ListLabel, ListQuery};
use crate::command::parse::contains_all;
use crate::command::registry::Command;
use crate::core::error::{DispatchError, Result};
use crate::core::time;

/// Results requested for a whole-day listing
pub const DAY_MAX_RESULTS: u32 = 20;

/// Lines rendered in a listing reply; the count header still shows the total
pub const MAX_LINES: usize = 10;

/// How far ahead "다음 일정" looks
pub const NEXT_WINDOW_DAYS: i64 = 7;

const SCHEDULE_KEYWORD: &str = "일정";

pub struct ListEvents;

impl ListEvents {
    fn day_query(label: ListLabel, now: DateTime<Utc>, day_offset: i64) -> ListQuery {
        let (time_min, time_max) = time::day_range(now, day_offset);
        ListQuery {
            label,
            time_min,
            time_max,
            max_results: DAY_MAX_RESULTS,
        }
    }
}

#[async_trait]
impl Command for ListEvents {
    fn id(&self) -> &'static str {
        "list-events"
    }

    fn description(&self) -> &'static str {
        "오늘/내일/다음 일정 조회"
    }

    fn examples(&self) -> &'static [&'static str] {
        &["오늘 일정 알려줘", "내일 일정", "다음 일정 보여줘"]
    }

    fn tags(&self) -> &'static [&'static str] {
        &["calendar", "list"]
    }

    fn matches(&self, text: &str, now: DateTime<Utc>) -> Option<CommandParams> {
        let query = if contains_all(text, &["오늘", SCHEDULE_KEYWORD]) {
            Self::day_query(ListLabel::Today, now, 0)
        } else if contains_all(text, &["내일", SCHEDULE_KEYWORD]) {
            Self::day_query(ListLabel::Tomorrow, now, 1)
        } else if contains_all(text, &["다음", SCHEDULE_KEYWORD]) {
            ListQuery {
                label: ListLabel::Next,
                time_min: now,
                time_max: now + Duration::days(NEXT_WINDOW_DAYS),
                max_results: 1,
            }
        } else {
            return None;
        };
        Some(CommandParams::ListEvents(query))
    }

    async fn handle(&self, ctx: &CommandContext<'_>, params: &CommandParams) -> Result<String> {
        let CommandParams::ListEvents(query) = params else {
            return Err(DispatchError::ParamMismatch(self.id().into()));
        };

        let events = ctx
            .calendar
            .list_events(ctx.bearer(), query.time_min, query.time_max, query.max_results)
            .await?;
        debug!(
            correlation_id = %ctx.correlation_id,
            label = query.label.word(),
            count = events.len(),
            "listed events"
        );

        Ok(match query.label {
            ListLabel::Next => format_next(&events),
            label => format_list(label, &events),
        })
    }
}

fn format_next(events: &[Event]) -> String {
    match events.first() {
        Some(event) => format!("다음 일정: {}", event.display_line()),
        None => format!("앞으로 {}일 내 일정이 없습니다.", NEXT_WINDOW_DAYS),
    }
}

fn format_list(label: ListLabel, events: &[Event]) -> String {
    if events.is_empty() {
        return format!("{} 일정 없습니다.", label.word());
    }

    let lines: Vec<String> = events
        .iter()
        .take(MAX_LINES)
        .map(|event| format!("- {}", event.display_line()))
        .collect();
    format!(
        "{} 일정 {}건:\n{}",
        label.word(),
        events.len(),
        lines.join("\n")
    )
}
