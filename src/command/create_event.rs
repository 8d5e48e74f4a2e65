//! "내일 3시 회의 추가" style event creation

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::command::context::CommandContext;
use crate::command::params::{CommandParams, NewEvent};
use crate::command::parse::{schedule, strip_action_keyword};
use crate::command::registry::Command;
use crate::core::error::{DispatchError, Result};
use crate::core::time;

/// Length of every created event
pub const EVENT_DURATION_MINUTES: i64 = 60;

pub struct CreateEvent;

#[async_trait]
impl Command for CreateEvent {
    fn id(&self) -> &'static str {
        "create-event"
    }

    fn description(&self) -> &'static str {
        "간단 문장으로 일정 추가"
    }

    fn examples(&self) -> &'static [&'static str] {
        &["내일 3시 회의 추가", "오늘 14:30 치과 추가"]
    }

    fn tags(&self) -> &'static [&'static str] {
        &["calendar", "create"]
    }

    fn matches(&self, text: &str, now: DateTime<Utc>) -> Option<CommandParams> {
        let (rest, when) = schedule(text).ok()?;
        let title = strip_action_keyword(rest)?.trim();
        if title.is_empty() {
            return None;
        }

        // Out-of-range hours and minutes roll forward from local midnight
        let start = time::local_time_on(now, when.day.offset(), when.hour, when.minute);
        Some(CommandParams::CreateEvent(NewEvent {
            title: title.to_string(),
            start,
            end: start + Duration::minutes(EVENT_DURATION_MINUTES),
        }))
    }

    async fn handle(&self, ctx: &CommandContext<'_>, params: &CommandParams) -> Result<String> {
        let CommandParams::CreateEvent(event) = params else {
            return Err(DispatchError::ParamMismatch(self.id().into()));
        };

        let created = ctx
            .calendar
            .create_event(ctx.bearer(), &event.title, event.start, event.end)
            .await?;
        let title = created.summary.as_deref().unwrap_or(&event.title);
        info!(
            correlation_id = %ctx.correlation_id,
            event_id = created.id.as_deref().unwrap_or("-"),
            "event created"
        );

        Ok(format!("추가 완료: {} ({})", title, time::pretty(event.start)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        // 2024-03-10 12:00 KST
        Utc.with_ymd_and_hms(2024, 3, 10, 3, 0, 0).unwrap()
    }

    fn extract(text: &str) -> Option<NewEvent> {
        match CreateEvent.matches(text, now())? {
            CommandParams::CreateEvent(e) => Some(e),
            _ => None,
        }
    }

    #[test]
    fn test_tomorrow_hour() {
        let event = extract("내일 3시 회의 추가").unwrap();
        assert_eq!(event.title, "회의");
        assert_eq!(time::pretty(event.start), "2024-03-11 03:00");
        assert_eq!(event.end - event.start, Duration::minutes(60));
    }

    #[test]
    fn test_today_hour_minute() {
        let event = extract("오늘 14:30 치과 추가").unwrap();
        assert_eq!(event.title, "치과");
        assert_eq!(time::pretty(event.start), "2024-03-10 14:30");
        assert_eq!(time::pretty(event.end), "2024-03-10 15:30");
    }

    #[test]
    fn test_register_keyword_and_multiword_title() {
        let event = extract("내일 9시   팀 점심   등록").unwrap();
        assert_eq!(event.title, "팀 점심");
    }

    #[test]
    fn test_late_evening_rolls_end_into_next_day() {
        let event = extract("오늘 23:30 야간 배포 추가").unwrap();
        assert_eq!(time::pretty(event.end), "2024-03-11 00:30");
    }

    #[test]
    fn test_out_of_range_time_rolls_forward() {
        let event = extract("내일 25시 회의 추가").unwrap();
        assert_eq!(time::pretty(event.start), "2024-03-12 01:00");

        let event = extract("오늘 10:75 회의 추가").unwrap();
        assert_eq!(time::pretty(event.start), "2024-03-10 11:15");
    }

    #[test]
    fn test_unicode_whitespace_between_tokens() {
        let event = extract("내일\u{3000}3시\u{3000}회의\u{3000}추가").unwrap();
        assert_eq!(event.title, "회의");
        assert_eq!(time::pretty(event.start), "2024-03-11 03:00");
    }

    #[test]
    fn test_rejections() {
        assert!(extract("내일 3시 회의").is_none());
        assert!(extract("내일 세시 회의 추가").is_none());
        assert!(extract("내일 3시 추가").is_none());
        assert!(extract("다음주 3시 회의 추가").is_none());
        assert!(extract("회의 추가해줘 내일 3시").is_none());
    }
}
