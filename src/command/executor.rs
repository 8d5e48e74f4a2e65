//! Command execution - text in, reply out
//!
//! Every failure is turned into a reply string here, so callers always get
//! content back.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::TokenSource;
use crate::calendar::CalendarBackend;
use crate::command::context::CommandContext;
use crate::command::registry::CommandRegistry;
use crate::core::error::Result;

/// Reply for blank input
pub const EMPTY_COMMAND_REPLY: &str = "명령이 비어 있습니다.";

/// Runs resolved commands against the calendar
pub struct CommandExecutor {
    registry: Arc<CommandRegistry>,
    tokens: Arc<dyn TokenSource>,
    calendar: Arc<dyn CalendarBackend>,
}

impl CommandExecutor {
    pub fn new(
        registry: Arc<CommandRegistry>,
        tokens: Arc<dyn TokenSource>,
        calendar: Arc<dyn CalendarBackend>,
    ) -> Self {
        Self {
            registry,
            tokens,
            calendar,
        }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Execute one text command, always producing a reply
    pub async fn execute(&self, text: &str) -> String {
        let correlation_id = Uuid::new_v4();
        match self.try_execute(text, correlation_id).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(%correlation_id, error = %e, "command failed");
                e.reply()
            }
        }
    }

    async fn try_execute(&self, text: &str, correlation_id: Uuid) -> Result<String> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(EMPTY_COMMAND_REPLY.to_string());
        }

        let now = Utc::now();
        let Some(resolved) = self.registry.resolve_at(text, now) else {
            info!(%correlation_id, "no command matched");
            return Ok(self.registry.help_text());
        };

        let command = resolved.command.id();
        info!(%correlation_id, command, "command resolved");

        let token = self.tokens.access_token().await?;
        let ctx = CommandContext {
            token: &token,
            correlation_id,
            calendar: self.calendar.as_ref(),
        };

        let reply = resolved.command.handle(&ctx, &resolved.params).await?;
        info!(%correlation_id, command, "command handled");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AccessToken;
    use crate::calendar::Event;
    use crate::command::builtin_registry;
    use crate::command::params::{CommandParams, ListLabel, ListQuery};
    use crate::command::registry::Command;
    use crate::core::error::DispatchError;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use secrecy::SecretString;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingTokens {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TokenSource for CountingTokens {
        async fn access_token(&self) -> Result<AccessToken> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(AccessToken::new(SecretString::from("t".to_string()), i64::MAX))
        }
    }

    struct EmptyCalendar;

    #[async_trait]
    impl CalendarBackend for EmptyCalendar {
        async fn list_events(
            &self,
            _token: &str,
            _min: DateTime<Utc>,
            _max: DateTime<Utc>,
            _max_results: u32,
        ) -> Result<Vec<Event>> {
            Ok(Vec::new())
        }

        async fn create_event(
            &self,
            _token: &str,
            _title: &str,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> Result<Event> {
            Err(DispatchError::CalendarApi {
                operation: "createEvent",
                status: 500,
            })
        }
    }

    fn executor(tokens: Arc<CountingTokens>) -> CommandExecutor {
        CommandExecutor::new(Arc::new(builtin_registry()), tokens, Arc::new(EmptyCalendar))
    }

    #[tokio::test]
    async fn test_blank_text() {
        let tokens = Arc::new(CountingTokens::default());
        let reply = executor(tokens.clone()).execute("   ").await;
        assert_eq!(reply, EMPTY_COMMAND_REPLY);
        assert_eq!(tokens.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unmatched_text_returns_help_without_token() {
        let tokens = Arc::new(CountingTokens::default());
        let exec = executor(tokens.clone());
        let reply = exec.execute("안녕").await;
        assert_eq!(reply, exec.registry().help_text());
        assert_eq!(tokens.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_matched_text_mints_one_token() {
        let tokens = Arc::new(CountingTokens::default());
        let reply = executor(tokens.clone()).execute("오늘 일정").await;
        assert_eq!(reply, "오늘 일정 없습니다.");
        assert_eq!(tokens.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_calendar_failure_becomes_reply() {
        let tokens = Arc::new(CountingTokens::default());
        let reply = executor(tokens).execute("내일 3시 회의 추가").await;
        assert_eq!(reply, "오류: createEvent 500");
    }

    /// Replies with the correlation id it was handed
    struct EchoCorrelation;

    #[async_trait]
    impl Command for EchoCorrelation {
        fn id(&self) -> &'static str {
            "echo"
        }

        fn description(&self) -> &'static str {
            "echo"
        }

        fn examples(&self) -> &'static [&'static str] {
            &["echo"]
        }

        fn matches(&self, text: &str, now: DateTime<Utc>) -> Option<CommandParams> {
            (text == "echo").then(|| {
                CommandParams::ListEvents(ListQuery {
                    label: ListLabel::Next,
                    time_min: now,
                    time_max: now,
                    max_results: 1,
                })
            })
        }

        async fn handle(&self, ctx: &CommandContext<'_>, _params: &CommandParams) -> Result<String> {
            Ok(ctx.correlation_id.to_string())
        }
    }

    #[tokio::test]
    async fn test_each_request_gets_its_own_correlation_id() {
        let exec = CommandExecutor::new(
            Arc::new(CommandRegistry::new(vec![Box::new(EchoCorrelation)])),
            Arc::new(CountingTokens::default()),
            Arc::new(EmptyCalendar),
        );
        let first = Uuid::parse_str(&exec.execute("echo").await).unwrap();
        let second = Uuid::parse_str(&exec.execute("echo").await).unwrap();
        assert_eq!(first.get_version_num(), 4);
        assert_ne!(first, second);
    }
}
