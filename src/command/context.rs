//! Per-request context handed to command handlers

use secrecy::ExposeSecret;
use uuid::Uuid;

use crate::auth::AccessToken;
use crate::calendar::CalendarBackend;

pub struct CommandContext<'a> {
    pub token: &'a AccessToken,
    /// Request id carried into handler logs
    pub correlation_id: Uuid,
    pub calendar: &'a dyn CalendarBackend,
}

impl CommandContext<'_> {
    /// Bearer string for calendar calls
    pub fn bearer(&self) -> &str {
        self.token.secret().expose_secret()
    }
}
