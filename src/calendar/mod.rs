//! Calendar backend consumed by command handlers
//!
//! Handlers only see the [`CalendarBackend`] trait; [`GoogleCalendar`] is the
//! production implementation over the Calendar v3 REST API.

pub mod client;
pub mod event;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::core::error::Result;

pub use client::GoogleCalendar;
pub use event::{Event, EventTime};

#[async_trait]
pub trait CalendarBackend: Send + Sync {
    /// Events overlapping `[time_min, time_max)`, ordered by start time
    async fn list_events(
        &self,
        token: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
        max_results: u32,
    ) -> Result<Vec<Event>>;

    /// Create a timed event and return the stored resource
    async fn create_event(
        &self,
        token: &str,
        title: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Event>;
}
