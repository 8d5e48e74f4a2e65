//! Google Calendar v3 REST client

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calendar::{CalendarBackend, Event};
use crate::core::error::{DispatchError, Result};
use crate::core::time;

/// Calendar client bound to a single calendar id
pub struct GoogleCalendar {
    client: Client,
    api_base: String,
    calendar_id: String,
}

impl GoogleCalendar {
    pub fn new(api_base: String, calendar_id: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DispatchError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            api_base,
            calendar_id,
        })
    }

    /// `{api_base}/calendars/{calendar_id}/events` with the id percent-encoded
    fn events_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.api_base).map_err(|e| {
            DispatchError::Config(format!("invalid calendar api base {}: {}", self.api_base, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                DispatchError::Config(format!("calendar api base {} cannot be a base", self.api_base))
            })?
            .pop_if_empty()
            .push("calendars")
            .push(&self.calendar_id)
            .push("events");
        Ok(url)
    }
}

#[async_trait]
impl CalendarBackend for GoogleCalendar {
    async fn list_events(
        &self,
        token: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
        max_results: u32,
    ) -> Result<Vec<Event>> {
        let url = self.events_url()?;
        let query = [
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
            ("timeMin", time::to_api_timestamp(time_min)),
            ("timeMax", time::to_api_timestamp(time_max)),
            ("maxResults", max_results.to_string()),
        ];

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(&query)
            .send()
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::CalendarApi {
                operation: "listEvents",
                status: status.as_u16(),
            });
        }

        let list: EventList = response
            .json()
            .await
            .map_err(|e| DispatchError::Transport(format!("listEvents: {}", e)))?;
        debug!(count = list.items.len(), "listed events");
        Ok(list.items)
    }

    async fn create_event(
        &self,
        token: &str,
        title: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Event> {
        let url = self.events_url()?;
        let request = InsertRequest {
            summary: title,
            start: InsertTime {
                date_time: time::to_api_timestamp(start),
                time_zone: time::KST_ZONE,
            },
            end: InsertTime {
                date_time: time::to_api_timestamp(end),
                time_zone: time::KST_ZONE,
            },
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::CalendarApi {
                operation: "createEvent",
                status: status.as_u16(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| DispatchError::Transport(format!("createEvent: {}", e)))
    }
}

#[derive(Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<Event>,
}

#[derive(Serialize)]
struct InsertRequest<'a> {
    summary: &'a str,
    start: InsertTime,
    end: InsertTime,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InsertTime {
    date_time: String,
    time_zone: &'static str,
}
