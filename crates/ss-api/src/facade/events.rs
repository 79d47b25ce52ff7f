use super::{require, StyleSync};
use crate::record::RecordFilter;
use ss_core::error::Result;
use ss_core::models::{Event, EventUpdate, NewEvent};

pub const DEFAULT_UPCOMING_LIMIT: usize = 10;

pub struct EventsApi<'a> {
    pub(super) app: &'a StyleSync,
}

impl EventsApi<'_> {
    /// All events, earliest date first, with the linked outfit attached.
    pub async fn list(&self, owner: &str) -> Vec<Event> {
        self.app.events.fetch(owner, &RecordFilter::All).await
    }

    /// Events from today on, at most `limit` (10 when `None`).
    pub async fn upcoming(&self, owner: &str, limit: Option<usize>) -> Vec<Event> {
        let filter = RecordFilter::Upcoming {
            from: StyleSync::today(),
            limit: limit.unwrap_or(DEFAULT_UPCOMING_LIMIT),
        };
        self.app.events.fetch(owner, &filter).await
    }

    pub async fn create(&self, owner: &str, draft: NewEvent) -> Result<Event> {
        require("title", &draft.title)?;
        self.app.events.create(owner, serde_json::to_value(&draft)?).await
    }

    pub async fn update(&self, owner: &str, id: &str, patch: EventUpdate) -> Result<Event> {
        self.app.update_owned(owner, id, &patch).await
    }

    pub async fn delete(&self, owner: &str, id: &str) -> Result<()> {
        self.app.delete_owned::<Event>(owner, id).await
    }
}
