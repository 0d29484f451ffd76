//! Transient notifications and the recent-activity feed.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use strum_macros::{AsRefStr, Display};

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: u64,
    pub level: Level,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Holds notifications until they expire or are dismissed.
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    ttl: TimeDelta,
    next_id: u64,
    items: Vec<Notification>,
}

impl NotificationCenter {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            next_id: 1,
            items: Vec::new(),
        }
    }

    /// Adds a notification and returns its id. The message is also logged
    /// at the matching level.
    pub fn push(&mut self, level: Level, message: impl Into<String>, now: DateTime<Utc>) -> u64 {
        let message = message.into();
        match level {
            Level::Info | Level::Success => log::info!("{message}"),
            Level::Warning => log::warn!("{message}"),
            Level::Error => log::error!("{message}"),
        }

        let id = self.next_id;
        self.next_id += 1;
        self.items.push(Notification {
            id,
            level,
            message,
            created_at: now,
            expires_at: now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        });
        id
    }

    /// Notifications still visible at `now`, oldest first.
    pub fn active(&self, now: DateTime<Utc>) -> impl Iterator<Item = &Notification> {
        self.items.iter().filter(move |n| n.expires_at > now)
    }

    /// Removes notification `id`. Returns whether it existed.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }

    /// Drops expired notifications.
    pub fn prune(&mut self, now: DateTime<Utc>) {
        self.items.retain(|n| n.expires_at > now);
    }

    /// Most recent notification, expired or not.
    #[must_use]
    pub fn latest(&self) -> Option<&Notification> {
        self.items.last()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Maximum number of entries kept by [`ActivityLog`].
pub const ACTIVITY_CAPACITY: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityEntry {
    pub title: String,
    pub description: String,
    pub at: DateTime<Utc>,
}

/// The latest few things that happened in the session, newest first.
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
}

impl ActivityLog {
    pub fn record(
        &mut self,
        title: impl Into<String>,
        description: impl Into<String>,
        at: DateTime<Utc>,
    ) {
        self.entries.push_front(ActivityEntry {
            title: title.into(),
            description: description.into(),
            at,
        });
        self.entries.truncate(ACTIVITY_CAPACITY);
    }

    pub fn entries(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
