//! Live-region announcements for assistive technology

use serde::Serialize;
use utoipa::ToSchema;

/// `aria-live` politeness level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Politeness {
    Polite,
    Assertive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Announcement {
    pub message: String,
    pub politeness: Politeness,
    /// How long the host should keep the message in the live region
    pub timeout_ms: Option<u64>,
}

/// Holds the most recent announcement until the host renders it.
#[derive(Debug, Clone, Default)]
pub struct Announcer {
    last: Option<Announcement>,
}

impl Announcer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn announce(&mut self, message: impl Into<String>, politeness: Politeness, timeout_ms: Option<u64>) {
        let message = message.into();
        tracing::debug!(%message, ?politeness, "calendar announcement");
        self.last = Some(Announcement {
            message,
            politeness,
            timeout_ms,
        });
    }

    pub fn last(&self) -> Option<&Announcement> {
        self.last.as_ref()
    }

    /// Hand the pending announcement to the host, leaving the region empty.
    pub fn take(&mut self) -> Option<Announcement> {
        self.last.take()
    }
}
