use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A travel advisory. Inactive or expired alerts are excluded from
/// "current" queries but kept in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub active: bool,
    pub alert_type: String,
    pub title: String,
    pub body: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Alert {
    pub fn new(alert_type: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            active: true,
            alert_type: alert_type.into(),
            title: title.into(),
            body: None,
            expires_at: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.active && self.expires_at.map(|e| e > now).unwrap_or(true)
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.alert_type, self.title)
    }
}
