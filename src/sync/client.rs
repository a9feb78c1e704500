//! HTTP client for the remote backing service's snapshot endpoint.

use crate::config::SyncConfig;
use crate::store::{Snapshot, Table};

use super::remote::{self, Record};

/// Errors that can occur during sync operations.
#[derive(Debug)]
pub enum SyncError {
    /// Sync is not configured
    NotConfigured,
    /// HTTP request failed or returned an error status
    Http(String),
    /// Change feed connection or protocol error
    Feed(String),
    /// Remote record did not match the expected shape
    Malformed { table: Table, reason: String },
    /// Local store error
    Store(sqlx::Error),
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncError::NotConfigured => write!(
                f,
                "Sync not configured. Add server_url and api_key to config."
            ),
            SyncError::Http(e) => write!(f, "HTTP error: {}", e),
            SyncError::Feed(e) => write!(f, "Change feed error: {}", e),
            SyncError::Malformed { table, reason } => {
                write!(f, "Malformed {} record: {}", table, reason)
            }
            SyncError::Store(e) => write!(f, "Store error: {}", e),
        }
    }
}

impl std::error::Error for SyncError {}

impl From<sqlx::Error> for SyncError {
    fn from(e: sqlx::Error) -> Self {
        SyncError::Store(e)
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        SyncError::Http(e.to_string())
    }
}

/// Client for the remote backing service.
#[derive(Clone)]
pub struct SyncClient {
    server_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl SyncClient {
    /// Creates a client from config; errors when sync is not
    /// configured.
    pub fn from_config(config: &SyncConfig) -> Result<Self, SyncError> {
        let server_url = config
            .server_url
            .clone()
            .ok_or(SyncError::NotConfigured)?;
        let api_key = config.api_key.clone().ok_or(SyncError::NotConfigured)?;
        Ok(Self::new(server_url, api_key))
    }

    pub fn new(server_url: String, api_key: String) -> Self {
        Self {
            server_url,
            api_key,
            http: reqwest::Client::new(),
        }
    }

    /// Snapshot URL for one table.
    fn table_url(&self, table: Table) -> String {
        format!(
            "{}/tables/{}?key={}",
            self.server_url.trim_end_matches('/'),
            table.name(),
            self.api_key
        )
    }

    /// Change-feed WebSocket URL for one table.
    pub(crate) fn feed_url(&self, table: Table) -> String {
        let base_url = if self.server_url.starts_with("http://") {
            self.server_url.replace("http://", "ws://")
        } else if self.server_url.starts_with("https://") {
            self.server_url.replace("https://", "wss://")
        } else if !self.server_url.starts_with("ws://") && !self.server_url.starts_with("wss://") {
            format!("ws://{}", self.server_url)
        } else {
            self.server_url.clone()
        };

        format!(
            "{}/feed/{}?key={}",
            base_url.trim_end_matches('/'),
            table.name(),
            self.api_key
        )
    }

    /// Fetch all rows of one table as raw JSON.
    async fn fetch_rows(&self, table: Table) -> Result<Vec<serde_json::Value>, SyncError> {
        let rows = self
            .http
            .get(self.table_url(table))
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<serde_json::Value>>()
            .await?;
        Ok(rows)
    }

    /// Fetch the entire remote dataset. Every table is fetched before
    /// any result is returned, so a failure here cannot leave the
    /// local store partially cleared. Individual malformed records are
    /// logged and rejected; the rest of the table still loads.
    pub async fn fetch_snapshot(&self) -> Result<Snapshot, SyncError> {
        let mut snapshot = Snapshot::default();

        for table in Table::SYNCABLE {
            let rows = self.fetch_rows(table).await?;
            for row in rows {
                match remote::parse_record(table, &row) {
                    Ok(Record::Schedule(item)) => snapshot.schedule_items.push(item),
                    Ok(Record::Transit(segment)) => snapshot.transit_segments.push(segment),
                    Ok(Record::Stay(stay)) => snapshot.lodging.push(stay),
                    Ok(Record::Dining(option)) => snapshot.dining_options.push(option),
                    Ok(Record::Alert(alert)) => snapshot.alerts.push(alert),
                    Ok(Record::Checklist(item)) => snapshot.checklist_items.push(item),
                    Err(e) => {
                        tracing::warn!("Rejected malformed {} record: {}", table, e);
                    }
                }
            }
        }

        Ok(snapshot)
    }
}
