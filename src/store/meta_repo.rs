use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use super::{Store, Table};

/// Sync bookkeeping and process-wide persisted values. Never read by
/// display code directly.
pub struct MetaRepository {
    store: Store,
}

pub(crate) async fn stamp_synced(
    conn: &mut SqliteConnection,
    table: Table,
    at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO sync_meta (table_name, last_synced_at)
        VALUES (?, ?)
        ON CONFLICT(table_name) DO UPDATE SET last_synced_at = excluded.last_synced_at
        "#,
    )
    .bind(table.name())
    .bind(at.to_rfc3339())
    .execute(conn)
    .await?;
    Ok(())
}

impl MetaRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn last_synced(&self, table: Table) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT last_synced_at FROM sync_meta WHERE table_name = ?")
                .bind(table.name())
                .fetch_optional(self.store.pool())
                .await?;
        Ok(row.and_then(|(s,)| {
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
        }))
    }

    /// Most recent sync stamp across all tables, used for the
    /// staleness check.
    pub async fn newest_sync(&self) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
        let row: Option<(Option<String>,)> =
            sqlx::query_as("SELECT MAX(last_synced_at) FROM sync_meta")
                .fetch_optional(self.store.pool())
                .await?;
        Ok(row.and_then(|(s,)| s).and_then(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
        }))
    }

    pub async fn set_last_synced(
        &self,
        table: Table,
        at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.store.pool().begin().await?;
        stamp_synced(&mut *tx, table, at).await?;
        tx.commit().await?;
        self.store.mark_changed(Table::SyncMeta);
        Ok(())
    }

    pub async fn version_counter(&self) -> Result<u64, sqlx::Error> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM app_meta WHERE key = 'version_counter'")
                .fetch_optional(self.store.pool())
                .await?;
        Ok(row
            .and_then(|(v,)| v.parse().ok())
            .unwrap_or(0))
    }

    pub async fn set_version_counter(&self, value: u64) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO app_meta (key, value) VALUES ('version_counter', ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(value.to_string())
        .execute(self.store.pool())
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_util::open_store;
    use chrono::Duration;

    #[tokio::test]
    async fn test_last_synced_roundtrip() {
        let ctx = open_store().await;
        let repo = ctx.store.meta();

        assert!(repo.last_synced(Table::ScheduleItems).await.unwrap().is_none());

        let now = Utc::now();
        repo.set_last_synced(Table::ScheduleItems, now).await.unwrap();

        let stamped = repo.last_synced(Table::ScheduleItems).await.unwrap().unwrap();
        assert_eq!(stamped.timestamp(), now.timestamp());
    }

    #[tokio::test]
    async fn test_newest_sync_takes_max() {
        let ctx = open_store().await;
        let repo = ctx.store.meta();
        let now = Utc::now();

        repo.set_last_synced(Table::ScheduleItems, now - Duration::hours(1))
            .await
            .unwrap();
        repo.set_last_synced(Table::Alerts, now).await.unwrap();

        let newest = repo.newest_sync().await.unwrap().unwrap();
        assert_eq!(newest.timestamp(), now.timestamp());
    }

    #[tokio::test]
    async fn test_version_counter_persists() {
        let ctx = open_store().await;
        let repo = ctx.store.meta();

        assert_eq!(repo.version_counter().await.unwrap(), 0);
        repo.set_version_counter(5).await.unwrap();
        assert_eq!(repo.version_counter().await.unwrap(), 5);
    }
}
