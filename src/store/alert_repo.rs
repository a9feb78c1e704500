use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use super::{Store, Table};
use crate::models::Alert;

pub struct AlertRepository {
    store: Store,
}

#[derive(sqlx::FromRow)]
struct AlertRow {
    id: String,
    active: bool,
    alert_type: String,
    title: String,
    body: Option<String>,
    expires_at: Option<String>,
}

impl From<AlertRow> for Alert {
    fn from(row: AlertRow) -> Self {
        Alert {
            id: row.id,
            active: row.active,
            alert_type: row.alert_type,
            title: row.title,
            body: row.body,
            expires_at: row.expires_at.as_deref().and_then(|s| {
                DateTime::parse_from_rfc3339(s)
                    .map(|dt| dt.with_timezone(&Utc))
                    .ok()
            }),
        }
    }
}

pub(crate) async fn upsert_alert(
    conn: &mut SqliteConnection,
    alert: &Alert,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO alerts (id, active, alert_type, title, body, expires_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            active = excluded.active,
            alert_type = excluded.alert_type,
            title = excluded.title,
            body = excluded.body,
            expires_at = excluded.expires_at
        "#,
    )
    .bind(&alert.id)
    .bind(alert.active)
    .bind(&alert.alert_type)
    .bind(&alert.title)
    .bind(&alert.body)
    .bind(alert.expires_at.map(|t| t.to_rfc3339()))
    .execute(conn)
    .await?;
    Ok(())
}

impl AlertRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn put(&self, alert: &Alert) -> Result<(), sqlx::Error> {
        let mut tx = self.store.pool().begin().await?;
        upsert_alert(&mut *tx, alert).await?;
        tx.commit().await?;
        self.store.mark_changed(Table::Alerts);
        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Option<Alert>, sqlx::Error> {
        let row: Option<AlertRow> = sqlx::query_as("SELECT * FROM alerts WHERE id = ?")
            .bind(id)
            .fetch_optional(self.store.pool())
            .await?;
        Ok(row.map(Alert::from))
    }

    pub async fn list(&self) -> Result<Vec<Alert>, sqlx::Error> {
        let rows: Vec<AlertRow> = sqlx::query_as("SELECT * FROM alerts ORDER BY alert_type, title")
            .fetch_all(self.store.pool())
            .await?;
        Ok(rows.into_iter().map(Alert::from).collect())
    }

    /// Active, unexpired alerts. Expired ones stay in the table.
    pub async fn current(&self, now: DateTime<Utc>) -> Result<Vec<Alert>, sqlx::Error> {
        let rows: Vec<AlertRow> = sqlx::query_as(
            "SELECT * FROM alerts WHERE active = 1 AND (expires_at IS NULL OR expires_at > ?) ORDER BY alert_type, title",
        )
        .bind(now.to_rfc3339())
        .fetch_all(self.store.pool())
        .await?;
        Ok(rows.into_iter().map(Alert::from).collect())
    }

    pub async fn delete(&self, id: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM alerts WHERE id = ?")
            .bind(id)
            .execute(self.store.pool())
            .await?;
        self.store.mark_changed(Table::Alerts);
        Ok(())
    }
}
