use chrono::NaiveDate;
use sqlx::SqliteConnection;

use super::{Store, Table};
use crate::models::Lodging;

pub struct LodgingRepository {
    store: Store,
}

#[derive(sqlx::FromRow)]
struct LodgingRow {
    id: String,
    name: String,
    start_date: String,
    end_date: String,
    address: Option<String>,
    phone: Option<String>,
    notes: Option<String>,
    sort_order: i64,
}

impl From<LodgingRow> for Lodging {
    fn from(row: LodgingRow) -> Self {
        Lodging {
            id: row.id,
            name: row.name,
            start_date: NaiveDate::parse_from_str(&row.start_date, "%Y-%m-%d").unwrap_or_default(),
            end_date: NaiveDate::parse_from_str(&row.end_date, "%Y-%m-%d").unwrap_or_default(),
            address: row.address,
            phone: row.phone,
            notes: row.notes,
            sort_order: row.sort_order,
        }
    }
}

pub(crate) async fn upsert_lodging(
    conn: &mut SqliteConnection,
    stay: &Lodging,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO lodging (id, name, start_date, end_date, address, phone, notes, sort_order)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            start_date = excluded.start_date,
            end_date = excluded.end_date,
            address = excluded.address,
            phone = excluded.phone,
            notes = excluded.notes,
            sort_order = excluded.sort_order
        "#,
    )
    .bind(&stay.id)
    .bind(&stay.name)
    .bind(stay.start_date.to_string())
    .bind(stay.end_date.to_string())
    .bind(&stay.address)
    .bind(&stay.phone)
    .bind(&stay.notes)
    .bind(stay.sort_order)
    .execute(conn)
    .await?;
    Ok(())
}

impl LodgingRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn put(&self, stay: &Lodging) -> Result<(), sqlx::Error> {
        let mut tx = self.store.pool().begin().await?;
        upsert_lodging(&mut *tx, stay).await?;
        tx.commit().await?;
        self.store.mark_changed(Table::Lodging);
        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Option<Lodging>, sqlx::Error> {
        let row: Option<LodgingRow> = sqlx::query_as("SELECT * FROM lodging WHERE id = ?")
            .bind(id)
            .fetch_optional(self.store.pool())
            .await?;
        Ok(row.map(Lodging::from))
    }

    pub async fn list(&self) -> Result<Vec<Lodging>, sqlx::Error> {
        let rows: Vec<LodgingRow> = sqlx::query_as("SELECT * FROM lodging ORDER BY sort_order")
            .fetch_all(self.store.pool())
            .await?;
        Ok(rows.into_iter().map(Lodging::from).collect())
    }

    /// The stay whose half-open `[start, end)` interval contains `date`.
    pub async fn for_date(&self, date: NaiveDate) -> Result<Option<Lodging>, sqlx::Error> {
        let row: Option<LodgingRow> = sqlx::query_as(
            "SELECT * FROM lodging WHERE start_date <= ? AND ? < end_date ORDER BY sort_order LIMIT 1",
        )
        .bind(date.to_string())
        .bind(date.to_string())
        .fetch_optional(self.store.pool())
        .await?;
        Ok(row.map(Lodging::from))
    }

    pub async fn delete(&self, id: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM lodging WHERE id = ?")
            .bind(id)
            .execute(self.store.pool())
            .await?;
        self.store.mark_changed(Table::Lodging);
        Ok(())
    }
}
