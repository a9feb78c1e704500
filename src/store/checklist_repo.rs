use chrono::NaiveDate;
use sqlx::SqliteConnection;

use super::{Store, Table};
use crate::models::ChecklistItem;

pub struct ChecklistRepository {
    store: Store,
}

#[derive(sqlx::FromRow)]
struct ChecklistItemRow {
    id: String,
    title: String,
    is_completed: bool,
    due_date: Option<String>,
    is_pre_trip: bool,
    sort_order: i64,
}

impl From<ChecklistItemRow> for ChecklistItem {
    fn from(row: ChecklistItemRow) -> Self {
        ChecklistItem {
            id: row.id,
            title: row.title,
            is_completed: row.is_completed,
            due_date: row
                .due_date
                .as_deref()
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()),
            is_pre_trip: row.is_pre_trip,
            sort_order: row.sort_order,
        }
    }
}

pub(crate) async fn upsert_checklist_item(
    conn: &mut SqliteConnection,
    item: &ChecklistItem,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO checklist_items (id, title, is_completed, due_date, is_pre_trip, sort_order)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            is_completed = excluded.is_completed,
            due_date = excluded.due_date,
            is_pre_trip = excluded.is_pre_trip,
            sort_order = excluded.sort_order
        "#,
    )
    .bind(&item.id)
    .bind(&item.title)
    .bind(item.is_completed)
    .bind(item.due_date.map(|d| d.to_string()))
    .bind(item.is_pre_trip)
    .bind(item.sort_order)
    .execute(conn)
    .await?;
    Ok(())
}

impl ChecklistRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn put(&self, item: &ChecklistItem) -> Result<(), sqlx::Error> {
        let mut tx = self.store.pool().begin().await?;
        upsert_checklist_item(&mut *tx, item).await?;
        tx.commit().await?;
        self.store.mark_changed(Table::ChecklistItems);
        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Option<ChecklistItem>, sqlx::Error> {
        let row: Option<ChecklistItemRow> =
            sqlx::query_as("SELECT * FROM checklist_items WHERE id = ?")
                .bind(id)
                .fetch_optional(self.store.pool())
                .await?;
        Ok(row.map(ChecklistItem::from))
    }

    pub async fn list(&self) -> Result<Vec<ChecklistItem>, sqlx::Error> {
        let rows: Vec<ChecklistItemRow> =
            sqlx::query_as("SELECT * FROM checklist_items ORDER BY sort_order")
                .fetch_all(self.store.pool())
                .await?;
        Ok(rows.into_iter().map(ChecklistItem::from).collect())
    }

    pub async fn list_pre_trip(&self) -> Result<Vec<ChecklistItem>, sqlx::Error> {
        let rows: Vec<ChecklistItemRow> =
            sqlx::query_as("SELECT * FROM checklist_items WHERE is_pre_trip = 1 ORDER BY sort_order")
                .fetch_all(self.store.pool())
                .await?;
        Ok(rows.into_iter().map(ChecklistItem::from).collect())
    }

    /// Flip completion. Returns the updated item, or `None` for an
    /// unknown id.
    pub async fn toggle(&self, id: &str) -> Result<Option<ChecklistItem>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE checklist_items SET is_completed = NOT is_completed WHERE id = ?",
        )
        .bind(id)
        .execute(self.store.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.store.mark_changed(Table::ChecklistItems);
        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM checklist_items WHERE id = ?")
            .bind(id)
            .execute(self.store.pool())
            .await?;
        self.store.mark_changed(Table::ChecklistItems);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_util::open_store;

    #[tokio::test]
    async fn test_toggle_flips_and_notifies() {
        let ctx = open_store().await;
        let repo = ctx.store.checklist();
        let mut rx = ctx.store.subscribe();

        let item = ChecklistItem::new("Buy IC card", 1);
        repo.put(&item).await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), Table::ChecklistItems);

        let toggled = repo.toggle(&item.id).await.unwrap().unwrap();
        assert!(toggled.is_completed);
        assert_eq!(rx.recv().await.unwrap(), Table::ChecklistItems);

        let toggled = repo.toggle(&item.id).await.unwrap().unwrap();
        assert!(!toggled.is_completed);
    }

    #[tokio::test]
    async fn test_toggle_unknown_id_is_none() {
        let ctx = open_store().await;
        let repo = ctx.store.checklist();
        assert!(repo.toggle("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_pre_trip_filter() {
        let ctx = open_store().await;
        let repo = ctx.store.checklist();

        repo.put(&ChecklistItem::new("Pack bags", 1).pre_trip())
            .await
            .unwrap();
        repo.put(&ChecklistItem::new("Buy souvenirs", 2))
            .await
            .unwrap();

        let pre = repo.list_pre_trip().await.unwrap();
        assert_eq!(pre.len(), 1);
        assert_eq!(pre[0].title, "Pack bags");
    }
}
