use chrono::{NaiveDate, NaiveTime};
use sqlx::SqliteConnection;
use std::str::FromStr;

use super::{Store, Table};
use crate::models::{Category, MealInclusion, ScheduleItem, TransitSegment};

/// Repository for schedule items and their transit segments.
pub struct ScheduleRepository {
    store: Store,
}

#[derive(sqlx::FromRow)]
struct ScheduleItemRow {
    id: String,
    day_number: i64,
    date: String,
    start_time: String,
    duration_minutes: Option<i64>,
    category: String,
    title: String,
    location_name: Option<String>,
    address: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    notes: Option<String>,
    meal_inclusion: String,
    sort_order: i64,
}

#[derive(sqlx::FromRow)]
struct TransitSegmentRow {
    id: String,
    schedule_item_id: String,
    leave_by: String,
    walk_minutes: Option<i64>,
    transfers: Option<i64>,
    line: Option<String>,
    from_station: Option<String>,
    to_station: Option<String>,
    arrive_by: Option<String>,
}

fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap_or_default()
}

fn parse_time(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .unwrap_or_default()
}

impl From<ScheduleItemRow> for ScheduleItem {
    fn from(row: ScheduleItemRow) -> Self {
        ScheduleItem {
            id: row.id,
            day_number: row.day_number,
            date: parse_date(&row.date),
            start_time: parse_time(&row.start_time),
            duration_minutes: row.duration_minutes,
            category: Category::from_str(&row.category).unwrap_or(Category::Other),
            title: row.title,
            location_name: row.location_name,
            address: row.address,
            lat: row.lat,
            lon: row.lon,
            notes: row.notes,
            meal_inclusion: MealInclusion::from_str(&row.meal_inclusion)
                .unwrap_or(MealInclusion::None),
            sort_order: row.sort_order,
        }
    }
}

impl From<TransitSegmentRow> for TransitSegment {
    fn from(row: TransitSegmentRow) -> Self {
        TransitSegment {
            id: row.id,
            schedule_item_id: row.schedule_item_id,
            leave_by: parse_time(&row.leave_by),
            walk_minutes: row.walk_minutes,
            transfers: row.transfers,
            line: row.line,
            from_station: row.from_station,
            to_station: row.to_station,
            arrive_by: row.arrive_by.as_deref().map(parse_time),
        }
    }
}

/// Upsert by id. `ON CONFLICT DO UPDATE` rather than `INSERT OR
/// REPLACE`: a replace would delete the row and cascade away its
/// transit segment.
pub(crate) async fn upsert_item(
    conn: &mut SqliteConnection,
    item: &ScheduleItem,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO schedule_items
            (id, day_number, date, start_time, duration_minutes, category, title,
             location_name, address, lat, lon, notes, meal_inclusion, sort_order)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            day_number = excluded.day_number,
            date = excluded.date,
            start_time = excluded.start_time,
            duration_minutes = excluded.duration_minutes,
            category = excluded.category,
            title = excluded.title,
            location_name = excluded.location_name,
            address = excluded.address,
            lat = excluded.lat,
            lon = excluded.lon,
            notes = excluded.notes,
            meal_inclusion = excluded.meal_inclusion,
            sort_order = excluded.sort_order
        "#,
    )
    .bind(&item.id)
    .bind(item.day_number)
    .bind(item.date.to_string())
    .bind(item.start_time.format("%H:%M:%S").to_string())
    .bind(item.duration_minutes)
    .bind(item.category.to_string())
    .bind(&item.title)
    .bind(&item.location_name)
    .bind(&item.address)
    .bind(item.lat)
    .bind(item.lon)
    .bind(&item.notes)
    .bind(item.meal_inclusion.to_string())
    .bind(item.sort_order)
    .execute(conn)
    .await?;
    Ok(())
}

pub(crate) async fn upsert_segment(
    conn: &mut SqliteConnection,
    segment: &TransitSegment,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO transit_segments
            (id, schedule_item_id, leave_by, walk_minutes, transfers, line,
             from_station, to_station, arrive_by)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            schedule_item_id = excluded.schedule_item_id,
            leave_by = excluded.leave_by,
            walk_minutes = excluded.walk_minutes,
            transfers = excluded.transfers,
            line = excluded.line,
            from_station = excluded.from_station,
            to_station = excluded.to_station,
            arrive_by = excluded.arrive_by
        "#,
    )
    .bind(&segment.id)
    .bind(&segment.schedule_item_id)
    .bind(segment.leave_by.format("%H:%M:%S").to_string())
    .bind(segment.walk_minutes)
    .bind(segment.transfers)
    .bind(&segment.line)
    .bind(&segment.from_station)
    .bind(&segment.to_station)
    .bind(
        segment
            .arrive_by
            .map(|t| t.format("%H:%M:%S").to_string()),
    )
    .execute(conn)
    .await?;
    Ok(())
}

impl ScheduleRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn put(&self, item: &ScheduleItem) -> Result<(), sqlx::Error> {
        let mut tx = self.store.pool().begin().await?;
        upsert_item(&mut *tx, item).await?;
        tx.commit().await?;
        self.store.mark_changed(Table::ScheduleItems);
        Ok(())
    }

    pub async fn put_many(&self, items: &[ScheduleItem]) -> Result<(), sqlx::Error> {
        let mut tx = self.store.pool().begin().await?;
        for item in items {
            upsert_item(&mut *tx, item).await?;
        }
        tx.commit().await?;
        self.store.mark_changed(Table::ScheduleItems);
        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Option<ScheduleItem>, sqlx::Error> {
        let row: Option<ScheduleItemRow> =
            sqlx::query_as("SELECT * FROM schedule_items WHERE id = ?")
                .bind(id)
                .fetch_optional(self.store.pool())
                .await?;
        Ok(row.map(ScheduleItem::from))
    }

    /// Items of one day ordered by `sort_order` (the display order).
    pub async fn list_day(&self, day_number: i64) -> Result<Vec<ScheduleItem>, sqlx::Error> {
        let rows: Vec<ScheduleItemRow> =
            sqlx::query_as("SELECT * FROM schedule_items WHERE day_number = ? ORDER BY sort_order")
                .bind(day_number)
                .fetch_all(self.store.pool())
                .await?;
        Ok(rows.into_iter().map(ScheduleItem::from).collect())
    }

    pub async fn list_date(&self, date: NaiveDate) -> Result<Vec<ScheduleItem>, sqlx::Error> {
        let rows: Vec<ScheduleItemRow> =
            sqlx::query_as("SELECT * FROM schedule_items WHERE date = ? ORDER BY sort_order")
                .bind(date.to_string())
                .fetch_all(self.store.pool())
                .await?;
        Ok(rows.into_iter().map(ScheduleItem::from).collect())
    }

    pub async fn list_all(&self) -> Result<Vec<ScheduleItem>, sqlx::Error> {
        let rows: Vec<ScheduleItemRow> =
            sqlx::query_as("SELECT * FROM schedule_items ORDER BY day_number, sort_order")
                .fetch_all(self.store.pool())
                .await?;
        Ok(rows.into_iter().map(ScheduleItem::from).collect())
    }

    pub async fn delete(&self, id: &str) -> Result<(), sqlx::Error> {
        // CASCADE removes the transit segment.
        sqlx::query("DELETE FROM schedule_items WHERE id = ?")
            .bind(id)
            .execute(self.store.pool())
            .await?;
        self.store.mark_changed(Table::ScheduleItems);
        self.store.mark_changed(Table::TransitSegments);
        Ok(())
    }

    pub async fn transit_for(&self, item_id: &str) -> Result<Option<TransitSegment>, sqlx::Error> {
        let row: Option<TransitSegmentRow> =
            sqlx::query_as("SELECT * FROM transit_segments WHERE schedule_item_id = ?")
                .bind(item_id)
                .fetch_optional(self.store.pool())
                .await?;
        Ok(row.map(TransitSegment::from))
    }

    pub async fn put_transit(&self, segment: &TransitSegment) -> Result<(), sqlx::Error> {
        let mut tx = self.store.pool().begin().await?;
        upsert_segment(&mut *tx, segment).await?;
        tx.commit().await?;
        self.store.mark_changed(Table::TransitSegments);
        Ok(())
    }

    pub async fn delete_transit(&self, id: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM transit_segments WHERE id = ?")
            .bind(id)
            .execute(self.store.pool())
            .await?;
        self.store.mark_changed(Table::TransitSegments);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_util::open_store;

    fn item(day: i64, sort: i64, title: &str) -> ScheduleItem {
        ScheduleItem::new(
            day,
            NaiveDate::from_ymd_opt(2025, 4, 10).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            Category::Activity,
            title,
            sort,
        )
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let ctx = open_store().await;
        let repo = ctx.store.schedule();

        let it = item(1, 1, "Arrive at KIX")
            .with_duration(60)
            .with_meal_inclusion(MealInclusion::Lodging);
        repo.put(&it).await.unwrap();

        let fetched = repo.get(&it.id).await.unwrap().unwrap();
        assert_eq!(fetched, it);
    }

    #[tokio::test]
    async fn test_put_is_upsert() {
        let ctx = open_store().await;
        let repo = ctx.store.schedule();

        let mut it = item(1, 1, "Original");
        repo.put(&it).await.unwrap();

        it.title = "Renamed".to_string();
        repo.put(&it).await.unwrap();

        let all = repo.list_day(1).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "Renamed");
    }

    #[tokio::test]
    async fn test_list_day_ordered_by_sort_order() {
        let ctx = open_store().await;
        let repo = ctx.store.schedule();

        repo.put_many(&[item(2, 3, "C"), item(2, 1, "A"), item(2, 2, "B")])
            .await
            .unwrap();

        let day = repo.list_day(2).await.unwrap();
        let titles: Vec<&str> = day.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_duplicate_sort_order_rejected() {
        let ctx = open_store().await;
        let repo = ctx.store.schedule();

        repo.put(&item(1, 1, "First")).await.unwrap();
        let result = repo.put(&item(1, 1, "Clash")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_upsert_keeps_transit_segment() {
        let ctx = open_store().await;
        let repo = ctx.store.schedule();

        let mut it = item(1, 1, "Temple");
        repo.put(&it).await.unwrap();
        let seg = TransitSegment::new(it.id.clone(), NaiveTime::from_hms_opt(8, 30, 0).unwrap());
        repo.put_transit(&seg).await.unwrap();

        it.title = "Temple (updated)".to_string();
        repo.put(&it).await.unwrap();

        assert!(repo.transit_for(&it.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_cascades_transit() {
        let ctx = open_store().await;
        let repo = ctx.store.schedule();

        let it = item(1, 1, "Temple");
        repo.put(&it).await.unwrap();
        let seg = TransitSegment::new(it.id.clone(), NaiveTime::from_hms_opt(8, 30, 0).unwrap());
        repo.put_transit(&seg).await.unwrap();

        repo.delete(&it.id).await.unwrap();
        assert!(repo.get(&it.id).await.unwrap().is_none());
        assert!(repo.transit_for(&it.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_transit_absent_is_none() {
        let ctx = open_store().await;
        let repo = ctx.store.schedule();

        let it = item(1, 1, "No transit");
        repo.put(&it).await.unwrap();
        assert!(repo.transit_for(&it.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_change_notification_on_put() {
        let ctx = open_store().await;
        let mut rx = ctx.store.subscribe();

        ctx.store.schedule().put(&item(1, 1, "Notify")).await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), Table::ScheduleItems);
    }
}
