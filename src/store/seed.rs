//! Full-dataset replacement: the one code path that clears and
//! repopulates every syncable table, shared by seed loading and the
//! sync download.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{
    alert_repo, checklist_repo, dining_repo, lodging_repo, meta_repo, response_repo,
    schedule_repo, Store, Table,
};
use crate::models::{
    Alert, CachedResponse, ChecklistItem, DiningOption, Lodging, MealOverride, ScheduleItem,
    TransitSegment,
};

/// One full copy of the syncable tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub schedule_items: Vec<ScheduleItem>,
    pub transit_segments: Vec<TransitSegment>,
    pub lodging: Vec<Lodging>,
    pub dining_options: Vec<DiningOption>,
    pub alerts: Vec<Alert>,
    pub checklist_items: Vec<ChecklistItem>,
}

impl Snapshot {
    pub fn row_counts(&self) -> Vec<(Table, usize)> {
        vec![
            (Table::ScheduleItems, self.schedule_items.len()),
            (Table::TransitSegments, self.transit_segments.len()),
            (Table::Lodging, self.lodging.len()),
            (Table::DiningOptions, self.dining_options.len()),
            (Table::Alerts, self.alerts.len()),
            (Table::ChecklistItems, self.checklist_items.len()),
        ]
    }
}

/// Seed file contents: a snapshot plus the local-only tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedData {
    #[serde(flatten)]
    pub snapshot: Snapshot,
    pub cached_responses: Vec<CachedResponse>,
    pub meal_overrides: Vec<MealOverride>,
}

impl SeedData {
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let data = serde_json::from_str(&contents)?;
        Ok(data)
    }
}

impl Store {
    /// Atomically replace the contents of every syncable table with
    /// `snapshot` and stamp a fresh sync time for each. Either the
    /// whole snapshot lands or nothing changes.
    pub async fn replace_all(&self, snapshot: &Snapshot) -> Result<(), sqlx::Error> {
        let now = Utc::now();
        let mut tx = self.pool().begin().await?;

        // transit_segments first: the FK cascade would handle it, but
        // an explicit delete keeps the ordering obvious.
        sqlx::query("DELETE FROM transit_segments").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM schedule_items").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM lodging").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM dining_options").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM alerts").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM checklist_items").execute(&mut *tx).await?;

        for item in &snapshot.schedule_items {
            schedule_repo::upsert_item(&mut *tx, item).await?;
        }
        for segment in &snapshot.transit_segments {
            schedule_repo::upsert_segment(&mut *tx, segment).await?;
        }
        for stay in &snapshot.lodging {
            lodging_repo::upsert_lodging(&mut *tx, stay).await?;
        }
        for option in &snapshot.dining_options {
            dining_repo::upsert_dining_option(&mut *tx, option).await?;
        }
        for alert in &snapshot.alerts {
            alert_repo::upsert_alert(&mut *tx, alert).await?;
        }
        for item in &snapshot.checklist_items {
            checklist_repo::upsert_checklist_item(&mut *tx, item).await?;
        }

        for table in Table::SYNCABLE {
            meta_repo::stamp_synced(&mut *tx, table, now).await?;
        }

        tx.commit().await?;

        for table in Table::SYNCABLE {
            self.mark_changed(table);
        }
        self.mark_changed(Table::SyncMeta);
        Ok(())
    }

    /// Load a seed file: replace the syncable tables and the local
    /// lookup tables in one pass.
    pub async fn apply_seed(&self, seed: &SeedData) -> Result<(), sqlx::Error> {
        self.replace_all(&seed.snapshot).await?;

        let mut tx = self.pool().begin().await?;
        sqlx::query("DELETE FROM cached_responses").execute(&mut *tx).await?;
        for entry in &seed.cached_responses {
            response_repo::upsert_response(&mut *tx, entry).await?;
        }
        for ov in &seed.meal_overrides {
            response_repo::upsert_override(&mut *tx, ov).await?;
        }
        tx.commit().await?;

        self.mark_changed(Table::CachedResponses);
        self.mark_changed(Table::MealOverrides);
        Ok(())
    }

    /// Wipe every table, including bookkeeping. Transactional.
    pub async fn clear_all(&self) -> Result<(), sqlx::Error> {
        let mut tx = self.pool().begin().await?;
        sqlx::query("DELETE FROM transit_segments").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM schedule_items").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM lodging").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM dining_options").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM alerts").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM checklist_items").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM cached_responses").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM meal_overrides").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM sync_meta").execute(&mut *tx).await?;
        tx.commit().await?;

        for table in Table::ALL {
            self.mark_changed(table);
        }
        Ok(())
    }

    pub async fn table_counts(&self) -> Result<Vec<(Table, i64)>, sqlx::Error> {
        let mut counts = Vec::new();
        for (table, sql) in [
            (Table::ScheduleItems, "SELECT COUNT(*) FROM schedule_items"),
            (Table::TransitSegments, "SELECT COUNT(*) FROM transit_segments"),
            (Table::Lodging, "SELECT COUNT(*) FROM lodging"),
            (Table::DiningOptions, "SELECT COUNT(*) FROM dining_options"),
            (Table::Alerts, "SELECT COUNT(*) FROM alerts"),
            (Table::ChecklistItems, "SELECT COUNT(*) FROM checklist_items"),
        ] {
            let (count,): (i64,) = sqlx::query_as(sql).fetch_one(self.pool()).await?;
            counts.push((table, count));
        }
        Ok(counts)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::models::Category;
    use chrono::{NaiveDate, NaiveTime};

    pub fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, d).unwrap()
    }

    pub fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    /// Small two-day trip used across store and sync tests.
    pub fn snapshot() -> Snapshot {
        let breakfast_stop = ScheduleItem::new(
            1,
            date(10),
            time(8, 0),
            Category::Food,
            "Coffee at Arabica",
            1,
        )
        .with_duration(45);
        let temple =
            ScheduleItem::new(1, date(10), time(10, 0), Category::Activity, "Kinkaku-ji", 2)
                .with_duration(90);
        let market =
            ScheduleItem::new(2, date(11), time(9, 30), Category::Activity, "Nishiki Market", 1);

        let transit = TransitSegment::new(temple.id.clone(), time(9, 15)).with_line("Bus 205");

        Snapshot {
            schedule_items: vec![breakfast_stop, temple, market],
            transit_segments: vec![transit],
            lodging: vec![Lodging::new("Hotel Granvia", date(9), date(12), 1)],
            dining_options: vec![DiningOption::new("Ichiran").with_city("Kyoto")],
            alerts: vec![Alert::new("weather", "Rain expected")],
            checklist_items: vec![ChecklistItem::new("Buy IC card", 1)],
        }
    }
}
