mod alert_repo;
mod checklist_repo;
mod dining_repo;
mod lodging_repo;
mod meta_repo;
mod response_repo;
mod schedule_repo;
pub(crate) mod seed;

pub use alert_repo::AlertRepository;
pub use checklist_repo::ChecklistRepository;
pub use dining_repo::DiningRepository;
pub use lodging_repo::LodgingRepository;
pub use meta_repo::MetaRepository;
pub use response_repo::ResponseRepository;
pub use schedule_repo::ScheduleRepository;
pub use seed::{SeedData, Snapshot};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tokio::sync::broadcast;

/// Every table the store knows about. Typed access means an
/// undeclared-table mistake cannot compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Table {
    ScheduleItems,
    TransitSegments,
    Lodging,
    DiningOptions,
    Alerts,
    ChecklistItems,
    CachedResponses,
    MealOverrides,
    SyncMeta,
}

impl Table {
    pub const ALL: [Table; 9] = [
        Table::ScheduleItems,
        Table::TransitSegments,
        Table::Lodging,
        Table::DiningOptions,
        Table::Alerts,
        Table::ChecklistItems,
        Table::CachedResponses,
        Table::MealOverrides,
        Table::SyncMeta,
    ];

    /// Tables the remote service mirrors. Cached responses, meal
    /// overrides, and sync bookkeeping stay local.
    pub const SYNCABLE: [Table; 6] = [
        Table::ScheduleItems,
        Table::TransitSegments,
        Table::Lodging,
        Table::DiningOptions,
        Table::Alerts,
        Table::ChecklistItems,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Table::ScheduleItems => "scheduleItems",
            Table::TransitSegments => "transitSegments",
            Table::Lodging => "lodging",
            Table::DiningOptions => "diningOptions",
            Table::Alerts => "alerts",
            Table::ChecklistItems => "checklistItems",
            Table::CachedResponses => "cachedResponses",
            Table::MealOverrides => "mealOverrides",
            Table::SyncMeta => "syncMeta",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Table {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Table::ALL
            .iter()
            .copied()
            .find(|t| t.name() == s)
            .ok_or_else(|| format!("Unknown table '{}'", s))
    }
}

/// Handle over the local database plus the change hub that makes every
/// committed write observable as "table X changed".
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
    changes: broadcast::Sender<Table>,
}

impl Store {
    /// Open (creating if needed) the database at `path` and run
    /// migrations.
    pub async fn open(path: PathBuf) -> Result<Self, sqlx::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| sqlx::Error::Io(e))?;
        }

        let db_url = format!("sqlite:{}?mode=rwc", path.display());

        let options = SqliteConnectOptions::from_str(&db_url)?
            .foreign_keys(true)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        let (changes, _) = broadcast::channel(256);
        Ok(Self { pool, changes })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Subscribe to committed-write notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<Table> {
        self.changes.subscribe()
    }

    /// Mark a table changed after a commit. Ignores the no-receiver
    /// case.
    pub(crate) fn mark_changed(&self, table: Table) {
        let _ = self.changes.send(table);
    }

    pub fn schedule(&self) -> ScheduleRepository {
        ScheduleRepository::new(self.clone())
    }

    pub fn lodging(&self) -> LodgingRepository {
        LodgingRepository::new(self.clone())
    }

    pub fn dining(&self) -> DiningRepository {
        DiningRepository::new(self.clone())
    }

    pub fn alerts(&self) -> AlertRepository {
        AlertRepository::new(self.clone())
    }

    pub fn checklist(&self) -> ChecklistRepository {
        ChecklistRepository::new(self.clone())
    }

    pub fn responses(&self) -> ResponseRepository {
        ResponseRepository::new(self.clone())
    }

    pub fn meta(&self) -> MetaRepository {
        MetaRepository::new(self.clone())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_creates_tables() {
        let ctx = test_util::open_store().await;

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name NOT LIKE '_sqlx_%' ORDER BY name",
        )
        .fetch_all(ctx.store.pool())
        .await
        .unwrap();

        let table_names: Vec<&str> = tables.iter().map(|t| t.0.as_str()).collect();
        assert!(table_names.contains(&"schedule_items"));
        assert!(table_names.contains(&"transit_segments"));
        assert!(table_names.contains(&"lodging"));
        assert!(table_names.contains(&"dining_options"));
        assert!(table_names.contains(&"alerts"));
        assert!(table_names.contains(&"checklist_items"));
        assert!(table_names.contains(&"cached_responses"));
        assert!(table_names.contains(&"meal_overrides"));
        assert!(table_names.contains(&"sync_meta"));
    }

    #[tokio::test]
    async fn test_migration_seeds_meal_override_exceptions() {
        let ctx = test_util::open_store().await;

        let rows: Vec<(i64, String)> =
            sqlx::query_as("SELECT day_number, meal FROM meal_overrides ORDER BY day_number")
                .fetch_all(ctx.store.pool())
                .await
                .unwrap();

        assert_eq!(rows, vec![(7, "dinner".into()), (8, "breakfast".into())]);
    }

    #[test]
    fn test_table_names_roundtrip() {
        for table in Table::ALL {
            assert_eq!(Table::from_str(table.name()).unwrap(), table);
        }
        assert!(Table::from_str("nonsense").is_err());
    }

    #[test]
    fn test_syncable_excludes_local_only_tables() {
        assert!(!Table::SYNCABLE.contains(&Table::SyncMeta));
        assert!(!Table::SYNCABLE.contains(&Table::CachedResponses));
        assert!(!Table::SYNCABLE.contains(&Table::MealOverrides));
    }
}
