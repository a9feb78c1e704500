use sqlx::SqliteConnection;
use std::str::FromStr;

use super::{Store, Table};
use crate::models::{CachedResponse, Meal, MealInclusion, MealOverride};

/// Repository for the local-only lookup tables: cached responses and
/// per-day meal overrides.
pub struct ResponseRepository {
    store: Store,
}

#[derive(sqlx::FromRow)]
struct CachedResponseRow {
    id: String,
    context_type: String,
    context_key: String,
    question_pattern: String,
    response: String,
}

impl From<CachedResponseRow> for CachedResponse {
    fn from(row: CachedResponseRow) -> Self {
        CachedResponse {
            id: row.id,
            context_type: row.context_type,
            context_key: row.context_key,
            question_pattern: row.question_pattern,
            response: row.response,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MealOverrideRow {
    day_number: i64,
    meal: String,
    inclusion: String,
    reason: Option<String>,
}

impl MealOverrideRow {
    fn hydrate(self) -> Option<MealOverride> {
        Some(MealOverride {
            day_number: self.day_number,
            meal: Meal::from_str(&self.meal).ok()?,
            inclusion: MealInclusion::from_str(&self.inclusion).ok()?,
            reason: self.reason,
        })
    }
}

pub(crate) async fn upsert_response(
    conn: &mut SqliteConnection,
    entry: &CachedResponse,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO cached_responses (id, context_type, context_key, question_pattern, response)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            context_type = excluded.context_type,
            context_key = excluded.context_key,
            question_pattern = excluded.question_pattern,
            response = excluded.response
        "#,
    )
    .bind(&entry.id)
    .bind(&entry.context_type)
    .bind(&entry.context_key)
    .bind(&entry.question_pattern)
    .bind(&entry.response)
    .execute(conn)
    .await?;
    Ok(())
}

pub(crate) async fn upsert_override(
    conn: &mut SqliteConnection,
    ov: &MealOverride,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO meal_overrides (day_number, meal, inclusion, reason)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(day_number, meal) DO UPDATE SET
            inclusion = excluded.inclusion,
            reason = excluded.reason
        "#,
    )
    .bind(ov.day_number)
    .bind(ov.meal.to_string())
    .bind(ov.inclusion.to_string())
    .bind(&ov.reason)
    .execute(conn)
    .await?;
    Ok(())
}

impl ResponseRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn put(&self, entry: &CachedResponse) -> Result<(), sqlx::Error> {
        let mut tx = self.store.pool().begin().await?;
        upsert_response(&mut *tx, entry).await?;
        tx.commit().await?;
        self.store.mark_changed(Table::CachedResponses);
        Ok(())
    }

    /// Entries for a context, most specific first: exact context match
    /// before the catch-all `general` context.
    pub async fn for_context(
        &self,
        context_type: &str,
        context_key: &str,
    ) -> Result<Vec<CachedResponse>, sqlx::Error> {
        let rows: Vec<CachedResponseRow> = sqlx::query_as(
            r#"
            SELECT * FROM cached_responses
            WHERE (context_type = ? AND context_key = ?) OR context_type = 'general'
            ORDER BY CASE WHEN context_type = 'general' THEN 1 ELSE 0 END, id
            "#,
        )
        .bind(context_type)
        .bind(context_key)
        .fetch_all(self.store.pool())
        .await?;
        Ok(rows.into_iter().map(CachedResponse::from).collect())
    }

    pub async fn list(&self) -> Result<Vec<CachedResponse>, sqlx::Error> {
        let rows: Vec<CachedResponseRow> =
            sqlx::query_as("SELECT * FROM cached_responses ORDER BY context_type, context_key")
                .fetch_all(self.store.pool())
                .await?;
        Ok(rows.into_iter().map(CachedResponse::from).collect())
    }

    pub async fn put_override(&self, ov: &MealOverride) -> Result<(), sqlx::Error> {
        let mut tx = self.store.pool().begin().await?;
        upsert_override(&mut *tx, ov).await?;
        tx.commit().await?;
        self.store.mark_changed(Table::MealOverrides);
        Ok(())
    }

    pub async fn overrides(&self) -> Result<Vec<MealOverride>, sqlx::Error> {
        let rows: Vec<MealOverrideRow> =
            sqlx::query_as("SELECT * FROM meal_overrides ORDER BY day_number, meal")
                .fetch_all(self.store.pool())
                .await?;
        Ok(rows.into_iter().filter_map(MealOverrideRow::hydrate).collect())
    }

    pub async fn overrides_for_day(&self, day: i64) -> Result<Vec<MealOverride>, sqlx::Error> {
        let rows: Vec<MealOverrideRow> =
            sqlx::query_as("SELECT * FROM meal_overrides WHERE day_number = ? ORDER BY meal")
                .bind(day)
                .fetch_all(self.store.pool())
                .await?;
        Ok(rows.into_iter().filter_map(MealOverrideRow::hydrate).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_util::open_store;

    #[tokio::test]
    async fn test_for_context_orders_specific_before_general() {
        let ctx = open_store().await;
        let repo = ctx.store.responses();

        repo.put(&CachedResponse::new(
            "general",
            "",
            "emergency number",
            "Dial 110 for police, 119 for ambulance.",
        ))
        .await
        .unwrap();
        repo.put(&CachedResponse::new(
            "day",
            "3",
            "station",
            "Kyoto Station, bus 206.",
        ))
        .await
        .unwrap();

        let entries = repo.for_context("day", "3").await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].context_type, "day");
        assert_eq!(entries[1].context_type, "general");
    }

    #[tokio::test]
    async fn test_migration_exceptions_visible_as_overrides() {
        let ctx = open_store().await;
        let repo = ctx.store.responses();

        let day7 = repo.overrides_for_day(7).await.unwrap();
        assert_eq!(day7.len(), 1);
        assert_eq!(day7[0].meal, Meal::Dinner);
        assert_eq!(day7[0].inclusion, MealInclusion::Lodging);

        let day8 = repo.overrides_for_day(8).await.unwrap();
        assert_eq!(day8.len(), 1);
        assert_eq!(day8[0].meal, Meal::Breakfast);
    }

    #[tokio::test]
    async fn test_put_override_upserts_by_day_meal() {
        let ctx = open_store().await;
        let repo = ctx.store.responses();

        let ov = MealOverride {
            day_number: 7,
            meal: Meal::Dinner,
            inclusion: MealInclusion::ExplicitSkip,
            reason: Some("Changed plans".into()),
        };
        repo.put_override(&ov).await.unwrap();

        let day7 = repo.overrides_for_day(7).await.unwrap();
        assert_eq!(day7.len(), 1);
        assert_eq!(day7[0].inclusion, MealInclusion::ExplicitSkip);
    }
}
