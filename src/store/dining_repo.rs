use sqlx::SqliteConnection;
use std::str::FromStr;

use super::{Store, Table};
use crate::models::{DiningOption, Meal};

pub struct DiningRepository {
    store: Store,
}

#[derive(sqlx::FromRow)]
struct DiningOptionRow {
    id: String,
    name: String,
    day_number: Option<i64>,
    city: Option<String>,
    meal: Option<String>,
    cuisine: Option<String>,
    address: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    assigned_meals: String,
}

impl From<DiningOptionRow> for DiningOption {
    fn from(row: DiningOptionRow) -> Self {
        DiningOption {
            id: row.id,
            name: row.name,
            day_number: row.day_number,
            city: row.city,
            meal: row.meal.as_deref().and_then(|m| Meal::from_str(m).ok()),
            cuisine: row.cuisine,
            address: row.address,
            lat: row.lat,
            lon: row.lon,
            // Assignments ride along as a JSON column.
            assigned_meals: serde_json::from_str(&row.assigned_meals).unwrap_or_default(),
        }
    }
}

pub(crate) async fn upsert_dining_option(
    conn: &mut SqliteConnection,
    option: &DiningOption,
) -> Result<(), sqlx::Error> {
    let assigned =
        serde_json::to_string(&option.assigned_meals).unwrap_or_else(|_| "[]".to_string());
    sqlx::query(
        r#"
        INSERT INTO dining_options
            (id, name, day_number, city, meal, cuisine, address, lat, lon, assigned_meals)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            day_number = excluded.day_number,
            city = excluded.city,
            meal = excluded.meal,
            cuisine = excluded.cuisine,
            address = excluded.address,
            lat = excluded.lat,
            lon = excluded.lon,
            assigned_meals = excluded.assigned_meals
        "#,
    )
    .bind(&option.id)
    .bind(&option.name)
    .bind(option.day_number)
    .bind(&option.city)
    .bind(option.meal.map(|m| m.to_string()))
    .bind(&option.cuisine)
    .bind(&option.address)
    .bind(option.lat)
    .bind(option.lon)
    .bind(&assigned)
    .execute(conn)
    .await?;
    Ok(())
}

impl DiningRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn put(&self, option: &DiningOption) -> Result<(), sqlx::Error> {
        let mut tx = self.store.pool().begin().await?;
        upsert_dining_option(&mut *tx, option).await?;
        tx.commit().await?;
        self.store.mark_changed(Table::DiningOptions);
        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Option<DiningOption>, sqlx::Error> {
        let row: Option<DiningOptionRow> =
            sqlx::query_as("SELECT * FROM dining_options WHERE id = ?")
                .bind(id)
                .fetch_optional(self.store.pool())
                .await?;
        Ok(row.map(DiningOption::from))
    }

    pub async fn list(&self) -> Result<Vec<DiningOption>, sqlx::Error> {
        let rows: Vec<DiningOptionRow> =
            sqlx::query_as("SELECT * FROM dining_options ORDER BY name")
                .fetch_all(self.store.pool())
                .await?;
        Ok(rows.into_iter().map(DiningOption::from).collect())
    }

    /// Options assigned to the given slot (assignment list or legacy
    /// single-assignment fields).
    pub async fn for_slot(&self, day: i64, meal: Meal) -> Result<Vec<DiningOption>, sqlx::Error> {
        let all = self.list().await?;
        Ok(all
            .into_iter()
            .filter(|o| {
                o.assigned_to(day, meal).is_some()
                    || (o.day_number == Some(day) && o.meal == Some(meal))
            })
            .collect())
    }

    pub async fn delete(&self, id: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM dining_options WHERE id = ?")
            .bind(id)
            .execute(self.store.pool())
            .await?;
        self.store.mark_changed(Table::DiningOptions);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssignedMeal, MealPriority};
    use crate::store::test_util::open_store;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_put_get_with_assignments() {
        let ctx = open_store().await;
        let repo = ctx.store.dining();

        let date = NaiveDate::from_ymd_opt(2025, 4, 12).unwrap();
        let option = DiningOption::new("Ichiran")
            .with_city("Kyoto")
            .with_assignments(vec![AssignedMeal {
                day: 3,
                date,
                meal: Meal::Lunch,
                priority: MealPriority::Primary,
            }]);
        repo.put(&option).await.unwrap();

        let fetched = repo.get(&option.id).await.unwrap().unwrap();
        assert_eq!(fetched, option);
    }

    #[tokio::test]
    async fn test_for_slot_matches_assignments_and_legacy_fields() {
        let ctx = open_store().await;
        let repo = ctx.store.dining();

        let date = NaiveDate::from_ymd_opt(2025, 4, 12).unwrap();
        let assigned = DiningOption::new("Assigned").with_assignments(vec![AssignedMeal {
            day: 3,
            date,
            meal: Meal::Dinner,
            priority: MealPriority::Primary,
        }]);
        repo.put(&assigned).await.unwrap();

        let mut legacy = DiningOption::new("Legacy");
        legacy.day_number = Some(3);
        legacy.meal = Some(Meal::Dinner);
        repo.put(&legacy).await.unwrap();

        let mut other_day = DiningOption::new("Elsewhere");
        other_day.day_number = Some(5);
        other_day.meal = Some(Meal::Dinner);
        repo.put(&other_day).await.unwrap();

        let slot = repo.for_slot(3, Meal::Dinner).await.unwrap();
        let names: Vec<&str> = slot.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["Assigned", "Legacy"]);
    }
}
