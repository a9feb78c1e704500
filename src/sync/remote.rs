//! Wire types for the remote backing service.
//!
//! Remote records use camelCase field names; these mirrors are the
//! casing transform, and strict typing makes it a validating one: a
//! record that does not match the expected shape is rejected instead
//! of being stored with corrupted keys.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    Alert, Category, ChecklistItem, DiningOption, Lodging, Meal, MealInclusion, MealPriority,
    ScheduleItem, TransitSegment,
};
use crate::store::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOp {
    Insert,
    Update,
    Delete,
}

/// One change-feed event: an operation plus the raw remote record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub operation: ChangeOp,
    pub record: serde_json::Value,
}

/// A parsed remote record, ready for storage.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Schedule(ScheduleItem),
    Transit(TransitSegment),
    Stay(Lodging),
    Dining(DiningOption),
    Alert(Alert),
    Checklist(ChecklistItem),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RemoteScheduleItem {
    pub id: String,
    pub day_number: i64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: Option<i64>,
    pub category: Category,
    pub title: String,
    pub location_name: Option<String>,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub notes: Option<String>,
    #[serde(default)]
    pub meal_inclusion: MealInclusion,
    pub sort_order: i64,
}

impl From<RemoteScheduleItem> for ScheduleItem {
    fn from(r: RemoteScheduleItem) -> Self {
        ScheduleItem {
            id: r.id,
            day_number: r.day_number,
            date: r.date,
            start_time: r.start_time,
            duration_minutes: r.duration_minutes,
            category: r.category,
            title: r.title,
            location_name: r.location_name,
            address: r.address,
            lat: r.lat,
            lon: r.lon,
            notes: r.notes,
            meal_inclusion: r.meal_inclusion,
            sort_order: r.sort_order,
        }
    }
}

impl From<ScheduleItem> for RemoteScheduleItem {
    fn from(i: ScheduleItem) -> Self {
        RemoteScheduleItem {
            id: i.id,
            day_number: i.day_number,
            date: i.date,
            start_time: i.start_time,
            duration_minutes: i.duration_minutes,
            category: i.category,
            title: i.title,
            location_name: i.location_name,
            address: i.address,
            lat: i.lat,
            lon: i.lon,
            notes: i.notes,
            meal_inclusion: i.meal_inclusion,
            sort_order: i.sort_order,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RemoteTransitSegment {
    pub id: String,
    pub schedule_item_id: String,
    pub leave_by: NaiveTime,
    pub walk_minutes: Option<i64>,
    pub transfers: Option<i64>,
    pub line: Option<String>,
    pub from_station: Option<String>,
    pub to_station: Option<String>,
    pub arrive_by: Option<NaiveTime>,
}

impl From<RemoteTransitSegment> for TransitSegment {
    fn from(r: RemoteTransitSegment) -> Self {
        TransitSegment {
            id: r.id,
            schedule_item_id: r.schedule_item_id,
            leave_by: r.leave_by,
            walk_minutes: r.walk_minutes,
            transfers: r.transfers,
            line: r.line,
            from_station: r.from_station,
            to_station: r.to_station,
            arrive_by: r.arrive_by,
        }
    }
}

impl From<TransitSegment> for RemoteTransitSegment {
    fn from(s: TransitSegment) -> Self {
        RemoteTransitSegment {
            id: s.id,
            schedule_item_id: s.schedule_item_id,
            leave_by: s.leave_by,
            walk_minutes: s.walk_minutes,
            transfers: s.transfers,
            line: s.line,
            from_station: s.from_station,
            to_station: s.to_station,
            arrive_by: s.arrive_by,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RemoteLodging {
    pub id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub sort_order: i64,
}

impl From<RemoteLodging> for Lodging {
    fn from(r: RemoteLodging) -> Self {
        Lodging {
            id: r.id,
            name: r.name,
            start_date: r.start_date,
            end_date: r.end_date,
            address: r.address,
            phone: r.phone,
            notes: r.notes,
            sort_order: r.sort_order,
        }
    }
}

impl From<Lodging> for RemoteLodging {
    fn from(l: Lodging) -> Self {
        RemoteLodging {
            id: l.id,
            name: l.name,
            start_date: l.start_date,
            end_date: l.end_date,
            address: l.address,
            phone: l.phone,
            notes: l.notes,
            sort_order: l.sort_order,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RemoteAssignedMeal {
    pub day: i64,
    pub date: NaiveDate,
    pub meal: Meal,
    pub priority: MealPriority,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RemoteDiningOption {
    pub id: String,
    pub name: String,
    pub day_number: Option<i64>,
    pub city: Option<String>,
    pub meal: Option<Meal>,
    pub cuisine: Option<String>,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    #[serde(default)]
    pub assigned_meals: Vec<RemoteAssignedMeal>,
}

impl From<RemoteDiningOption> for DiningOption {
    fn from(r: RemoteDiningOption) -> Self {
        DiningOption {
            id: r.id,
            name: r.name,
            day_number: r.day_number,
            city: r.city,
            meal: r.meal,
            cuisine: r.cuisine,
            address: r.address,
            lat: r.lat,
            lon: r.lon,
            assigned_meals: r
                .assigned_meals
                .into_iter()
                .map(|a| crate::models::AssignedMeal {
                    day: a.day,
                    date: a.date,
                    meal: a.meal,
                    priority: a.priority,
                })
                .collect(),
        }
    }
}

impl From<DiningOption> for RemoteDiningOption {
    fn from(d: DiningOption) -> Self {
        RemoteDiningOption {
            id: d.id,
            name: d.name,
            day_number: d.day_number,
            city: d.city,
            meal: d.meal,
            cuisine: d.cuisine,
            address: d.address,
            lat: d.lat,
            lon: d.lon,
            assigned_meals: d
                .assigned_meals
                .into_iter()
                .map(|a| RemoteAssignedMeal {
                    day: a.day,
                    date: a.date,
                    meal: a.meal,
                    priority: a.priority,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RemoteAlert {
    pub id: String,
    pub active: bool,
    #[serde(rename = "type")]
    pub alert_type: String,
    pub title: String,
    pub body: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<RemoteAlert> for Alert {
    fn from(r: RemoteAlert) -> Self {
        Alert {
            id: r.id,
            active: r.active,
            alert_type: r.alert_type,
            title: r.title,
            body: r.body,
            expires_at: r.expires_at,
        }
    }
}

impl From<Alert> for RemoteAlert {
    fn from(a: Alert) -> Self {
        RemoteAlert {
            id: a.id,
            active: a.active,
            alert_type: a.alert_type,
            title: a.title,
            body: a.body,
            expires_at: a.expires_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RemoteChecklistItem {
    pub id: String,
    pub title: String,
    pub is_completed: bool,
    pub due_date: Option<NaiveDate>,
    pub is_pre_trip: bool,
    pub sort_order: i64,
}

impl From<RemoteChecklistItem> for ChecklistItem {
    fn from(r: RemoteChecklistItem) -> Self {
        ChecklistItem {
            id: r.id,
            title: r.title,
            is_completed: r.is_completed,
            due_date: r.due_date,
            is_pre_trip: r.is_pre_trip,
            sort_order: r.sort_order,
        }
    }
}

impl From<ChecklistItem> for RemoteChecklistItem {
    fn from(c: ChecklistItem) -> Self {
        RemoteChecklistItem {
            id: c.id,
            title: c.title,
            is_completed: c.is_completed,
            due_date: c.due_date,
            is_pre_trip: c.is_pre_trip,
            sort_order: c.sort_order,
        }
    }
}

/// Parse a raw remote record for `table` into a storable record.
pub fn parse_record(table: Table, value: &serde_json::Value) -> Result<Record, serde_json::Error> {
    let record = match table {
        Table::ScheduleItems => {
            Record::Schedule(serde_json::from_value::<RemoteScheduleItem>(value.clone())?.into())
        }
        Table::TransitSegments => {
            Record::Transit(serde_json::from_value::<RemoteTransitSegment>(value.clone())?.into())
        }
        Table::Lodging => {
            Record::Stay(serde_json::from_value::<RemoteLodging>(value.clone())?.into())
        }
        Table::DiningOptions => {
            Record::Dining(serde_json::from_value::<RemoteDiningOption>(value.clone())?.into())
        }
        Table::Alerts => {
            Record::Alert(serde_json::from_value::<RemoteAlert>(value.clone())?.into())
        }
        Table::ChecklistItems => {
            Record::Checklist(serde_json::from_value::<RemoteChecklistItem>(value.clone())?.into())
        }
        // Local-only tables never arrive over the wire; treat any such
        // event as malformed.
        Table::CachedResponses | Table::MealOverrides | Table::SyncMeta => {
            return Err(serde::de::Error::custom(format!(
                "table {} is not syncable",
                table
            )))
        }
    };
    Ok(record)
}

/// Extract the id from a raw record, for delete events that may carry
/// only `{"id": ...}`.
pub fn record_id(value: &serde_json::Value) -> Option<&str> {
    value.get("id").and_then(|v| v.as_str())
}
