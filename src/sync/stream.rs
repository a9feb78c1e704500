//! Per-table change feeds: WebSocket subscriptions delivering
//! `{operation, record}` events applied in arrival order.

use chrono::Utc;
use futures::{SinkExt, StreamExt};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::store::{Store, Table};

use super::client::{SyncClient, SyncError};
use super::remote::{self, ChangeEvent, ChangeOp, Record};

/// Apply one change event in its own single-table transaction, then
/// bump that table's sync stamp. Events never retry: a failure here is
/// logged by the caller and the event is dropped.
pub async fn apply_event(
    store: &Store,
    table: Table,
    event: &ChangeEvent,
) -> Result<(), SyncError> {
    match event.operation {
        ChangeOp::Insert | ChangeOp::Update => {
            let record = remote::parse_record(table, &event.record).map_err(|e| {
                SyncError::Malformed {
                    table,
                    reason: e.to_string(),
                }
            })?;
            match record {
                Record::Schedule(item) => store.schedule().put(&item).await?,
                Record::Transit(segment) => store.schedule().put_transit(&segment).await?,
                Record::Stay(stay) => store.lodging().put(&stay).await?,
                Record::Dining(option) => store.dining().put(&option).await?,
                Record::Alert(alert) => store.alerts().put(&alert).await?,
                Record::Checklist(item) => store.checklist().put(&item).await?,
            }
        }
        ChangeOp::Delete => {
            let id = remote::record_id(&event.record).ok_or(SyncError::Malformed {
                table,
                reason: "delete event without id".to_string(),
            })?;
            match table {
                Table::ScheduleItems => store.schedule().delete(id).await?,
                Table::TransitSegments => store.schedule().delete_transit(id).await?,
                Table::Lodging => store.lodging().delete(id).await?,
                Table::DiningOptions => store.dining().delete(id).await?,
                Table::Alerts => store.alerts().delete(id).await?,
                Table::ChecklistItems => store.checklist().delete(id).await?,
                Table::CachedResponses | Table::MealOverrides | Table::SyncMeta => {
                    return Err(SyncError::Malformed {
                        table,
                        reason: "table is not syncable".to_string(),
                    })
                }
            }
        }
    }

    store.meta().set_last_synced(table, Utc::now()).await?;
    Ok(())
}

/// Run one table's feed until the connection closes or the task is
/// aborted. Events are applied strictly in arrival order; an event
/// that fails to parse or apply is logged and dropped.
pub(crate) async fn run_feed(store: Store, client: SyncClient, table: Table) {
    if let Err(e) = feed_loop(&store, &client, table).await {
        tracing::warn!("{} feed stopped: {}", table, e);
    }
    tracing::debug!("{} feed closed", table);
}

async fn feed_loop(store: &Store, client: &SyncClient, table: Table) -> Result<(), SyncError> {
    let url = client.feed_url(table);

    let (ws_stream, _) = connect_async(&url)
        .await
        .map_err(|e| SyncError::Feed(e.to_string()))?;
    let (mut sender, mut receiver) = ws_stream.split();
    tracing::debug!("Subscribed to {} feed", table);

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                handle_payload(store, table, text.as_bytes()).await;
            }
            Ok(Message::Binary(data)) => {
                handle_payload(store, table, &data).await;
            }
            Ok(Message::Ping(data)) => {
                if sender.send(Message::Pong(data)).await.is_err() {
                    break;
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => return Err(SyncError::Feed(e.to_string())),
        }
    }
    Ok(())
}

async fn handle_payload(store: &Store, table: Table, payload: &[u8]) {
    let event: ChangeEvent = match serde_json::from_slice(payload) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Dropped undecodable {} event: {}", table, e);
            return;
        }
    };
    if let Err(e) = apply_event(store, table, &event).await {
        tracing::warn!("Dropped {} event: {}", table, e);
    }
}
