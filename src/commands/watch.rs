//! Live dashboard: keeps the current/next views fresh as the store
//! changes underneath them, with the sync engine streaming in the
//! background.

use std::time::Duration;

use chrono::Local;
use clap::Args;

use crate::config::Config;
use crate::live::{watch_query, QueryState, VersionCounter};
use crate::models::ScheduleItem;
use crate::resolve;
use crate::store::Store;
use crate::sync::{SyncClient, SyncEngine};

/// Follow the itinerary live, updating as data changes
#[derive(Debug, Args)]
pub struct WatchCommand {}

impl WatchCommand {
    pub async fn run(
        &self,
        store: &Store,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let version = VersionCounter::load(store).await?;

        let mut engine = match SyncClient::from_config(&config.sync) {
            Ok(client) => {
                let mut engine = SyncEngine::new(store.clone(), client);
                engine.start().await;
                Some(engine)
            }
            Err(_) => {
                println!("Sync not configured; watching local data only.");
                None
            }
        };

        let mut current = watch_query(store, vec![version.subscribe()], |ctx| async move {
            let now = Local::now().naive_local();
            let items = ctx.schedule().list_date(now.date()).await?;
            Ok(resolve::current_item(&items, now))
        });
        let mut next = watch_query(store, vec![version.subscribe()], |ctx| async move {
            let now = Local::now().naive_local();
            let items = ctx.schedule().list_all().await?;
            Ok(resolve::next_item(&items, now))
        });

        // The store cannot observe the clock moving, so pulse the
        // version counter once a minute to re-derive the time views.
        let ticker_version = version.clone();
        let ticker = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));
            interval.tick().await;
            loop {
                interval.tick().await;
                if let Err(e) = ticker_version.bump().await {
                    tracing::warn!("Could not bump version counter: {}", e);
                }
            }
        });

        println!("Watching (ctrl-c to stop)...");
        loop {
            tokio::select! {
                state = current.next() => print_state("Now", &state),
                state = next.next() => print_state("Next", &state),
                _ = tokio::signal::ctrl_c() => break,
            }
        }

        ticker.abort();
        if let Some(engine) = engine.as_mut() {
            engine.shutdown();
        }
        Ok(())
    }
}

fn print_state(label: &str, state: &QueryState<ScheduleItem>) {
    match state {
        QueryState::Loading => {}
        QueryState::Absent => println!("{}: nothing scheduled", label),
        QueryState::Ready(item) => println!("{}: {}", label, item),
        QueryState::Failed(e) => println!("{}: query failed - {}", label, e),
    }
}
