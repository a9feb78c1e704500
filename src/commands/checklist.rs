//! Checklist commands: packing and to-do items.

use chrono::NaiveDate;
use clap::{Args, Subcommand};

use crate::models::ChecklistItem;
use crate::store::Store;

/// Manage the trip checklist
#[derive(Debug, Args)]
pub struct ChecklistCommand {
    #[command(subcommand)]
    command: Option<ChecklistSubcommand>,
}

#[derive(Debug, Subcommand)]
enum ChecklistSubcommand {
    /// List checklist items
    List {
        /// Only pre-trip items
        #[arg(long)]
        pre_trip: bool,
    },
    /// Add a new item
    Add {
        title: String,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,
        /// Mark as a pre-trip item
        #[arg(long)]
        pre_trip: bool,
    },
    /// Toggle an item's completed state
    Toggle { id: String },
}

impl ChecklistCommand {
    pub async fn run(&self, store: &Store) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            None | Some(ChecklistSubcommand::List { pre_trip: false }) => {
                self.list(store, false).await
            }
            Some(ChecklistSubcommand::List { pre_trip: true }) => self.list(store, true).await,
            Some(ChecklistSubcommand::Add {
                title,
                due,
                pre_trip,
            }) => self.add(store, title, *due, *pre_trip).await,
            Some(ChecklistSubcommand::Toggle { id }) => self.toggle(store, id).await,
        }
    }

    async fn list(&self, store: &Store, pre_trip: bool) -> Result<(), Box<dyn std::error::Error>> {
        let items = if pre_trip {
            store.checklist().list_pre_trip().await?
        } else {
            store.checklist().list().await?
        };

        if items.is_empty() {
            println!("Checklist is empty.");
            return Ok(());
        }

        let done = items.iter().filter(|i| i.is_completed).count();
        for item in &items {
            println!("{}  ({})", item, &item.id[..8.min(item.id.len())]);
        }
        println!();
        println!("{}/{} done", done, items.len());
        Ok(())
    }

    async fn add(
        &self,
        store: &Store,
        title: &str,
        due: Option<NaiveDate>,
        pre_trip: bool,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let existing = store.checklist().list().await?;
        let sort_order = existing.iter().map(|i| i.sort_order).max().unwrap_or(0) + 1;

        let mut item = ChecklistItem::new(title, sort_order);
        if pre_trip {
            item = item.pre_trip();
        }
        if let Some(due) = due {
            item = item.with_due_date(due);
        }

        store.checklist().put(&item).await?;
        println!("✓ added '{}'", item.title);
        Ok(())
    }

    async fn toggle(&self, store: &Store, id: &str) -> Result<(), Box<dyn std::error::Error>> {
        // Accept a short id prefix the way the list prints them.
        let id = match store.checklist().get(id).await? {
            Some(item) => item.id,
            None => {
                let items = store.checklist().list().await?;
                let matches: Vec<&ChecklistItem> =
                    items.iter().filter(|i| i.id.starts_with(id)).collect();
                match matches.as_slice() {
                    [item] => item.id.clone(),
                    [] => {
                        println!("✗ no checklist item matches '{}'", id);
                        return Ok(());
                    }
                    _ => {
                        println!("✗ '{}' is ambiguous", id);
                        return Ok(());
                    }
                }
            }
        };

        match store.checklist().toggle(&id).await? {
            Some(item) => println!("{}", item),
            None => println!("✗ no checklist item matches '{}'", id),
        }
        Ok(())
    }
}
