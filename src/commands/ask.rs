//! Offline question lookup against the cached response table.

use chrono::Local;
use clap::Args;

use crate::store::Store;

/// Ask a question, answered from cached responses
#[derive(Debug, Args)]
pub struct AskCommand {
    /// The question, in plain words
    question: Vec<String>,

    /// Context as TYPE:KEY, e.g. 'day:3' (defaults to today's day)
    #[arg(long, short = 'x')]
    context: Option<String>,
}

impl AskCommand {
    pub async fn run(&self, store: &Store) -> Result<(), Box<dyn std::error::Error>> {
        let question = self.question.join(" ");
        if question.trim().is_empty() {
            println!("Ask something, e.g. 'tripdeck ask where is the train station'.");
            return Ok(());
        }

        let (context_type, context_key) = match &self.context {
            Some(raw) => match raw.split_once(':') {
                Some((t, k)) => (t.to_string(), k.to_string()),
                None => (raw.clone(), String::new()),
            },
            None => match super::day_for_date(store, Local::now().date_naive()).await? {
                Some(day) => ("day".to_string(), day.to_string()),
                None => ("general".to_string(), String::new()),
            },
        };

        let entries = store
            .responses()
            .for_context(&context_type, &context_key)
            .await?;

        match entries.iter().find(|e| e.matches(&question)) {
            Some(entry) => println!("{}", entry.response),
            None => println!("No cached answer for that."),
        }
        Ok(())
    }
}
