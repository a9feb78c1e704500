//! Reactive query layer: run a read function against the store, track
//! the tables it touched, and re-run it whenever one of them commits a
//! write or an explicit invalidation signal fires.

use futures::future::select_all;
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::store::{
    AlertRepository, ChecklistRepository, DiningRepository, LodgingRepository, MetaRepository,
    ResponseRepository, ScheduleRepository, Store, Table,
};

/// Result of one query execution.
///
/// `Loading` is only observed before the first run completes. `Absent`
/// is a definitive "nothing there"; `Failed` carries the error of that
/// execution and is replaced by the next run, never cached.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T> {
    Loading,
    Absent,
    Ready(T),
    Failed(String),
}

impl<T> QueryState<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            QueryState::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }
}

/// Store handle passed to a read function. Repository accessors record
/// which tables the execution touched; the registry re-runs the query
/// when any of them changes.
#[derive(Clone)]
pub struct QueryCtx {
    store: Store,
    touched: Arc<Mutex<BTreeSet<Table>>>,
}

impl QueryCtx {
    fn new(store: Store) -> Self {
        Self {
            store,
            touched: Arc::new(Mutex::new(BTreeSet::new())),
        }
    }

    pub fn touch(&self, table: Table) {
        self.touched.lock().unwrap().insert(table);
    }

    fn touched(&self) -> BTreeSet<Table> {
        self.touched.lock().unwrap().clone()
    }

    pub fn schedule(&self) -> ScheduleRepository {
        self.touch(Table::ScheduleItems);
        self.touch(Table::TransitSegments);
        self.store.schedule()
    }

    pub fn lodging(&self) -> LodgingRepository {
        self.touch(Table::Lodging);
        self.store.lodging()
    }

    pub fn dining(&self) -> DiningRepository {
        self.touch(Table::DiningOptions);
        self.store.dining()
    }

    pub fn alerts(&self) -> AlertRepository {
        self.touch(Table::Alerts);
        self.store.alerts()
    }

    pub fn checklist(&self) -> ChecklistRepository {
        self.touch(Table::ChecklistItems);
        self.store.checklist()
    }

    pub fn responses(&self) -> ResponseRepository {
        self.touch(Table::CachedResponses);
        self.touch(Table::MealOverrides);
        self.store.responses()
    }

    pub fn meta(&self) -> MetaRepository {
        self.touch(Table::SyncMeta);
        self.store.meta()
    }
}

/// Handle to a running live query. Dropping it stops the background
/// task.
pub struct LiveQuery<T> {
    rx: watch::Receiver<QueryState<T>>,
    task: JoinHandle<()>,
}

impl<T: Clone> LiveQuery<T> {
    /// Latest published state.
    pub fn current(&self) -> QueryState<T> {
        self.rx.borrow().clone()
    }

    /// Wait for the next published state and return it.
    pub async fn next(&mut self) -> QueryState<T> {
        // A closed channel means the task ended; the last value stands.
        let _ = self.rx.changed().await;
        self.current()
    }
}

impl<T> Drop for LiveQuery<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Register a read function: run it now, publish the result, and
/// re-run it after every committed write to a table it touched or any
/// pulse on `signals` (e.g. the version counter).
///
/// Results are delivered in commit order: the loop re-executes after
/// each relevant commit, so a stale result is never published after a
/// newer write has landed. A lagged change receiver is treated as
/// dirty and triggers a re-run rather than a skipped update.
pub fn watch_query<T, F, Fut>(
    store: &Store,
    signals: Vec<watch::Receiver<u64>>,
    f: F,
) -> LiveQuery<T>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(QueryCtx) -> Fut + Send + 'static,
    Fut: Future<Output = Result<Option<T>, sqlx::Error>> + Send + 'static,
{
    let (tx, rx) = watch::channel(QueryState::Loading);
    let store = store.clone();

    let task = tokio::spawn(async move {
        let mut changes = store.subscribe();
        let mut signals = signals;

        loop {
            let ctx = QueryCtx::new(store.clone());
            let state = match f(ctx.clone()).await {
                Ok(Some(v)) => QueryState::Ready(v),
                Ok(None) => QueryState::Absent,
                Err(e) => QueryState::Failed(e.to_string()),
            };
            let touched = ctx.touched();
            if tx.send(state).is_err() {
                return;
            }

            loop {
                let signal_wait = async {
                    if signals.is_empty() {
                        std::future::pending().await
                    } else {
                        let futs: Vec<_> =
                            signals.iter_mut().map(|s| Box::pin(s.changed())).collect();
                        let (result, idx, _) = select_all(futs).await;
                        (result, idx)
                    }
                };

                tokio::select! {
                    changed = changes.recv() => match changed {
                        Ok(table) if touched.contains(&table) => break,
                        Ok(_) => continue,
                        Err(broadcast::error::RecvError::Lagged(_)) => break,
                        Err(broadcast::error::RecvError::Closed) => return,
                    },
                    (result, idx) = signal_wait => match result {
                        Ok(()) => break,
                        // Sender gone: the signal can never fire again.
                        // Stop polling it instead of treating it dirty.
                        Err(_) => {
                            signals.remove(idx);
                            continue;
                        }
                    },
                }
            }
        }
    });

    LiveQuery { rx, task }
}

/// Persisted invalidation signal for queries whose inputs the store
/// cannot observe changing (wall-clock derived views). Loaded once at
/// startup, bumped explicitly, never reset outside `clear_all`.
#[derive(Clone)]
pub struct VersionCounter {
    store: Store,
    tx: Arc<watch::Sender<u64>>,
}

impl VersionCounter {
    pub async fn load(store: &Store) -> Result<Self, sqlx::Error> {
        let value = store.meta().version_counter().await?;
        let (tx, _) = watch::channel(value);
        Ok(Self {
            store: store.clone(),
            tx: Arc::new(tx),
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> u64 {
        *self.tx.borrow()
    }

    /// Increment, persist, and notify subscribers.
    pub async fn bump(&self) -> Result<u64, sqlx::Error> {
        let next = self.current() + 1;
        self.store.meta().set_version_counter(next).await?;
        self.tx.send_replace(next);
        Ok(next)
    }
}
