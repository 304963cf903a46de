//! Single-writer access to the catalog store.
//!
//! The [`CatalogStore`] lives on a dedicated thread and executes one
//! [`StoreCommand`] at a time, so no two operations ever interleave on the
//! connection. Callers hold a cloneable [`StoreHandle`] and never see the
//! connection itself.

use crate::{CatalogStore, Result, StoreError};
use pricewatch_types::{Item, NewItem, Query};
use std::thread;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, trace, warn};

/// Configuration for the store writer.
#[derive(Debug, Clone)]
pub struct StoreHandleConfig {
    /// Upper bound on a single call, queueing included.
    pub operation_timeout: Duration,
    /// Number of commands that may wait for the writer.
    pub queue_size: usize,
}

impl Default for StoreHandleConfig {
    fn default() -> Self {
        Self {
            operation_timeout: Duration::from_secs(5),
            queue_size: 64,
        }
    }
}

type Reply<T> = oneshot::Sender<Result<T>>;

/// A request for the writer thread.
enum StoreCommand {
    Queries { respond: Reply<Vec<Query>> },
    UpsertQuery { query: Query, respond: Reply<()> },
    UpsertQueries { queries: Vec<Query>, respond: Reply<()> },
    DeleteQuery { key: String, respond: Reply<()> },
    Items { respond: Reply<Vec<Item>> },
    ItemsForQuery { key: String, respond: Reply<Vec<Item>> },
    ItemsForQueries { keys: Vec<String>, respond: Reply<Vec<Item>> },
    AddItem { item: NewItem, respond: Reply<i64> },
    AddItems { items: Vec<NewItem>, respond: Reply<Vec<i64>> },
    RenameItem { id: i64, name: String, respond: Reply<()> },
    DeleteItem { id: i64, respond: Reply<()> },
}

impl StoreCommand {
    fn name(&self) -> &'static str {
        match self {
            StoreCommand::Queries { .. } => "queries",
            StoreCommand::UpsertQuery { .. } => "upsert_query",
            StoreCommand::UpsertQueries { .. } => "upsert_queries",
            StoreCommand::DeleteQuery { .. } => "delete_query",
            StoreCommand::Items { .. } => "items",
            StoreCommand::ItemsForQuery { .. } => "items_for_query",
            StoreCommand::ItemsForQueries { .. } => "items_for_queries",
            StoreCommand::AddItem { .. } => "add_item",
            StoreCommand::AddItems { .. } => "add_items",
            StoreCommand::RenameItem { .. } => "rename_item",
            StoreCommand::DeleteItem { .. } => "delete_item",
        }
    }

    /// Whether the caller stopped waiting, usually after its timeout fired.
    fn is_abandoned(&self) -> bool {
        match self {
            StoreCommand::Queries { respond } => respond.is_closed(),
            StoreCommand::UpsertQuery { respond, .. } => respond.is_closed(),
            StoreCommand::UpsertQueries { respond, .. } => respond.is_closed(),
            StoreCommand::DeleteQuery { respond, .. } => respond.is_closed(),
            StoreCommand::Items { respond } => respond.is_closed(),
            StoreCommand::ItemsForQuery { respond, .. } => respond.is_closed(),
            StoreCommand::ItemsForQueries { respond, .. } => respond.is_closed(),
            StoreCommand::AddItem { respond, .. } => respond.is_closed(),
            StoreCommand::AddItems { respond, .. } => respond.is_closed(),
            StoreCommand::RenameItem { respond, .. } => respond.is_closed(),
            StoreCommand::DeleteItem { respond, .. } => respond.is_closed(),
        }
    }

    /// Run the command and hand the result back. Returns false if the caller
    /// had already given up.
    ///
    /// Batch writes check the caller again before committing and roll back
    /// if it is gone, so a timed out batch never lands.
    fn execute(self, store: &mut CatalogStore) -> bool {
        match self {
            StoreCommand::Queries { respond } => respond.send(store.queries()).is_ok(),
            StoreCommand::UpsertQuery { query, respond } => {
                respond.send(store.upsert_query(&query)).is_ok()
            }
            StoreCommand::UpsertQueries { queries, respond } => {
                match store
                    .upsert_queries_unless(&queries, || respond.is_closed())
                    .transpose()
                {
                    Some(result) => respond.send(result).is_ok(),
                    None => false,
                }
            }
            StoreCommand::DeleteQuery { key, respond } => {
                respond.send(store.delete_query(&key)).is_ok()
            }
            StoreCommand::Items { respond } => respond.send(store.items()).is_ok(),
            StoreCommand::ItemsForQuery { key, respond } => {
                respond.send(store.items_for_query(&key)).is_ok()
            }
            StoreCommand::ItemsForQueries { keys, respond } => {
                respond.send(store.items_for_queries(&keys)).is_ok()
            }
            StoreCommand::AddItem { item, respond } => respond.send(store.add_item(&item)).is_ok(),
            StoreCommand::AddItems { items, respond } => {
                match store
                    .add_items_unless(&items, || respond.is_closed())
                    .transpose()
                {
                    Some(result) => respond.send(result).is_ok(),
                    None => false,
                }
            }
            StoreCommand::RenameItem { id, name, respond } => {
                respond.send(store.rename_item(id, &name)).is_ok()
            }
            StoreCommand::DeleteItem { id, respond } => respond.send(store.delete_item(id)).is_ok(),
        }
    }
}

/// Async handle to the catalog store.
///
/// Cheap to clone. The writer thread stops once every handle is dropped.
#[derive(Clone)]
pub struct StoreHandle {
    tx: mpsc::Sender<StoreCommand>,
    timeout: Duration,
}

impl StoreHandle {
    /// Move `store` onto its own thread and return a handle to it.
    pub fn spawn(store: CatalogStore, config: StoreHandleConfig) -> Result<Self> {
        let (tx, rx) = mpsc::channel(config.queue_size.max(1));

        thread::Builder::new()
            .name("pricewatch-store".to_string())
            .spawn(move || writer_loop(store, rx))?;

        info!(
            target: "pricewatch::store",
            "Store writer started (timeout: {:?}, queue: {})",
            config.operation_timeout,
            config.queue_size
        );

        Ok(Self {
            tx,
            timeout: config.operation_timeout,
        })
    }

    /// A handle to the same writer with a different per-call timeout.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            tx: self.tx.clone(),
            timeout,
        }
    }

    /// The per-call timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// List all queries.
    pub async fn queries(&self) -> Result<Vec<Query>> {
        self.request("queries", |respond| StoreCommand::Queries { respond })
            .await
    }

    /// Insert or replace one query.
    pub async fn upsert_query(&self, query: Query) -> Result<()> {
        self.request("upsert_query", |respond| StoreCommand::UpsertQuery {
            query,
            respond,
        })
        .await
    }

    /// Insert or replace a batch of queries atomically.
    pub async fn upsert_queries(&self, queries: Vec<Query>) -> Result<()> {
        self.request("upsert_queries", |respond| StoreCommand::UpsertQueries {
            queries,
            respond,
        })
        .await
    }

    pub async fn delete_query(&self, key: String) -> Result<()> {
        self.request("delete_query", |respond| StoreCommand::DeleteQuery {
            key,
            respond,
        })
        .await
    }

    /// List all items.
    pub async fn items(&self) -> Result<Vec<Item>> {
        self.request("items", |respond| StoreCommand::Items { respond })
            .await
    }

    pub async fn items_for_query(&self, key: String) -> Result<Vec<Item>> {
        self.request("items_for_query", |respond| StoreCommand::ItemsForQuery {
            key,
            respond,
        })
        .await
    }

    /// List items for a set of query keys. An empty set never reaches the writer.
    pub async fn items_for_queries(&self, keys: Vec<String>) -> Result<Vec<Item>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        self.request("items_for_queries", |respond| {
            StoreCommand::ItemsForQueries { keys, respond }
        })
        .await
    }

    /// Insert an item and return the id it was given.
    pub async fn add_item(&self, item: NewItem) -> Result<i64> {
        self.request("add_item", |respond| StoreCommand::AddItem { item, respond })
            .await
    }

    /// Insert items atomically, returning ids in input order.
    pub async fn add_items(&self, items: Vec<NewItem>) -> Result<Vec<i64>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        self.request("add_items", |respond| StoreCommand::AddItems { items, respond })
            .await
    }

    pub async fn rename_item(&self, id: i64, name: String) -> Result<()> {
        self.request("rename_item", |respond| StoreCommand::RenameItem {
            id,
            name,
            respond,
        })
        .await
    }

    pub async fn delete_item(&self, id: i64) -> Result<()> {
        self.request("delete_item", |respond| StoreCommand::DeleteItem { id, respond })
            .await
    }

    async fn request<T>(
        &self,
        operation: &'static str,
        command: impl FnOnce(Reply<T>) -> StoreCommand,
    ) -> Result<T> {
        let (respond, rx) = oneshot::channel();
        let call = async {
            self.tx
                .send(command(respond))
                .await
                .map_err(|_| StoreError::Unavailable)?;
            rx.await.map_err(|_| StoreError::Unavailable)?
        };

        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    target: "pricewatch::store",
                    "Store operation {} timed out after {:?}",
                    operation,
                    self.timeout
                );
                Err(StoreError::Timeout {
                    operation,
                    after: self.timeout,
                })
            }
        }
    }
}

fn writer_loop(mut store: CatalogStore, mut rx: mpsc::Receiver<StoreCommand>) {
    while let Some(command) = rx.blocking_recv() {
        let operation = command.name();
        if command.is_abandoned() {
            debug!(
                target: "pricewatch::store",
                "Skipping {}, caller already gone",
                operation
            );
            continue;
        }
        trace!(target: "pricewatch::store", "Executing {}", operation);
        if !command.execute(&mut store) {
            debug!(
                target: "pricewatch::store",
                "Caller dropped before {} completed",
                operation
            );
        }
    }
    info!(target: "pricewatch::store", "Store writer stopped");
}
