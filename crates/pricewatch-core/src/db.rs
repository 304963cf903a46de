//! SQLite persistence for queries and items.

use crate::Result;
use pricewatch_types::{Item, NewItem, Query};
use rusqlite::types::Value;
use rusqlite::{params, Connection};
use std::path::Path;
use std::rc::Rc;
use tracing::debug;

/// SQLite-based catalog store.
///
/// Owns its connection outright. Concurrent callers go through
/// [`StoreHandle`](crate::StoreHandle), which keeps the store on one thread.
pub struct CatalogStore {
    conn: Connection,
}

impl CatalogStore {
    /// Open or create the database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        rusqlite::vtab::array::load_module(&conn)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Initialize database schema.
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS queries (
                query TEXT PRIMARY KEY NOT NULL CHECK (query <> ''),
                items INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                url TEXT NOT NULL,
                image TEXT NOT NULL,
                price REAL NOT NULL,
                query TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_items_query ON items(query);
            "#,
        )?;
        Ok(())
    }

    /// List all queries, ordered by key.
    pub fn queries(&self) -> Result<Vec<Query>> {
        let mut stmt = self
            .conn
            .prepare("SELECT query, items FROM queries ORDER BY query")?;
        let queries = stmt
            .query_map([], |row| {
                Ok(Query {
                    query: row.get("query")?,
                    items: row.get("items")?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(queries)
    }

    /// Insert a query, replacing any existing row with the same key.
    pub fn upsert_query(&self, query: &Query) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO queries (query, items) VALUES (?1, ?2)",
            params![query.query, query.items],
        )?;
        Ok(())
    }

    /// Upsert every query in one transaction.
    ///
    /// Either all rows are written or none are. Later duplicates overwrite
    /// earlier ones.
    pub fn upsert_queries(&mut self, queries: &[Query]) -> Result<()> {
        self.upsert_queries_unless(queries, || false)?;
        Ok(())
    }

    /// Batch upsert that rolls back instead of committing when `abandoned`
    /// reports true once every row is written. Returns `None` on rollback.
    pub(crate) fn upsert_queries_unless(
        &mut self,
        queries: &[Query],
        abandoned: impl Fn() -> bool,
    ) -> Result<Option<()>> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt =
                tx.prepare("INSERT OR REPLACE INTO queries (query, items) VALUES (?1, ?2)")?;
            for query in queries {
                stmt.execute(params![query.query, query.items])?;
            }
        }
        if abandoned() {
            debug!(target: "pricewatch::store", "Rolled back {} queries", queries.len());
            return Ok(None);
        }
        tx.commit()?;
        debug!(target: "pricewatch::store", "Upserted {} queries", queries.len());
        Ok(Some(()))
    }

    /// Delete a query by key. Items referencing it are left alone.
    pub fn delete_query(&self, key: &str) -> Result<()> {
        let removed = self
            .conn
            .execute("DELETE FROM queries WHERE query = ?1", params![key])?;
        debug!(target: "pricewatch::store", "Deleted query {:?} ({} rows)", key, removed);
        Ok(())
    }

    /// List all items, ordered by id.
    pub fn items(&self) -> Result<Vec<Item>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, url, image, price, query FROM items ORDER BY id",
        )?;
        let items = stmt
            .query_map([], Self::row_to_item)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// List items found under a single query term.
    pub fn items_for_query(&self, key: &str) -> Result<Vec<Item>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, url, image, price, query FROM items WHERE query = ?1 ORDER BY id",
        )?;
        let items = stmt
            .query_map(params![key], Self::row_to_item)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// List items found under any of the given query terms.
    pub fn items_for_queries(&self, keys: &[String]) -> Result<Vec<Item>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Rc<Vec<Value>> = Rc::new(keys.iter().cloned().map(Value::from).collect());
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, url, image, price, query FROM items
            WHERE query IN rarray(?1)
            ORDER BY id
            "#,
        )?;
        let items = stmt
            .query_map(params![keys], Self::row_to_item)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// Insert an item and return its new id.
    pub fn add_item(&self, item: &NewItem) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO items (name, url, image, price, query) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![item.name, item.url, item.image, item.price, item.query],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Insert several items in one transaction. Ids come back in input order.
    pub fn add_items(&mut self, items: &[NewItem]) -> Result<Vec<i64>> {
        Ok(self.add_items_unless(items, || false)?.unwrap_or_default())
    }

    /// Batch insert that rolls back instead of committing when `abandoned`
    /// reports true once every row is written. Returns `None` on rollback.
    pub(crate) fn add_items_unless(
        &mut self,
        items: &[NewItem],
        abandoned: impl Fn() -> bool,
    ) -> Result<Option<Vec<i64>>> {
        let tx = self.conn.transaction()?;
        let mut ids = Vec::with_capacity(items.len());
        {
            let mut stmt = tx.prepare(
                "INSERT INTO items (name, url, image, price, query) VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for item in items {
                let id =
                    stmt.insert(params![item.name, item.url, item.image, item.price, item.query])?;
                ids.push(id);
            }
        }
        if abandoned() {
            debug!(target: "pricewatch::store", "Rolled back {} items", ids.len());
            return Ok(None);
        }
        tx.commit()?;
        debug!(target: "pricewatch::store", "Inserted {} items", ids.len());
        Ok(Some(ids))
    }

    /// Rename an item. Succeeds without effect if the id does not exist.
    pub fn rename_item(&self, id: i64, name: &str) -> Result<()> {
        self.conn
            .execute("UPDATE items SET name = ?1 WHERE id = ?2", params![name, id])?;
        Ok(())
    }

    /// Delete an item. Succeeds without effect if the id does not exist.
    pub fn delete_item(&self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM items WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<Item> {
        Ok(Item {
            id: row.get("id")?,
            name: row.get("name")?,
            url: row.get("url")?,
            image: row.get("image")?,
            price: row.get("price")?,
            query: row.get("query")?,
        })
    }
}
