//! SQLite local store (feature-gated).

use std::{
    str::FromStr,
    sync::{
        OnceLock, RwLock,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use mobile_backend_core::{ColumnType, LocalStore, StoreError, TableDefinition};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tokio::sync::Mutex;

use super::register_table;

/// Store name that selects a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

/// SQLite storage implementation.
///
/// The database file is opened and the registered tables are created on
/// [`LocalStore::initialize`]. Existing tables are left as they are.
pub struct SqliteStore {
    name: String,
    tables: RwLock<Vec<TableDefinition>>,
    /// Set once `initialize` has snapshotted the table list.
    sealed: AtomicBool,
    pool: OnceLock<SqlitePool>,
    init_lock: Mutex<()>,
}

impl SqliteStore {
    /// Create a store backed by the file `name` (or [`IN_MEMORY`]).
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: RwLock::new(Vec::new()),
            sealed: AtomicBool::new(false),
            pool: OnceLock::new(),
            init_lock: Mutex::new(()),
        }
    }

    /// Connection pool, once initialized.
    #[must_use]
    pub fn pool(&self) -> Option<&SqlitePool> {
        self.pool.get()
    }

    fn connect_options(&self) -> Result<SqliteConnectOptions, StoreError> {
        if self.name == IN_MEMORY {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| StoreError::Unavailable(e.to_string()))
        } else {
            Ok(SqliteConnectOptions::new()
                .filename(&self.name)
                .create_if_missing(true))
        }
    }

    async fn open_pool(&self, statements: &[String]) -> Result<SqlitePool, StoreError> {
        // A single connection keeps an in-memory database alive for the
        // lifetime of the pool.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(self.connect_options()?)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let mut tx = pool
            .begin()
            .await
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        for sql in statements {
            tracing::trace!(%sql, "Creating table");
            sqlx::query(sql)
                .execute(&mut *tx)
                .await
                .map_err(|e| StoreError::Internal(e.to_string()))?;
        }
        tx.commit()
            .await
            .map_err(|e| StoreError::Internal(e.to_string()))?;

        Ok(pool)
    }
}

/// Bookkeeping tables the offline cache keeps next to the mirrored ones.
fn system_tables() -> [TableDefinition; 3] {
    [
        TableDefinition::new("__operations")
            .column("kind", ColumnType::Integer)
            .column("state", ColumnType::Integer)
            .column("table_name", ColumnType::Text)
            .column("item_id", ColumnType::Text)
            .column("item", ColumnType::Text)
            .column("created_at", ColumnType::Real)
            .column("sequence", ColumnType::Integer)
            .column("version", ColumnType::Integer),
        TableDefinition::new("__errors")
            .column("http_status", ColumnType::Integer)
            .column("operation_version", ColumnType::Integer)
            .column("operation_kind", ColumnType::Integer)
            .column("table_name", ColumnType::Text)
            .column("item", ColumnType::Text)
            .column("raw_result", ColumnType::Text),
        TableDefinition::new("__config").column("value", ColumnType::Text),
    ]
}

fn create_table_sql(table: &TableDefinition) -> String {
    let mut columns = vec![format!(
        "\"{}\" TEXT PRIMARY KEY NOT NULL",
        TableDefinition::ID_COLUMN
    )];
    columns.extend(
        table
            .columns
            .iter()
            .map(|c| format!("\"{}\" {}", c.name, c.column_type.sql_type())),
    );
    format!(
        "CREATE TABLE IF NOT EXISTS \"{}\" ({})",
        table.name,
        columns.join(", ")
    )
}

#[async_trait]
impl LocalStore for SqliteStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn define_table(&self, table: TableDefinition) -> Result<(), StoreError> {
        let mut tables = self
            .tables
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;

        if self.sealed.load(Ordering::SeqCst) {
            return Err(StoreError::AlreadyInitialized);
        }
        register_table(&mut tables, table)
    }

    fn tables(&self) -> Vec<TableDefinition> {
        self.tables
            .read()
            .map(|t| t.clone())
            .unwrap_or_default()
    }

    async fn initialize(&self) -> Result<(), StoreError> {
        let _guard = self.init_lock.lock().await;
        if self.pool.get().is_some() {
            return Err(StoreError::AlreadyInitialized);
        }

        // Sealed under the write lock so no definition lands after the snapshot.
        let statements: Vec<String> = {
            let tables = self
                .tables
                .write()
                .map_err(|e| StoreError::Internal(e.to_string()))?;
            self.sealed.store(true, Ordering::SeqCst);
            system_tables()
                .iter()
                .chain(tables.iter())
                .map(create_table_sql)
                .collect()
        };

        let pool = match self.open_pool(&statements).await {
            Ok(pool) => pool,
            Err(e) => {
                self.sealed.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };

        tracing::debug!(store = %self.name, tables = statements.len(), "SQLite store initialized");
        let _ = self.pool.set(pool);
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.pool.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mobile_backend_core::{LocalStoreExt, Record, TodoItem};
    use tokio_test::{assert_err, assert_ok};

    use super::*;

    async fn table_names(pool: &SqlitePool) -> Vec<String> {
        sqlx::query_scalar::<_, String>(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(pool)
        .await
        .unwrap()
    }

    #[test]
    fn test_create_table_sql() {
        let sql = create_table_sql(&TodoItem::table());
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS \"TodoItem\" (\"id\" TEXT PRIMARY KEY NOT NULL, \
             \"text\" TEXT, \"complete\" INTEGER)"
        );
    }

    #[tokio::test]
    async fn test_initialize_creates_tables_in_memory() {
        let store = SqliteStore::new(IN_MEMORY);
        assert_ok!(store.define_record::<TodoItem>());
        assert!(store.pool().is_none());

        assert_ok!(store.initialize().await);
        assert!(store.is_initialized());

        let names = table_names(store.pool().unwrap()).await;
        assert_eq!(names, ["TodoItem", "__config", "__errors", "__operations"]);
    }

    #[tokio::test]
    async fn test_reopening_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("localtaskstore.db");
        let path = path.to_str().unwrap();

        let first = SqliteStore::new(path);
        assert_ok!(first.define_record::<TodoItem>());
        assert_ok!(first.initialize().await);
        sqlx::query("INSERT INTO \"TodoItem\" (id, text, complete) VALUES ('1', 'milk', 0)")
            .execute(first.pool().unwrap())
            .await
            .unwrap();
        first.pool().unwrap().close().await;

        let second = SqliteStore::new(path);
        assert_ok!(second.define_record::<TodoItem>());
        assert_ok!(second.initialize().await);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM \"TodoItem\"")
            .fetch_one(second.pool().unwrap())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_define_after_initialize_is_rejected() {
        let store = SqliteStore::new(IN_MEMORY);
        assert_ok!(store.initialize().await);

        let err = assert_err!(store.define_record::<TodoItem>());
        assert!(matches!(err, StoreError::AlreadyInitialized));
        let err = assert_err!(store.initialize().await);
        assert!(matches!(err, StoreError::AlreadyInitialized));
    }

    #[tokio::test]
    async fn test_unreachable_path_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("cache.db");

        let store = SqliteStore::new(path.to_str().unwrap());
        let err = assert_err!(store.initialize().await);
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(!store.is_initialized());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_define_racing_initialize_is_created_or_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("race.db");
        let store = Arc::new(SqliteStore::new(path.to_str().unwrap()));

        let init = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.initialize().await }
        });

        let mut accepted = Vec::new();
        let mut i = 0;
        while !init.is_finished() {
            let name = format!("Late{i}");
            match store.define_table(TableDefinition::new(&name)) {
                Ok(()) => accepted.push(name),
                Err(e) => assert!(matches!(e, StoreError::AlreadyInitialized)),
            }
            i += 1;
            tokio::task::yield_now().await;
        }
        assert_ok!(init.await.unwrap());

        let err = assert_err!(store.define_table(TableDefinition::new("After")));
        assert!(matches!(err, StoreError::AlreadyInitialized));

        let names = table_names(store.pool().unwrap()).await;
        for name in &accepted {
            assert!(names.contains(name), "{name} accepted but not created");
        }
        assert_eq!(store.tables().len(), accepted.len());
    }

    #[tokio::test]
    async fn test_failed_initialize_reopens_definitions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("cache.db");

        let store = SqliteStore::new(path.to_str().unwrap());
        assert_err!(store.initialize().await);
        assert_ok!(store.define_record::<TodoItem>());
    }

    #[tokio::test]
    async fn test_poisoned_table_lock_fails_initialize() {
        let store = SqliteStore::new(IN_MEMORY);
        assert_ok!(store.define_record::<TodoItem>());

        std::thread::scope(|s| {
            let poisoned = s
                .spawn(|| {
                    let _guard = store.tables.write().unwrap();
                    panic!("poison table lock");
                })
                .join();
            assert!(poisoned.is_err());
        });

        let err = assert_err!(store.initialize().await);
        assert!(matches!(err, StoreError::Internal(_)));
        assert!(!store.is_initialized());
    }
}
