/*!
 * Database connection management.
 *
 * This module handles SQLite connection creation and initialization, and
 * provides nested transactions: the outermost `transaction` call opens a real
 * transaction, inner calls open savepoints. The connection sits behind a
 * reentrant mutex so work running inside a transaction can issue further
 * statements on the same thread.
 */

use anyhow::Context;
use log::{debug, info, warn};
use parking_lot::ReentrantMutex;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::schema;
use crate::errors::Result;

/// Default database filename
const DEFAULT_DB_FILENAME: &str = "translations.db";

/// Default database directory name under user's data directory
const DEFAULT_DB_DIRNAME: &str = "translatable-field";

/// Savepoint name used for nested transactions
const SAVEPOINT: &str = "translatable_field";

/// Database connection wrapper with thread-safe, reentrant access
#[derive(Clone)]
pub struct DatabaseConnection {
    /// Path to the database file
    db_path: PathBuf,
    connection: Arc<ReentrantMutex<Connection>>,
}

impl DatabaseConnection {
    /// Create a new database connection at the default location
    pub fn new_default() -> Result<Self> {
        let db_path = Self::default_database_path()?;
        Self::new(&db_path)
    }

    /// Create a new database connection at the specified path
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
        }

        info!("Opening database at: {:?}", db_path);

        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open database: {:?}", db_path))?;

        schema::initialize_schema(&conn)?;

        Ok(Self {
            db_path,
            connection: Arc::new(ReentrantMutex::new(conn)),
        })
    }

    /// Create an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        debug!("Creating in-memory database");

        let conn = Connection::open_in_memory().context("Failed to create in-memory database")?;

        schema::initialize_schema(&conn)?;

        Ok(Self {
            db_path: PathBuf::from(":memory:"),
            connection: Arc::new(ReentrantMutex::new(conn)),
        })
    }

    /// Get the default database path
    pub fn default_database_path() -> Result<PathBuf> {
        let base_dir = dirs::data_local_dir()
            .or_else(dirs::data_dir)
            .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;

        Ok(base_dir.join(DEFAULT_DB_DIRNAME).join(DEFAULT_DB_FILENAME))
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Execute a database operation with the connection
    pub fn execute<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.connection.lock();
        f(&conn)
    }

    /// Run `f` inside a transaction, or inside a savepoint when a transaction
    /// is already open on this connection. Rolls back when `f` fails.
    pub fn transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.connection.lock();
        let nested = !conn.is_autocommit();

        if nested {
            conn.execute_batch(&format!("SAVEPOINT {}", SAVEPOINT))?;
        } else {
            conn.execute_batch("BEGIN IMMEDIATE")?;
        }

        let result = f(&conn).and_then(|value| {
            if nested {
                conn.execute_batch(&format!("RELEASE {}", SAVEPOINT))?;
            } else {
                conn.execute_batch("COMMIT")?;
            }
            Ok(value)
        });

        if result.is_err() {
            let rollback = if nested {
                format!("ROLLBACK TO {0}; RELEASE {0}", SAVEPOINT)
            } else {
                "ROLLBACK".to_string()
            };
            if let Err(e) = conn.execute_batch(&rollback) {
                warn!("Failed to roll back transaction: {}", e);
            }
        }

        result
    }

    /// Whether a transaction is currently open on this connection
    pub fn in_transaction(&self) -> bool {
        !self.connection.lock().is_autocommit()
    }
}
