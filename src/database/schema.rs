/*!
 * Database schema definitions and migrations.
 *
 * The crate owns the shared `translations` table and one table per personal
 * translation entity. Record tables belong to the application.
 */

use anyhow::Context;
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::Connection;

use crate::errors::{FieldError, Result};

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

static SQL_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier pattern"));

/// Validate a table or column name and return it quoted for interpolation
pub fn quote_identifier(name: &str) -> Result<String> {
    if SQL_IDENTIFIER.is_match(name) {
        Ok(format!("\"{}\"", name))
    } else {
        Err(FieldError::InvalidIdentifier(name.to_string()))
    }
}

/// Initialize the database schema
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    let current_version = get_schema_version(conn)?;

    match current_version {
        0 => {
            info!("Initializing database schema v{}", SCHEMA_VERSION);
            create_all_tables(conn)?;
            set_schema_version(conn, SCHEMA_VERSION)?;
        }
        SCHEMA_VERSION => debug!("Database schema is up to date (v{})", current_version),
        unknown => {
            return Err(FieldError::Config(format!(
                "Unknown schema version: {}. Cannot migrate.",
                unknown
            )));
        }
    }

    Ok(())
}

/// Get the current schema version from the database
fn get_schema_version(conn: &Connection) -> Result<i32> {
    let table_exists: bool = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='schema_version'",
            [],
            |row| row.get(0),
        )
        .context("Failed to check schema_version table existence")?;

    if !table_exists {
        return Ok(0);
    }

    let version: i32 = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .unwrap_or(0);

    Ok(version)
}

/// Set the schema version in the database
fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_version (id, version, updated_at) VALUES (1, ?1, datetime('now'))",
        [version],
    )?;
    Ok(())
}

/// Create all crate-owned tables
fn create_all_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            version INTEGER NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS translations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            locale TEXT NOT NULL,
            object_class TEXT NOT NULL,
            field TEXT NOT NULL,
            foreign_key TEXT NOT NULL,
            content TEXT,
            UNIQUE(locale, object_class, field, foreign_key)
        );

        CREATE INDEX IF NOT EXISTS idx_translations_lookup ON translations(object_class, foreign_key);
        "#,
    )?;

    info!("Database schema created successfully");
    Ok(())
}

/// Create the table backing a personal translation entity if it is missing
pub fn ensure_personal_translation_table(conn: &Connection, table: &str) -> Result<()> {
    let quoted = quote_identifier(table)?;
    let index = quote_identifier(&format!("idx_{}_object", table))?;

    conn.execute_batch(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {quoted} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            object_class TEXT NOT NULL,
            object_id TEXT NOT NULL,
            locale TEXT NOT NULL,
            field TEXT NOT NULL,
            content TEXT
        );

        CREATE INDEX IF NOT EXISTS {index} ON {quoted}(object_class, object_id, locale, field);
        "#
    ))?;

    debug!("Personal translation table {} is ready", table);
    Ok(())
}
