/*!
 * Database module: SQLite persistence for translated fields.
 *
 * This module provides:
 * - Connection management with nested transactions
 * - The shared and personal translation table schema
 * - `Repository`, the SQLite implementation of every engine store
 */

pub mod schema;
pub mod connection;
pub mod repository;
pub mod models;

// Re-export main types
pub use connection::DatabaseConnection;
pub use repository::Repository;
