/*!
 * # translatable-field
 *
 * A Rust library for reading and editing the per-locale values of
 * translatable record fields.
 *
 * ## Features
 *
 * - Default-locale values stored inline on the record's own row
 * - Other locales stored with one of two strategies:
 *   - Personal: a dedicated translation table per record type
 *   - Shared: one generic `translations` table for every type
 * - Merged locale -> value reads, per-locale edits and deletes
 * - Deletes of one edit applied in a single transaction
 * - SQLite backend with nested transactions
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `metadata`: Record type registry and translation entity resolution
 * - `record`: Record and personal translation traits
 * - `store`: Store traits the engine delegates persistence to
 * - `translation`: The engine:
 *   - `translation::reader`: Merged reads
 *   - `translation::writer`: Edits and batched deletes
 *   - `translation::manager`: Public entry point
 * - `database`: SQLite implementation of the stores
 * - `language_utils`: Locale codes and ISO 639 validation
 * - `errors`: Custom error types for the library
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod database;
pub mod errors;
pub mod language_utils;
pub mod metadata;
pub mod record;
pub mod store;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::{Config, EditAtomicity};
pub use errors::{FieldError, Result};
pub use language_utils::{LocaleCode, LocaleSet};
pub use metadata::{
    PersonalTranslationTypeResolver, TranslationEntityMetadata, TypeMetadata, TypeRegistry,
};
pub use record::{
    DynamicRecord, FieldValue, PersonalTranslations, RecordId, TranslatableRecord,
    TranslationEntry,
};
pub use translation::{SubmittedValues, TranslatableFieldManager, TranslatedFields};
