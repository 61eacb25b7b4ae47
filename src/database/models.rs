/*!
 * Database row models.
 *
 * These structures map directly to the crate-owned translation tables.
 */

use rusqlite::Row;
use serde::{Deserialize, Serialize};

use crate::language_utils::LocaleCode;
use crate::record::TranslationEntry;

/// Row of the shared `translations` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedTranslationRecord {
    /// Database ID
    pub id: i64,
    pub locale: String,
    /// Record type name
    pub object_class: String,
    pub field: String,
    /// Record identifier, stored as text
    pub foreign_key: String,
    pub content: Option<String>,
}

impl SharedTranslationRecord {
    /// Column list matching [`SharedTranslationRecord::from_row`]
    pub const COLUMNS: &'static str = "id, locale, object_class, field, foreign_key, content";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            locale: row.get(1)?,
            object_class: row.get(2)?,
            field: row.get(3)?,
            foreign_key: row.get(4)?,
            content: row.get(5)?,
        })
    }
}

/// Row of a personal translation table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalTranslationRecord {
    /// Database ID
    pub id: i64,
    /// Owning record type name
    pub object_class: String,
    /// Owning record identifier, stored as text
    pub object_id: String,
    pub locale: String,
    pub field: String,
    pub content: Option<String>,
}

impl PersonalTranslationRecord {
    /// Column list matching [`PersonalTranslationRecord::from_row`]
    pub const COLUMNS: &'static str = "id, object_class, object_id, locale, field, content";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            object_class: row.get(1)?,
            object_id: row.get(2)?,
            locale: row.get(3)?,
            field: row.get(4)?,
            content: row.get(5)?,
        })
    }

    /// Convert into an in-memory entry of the given translation entity
    pub fn into_entry(self, entity: &str) -> TranslationEntry {
        TranslationEntry::persisted(
            self.id,
            entity,
            LocaleCode::new(self.locale),
            self.field,
            self.content,
        )
    }
}
