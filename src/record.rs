/*!
 * Record model.
 *
 * A primary record is any type implementing [`TranslatableRecord`]. Record
 * types that keep their translations in a dedicated per-type table also
 * implement [`PersonalTranslations`] and expose it through
 * [`TranslatableRecord::personal_translations`]; every other record type
 * uses the shared translation table.
 */

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::language_utils::LocaleCode;

/// Value of a translatable field; `None` is an explicit null
pub type FieldValue = Option<String>;

/// Single-column record identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Integer(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Integer(id) => write!(f, "{}", id),
            RecordId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Integer(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        RecordId::Text(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        RecordId::Text(id)
    }
}

// Numeric strings become integer ids
impl FromStr for RecordId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().parse::<i64>() {
            Ok(id) => RecordId::Integer(id),
            Err(_) => RecordId::Text(s.trim().to_string()),
        })
    }
}

impl ToSql for RecordId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            RecordId::Integer(id) => id.to_sql(),
            RecordId::Text(id) => id.to_sql(),
        }
    }
}

impl FromSql for RecordId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Integer(id) => Ok(RecordId::Integer(id)),
            ValueRef::Text(bytes) => std::str::from_utf8(bytes)
                .map(|s| RecordId::Text(s.to_string()))
                .map_err(|e| FromSqlError::Other(Box::new(e))),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

/// One out-of-line value of a personal-strategy record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationEntry {
    /// Storage id, `None` until the entry has been flushed
    id: Option<i64>,
    /// Translation entity the entry belongs to
    entity: String,
    locale: LocaleCode,
    field: String,
    content: FieldValue,
}

impl TranslationEntry {
    /// Create a new, not yet flushed entry
    pub fn new(
        entity: impl Into<String>,
        locale: impl Into<LocaleCode>,
        field: impl Into<String>,
        content: FieldValue,
    ) -> Self {
        Self {
            id: None,
            entity: entity.into(),
            locale: locale.into(),
            field: field.into(),
            content,
        }
    }

    /// Rebuild an entry loaded from storage
    pub fn persisted(
        id: i64,
        entity: impl Into<String>,
        locale: impl Into<LocaleCode>,
        field: impl Into<String>,
        content: FieldValue,
    ) -> Self {
        Self {
            id: Some(id),
            ..Self::new(entity, locale, field, content)
        }
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn locale(&self) -> &LocaleCode {
        &self.locale
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub(crate) fn mark_persisted(&mut self, id: i64) {
        self.id = Some(id);
    }
}

/// Translations owned by the record instance itself
pub trait PersonalTranslations {
    /// Entries in insertion order
    fn translations(&self) -> &[TranslationEntry];

    fn translations_mut(&mut self) -> &mut Vec<TranslationEntry>;

    fn add_translation(&mut self, entry: TranslationEntry) {
        self.translations_mut().push(entry);
    }

    fn has_translation(&self, locale: &LocaleCode, field: &str) -> bool {
        self.translations()
            .iter()
            .any(|entry| entry.locale() == locale && entry.field() == field)
    }

    /// Drop every in-memory entry for (locale, field)
    fn remove_translations(&mut self, locale: &LocaleCode, field: &str) {
        self.translations_mut()
            .retain(|entry| !(entry.locale() == locale && entry.field() == field));
    }
}

/// A primary record whose fields can be translated
pub trait TranslatableRecord {
    /// Registered record type name
    fn record_type(&self) -> &str;

    /// Current value of an identifier column, `None` when not persisted yet
    fn identifier_value(&self, column: &str) -> Option<RecordId>;

    fn personal_translations(&self) -> Option<&dyn PersonalTranslations> {
        None
    }

    fn personal_translations_mut(&mut self) -> Option<&mut dyn PersonalTranslations> {
        None
    }
}

/// Record whose type is only known at runtime (used by the CLI)
#[derive(Debug, Clone)]
pub struct DynamicRecord {
    record_type: String,
    identifier_column: String,
    id: Option<RecordId>,
    translations: Option<Vec<TranslationEntry>>,
}

impl DynamicRecord {
    /// Record stored with the shared strategy
    pub fn shared(
        record_type: impl Into<String>,
        identifier_column: impl Into<String>,
        id: Option<RecordId>,
    ) -> Self {
        Self {
            record_type: record_type.into(),
            identifier_column: identifier_column.into(),
            id,
            translations: None,
        }
    }

    /// Record stored with the personal strategy, owning `translations`
    pub fn personal(
        record_type: impl Into<String>,
        identifier_column: impl Into<String>,
        id: Option<RecordId>,
        translations: Vec<TranslationEntry>,
    ) -> Self {
        Self {
            translations: Some(translations),
            ..Self::shared(record_type, identifier_column, id)
        }
    }
}

impl PersonalTranslations for Vec<TranslationEntry> {
    fn translations(&self) -> &[TranslationEntry] {
        self
    }

    fn translations_mut(&mut self) -> &mut Vec<TranslationEntry> {
        self
    }
}

impl TranslatableRecord for DynamicRecord {
    fn record_type(&self) -> &str {
        &self.record_type
    }

    fn identifier_value(&self, column: &str) -> Option<RecordId> {
        if column == self.identifier_column {
            self.id.clone()
        } else {
            None
        }
    }

    fn personal_translations(&self) -> Option<&dyn PersonalTranslations> {
        self.translations
            .as_ref()
            .map(|t| t as &dyn PersonalTranslations)
    }

    fn personal_translations_mut(&mut self) -> Option<&mut dyn PersonalTranslations> {
        self.translations
            .as_mut()
            .map(|t| t as &mut dyn PersonalTranslations)
    }
}
