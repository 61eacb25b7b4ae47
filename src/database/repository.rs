/*!
 * SQLite backend for the translation engine.
 *
 * `Repository` implements every store the engine talks to: scoped reads and
 * updates of the records' own rows, the shared `translations` table, the
 * per-entity personal tables, and transactions.
 */

use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, OptionalExtension};
use std::sync::Arc;

use super::connection::DatabaseConnection;
use super::models::{PersonalTranslationRecord, SharedTranslationRecord};
use super::schema::{self, quote_identifier};
use crate::errors::{FieldError, Result};
use crate::language_utils::LocaleCode;
use crate::metadata::{
    PersonalTranslationTypeResolver, TranslationEntityMetadata, TypeMetadata, TypeRegistry,
};
use crate::record::{DynamicRecord, FieldValue, RecordId, TranslatableRecord, TranslationEntry};
use crate::store::{
    LocaleFieldMap, PersonalTranslationStore, RecordStore, SharedTranslationStore,
    TransactionScope,
};

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
    /// Registered record types and translation entities
    registry: Arc<TypeRegistry>,
}

impl Repository {
    /// Create a repository, making sure every registered personal
    /// translation table exists
    pub fn new(db: DatabaseConnection, registry: Arc<TypeRegistry>) -> Result<Self> {
        db.execute(|conn| {
            for entity in registry.translation_entities() {
                schema::ensure_personal_translation_table(conn, &entity.table)?;
            }
            Ok(())
        })?;

        Ok(Self { db, registry })
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory(registry: Arc<TypeRegistry>) -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Self::new(db, registry)
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Build a record handle for a type known only by name. Types with a
    /// translation entity in their parent chain come back with their
    /// personal entries loaded.
    pub fn load_dynamic_record(&self, record_type: &str, id: RecordId) -> Result<DynamicRecord> {
        let metadata = self.registry.get(record_type)?;
        let column = metadata.identifier_column()?;

        match PersonalTranslationTypeResolver::new(&self.registry).resolve(record_type) {
            Ok(entity) => {
                let entries = self.load_personal_translations(entity, record_type, &id)?;
                Ok(DynamicRecord::personal(record_type, column, Some(id), entries))
            }
            Err(FieldError::MetadataResolution { .. }) => {
                Ok(DynamicRecord::shared(record_type, column, Some(id)))
            }
            Err(e) => Err(e),
        }
    }

    /// All shared translation rows of one record, oldest first
    pub fn list_shared_translations(
        &self,
        record_type: &str,
        id: &RecordId,
    ) -> Result<Vec<SharedTranslationRecord>> {
        let sql = format!(
            "SELECT {} FROM translations WHERE object_class = ?1 AND foreign_key = ?2 ORDER BY id",
            SharedTranslationRecord::COLUMNS
        );

        self.db.execute(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![record_type, id.to_string()], SharedTranslationRecord::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }

    fn insert_personal_entries(
        &self,
        record_type: &str,
        object_id: &RecordId,
        entries: &[&TranslationEntry],
    ) -> Result<Vec<i64>> {
        let object_id = object_id.to_string();

        self.db.transaction(|conn| {
            let mut ids = Vec::with_capacity(entries.len());
            for entry in entries {
                let entity = self.registry.translation_entity(entry.entity()).ok_or_else(|| {
                    FieldError::MetadataResolution {
                        record_type: record_type.to_string(),
                    }
                })?;
                let table = quote_identifier(&entity.table)?;

                conn.execute(
                    &format!(
                        "INSERT INTO {} (object_class, object_id, locale, field, content)
                         VALUES (?1, ?2, ?3, ?4, ?5)",
                        table
                    ),
                    params![
                        record_type,
                        object_id,
                        entry.locale().as_str(),
                        entry.field(),
                        entry.content()
                    ],
                )?;
                ids.push(conn.last_insert_rowid());
            }
            Ok(ids)
        })
    }
}

/// Render any stored column value as text
fn value_to_text(value: Value) -> FieldValue {
    match value {
        Value::Null => None,
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(f) => Some(f.to_string()),
        Value::Text(s) => Some(s),
        Value::Blob(b) => Some(String::from_utf8_lossy(&b).into_owned()),
    }
}

impl RecordStore for Repository {
    // Rows hold the default-locale content inline, so the locale scope only
    // has to avoid any translation overlay, which this store never applies.
    fn find_field_in_locale(
        &self,
        metadata: &TypeMetadata,
        id: &RecordId,
        field: &str,
        locale: &LocaleCode,
    ) -> Result<Option<FieldValue>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?1 LIMIT 1",
            quote_identifier(field)?,
            quote_identifier(&metadata.table)?,
            quote_identifier(metadata.identifier_column()?)?
        );
        debug!("Reading {}.{} of {} in locale {}", metadata.name, field, id, locale);

        self.db.execute(|conn| {
            let value = conn
                .query_row(&sql, params![id], |row| row.get::<_, Value>(0))
                .optional()?;
            Ok(value.map(value_to_text))
        })
    }

    fn update_field_in_locale(
        &self,
        metadata: &TypeMetadata,
        id: &RecordId,
        field: &str,
        value: Option<&str>,
        locale: &LocaleCode,
    ) -> Result<usize> {
        let sql = format!(
            "UPDATE {} SET {} = ?1 WHERE {} = ?2",
            quote_identifier(&metadata.table)?,
            quote_identifier(field)?,
            quote_identifier(metadata.identifier_column()?)?
        );

        let updated = self
            .db
            .execute(|conn| Ok(conn.execute(&sql, params![value, id])?))?;
        debug!(
            "Updated {}.{} of {} in locale {} ({} row(s))",
            metadata.name, field, id, locale, updated
        );
        Ok(updated)
    }

    fn persist(&self, record: &mut dyn TranslatableRecord) -> Result<()> {
        let record_type = record.record_type().to_string();
        let metadata = self.registry.get(&record_type)?;
        let id = record.identifier_value(metadata.identifier_column()?);

        let Some(personal) = record.personal_translations_mut() else {
            debug!("Nothing to flush for shared-strategy record {}", record_type);
            return Ok(());
        };

        let pending: Vec<usize> = personal
            .translations()
            .iter()
            .enumerate()
            .filter(|(_, entry)| !entry.is_persisted())
            .map(|(index, _)| index)
            .collect();
        if pending.is_empty() {
            return Ok(());
        }

        let id = id.ok_or_else(|| FieldError::UnsavedRecord {
            record_type: record_type.clone(),
        })?;

        let entries: Vec<&TranslationEntry> = pending
            .iter()
            .map(|&index| &personal.translations()[index])
            .collect();
        let ids = self.insert_personal_entries(&record_type, &id, &entries)?;

        let stored = personal.translations_mut();
        for (index, row_id) in pending.into_iter().zip(ids) {
            stored[index].mark_persisted(row_id);
        }
        debug!("Flushed personal translations of {} {}", record_type, id);
        Ok(())
    }
}

impl SharedTranslationStore for Repository {
    fn find_all_translations(&self, record_type: &str, id: &RecordId) -> Result<LocaleFieldMap> {
        let mut translations = LocaleFieldMap::new();
        for row in self.list_shared_translations(record_type, id)? {
            translations
                .entry(LocaleCode::new(row.locale))
                .or_default()
                .insert(row.field, row.content);
        }
        Ok(translations)
    }

    fn translate(
        &self,
        record_type: &str,
        id: &RecordId,
        field: &str,
        locale: &LocaleCode,
        value: &str,
    ) -> Result<()> {
        self.db.execute(|conn| {
            conn.execute(
                r#"
                INSERT INTO translations (locale, object_class, field, foreign_key, content)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(locale, object_class, field, foreign_key)
                DO UPDATE SET content = excluded.content
                "#,
                params![locale.as_str(), record_type, field, id.to_string(), value],
            )?;
            Ok(())
        })?;

        debug!("Stored {} translation of {}.{} for {}", locale, record_type, field, id);
        Ok(())
    }

    fn delete(
        &self,
        record_type: &str,
        id: &RecordId,
        field: &str,
        locale: &LocaleCode,
    ) -> Result<usize> {
        self.db.execute(|conn| {
            Ok(conn.execute(
                "DELETE FROM translations
                 WHERE object_class = ?1 AND field = ?2 AND foreign_key = ?3 AND locale = ?4",
                params![record_type, field, id.to_string(), locale.as_str()],
            )?)
        })
    }
}

impl PersonalTranslationStore for Repository {
    fn load_personal_translations(
        &self,
        entity: &TranslationEntityMetadata,
        record_type: &str,
        object_id: &RecordId,
    ) -> Result<Vec<TranslationEntry>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE object_class = ?1 AND object_id = ?2 ORDER BY id",
            PersonalTranslationRecord::COLUMNS,
            quote_identifier(&entity.table)?
        );

        let rows = self.db.execute(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(
                    params![record_type, object_id.to_string()],
                    PersonalTranslationRecord::from_row,
                )?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })?;

        Ok(rows
            .into_iter()
            .map(|row| row.into_entry(&entity.name))
            .collect())
    }

    fn delete_personal(
        &self,
        entity: &TranslationEntityMetadata,
        record_type: &str,
        object_id: &RecordId,
        field: &str,
        locale: &LocaleCode,
    ) -> Result<usize> {
        let sql = format!(
            "DELETE FROM {}
             WHERE object_class = ?1 AND object_id = ?2 AND field = ?3 AND locale = ?4",
            quote_identifier(&entity.table)?
        );

        self.db.execute(|conn| {
            Ok(conn.execute(
                &sql,
                params![record_type, object_id.to_string(), field, locale.as_str()],
            )?)
        })
    }
}

impl TransactionScope for Repository {
    fn in_transaction(&self, work: &mut dyn FnMut() -> Result<()>) -> Result<()> {
        self.db.transaction(|_| work())
    }
}
