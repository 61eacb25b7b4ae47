/*!
 * Collaborator interfaces the engine delegates persistence to.
 *
 * The engine only decides which store holds which locale. Reading rows,
 * upserting shared translations, deleting entries and running transactions
 * are the job of a backend implementing [`TranslationBackend`]; the crate
 * ships a SQLite implementation in [`crate::database::Repository`].
 */

use std::collections::BTreeMap;

use crate::errors::Result;
use crate::language_utils::LocaleCode;
use crate::metadata::{TranslationEntityMetadata, TypeMetadata};
use crate::record::{FieldValue, RecordId, TranslatableRecord, TranslationEntry};

/// locale -> field -> value, as returned by the shared store
pub type LocaleFieldMap = BTreeMap<LocaleCode, BTreeMap<String, FieldValue>>;

/// Access to the primary records' own rows
pub trait RecordStore {
    /// Read one column of the record's row as stored for `locale`, bypassing
    /// any translation overlay. Returns `None` when no row matches.
    fn find_field_in_locale(
        &self,
        metadata: &TypeMetadata,
        id: &RecordId,
        field: &str,
        locale: &LocaleCode,
    ) -> Result<Option<FieldValue>>;

    /// Update exactly one column of the record's row, scoped to `locale`.
    /// Returns the number of rows touched.
    fn update_field_in_locale(
        &self,
        metadata: &TypeMetadata,
        id: &RecordId,
        field: &str,
        value: Option<&str>,
        locale: &LocaleCode,
    ) -> Result<usize>;

    /// Mark the record for persistence so appended personal entries get stored
    fn persist(&self, record: &mut dyn TranslatableRecord) -> Result<()>;
}

/// Generic translation table keyed by (record type, id, field, locale)
pub trait SharedTranslationStore {
    fn find_all_translations(&self, record_type: &str, id: &RecordId) -> Result<LocaleFieldMap>;

    /// Insert or update one translation
    fn translate(
        &self,
        record_type: &str,
        id: &RecordId,
        field: &str,
        locale: &LocaleCode,
        value: &str,
    ) -> Result<()>;

    fn delete(
        &self,
        record_type: &str,
        id: &RecordId,
        field: &str,
        locale: &LocaleCode,
    ) -> Result<usize>;
}

/// Dedicated per-type translation tables.
///
/// Several record types can inherit one entity while keeping separate id
/// spaces, so entries are always scoped by record type and object id.
pub trait PersonalTranslationStore {
    /// Entries of one record, oldest first
    fn load_personal_translations(
        &self,
        entity: &TranslationEntityMetadata,
        record_type: &str,
        object_id: &RecordId,
    ) -> Result<Vec<TranslationEntry>>;

    fn delete_personal(
        &self,
        entity: &TranslationEntityMetadata,
        record_type: &str,
        object_id: &RecordId,
        field: &str,
        locale: &LocaleCode,
    ) -> Result<usize>;
}

/// All-or-nothing execution of a unit of work
pub trait TransactionScope {
    /// Run `work` in a transaction; nested calls must behave as savepoints
    fn in_transaction(&self, work: &mut dyn FnMut() -> Result<()>) -> Result<()>;
}

/// Everything the engine needs from its environment
pub trait TranslationBackend:
    RecordStore + SharedTranslationStore + PersonalTranslationStore + TransactionScope
{
}

impl<T> TranslationBackend for T where
    T: RecordStore + SharedTranslationStore + PersonalTranslationStore + TransactionScope
{
}

/// A delete queued by the writer, executed later in one transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingDelete {
    Personal {
        entity: TranslationEntityMetadata,
        record_type: String,
        object_id: RecordId,
        field: String,
        locale: LocaleCode,
    },
    Shared {
        record_type: String,
        object_id: RecordId,
        field: String,
        locale: LocaleCode,
    },
}

impl PendingDelete {
    /// Run this delete against the matching store
    pub fn execute<B>(&self, backend: &B) -> Result<usize>
    where
        B: SharedTranslationStore + PersonalTranslationStore + ?Sized,
    {
        match self {
            PendingDelete::Personal {
                entity,
                record_type,
                object_id,
                field,
                locale,
            } => backend.delete_personal(entity, record_type, object_id, field, locale),
            PendingDelete::Shared {
                record_type,
                object_id,
                field,
                locale,
            } => backend.delete(record_type, object_id, field, locale),
        }
    }
}
