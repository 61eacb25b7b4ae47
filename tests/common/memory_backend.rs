/*!
 * In-memory backend for testing
 *
 * Implements every store trait over plain collections and records each call
 * in order, so tests can check what the engine asked for and in which
 * transaction. Deletes of a chosen locale can be made to fail.
 */

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use translatable_field::errors::{FieldError, Result};
use translatable_field::metadata::{TranslationEntityMetadata, TypeMetadata};
use translatable_field::store::{
    LocaleFieldMap, PersonalTranslationStore, RecordStore, SharedTranslationStore,
    TransactionScope,
};
use translatable_field::{FieldValue, LocaleCode, RecordId, TranslatableRecord, TranslationEntry};

/// Stored data, snapshotted when a transaction starts
#[derive(Debug, Clone, Default)]
pub struct StoredData {
    /// (table, id, column) -> value
    pub rows: HashMap<(String, String, String), FieldValue>,
    /// (record type, id, field, locale) -> value
    pub shared: BTreeMap<(String, String, String, String), String>,
    /// (entity, record type, object id) -> entries
    pub personal: HashMap<(String, String, String), Vec<TranslationEntry>>,
    next_entry_id: i64,
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    data: Mutex<StoredData>,
    calls: Mutex<Vec<String>>,
    fail_delete_locale: Mutex<Option<String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_row(&self, table: &str, id: &RecordId, column: &str, value: Option<&str>) {
        self.data.lock().unwrap().rows.insert(
            (table.to_string(), id.to_string(), column.to_string()),
            value.map(str::to_string),
        );
    }

    pub fn row(&self, table: &str, id: &RecordId, column: &str) -> Option<FieldValue> {
        self.data
            .lock()
            .unwrap()
            .rows
            .get(&(table.to_string(), id.to_string(), column.to_string()))
            .cloned()
    }

    pub fn shared_value(
        &self,
        record_type: &str,
        id: &RecordId,
        field: &str,
        locale: &str,
    ) -> Option<String> {
        self.data
            .lock()
            .unwrap()
            .shared
            .get(&(
                record_type.to_string(),
                id.to_string(),
                field.to_string(),
                locale.to_string(),
            ))
            .cloned()
    }

    /// Every later delete of `locale` fails
    pub fn fail_deletes_of(&self, locale: &str) {
        *self.fail_delete_locale.lock().unwrap() = Some(locale.to_string());
    }

    /// Calls received so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record_call(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_delete(&self, locale: &LocaleCode) -> Result<()> {
        let rejected = self.fail_delete_locale.lock().unwrap().clone();
        if rejected.as_deref() == Some(locale.as_str()) {
            return Err(FieldError::Other(anyhow::anyhow!("delete of {} rejected", locale)));
        }
        Ok(())
    }
}

impl RecordStore for MemoryBackend {
    fn find_field_in_locale(
        &self,
        metadata: &TypeMetadata,
        id: &RecordId,
        field: &str,
        locale: &LocaleCode,
    ) -> Result<Option<FieldValue>> {
        self.record_call(format!("find {} {}", field, locale));
        Ok(self.row(&metadata.table, id, field))
    }

    fn update_field_in_locale(
        &self,
        metadata: &TypeMetadata,
        id: &RecordId,
        field: &str,
        value: Option<&str>,
        locale: &LocaleCode,
    ) -> Result<usize> {
        self.record_call(format!("update {} {}", field, locale));
        self.set_row(&metadata.table, id, field, value);
        Ok(1)
    }

    fn persist(&self, record: &mut dyn TranslatableRecord) -> Result<()> {
        self.record_call("persist".to_string());
        let Some(id) = record.identifier_value("id") else {
            return Ok(());
        };
        let record_type = record.record_type().to_string();
        let Some(personal) = record.personal_translations_mut() else {
            return Ok(());
        };

        let mut data = self.data.lock().unwrap();
        for entry in personal.translations_mut().iter_mut() {
            if entry.is_persisted() {
                continue;
            }
            data.next_entry_id += 1;
            let stored = TranslationEntry::persisted(
                data.next_entry_id,
                entry.entity(),
                entry.locale().clone(),
                entry.field(),
                entry.content().map(str::to_string),
            );
            data.personal
                .entry((entry.entity().to_string(), record_type.clone(), id.to_string()))
                .or_default()
                .push(stored.clone());
            *entry = stored;
        }
        Ok(())
    }
}

impl SharedTranslationStore for MemoryBackend {
    fn find_all_translations(&self, record_type: &str, id: &RecordId) -> Result<LocaleFieldMap> {
        let data = self.data.lock().unwrap();
        let mut translations = LocaleFieldMap::new();
        for ((stored_type, stored_id, field, locale), value) in &data.shared {
            if stored_type == record_type && *stored_id == id.to_string() {
                translations
                    .entry(LocaleCode::new(locale.as_str()))
                    .or_default()
                    .insert(field.clone(), Some(value.clone()));
            }
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
        self.record_call(format!("translate {} {}", field, locale));
        self.data.lock().unwrap().shared.insert(
            (
                record_type.to_string(),
                id.to_string(),
                field.to_string(),
                locale.to_string(),
            ),
            value.to_string(),
        );
        Ok(())
    }

    fn delete(
        &self,
        record_type: &str,
        id: &RecordId,
        field: &str,
        locale: &LocaleCode,
    ) -> Result<usize> {
        self.record_call(format!("delete {} {}", field, locale));
        self.check_delete(locale)?;
        let removed = self.data.lock().unwrap().shared.remove(&(
            record_type.to_string(),
            id.to_string(),
            field.to_string(),
            locale.to_string(),
        ));
        Ok(usize::from(removed.is_some()))
    }
}

fn personal_key(
    entity: &TranslationEntityMetadata,
    record_type: &str,
    object_id: &RecordId,
) -> (String, String, String) {
    (entity.name.clone(), record_type.to_string(), object_id.to_string())
}

impl PersonalTranslationStore for MemoryBackend {
    fn load_personal_translations(
        &self,
        entity: &TranslationEntityMetadata,
        record_type: &str,
        object_id: &RecordId,
    ) -> Result<Vec<TranslationEntry>> {
        Ok(self
            .data
            .lock()
            .unwrap()
            .personal
            .get(&personal_key(entity, record_type, object_id))
            .cloned()
            .unwrap_or_default())
    }

    fn delete_personal(
        &self,
        entity: &TranslationEntityMetadata,
        record_type: &str,
        object_id: &RecordId,
        field: &str,
        locale: &LocaleCode,
    ) -> Result<usize> {
        self.record_call(format!("delete_personal {} {}", field, locale));
        self.check_delete(locale)?;
        let mut data = self.data.lock().unwrap();
        let Some(entries) = data.personal.get_mut(&personal_key(entity, record_type, object_id))
        else {
            return Ok(0);
        };
        let before = entries.len();
        entries.retain(|entry| !(entry.locale() == locale && entry.field() == field));
        Ok(before - entries.len())
    }
}

impl TransactionScope for MemoryBackend {
    fn in_transaction(&self, work: &mut dyn FnMut() -> Result<()>) -> Result<()> {
        self.record_call("begin".to_string());
        let snapshot = self.data.lock().unwrap().clone();

        match work() {
            Ok(()) => {
                self.record_call("commit".to_string());
                Ok(())
            }
            Err(e) => {
                *self.data.lock().unwrap() = snapshot;
                self.record_call("rollback".to_string());
                Err(e)
            }
        }
    }
}
