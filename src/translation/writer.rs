/*!
 * Applying a submitted per-locale edit of one field.
 *
 * The default locale is written straight to the record's row. Other locales
 * go to the record's translation store: personal entries are appended to the
 * record in memory and flushed by `RecordStore::persist`, shared entries are
 * upserted right away. Deletes are queued and run together in one
 * transaction once every submitted locale has been visited.
 */

use log::debug;
use std::collections::BTreeMap;

use super::default_locale::{resolve_identifier, DefaultLocaleAccessor};
use super::strategy::{Strategy, StrategyDetector};
use crate::app_config::EditAtomicity;
use crate::errors::{FieldError, Result};
use crate::language_utils::{LocaleCode, LocaleSet};
use crate::metadata::{PersonalTranslationTypeResolver, TypeRegistry};
use crate::record::{FieldValue, TranslatableRecord, TranslationEntry};
use crate::store::{PendingDelete, TranslationBackend};

/// Submitted edit: locale -> new value, `None` meaning delete
pub type SubmittedValues = BTreeMap<LocaleCode, FieldValue>;

pub struct TranslationWriter<'a, B: ?Sized> {
    registry: &'a TypeRegistry,
    backend: &'a B,
    locales: &'a LocaleSet,
    atomicity: EditAtomicity,
}

impl<'a, B> TranslationWriter<'a, B>
where
    B: TranslationBackend + ?Sized,
{
    pub fn new(
        registry: &'a TypeRegistry,
        backend: &'a B,
        locales: &'a LocaleSet,
        atomicity: EditAtomicity,
    ) -> Self {
        Self {
            registry,
            backend,
            locales,
            atomicity,
        }
    }

    /// Apply `submitted` for every locale of `locales` it contains.
    /// Locales missing from `submitted` are left untouched.
    pub fn persist_translations(
        &self,
        record: &mut dyn TranslatableRecord,
        field: &str,
        submitted: &SubmittedValues,
        locales: &[LocaleCode],
    ) -> Result<()> {
        match self.atomicity {
            EditAtomicity::DeletesOnly => self.apply_edit(record, field, submitted, locales),
            EditAtomicity::WholeEdit => self
                .backend
                .in_transaction(&mut || self.apply_edit(&mut *record, field, submitted, locales)),
        }
    }

    fn apply_edit(
        &self,
        record: &mut dyn TranslatableRecord,
        field: &str,
        submitted: &SubmittedValues,
        locales: &[LocaleCode],
    ) -> Result<()> {
        let accessor =
            DefaultLocaleAccessor::new(self.registry, self.backend, self.locales.default_locale());
        let mut pending = Vec::new();

        for locale in locales {
            let Some(value) = submitted.get(locale) else {
                debug!("{} not submitted for {}, leaving it untouched", locale, field);
                continue;
            };

            match value {
                None => self.queue_delete(&accessor, record, field, locale, &mut pending)?,
                Some(value) => self.store_value(&accessor, record, field, locale, value)?,
            }
        }

        if !pending.is_empty() {
            self.execute_deletes(record, &pending)?;
        }

        self.backend.persist(record)
    }

    fn queue_delete(
        &self,
        accessor: &DefaultLocaleAccessor<'_, B>,
        record: &dyn TranslatableRecord,
        field: &str,
        locale: &LocaleCode,
        pending: &mut Vec<PendingDelete>,
    ) -> Result<()> {
        if self.locales.is_default(locale) {
            return accessor.write_default(record, field, None);
        }

        let (metadata, id) = resolve_identifier(self.registry, record)?;
        let Some(object_id) = id else {
            debug!("{} was never persisted, nothing to delete for {}", metadata.name, locale);
            return Ok(());
        };

        match StrategyDetector::detect(record) {
            Strategy::Personal => {
                let exists = record
                    .personal_translations()
                    .is_some_and(|personal| personal.has_translation(locale, field));
                if !exists {
                    debug!("No {} entry of {}.{} to delete", locale, metadata.name, field);
                    return Ok(());
                }

                let entity =
                    PersonalTranslationTypeResolver::new(self.registry).resolve(&metadata.name)?;
                pending.push(PendingDelete::Personal {
                    entity: entity.clone(),
                    record_type: metadata.name.clone(),
                    object_id,
                    field: field.to_string(),
                    locale: locale.clone(),
                });
            }
            Strategy::Shared => pending.push(PendingDelete::Shared {
                record_type: metadata.name.clone(),
                object_id,
                field: field.to_string(),
                locale: locale.clone(),
            }),
        }

        debug!("Queued delete of {} {}.{}", locale, metadata.name, field);
        Ok(())
    }

    fn store_value(
        &self,
        accessor: &DefaultLocaleAccessor<'_, B>,
        record: &mut dyn TranslatableRecord,
        field: &str,
        locale: &LocaleCode,
        value: &str,
    ) -> Result<()> {
        if self.locales.is_default(locale) {
            return accessor.write_default(record, field, Some(value));
        }

        match StrategyDetector::detect(record) {
            Strategy::Personal => {
                let record_type = record.record_type().to_string();
                let entity =
                    PersonalTranslationTypeResolver::new(self.registry).resolve(&record_type)?;
                let personal = record
                    .personal_translations_mut()
                    .ok_or(FieldError::StrategyMismatch { record_type })?;

                personal.add_translation(TranslationEntry::new(
                    entity.name.clone(),
                    locale.clone(),
                    field,
                    Some(value.to_string()),
                ));
                debug!("Appended {} entry for {}", locale, field);
            }
            Strategy::Shared => {
                let (metadata, id) = resolve_identifier(self.registry, record)?;
                let id = id.ok_or_else(|| FieldError::UnsavedRecord {
                    record_type: metadata.name.clone(),
                })?;
                self.backend.translate(&metadata.name, &id, field, locale, value)?;
            }
        }

        Ok(())
    }

    fn execute_deletes(
        &self,
        record: &mut dyn TranslatableRecord,
        pending: &[PendingDelete],
    ) -> Result<()> {
        debug!("Deleting {} translation(s) in one transaction", pending.len());

        self.backend.in_transaction(&mut || {
            for delete in pending {
                delete.execute(self.backend)?;
            }
            Ok(())
        })?;

        if let Some(personal) = record.personal_translations_mut() {
            for delete in pending {
                if let PendingDelete::Personal { locale, field, .. } = delete {
                    personal.remove_translations(locale, field);
                }
            }
        }

        Ok(())
    }
}
