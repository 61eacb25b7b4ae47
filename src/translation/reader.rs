/*!
 * Merged locale -> value view of one field.
 */

use log::debug;
use std::collections::BTreeMap;

use super::default_locale::{resolve_identifier, DefaultLocaleAccessor};
use super::strategy::{Strategy, StrategyDetector};
use crate::errors::Result;
use crate::language_utils::{LocaleCode, LocaleSet};
use crate::metadata::TypeRegistry;
use crate::record::{FieldValue, TranslatableRecord};
use crate::store::{RecordStore, SharedTranslationStore};

/// locale -> value of one field
pub type TranslatedFields = BTreeMap<LocaleCode, FieldValue>;

pub struct TranslationReader<'a, B: ?Sized> {
    registry: &'a TypeRegistry,
    backend: &'a B,
    locales: &'a LocaleSet,
}

impl<'a, B> TranslationReader<'a, B>
where
    B: RecordStore + SharedTranslationStore + ?Sized,
{
    pub fn new(registry: &'a TypeRegistry, backend: &'a B, locales: &'a LocaleSet) -> Self {
        Self {
            registry,
            backend,
            locales,
        }
    }

    /// Every known value of `field`, with the default locale read from the
    /// record's own row. Locales without a value are absent.
    pub fn get_translated_fields(
        &self,
        record: &dyn TranslatableRecord,
        field: &str,
    ) -> Result<TranslatedFields> {
        let mut translations = match StrategyDetector::detect(record) {
            Strategy::Personal => Self::personal_translations(record, field),
            Strategy::Shared => self.shared_translations(record, field)?,
        };

        let default_value = DefaultLocaleAccessor::new(
            self.registry,
            self.backend,
            self.locales.default_locale(),
        )
        .read_default(record, field)?;
        translations.insert(self.locales.default_locale().clone(), default_value);

        Ok(translations)
    }

    // Later entries overwrite earlier ones for the same locale
    fn personal_translations(record: &dyn TranslatableRecord, field: &str) -> TranslatedFields {
        let mut translations = TranslatedFields::new();
        let Some(personal) = record.personal_translations() else {
            return translations;
        };

        for entry in personal.translations().iter().filter(|e| e.field() == field) {
            translations.insert(entry.locale().clone(), entry.content().map(str::to_string));
        }
        translations
    }

    fn shared_translations(
        &self,
        record: &dyn TranslatableRecord,
        field: &str,
    ) -> Result<TranslatedFields> {
        let (metadata, id) = resolve_identifier(self.registry, record)?;
        let Some(id) = id else {
            debug!("{} has no identifier yet, no shared translations", metadata.name);
            return Ok(TranslatedFields::new());
        };

        Ok(self
            .backend
            .find_all_translations(&metadata.name, &id)?
            .into_iter()
            .map(|(locale, mut fields)| (locale, fields.remove(field).flatten()))
            .collect())
    }
}
