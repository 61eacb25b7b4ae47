/*!
 * Entry point for reading and editing translated fields.
 *
 * `TranslatableFieldManager` owns the registry, the backend and the locale
 * configuration, and hands out short-lived readers and writers over them.
 */

use log::{debug, info};
use std::sync::Arc;

use super::reader::{TranslatedFields, TranslationReader};
use super::writer::{SubmittedValues, TranslationWriter};
use crate::app_config::{Config, EditAtomicity};
use crate::database::{DatabaseConnection, Repository};
use crate::errors::Result;
use crate::language_utils::{LocaleCode, LocaleSet};
use crate::metadata::TypeRegistry;
use crate::record::{FieldValue, TranslatableRecord};
use crate::store::TranslationBackend;

pub struct TranslatableFieldManager<B: TranslationBackend> {
    registry: Arc<TypeRegistry>,
    backend: B,
    locales: LocaleSet,
    atomicity: EditAtomicity,
}

impl<B: TranslationBackend> TranslatableFieldManager<B> {
    pub fn new(registry: Arc<TypeRegistry>, backend: B, locales: LocaleSet) -> Self {
        Self {
            registry,
            backend,
            locales,
            atomicity: EditAtomicity::default(),
        }
    }

    pub fn with_atomicity(mut self, atomicity: EditAtomicity) -> Self {
        self.atomicity = atomicity;
        self
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn locales(&self) -> &LocaleSet {
        &self.locales
    }

    pub fn reader(&self) -> TranslationReader<'_, B> {
        TranslationReader::new(&self.registry, &self.backend, &self.locales)
    }

    pub fn writer(&self) -> TranslationWriter<'_, B> {
        TranslationWriter::new(&self.registry, &self.backend, &self.locales, self.atomicity)
    }

    /// Every known locale value of `field`
    pub fn get_translated_fields(
        &self,
        record: &dyn TranslatableRecord,
        field: &str,
    ) -> Result<TranslatedFields> {
        self.reader().get_translated_fields(record, field)
    }

    /// Apply a submitted edit restricted to `locales`
    pub fn persist_translations(
        &self,
        record: &mut dyn TranslatableRecord,
        field: &str,
        submitted: &SubmittedValues,
        locales: &[LocaleCode],
    ) -> Result<()> {
        debug!(
            "Persisting {} submitted value(s) of {}.{}",
            submitted.len(),
            record.record_type(),
            field
        );
        self.writer()
            .persist_translations(record, field, submitted, locales)
    }

    /// Apply a submitted edit over every configured locale
    pub fn persist_submitted(
        &self,
        record: &mut dyn TranslatableRecord,
        field: &str,
        submitted: &SubmittedValues,
    ) -> Result<()> {
        self.persist_translations(record, field, submitted, self.locales.locales())
    }

    /// One (locale, current value) pair per configured locale, in configured
    /// order, for pre-filling an edit form. Locales without a value yield null.
    pub fn locale_inputs(
        &self,
        record: &dyn TranslatableRecord,
        field: &str,
    ) -> Result<Vec<(LocaleCode, FieldValue)>> {
        let mut current = self.get_translated_fields(record, field)?;

        Ok(self
            .locales
            .locales()
            .iter()
            .map(|locale| (locale.clone(), current.remove(locale).flatten()))
            .collect())
    }
}

impl TranslatableFieldManager<Repository> {
    /// Open the configured database and build a manager over it
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let registry = Arc::new(config.build_registry()?);
        let db = match &config.database_path {
            Some(path) => DatabaseConnection::new(path)?,
            None => DatabaseConnection::new_default()?,
        };
        info!("Using translation database at {:?}", db.path());

        let repository = Repository::new(db, Arc::clone(&registry))?;
        Ok(Self::new(registry, repository, config.locale_set()?)
            .with_atomicity(config.edit_atomicity))
    }
}
