/*!
 * Inline default-locale access.
 *
 * The default-locale value of a field lives on the record's own row. It is
 * always read back from the record store, never from the in-memory record,
 * which may have been loaded in another locale.
 */

use log::debug;

use crate::errors::Result;
use crate::language_utils::LocaleCode;
use crate::metadata::{TypeMetadata, TypeRegistry};
use crate::record::{FieldValue, RecordId, TranslatableRecord};
use crate::store::RecordStore;

/// Look up the record's type and its single identifier value
pub(crate) fn resolve_identifier<'r>(
    registry: &'r TypeRegistry,
    record: &dyn TranslatableRecord,
) -> Result<(&'r TypeMetadata, Option<RecordId>)> {
    let metadata = registry.get(record.record_type())?;
    let column = metadata.identifier_column()?;
    Ok((metadata, record.identifier_value(column)))
}

pub struct DefaultLocaleAccessor<'a, S: RecordStore + ?Sized> {
    registry: &'a TypeRegistry,
    store: &'a S,
    default_locale: &'a LocaleCode,
}

impl<'a, S: RecordStore + ?Sized> DefaultLocaleAccessor<'a, S> {
    pub fn new(registry: &'a TypeRegistry, store: &'a S, default_locale: &'a LocaleCode) -> Self {
        Self {
            registry,
            store,
            default_locale,
        }
    }

    /// Default-locale value of `field`, null when the record has no row yet
    pub fn read_default(&self, record: &dyn TranslatableRecord, field: &str) -> Result<FieldValue> {
        let (metadata, id) = resolve_identifier(self.registry, record)?;
        let Some(id) = id else {
            debug!("{} has no identifier yet, default value of {} is null", metadata.name, field);
            return Ok(None);
        };

        let value = self
            .store
            .find_field_in_locale(metadata, &id, field, self.default_locale)?;
        Ok(value.flatten())
    }

    /// Overwrite the default-locale value of `field` with a one-column update
    pub fn write_default(
        &self,
        record: &dyn TranslatableRecord,
        field: &str,
        value: Option<&str>,
    ) -> Result<()> {
        let (metadata, id) = resolve_identifier(self.registry, record)?;
        let Some(id) = id else {
            debug!("{} has no identifier yet, no row to update for {}", metadata.name, field);
            return Ok(());
        };

        let updated = self.store.update_field_in_locale(
            metadata,
            &id,
            field,
            value,
            self.default_locale,
        )?;
        if updated == 0 {
            debug!("No {} row with id {} to update", metadata.name, id);
        }
        Ok(())
    }
}
