/*!
 * Type metadata registry.
 *
 * Record types and translation entities are registered once at startup.
 * The registry answers identifier-column lookups and resolves which
 * translation entity stores a personal-strategy type's entries, walking the
 * registered parent chain from the most-derived type upwards.
 */

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::errors::{FieldError, Result};

/// Metadata of a primary record type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMetadata {
    /// Record type name
    pub name: String,
    /// Table holding the records (and their default-locale values)
    pub table: String,
    /// Identifier columns
    pub identifier: Vec<String>,
    /// Parent record type, if any
    pub parent: Option<String>,
    /// Translation entity declared directly on this type
    pub translation_entity: Option<String>,
}

impl TypeMetadata {
    pub fn new(
        name: impl Into<String>,
        table: impl Into<String>,
        identifier_column: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            identifier: vec![identifier_column.into()],
            parent: None,
            translation_entity: None,
        }
    }

    pub fn with_identifier<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.identifier = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_translation_entity(mut self, entity: impl Into<String>) -> Self {
        self.translation_entity = Some(entity.into());
        self
    }

    /// The single identifier column; composite identifiers are unsupported
    pub fn identifier_column(&self) -> Result<&str> {
        match self.identifier.as_slice() {
            [column] => Ok(column),
            columns => Err(FieldError::UnsupportedIdentifier {
                record_type: self.name.clone(),
                columns: columns.to_vec(),
            }),
        }
    }
}

/// Metadata of a personal translation entity (one table per entity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationEntityMetadata {
    pub name: String,
    pub table: String,
}

impl TranslationEntityMetadata {
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
        }
    }
}

/// Registration table for record types and translation entities
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<String, TypeMetadata>,
    entities: HashMap<String, TranslationEntityMetadata>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record type
    pub fn register_type(&mut self, metadata: TypeMetadata) -> Result<()> {
        if metadata.identifier.is_empty() {
            return Err(FieldError::Config(format!(
                "Record type '{}' declares no identifier column",
                metadata.name
            )));
        }
        if self.types.contains_key(&metadata.name) {
            return Err(FieldError::Config(format!(
                "Record type '{}' is already registered",
                metadata.name
            )));
        }

        debug!(
            "Registered record type '{}' (table {}, identifier {:?})",
            metadata.name, metadata.table, metadata.identifier
        );
        self.types.insert(metadata.name.clone(), metadata);
        Ok(())
    }

    /// Register a translation entity
    pub fn register_translation_entity(
        &mut self,
        metadata: TranslationEntityMetadata,
    ) -> Result<()> {
        if self.entities.contains_key(&metadata.name) {
            return Err(FieldError::Config(format!(
                "Translation entity '{}' is already registered",
                metadata.name
            )));
        }

        debug!(
            "Registered translation entity '{}' (table {})",
            metadata.name, metadata.table
        );
        self.entities.insert(metadata.name.clone(), metadata);
        Ok(())
    }

    pub fn get(&self, record_type: &str) -> Result<&TypeMetadata> {
        self.types
            .get(record_type)
            .ok_or_else(|| FieldError::UnknownRecordType(record_type.to_string()))
    }

    pub fn translation_entity(&self, name: &str) -> Option<&TranslationEntityMetadata> {
        self.entities.get(name)
    }

    pub fn translation_entities(&self) -> impl Iterator<Item = &TranslationEntityMetadata> {
        self.entities.values()
    }

    /// The type followed by its registered ancestors, most-derived first.
    /// Stops at the first unregistered parent or when the chain loops.
    pub fn lineage<'a>(&'a self, record_type: &str) -> Result<Vec<&'a TypeMetadata>> {
        let mut current = self.get(record_type)?;
        let mut chain = vec![current];
        let mut seen: HashSet<&str> = HashSet::from([current.name.as_str()]);

        while let Some(parent) = current.parent.as_deref() {
            let Some(metadata) = self.types.get(parent) else {
                break;
            };
            if !seen.insert(metadata.name.as_str()) {
                break;
            }
            chain.push(metadata);
            current = metadata;
        }

        Ok(chain)
    }
}

/// Resolves the translation entity used by personal-strategy record types
pub struct PersonalTranslationTypeResolver<'a> {
    registry: &'a TypeRegistry,
}

impl<'a> PersonalTranslationTypeResolver<'a> {
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self { registry }
    }

    /// First translation entity declared along the parent chain
    pub fn resolve(&self, record_type: &str) -> Result<&'a TranslationEntityMetadata> {
        let declared = self
            .registry
            .lineage(record_type)?
            .into_iter()
            .find_map(|metadata| metadata.translation_entity.as_deref());

        declared
            .and_then(|name| self.registry.translation_entity(name))
            .ok_or_else(|| FieldError::MetadataResolution {
                record_type: record_type.to_string(),
            })
    }
}
