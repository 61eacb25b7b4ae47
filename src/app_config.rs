use anyhow::Context;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::database::schema::quote_identifier;
use crate::errors::{FieldError, Result};
use crate::language_utils::{validate_locale_code, LocaleSet};
use crate::metadata::{TranslationEntityMetadata, TypeMetadata, TypeRegistry};

/// Application configuration module
/// This module handles the locale setup, the record type registry and the
/// database location, including loading, validating and saving them.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Locale stored inline on the records' own rows
    #[serde(default = "default_locale")]
    pub default_locale: String,

    /// Every editable locale, in form order
    #[serde(default = "default_locales")]
    pub locales: Vec<String>,

    /// SQLite database file, defaults to the user data directory
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// How much of an edit runs in one transaction
    #[serde(default)]
    pub edit_atomicity: EditAtomicity,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    #[serde(default)]
    pub record_types: Vec<RecordTypeConfig>,

    #[serde(default)]
    pub translation_entities: Vec<TranslationEntityConfig>,
}

/// Transaction scope of one edit
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EditAtomicity {
    /// Only the batch of deletes is atomic
    #[default]
    DeletesOnly,
    /// The whole edit commits or rolls back together
    WholeEdit,
}

/// A record type as declared in the configuration file
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RecordTypeConfig {
    pub name: String,
    pub table: String,

    #[serde(default = "default_identifier")]
    pub identifier: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Personal translation entity declared by this type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation_entity: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TranslationEntityConfig {
    pub name: String,
    pub table: String,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_locales() -> Vec<String> {
    vec!["en".to_string(), "fr".to_string(), "de".to_string()]
}

fn default_identifier() -> Vec<String> {
    vec!["id".to_string()]
}

impl Config {
    /// Read a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {:?}", path))?;

        let config: Config = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;

        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        validate_locale_code(&self.default_locale)?;
        for locale in &self.locales {
            validate_locale_code(locale)?;
        }
        self.locale_set()?;

        let entities: HashSet<&str> = self
            .translation_entities
            .iter()
            .map(|entity| entity.name.as_str())
            .collect();
        let types: HashSet<&str> = self.record_types.iter().map(|t| t.name.as_str()).collect();

        for entity in &self.translation_entities {
            quote_identifier(&entity.table)?;
        }

        for record_type in &self.record_types {
            quote_identifier(&record_type.table)?;
            for column in &record_type.identifier {
                quote_identifier(column)?;
            }

            if let Some(parent) = &record_type.parent {
                if !types.contains(parent.as_str()) {
                    return Err(FieldError::Config(format!(
                        "Record type '{}' extends unknown type '{}'",
                        record_type.name, parent
                    )));
                }
            }

            if let Some(entity) = &record_type.translation_entity {
                if !entities.contains(entity.as_str()) {
                    return Err(FieldError::Config(format!(
                        "Record type '{}' declares unknown translation entity '{}'",
                        record_type.name, entity
                    )));
                }
            }
        }

        self.build_registry()?;
        Ok(())
    }

    pub fn locale_set(&self) -> Result<LocaleSet> {
        LocaleSet::new(self.default_locale.as_str(), self.locales.iter().map(String::as_str))
    }

    /// Registry of every declared record type and translation entity
    pub fn build_registry(&self) -> Result<TypeRegistry> {
        let mut registry = TypeRegistry::new();

        for entity in &self.translation_entities {
            registry.register_translation_entity(TranslationEntityMetadata::new(
                entity.name.as_str(),
                entity.table.as_str(),
            ))?;
        }

        for record_type in &self.record_types {
            let mut metadata =
                TypeMetadata::new(record_type.name.as_str(), record_type.table.as_str(), "id")
                    .with_identifier(record_type.identifier.iter().map(String::as_str));
            if let Some(parent) = &record_type.parent {
                metadata = metadata.extends(parent.as_str());
            }
            if let Some(entity) = &record_type.translation_entity {
                metadata = metadata.with_translation_entity(entity.as_str());
            }
            registry.register_type(metadata)?;
        }

        Ok(registry)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            default_locale: default_locale(),
            locales: default_locales(),
            database_path: None,
            edit_atomicity: EditAtomicity::default(),
            log_level: LogLevel::default(),
            record_types: Vec::new(),
            translation_entities: Vec::new(),
        }
    }
}
