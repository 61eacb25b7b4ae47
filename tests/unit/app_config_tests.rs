/*!
 * Tests for application configuration functionality
 */

use tempfile::TempDir;
use translatable_field::app_config::{
    Config, EditAtomicity, LogLevel, RecordTypeConfig, TranslationEntityConfig,
};
use translatable_field::errors::FieldError;
use translatable_field::PersonalTranslationTypeResolver;

fn catalog_config() -> Config {
    Config {
        record_types: vec![
            RecordTypeConfig {
                name: "article".to_string(),
                table: "articles".to_string(),
                identifier: vec!["id".to_string()],
                parent: None,
                translation_entity: None,
            },
            RecordTypeConfig {
                name: "catalog_item".to_string(),
                table: "catalog_items".to_string(),
                identifier: vec!["id".to_string()],
                parent: None,
                translation_entity: Some("product_translation".to_string()),
            },
            RecordTypeConfig {
                name: "product".to_string(),
                table: "products".to_string(),
                identifier: vec!["id".to_string()],
                parent: Some("catalog_item".to_string()),
                translation_entity: None,
            },
        ],
        translation_entities: vec![TranslationEntityConfig {
            name: "product_translation".to_string(),
            table: "product_translations".to_string(),
        }],
        ..Config::default()
    }
}

/// Test default configuration values
#[test]
fn test_defaultConfig_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.default_locale, "en");
    assert_eq!(config.locales, vec!["en", "fr", "de"]);
    assert_eq!(config.database_path, None);
    assert_eq!(config.edit_atomicity, EditAtomicity::DeletesOnly);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

#[test]
fn test_configValidation_withInvalidLocales_shouldFail() {
    let mut config = Config::default();

    config.default_locale = "it".to_string();
    assert!(matches!(config.validate(), Err(FieldError::Config(_))));

    config.default_locale = "en".to_string();
    config.locales.push("xx".to_string());
    assert!(matches!(config.validate(), Err(FieldError::InvalidLocale(_))));
}

#[test]
fn test_configValidation_withDanglingReferences_shouldFail() {
    let mut config = catalog_config();
    assert!(config.validate().is_ok());

    config.record_types[2].parent = Some("missing".to_string());
    assert!(matches!(config.validate(), Err(FieldError::Config(_))));

    let mut config = catalog_config();
    config.record_types[1].translation_entity = Some("missing".to_string());
    assert!(matches!(config.validate(), Err(FieldError::Config(_))));
}

#[test]
fn test_configValidation_withUnsafeTableName_shouldFail() {
    let mut config = catalog_config();
    config.record_types[0].table = "articles; DROP TABLE x".to_string();

    assert!(matches!(config.validate(), Err(FieldError::InvalidIdentifier(_))));
}

#[test]
fn test_configValidation_withDuplicateType_shouldFail() {
    let mut config = catalog_config();
    let duplicate = config.record_types[0].clone();
    config.record_types.push(duplicate);

    assert!(matches!(config.validate(), Err(FieldError::Config(_))));
}

#[test]
fn test_buildRegistry_shouldResolveInheritedEntity() {
    let registry = catalog_config().build_registry().unwrap();

    let entity = PersonalTranslationTypeResolver::new(&registry)
        .resolve("product")
        .unwrap();
    assert_eq!(entity.table, "product_translations");
    assert!(PersonalTranslationTypeResolver::new(&registry).resolve("article").is_err());
}

#[test]
fn test_configJson_withMissingFields_shouldUseDefaults() {
    let json = r#"{
        "default_locale": "fr",
        "locales": ["fr", "en"],
        "edit_atomicity": "whole_edit",
        "record_types": [{ "name": "article", "table": "articles" }]
    }"#;

    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.edit_atomicity, EditAtomicity::WholeEdit);
    assert_eq!(config.log_level, LogLevel::Info);
    assert_eq!(config.record_types[0].identifier, vec!["id"]);
    assert_eq!(config.locale_set().unwrap().default_locale().as_str(), "fr");
}

#[test]
fn test_configSaveLoad_shouldRoundTripThroughFile() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("conf.json");
    let mut config = catalog_config();
    config.database_path = Some(dir.path().join("translations.db"));
    config.log_level = LogLevel::Debug;

    config.save(&path).unwrap();
    let loaded = Config::load(&path).unwrap();

    assert_eq!(loaded.record_types, config.record_types);
    assert_eq!(loaded.translation_entities, config.translation_entities);
    assert_eq!(loaded.database_path, config.database_path);
    assert_eq!(loaded.log_level, LogLevel::Debug);
}

#[test]
fn test_configLoad_withMissingFile_shouldFail() {
    let dir = TempDir::new().unwrap();
    let result = Config::load(dir.path().join("absent.json"));
    assert!(matches!(result, Err(FieldError::Other(_))));
}

#[test]
fn test_logLevel_toLevelFilter_shouldMapEachLevel() {
    assert_eq!(LogLevel::Error.to_level_filter(), log::LevelFilter::Error);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
}
