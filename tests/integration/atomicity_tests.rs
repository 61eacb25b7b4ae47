/*!
 * Integration tests for delete batching and transaction scope
 */

use std::sync::Arc;

use translatable_field::app_config::EditAtomicity;
use translatable_field::{FieldError, PersonalTranslations, RecordId, TranslatableFieldManager};

use crate::common::memory_backend::MemoryBackend;
use crate::common::{
    article_column, catalog_registry, count_rows, create_manager, fields, reject_deletes,
    seed_shared, submitted, test_locales, Article, Product,
};

#[test]
fn test_persistSubmitted_withFailingDelete_shouldRollBackWholeDeleteBatch() {
    let manager = create_manager(EditAtomicity::DeletesOnly);
    seed_shared(&manager, "article", 42, "title", "fr", "Bonjour");
    seed_shared(&manager, "article", 42, "title", "de", "Hallo");
    reject_deletes(&manager, "translations", "de");
    let mut article = Article::saved(42);

    let result = manager.persist_submitted(
        &mut article,
        "title",
        &submitted(&[("fr", None), ("de", None)]),
    );

    assert!(matches!(result, Err(FieldError::Database(_))));
    assert_eq!(
        manager.get_translated_fields(&article, "title").unwrap(),
        fields(&[("en", Some("Hello")), ("fr", Some("Bonjour")), ("de", Some("Hallo"))])
    );
}

#[test]
fn test_persistSubmitted_withDeletesOnlyScope_shouldKeepWritesMadeBeforeFailedDeletes() {
    let manager = create_manager(EditAtomicity::DeletesOnly);
    seed_shared(&manager, "article", 42, "title", "de", "Hallo");
    reject_deletes(&manager, "translations", "de");
    let mut article = Article::saved(42);

    let result = manager.persist_submitted(
        &mut article,
        "title",
        &submitted(&[("en", Some("Hi")), ("fr", Some("Salut")), ("de", None)]),
    );

    assert!(result.is_err());
    // Non-delete writes are applied immediately and survive the failed batch
    assert_eq!(article_column(&manager, "title"), Some("Hi".to_string()));
    assert_eq!(
        manager.get_translated_fields(&article, "title").unwrap(),
        fields(&[("en", Some("Hi")), ("fr", Some("Salut")), ("de", Some("Hallo"))])
    );
}

#[test]
fn test_persistSubmitted_withWholeEditScope_shouldRollBackEverything() {
    let manager = create_manager(EditAtomicity::WholeEdit);
    seed_shared(&manager, "article", 42, "title", "de", "Hallo");
    reject_deletes(&manager, "translations", "de");
    let mut article = Article::saved(42);

    let result = manager.persist_submitted(
        &mut article,
        "title",
        &submitted(&[("en", Some("Hi")), ("fr", Some("Salut")), ("de", None)]),
    );

    assert!(matches!(result, Err(FieldError::Database(_))));
    assert_eq!(article_column(&manager, "title"), Some("Hello".to_string()));
    assert_eq!(
        manager.get_translated_fields(&article, "title").unwrap(),
        fields(&[("en", Some("Hello")), ("de", Some("Hallo"))])
    );
}

#[test]
fn test_persistSubmitted_withWholeEditScope_shouldCommitSuccessfulEdit() {
    let manager = create_manager(EditAtomicity::WholeEdit);
    seed_shared(&manager, "article", 42, "title", "fr", "Bonjour");
    let mut article = Article::saved(42);

    manager
        .persist_submitted(
            &mut article,
            "title",
            &submitted(&[("en", Some("Hi")), ("fr", None), ("de", Some("Hallo"))]),
        )
        .unwrap();

    assert!(!manager.backend().connection().in_transaction());
    assert_eq!(
        manager.get_translated_fields(&article, "title").unwrap(),
        fields(&[("en", Some("Hi")), ("de", Some("Hallo"))])
    );
}

#[test]
fn test_persistSubmitted_withFailingPersonalDelete_shouldKeepInMemoryEntries() {
    let manager = create_manager(EditAtomicity::DeletesOnly);
    let mut product = Product::new(1);
    manager
        .persist_submitted(
            &mut product,
            "name",
            &submitted(&[("fr", Some("Chaise")), ("de", Some("Stuhl"))]),
        )
        .unwrap();
    reject_deletes(&manager, "product_translations", "de");

    let mut reloaded = Product::load(&manager, 1);
    let result = manager.persist_submitted(
        &mut reloaded,
        "name",
        &submitted(&[("fr", None), ("de", None)]),
    );

    assert!(result.is_err());
    assert_eq!(reloaded.translations.len(), 2);
    assert_eq!(count_rows(&manager, "product_translations"), 2);
}

#[test]
fn test_persistSubmitted_shouldRunQueuedDeletesInOneTransaction() {
    let backend = MemoryBackend::new();
    let id = RecordId::Integer(42);
    backend.set_row("articles", &id, "title", Some("Hello"));
    let manager =
        TranslatableFieldManager::new(Arc::new(catalog_registry()), backend, test_locales());
    let mut article = Article::saved(42);

    manager
        .persist_submitted(
            &mut article,
            "title",
            &submitted(&[("en", Some("Hi")), ("fr", None), ("de", None)]),
        )
        .unwrap();

    assert_eq!(
        manager.backend().calls(),
        vec![
            "update title en",
            "begin",
            "delete title fr",
            "delete title de",
            "commit",
            "persist",
        ]
    );
    assert_eq!(
        manager.backend().row("articles", &id, "title"),
        Some(Some("Hi".to_string()))
    );
}

#[test]
fn test_persistSubmitted_withoutDeletes_shouldNotOpenTransaction() {
    let manager = TranslatableFieldManager::new(
        Arc::new(catalog_registry()),
        MemoryBackend::new(),
        test_locales(),
    );
    let mut article = Article::saved(42);

    manager
        .persist_submitted(&mut article, "title", &submitted(&[("fr", Some("Bonjour"))]))
        .unwrap();

    assert_eq!(manager.backend().calls(), vec!["translate title fr", "persist"]);
    assert_eq!(
        manager.backend().shared_value("article", &RecordId::Integer(42), "title", "fr"),
        Some("Bonjour".to_string())
    );
}

#[test]
fn test_persistSubmitted_withFailingMemoryDelete_shouldRestoreEarlierDeletes() {
    let manager = TranslatableFieldManager::new(
        Arc::new(catalog_registry()),
        MemoryBackend::new(),
        test_locales(),
    );
    let id = RecordId::Integer(42);
    let mut article = Article::saved(42);
    manager
        .persist_submitted(
            &mut article,
            "title",
            &submitted(&[("fr", Some("Bonjour")), ("de", Some("Hallo"))]),
        )
        .unwrap();
    manager.backend().fail_deletes_of("de");

    let result = manager.persist_submitted(
        &mut article,
        "title",
        &submitted(&[("fr", None), ("de", None)]),
    );

    assert!(result.is_err());
    assert!(manager.backend().calls().ends_with(&[
        "begin".to_string(),
        "delete title fr".to_string(),
        "delete title de".to_string(),
        "rollback".to_string(),
    ]));
    assert_eq!(
        manager.backend().shared_value("article", &id, "title", "fr"),
        Some("Bonjour".to_string())
    );
}

#[test]
fn test_persistSubmitted_withMemoryPersonalRecord_shouldFlushThroughPersist() {
    let manager = TranslatableFieldManager::new(
        Arc::new(catalog_registry()),
        MemoryBackend::new(),
        test_locales(),
    )
    .with_atomicity(EditAtomicity::WholeEdit);
    let mut product = Product::new(1);

    manager
        .persist_submitted(&mut product, "name", &submitted(&[("fr", Some("Chaise"))]))
        .unwrap();

    assert_eq!(manager.backend().calls(), vec!["begin", "persist", "commit"]);
    assert!(product.translations.iter().all(|entry| entry.is_persisted()));
    assert!(product.translations.has_translation(&"fr".into(), "name"));
}
