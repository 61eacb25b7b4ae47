/*!
 * Translated field engine.
 *
 * This module decides where each locale value of a translatable field lives
 * and reads or edits them through the store traits. It is split into
 * several submodules:
 *
 * - `strategy`: Personal vs. shared strategy detection
 * - `default_locale`: Inline default-locale reads and writes
 * - `reader`: Merged locale -> value view of a field
 * - `writer`: Applying a submitted edit, with batched atomic deletes
 * - `manager`: `TranslatableFieldManager`, the public entry point
 */

// Re-export main types for easier usage
pub use self::default_locale::DefaultLocaleAccessor;
pub use self::manager::TranslatableFieldManager;
pub use self::reader::{TranslatedFields, TranslationReader};
pub use self::strategy::{Strategy, StrategyDetector};
pub use self::writer::{SubmittedValues, TranslationWriter};

// Submodules
pub mod default_locale;
pub mod manager;
pub mod reader;
pub mod strategy;
pub mod writer;
