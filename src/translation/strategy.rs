/*!
 * Storage strategy detection.
 */

use crate::record::TranslatableRecord;

/// Where a record keeps its non-default-locale values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Dedicated per-type table, entries owned by the record
    Personal,
    /// Generic table keyed by (type, id, field, locale)
    Shared,
}

pub struct StrategyDetector;

impl StrategyDetector {
    /// Personal when the record's type exposes its own translations
    pub fn detect(record: &dyn TranslatableRecord) -> Strategy {
        if record.personal_translations().is_some() {
            Strategy::Personal
        } else {
            Strategy::Shared
        }
    }
}
