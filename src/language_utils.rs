use isolang::Language;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

use crate::errors::{FieldError, Result};

/// Locale utilities
///
/// Locale codes are opaque to the engine: they are compared as plain strings.
/// Validation only happens when a locale list is configured, where the
/// language subtag must be an ISO 639-1 or ISO 639-2 code.
/// Locale code such as `en`, `fr_FR` or `pt-BR`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocaleCode(String);

impl LocaleCode {
    /// Create a locale code, trimming surrounding whitespace
    pub fn new(code: impl Into<String>) -> Self {
        let code = code.into();
        Self(code.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocaleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LocaleCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for LocaleCode {
    fn from(code: String) -> Self {
        Self::new(code)
    }
}

impl Borrow<str> for LocaleCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Language code type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageCodeType {
    /// ISO 639-1 (2-letter) code
    Part1,
    /// ISO 639-2/T (3-letter) code
    Part2T,
    /// ISO 639-2/B (3-letter) code
    Part2B,
}

/// ISO 639-2/B codes that differ from their 639-2/T form
const PART2B_CODES: [&str; 18] = [
    "fre", "ger", "dut", "gre", "chi", "cze", "ice", "alb", "arm", "baq", "bur", "per", "geo",
    "may", "mac", "rum", "slo", "wel",
];

/// Validate if a language code is a valid ISO 639-1 or ISO 639-2 code
pub fn validate_language_code(code: &str) -> Result<LanguageCodeType> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 {
        if Language::from_639_1(&normalized_code).is_some() {
            return Ok(LanguageCodeType::Part1);
        }
    } else if normalized_code.len() == 3 {
        if Language::from_639_3(&normalized_code).is_some() {
            return Ok(LanguageCodeType::Part2T);
        }
        if PART2B_CODES.contains(&normalized_code.as_str()) {
            return Ok(LanguageCodeType::Part2B);
        }
    }

    Err(FieldError::InvalidLocale(code.to_string()))
}

/// Validate a full locale code: a known language subtag, optionally followed
/// by a region subtag (two letters or three digits) or a script subtag (four letters)
pub fn validate_locale_code(code: &str) -> Result<LanguageCodeType> {
    let mut parts = code.trim().split(['_', '-']);
    let language = parts.next().unwrap_or_default();
    let kind = validate_language_code(language)
        .map_err(|_| FieldError::InvalidLocale(code.to_string()))?;

    for subtag in parts {
        let valid = match subtag.len() {
            2 => subtag.chars().all(|c| c.is_ascii_alphabetic()),
            3 => subtag.chars().all(|c| c.is_ascii_digit()),
            4 => subtag.chars().all(|c| c.is_ascii_alphabetic()),
            _ => false,
        };
        if !valid {
            return Err(FieldError::InvalidLocale(code.to_string()));
        }
    }

    Ok(kind)
}

/// The recognized locales, one of which is the default locale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleSet {
    default: LocaleCode,
    locales: Vec<LocaleCode>,
}

impl LocaleSet {
    /// Build a locale set; the default locale must be part of `locales`.
    /// Duplicates are dropped, keeping the first occurrence.
    pub fn new<I, L>(default: impl Into<LocaleCode>, locales: I) -> Result<Self>
    where
        I: IntoIterator<Item = L>,
        L: Into<LocaleCode>,
    {
        let default = default.into();
        let mut unique: Vec<LocaleCode> = Vec::new();
        for locale in locales {
            let locale = locale.into();
            if locale.as_str().is_empty() {
                return Err(FieldError::InvalidLocale(String::new()));
            }
            if !unique.contains(&locale) {
                unique.push(locale);
            }
        }

        if !unique.contains(&default) {
            return Err(FieldError::Config(format!(
                "Default locale '{}' is not one of the configured locales",
                default
            )));
        }

        Ok(Self {
            default,
            locales: unique,
        })
    }

    pub fn default_locale(&self) -> &LocaleCode {
        &self.default
    }

    pub fn locales(&self) -> &[LocaleCode] {
        &self.locales
    }

    pub fn is_default(&self, locale: &LocaleCode) -> bool {
        *locale == self.default
    }

    pub fn contains(&self, locale: &LocaleCode) -> bool {
        self.locales.contains(locale)
    }
}
