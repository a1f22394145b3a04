//! Output languages and country codes.

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Languages the discovery engine can request address labels in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    De,
    En,
    Fr,
    It,
    Es,
    Nl,
    Pl,
    Pt,
    Cs,
    Da,
    Sv,
    Nb,
    Fi,
    Hu,
    Tr,
}

impl Language {
    pub const ALL: &'static [Language] = &[
        Language::De,
        Language::En,
        Language::Fr,
        Language::It,
        Language::Es,
        Language::Nl,
        Language::Pl,
        Language::Pt,
        Language::Cs,
        Language::Da,
        Language::Sv,
        Language::Nb,
        Language::Fi,
        Language::Hu,
        Language::Tr,
    ];

    /// ISO-639-1 code.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Language::De => "de",
            Language::En => "en",
            Language::Fr => "fr",
            Language::It => "it",
            Language::Es => "es",
            Language::Nl => "nl",
            Language::Pl => "pl",
            Language::Pt => "pt",
            Language::Cs => "cs",
            Language::Da => "da",
            Language::Sv => "sv",
            Language::Nb => "nb",
            Language::Fi => "fi",
            Language::Hu => "hu",
            Language::Tr => "tr",
        }
    }

    /// BCP-47 tag with the language's primary region.
    #[must_use]
    pub fn bcp47(self) -> &'static str {
        match self {
            Language::De => "de-DE",
            Language::En => "en-US",
            Language::Fr => "fr-FR",
            Language::It => "it-IT",
            Language::Es => "es-ES",
            Language::Nl => "nl-NL",
            Language::Pl => "pl-PL",
            Language::Pt => "pt-PT",
            Language::Cs => "cs-CZ",
            Language::Da => "da-DK",
            Language::Sv => "sv-SE",
            Language::Nb => "nb-NO",
            Language::Fi => "fi-FI",
            Language::Hu => "hu-HU",
            Language::Tr => "tr-TR",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Accepts bare codes (`de`), BCP-47 tags (`de-DE`, `de_AT`) and any casing;
/// only the primary subtag is significant.
impl std::str::FromStr for Language {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let primary = s
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        // Norwegian Bokmål is commonly sent as `no`.
        let primary = if primary == "no" { "nb".to_string() } else { primary };
        Language::ALL
            .iter()
            .copied()
            .find(|lang| lang.code() == primary)
            .ok_or_else(|| CoreError::UnknownLanguage(s.to_string()))
    }
}

/// Lower-cased ISO-3166-1 alpha-2 country code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCountryCode`] unless `raw` is two ASCII letters.
    pub fn new(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(trimmed.to_ascii_lowercase()))
        } else {
            Err(CoreError::InvalidCountryCode(raw.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CountryCode {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CountryCode> for String {
    fn from(value: CountryCode) -> Self {
        value.0
    }
}

impl std::fmt::Display for CountryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
