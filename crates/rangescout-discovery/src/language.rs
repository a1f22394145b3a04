//! Output-language selection for a sweep.

use rangescout_core::{CountryCode, Language};

/// Official or dominant languages per country, richest first.
fn preferred_languages(country: &CountryCode) -> &'static [Language] {
    match country.as_str() {
        "de" | "at" | "li" => &[Language::De],
        "ch" => &[Language::De, Language::Fr, Language::It],
        "lu" => &[Language::De, Language::Fr],
        "be" => &[Language::Nl, Language::Fr, Language::De],
        "fr" | "mc" => &[Language::Fr],
        "it" | "sm" | "va" => &[Language::It],
        "es" => &[Language::Es],
        "nl" => &[Language::Nl],
        "pl" => &[Language::Pl],
        "pt" => &[Language::Pt],
        "cz" => &[Language::Cs],
        "dk" => &[Language::Da],
        "se" => &[Language::Sv],
        "no" => &[Language::Nb],
        "fi" => &[Language::Fi, Language::Sv],
        "hu" => &[Language::Hu],
        "tr" => &[Language::Tr],
        "gb" | "ie" | "us" | "au" | "nz" => &[Language::En],
        "ca" => &[Language::En, Language::Fr],
        _ => &[],
    }
}

/// Picks the language a provider should answer in.
///
/// An explicit override always wins. Otherwise the first language of the
/// place's country that the provider supports is used, falling back to
/// `default`. Never fails.
#[must_use]
pub fn resolve_language(
    language_override: Option<Language>,
    country: Option<&CountryCode>,
    supported: &[Language],
    default: Language,
) -> Language {
    if let Some(language) = language_override {
        return language;
    }

    country
        .map(preferred_languages)
        .and_then(|preferred| preferred.iter().find(|lang| supported.contains(lang)))
        .copied()
        .unwrap_or(default)
}
