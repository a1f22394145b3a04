use std::collections::BTreeSet;

use rangescout_core::{Coordinates, CountryCode, Language, ProviderKind};
use serde::{Deserialize, Serialize};

use crate::error::DiscoveryError;
use crate::geo::distance_meters;

/// Where a sweep starts: a coordinate pair or a free-text address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Location {
    Coordinates(Coordinates),
    Address(String),
}

/// One discovery request. Immutable once built.
#[derive(Debug, Clone)]
pub struct RequestContext {
    provider: ProviderKind,
    location: Location,
    radius_meters: u32,
    allowed_countries: BTreeSet<CountryCode>,
    language_override: Option<Language>,
}

impl RequestContext {
    /// # Errors
    ///
    /// Returns [`DiscoveryError::InvalidRequest`] for a zero radius, a blank
    /// address, or out-of-range coordinates.
    pub fn new(
        provider: ProviderKind,
        location: Location,
        radius_meters: u32,
    ) -> Result<Self, DiscoveryError> {
        if radius_meters == 0 {
            return Err(DiscoveryError::InvalidRequest(
                "radius must be at least 1 meter".to_string(),
            ));
        }

        let location = match location {
            Location::Coordinates(coords) if !coords.is_valid() => {
                return Err(DiscoveryError::InvalidRequest(format!(
                    "coordinates out of range: {coords}"
                )));
            }
            Location::Address(address) => {
                let trimmed = address.trim();
                if trimmed.is_empty() {
                    return Err(DiscoveryError::InvalidRequest(
                        "address must not be empty".to_string(),
                    ));
                }
                Location::Address(trimmed.to_string())
            }
            coords @ Location::Coordinates(_) => coords,
        };

        Ok(Self {
            provider,
            location,
            radius_meters,
            allowed_countries: BTreeSet::new(),
            language_override: None,
        })
    }

    #[must_use]
    pub fn with_allowed_countries(mut self, countries: impl IntoIterator<Item = CountryCode>) -> Self {
        self.allowed_countries = countries.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_language_override(mut self, language: Option<Language>) -> Self {
        self.language_override = language;
        self
    }

    #[must_use]
    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }

    #[must_use]
    pub fn radius_meters(&self) -> u32 {
        self.radius_meters
    }

    /// Empty means unrestricted.
    #[must_use]
    pub fn allowed_countries(&self) -> &BTreeSet<CountryCode> {
        &self.allowed_countries
    }

    #[must_use]
    pub fn language_override(&self) -> Option<Language> {
        self.language_override
    }
}

/// A structured address part as returned by a geocoder.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

impl AddressComponent {
    #[must_use]
    pub fn has_type(&self, kind: &str) -> bool {
        self.types.iter().any(|t| t == kind)
    }
}

/// Unvalidated result of a place lookup.
#[derive(Debug, Clone, Default)]
pub struct GeocodedPlace {
    pub formatted_address: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub components: Vec<AddressComponent>,
}

/// The source of a sweep after validation. All distances are measured from
/// its coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPlace {
    pub coordinates: Coordinates,
    pub formatted_address: String,
    pub country_code: Option<CountryCode>,
}

impl ResolvedPlace {
    /// Returns `None` when the place lacks coordinates, address components or
    /// a formatted address.
    #[must_use]
    pub fn from_geocoded(place: GeocodedPlace) -> Option<Self> {
        let coordinates = place.coordinates.filter(Coordinates::is_valid)?;
        if place.components.is_empty() {
            return None;
        }
        let formatted_address = place
            .formatted_address
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())?;
        let country_code = place
            .components
            .iter()
            .find(|c| c.has_type("country"))
            .and_then(|c| CountryCode::new(&c.short_name).ok());

        Some(Self {
            coordinates,
            formatted_address,
            country_code,
        })
    }
}

/// An address as a provider reported it, before distance is attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawCandidate {
    pub full_address: String,
    pub street_name: Option<String>,
    pub street_number: Option<String>,
    pub postal_code: Option<String>,
    pub locality: Option<String>,
    pub country: Option<String>,
    pub location: Coordinates,
}

impl RawCandidate {
    /// Attaches the distance from the sweep source. This is the only way to
    /// obtain an [`AddressCandidate`].
    #[must_use]
    pub fn measured_from(self, source: Coordinates) -> AddressCandidate {
        let distance_in_meters = distance_meters(source, self.location);
        AddressCandidate {
            address: self,
            distance_in_meters,
        }
    }
}

/// A discovered address tagged with its distance from the resolved source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressCandidate {
    #[serde(flatten)]
    address: RawCandidate,
    distance_in_meters: f64,
}

impl AddressCandidate {
    #[must_use]
    pub fn full_address(&self) -> &str {
        &self.address.full_address
    }

    #[must_use]
    pub fn address(&self) -> &RawCandidate {
        &self.address
    }

    #[must_use]
    pub fn location(&self) -> Coordinates {
        self.address.location
    }

    #[must_use]
    pub fn distance_in_meters(&self) -> f64 {
        self.distance_in_meters
    }
}

/// Cleans a provider label into a dedup key: trims, collapses whitespace and
/// strips a trailing `, <country>` suffix. Case is preserved.
#[must_use]
pub fn normalize_full_address(raw: &str, country: Option<&str>) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let Some(country) = country.map(str::trim).filter(|c| !c.is_empty()) else {
        return collapsed;
    };

    let suffix = format!(", {country}");
    match collapsed.strip_suffix(&suffix) {
        Some(stripped) if !stripped.trim().is_empty() => stripped.trim_end().to_string(),
        _ => collapsed,
    }
}

/// The terminal artifact of one discovery call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryReport {
    coordinates: Coordinates,
    source_address: String,
    returned_addresses_number: usize,
    returned_addresses: Vec<AddressCandidate>,
    api_requests_number: u32,
}

impl DiscoveryReport {
    pub(crate) fn new(
        source: &ResolvedPlace,
        returned_addresses: Vec<AddressCandidate>,
        api_requests_number: u32,
    ) -> Self {
        Self {
            coordinates: source.coordinates,
            source_address: source.formatted_address.clone(),
            returned_addresses_number: returned_addresses.len(),
            returned_addresses,
            api_requests_number,
        }
    }

    pub(crate) fn empty(source: &ResolvedPlace, api_requests_number: u32) -> Self {
        Self::new(source, Vec::new(), api_requests_number)
    }

    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    #[must_use]
    pub fn source_address(&self) -> &str {
        &self.source_address
    }

    #[must_use]
    pub fn returned_addresses_number(&self) -> usize {
        self.returned_addresses_number
    }

    #[must_use]
    pub fn returned_addresses(&self) -> &[AddressCandidate] {
        &self.returned_addresses
    }

    #[must_use]
    pub fn api_requests_number(&self) -> u32 {
        self.api_requests_number
    }
}
