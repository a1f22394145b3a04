//! Wire types for the HERE reverse-geocoding API.

use rangescout_core::Coordinates;
use serde::Deserialize;

use crate::provider::non_empty;
use crate::types::{normalize_full_address, RawCandidate};

#[derive(Debug, Deserialize)]
pub(crate) struct RevGeocodeResponse {
    #[serde(default)]
    pub items: Vec<RevGeocodeItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RevGeocodeItem {
    #[serde(default)]
    pub address: Option<HereAddress>,
    #[serde(default)]
    pub position: Option<Coordinates>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HereAddress {
    pub label: Option<String>,
    pub country_name: Option<String>,
    pub city: Option<String>,
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub house_number: Option<String>,
}

impl RevGeocodeItem {
    /// Items without a label or a valid position are skipped.
    pub fn into_candidate(self) -> Option<RawCandidate> {
        let location = self.position.filter(Coordinates::is_valid)?;
        let address = self.address?;
        let country = non_empty(address.country_name.as_deref());
        let full_address = normalize_full_address(address.label.as_deref()?, country.as_deref());
        if full_address.is_empty() {
            return None;
        }

        Some(RawCandidate {
            full_address,
            street_name: non_empty(address.street.as_deref()),
            street_number: non_empty(address.house_number.as_deref()),
            postal_code: non_empty(address.postal_code.as_deref()),
            locality: non_empty(address.city.as_deref()),
            country,
            location,
        })
    }
}
