//! Wire types for the Google Geocoding API.

use rangescout_core::Coordinates;
use serde::Deserialize;

use crate::types::{AddressComponent, GeocodedPlace};

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GeocodeResult {
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Geometry {
    pub location: Coordinates,
}

impl GeocodeResult {
    pub fn location(&self) -> Option<Coordinates> {
        self.geometry
            .as_ref()
            .map(|g| g.location)
            .filter(Coordinates::is_valid)
    }

    pub fn component(&self, kind: &str) -> Option<&AddressComponent> {
        self.address_components.iter().find(|c| c.has_type(kind))
    }

    pub fn long_name(&self, kind: &str) -> Option<&str> {
        self.component(kind).map(|c| c.long_name.as_str())
    }

    /// Lower-cased alpha-2 code of the country component.
    pub fn country_code(&self) -> Option<String> {
        self.component("country")
            .map(|c| c.short_name.trim().to_ascii_lowercase())
    }
}

impl From<GeocodeResult> for GeocodedPlace {
    fn from(result: GeocodeResult) -> Self {
        let coordinates = result.location();
        Self {
            formatted_address: result.formatted_address,
            coordinates,
            components: result.address_components,
        }
    }
}
