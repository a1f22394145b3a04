use std::collections::BTreeSet;

use async_trait::async_trait;
use rangescout_core::{CountryCode, Language};

use crate::error::ProviderError;
use crate::types::{GeocodedPlace, Location};

/// Forward or reverse geocodes the source of a sweep.
///
/// `Ok(None)` means the location did not match anything inside
/// `allowed_countries` (empty set = unrestricted).
#[async_trait]
pub trait PlaceResolver: Send + Sync {
    async fn resolve(
        &self,
        location: &Location,
        allowed_countries: &BTreeSet<CountryCode>,
        language: Option<Language>,
    ) -> Result<Option<GeocodedPlace>, ProviderError>;
}
