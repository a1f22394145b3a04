//! Address discovery within a radius.
//!
//! A [`RangeDiscovery`] resolves the source location once, lays a lattice of
//! grid points over the search disc and asks an [`AddressProvider`] for the
//! addresses around every point. Candidates are merged into a
//! [`DiscoveryReport`] sorted by distance from the source.

pub mod aggregate;
pub mod error;
pub mod geo;
pub mod grid;
pub mod language;
pub mod orchestrator;
pub mod provider;
pub(crate) mod rate_limit;
pub mod resolver;
pub mod types;

pub use aggregate::aggregate;
pub use error::{DiscoveryError, ProviderError};
pub use grid::Grid;
pub use language::resolve_language;
pub use orchestrator::{DiscoverySettings, RangeDiscovery};
pub use provider::google::{GoogleAddressProvider, GoogleGeocodingClient};
pub use provider::here::HereAddressProvider;
pub use provider::{AddressProvider, ClientSettings, Coverage, ProviderBatch, SweepMode};
pub use rate_limit::RequestGate;
pub use resolver::PlaceResolver;
pub use types::{
    AddressCandidate, AddressComponent, DiscoveryReport, GeocodedPlace, Location, RawCandidate,
    RequestContext, ResolvedPlace,
};
