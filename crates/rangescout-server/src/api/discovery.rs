//! `POST /api/v1/addresses/in-range`.

use axum::{extract::State, Extension, Json};
use rangescout_core::{CountryCode, Language, ProviderKind};
use rangescout_discovery::{DiscoveryError, DiscoveryReport, Location, RequestContext};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct InRangeRequest {
    pub provider: String,
    pub location: Location,
    pub radius_meters: u32,
    #[serde(default)]
    pub allowed_countries: Vec<String>,
    pub language: Option<String>,
}

fn validation_error(req_id: &str, message: impl Into<String>) -> ApiError {
    ApiError::new(req_id, "validation_error", message)
}

fn build_context(req_id: &str, body: InRangeRequest) -> Result<RequestContext, ApiError> {
    let provider: ProviderKind = body
        .provider
        .parse()
        .map_err(|_| validation_error(req_id, format!("unknown provider '{}'", body.provider)))?;

    let countries = body
        .allowed_countries
        .iter()
        .map(|raw| CountryCode::new(raw).map_err(|e| validation_error(req_id, e.to_string())))
        .collect::<Result<Vec<_>, _>>()?;

    let language = body
        .language
        .as_deref()
        .map(str::parse::<Language>)
        .transpose()
        .map_err(|e| validation_error(req_id, e.to_string()))?;

    let ctx = RequestContext::new(provider, body.location, body.radius_meters)
        .map_err(|e| map_discovery_error(req_id, &e))?
        .with_allowed_countries(countries)
        .with_language_override(language);
    Ok(ctx)
}

fn map_discovery_error(req_id: &str, error: &DiscoveryError) -> ApiError {
    let code = match error {
        DiscoveryError::InvalidRequest(_) => "validation_error",
        DiscoveryError::PlaceNotFound { .. } => "place_not_found",
        DiscoveryError::NoCoverage { .. } => "no_coverage",
        DiscoveryError::ProviderUnavailable(_) => "provider_unavailable",
        DiscoveryError::Cancelled => "cancelled",
    };
    ApiError::new(req_id, code, error.to_string())
}

/// POST /api/v1/addresses/in-range: sweep the disc around a location.
///
/// Bad input and oversized radii answer `validation_error`, an unresolvable
/// source `place_not_found`, a radius too small for the provider's lattice
/// `no_coverage`, an unregistered provider `provider_unavailable` and an
/// elapsed sweep deadline `cancelled`.
pub(super) async fn addresses_in_range(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<InRangeRequest>,
) -> Result<Json<ApiResponse<DiscoveryReport>>, ApiError> {
    let rid = &req_id.0;
    let ctx = build_context(rid, body)?;

    let report = state.discovery.discover(&ctx).await.map_err(|e| {
        tracing::info!(request_id = %rid, provider = %ctx.provider(), error = %e, "range discovery rejected");
        map_discovery_error(rid, &e)
    })?;

    Ok(Json(ApiResponse {
        data: report,
        meta: ResponseMeta::new(req_id.0),
    }))
}
