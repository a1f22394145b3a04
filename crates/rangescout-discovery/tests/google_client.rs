//! Integration tests for the Google geocoding client using wiremock HTTP mocks.

use std::collections::BTreeSet;
use std::sync::Arc;

use rangescout_core::{Coordinates, CountryCode, Language};
use rangescout_discovery::{
    AddressProvider, ClientSettings, GoogleAddressProvider, GoogleGeocodingClient, Location,
    PlaceResolver, ProviderError,
};
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(max_retries: u32) -> ClientSettings {
    ClientSettings {
        timeout_secs: 5,
        user_agent: "rangescout-test".to_string(),
        max_retries,
        backoff_base_ms: 0,
    }
}

fn test_client(base_url: &str, max_retries: u32) -> Arc<GoogleGeocodingClient> {
    Arc::new(
        GoogleGeocodingClient::with_base_url("test-key", &settings(max_retries), base_url)
            .expect("client construction should not fail"),
    )
}

fn berlin() -> Coordinates {
    Coordinates::new(52.52, 13.405).unwrap()
}

fn countries(codes: &[&str]) -> BTreeSet<CountryCode> {
    codes.iter().map(|c| CountryCode::new(c).unwrap()).collect()
}

fn geocode_result(formatted: &str, lat: f64, lng: f64, country: (&str, &str)) -> serde_json::Value {
    serde_json::json!({
        "formatted_address": formatted,
        "geometry": {"location": {"lat": lat, "lng": lng}, "location_type": "ROOFTOP"},
        "address_components": [
            {"long_name": "1", "short_name": "1", "types": ["street_number"]},
            {"long_name": "Unter den Linden", "short_name": "Unter den Linden", "types": ["route"]},
            {"long_name": "Berlin", "short_name": "Berlin", "types": ["locality", "political"]},
            {"long_name": "10117", "short_name": "10117", "types": ["postal_code"]},
            {"long_name": country.0, "short_name": country.1, "types": ["country", "political"]}
        ],
        "place_id": "ChIJ-test",
        "types": ["street_address"]
    })
}

#[tokio::test]
async fn fetch_reverse_geocodes_the_grid_point() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "status": "OK",
        "results": [geocode_result(
            "Unter den Linden 1, 10117 Berlin, Germany",
            52.5175,
            13.3990,
            ("Germany", "DE"),
        )]
    });

    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .and(query_param("latlng", "52.52,13.405"))
        .and(query_param("result_type", "street_address|premise"))
        .and(query_param("language", "de"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GoogleAddressProvider::new(test_client(&server.uri(), 0));
    let batch = provider
        .fetch(berlin(), 100, Language::De)
        .await
        .expect("fetch should succeed");

    assert_eq!(batch.upstream_calls, 1);
    assert_eq!(batch.candidates.len(), 1);
    let candidate = &batch.candidates[0];
    assert_eq!(candidate.full_address, "Unter den Linden 1, 10117 Berlin");
    assert_eq!(candidate.street_name.as_deref(), Some("Unter den Linden"));
    assert_eq!(candidate.street_number.as_deref(), Some("1"));
    assert_eq!(candidate.postal_code.as_deref(), Some("10117"));
    assert_eq!(candidate.locality.as_deref(), Some("Berlin"));
    assert_eq!(candidate.country.as_deref(), Some("Germany"));
    assert!((candidate.location.lat - 52.5175).abs() < 1e-9);
}

#[tokio::test]
async fn fetch_skips_results_without_geometry() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "status": "OK",
        "results": [
            {"formatted_address": "Nowhere 1", "address_components": []},
            geocode_result("Unter den Linden 3, 10117 Berlin, Germany", 52.5176, 13.3992, ("Germany", "DE"))
        ]
    });

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let provider = GoogleAddressProvider::new(test_client(&server.uri(), 0));
    let batch = provider.fetch(berlin(), 100, Language::De).await.unwrap();

    assert_eq!(batch.candidates.len(), 1);
    assert_eq!(batch.candidates[0].full_address, "Unter den Linden 3, 10117 Berlin");
}

#[tokio::test]
async fn fetch_zero_results_is_an_empty_batch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"status": "ZERO_RESULTS", "results": []})),
        )
        .mount(&server)
        .await;

    let provider = GoogleAddressProvider::new(test_client(&server.uri(), 0));
    let batch = provider.fetch(berlin(), 100, Language::En).await.unwrap();

    assert!(batch.candidates.is_empty());
    assert_eq!(batch.upstream_calls, 1);
}

#[tokio::test]
async fn fetch_surfaces_request_denied_without_retrying() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid.",
            "results": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GoogleAddressProvider::new(test_client(&server.uri(), 2));
    let err = provider.fetch(berlin(), 100, Language::De).await.unwrap_err();

    match err {
        ProviderError::Api {
            status, message, ..
        } => {
            assert_eq!(status, "REQUEST_DENIED");
            assert_eq!(message, "The provided API key is invalid.");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn fetch_retries_after_rate_limit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "OK",
            "results": [geocode_result("Unter den Linden 1, 10117 Berlin, Germany", 52.5175, 13.3990, ("Germany", "DE"))]
        })))
        .mount(&server)
        .await;

    let provider = GoogleAddressProvider::new(test_client(&server.uri(), 2));
    let batch = provider.fetch(berlin(), 100, Language::De).await.unwrap();

    assert_eq!(batch.candidates.len(), 1);
}

#[tokio::test]
async fn fetch_gives_up_on_persistent_server_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let provider = GoogleAddressProvider::new(test_client(&server.uri(), 2));
    let err = provider.fetch(berlin(), 100, Language::De).await.unwrap_err();

    assert!(
        matches!(err, ProviderError::UnexpectedStatus { status: 503, .. }),
        "expected UnexpectedStatus(503), got {err:?}"
    );
}

#[tokio::test]
async fn resolve_forward_geocodes_address_with_country_filter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .and(query_param("address", "Unter den Linden 1, Berlin"))
        .and(query_param("components", "country:AT|country:DE"))
        .and(query_param_is_missing("language"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "OK",
            "results": [geocode_result("Unter den Linden 1, 10117 Berlin, Germany", 52.5175, 13.3990, ("Germany", "DE"))]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 0);
    let place = client
        .resolve(
            &Location::Address("Unter den Linden 1, Berlin".to_string()),
            &countries(&["de", "at"]),
            None,
        )
        .await
        .unwrap()
        .expect("place should resolve");

    assert_eq!(
        place.formatted_address.as_deref(),
        Some("Unter den Linden 1, 10117 Berlin, Germany")
    );
    assert_eq!(place.components.len(), 5);
    assert!(place.coordinates.is_some());
}

#[tokio::test]
async fn resolve_coordinates_picks_first_result_in_allowed_country() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("latlng", "52.52,13.405"))
        .and(query_param("language", "en"))
        .and(query_param_is_missing("result_type"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "OK",
            "results": [
                geocode_result("ul. Graniczna 1, Słubice, Poland", 52.35, 14.56, ("Poland", "PL")),
                geocode_result("Unter den Linden 1, 10117 Berlin, Germany", 52.5175, 13.3990, ("Germany", "DE"))
            ]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 0);
    let place = client
        .resolve(
            &Location::Coordinates(berlin()),
            &countries(&["de"]),
            Some(Language::En),
        )
        .await
        .unwrap()
        .expect("German result should be chosen");

    assert_eq!(
        place.formatted_address.as_deref(),
        Some("Unter den Linden 1, 10117 Berlin, Germany")
    );
}

#[tokio::test]
async fn resolve_returns_none_when_nothing_matches() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "OK",
            "results": [geocode_result("ul. Graniczna 1, Słubice, Poland", 52.35, 14.56, ("Poland", "PL"))]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 0);
    let place = client
        .resolve(
            &Location::Address("Graniczna 1".to_string()),
            &countries(&["de"]),
            None,
        )
        .await
        .unwrap();

    assert!(place.is_none());
}

#[test]
fn invalid_base_url_is_rejected() {
    let result = GoogleGeocodingClient::with_base_url("k", &settings(0), "::not a url::");
    assert!(matches!(result, Err(ProviderError::InvalidBaseUrl { .. })));
}
