//! Integration tests for `NominatimGeocoder` using wiremock HTTP mocks.

use dinercadeau_core::GeocodeSettings;
use dinercadeau_geocode::{GeocodeError, NominatimGeocoder};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_geocoder(server: &MockServer) -> NominatimGeocoder {
    let settings = GeocodeSettings {
        provider_url: format!("{}/search", server.uri()),
        email: Some("ops@example.nl".to_string()),
        timeout_secs: 5,
        pause_seconds: 0.0,
        ..GeocodeSettings::default()
    };
    NominatimGeocoder::new(&settings).expect("client construction should not fail")
}

#[tokio::test]
async fn geocode_returns_first_match() {
    let server = MockServer::start().await;

    let body = serde_json::json!([
        {
            "place_id": 1,
            "lat": "52.0912",
            "lon": "5.1201",
            "display_name": "Oudegracht 12, Utrecht, Nederland",
            "category": "building"
        },
        {
            "place_id": 2,
            "lat": "50.0",
            "lon": "4.0",
            "display_name": "Elsewhere"
        }
    ]);

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("format", "jsonv2"))
        .and(query_param("q", "Oudegracht 12, Utrecht, Netherlands"))
        .and(query_param("limit", "1"))
        .and(query_param("email", "ops@example.nl"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let geocoder = test_geocoder(&server);
    let result = geocoder
        .geocode("Oudegracht 12, Utrecht, Netherlands")
        .await
        .expect("should parse response")
        .expect("should find a match");

    assert_eq!(result.latitude, 52.0912);
    assert_eq!(result.longitude, 5.1201);
    assert_eq!(result.address, "Oudegracht 12, Utrecht, Nederland");
}

#[tokio::test]
async fn geocode_returns_none_for_empty_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let geocoder = test_geocoder(&server);
    let result = geocoder.geocode("Nergenshuizen").await;
    assert!(
        matches!(result, Ok(None)),
        "expected Ok(None), got: {result:?}"
    );
}

#[tokio::test]
async fn geocode_maps_server_error_to_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let geocoder = test_geocoder(&server);
    let result = geocoder.geocode("Utrecht").await;
    assert!(
        matches!(result, Err(GeocodeError::UnexpectedStatus { status: 503, .. })),
        "expected UnexpectedStatus, got: {result:?}"
    );
}

#[tokio::test]
async fn geocode_reports_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
        .mount(&server)
        .await;

    let geocoder = test_geocoder(&server);
    let result = geocoder.geocode("Utrecht").await;
    assert!(
        matches!(result, Err(GeocodeError::Deserialize { .. })),
        "expected Deserialize, got: {result:?}"
    );
}
