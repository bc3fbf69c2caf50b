//! Integration tests for the VWorld reverse geocoder using WireMock.

use airzone_geocoder::ReverseGeocoder;
use airzone_geocoder::vworld::{GeocoderConfig, VworldGeocoder};
use airzone_source_models::Credentials;
use airzone_zone_models::CenterPoint;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn geocoder(server: &MockServer) -> VworldGeocoder {
    let config = GeocoderConfig {
        base_url: format!("{}/req/address", server.uri()),
        timeout_ms: 500,
    };
    VworldGeocoder::new(config, Credentials::new("test-key", "")).unwrap()
}

#[tokio::test]
async fn resolves_address_with_lng_lat_point() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/req/address"))
        .and(query_param("request", "getAddress"))
        .and(query_param("point", "127.1,37.5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "response": {
                "status": "OK",
                "result": [{
                    "text": "서울특별시 송파구 잠실동",
                    "structure": {"level1": "서울특별시", "level2": "송파구", "level4A": "잠실동"}
                }]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let address = geocoder(&server)
        .reverse(CenterPoint::new(37.5, 127.1))
        .await;
    assert!(address.resolved);
    assert_eq!(address.resolved_district(), Some("송파구"));
}

#[tokio::test]
async fn http_failure_degrades_to_placeholder() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let address = geocoder(&server)
        .reverse(CenterPoint::new(37.5, 127.1))
        .await;
    assert!(!address.resolved);
    assert_eq!(address.formatted, "37.500000, 127.100000");
    assert!(address.resolved_district().is_none());
}

#[tokio::test]
async fn not_found_degrades_to_placeholder() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"response": {"status": "NOT_FOUND"}})),
        )
        .mount(&server)
        .await;

    let address = geocoder(&server)
        .reverse(CenterPoint::new(37.2, 126.1))
        .await;
    assert!(!address.resolved);
}
