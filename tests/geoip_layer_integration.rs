//! Integration tests for the GeoIP middleware
//!
//! Runs the layer inside an axum Router, both in-process and over a real
//! TCP listener.

use axum::{
    body::Body,
    extract::{connect_info::MockConnectInfo, Extension},
    http::{HeaderValue, Request, StatusCode},
    Router,
};
use geoip_headers::{
    resolve_client_ip, AddressFormatError, ClientGeo, DashMapGeoLookup, GeoEnrichmentService,
    GeoHeaderNames, GeoIpLayer, GeoLookup, GeoRecord, LookupError,
};
use http_body_util::BodyExt;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tower::ServiceExt;

const GEO_HEADERS: [&str; 7] = [
    "x-geoip-country-code",
    "x-geoip-country-eu",
    "x-geoip-country-name",
    "x-geoip-city-name",
    "x-geoip-location-lat",
    "x-geoip-location-lon",
    "x-geoip-location-tz",
];

fn paris() -> GeoRecord {
    let mut record = GeoRecord::default();
    record.country.iso_code = Some("FR".to_string());
    record.country.is_in_european_union = Some(true);
    record.country.names = HashMap::from([("en".to_string(), "France".to_string())]);
    record.city.names = HashMap::from([("en".to_string(), "Paris".to_string())]);
    record.location.latitude = Some(48.8566);
    record.location.longitude = Some(2.3522);
    record.location.time_zone = Some("Europe/Paris".to_string());
    record
}

fn service(lookup: impl GeoLookup + 'static, trust_forwarded_for: bool) -> Arc<GeoEnrichmentService> {
    Arc::new(GeoEnrichmentService::new(
        Arc::new(lookup),
        GeoHeaderNames::default(),
        trust_forwarded_for,
    ))
}

async fn whoami(geo: Option<Extension<ClientGeo>>) -> String {
    match geo {
        Some(Extension(geo)) => geo.ip.to_string(),
        None => "unknown".to_string(),
    }
}

fn app(service: Arc<GeoEnrichmentService>, peer: SocketAddr) -> Router {
    Router::new()
        .fallback(whoami)
        .layer(GeoIpLayer::new(service))
        .layer(MockConnectInfo(peer))
}

async fn body_string(body: Body) -> String {
    let bytes = body.collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Strict resolution uses the connection address
#[tokio::test]
async fn test_strict_resolution_from_remote_addr() {
    let client = IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7));
    let lookup = DashMapGeoLookup::new();
    lookup.insert(client, paris());

    let response = app(service(lookup, false), SocketAddr::new(client, 54321))
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-geoip-country-code"], "FR");
    assert_eq!(response.headers()["x-geoip-country-eu"], "true");
    assert_eq!(response.headers()["x-geoip-country-name"], "France");
    assert_eq!(response.headers()["x-geoip-city-name"], "Paris");
    assert_eq!(response.headers()["x-geoip-location-lat"], "48.856600");
    assert_eq!(response.headers()["x-geoip-location-lon"], "2.352200");
    assert_eq!(response.headers()["x-geoip-location-tz"], "Europe/Paris");
    assert_eq!(body_string(response.into_body()).await, "203.0.113.7");
}

/// Strict mode is not fooled by a forged X-Forwarded-For
#[tokio::test]
async fn test_strict_resolution_ignores_forged_header() {
    let forged = IpAddr::V4(Ipv4Addr::new(198, 51, 100, 9));
    let lookup = DashMapGeoLookup::new();
    lookup.insert(forged, paris());

    let peer = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 50)), 1234);
    let request = Request::builder()
        .uri("/")
        .header("X-Forwarded-For", "198.51.100.9, 10.0.0.1")
        .body(Body::empty())
        .unwrap();

    let response = app(service(lookup, false), peer).oneshot(request).await.unwrap();

    assert!(response.headers().get("x-geoip-country-code").is_none());
    assert_eq!(body_string(response.into_body()).await, "unknown");
}

/// Behind a trusted proxy the leftmost forwarded hop is the client
#[tokio::test]
async fn test_trusted_proxy_resolution_from_forwarded_for() {
    let client = IpAddr::V4(Ipv4Addr::new(198, 51, 100, 9));
    let lookup = DashMapGeoLookup::new();
    lookup.insert(client, paris());

    let proxy = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)), 8080);
    let request = Request::builder()
        .uri("/")
        .header("X-Forwarded-For", "198.51.100.9, 10.0.0.1")
        .body(Body::empty())
        .unwrap();

    let response = app(service(lookup, true), proxy).oneshot(request).await.unwrap();

    assert_eq!(response.headers()["x-geoip-country-code"], "FR");
    assert_eq!(body_string(response.into_body()).await, "198.51.100.9");
}

/// A lookup miss leaves the response without geo headers but still
/// reaches the handler
#[tokio::test]
async fn test_lookup_failure_still_invokes_handler() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let router = Router::new()
        .fallback(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                (StatusCode::ACCEPTED, "handled")
            }
        })
        .layer(GeoIpLayer::new(service(DashMapGeoLookup::new(), false)))
        .layer(MockConnectInfo(SocketAddr::new(
            IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)),
            80,
        )));

    let response = router
        .oneshot(Request::builder().uri("/anything").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    for name in GEO_HEADERS {
        assert!(response.headers().get(name).is_none(), "unexpected {}", name);
    }
    assert_eq!(body_string(response.into_body()).await, "handled");
}

/// The database failing outright is handled the same way as a miss
#[tokio::test]
async fn test_database_error_degrades_gracefully() {
    struct Unreadable;

    impl GeoLookup for Unreadable {
        fn lookup(&self, _ip: IpAddr) -> Result<GeoRecord, LookupError> {
            Err(LookupError::Database("invalid metadata section".to_string()))
        }
    }

    let peer = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7)), 1);
    let response = app(service(Unreadable, false), peer)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    for name in GEO_HEADERS {
        assert!(response.headers().get(name).is_none());
    }
}

/// Concurrent requests never see each other's records
#[tokio::test]
async fn test_concurrent_requests_get_their_own_records() {
    let lookup = DashMapGeoLookup::new();
    for i in 1..=32u8 {
        let mut record = GeoRecord::default();
        record.country.iso_code = Some(format!("C{}", i));
        record.location.latitude = Some(f64::from(i));
        lookup.insert(IpAddr::V4(Ipv4Addr::new(203, 0, 113, i)), record);
    }
    let service = service(lookup, false);

    let tasks: Vec<_> = (1..=32u8)
        .map(|i| {
            let router = app(
                service.clone(),
                SocketAddr::new(IpAddr::V4(Ipv4Addr::new(203, 0, 113, i)), 1000),
            );
            tokio::spawn(async move {
                let response = router
                    .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
                    .await
                    .unwrap();
                (i, response.headers().clone())
            })
        })
        .collect();

    for task in tasks {
        let (i, headers) = task.await.unwrap();
        assert_eq!(headers["x-geoip-country-code"], format!("C{}", i).as_str());
        assert_eq!(
            headers["x-geoip-location-lat"],
            format!("{}.000000", i).as_str()
        );
    }
}

/// Full round trip over a real socket
#[tokio::test]
async fn test_served_over_tcp() {
    let lookup = DashMapGeoLookup::new();
    lookup.insert(IpAddr::V4(Ipv4Addr::LOCALHOST), paris());

    let router = Router::new()
        .fallback(whoami)
        .layer(GeoIpLayer::new(service(lookup, false)));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let response = String::from_utf8_lossy(&raw).to_lowercase();

    assert!(response.starts_with("http/1.1 200"));
    assert!(response.contains("x-geoip-country-code: fr\r\n"));
    assert!(response.contains("x-geoip-location-lat: 48.856600\r\n"));
    assert!(response.ends_with("127.0.0.1"));
}

/// The resolver is usable on its own
#[test]
fn test_resolver_public_api() {
    let mut headers = axum::http::HeaderMap::new();
    headers.insert("x-forwarded-for", HeaderValue::from_static("1.2.3.4, 5.6.7.8"));

    assert_eq!(
        resolve_client_ip(Some("10.0.0.1:1"), &headers, false).unwrap(),
        IpAddr::V4(Ipv4Addr::new(1, 2, 3, 4))
    );
    assert_eq!(
        resolve_client_ip(Some("not-an-address"), &headers, true),
        Err(AddressFormatError::MissingPort("not-an-address".to_string()))
    );
}
