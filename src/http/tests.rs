//! Tests for the HTTP client module

use super::*;
use crate::auth::LoginScheme;
use crate::config::UnifiConfig;
use crate::error::Error;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DEVICES: &str = "/proxy/network/api/s/default/stat/device";

fn config_for(server: &MockServer) -> UnifiConfig {
    UnifiConfig::builder()
        .base_url(server.uri())
        .credentials("admin", "secret")
        .timeout(Duration::from_secs(5))
        .build()
}

fn client_for(server: &MockServer) -> UnifiClient {
    UnifiClient::new(&config_for(server)).unwrap()
}

async fn mount_unifi_os_login(server: &MockServer, csrf: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-csrf-token", csrf)
                .insert_header("set-cookie", "TOKEN=session-jwt; Path=/; HttpOnly"),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[test]
fn test_client_builds_without_network() {
    let config = UnifiConfig::builder().host("10.0.0.1").port(8443).build();
    let client = UnifiClient::new(&config).unwrap();
    assert_eq!(client.base_url(), "https://10.0.0.1:8443/");
    assert_eq!(client.rate_limiter().config().max_requests, 100);
}

#[tokio::test]
async fn test_get_logs_in_first_and_sends_csrf() {
    let server = MockServer::start().await;
    mount_unifi_os_login(&server, "abc123", 1).await;

    Mock::given(method("GET"))
        .and(path("/resource"))
        .and(header("X-CSRF-Token", "abc123"))
        .and(header("cookie", "TOKEN=session-jwt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": 1}]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(!client.is_authenticated().await);

    let body = client.get("/resource").await.unwrap();

    assert_eq!(body, json!({"data": [{"id": 1}]}));
    assert!(client.is_authenticated().await);
    assert_eq!(client.session().await.scheme(), Some(LoginScheme::UnifiOs));
}

#[tokio::test]
async fn test_login_happens_once_for_many_requests() {
    let server = MockServer::start().await;
    mount_unifi_os_login(&server, "abc123", 1).await;

    Mock::given(method("GET"))
        .and(path(DEVICES))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(3)
        .mount(&server)
        .await;

    let client = client_for(&server);
    for _ in 0..3 {
        client.get(DEVICES).await.unwrap();
    }
}

#[tokio::test]
async fn test_post_and_put_send_json_body() {
    let server = MockServer::start().await;
    mount_unifi_os_login(&server, "tok", 1).await;

    Mock::given(method("POST"))
        .and(path("/proxy/network/api/s/default/rest/firewallrule"))
        .and(body_json(json!({"name": "block"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"_id": "r1"}]})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/proxy/network/api/s/default/rest/firewallrule/r1"))
        .and(body_json(json!({"enabled": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let created = client
        .post(
            "/proxy/network/api/s/default/rest/firewallrule",
            &json!({"name": "block"}),
        )
        .await
        .unwrap();
    assert_eq!(created["data"][0]["_id"], "r1");

    client
        .put(
            "/proxy/network/api/s/default/rest/firewallrule/r1",
            &json!({"enabled": false}),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_with_empty_body_returns_null() {
    let server = MockServer::start().await;
    mount_unifi_os_login(&server, "tok", 1).await;

    Mock::given(method("DELETE"))
        .and(path("/proxy/network/api/s/default/rest/portforward/p1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let body = client
        .delete("/proxy/network/api/s/default/rest/portforward/p1")
        .await
        .unwrap();
    assert_eq!(body, serde_json::Value::Null);
}

#[tokio::test]
async fn test_legacy_fallback_then_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).insert_header("set-cookie", "unifises=s1; Path=/"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(DEVICES))
        .and(header("cookie", "unifises=s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.get(DEVICES).await.unwrap();
    assert_eq!(client.session().await.scheme(), Some(LoginScheme::Legacy));
}

#[tokio::test]
async fn test_authentication_failure_sends_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid credentials"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(DEVICES))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.get(DEVICES).await.unwrap_err();

    assert!(matches!(err, Error::Authentication { .. }));
    assert!(err.to_string().contains("invalid credentials"));
    assert!(!client.is_authenticated().await);
}

#[tokio::test]
async fn test_401_reauthenticates_and_retries_once() {
    let server = MockServer::start().await;
    mount_unifi_os_login(&server, "abc123", 2).await;

    Mock::given(method("GET"))
        .and(path("/resource"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/resource"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": ["ok"]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let body = client.get("/resource").await.unwrap();

    assert_eq!(body, json!({"data": ["ok"]}));
    assert!(client.is_authenticated().await);
}

#[tokio::test]
async fn test_second_401_is_surfaced_without_more_retries() {
    let server = MockServer::start().await;
    mount_unifi_os_login(&server, "abc123", 2).await;

    Mock::given(method("GET"))
        .and(path("/resource"))
        .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.get("/resource").await.unwrap_err();

    assert!(err.is_unauthorized());
    assert!(matches!(err, Error::HttpStatus { status: 401, ref body } if body == "expired"));
    assert!(!client.is_authenticated().await);
}

#[tokio::test]
async fn test_non_401_error_is_not_retried() {
    let server = MockServer::start().await;
    mount_unifi_os_login(&server, "abc123", 1).await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.get("/missing").await.unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 404, .. }));
    assert!(client.is_authenticated().await);
}

#[tokio::test]
async fn test_response_cookies_replace_by_name() {
    let server = MockServer::start().await;
    mount_unifi_os_login(&server, "abc123", 1).await;

    Mock::given(method("GET"))
        .and(path("/first"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "TOKEN=rotated; Path=/")
                .set_body_json(json!({})),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/second"))
        .and(header("cookie", "TOKEN=rotated"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.get("/first").await.unwrap();
    client.get("/second").await.unwrap();

    let session = client.session().await;
    assert_eq!(session.cookies().len(), 1);
    assert_eq!(session.cookies().get("TOKEN"), Some("rotated"));
}

#[tokio::test]
async fn test_response_csrf_token_is_updated() {
    let server = MockServer::start().await;
    mount_unifi_os_login(&server, "old", 1).await;

    Mock::given(method("GET"))
        .and(path("/rotate"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-csrf-token", "new")
                .set_body_json(json!({})),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/after"))
        .and(header("X-CSRF-Token", "new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.get("/rotate").await.unwrap();
    client.get("/after").await.unwrap();
    assert_eq!(client.session().await.csrf_token(), Some("new"));
}

#[tokio::test]
async fn test_close_when_unauthenticated_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.close().await;
    client.close().await;
    assert!(!client.is_authenticated().await);
}

#[tokio::test]
async fn test_close_logs_out_once() {
    let server = MockServer::start().await;
    mount_unifi_os_login(&server, "abc123", 1).await;

    Mock::given(method("GET"))
        .and(path(DEVICES))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .and(header("X-CSRF-Token", "abc123"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.get(DEVICES).await.unwrap();

    client.close().await;
    assert!(!client.is_authenticated().await);

    client.close().await;
}

#[tokio::test]
async fn test_close_ignores_logout_failure() {
    let server = MockServer::start().await;
    mount_unifi_os_login(&server, "abc123", 1).await;

    Mock::given(method("GET"))
        .and(path(DEVICES))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.get(DEVICES).await.unwrap();
    client.close().await;
    assert!(!client.is_authenticated().await);
}

#[tokio::test]
async fn test_transport_error_is_surfaced() {
    let server = MockServer::start().await;
    let config = config_for(&server);
    drop(server);

    let client = UnifiClient::new(&config).unwrap();
    let err = client.get(DEVICES).await.unwrap_err();
    // Login cannot reach the controller either, so both schemes fail
    assert!(matches!(err, Error::Authentication { .. }));
}

#[tokio::test]
async fn test_requests_pass_through_rate_limiter() {
    let server = MockServer::start().await;
    mount_unifi_os_login(&server, "abc123", 1).await;

    Mock::given(method("GET"))
        .and(path(DEVICES))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(3)
        .mount(&server)
        .await;

    let config = UnifiConfig::builder()
        .base_url(server.uri())
        .rate_limit(RateLimiterConfig::new(10, Duration::from_secs(60)))
        .build();
    let client = UnifiClient::new(&config).unwrap();

    for _ in 0..3 {
        client.get(DEVICES).await.unwrap();
    }
    assert_eq!(client.rate_limiter().in_flight_window(), 3);
}

#[tokio::test]
async fn test_shared_client_is_built_once() {
    let server = MockServer::start().await;
    let shared = SharedClient::new(config_for(&server));

    assert!(shared.get().is_none());
    let first = shared.client().unwrap();
    let second = shared.client().unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert!(shared.get().is_some());

    // Nothing was authenticated, so close sends nothing
    shared.close().await;
}

#[test]
fn test_shared_client_reports_invalid_config() {
    let config = UnifiConfig::builder().base_url("not a url").build();
    let shared = SharedClient::new(config);
    assert!(shared.client().is_err());
    assert!(shared.get().is_none());
}
