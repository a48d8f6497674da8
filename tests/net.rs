//! Network integration tests.
//!
//! Tests for TLS material loading and endpoint dialing.

mod common;

use common::{fixture, refused_endpoint, MockServer};
use latticectl::client::KvClient;
use latticectl::core::config::ConnectionConfig;
use latticectl::core::error::{CtlError, ExitClass};
use latticectl::net::dial::{split_endpoint, Dialer};
use latticectl::net::tls::{TlsClientBuilder, TlsIdentity, TlsInfo, TrustStore};
use std::time::Duration;

fn plain_config(endpoints: Vec<String>, dial_timeout: Duration) -> ConnectionConfig {
    ConnectionConfig::build(endpoints, dial_timeout, None, None, None).unwrap()
}

// ============================================================================
// TLS material
// ============================================================================

#[test]
fn tls_builder_without_material() {
    let config = TlsClientBuilder::new().build().unwrap();
    assert!(!config.is_mtls());
    assert!(config.server_ca.is_none());
    assert!(config.rustls_config().is_ok());
}

#[test]
fn tls_builder_with_identity_and_ca() {
    let identity = TlsIdentity::load(&fixture("client.pem"), &fixture("client-key.pem")).unwrap();
    let store = TrustStore::load(&fixture("ca.pem")).unwrap();

    let config = TlsClientBuilder::new()
        .identity(identity)
        .server_ca(store)
        .build()
        .unwrap();

    assert!(config.is_mtls());
    assert_eq!(config.server_ca.as_ref().map(|s| s.cert_count), Some(1));
}

#[test]
fn tls_info_key_without_cert() {
    let info = TlsInfo {
        key_file: Some(fixture("client-key.pem")),
        ..Default::default()
    };
    let err = info.client_config().unwrap_err();
    assert!(err.to_string().contains("without a certificate file"));
}

#[test]
fn tls_info_garbage_ca() {
    let info = TlsInfo {
        ca_file: Some(fixture("garbage.pem")),
        ..Default::default()
    };
    let err = info.client_config().unwrap_err();
    assert!(format!("{:#}", err).contains("no CERTIFICATE block"));
}

#[test]
fn tls_material_is_comparable() {
    let a = TrustStore::load(&fixture("ca.pem")).unwrap();
    let b = TrustStore::load(&fixture("ca.pem")).unwrap();
    assert_eq!(a, b);
}

// ============================================================================
// Endpoint parsing
// ============================================================================

#[test]
fn endpoint_forms() {
    let cases = [
        ("localhost:6379", "localhost:6379", "localhost"),
        ("http://10.0.0.1:6379", "10.0.0.1:6379", "10.0.0.1"),
        ("https://kv-0.local:6380/path", "kv-0.local:6380", "kv-0.local"),
        ("[fe80::1]:6379", "[fe80::1]:6379", "fe80::1"),
    ];
    for (endpoint, addr, host) in cases {
        assert_eq!(split_endpoint(endpoint).unwrap(), (addr, host), "{endpoint}");
    }
}

#[tokio::test]
async fn bare_ipv6_endpoint_is_rejected_before_dialing() {
    let config = plain_config(vec!["::1".to_string()], Duration::from_secs(2));
    let err = Dialer::new(&config)
        .unwrap()
        .dial(&config.endpoints)
        .await
        .unwrap_err();
    assert!(matches!(err, CtlError::Connection { .. }));
    assert!(err.to_string().contains("must be bracketed"), "{err}");
}

// ============================================================================
// Dialing
// ============================================================================

#[tokio::test]
async fn dial_plain_endpoint() {
    let server = MockServer::start().await;
    let config = plain_config(vec![server.endpoint()], Duration::from_secs(2));

    let conn = Dialer::new(&config)
        .unwrap()
        .dial(&config.endpoints)
        .await
        .unwrap();
    assert_eq!(conn.endpoint, server.endpoint());
    assert!(!conn.tls);
}

#[tokio::test]
async fn dial_falls_through_to_next_endpoint() {
    let server = MockServer::start().await;
    let config = plain_config(
        vec![refused_endpoint(), server.endpoint()],
        Duration::from_secs(2),
    );

    let conn = Dialer::new(&config)
        .unwrap()
        .dial(&config.endpoints)
        .await
        .unwrap();
    assert_eq!(conn.endpoint, server.endpoint());
}

#[tokio::test]
async fn dial_reports_last_failure() {
    let refused = refused_endpoint();
    let config = plain_config(vec![refused.clone()], Duration::ZERO);

    let err = Dialer::new(&config)
        .unwrap()
        .dial(&config.endpoints)
        .await
        .unwrap_err();
    assert!(matches!(err, CtlError::Connection { .. }));
    assert!(err.to_string().contains(&refused));
    assert_eq!(err.exit_class(), ExitClass::BadConnection);
}

#[tokio::test]
async fn tls_handshake_bounded_by_dial_timeout() {
    // Accepts TCP at the kernel level but never answers the ClientHello.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = listener.local_addr().unwrap().to_string();

    let ca = fixture("ca.pem");
    let config = ConnectionConfig::build(
        vec![endpoint.clone()],
        Duration::from_millis(200),
        None,
        None,
        Some(&ca),
    )
    .unwrap();

    let err = Dialer::new(&config)
        .unwrap()
        .dial_endpoint(&endpoint)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("dial timeout"), "{err}");
    drop(listener);
}

#[tokio::test]
async fn tls_against_plain_server_fails() {
    let server = MockServer::start().await;
    let ca = fixture("ca.pem");
    let config = ConnectionConfig::build(
        vec![server.endpoint()],
        Duration::from_secs(2),
        None,
        None,
        Some(&ca),
    )
    .unwrap();

    let err = Dialer::new(&config)
        .unwrap()
        .dial(&config.endpoints)
        .await
        .unwrap_err();
    assert!(matches!(err, CtlError::Connection { .. }));
}

// ============================================================================
// TLS handshakes
// ============================================================================

fn mtls_config(endpoints: Vec<String>) -> ConnectionConfig {
    let cert = fixture("client.pem");
    let key = fixture("client-key.pem");
    let ca = fixture("ca.pem");
    ConnectionConfig::build(
        endpoints,
        Duration::from_secs(2),
        Some(&cert),
        Some(&key),
        Some(&ca),
    )
    .unwrap()
}

#[tokio::test]
async fn mtls_handshake_by_host_name() {
    let server = MockServer::start_tls().await;
    let config = mtls_config(vec![server.localhost_endpoint()]);

    let conn = Dialer::new(&config)
        .unwrap()
        .dial(&config.endpoints)
        .await
        .unwrap();
    assert!(conn.tls);

    let mut client = KvClient::from_connection(conn);
    client.ping().await.unwrap();
}

#[tokio::test]
async fn mtls_handshake_by_ip_and_scheme() {
    let server = MockServer::start_tls().await;

    for endpoint in [
        server.endpoint(),
        format!("https://{}", server.localhost_endpoint()),
    ] {
        let config = mtls_config(vec![endpoint.clone()]);
        let mut client = KvClient::connect(&config).await.unwrap();
        client.put(b"k", endpoint.as_bytes()).await.unwrap();
        assert_eq!(
            client.get(b"k").await.unwrap().as_deref(),
            Some(endpoint.as_bytes())
        );
    }
}

#[tokio::test]
async fn server_requires_client_certificate() {
    let server = MockServer::start_tls().await;
    let ca = fixture("ca.pem");
    let config = ConnectionConfig::build(
        vec![server.localhost_endpoint()],
        Duration::from_secs(2),
        None,
        None,
        Some(&ca),
    )
    .unwrap();

    // TLS 1.3 reports the missing certificate after the client side of
    // the handshake, so the failure shows up on the first request at the
    // latest.
    let outcome = match KvClient::connect(&config).await {
        Ok(mut client) => client.ping().await,
        Err(err) => Err(err),
    };
    assert!(outcome.is_err());
    assert!(server.value("k").is_none());
}

#[tokio::test]
async fn private_server_untrusted_without_ca() {
    let server = MockServer::start_tls().await;
    let cert = fixture("client.pem");
    let key = fixture("client-key.pem");
    let config = ConnectionConfig::build(
        vec![server.localhost_endpoint()],
        Duration::from_secs(2),
        Some(&cert),
        Some(&key),
        None,
    )
    .unwrap();

    let err = Dialer::new(&config)
        .unwrap()
        .dial(&config.endpoints)
        .await
        .unwrap_err();
    assert!(matches!(err, CtlError::Connection { .. }));
    assert!(err.to_string().contains("tls handshake"), "{err}");
}
