//! Common test utilities.
//!
//! This module contains shared helpers for integration tests.
//! Import with `mod common;` in test files.

#![allow(dead_code)]

use latticectl::client::resp::{ParseResult, RespParser, RespValue};
use std::collections::HashMap;
use std::io::Write;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer};
use tokio_rustls::rustls::server::WebPkiClientVerifier;
use tokio_rustls::rustls::{crypto, RootCertStore, ServerConfig};
use tokio_rustls::TlsAcceptor;

type Store = Arc<Mutex<HashMap<Vec<u8>, Vec<u8>>>>;

/// Absolute path of a PEM fixture under `tests/fixtures`.
pub fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

/// Write a profile file with the given TOML content.
pub fn create_profile(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write profile");
    file
}

/// An address nothing listens on.
pub fn refused_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    addr.to_string()
}

fn load_certs(name: &str) -> Vec<CertificateDer<'static>> {
    let pem = std::fs::read(fixture(name)).expect("read cert fixture");
    rustls_pemfile::certs(&mut &pem[..])
        .collect::<Result<Vec<_>, _>>()
        .expect("parse cert fixture")
}

fn load_key(name: &str) -> PrivateKeyDer<'static> {
    let pem = std::fs::read(fixture(name)).expect("read key fixture");
    rustls_pemfile::private_key(&mut &pem[..])
        .expect("parse key fixture")
        .expect("key fixture holds a private key")
}

/// Server side TLS: `server.pem` for `localhost`/127.0.0.1, and client
/// certificates must chain to `ca.pem`.
pub fn server_tls_acceptor() -> TlsAcceptor {
    let provider = Arc::new(crypto::ring::default_provider());

    let mut client_roots = RootCertStore::empty();
    for cert in load_certs("ca.pem") {
        client_roots.add(cert).expect("add CA");
    }
    let verifier =
        WebPkiClientVerifier::builder_with_provider(Arc::new(client_roots), Arc::clone(&provider))
            .build()
            .expect("client verifier");

    let config = ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .expect("protocol versions")
        .with_client_cert_verifier(verifier)
        .with_single_cert(load_certs("server.pem"), load_key("server-key.pem"))
        .expect("server cert");

    TlsAcceptor::from(Arc::new(config))
}

/// In-process server speaking enough RESP2 for the client.
pub struct MockServer {
    pub addr: SocketAddr,
    pub store: Store,
}

impl MockServer {
    /// Bind to an ephemeral port and start serving plain TCP.
    pub async fn start() -> Self {
        Self::spawn(None).await
    }

    /// Like `start`, but every connection must complete a mutual TLS
    /// handshake first.
    pub async fn start_tls() -> Self {
        Self::spawn(Some(server_tls_acceptor())).await
    }

    async fn spawn(acceptor: Option<TlsAcceptor>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let store: Store = Arc::new(Mutex::new(HashMap::new()));

        let shared = Arc::clone(&store);
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let store = Arc::clone(&shared);
                match acceptor.clone() {
                    None => {
                        tokio::spawn(serve(socket, store));
                    }
                    Some(acceptor) => {
                        tokio::spawn(async move {
                            if let Ok(stream) = acceptor.accept(socket).await {
                                serve(stream, store).await;
                            }
                        });
                    }
                }
            }
        });

        Self { addr, store }
    }

    pub fn endpoint(&self) -> String {
        self.addr.to_string()
    }

    /// Endpoint naming the server by host name rather than IP.
    pub fn localhost_endpoint(&self) -> String {
        format!("localhost:{}", self.addr.port())
    }

    pub fn value(&self, key: &str) -> Option<Vec<u8>> {
        self.store.lock().unwrap().get(key.as_bytes()).cloned()
    }

    pub fn insert(&self, key: &str, value: &[u8]) {
        self.store
            .lock()
            .unwrap()
            .insert(key.as_bytes().to_vec(), value.to_vec());
    }
}

async fn serve<S>(mut socket: S, store: Store)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut parser = RespParser::new();
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let (result, consumed) = parser.parse(&buf);
        match result {
            ParseResult::Ok(RespValue::Array(items)) => {
                buf.drain(..consumed);
                let args: Vec<Vec<u8>> = items
                    .into_iter()
                    .filter_map(|item| match item {
                        RespValue::BulkString(b) => Some(b.to_vec()),
                        _ => None,
                    })
                    .collect();
                let reply = handle(&args, &store);
                if socket.write_all(&reply).await.is_err() || socket.flush().await.is_err() {
                    return;
                }
            }
            ParseResult::Incomplete => match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => return,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
            },
            _ => return,
        }
    }
}

fn handle(args: &[Vec<u8>], store: &Mutex<HashMap<Vec<u8>, Vec<u8>>>) -> Vec<u8> {
    let mut store = store.lock().unwrap();
    match args {
        [cmd] if cmd.as_slice() == b"PING" => b"+PONG\r\n".to_vec(),
        [cmd, key, value] if cmd.as_slice() == b"SET" => {
            store.insert(key.clone(), value.clone());
            b"+OK\r\n".to_vec()
        }
        [cmd, key] if cmd.as_slice() == b"GET" => match store.get(key) {
            Some(value) => {
                let mut out = format!("${}\r\n", value.len()).into_bytes();
                out.extend_from_slice(value);
                out.extend_from_slice(b"\r\n");
                out
            }
            None => b"$-1\r\n".to_vec(),
        },
        [cmd, key] if cmd.as_slice() == b"DEL" => {
            let removed = store.remove(key).is_some() as i64;
            format!(":{}\r\n", removed).into_bytes()
        }
        _ => b"-ERR unknown command\r\n".to_vec(),
    }
}
