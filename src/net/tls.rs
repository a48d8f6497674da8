//! Client TLS configuration.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Client TLS Configuration                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │   TlsInfo          - Credential file paths as provided      │
//! │   TlsIdentity      - Loaded client certificate chain + key  │
//! │   TrustStore       - Loaded CA bundle                       │
//! │   TlsClientBuilder - Assembles a TlsClientConfig            │
//! │   TlsClientConfig  - Dial-ready material, builds rustls     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Material is kept as PEM so configurations stay comparable. The rustls
//! `ClientConfig` is rebuilt from it when a connection is dialed. Without a
//! CA bundle, servers are verified against the bundled public web roots.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer};
use tokio_rustls::rustls::{crypto, ClientConfig, RootCertStore};

/// TLS credential paths supplied by the user.
///
/// Only non-empty paths are ever recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsInfo {
    /// Client certificate chain path.
    pub cert_file: Option<String>,
    /// Client private key path.
    pub key_file: Option<String>,
    /// CA bundle used to verify servers.
    pub ca_file: Option<String>,
}

impl TlsInfo {
    /// True when no credential path was recorded.
    pub fn is_empty(&self) -> bool {
        self.cert_file.is_none() && self.key_file.is_none() && self.ca_file.is_none()
    }

    /// Load the recorded files into a dial-ready client configuration.
    pub fn client_config(&self) -> Result<TlsClientConfig> {
        let mut builder = TlsClientBuilder::new();

        match (&self.cert_file, &self.key_file) {
            (Some(cert), Some(key)) => {
                builder = builder.identity(TlsIdentity::load(cert, key)?);
            }
            (Some(cert), None) => {
                anyhow::bail!("client certificate {} given without a key file", cert);
            }
            (None, Some(key)) => {
                anyhow::bail!("client key {} given without a certificate file", key);
            }
            (None, None) => {}
        }

        if let Some(ref ca_path) = self.ca_file {
            builder = builder.server_ca(TrustStore::load(ca_path)?);
        }

        builder.build()
    }
}

/// Loaded client identity (certificate chain + private key).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsIdentity {
    /// Certificate chain in PEM format.
    pub cert_chain_pem: Vec<u8>,
    /// Private key in PEM format.
    pub key_pem: Vec<u8>,
    /// Number of certificates in the chain.
    pub cert_count: usize,
}

impl TlsIdentity {
    /// Load a client identity from file paths.
    pub fn load(cert_chain_path: &str, key_path: &str) -> Result<Self> {
        let cert_chain_pem = std::fs::read(cert_chain_path)
            .with_context(|| format!("failed to read cert chain: {}", cert_chain_path))?;
        let key_pem = std::fs::read(key_path)
            .with_context(|| format!("failed to read private key: {}", key_path))?;

        let cert_count = parse_certs(&cert_chain_pem)
            .with_context(|| format!("invalid cert chain: {}", cert_chain_path))?
            .len();
        parse_key(&key_pem).with_context(|| format!("invalid private key: {}", key_path))?;

        Ok(Self {
            cert_chain_pem,
            key_pem,
            cert_count,
        })
    }
}

/// Trust store for CA certificates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustStore {
    /// CA certificates in PEM format.
    pub ca_certs_pem: Vec<u8>,
    /// Number of certificates loaded.
    pub cert_count: usize,
}

impl TrustStore {
    /// Load a trust store from a CA bundle file.
    pub fn load(ca_path: &str) -> Result<Self> {
        let ca_certs_pem = std::fs::read(ca_path)
            .with_context(|| format!("failed to read CA bundle: {}", ca_path))?;
        let cert_count = parse_certs(&ca_certs_pem)
            .with_context(|| format!("invalid CA bundle: {}", ca_path))?
            .len();

        Ok(Self {
            ca_certs_pem,
            cert_count,
        })
    }

    fn root_store(&self) -> Result<RootCertStore> {
        let mut roots = RootCertStore::empty();
        for cert in parse_certs(&self.ca_certs_pem)? {
            roots.add(cert).context("CA certificate rejected")?;
        }
        Ok(roots)
    }
}

/// Builder for TLS client configuration.
#[derive(Debug, Default)]
pub struct TlsClientBuilder {
    /// Client identity (for mTLS).
    identity: Option<TlsIdentity>,
    /// Server CA trust store.
    server_ca: Option<TrustStore>,
}

impl TlsClientBuilder {
    /// Create a new TLS client builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the client identity for mTLS.
    pub fn identity(mut self, identity: TlsIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Set the server CA trust store.
    pub fn server_ca(mut self, trust_store: TrustStore) -> Self {
        self.server_ca = Some(trust_store);
        self
    }

    /// Build the client configuration.
    ///
    /// The rustls configuration is assembled once here so that a bad
    /// certificate/key pair is reported before anything is dialed.
    pub fn build(self) -> Result<TlsClientConfig> {
        let config = TlsClientConfig {
            identity: self.identity,
            server_ca: self.server_ca,
        };
        config.rustls_config()?;
        Ok(config)
    }
}

/// Dial-ready TLS client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsClientConfig {
    /// Client identity (for mTLS).
    pub identity: Option<TlsIdentity>,
    /// Server CA trust store.
    pub server_ca: Option<TrustStore>,
}

impl TlsClientConfig {
    /// Check if a client certificate is presented.
    pub fn is_mtls(&self) -> bool {
        self.identity.is_some()
    }

    /// Roots used to verify servers.
    ///
    /// A configured CA bundle replaces the public roots entirely.
    pub fn root_store(&self) -> Result<RootCertStore> {
        match &self.server_ca {
            Some(store) => store.root_store(),
            None => Ok(public_roots()),
        }
    }

    /// Assemble the rustls client configuration.
    pub fn rustls_config(&self) -> Result<Arc<ClientConfig>> {
        let roots = self.root_store()?;

        let builder =
            ClientConfig::builder_with_provider(Arc::new(crypto::ring::default_provider()))
                .with_safe_default_protocol_versions()
                .context("no usable TLS protocol versions")?
                .with_root_certificates(roots);

        let config = match &self.identity {
            Some(identity) => {
                let certs = parse_certs(&identity.cert_chain_pem)?;
                let key = parse_key(&identity.key_pem)?;
                builder
                    .with_client_auth_cert(certs, key)
                    .context("client certificate and key do not form a usable pair")?
            }
            None => builder.with_no_client_auth(),
        };

        Ok(Arc::new(config))
    }
}

fn public_roots() -> RootCertStore {
    RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    }
}

fn parse_certs(pem: &[u8]) -> Result<Vec<CertificateDer<'static>>> {
    let certs = rustls_pemfile::certs(&mut &pem[..])
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("malformed PEM")?;
    if certs.is_empty() {
        anyhow::bail!("no CERTIFICATE block found");
    }
    Ok(certs)
}

fn parse_key(pem: &[u8]) -> Result<PrivateKeyDer<'static>> {
    rustls_pemfile::private_key(&mut &pem[..])
        .context("malformed PEM")?
        .ok_or_else(|| anyhow::anyhow!("no PRIVATE KEY block found"))
}
