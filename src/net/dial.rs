//! Endpoint dialing.
//!
//! Opens a TCP connection to the first reachable endpoint, wrapping it in
//! TLS when the connection configuration carries TLS material. The dial
//! timeout bounds connect and handshake together.

use crate::core::config::ConnectionConfig;
use crate::core::error::{ConfigError, CtlError, CtlResult};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::ClientConfig;
use tokio_rustls::TlsConnector;

/// Byte stream a client can speak over, plain or TLS.
pub trait AsyncStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> AsyncStream for T {}

/// An established connection to one endpoint.
pub struct Connection {
    /// Endpoint as given in the configuration.
    pub endpoint: String,
    /// Whether the stream is TLS-wrapped.
    pub tls: bool,
    /// Time spent connecting (and handshaking).
    pub took: Duration,
    stream: Box<dyn AsyncStream>,
}

impl Connection {
    /// Take the underlying stream.
    pub fn into_stream(self) -> Box<dyn AsyncStream> {
        self.stream
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("endpoint", &self.endpoint)
            .field("tls", &self.tls)
            .field("took", &self.took)
            .finish()
    }
}

/// Dials endpoints according to a connection configuration.
pub struct Dialer {
    dial_timeout: Duration,
    tls: Option<Arc<ClientConfig>>,
}

impl Dialer {
    /// Create a dialer for the given configuration.
    pub fn new(config: &ConnectionConfig) -> CtlResult<Self> {
        let tls = match &config.tls {
            Some(tls) => Some(
                tls.config
                    .rustls_config()
                    .map_err(|e| CtlError::Config(ConfigError::tls_setup(e)))?,
            ),
            None => None,
        };

        Ok(Self {
            dial_timeout: config.dial_timeout,
            tls,
        })
    }

    /// Dial endpoints in order and return the first connection that succeeds.
    pub async fn dial(&self, endpoints: &[String]) -> CtlResult<Connection> {
        let mut last_error = None;

        for endpoint in endpoints {
            match self.dial_endpoint(endpoint).await {
                Ok(conn) => return Ok(conn),
                Err(err) => {
                    tracing::debug!(endpoint = %endpoint, error = %err, "dial failed");
                    last_error = Some(err);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CtlError::connection("no endpoints configured")))
    }

    /// Dial a single endpoint.
    pub async fn dial_endpoint(&self, endpoint: &str) -> CtlResult<Connection> {
        let started = Instant::now();
        let connect = self.connect(endpoint);

        let stream = if self.dial_timeout.is_zero() {
            connect.await?
        } else {
            tokio::time::timeout(self.dial_timeout, connect)
                .await
                .map_err(|_| {
                    CtlError::connection(format!(
                        "{}: dial timeout after {:?}",
                        endpoint, self.dial_timeout
                    ))
                })??
        };

        let took = started.elapsed();
        tracing::debug!(endpoint = %endpoint, tls = self.tls.is_some(), took_ms = took.as_millis() as u64, "connected");

        Ok(Connection {
            endpoint: endpoint.to_string(),
            tls: self.tls.is_some(),
            took,
            stream,
        })
    }

    async fn connect(&self, endpoint: &str) -> CtlResult<Box<dyn AsyncStream>> {
        let (addr, host) = split_endpoint(endpoint)?;

        let tcp = TcpStream::connect(addr)
            .await
            .map_err(|e| CtlError::connection(format!("{}: {}", endpoint, e)))?;
        tcp.set_nodelay(true)?;

        let Some(ref tls) = self.tls else {
            return Ok(Box::new(tcp));
        };

        let server_name = ServerName::try_from(host.to_string()).map_err(|e| {
            CtlError::connection(format!("{}: invalid server name {:?}: {}", endpoint, host, e))
        })?;
        let stream = TlsConnector::from(Arc::clone(tls))
            .connect(server_name, tcp)
            .await
            .map_err(|e| CtlError::connection(format!("{}: tls handshake: {}", endpoint, e)))?;

        Ok(Box::new(stream))
    }
}

/// Split an endpoint into its dial address and host name.
///
/// A leading `http://`, `https://` or `tcp://` scheme and any trailing path
/// are dropped. IPv6 hosts must be bracketed; the brackets are removed from
/// the returned host.
pub fn split_endpoint(endpoint: &str) -> CtlResult<(&str, &str)> {
    let addr = endpoint
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(endpoint);
    let addr = addr.split('/').next().unwrap_or(addr);

    if !addr.starts_with('[') && addr.matches(':').count() > 1 {
        return Err(CtlError::connection(format!(
            "{}: IPv6 addresses must be bracketed, e.g. [::1]:6379",
            endpoint
        )));
    }

    let host = match addr.rfind(':') {
        Some(pos) if !addr.ends_with(']') => &addr[..pos],
        _ => addr,
    };
    let host = host.trim_start_matches('[').trim_end_matches(']');

    Ok((addr, host))
}
