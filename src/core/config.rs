//! Connection configuration.
//!
//! Connection parameters come from three places, in order of precedence:
//! explicit command-line flags, an optional TOML profile, and built-in
//! defaults. `GlobalFlags::resolve` merges them, and
//! `ConnectionConfig::build` turns the result into a dial-ready
//! configuration.

use crate::core::error::ConfigError;
use crate::core::time::parse_duration;
use crate::net::tls::{TlsClientConfig, TlsInfo};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Endpoint dialed when neither flags nor profile name one.
pub const DEFAULT_ENDPOINT: &str = "127.0.0.1:6379";

/// Dial timeout used when neither flags nor profile set one.
pub const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_secs(2);

// ============================================================================
// Connection configuration
// ============================================================================

/// Validated configuration describing how to dial the cluster.
///
/// Built fresh for every invocation and owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Cluster member addresses, in dial order.
    pub endpoints: Vec<String>,
    /// Connect timeout per endpoint. Zero leaves it to the OS.
    pub dial_timeout: Duration,
    /// TLS settings, present when any credential was given.
    pub tls: Option<ClientTls>,
}

/// Derived TLS settings for a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientTls {
    /// Credential paths as recorded.
    pub info: TlsInfo,
    /// Material loaded from those paths.
    pub config: TlsClientConfig,
}

impl ConnectionConfig {
    /// Build a connection configuration.
    ///
    /// TLS is enabled as soon as any one of `cert`, `key` or `cacert` is a
    /// non-empty path. Only the paths actually given are recorded, and
    /// their files are loaded here. Empty strings count as unset; callers
    /// reject explicitly-empty flags before reaching this point (see
    /// [`CredentialTriple::from_flags`]).
    pub fn build(
        endpoints: Vec<String>,
        dial_timeout: Duration,
        cert: Option<&str>,
        key: Option<&str>,
        cacert: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let provided = |value: Option<&str>| value.filter(|v| !v.is_empty()).map(str::to_string);

        let info = TlsInfo {
            cert_file: provided(cert),
            key_file: provided(key),
            ca_file: provided(cacert),
        };

        let tls = if info.is_empty() {
            None
        } else {
            let config = info.client_config().map_err(ConfigError::tls_setup)?;
            Some(ClientTls { info, config })
        };

        tracing::debug!(
            endpoints = ?endpoints,
            dial_timeout_ms = dial_timeout.as_millis() as u64,
            tls = tls.is_some(),
            "built connection config"
        );

        Ok(Self {
            endpoints,
            dial_timeout,
            tls,
        })
    }

    /// Check if connections will use TLS.
    pub fn is_tls(&self) -> bool {
        self.tls.is_some()
    }
}

/// TLS credential paths after caller-side validation.
///
/// Each field is either unset or a non-empty path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialTriple {
    pub cert: Option<String>,
    pub key: Option<String>,
    pub cacert: Option<String>,
}

impl CredentialTriple {
    /// Validate credential values as the user supplied them.
    ///
    /// `None` means the flag was not given. `Some("")` means it was given
    /// with an empty value, which is rejected. Fields are checked in the
    /// order cert, key, cacert.
    pub fn from_flags(
        cert: Option<String>,
        key: Option<String>,
        cacert: Option<String>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            cert: non_empty("cert", cert)?,
            key: non_empty("key", key)?,
            cacert: non_empty("cacert", cacert)?,
        })
    }
}

fn non_empty(field: &'static str, value: Option<String>) -> Result<Option<String>, ConfigError> {
    match value {
        Some(v) if v.is_empty() => Err(ConfigError::EmptyCredentialValue { field }),
        other => Ok(other),
    }
}

// ============================================================================
// Global flags
// ============================================================================

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text lines.
    #[default]
    Simple,
    /// JSON objects.
    Json,
}

/// Flags shared by every command, after merging all sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalFlags {
    pub endpoints: Vec<String>,
    pub dial_timeout: Duration,
    pub tls: CredentialTriple,
    pub output_format: OutputFormat,
    pub is_hex: bool,
}

/// Values given explicitly on the command line.
///
/// `None` means the flag was absent.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub endpoints: Option<Vec<String>>,
    pub dial_timeout: Option<Duration>,
    pub cert: Option<String>,
    pub key: Option<String>,
    pub cacert: Option<String>,
    pub write_out: Option<OutputFormat>,
    pub hex: bool,
}

impl GlobalFlags {
    /// Merge command-line overrides over an optional profile and defaults.
    pub fn resolve(
        overrides: &ConfigOverrides,
        profile: Option<&Profile>,
    ) -> Result<Self, ConfigError> {
        let default_profile = Profile::default();
        let profile = profile.unwrap_or(&default_profile);
        let conn = &profile.connection;

        let endpoints = overrides
            .endpoints
            .clone()
            .or_else(|| conn.endpoints.clone())
            .unwrap_or_else(|| vec![DEFAULT_ENDPOINT.to_string()]);

        let dial_timeout = match overrides.dial_timeout {
            Some(timeout) => timeout,
            None => profile.dial_timeout()?.unwrap_or(DEFAULT_DIAL_TIMEOUT),
        };

        let tls = CredentialTriple::from_flags(
            overrides.cert.clone().or_else(|| conn.cert.clone()),
            overrides.key.clone().or_else(|| conn.key.clone()),
            overrides.cacert.clone().or_else(|| conn.cacert.clone()),
        )?;

        let output_format = overrides
            .write_out
            .or(profile.output.write_out)
            .unwrap_or_default();
        let is_hex = overrides.hex || profile.output.hex.unwrap_or(false);

        Ok(Self {
            endpoints,
            dial_timeout,
            tls,
            output_format,
            is_hex,
        })
    }

    /// Build the connection configuration these flags describe.
    pub fn client_config(&self) -> Result<ConnectionConfig, ConfigError> {
        ConnectionConfig::build(
            self.endpoints.clone(),
            self.dial_timeout,
            self.tls.cert.as_deref(),
            self.tls.key.as_deref(),
            self.tls.cacert.as_deref(),
        )
    }
}

// ============================================================================
// Profile file
// ============================================================================

/// Connection defaults loaded from a TOML profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    /// Connection parameters.
    #[serde(default)]
    pub connection: ConnectionProfile,

    /// Output preferences.
    #[serde(default)]
    pub output: OutputProfile,
}

/// `[connection]` section of a profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionProfile {
    pub endpoints: Option<Vec<String>>,
    /// Duration string, e.g. "3s".
    pub dial_timeout: Option<String>,
    pub cert: Option<String>,
    pub key: Option<String>,
    pub cacert: Option<String>,
}

/// `[output]` section of a profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputProfile {
    pub write_out: Option<OutputFormat>,
    pub hex: Option<bool>,
}

impl Profile {
    /// Load a profile from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::InvalidProfile {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Load a profile from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, "<inline>")
    }

    fn parse(content: &str, origin: &str) -> Result<Self, ConfigError> {
        let profile: Profile = toml::from_str(content).map_err(|e| ConfigError::InvalidProfile {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        profile.validate()?;
        Ok(profile)
    }

    /// Validate profile consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref endpoints) = self.connection.endpoints {
            if endpoints.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "connection.endpoints",
                    message: "must list at least one endpoint".to_string(),
                });
            }
        }
        self.dial_timeout()?;
        Ok(())
    }

    /// Parsed `connection.dial_timeout`, if set.
    pub fn dial_timeout(&self) -> Result<Option<Duration>, ConfigError> {
        self.connection
            .dial_timeout
            .as_deref()
            .map(parse_duration)
            .transpose()
            .map_err(|message| ConfigError::InvalidValue {
                field: "connection.dial_timeout",
                message,
            })
    }
}
