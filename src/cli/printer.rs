//! Command output formatting.
//!
//! Commands never print directly. They receive a [`Printer`] and an output
//! writer from the dispatcher.

use crate::core::config::{ConnectionConfig, OutputFormat};
use crate::core::time::format_duration;
use std::io::{self, Write};
use std::time::Duration;

/// Outcome of probing one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointHealth {
    pub endpoint: String,
    pub healthy: bool,
    pub took: Duration,
    pub error: Option<String>,
}

/// Renders command results.
pub trait Printer {
    /// A value was stored.
    fn put(&self, out: &mut dyn Write) -> io::Result<()>;

    /// A key was read. `None` means the key does not exist.
    fn get(&self, out: &mut dyn Write, key: &[u8], value: Option<&[u8]>) -> io::Result<()>;

    /// Keys were deleted.
    fn del(&self, out: &mut dyn Write, deleted: i64) -> io::Result<()>;

    /// Endpoint probe results.
    fn endpoint_health(&self, out: &mut dyn Write, results: &[EndpointHealth]) -> io::Result<()>;

    /// Resolved connection configuration.
    fn connection_config(&self, out: &mut dyn Write, config: &ConnectionConfig) -> io::Result<()>;
}

/// Create the printer for an output format.
pub fn printer_for(format: OutputFormat, hex: bool) -> Box<dyn Printer> {
    match format {
        OutputFormat::Simple => Box::new(SimplePrinter { hex }),
        OutputFormat::Json => Box::new(JsonPrinter { hex }),
    }
}

/// Line-oriented text output.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimplePrinter {
    /// Render keys and values as hex.
    pub hex: bool,
}

impl SimplePrinter {
    fn write_bytes(&self, out: &mut dyn Write, data: &[u8]) -> io::Result<()> {
        if self.hex {
            writeln!(out, "{}", to_hex(data))
        } else {
            out.write_all(data)?;
            out.write_all(b"\n")
        }
    }
}

impl Printer for SimplePrinter {
    fn put(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "OK")
    }

    fn get(&self, out: &mut dyn Write, key: &[u8], value: Option<&[u8]>) -> io::Result<()> {
        if let Some(value) = value {
            self.write_bytes(out, key)?;
            self.write_bytes(out, value)?;
        }
        Ok(())
    }

    fn del(&self, out: &mut dyn Write, deleted: i64) -> io::Result<()> {
        writeln!(out, "{}", deleted)
    }

    fn endpoint_health(&self, out: &mut dyn Write, results: &[EndpointHealth]) -> io::Result<()> {
        for r in results {
            if r.healthy {
                writeln!(
                    out,
                    "{} is healthy: took = {}",
                    r.endpoint,
                    format_duration(r.took)
                )?;
            } else {
                writeln!(
                    out,
                    "{} is unhealthy: {}",
                    r.endpoint,
                    r.error.as_deref().unwrap_or("unknown error")
                )?;
            }
        }
        Ok(())
    }

    fn connection_config(&self, out: &mut dyn Write, config: &ConnectionConfig) -> io::Result<()> {
        writeln!(out, "endpoints: {}", config.endpoints.join(","))?;
        writeln!(out, "dial-timeout: {}", format_duration(config.dial_timeout))?;
        match &config.tls {
            None => writeln!(out, "tls: disabled"),
            Some(tls) => {
                writeln!(out, "tls: enabled")?;
                for (name, path) in [
                    ("cert", &tls.info.cert_file),
                    ("key", &tls.info.key_file),
                    ("cacert", &tls.info.ca_file),
                ] {
                    if let Some(path) = path {
                        writeln!(out, "  {}: {}", name, path)?;
                    }
                }
                Ok(())
            }
        }
    }
}

/// One JSON object per result.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPrinter {
    /// Render keys and values as hex.
    pub hex: bool,
}

impl JsonPrinter {
    fn text(&self, data: &[u8]) -> String {
        if self.hex {
            to_hex(data)
        } else {
            String::from_utf8_lossy(data).into_owned()
        }
    }

    fn emit(&self, out: &mut dyn Write, value: &serde_json::Value) -> io::Result<()> {
        serde_json::to_writer(&mut *out, value)?;
        out.write_all(b"\n")
    }
}

impl Printer for JsonPrinter {
    fn put(&self, out: &mut dyn Write) -> io::Result<()> {
        self.emit(out, &serde_json::json!({ "ok": true }))
    }

    fn get(&self, out: &mut dyn Write, key: &[u8], value: Option<&[u8]>) -> io::Result<()> {
        let kvs: Vec<serde_json::Value> = value
            .map(|v| serde_json::json!({ "key": self.text(key), "value": self.text(v) }))
            .into_iter()
            .collect();
        self.emit(out, &serde_json::json!({ "count": kvs.len(), "kvs": kvs }))
    }

    fn del(&self, out: &mut dyn Write, deleted: i64) -> io::Result<()> {
        self.emit(out, &serde_json::json!({ "deleted": deleted }))
    }

    fn endpoint_health(&self, out: &mut dyn Write, results: &[EndpointHealth]) -> io::Result<()> {
        let items: Vec<serde_json::Value> = results
            .iter()
            .map(|r| {
                serde_json::json!({
                    "endpoint": r.endpoint,
                    "health": r.healthy,
                    "took_ms": r.took.as_millis() as u64,
                    "error": r.error,
                })
            })
            .collect();
        self.emit(out, &serde_json::Value::Array(items))
    }

    fn connection_config(&self, out: &mut dyn Write, config: &ConnectionConfig) -> io::Result<()> {
        let tls = config.tls.as_ref().map(|tls| {
            serde_json::json!({
                "cert": tls.info.cert_file,
                "key": tls.info.key_file,
                "cacert": tls.info.ca_file,
                "mtls": tls.config.is_mtls(),
            })
        });
        self.emit(
            out,
            &serde_json::json!({
                "endpoints": config.endpoints,
                "dial_timeout_ms": config.dial_timeout.as_millis() as u64,
                "tls": tls,
            }),
        )
    }
}

fn to_hex(data: &[u8]) -> String {
    data.iter().map(|b| format!("{:02x}", b)).collect()
}
