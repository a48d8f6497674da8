//! Networking layer.
//!
//! This module handles transport and security:
//! - [`tls`] - Client TLS material loading
//! - [`dial`] - TCP/TLS endpoint dialing

pub mod dial;
pub mod tls;
