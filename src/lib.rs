//! latticectl - command-line client for Lattice key-value clusters.
//!
//! latticectl turns command-line flags, an optional profile file and
//! defaults into one validated connection configuration, then runs a
//! single key-value command against the cluster.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     CLI (clap) + Printers                       │
//! │          put │ get │ del │ endpoint health │ endpoint config    │
//! └─────────────────────────────────────────────────────────────────┘
//!                                  │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                              Core                               │
//! │   GlobalFlags merge │ ConnectionConfig build │ arg-or-stdin     │
//! └─────────────────────────────────────────────────────────────────┘
//!                                  │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Client + Networking                         │
//! │        RESP2 KvClient │ Dialer (TCP / rustls) │ TLS loader      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Module Organization
//!
//! ## Core
//! - [`core::args`] - Positional argument resolution
//! - [`core::config`] - Connection configuration and flag merging
//! - [`core::time`] - Duration parsing
//! - [`core::error`] - Error types and exit-code mapping
//!
//! ## Networking
//! - [`net::tls`] - Client TLS material
//! - [`net::dial`] - Endpoint dialing
//!
//! ## Client
//! - [`client`] - RESP2 key-value client
//!
//! ## CLI
//! - [`cli`] - Flags, dispatch and output printers
//!
//! # Key Invariants
//!
//! - A credential flag given an empty value is an error, never "unset".
//! - TLS is enabled when any one of cert, key or cacert is given.
//! - Only `main` exits the process.

// Core infrastructure
pub mod core;

// Networking
pub mod net;

// Key-value client
pub mod client;

// CLI
pub mod cli;

// Re-exports for convenience
pub use self::core::{args, config, error, time};
pub use net::{dial, tls};
