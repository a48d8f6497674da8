//! Core connection-resolution logic.
//!
//! Nothing here touches the network or the process:
//! - [`args`] - Positional argument resolution with stdin fallback
//! - [`config`] - Connection configuration building and flag merging
//! - [`time`] - Duration parsing and formatting
//! - [`error`] - Error types and exit-code mapping

pub mod args;
pub mod config;
pub mod error;
pub mod time;
