//! Positional argument resolution.
//!
//! Commands such as `put <key> [value]` accept their last argument either
//! positionally or piped through stdin.

use crate::core::error::ArgError;
use std::io::Read;

/// Resolve the argument at `index`, falling back to the whole of `stream`.
///
/// The stream is only read when `args` has no element at `index`. It is
/// then read to the end in one go, so this blocks until EOF.
pub fn resolve_arg<R: Read>(args: &[String], mut stream: R, index: usize) -> Result<String, ArgError> {
    if let Some(arg) = args.get(index) {
        return Ok(arg.clone());
    }

    let mut buf = Vec::new();
    match stream.read_to_end(&mut buf) {
        Ok(_) if !buf.is_empty() => {}
        Ok(_) => return Err(ArgError::MissingArgument),
        Err(err) => {
            tracing::debug!(error = %err, "failed to read argument from stdin");
            return Err(ArgError::MissingArgument);
        }
    }

    String::from_utf8(buf).map_err(|_| ArgError::NotUtf8)
}
