//! Error types and exit-code mapping.
//!
//! Every failure in latticectl is a typed error that travels back to `main`.
//! Nothing below `main` terminates the process. `ExitCodeMapping` sorts each
//! error into one of three exit classes.

use thiserror::Error;

/// Positional argument resolution errors.
#[derive(Debug, Error)]
pub enum ArgError {
    /// No positional value, and stdin was empty or unreadable.
    #[error("no available argument and stdin")]
    MissingArgument,

    /// Stdin supplied bytes that are not valid UTF-8.
    #[error("argument read from stdin is not valid UTF-8")]
    NotUtf8,
}

/// Connection configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A credential flag was explicitly set to the empty string.
    #[error("empty string is passed to --{field} option")]
    EmptyCredentialValue { field: &'static str },

    /// TLS material could not be loaded or assembled.
    #[error("tls setup failed: {message}")]
    TlsSetup { message: String },

    /// The profile file could not be read or parsed.
    #[error("invalid profile {path}: {message}")]
    InvalidProfile { path: String, message: String },

    /// A configuration value is malformed.
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },
}

impl ConfigError {
    /// Create a TlsSetup error from any displayable cause.
    ///
    /// Uses the alternate form so anyhow context chains stay intact.
    pub fn tls_setup(cause: impl std::fmt::Display) -> Self {
        Self::TlsSetup {
            message: format!("{:#}", cause),
        }
    }
}

/// Top-level latticectl error.
#[derive(Debug, Error)]
pub enum CtlError {
    /// Positional argument could not be resolved.
    #[error(transparent)]
    Arg(#[from] ArgError),

    /// Connection configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Command line could not be parsed.
    #[error("{message}")]
    Usage { message: String },

    /// No endpoint could be dialed.
    #[error("bad connection: {message}")]
    Connection { message: String },

    /// The server answered with an error reply.
    #[error("server error: {kind} {message}")]
    Server { kind: String, message: String },

    /// The server reply could not be decoded.
    #[error("protocol error: {message}")]
    Protocol { message: String },

    /// At least one endpoint failed its health probe.
    #[error("unhealthy cluster: {unhealthy} of {total} endpoints failed")]
    UnhealthyCluster { unhealthy: usize, total: usize },

    /// Local I/O failure (stdout, stdin).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CtlError {
    /// Create a Connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a Protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Exit class for this error.
    pub fn exit_class(&self) -> ExitClass {
        ExitCodeMapping::exit_class(self)
    }
}

/// Result type using CtlError.
pub type CtlResult<T> = Result<T, CtlError>;

// ============================================================================
// Exit code mapping
// ============================================================================

/// Failure severity reported to the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitClass {
    /// Generic failure.
    Error,
    /// The cluster could not be reached.
    BadConnection,
    /// Invalid flags, arguments or credentials.
    BadArgs,
}

impl ExitClass {
    /// Process exit status for this class.
    pub fn code(self) -> i32 {
        match self {
            Self::Error => 1,
            Self::BadConnection => 2,
            Self::BadArgs => 128,
        }
    }
}

impl std::fmt::Display for ExitClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "Error"),
            Self::BadConnection => write!(f, "BadConnection"),
            Self::BadArgs => write!(f, "BadArgs"),
        }
    }
}

/// Maps errors to exit classes.
pub struct ExitCodeMapping;

impl ExitCodeMapping {
    /// Classify an error.
    ///
    /// Configuration errors are bad arguments even when they surface while
    /// loading TLS material.
    pub fn exit_class(error: &CtlError) -> ExitClass {
        match error {
            CtlError::Arg(_) => ExitClass::BadArgs,
            CtlError::Config(_) => ExitClass::BadArgs,
            CtlError::Usage { .. } => ExitClass::Error,
            CtlError::Connection { .. } => ExitClass::BadConnection,
            CtlError::Server { .. } => ExitClass::Error,
            CtlError::Protocol { .. } => ExitClass::Error,
            CtlError::UnhealthyCluster { .. } => ExitClass::Error,
            CtlError::Io(_) => ExitClass::Error,
        }
    }

    /// Classify an error and return the process exit status.
    pub fn exit_code(error: &CtlError) -> i32 {
        Self::exit_class(error).code()
    }
}
