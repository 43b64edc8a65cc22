//! Error types for the default backend
//!
//! Only setup and collaborator failures are Rust errors. Client-visible
//! failures (unhandled operations, rejected binds) are not errors here: they
//! are results delivered through [`crate::traits::ResultSender`].

use crate::operation::OperationKind;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Result type alias for default backend operations
pub type Result<T> = std::result::Result<T, Error>;

/// A step of default backend registration
///
/// Used to name the failing step when setup aborts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationStep {
    /// Validating configuration and constructing the backend descriptor
    CreateBackend,
    /// Handing the descriptor to the dispatch sink
    AttachBackend,
    /// Installing the handler for one operation kind
    InstallHandler(OperationKind),
}

impl fmt::Display for RegistrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationStep::CreateBackend => f.write_str("create_backend"),
            RegistrationStep::AttachBackend => f.write_str("attach_backend"),
            RegistrationStep::InstallHandler(kind) => write!(f, "install_handler:{}", kind),
        }
    }
}

impl FromStr for RegistrationStep {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once(':') {
            None if s == "create_backend" => Ok(RegistrationStep::CreateBackend),
            None if s == "attach_backend" => Ok(RegistrationStep::AttachBackend),
            Some(("install_handler", kind)) => Ok(RegistrationStep::InstallHandler(kind.parse()?)),
            _ => Err(Error::config(format!("Unknown registration step: {}", s))),
        }
    }
}

/// Core error type for the default backend
#[derive(Error, Debug)]
pub enum Error {
    /// Registration failed; the backend must not be used
    #[error("Default backend setup failed at {step}: {reason}")]
    Setup {
        /// The step that failed
        step: RegistrationStep,
        /// Why it failed
        reason: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A DN could not be exploded into RDNs
    #[error("Invalid DN: {0}")]
    InvalidDn(String),

    /// No handler is installed for an operation kind
    #[error("No handler installed for {0} operations")]
    Dispatch(OperationKind),

    /// Handler installation rejected by a dispatch sink
    #[error("Handler registration rejected: {0}")]
    Registration(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a setup error for the given step
    pub fn setup(step: RegistrationStep, reason: impl Into<String>) -> Self {
        Self::Setup {
            step,
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid DN error
    pub fn invalid_dn(msg: impl Into<String>) -> Self {
        Self::InvalidDn(msg.into())
    }

    /// Create a registration error
    pub fn registration(msg: impl Into<String>) -> Self {
        Self::Registration(msg.into())
    }

    /// The failing registration step, if this is a setup error
    pub fn setup_step(&self) -> Option<RegistrationStep> {
        match self {
            Self::Setup { step, .. } => Some(*step),
            _ => None,
        }
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
