use thiserror::Error;

/// Everything that can go wrong while bootstrapping or using a client handle.
///
/// Messages never carry secret material; only property names, hosts and
/// principals appear in them.
#[derive(Error, Debug)]
pub enum BootError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0} not found in configuration")]
    MissingConfiguration(String),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Invalid target location '{location}': {reason}")]
    InvalidTarget { location: String, reason: String },

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Client acquisition failed: {0}")]
    ClientAcquisition(String),

    #[error("Filesystem error: {0}")]
    FileSystem(String),

    #[error("Format error: {0}")]
    Format(String),
}

/// Taxonomy tag for [`BootError`], handy for matching in callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootErrorKind {
    Io,
    MissingConfiguration,
    InvalidCredentials,
    InvalidTarget,
    Authentication,
    ClientAcquisition,
    FileSystem,
    Format,
}

impl BootError {
    pub fn kind(&self) -> BootErrorKind {
        match self {
            BootError::Io(_) => BootErrorKind::Io,
            BootError::MissingConfiguration(_) => BootErrorKind::MissingConfiguration,
            BootError::InvalidCredentials(_) => BootErrorKind::InvalidCredentials,
            BootError::InvalidTarget { .. } => BootErrorKind::InvalidTarget,
            BootError::Authentication(_) => BootErrorKind::Authentication,
            BootError::ClientAcquisition(_) => BootErrorKind::ClientAcquisition,
            BootError::FileSystem(_) => BootErrorKind::FileSystem,
            BootError::Format(_) => BootErrorKind::Format,
        }
    }

    pub fn invalid_target(location: impl Into<String>, reason: impl Into<String>) -> Self {
        BootError::InvalidTarget {
            location: location.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BootError>;
