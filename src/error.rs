use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The supplied file name would escape its namespace root.
    #[error("unsafe file name")]
    UnsafeName,

    #[error("not found")]
    NotFound,

    #[error("forbidden")]
    Forbidden,

    #[error("preview not supported for this file type")]
    UnsupportedPreview,

    #[error("file exceeds the maximum upload size")]
    SizeExceeded,

    #[error("invalid namespace: {0}")]
    UnknownNamespace(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Collapses `ErrorKind::NotFound` into the domain-level variant so
    /// callers can match on it without inspecting io kinds.
    pub(crate) fn from_io(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound
        } else {
            Self::Io(e)
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
