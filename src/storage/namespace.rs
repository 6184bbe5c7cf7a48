use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// The two storage namespaces. Each maps to exactly one directory under the
/// data dir; the directory contents are the entire persisted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Client,
    Server,
}

impl Namespace {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Server => "server",
        }
    }

    /// Directory name under the data dir.
    #[must_use]
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Client => "client-uploads",
            Self::Server => "server-uploads",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Namespace {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Self::Client),
            "server" => Ok(Self::Server),
            other => Err(Error::UnknownNamespace(other.to_string())),
        }
    }
}

/// What a service may do to a namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caps {
    pub read: bool,
    pub write: bool,
    pub delete: bool,
}

impl Caps {
    const NONE: Self = Self {
        read: false,
        write: false,
        delete: false,
    };
    const FULL: Self = Self {
        read: true,
        write: true,
        delete: true,
    };
    const APPEND_ONLY: Self = Self {
        read: true,
        write: true,
        delete: false,
    };
}

/// Which of the two HTTP surfaces a request arrived on.
///
/// The general service and the admin service run the same core operations
/// but hold different capability sets over the namespaces; the split is a
/// trust boundary, so every mutating handler checks it before touching the
/// filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceTier {
    General,
    Admin,
}

impl ServiceTier {
    #[must_use]
    pub fn caps(self, namespace: Namespace) -> Caps {
        match (self, namespace) {
            (Self::General, Namespace::Client) => Caps::FULL,
            (Self::General, Namespace::Server) => Caps::APPEND_ONLY,
            (Self::Admin, Namespace::Server) => Caps::FULL,
            (Self::Admin, Namespace::Client) => Caps::NONE,
        }
    }

    pub fn require_read(self, namespace: Namespace) -> crate::error::Result<()> {
        if self.caps(namespace).read {
            Ok(())
        } else {
            Err(Error::Forbidden)
        }
    }

    pub fn require_write(self, namespace: Namespace) -> crate::error::Result<()> {
        if self.caps(namespace).write {
            Ok(())
        } else {
            Err(Error::Forbidden)
        }
    }

    pub fn require_delete(self, namespace: Namespace) -> crate::error::Result<()> {
        if self.caps(namespace).delete {
            Ok(())
        } else {
            Err(Error::Forbidden)
        }
    }
}
