//! Error taxonomy for varmatrix-core

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A file name that does not follow the `{prefix}{NNN}{extension}` convention.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamingError {
    #[error("`{name}` does not end with `{extension}`")]
    NotAVariant { name: String, extension: String },

    #[error("`{name}` is not a variant file name: {reason}")]
    Malformed { name: String, reason: String },
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("cannot read configuration directory {}", .dir.display())]
    Io {
        dir: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("malformed variant file {}", .path.display())]
    MalformedName {
        path: PathBuf,
        #[source]
        source: NamingError,
    },
}

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("variant configuration {} not found", .path.display())]
    NotFound { path: PathBuf },

    #[error("cannot copy {} to {}", .from.display(), .to.display())]
    Io {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The build entry point could not be started at all.
#[derive(Debug, Error)]
pub enum BuildInvocationError {
    #[error("cannot start `{program}` in {}", .working_dir.display())]
    Spawn {
        program: String,
        working_dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot open build log {}", .path.display())]
    Log {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Staging(#[from] StagingError),

    #[error(transparent)]
    Invocation(#[from] BuildInvocationError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("project group names must not be empty")]
    EmptyGroupName,

    #[error("project group `{0}` is defined more than once")]
    DuplicateGroup(String),

    #[error("unknown project group `{0}`")]
    UnknownGroup(String),

    #[error("naming width must be at least 1")]
    ZeroWidth,

    #[error("naming extension must not be empty")]
    EmptyExtension,

    #[error("active configuration slot must not be empty")]
    EmptySlot,

    #[error("build program must not be empty")]
    EmptyProgram,
}

/// Fatal orchestration failure, tagged with the group (and variant) it hit.
#[derive(Debug, Error)]
pub enum MatrixError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot create build log directory {}", .path.display())]
    LogDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("group {group}: variant discovery failed")]
    Discovery {
        group: String,
        #[source]
        source: DiscoveryError,
    },

    #[error("group {group}, variant {variant}: staging failed")]
    Staging {
        group: String,
        variant: String,
        #[source]
        source: StagingError,
    },

    #[error("group {group}, variant {variant}: build could not be started")]
    Invocation {
        group: String,
        variant: String,
        #[source]
        source: BuildInvocationError,
    },
}

impl MatrixError {
    pub(crate) fn from_dispatch(group: &str, variant: String, err: DispatchError) -> Self {
        let group = group.to_string();
        match err {
            DispatchError::Staging(source) => Self::Staging {
                group,
                variant,
                source,
            },
            DispatchError::Invocation(source) => Self::Invocation {
                group,
                variant,
                source,
            },
        }
    }
}
