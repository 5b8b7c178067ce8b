//! Error types for host lookups and override-file loading

use std::path::PathBuf;

use thiserror::Error;

use crate::host::{StructureId, UnitId};

/// Errors raised by a [`crate::host::UnitHost`] while resolving handles
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// Structure handle no longer resolves (closed, merged or destroyed)
    #[error("structure {0} not found")]
    UnknownStructure(StructureId),

    /// Unit handle no longer resolves
    #[error("unit {0} not found")]
    UnknownUnit(UnitId),
}

/// Errors raised while reading the item override file
#[derive(Debug, Error)]
pub enum OverrideError {
    /// None of the candidate locations exist
    #[error("no override file at any of {tried:?}")]
    NotFound { tried: Vec<PathBuf> },

    /// The file exists but could not be read
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for host lookups
pub type HostResult<T> = Result<T, HostError>;
