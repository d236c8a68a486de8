//! Error types for the clustering engine.

use crate::compute::cluster::ClusterId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, VacancyError>;

#[derive(Debug, Error)]
pub enum VacancyError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("cluster {0} not found in the current index")]
    ClusterNotFound(ClusterId),

    #[error("map widget unavailable: {0}")]
    MapUnavailable(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "toml")]
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
