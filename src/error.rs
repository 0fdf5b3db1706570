/*
 * Error Module
 *
 * Errors surfaced by the simulation library: configuration problems,
 * invalid parameters, optional asset loading and colony economy operations.
 */

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SwarmError {
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize parameters: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("invalid parameter `{field}`: {reason}")]
    InvalidParam { field: &'static str, reason: String },

    #[error("failed to load sprite {path}: {reason}")]
    Sprite { path: PathBuf, reason: String },

    #[error("not enough food: need {needed}, have {available}")]
    InsufficientFood { needed: u32, available: u32 },

    #[error("no larvae available to hatch")]
    NoLarvae,

    #[error("population cap of {0} agents reached")]
    PopulationCap(usize),
}

/// Result type for simulation operations.
pub type SwarmResult<T> = Result<T, SwarmError>;
