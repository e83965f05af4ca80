//! Top-level error types for the generation pipeline

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::geometry::GeometryError;
use crate::profile::ProfileError;

/// Errors that abort a whole batch
///
/// Template errors are not listed here: they are scoped to one instance and
/// reported in the batch result.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("project error: {0}")]
    Profile(#[from] ProfileError),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Errors loading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
}
