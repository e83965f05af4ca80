//! Frame Wizard - G-code generation for CNC-machined door frames
//!
//! A project describes a frame (dimensions, handing, hinges, lock and
//! mounting points) and a set of profiles, each a G-code template with
//! `{...}` placeholders. The geometry solver places every component, then
//! the frame program for the door's handing and each placed component's
//! profile are resolved into their own documents.
//!
//! # Example
//!
//! ```rust
//! use frame_wizard::catalog::{Catalog, Value, VariableId};
//! use frame_wizard::template;
//!
//! let mut catalog = Catalog::new();
//! catalog.bind(VariableId::LVar(1), Value::Number(4.0));
//!
//! let text = template::resolve("G1 Z-{2*(L1+3)}", &catalog).unwrap();
//! assert_eq!(text, "G1 Z-14");
//! ```

pub mod batch;
pub mod catalog;
pub mod error;
pub mod expr;
pub mod geometry;
pub mod profile;
pub mod template;

pub use batch::{BatchResult, InstanceFailure, ResolvedDocument};
pub use catalog::{Catalog, Value, VariableId};
pub use error::{ConfigError, GenerateError};
pub use geometry::{FrameConfig, FrameLayout, GeometryConfig, GeometryError};
pub use profile::{Profile, ProfileError, Project};
pub use template::{ResolveError, ResolverOptions, Template};

use serde::{Deserialize, Serialize};

/// Configuration for the complete generation pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Footprints, clearances and frame limits
    pub geometry: GeometryConfig,
    /// Number formatting
    pub resolver: ResolverOptions,
}

impl GenerateConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_geometry(mut self, config: GeometryConfig) -> Self {
        self.geometry = config;
        self
    }

    pub fn with_resolver(mut self, options: ResolverOptions) -> Self {
        self.resolver = options;
        self
    }

    /// Parse a configuration from TOML; missing tables and keys keep their defaults
    ///
    /// ```rust
    /// use frame_wizard::GenerateConfig;
    ///
    /// let config = GenerateConfig::from_toml(
    ///     "[geometry]\nedge_clearance = 80.0\n\n[resolver]\ndecimals = 2\n",
    /// )
    /// .unwrap();
    /// assert_eq!(config.geometry.edge_clearance, 80.0);
    /// assert_eq!(config.geometry.min_clearance, 10.0);
    /// assert_eq!(config.resolver.decimals, 2);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// Generate every document of a project with default configuration
pub fn generate(project: &Project) -> Result<BatchResult, GenerateError> {
    generate_with_config(project, &GenerateConfig::default())
}

/// Generate every document of a project
///
/// # Example
///
/// ```rust
/// use frame_wizard::geometry::{ComponentClass, ComponentRequest};
/// use frame_wizard::{generate_with_config, FrameConfig, GenerateConfig, Profile, Project};
///
/// let project = Project::new(
///     FrameConfig::new(2100.0, 60.0, 40.0)
///         .with_hinges(ComponentRequest::manual(&[250.0, 1850.0]).with_profile("std")),
/// )
/// .with_profile(Profile::new("std", ComponentClass::Hinge, "G0 Y{$position}"));
///
/// let result = generate_with_config(&project, &GenerateConfig::new()).unwrap();
/// assert_eq!(result.documents[1].text, "G0 Y1850");
/// ```
pub fn generate_with_config(
    project: &Project,
    config: &GenerateConfig,
) -> Result<BatchResult, GenerateError> {
    batch::generate(project, config)
}
