//! Profiles and project files
//!
//! A profile is a reusable G-code template for one component class, together
//! with the L-variables and custom variables it declares. A project bundles
//! profiles, the frame to machine and per-profile value overrides.

mod registry;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{CatalogError, SystemVar, Value, VariableId};
use crate::geometry::{ComponentClass, DocumentId, FrameConfig};

pub use registry::{CompiledProfile, ProfileRegistry};

/// Why a declared or overridden identifier was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationProblem {
    /// Not of the form `L<n>` with `n >= 1`
    NotAnLVar,
    /// Not a valid identifier
    InvalidName,
    /// Custom name equal to a system variable name
    ReservedName,
    /// Custom name shaped like an L-variable
    LooksLikeLVar,
    /// `$` variables cannot be declared or overridden
    SystemVariable,
    Duplicate,
}

impl fmt::Display for DeclarationProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NotAnLVar => "is not an L-variable (expected L1, L2, ...)",
            Self::InvalidName => "is not a valid variable name",
            Self::ReservedName => "is reserved for a system variable",
            Self::LooksLikeLVar => "has the shape of an L-variable",
            Self::SystemVariable => "is a system variable",
            Self::Duplicate => "is declared more than once",
        };
        f.write_str(text)
    }
}

/// Errors in profiles and projects
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("profile '{profile}': variable '{identifier}' {problem}")]
    InvalidProfile {
        profile: String,
        identifier: String,
        problem: DeclarationProblem,
    },

    #[error("duplicate profile '{name}'")]
    DuplicateProfile { name: String },

    #[error("unknown profile '{name}'")]
    UnknownProfile {
        name: String,
        /// Instance the profile was assigned to, `None` for overrides
        instance: Option<DocumentId>,
    },

    #[error("profile '{profile}' is a {found} profile but {instance} needs a {expected} profile")]
    ProfileKindMismatch {
        profile: String,
        instance: DocumentId,
        expected: ComponentClass,
        found: ComponentClass,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    Lvar,
    Custom,
}

/// A variable declared by a profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDecl {
    pub kind: DeclarationKind,
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl VariableDecl {
    /// Classify the declared identifier, checking it matches the declared kind
    pub fn id(&self) -> Result<VariableId, DeclarationProblem> {
        let parsed = VariableId::parse(&self.identifier);
        match (self.kind, parsed) {
            (_, Ok(VariableId::System(_)))
            | (_, Err(CatalogError::UnknownSystemVariable { .. })) => {
                Err(DeclarationProblem::SystemVariable)
            }
            (DeclarationKind::Lvar, Ok(id @ VariableId::LVar(_))) => Ok(id),
            (DeclarationKind::Lvar, _) => Err(DeclarationProblem::NotAnLVar),
            (DeclarationKind::Custom, Ok(VariableId::LVar(_))) => Err(DeclarationProblem::LooksLikeLVar),
            (DeclarationKind::Custom, Ok(VariableId::Custom(name))) => {
                if SystemVar::from_name(&name).is_some() {
                    Err(DeclarationProblem::ReservedName)
                } else {
                    Ok(VariableId::Custom(name))
                }
            }
            (DeclarationKind::Custom, Err(_)) => {
                let lvar_shaped = self
                    .identifier
                    .strip_prefix('L')
                    .is_some_and(|d| !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()));
                if lvar_shaped {
                    Err(DeclarationProblem::LooksLikeLVar)
                } else {
                    Err(DeclarationProblem::InvalidName)
                }
            }
        }
    }
}

/// A reusable G-code template for one component class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ComponentClass,
    pub template: String,
    #[serde(default)]
    pub variables: Vec<VariableDecl>,
}

impl Profile {
    pub fn new(name: impl Into<String>, kind: ComponentClass, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            template: template.into(),
            variables: Vec::new(),
        }
    }

    /// Declare an L-variable
    pub fn with_lvar(mut self, identifier: &str, default: Option<Value>) -> Self {
        self.variables.push(VariableDecl {
            kind: DeclarationKind::Lvar,
            identifier: identifier.to_string(),
            default,
        });
        self
    }

    /// Declare a custom variable
    pub fn with_custom(mut self, identifier: &str, default: Option<Value>) -> Self {
        self.variables.push(VariableDecl {
            kind: DeclarationKind::Custom,
            identifier: identifier.to_string(),
            default,
        });
        self
    }

    pub fn from_json(content: &str) -> Result<Self, ProfileError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Validated declarations, in order
    pub fn declarations(&self) -> Result<Vec<(VariableId, Option<Value>)>, ProfileError> {
        let mut declared: Vec<(VariableId, Option<Value>)> = Vec::with_capacity(self.variables.len());
        for decl in &self.variables {
            let id = decl.id().map_err(|problem| self.invalid(&decl.identifier, problem))?;
            if declared.iter().any(|(known, _)| *known == id) {
                return Err(self.invalid(&decl.identifier, DeclarationProblem::Duplicate));
            }
            declared.push((id, decl.default.clone()));
        }
        Ok(declared)
    }

    fn invalid(&self, identifier: &str, problem: DeclarationProblem) -> ProfileError {
        ProfileError::InvalidProfile {
            profile: self.name.clone(),
            identifier: identifier.to_string(),
            problem,
        }
    }
}

/// Profiles, frame and overrides loaded from one project file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub profiles: Vec<Profile>,
    pub frame: FrameConfig,
    /// Values bound per profile, keyed by profile name then identifier
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<String, BTreeMap<String, Value>>,
}

impl Project {
    pub fn new(frame: FrameConfig) -> Self {
        Self {
            profiles: Vec::new(),
            frame,
            overrides: BTreeMap::new(),
        }
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profiles.push(profile);
        self
    }

    /// Bind `identifier` to `value` whenever `profile` is resolved
    pub fn with_override(mut self, profile: &str, identifier: &str, value: impl Into<Value>) -> Self {
        self.overrides
            .entry(profile.to_string())
            .or_default()
            .insert(identifier.to_string(), value.into());
        self
    }

    pub fn from_json(content: &str) -> Result<Self, ProfileError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_json(&self) -> Result<String, ProfileError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.name == name)
    }
}
