//! Profile registry for storing validated, pre-scanned profiles

use std::collections::{BTreeMap, HashMap};

use tracing::warn;

use crate::catalog::{CatalogError, SystemVar, Value, VariableId};
use crate::geometry::{ComponentInstance, DocumentId};
use crate::template::Template;

use super::{DeclarationProblem, Profile, ProfileError, Project};

/// A profile whose declarations were validated and whose template was scanned
#[derive(Debug, Clone)]
pub struct CompiledProfile {
    pub profile: Profile,
    pub template: Template,
    pub declarations: Vec<(VariableId, Option<Value>)>,
    /// Project overrides bound whenever the profile is resolved
    pub overrides: Vec<(VariableId, Value)>,
}

impl CompiledProfile {
    pub fn compile(profile: Profile) -> Result<Self, ProfileError> {
        let declarations = profile.declarations()?;
        let template = Template::parse(&profile.template);

        for (id, inline_default) in template.references() {
            let declared = declarations.iter().any(|(known, _)| *known == id);
            if !id.is_system() && !declared && inline_default.is_none() {
                warn!(profile = %profile.name, variable = %id, "template uses an undeclared variable");
            }
        }

        Ok(Self {
            profile,
            template,
            declarations,
            overrides: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.profile.name
    }

    /// Replace the override bindings
    ///
    /// System variables cannot be overridden, with or without the `$`.
    pub fn set_overrides(&mut self, values: &BTreeMap<String, Value>) -> Result<(), ProfileError> {
        let mut overrides = Vec::with_capacity(values.len());
        for (identifier, value) in values {
            let problem = match VariableId::parse(identifier) {
                Ok(VariableId::Custom(name)) if SystemVar::from_name(&name).is_some() => {
                    DeclarationProblem::ReservedName
                }
                Ok(id) if !id.is_system() => {
                    overrides.push((id, value.clone()));
                    continue;
                }
                Ok(_) | Err(CatalogError::UnknownSystemVariable { .. }) => {
                    DeclarationProblem::SystemVariable
                }
                Err(_) => DeclarationProblem::InvalidName,
            };
            return Err(ProfileError::InvalidProfile {
                profile: self.profile.name.clone(),
                identifier: identifier.clone(),
                problem,
            });
        }
        self.overrides = overrides;
        Ok(())
    }
}

/// Registry for storing profiles by name
#[derive(Debug, Default)]
pub struct ProfileRegistry {
    profiles: HashMap<String, CompiledProfile>,
}

impl ProfileRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile and register every profile of a project, then attach its overrides
    pub fn from_project(project: &Project) -> Result<Self, ProfileError> {
        let mut registry = Self::new();
        for profile in &project.profiles {
            registry.register(profile.clone())?;
        }
        for (name, values) in &project.overrides {
            let compiled = registry
                .profiles
                .get_mut(name)
                .ok_or_else(|| ProfileError::UnknownProfile {
                    name: name.clone(),
                    instance: None,
                })?;
            compiled.set_overrides(values)?;
        }
        Ok(registry)
    }

    /// Register a profile
    pub fn register(&mut self, profile: Profile) -> Result<(), ProfileError> {
        if self.profiles.contains_key(&profile.name) {
            return Err(ProfileError::DuplicateProfile { name: profile.name });
        }
        let compiled = CompiledProfile::compile(profile)?;
        self.profiles.insert(compiled.profile.name.clone(), compiled);
        Ok(())
    }

    /// Get a profile by name
    pub fn get(&self, name: &str) -> Option<&CompiledProfile> {
        self.profiles.get(name)
    }

    /// Check if a profile exists
    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    /// All profile names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Profile assigned to an instance, checking it exists and matches the class
    pub fn assigned(
        &self,
        instance: &ComponentInstance,
    ) -> Result<Option<&CompiledProfile>, ProfileError> {
        match instance.profile.as_deref() {
            Some(name) => self.for_document(name, instance.id).map(Some),
            None => Ok(None),
        }
    }

    /// Profile `name` used for document `id`, checking it exists and matches the class
    pub fn for_document(&self, name: &str, id: DocumentId) -> Result<&CompiledProfile, ProfileError> {
        let compiled = self.get(name).ok_or_else(|| ProfileError::UnknownProfile {
            name: name.to_string(),
            instance: Some(id),
        })?;
        if compiled.profile.kind != id.class {
            return Err(ProfileError::ProfileKindMismatch {
                profile: name.to_string(),
                instance: id,
                expected: id.class,
                found: compiled.profile.kind,
            });
        }
        Ok(compiled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{ComponentClass, ComponentRequest, FrameConfig, GeometryConfig};

    fn hinge_profile(name: &str) -> Profile {
        Profile::new(name, ComponentClass::Hinge, "G0 X{$position}\nG1 Z-{L1}")
            .with_lvar("L1", Some(Value::Number(12.0)))
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = ProfileRegistry::new();
        registry.register(hinge_profile("a")).unwrap();
        registry.register(hinge_profile("b")).unwrap();
        assert_eq!(registry.names(), vec!["a", "b"]);
        assert!(registry.contains("a"));
        assert_eq!(registry.get("a").unwrap().declarations.len(), 1);
    }

    #[test]
    fn test_duplicate_profile() {
        let mut registry = ProfileRegistry::new();
        registry.register(hinge_profile("a")).unwrap();
        assert!(matches!(
            registry.register(hinge_profile("a")),
            Err(ProfileError::DuplicateProfile { .. })
        ));
    }

    #[test]
    fn test_invalid_profile_is_rejected() {
        let mut registry = ProfileRegistry::new();
        let profile =
            Profile::new("bad", ComponentClass::Lock, "").with_custom("door_width", None);
        assert!(matches!(
            registry.register(profile),
            Err(ProfileError::InvalidProfile {
                problem: DeclarationProblem::ReservedName,
                ..
            })
        ));
    }

    #[test]
    fn test_overrides() {
        let project = Project::new(FrameConfig::new(2100.0, 60.0, 40.0))
            .with_profile(hinge_profile("a"))
            .with_override("a", "L1", 8.0);
        let registry = ProfileRegistry::from_project(&project).unwrap();
        assert_eq!(
            registry.get("a").unwrap().overrides,
            vec![(VariableId::LVar(1), Value::Number(8.0))]
        );

        let project = project.with_override("a", "$frame_height", 1.0);
        assert!(matches!(
            ProfileRegistry::from_project(&project),
            Err(ProfileError::InvalidProfile {
                problem: DeclarationProblem::SystemVariable,
                ..
            })
        ));
    }

    #[test]
    fn test_override_named_after_system_variable() {
        let project = Project::new(FrameConfig::new(2100.0, 60.0, 40.0))
            .with_profile(hinge_profile("a"))
            .with_override("a", "position", 8.0);
        match ProfileRegistry::from_project(&project).unwrap_err() {
            ProfileError::InvalidProfile {
                profile,
                identifier,
                problem,
            } => {
                assert_eq!(profile, "a");
                assert_eq!(identifier, "position");
                assert_eq!(problem, DeclarationProblem::ReservedName);
            }
            other => panic!("Expected invalid profile, got {:?}", other),
        }

        let project = Project::new(FrameConfig::new(2100.0, 60.0, 40.0))
            .with_profile(hinge_profile("a"))
            .with_override("a", "depth", 8.0);
        assert_eq!(
            ProfileRegistry::from_project(&project).unwrap().get("a").unwrap().overrides,
            vec![(VariableId::Custom("depth".to_string()), Value::Number(8.0))]
        );
    }

    #[test]
    fn test_override_for_unknown_profile() {
        let project = Project::new(FrameConfig::new(2100.0, 60.0, 40.0))
            .with_override("ghost", "L1", 8.0);
        assert!(matches!(
            ProfileRegistry::from_project(&project),
            Err(ProfileError::UnknownProfile { instance: None, .. })
        ));
    }

    #[test]
    fn test_assignment_checks() {
        let mut registry = ProfileRegistry::new();
        registry.register(hinge_profile("hinge")).unwrap();
        registry
            .register(Profile::new("lock", ComponentClass::Lock, "M0"))
            .unwrap();

        let config = GeometryConfig::default();
        let frame = FrameConfig::new(2100.0, 60.0, 40.0)
            .with_hinges(ComponentRequest::auto(1).with_profile("hinge"));
        let layout = crate::geometry::solve(&frame, &config).unwrap();
        assert_eq!(
            registry.assigned(&layout.instances[0]).unwrap().map(|p| p.name()),
            Some("hinge")
        );

        let frame = frame.with_hinges(ComponentRequest::auto(1).with_profile("lock"));
        let layout = crate::geometry::solve(&frame, &config).unwrap();
        assert!(matches!(
            registry.assigned(&layout.instances[0]),
            Err(ProfileError::ProfileKindMismatch {
                expected: ComponentClass::Hinge,
                found: ComponentClass::Lock,
                ..
            })
        ));

        let frame = frame.with_hinges(ComponentRequest::auto(1).with_profile("nope"));
        let layout = crate::geometry::solve(&frame, &config).unwrap();
        assert!(matches!(
            registry.assigned(&layout.instances[0]),
            Err(ProfileError::UnknownProfile { .. })
        ));
    }
}
