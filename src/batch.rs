//! Batch generation: one resolved G-code document per placed component
//!
//! The frame program of the door's handing comes first, then every placed
//! instance. Each document gets a fresh catalog built from the frame, the
//! instance itself, the declarations of its profile and the project
//! overrides. A resolver failure is recorded against its document and never
//! stops the others; geometry and project errors abort before anything is
//! resolved.

use tracing::{debug, info, warn};

use crate::catalog::system::MAX_INDEXED;
use crate::catalog::{Catalog, CatalogError, SystemVar, Value, VariableId};
use crate::error::GenerateError;
use crate::geometry::{
    self, ComponentClass, ComponentInstance, DocumentId, FrameConfig, FrameLayout,
};
use crate::profile::{CompiledProfile, ProfileRegistry, Project};
use crate::template::{ResolveError, ResolverOptions};
use crate::GenerateConfig;

/// A successfully resolved document
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDocument {
    pub id: DocumentId,
    pub profile: String,
    pub text: String,
}

impl ResolvedDocument {
    /// File name used when the document is written to disk, e.g. `hinge1.gcode`
    pub fn file_name(&self) -> String {
        format!("{}.gcode", self.id)
    }
}

/// A document whose template could not be resolved
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceFailure {
    pub id: DocumentId,
    pub profile: String,
    pub errors: Vec<ResolveError>,
}

/// Outcome of one batch, in batch order (frame program, hinges, lock, mounting points)
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub layout: FrameLayout,
    pub documents: Vec<ResolvedDocument>,
    pub failures: Vec<InstanceFailure>,
    /// Placed instances without a profile
    pub skipped: Vec<DocumentId>,
}

impl BatchResult {
    pub fn succeeded(&self) -> usize {
        self.documents.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn document(&self, id: DocumentId) -> Option<&ResolvedDocument> {
        self.documents.iter().find(|d| d.id == id)
    }

    pub fn failure(&self, id: DocumentId) -> Option<&InstanceFailure> {
        self.failures.iter().find(|f| f.id == id)
    }
}

fn flag(on: bool) -> Value {
    Value::Number(if on { 1.0 } else { 0.0 })
}

fn order(frame: &FrameConfig, id: DocumentId) -> Value {
    Value::Number(frame.order_of(id) as f64)
}

/// Frame-level system variables
///
/// Positions are offsets from the reference edge. Hinge and mounting point
/// positions are only present for placed instances; `$hingeN_active` and the
/// machining order variables are always present.
pub fn frame_variables(frame: &FrameConfig, layout: &FrameLayout) -> Vec<(SystemVar, Value)> {
    let lock = layout.of_class(ComponentClass::Lock).next();
    let hinges: Vec<&ComponentInstance> = layout.of_class(ComponentClass::Hinge).collect();

    let mut vars = vec![
        (SystemVar::FrameHeight, Value::Number(frame.height)),
        (SystemVar::FrameWidth, Value::Number(frame.width)),
        (SystemVar::DoorWidth, Value::Number(frame.door_width)),
        (SystemVar::Orientation, Value::from(frame.orientation.name())),
        (SystemVar::Mirrored, flag(frame.orientation.is_mirrored())),
        (SystemVar::MachineXOffset, Value::Number(frame.machine_offset.x)),
        (SystemVar::MachineYOffset, Value::Number(frame.machine_offset.y)),
        (SystemVar::MachineZOffset, Value::Number(frame.machine_offset.z)),
        (SystemVar::LockYOffset, Value::Number(layout.lock_y_offset)),
        (SystemVar::LockActive, flag(lock.is_some())),
        (
            SystemVar::LockOrder,
            order(frame, DocumentId::new(ComponentClass::Lock, 1)),
        ),
        (SystemVar::HingeCount, Value::Number(hinges.len() as f64)),
        (SystemVar::HingeYOffset, Value::Number(layout.hinge_y_offset)),
    ];
    if let Some(lock) = lock {
        vars.push((SystemVar::LockPosition, Value::Number(lock.offset)));
    }

    for n in 1..=MAX_INDEXED {
        let hinge = hinges.iter().find(|h| h.index() == n as usize);
        vars.push((SystemVar::HingeActive(n), flag(hinge.is_some())));
        vars.push((
            SystemVar::HingeOrder(n),
            order(frame, DocumentId::new(ComponentClass::Hinge, n as usize)),
        ));
        if let Some(hinge) = hinge {
            vars.push((SystemVar::HingePosition(n), Value::Number(hinge.offset)));
        }
    }
    for pm in layout.of_class(ComponentClass::Pm) {
        if let Ok(n) = u8::try_from(pm.index()) {
            vars.push((SystemVar::PmPosition(n), Value::Number(pm.offset)));
        }
    }
    vars
}

/// System variables describing one placed instance
pub fn instance_variables(
    instance: &ComponentInstance,
    layout: &FrameLayout,
) -> Vec<(SystemVar, Value)> {
    vec![
        (SystemVar::Position, Value::Number(instance.offset)),
        (SystemVar::FramePosition, Value::Number(instance.position)),
        (SystemVar::ClearanceStart, Value::Number(instance.clearance.start)),
        (SystemVar::ClearanceEnd, Value::Number(instance.clearance.end)),
        (SystemVar::Index, Value::Number(instance.index() as f64)),
        (SystemVar::YOffset, Value::Number(layout.y_offset(instance.class()))),
    ]
}

/// Fresh catalog for one instance: system variables, profile defaults, then overrides
pub fn instance_catalog(
    frame_vars: &[(SystemVar, Value)],
    instance: &ComponentInstance,
    layout: &FrameLayout,
    profile: &CompiledProfile,
) -> Result<Catalog, CatalogError> {
    profile_catalog(
        frame_vars
            .iter()
            .cloned()
            .chain(instance_variables(instance, layout)),
        profile,
    )
}

/// Fresh catalog from system bindings, profile defaults, then overrides
pub fn profile_catalog(
    system: impl IntoIterator<Item = (SystemVar, Value)>,
    profile: &CompiledProfile,
) -> Result<Catalog, CatalogError> {
    let mut catalog = Catalog::new();
    for (var, value) in system {
        catalog.bind(VariableId::System(var), value);
    }
    for (id, default) in &profile.declarations {
        catalog.declare(id.clone(), default.clone())?;
    }
    for (id, value) in &profile.overrides {
        catalog.bind(id.clone(), value.clone());
    }
    Ok(catalog)
}

fn resolve_document(
    id: DocumentId,
    profile: &CompiledProfile,
    catalog: &Catalog,
    options: &ResolverOptions,
) -> Result<ResolvedDocument, InstanceFailure> {
    match profile.template.resolve(catalog, options) {
        Ok(text) => {
            debug!(document = %id, profile = profile.name(), bytes = text.len(), "resolved");
            Ok(ResolvedDocument {
                id,
                profile: profile.name().to_string(),
                text,
            })
        }
        Err(errors) => {
            debug!(document = %id, profile = profile.name(), errors = errors.len(), "resolution failed");
            Err(InstanceFailure {
                id,
                profile: profile.name().to_string(),
                errors,
            })
        }
    }
}

/// Solve the frame, then resolve its program and the profile of every placed instance
pub fn generate(project: &Project, config: &GenerateConfig) -> Result<BatchResult, GenerateError> {
    let registry = ProfileRegistry::from_project(project)?;
    let layout = geometry::solve(&project.frame, &config.geometry)?;
    let frame = &project.frame;

    // Every assignment is checked before the first template is resolved
    let programs = &frame.programs;
    for name in [&programs.right, &programs.left].into_iter().flatten() {
        registry.for_document(name, DocumentId::FRAME)?;
    }
    let program = match programs.for_orientation(frame.orientation) {
        Some(name) => Some(registry.for_document(name, DocumentId::FRAME)?),
        None => None,
    };
    let mut assigned = Vec::with_capacity(layout.instances.len());
    for instance in &layout.instances {
        assigned.push((instance, registry.assigned(instance)?));
    }

    let frame_vars = frame_variables(frame, &layout);
    let mut resolved = Vec::new();
    let mut skipped = Vec::new();

    if let Some(program) = program {
        let catalog = profile_catalog(frame_vars.iter().cloned(), program)?;
        resolved.push(resolve_document(DocumentId::FRAME, program, &catalog, &config.resolver));
    } else {
        debug!(orientation = frame.orientation.name(), "no frame program");
    }

    for (instance, profile) in assigned {
        let Some(profile) = profile else {
            warn!(instance = %instance.id, "no profile assigned, skipping");
            skipped.push(instance.id);
            continue;
        };
        let catalog = instance_catalog(&frame_vars, instance, &layout, profile)?;
        resolved.push(resolve_document(instance.id, profile, &catalog, &config.resolver));
    }

    let (mut documents, mut failures) = (Vec::new(), Vec::new());
    for outcome in resolved {
        match outcome {
            Ok(document) => documents.push(document),
            Err(failure) => failures.push(failure),
        }
    }

    info!(
        succeeded = documents.len(),
        failed = failures.len(),
        skipped = skipped.len(),
        "batch complete"
    );
    Ok(BatchResult {
        layout,
        documents,
        failures,
        skipped,
    })
}
