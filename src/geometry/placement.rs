//! Component placement along the frame height
//!
//! Positions are computed as offsets from the reference edge of the door's
//! handing; the usable span is symmetric so automatic spacing does not depend
//! on the orientation. Frame coordinates are derived at the end.

use tracing::debug;

use super::config::GeometryConfig;
use super::error::{DimensionRule, GeometryError, OrderProblem};
use super::solver::distribute_slots;
use super::types::{
    ComponentClass, ComponentInstance, ComponentRequest, DocumentId, FrameConfig, LockRequest,
    PlacementMode, Window,
};

/// Tolerance for ordering, bounds and clearance comparisons
const EPSILON: f64 = 1e-9;

/// Solver output for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameLayout {
    /// Hinges, then the lock, then mounting points, each by ascending index
    pub instances: Vec<ComponentInstance>,
    pub hinge_y_offset: f64,
    pub lock_y_offset: f64,
}

impl FrameLayout {
    pub fn of_class(&self, class: ComponentClass) -> impl Iterator<Item = &ComponentInstance> {
        self.instances.iter().filter(move |i| i.class() == class)
    }

    pub fn get(&self, id: DocumentId) -> Option<&ComponentInstance> {
        self.instances.iter().find(|i| i.id == id)
    }

    /// Y offset for components of a class (mounting points and the frame have none)
    pub fn y_offset(&self, class: ComponentClass) -> f64 {
        match class {
            ComponentClass::Hinge => self.hinge_y_offset,
            ComponentClass::Lock => self.lock_y_offset,
            ComponentClass::Frame | ComponentClass::Pm => 0.0,
        }
    }
}

/// Validate a frame and place every requested component
pub fn solve(frame: &FrameConfig, config: &GeometryConfig) -> Result<FrameLayout, GeometryError> {
    validate(frame, config)?;

    let mut instances = place_class(ComponentClass::Hinge, &frame.hinges, frame, config)?;
    if let Some(lock) = frame.lock.as_ref().filter(|lock| lock.active) {
        instances.push(place_lock(lock, frame, config));
    }
    instances.extend(place_class(ComponentClass::Pm, &frame.pm_positions, frame, config)?);

    check_bounds(&instances, frame.height)?;
    check_collisions(&instances, config)?;

    let auto_y = config.auto_y_offset(frame.width, frame.door_width);
    let layout = FrameLayout {
        instances,
        hinge_y_offset: frame.hinge_y_offset.unwrap_or(auto_y),
        lock_y_offset: frame.lock_y_offset.unwrap_or(auto_y),
    };
    debug!(
        instances = layout.instances.len(),
        height = frame.height,
        orientation = frame.orientation.name(),
        "frame solved"
    );
    Ok(layout)
}

fn check_dimension(field: &'static str, value: f64) -> Result<(), GeometryError> {
    if !value.is_finite() {
        return Err(GeometryError::invalid_dimension(field, value, DimensionRule::Finite));
    }
    if value < 0.0 {
        return Err(GeometryError::invalid_dimension(field, value, DimensionRule::NonNegative));
    }
    Ok(())
}

/// Reject malformed frames before anything is placed
pub fn validate(frame: &FrameConfig, config: &GeometryConfig) -> Result<(), GeometryError> {
    check_dimension("height", frame.height)?;
    check_dimension("width", frame.width)?;
    check_dimension("doorWidth", frame.door_width)?;

    if frame.door_width > frame.width {
        return Err(GeometryError::invalid_dimension(
            "doorWidth",
            frame.door_width,
            DimensionRule::AtMostFrameWidth,
        ));
    }
    if frame.height < config.min_frame_height {
        return Err(GeometryError::invalid_dimension(
            "height",
            frame.height,
            DimensionRule::AtLeast(config.min_frame_height),
        ));
    }
    if frame.height > config.max_frame_height {
        return Err(GeometryError::invalid_dimension(
            "height",
            frame.height,
            DimensionRule::AtMost(config.max_frame_height),
        ));
    }

    for (field, value) in [
        ("machineOffset.x", frame.machine_offset.x),
        ("machineOffset.y", frame.machine_offset.y),
        ("machineOffset.z", frame.machine_offset.z),
    ] {
        if !value.is_finite() {
            return Err(GeometryError::invalid_dimension(field, value, DimensionRule::Finite));
        }
    }
    if let Some(value) = frame.lock_y_offset {
        check_dimension("lockYOffset", value)?;
    }
    if let Some(value) = frame.hinge_y_offset {
        check_dimension("hingeYOffset", value)?;
    }

    validate_request(ComponentClass::Hinge, &frame.hinges)?;
    validate_request(ComponentClass::Pm, &frame.pm_positions)?;

    if let Some(lock) = frame.lock.as_ref().filter(|lock| lock.active) {
        match lock.position {
            Some(position) => check_dimension("lock.position", position)?,
            None if lock.mode == PlacementMode::Manual => {
                return Err(GeometryError::MissingPosition {
                    instance: DocumentId::new(ComponentClass::Lock, 1),
                })
            }
            None => {}
        }
    }

    validate_order(frame)
}

/// Entries of the machining order must be distinct, requested hinges or the active lock
fn validate_order(frame: &FrameConfig) -> Result<(), GeometryError> {
    for (i, &entry) in frame.order.iter().enumerate() {
        let requested = match entry.class {
            ComponentClass::Hinge => entry.index <= frame.hinges.requested(),
            ComponentClass::Lock => frame.lock.as_ref().is_some_and(|lock| lock.active),
            ComponentClass::Frame | ComponentClass::Pm => {
                return Err(GeometryError::InvalidOrder {
                    entry,
                    problem: OrderProblem::NotOrderable,
                })
            }
        };
        let problem = if frame.order[..i].contains(&entry) {
            OrderProblem::Duplicate
        } else if !requested {
            OrderProblem::NotRequested
        } else {
            continue;
        };
        return Err(GeometryError::InvalidOrder { entry, problem });
    }
    Ok(())
}

fn validate_request(class: ComponentClass, request: &ComponentRequest) -> Result<(), GeometryError> {
    let requested = request.requested();
    if requested > class.max_count() {
        return Err(GeometryError::count_exceeded(class, requested));
    }
    if let Some(count) = request.count {
        if request.positions.len() > count {
            return Err(GeometryError::CountMismatch {
                class,
                count,
                positions: request.positions.len(),
            });
        }
    }

    for (i, slot) in request.slots().into_iter().enumerate() {
        match slot {
            Some(position) => check_dimension("position", position)?,
            None if request.mode == PlacementMode::Manual => {
                return Err(GeometryError::MissingPosition {
                    instance: DocumentId::new(class, i + 1),
                })
            }
            None => {}
        }
    }
    Ok(())
}

fn instance(
    id: DocumentId,
    offset: f64,
    pinned: bool,
    profile: Option<String>,
    frame: &FrameConfig,
    config: &GeometryConfig,
) -> ComponentInstance {
    let length = config.footprint(id.class, id.index);
    let reach = length / 2.0 + config.min_clearance / 2.0;
    ComponentInstance {
        id,
        profile,
        position: frame.orientation.mirror(offset, frame.height),
        offset,
        length,
        clearance: Window {
            start: offset - reach,
            end: offset + reach,
        },
        pinned,
    }
}

fn place_class(
    class: ComponentClass,
    request: &ComponentRequest,
    frame: &FrameConfig,
    config: &GeometryConfig,
) -> Result<Vec<ComponentInstance>, GeometryError> {
    let slots = request.slots();
    if slots.is_empty() {
        return Ok(Vec::new());
    }

    let span = (config.edge_clearance, frame.height - config.edge_clearance);
    let offsets = distribute_slots(&slots, span)?;

    for i in 1..offsets.len() {
        if offsets[i] - offsets[i - 1] <= EPSILON {
            return Err(GeometryError::OutOfOrder {
                instance: DocumentId::new(class, i + 1),
                offset: offsets[i],
                previous: offsets[i - 1],
            });
        }
    }

    Ok(offsets
        .into_iter()
        .zip(slots)
        .enumerate()
        .map(|(i, (offset, slot))| {
            let index = i + 1;
            let profile = request
                .profile
                .as_ref()
                .and_then(|p| p.for_index(index))
                .map(str::to_string);
            instance(
                DocumentId::new(class, index),
                offset,
                slot.is_some(),
                profile,
                frame,
                config,
            )
        })
        .collect())
}

/// Offset of an automatically placed lock
///
/// `lock_height` is measured in frame coordinates. When its footprint does
/// not fit between the edge clearances the lock is centred instead.
fn auto_lock_offset(frame: &FrameConfig, config: &GeometryConfig) -> f64 {
    let centre = frame.height / 2.0;
    if config.center_lock {
        return centre;
    }
    let offset = frame.orientation.mirror(config.lock_height, frame.height);
    let half = config.footprint(ComponentClass::Lock, 1) / 2.0;
    let fits = offset - half >= config.edge_clearance - EPSILON
        && offset + half <= frame.height - config.edge_clearance + EPSILON;
    if fits {
        offset
    } else {
        debug!(
            lock_height = config.lock_height,
            height = frame.height,
            "lock height does not fit, centring lock"
        );
        centre
    }
}

fn place_lock(lock: &LockRequest, frame: &FrameConfig, config: &GeometryConfig) -> ComponentInstance {
    let offset = match lock.position {
        Some(position) => position,
        None => auto_lock_offset(frame, config),
    };
    instance(
        DocumentId::new(ComponentClass::Lock, 1),
        offset,
        lock.position.is_some(),
        lock.profile.clone(),
        frame,
        config,
    )
}

fn check_bounds(instances: &[ComponentInstance], height: f64) -> Result<(), GeometryError> {
    for inst in instances {
        let half = inst.half_length();
        let overhang = (half - inst.offset).max(inst.offset + half - height);
        if overhang > EPSILON {
            return Err(GeometryError::OutOfBounds {
                instance: inst.id,
                offset: inst.offset,
                overhang,
            });
        }
    }
    Ok(())
}

/// Every pair of components must keep `min_clearance` between footprints
///
/// With `separate_jambs` set, pairs on opposite jambs are not compared.
fn check_collisions(instances: &[ComponentInstance], config: &GeometryConfig) -> Result<(), GeometryError> {
    for (i, a) in instances.iter().enumerate() {
        for b in &instances[i + 1..] {
            if config.separate_jambs && !a.class().shares_jamb(b.class()) {
                continue;
            }
            let required = a.half_length() + b.half_length() + config.min_clearance;
            let distance = (a.offset - b.offset).abs();
            if required - distance > EPSILON {
                return Err(GeometryError::CollisionDetected {
                    first: a.id,
                    second: b.id,
                    overlap: required - distance,
                });
            }
        }
    }
    Ok(())
}
