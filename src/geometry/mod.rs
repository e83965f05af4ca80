//! Frame geometry solver
//!
//! Places hinges, the lock and mounting points along the frame height. Each
//! class is placed independently: pinned positions are kept, free positions
//! are spread evenly between their neighbours using the kasuari constraint
//! solver. The result is then checked for ordering, bounds and clearance.

mod config;
mod error;
mod placement;
mod solver;
mod types;

pub use config::GeometryConfig;
pub use error::{DimensionRule, GeometryError, OrderProblem};
pub use placement::{solve, validate, FrameLayout};
pub use solver::{distribute_slots, Anchor, SolverError, SpacingSolver};
pub use types::{
    ComponentClass, ComponentInstance, ComponentRequest, DocumentId, FrameConfig, FramePrograms,
    InvalidDocumentId, LockRequest, MachineOffset, Orientation, PlacementMode, ProfileAssignment,
    Window,
};
