//! Error types for the geometry solver

use std::fmt;

use thiserror::Error;

use super::solver::SolverError;
use super::types::{ComponentClass, DocumentId};

/// Rule a frame dimension broke
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DimensionRule {
    Finite,
    NonNegative,
    /// Door width must not exceed the frame width
    AtMostFrameWidth,
    AtLeast(f64),
    AtMost(f64),
}

impl fmt::Display for DimensionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimensionRule::Finite => f.write_str("must be finite"),
            DimensionRule::NonNegative => f.write_str("must not be negative"),
            DimensionRule::AtMostFrameWidth => f.write_str("must not exceed the frame width"),
            DimensionRule::AtLeast(min) => write!(f, "must be at least {}", min),
            DimensionRule::AtMost(max) => write!(f, "must be at most {}", max),
        }
    }
}

/// Why an entry of the machining order was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderProblem {
    /// Only hinges and the lock have a machining order
    NotOrderable,
    Duplicate,
    /// The component is not requested by the frame
    NotRequested,
}

impl fmt::Display for OrderProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderProblem::NotOrderable => f.write_str("only hinges and the lock can be ordered"),
            OrderProblem::Duplicate => f.write_str("is listed more than once"),
            OrderProblem::NotRequested => f.write_str("is not requested by the frame"),
        }
    }
}

/// Errors that can occur while placing components
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("invalid frame dimension {field} = {value}: {rule}")]
    InvalidFrameDimensions {
        field: &'static str,
        value: f64,
        rule: DimensionRule,
    },

    #[error("{requested} {class} components requested, at most {maximum} allowed")]
    ComponentCountExceeded {
        class: ComponentClass,
        requested: usize,
        maximum: usize,
    },

    /// Manual mode without a position for this instance
    #[error("{instance} is placed manually but has no position")]
    MissingPosition { instance: DocumentId },

    #[error("{class} request lists {positions} positions but a count of {count}")]
    CountMismatch {
        class: ComponentClass,
        count: usize,
        positions: usize,
    },

    #[error("{instance} at {offset} must come after the previous {} at {previous}", .instance.class)]
    OutOfOrder {
        instance: DocumentId,
        offset: f64,
        previous: f64,
    },

    #[error("{instance} at {offset} extends {overhang} beyond the frame")]
    OutOfBounds {
        instance: DocumentId,
        offset: f64,
        overhang: f64,
    },

    #[error("{first} and {second} collide, {overlap} short of the required clearance")]
    CollisionDetected {
        first: DocumentId,
        second: DocumentId,
        overlap: f64,
    },

    #[error("machining order entry {entry}: {problem}")]
    InvalidOrder {
        entry: DocumentId,
        problem: OrderProblem,
    },

    #[error("spacing solver error: {0}")]
    Solver(#[from] SolverError),
}

impl GeometryError {
    pub fn invalid_dimension(field: &'static str, value: f64, rule: DimensionRule) -> Self {
        Self::InvalidFrameDimensions { field, value, rule }
    }

    pub fn count_exceeded(class: ComponentClass, requested: usize) -> Self {
        Self::ComponentCountExceeded {
            class,
            requested,
            maximum: class.max_count(),
        }
    }

    /// Instances named by the error
    pub fn instances(&self) -> Vec<DocumentId> {
        match self {
            Self::MissingPosition { instance }
            | Self::OutOfOrder { instance, .. }
            | Self::OutOfBounds { instance, .. }
            | Self::InvalidOrder {
                entry: instance, ..
            } => vec![*instance],
            Self::CollisionDetected { first, second, .. } => vec![*first, *second],
            _ => Vec::new(),
        }
    }
}
