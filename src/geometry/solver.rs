//! Constraint solver integration for component spacing
//!
//! Wraps the kasuari Cassowary solver. Each free component slot is a solver
//! variable; pinned slots are fixed with required equalities and every run of
//! free slots between two anchors shares one gap variable, which yields even
//! spacing.

use std::collections::HashMap;
use std::ops::Range;

use kasuari::{
    Constraint, Solver as KasuariSolver, Strength, Variable as KasuariVariable,
    WeightedRelation::*,
};
use thiserror::Error;

/// Solved values are snapped to this resolution to hide floating point noise
const RESOLUTION: f64 = 1e-6;

/// Errors from the constraint solver
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("unsatisfiable spacing constraints: {0}")]
    Unsatisfiable(String),

    #[error("internal solver error: {0}")]
    Internal(String),
}

/// End of a run of free slots
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anchor {
    /// Fixed coordinate, such as the edge of the usable span
    Edge(f64),
    /// Another slot, usually a pinned one
    Slot(usize),
}

/// Evenly distributes slots between anchors
pub struct SpacingSolver {
    solver: KasuariSolver,
    slots: Vec<KasuariVariable>,
}

impl SpacingSolver {
    pub fn new(count: usize) -> Self {
        Self {
            solver: KasuariSolver::new(),
            slots: (0..count).map(|_| KasuariVariable::new()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn slot(&self, index: usize) -> Result<KasuariVariable, SolverError> {
        self.slots.get(index).copied().ok_or_else(|| {
            SolverError::Internal(format!("slot {} out of range ({} slots)", index, self.slots.len()))
        })
    }

    fn add(&mut self, constraint: Constraint, desc: &str) -> Result<(), SolverError> {
        self.solver
            .add_constraint(constraint)
            .map_err(|e| match e {
                kasuari::AddConstraintError::UnsatisfiableConstraint => {
                    SolverError::Unsatisfiable(desc.to_string())
                }
                kasuari::AddConstraintError::DuplicateConstraint => {
                    SolverError::Internal(format!("duplicate constraint: {}", desc))
                }
                kasuari::AddConstraintError::InternalSolverError(msg) => {
                    SolverError::Internal(format!("{} ({})", msg, desc))
                }
            })
    }

    /// Fix a slot at a coordinate
    pub fn pin(&mut self, slot: usize, value: f64) -> Result<(), SolverError> {
        let var = self.slot(slot)?;
        self.add(
            var | EQ(Strength::REQUIRED) | value,
            &format!("slot {} = {}", slot, value),
        )
    }

    /// Space `free` slots evenly between `lo` and `hi`
    ///
    /// With `k` free slots the interval is cut into `k + 1` equal gaps.
    pub fn distribute(
        &mut self,
        free: Range<usize>,
        lo: Anchor,
        hi: Anchor,
    ) -> Result<(), SolverError> {
        if free.is_empty() {
            return Ok(());
        }
        let gap = KasuariVariable::new();

        let first = self.slot(free.start)?;
        let constraint = match lo {
            Anchor::Edge(c) => first | EQ(Strength::REQUIRED) | gap + c,
            Anchor::Slot(i) => first | EQ(Strength::REQUIRED) | self.slot(i)? + gap,
        };
        self.add(constraint, &format!("slot {} after {:?}", free.start, lo))?;

        for i in free.start + 1..free.end {
            let (current, previous) = (self.slot(i)?, self.slot(i - 1)?);
            self.add(
                current | EQ(Strength::REQUIRED) | previous + gap,
                &format!("slot {} after slot {}", i, i - 1),
            )?;
        }

        let last = self.slot(free.end - 1)?;
        let constraint = match hi {
            Anchor::Edge(c) => last + gap | EQ(Strength::REQUIRED) | c,
            Anchor::Slot(i) => last + gap | EQ(Strength::REQUIRED) | self.slot(i)?,
        };
        self.add(constraint, &format!("{:?} after slot {}", hi, free.end - 1))
    }

    /// Current value of every slot
    pub fn solve(&mut self) -> Vec<f64> {
        // Variables that stay at zero are never reported as changed
        let values: HashMap<KasuariVariable, f64> =
            self.solver.fetch_changes().iter().copied().collect();
        self.slots
            .iter()
            .map(|var| {
                let value = values.get(var).copied().unwrap_or(0.0);
                (value / RESOLUTION).round() * RESOLUTION
            })
            .collect()
    }
}

/// Place one value per slot: `Some` is pinned, `None` is spaced evenly
/// between its nearest pinned neighbours or the span ends
pub fn distribute_slots(slots: &[Option<f64>], span: (f64, f64)) -> Result<Vec<f64>, SolverError> {
    let mut solver = SpacingSolver::new(slots.len());
    let mut lo = Anchor::Edge(span.0);
    let mut run_start = 0;

    for (i, slot) in slots.iter().enumerate() {
        if let Some(value) = slot {
            solver.pin(i, *value)?;
            solver.distribute(run_start..i, lo, Anchor::Slot(i))?;
            lo = Anchor::Slot(i);
            run_start = i + 1;
        }
    }
    solver.distribute(run_start..slots.len(), lo, Anchor::Edge(span.1))?;

    Ok(solver.solve())
}
