//! Error types for the Trellis solver.

use thiserror::Error;

/// Errors reported by solver operations.
///
/// Every error is returned to the direct caller. The solver never retries
/// on its own; lowering a strength and trying again is a caller decision.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    #[error("The constraint has already been added to the solver")]
    DuplicateConstraint,

    #[error("The constraint is not in the solver")]
    UnknownConstraint,

    #[error("The variable already has an active edit")]
    DuplicateEditVariable,

    #[error("The variable has no active edit")]
    UnknownEditVariable,

    #[error("Edit variables cannot have required strength")]
    BadRequiredStrength,

    #[error("The constraint cannot be satisfied")]
    UnsatisfiableConstraint,

    #[error("Internal solver error: {0}")]
    InternalSolverError(&'static str),
}

impl SolverError {
    /// Whether this error indicates a defect in the solver rather than a
    /// problem with the caller's input.
    pub fn is_internal(&self) -> bool {
        matches!(self, SolverError::InternalSolverError(_))
    }
}
