//! Incremental linear constraint solving.
//!
//! This crate implements:
//! - Cassowary simplex tableau with strength-weighted objectives
//! - Incremental constraint addition and removal
//! - Edit variables for cheap repeated value suggestions
//!
//! The value types it consumes (`Variable`, `Expression`, `Constraint`,
//! `Strength`) come from `trellis-core` and are re-exported here.

mod row;
mod solver;
mod symbol;

pub use row::Row;
pub use solver::Solver;
pub use symbol::{Symbol, SymbolKind};

pub use trellis_core::{
    near_zero, Constraint, Expression, Priority, Relation, SolverError, Strength, Term, Variable,
    EPSILON,
};
