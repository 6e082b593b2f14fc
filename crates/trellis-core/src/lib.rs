//! Core types for the Trellis constraint solver.
//!
//! This crate provides the value types consumed by `trellis-solver`:
//! - Variables with reference identity and a resolved value slot
//! - Linear expressions and terms, with operator sugar
//! - Strengths and the constraint objects built from them
//! - The shared tolerance used for every floating-point comparison
//! - Error types

pub mod constraint;
pub mod errors;
pub mod expression;
pub mod strength;
pub mod tolerance;
pub mod variable;

pub use constraint::*;
pub use errors::*;
pub use expression::*;
pub use strength::*;
pub use tolerance::*;
pub use variable::*;
