//! Sparse tableau rows.

use indexmap::IndexMap;
use trellis_core::{near_zero, SolverError};

use crate::Symbol;

/// A row in the simplex tableau: `constant + Σ(coefficient * symbol)`.
///
/// When stored in the tableau under a basic symbol `b`, the row reads
/// `b = constant + Σ(coefficient * symbol)`. Cells keep insertion order so
/// that scans over a row are reproducible, and a cell whose coefficient
/// falls within the tolerance of zero is always dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    constant: f64,
    cells: IndexMap<Symbol, f64>,
}

impl Row {
    pub fn new(constant: f64) -> Self {
        Self {
            constant,
            cells: IndexMap::new(),
        }
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// The cells in insertion order.
    pub fn cells(&self) -> impl Iterator<Item = (Symbol, f64)> + '_ {
        self.cells.iter().map(|(&symbol, &coeff)| (symbol, coeff))
    }

    /// Whether the row has no symbols left.
    pub fn is_constant(&self) -> bool {
        self.cells.is_empty()
    }

    /// Add a value to the constant, returning the new constant.
    pub fn add(&mut self, value: f64) -> f64 {
        self.constant += value;
        self.constant
    }

    /// Merge a coefficient into the cell for `symbol`.
    pub fn insert_symbol(&mut self, symbol: Symbol, coefficient: f64) {
        let merged = self.coefficient_for(symbol) + coefficient;
        if near_zero(merged) {
            self.cells.shift_remove(&symbol);
        } else {
            self.cells.insert(symbol, merged);
        }
    }

    /// Merge `symbol` with a coefficient of one.
    pub fn insert_unit(&mut self, symbol: Symbol) {
        self.insert_symbol(symbol, 1.0);
    }

    /// Add `coefficient * other` into this row.
    pub fn insert_row(&mut self, other: &Row, coefficient: f64) {
        self.constant += other.constant * coefficient;
        for (&symbol, &coeff) in &other.cells {
            self.insert_symbol(symbol, coeff * coefficient);
        }
    }

    pub fn remove(&mut self, symbol: Symbol) {
        self.cells.shift_remove(&symbol);
    }

    pub fn reverse_sign(&mut self) {
        self.constant = -self.constant;
        for coeff in self.cells.values_mut() {
            *coeff = -*coeff;
        }
    }

    /// Solve the row for `symbol`.
    ///
    /// Turns `a * symbol + rest = 0` into `symbol = -rest / a`: the cell is
    /// removed and everything left is scaled by `-1 / a`. Fails if the symbol
    /// is not in the row.
    pub fn solve_for(&mut self, symbol: Symbol) -> Result<(), SolverError> {
        let coeff = self
            .cells
            .shift_remove(&symbol)
            .ok_or(SolverError::InternalSolverError("Solved for a symbol absent from the row"))?;
        let multiplier = -1.0 / coeff;
        self.constant *= multiplier;
        for c in self.cells.values_mut() {
            *c *= multiplier;
        }
        Ok(())
    }

    /// Re-solve a row for `lhs = ...` into one for `rhs = ...`.
    ///
    /// `lhs` must be absent from the row and `rhs` present.
    pub fn solve_for_symbols(&mut self, lhs: Symbol, rhs: Symbol) -> Result<(), SolverError> {
        self.insert_symbol(lhs, -1.0);
        self.solve_for(rhs)
    }

    pub fn coefficient_for(&self, symbol: Symbol) -> f64 {
        self.cells.get(&symbol).copied().unwrap_or(0.0)
    }

    /// Replace `symbol` with the expression held by `other`.
    ///
    /// Returns true when the symbol was present. No-op otherwise.
    pub fn substitute(&mut self, symbol: Symbol, other: &Row) -> bool {
        match self.cells.shift_remove(&symbol) {
            Some(coeff) => {
                self.insert_row(other, coeff);
                true
            }
            None => false,
        }
    }

    /// Whether every cell belongs to a dummy symbol.
    pub fn all_dummies(&self) -> bool {
        self.cells.keys().all(Symbol::is_dummy)
    }

    /// The first slack or error symbol in the row.
    pub fn any_pivotable_symbol(&self) -> Option<Symbol> {
        self.cells.keys().copied().find(Symbol::is_pivotable)
    }
}
