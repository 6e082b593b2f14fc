//! Edit variables.
//!
//! An edit registers a non-required `variable == value` constraint once and
//! then moves its target by shifting row constants, so repeated suggestions
//! (dragging, animation) only touch the rows that depend on the edit's error
//! symbols.

use log::debug;
use trellis_core::{
    is_negative, near_zero, Constraint, Expression, Relation, SolverError, Strength, Variable,
};

use super::{Solver, Tag};

#[derive(Debug, Clone)]
pub(super) struct EditInfo {
    tag: Tag,
    constraint: Constraint,
    /// The last suggested value
    constant: f64,
}

impl Solver {
    /// Add an edit variable to the solver.
    ///
    /// The edit starts out holding the variable at its current value. Use
    /// [`Solver::suggest_value`] to move it afterwards.
    pub fn add_edit_variable(
        &mut self,
        variable: &Variable,
        strength: impl Into<Strength>,
    ) -> Result<(), SolverError> {
        if self.edits.contains_key(variable) {
            return Err(SolverError::DuplicateEditVariable);
        }
        let strength = strength.into().clip();
        if strength.is_required() {
            return Err(SolverError::BadRequiredStrength);
        }

        let current = variable.value();
        let constraint = Constraint::new(
            Expression::from(variable) - current,
            Relation::Equal,
            strength,
        );
        self.add_constraint(&constraint)?;

        let tag = *self
            .constraints
            .get(&constraint)
            .ok_or(SolverError::InternalSolverError("Edit constraint not in system"))?;
        self.edits.insert(
            variable.clone(),
            EditInfo {
                tag,
                constraint,
                constant: current,
            },
        );

        debug!("added edit variable {:?} at strength {}", variable, strength.value());
        Ok(())
    }

    /// Register an edit, replacing any edit the variable already has.
    pub fn set_edit_variable(
        &mut self,
        variable: &Variable,
        strength: impl Into<Strength>,
    ) -> Result<(), SolverError> {
        if self.has_edit_variable(variable) {
            self.remove_edit_variable(variable)?;
        }
        self.add_edit_variable(variable, strength)
    }

    /// Remove an edit variable from the solver.
    pub fn remove_edit_variable(&mut self, variable: &Variable) -> Result<(), SolverError> {
        let info = self
            .edits
            .shift_remove(variable)
            .ok_or(SolverError::UnknownEditVariable)?;
        self.remove_constraint(&info.constraint).map_err(|err| match err {
            SolverError::UnknownConstraint => {
                SolverError::InternalSolverError("Edit constraint not in system")
            }
            other => other,
        })?;
        debug!("removed edit variable {:?}", variable);
        Ok(())
    }

    /// Test whether an edit variable has been added to the solver.
    pub fn has_edit_variable(&self, variable: &Variable) -> bool {
        self.edits.contains_key(variable)
    }

    /// Number of active edit variables.
    pub fn edit_count(&self) -> usize {
        self.edits.len()
    }

    /// Suggest a value for the given edit variable.
    ///
    /// The change is applied to the rows holding the edit's error symbols
    /// (or depending on them) and feasibility is restored with the dual
    /// simplex method. Suggestions never fail as unsatisfiable: if required
    /// constraints pin the variable, it resolves to the nearest feasible value.
    pub fn suggest_value(&mut self, variable: &Variable, value: f64) -> Result<(), SolverError> {
        let info = self
            .edits
            .get_mut(variable)
            .ok_or(SolverError::UnknownEditVariable)?;
        let delta = value - info.constant;
        info.constant = value;
        let Tag { marker, other } = info.tag;

        if let Some(row) = self.rows.get_mut(&marker) {
            if is_negative(row.add(-delta)) {
                self.infeasible_rows.push(marker);
            }
        } else if let Some((other, row)) =
            other.and_then(|other| self.rows.get_mut(&other).map(|row| (other, row)))
        {
            if is_negative(row.add(delta)) {
                self.infeasible_rows.push(other);
            }
        } else {
            for (&symbol, row) in self.rows.iter_mut() {
                let coeff = row.coefficient_for(marker);
                if near_zero(coeff) {
                    continue;
                }
                if is_negative(row.add(delta * coeff)) && symbol.is_restricted() {
                    self.infeasible_rows.push(symbol);
                }
            }
        }

        self.dual_optimize()
    }
}
