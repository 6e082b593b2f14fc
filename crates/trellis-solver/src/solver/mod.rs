//! Cassowary constraint solver implementation.
//!
//! This is an implementation of the Cassowary linear constraint solving algorithm,
//! as described in "The Cassowary Linear Arithmetic Constraint Solving Algorithm"
//! by Greg J. Badros and Alan Borning.
//!
//! The tableau is kept in a basic feasible, optimal state between calls. Adding
//! or removing a constraint pivots only the rows that mention the symbols
//! involved, and edit suggestions shift row constants and repair feasibility
//! with the dual simplex method instead of solving from scratch.
//!
//! Pivot selection follows Bland's rule. The entering symbol is the eligible
//! column with the lowest symbol id, and ratio ties are broken by the lowest
//! symbol id, with rows made only of dummy symbols winning ties when a marker
//! is pivoted out.

mod edit;

use indexmap::IndexMap;
use log::{debug, trace};
use trellis_core::{
    approx_eq, is_negative, is_positive, near_zero, Constraint, Expression, Relation,
    SolverError, Strength, Variable, EPSILON,
};

use crate::symbol::SymbolTable;
use crate::{Row, Symbol};

use edit::EditInfo;

/// Upper bound on the pivots of a single optimization pass.
const PIVOT_LIMIT: usize = 1 << 16;

/// The symbols a constraint introduced into the tableau.
#[derive(Debug, Clone, Copy)]
struct Tag {
    /// Slack, error or dummy symbol used to locate the constraint later
    marker: Symbol,
    /// Second error symbol for non-required constraints
    other: Option<Symbol>,
}

#[derive(Debug, Clone, Copy)]
struct VarData {
    symbol: Symbol,
    /// Number of live constraint terms referencing the variable
    refs: usize,
}

/// Which objective row an optimization pass minimizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Objective {
    Primary,
    Artificial,
}

/// A pivot candidate with its ratio, used for deterministic tie-breaks.
#[derive(Debug, Clone, Copy)]
struct Pick {
    ratio: f64,
    symbol: Symbol,
    dummies: bool,
}

impl Pick {
    fn new(ratio: f64, symbol: Symbol) -> Self {
        Self {
            ratio,
            symbol,
            dummies: false,
        }
    }

    fn beats(&self, best: &Option<Pick>) -> bool {
        let Some(best) = best else {
            return true;
        };
        if self.ratio < best.ratio - EPSILON {
            return true;
        }
        if !approx_eq(self.ratio, best.ratio) {
            return false;
        }
        if self.dummies != best.dummies {
            return self.dummies;
        }
        self.symbol < best.symbol
    }
}

/// Tableau state saved before an insertion that may have to be undone.
struct Snapshot {
    rows: IndexMap<Symbol, Row>,
    objective: Row,
    infeasible_rows: Vec<Symbol>,
}

/// The Cassowary constraint solver.
#[derive(Debug, Default)]
pub struct Solver {
    /// Allocator for fresh symbols
    symbols: SymbolTable,
    /// The objective function row
    objective: Row,
    /// Artificial objective used while inserting a row without a subject
    artificial: Option<Row>,
    /// The tableau rows, keyed by their basic symbol
    rows: IndexMap<Symbol, Row>,
    /// Mapping from constraints to their marker and other symbols
    constraints: IndexMap<Constraint, Tag>,
    /// External symbols of the variables referenced by live constraints
    vars: IndexMap<Variable, VarData>,
    /// Active edit sessions
    edits: IndexMap<Variable, EditInfo>,
    /// Restricted rows that may have gone negative since the last dual pass
    infeasible_rows: Vec<Symbol>,
}

impl Solver {
    /// Create a new, empty solver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a constraint to the solver.
    ///
    /// On `UnsatisfiableConstraint` the tableau is left as it was before the
    /// call.
    pub fn add_constraint(&mut self, constraint: &Constraint) -> Result<(), SolverError> {
        if self.constraints.contains_key(constraint) {
            return Err(SolverError::DuplicateConstraint);
        }

        let (mut row, tag) = self.create_row(constraint);
        let mut subject = choose_subject(&row, &tag);

        // A row of nothing but dummies is redundant when its constant is zero
        // and contradicts the required equalities already present otherwise.
        if subject.is_none() && row.all_dummies() {
            if !near_zero(row.constant()) {
                self.release_variables(constraint.expression());
                debug!("unsatisfiable constraint {:?}", constraint);
                return Err(SolverError::UnsatisfiableConstraint);
            }
            subject = Some(tag.marker);
        }

        match subject {
            Some(subject) => {
                // Restricted rows never hold external columns, so this
                // substitution cannot break feasibility.
                row.solve_for(subject)?;
                self.substitute(subject, &row);
                self.rows.insert(subject, row);
            }
            None => {
                let snapshot = self.snapshot();
                match self.add_with_artificial_variable(&row) {
                    Ok(true) => {}
                    Ok(false) => {
                        return Err(self.rollback(
                            snapshot,
                            constraint,
                            &tag,
                            SolverError::UnsatisfiableConstraint,
                        ))
                    }
                    Err(err) => return Err(self.rollback(snapshot, constraint, &tag, err)),
                }
            }
        }

        self.constraints.insert(constraint.clone(), tag);

        self.optimize(Objective::Primary)?;
        self.dual_optimize()?;

        debug!(
            "added {} constraint ({} rows, {} constraints)",
            constraint.relation(),
            self.rows.len(),
            self.constraints.len()
        );
        Ok(())
    }

    /// Add several constraints, stopping at the first error.
    pub fn add_constraints<'a, I>(&mut self, constraints: I) -> Result<(), SolverError>
    where
        I: IntoIterator<Item = &'a Constraint>,
    {
        for constraint in constraints {
            self.add_constraint(constraint)?;
        }
        Ok(())
    }

    /// Remove a constraint from the solver.
    pub fn remove_constraint(&mut self, constraint: &Constraint) -> Result<(), SolverError> {
        let tag = self
            .constraints
            .shift_remove(constraint)
            .ok_or(SolverError::UnknownConstraint)?;

        // The error weights leave the objective before any pivot, otherwise
        // the substitutions below would carry them into other rows.
        self.remove_constraint_effects(constraint.strength(), &tag);

        // If the marker is basic, drop its row. Otherwise pivot the marker
        // into the basis first and drop the resulting row.
        if self.rows.shift_remove(&tag.marker).is_none() {
            let (leaving, mut row) = self
                .marker_leaving_row(tag.marker)
                .ok_or(SolverError::InternalSolverError("Failed to find leaving row"))?;
            trace!("pivot: {:?} enters, {:?} leaves", tag.marker, leaving);
            row.solve_for_symbols(leaving, tag.marker)?;
            self.substitute(tag.marker, &row);
        }

        if let Some(other) = tag.other {
            self.release_symbol(other);
        }

        self.optimize(Objective::Primary)?;
        self.dual_optimize()?;
        self.release_variables(constraint.expression());

        debug!(
            "removed {} constraint ({} rows, {} constraints)",
            constraint.relation(),
            self.rows.len(),
            self.constraints.len()
        );
        Ok(())
    }

    /// Test whether a constraint has been added to the solver.
    pub fn has_constraint(&self, constraint: &Constraint) -> bool {
        self.constraints.contains_key(constraint)
    }

    /// Number of constraints currently in the solver, edit constraints included.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Write the resolved value of every tracked variable back to it.
    pub fn update_variables(&self) {
        for (variable, data) in &self.vars {
            variable.set_value(self.symbol_value(data.symbol));
        }
    }

    /// The resolved value of a variable, read from the tableau.
    ///
    /// Variables the solver does not track resolve to 0.
    pub fn value_of(&self, variable: &Variable) -> f64 {
        self.vars
            .get(variable)
            .map_or(0.0, |data| self.symbol_value(data.symbol))
    }

    /// Whether every restricted basic row has a non-negative constant.
    pub fn is_feasible(&self) -> bool {
        self.rows
            .iter()
            .all(|(symbol, row)| !symbol.is_restricted() || !is_negative(row.constant()))
    }

    /// The basic rows of the tableau, keyed by their basic symbol.
    pub fn tableau(&self) -> impl Iterator<Item = (Symbol, &Row)> + '_ {
        self.rows.iter().map(|(&symbol, row)| (symbol, row))
    }

    /// Reset the solver to the empty starting condition.
    ///
    /// Symbol ids keep counting up so nothing minted before the reset can be
    /// mistaken for something minted after it.
    pub fn reset(&mut self) {
        self.objective = Row::default();
        self.artificial = None;
        self.rows.clear();
        self.constraints.clear();
        self.vars.clear();
        self.edits.clear();
        self.infeasible_rows.clear();
    }

    fn symbol_value(&self, symbol: Symbol) -> f64 {
        self.rows.get(&symbol).map_or(0.0, Row::constant)
    }

    /// Get the external symbol for a variable, registering it if needed.
    fn var_symbol(&mut self, variable: &Variable) -> Symbol {
        let symbols = &mut self.symbols;
        let data = self
            .vars
            .entry(variable.clone())
            .or_insert_with(|| VarData {
                symbol: symbols.external(),
                refs: 0,
            });
        data.refs += 1;
        data.symbol
    }

    /// Drop the references an expression holds on its variables.
    ///
    /// A variable nothing refers to any more loses its symbol. If that symbol
    /// is basic its row goes too: a basic symbol appears in no other row, so
    /// the row constrains nothing but the variable itself.
    fn release_variables(&mut self, expression: &Expression) {
        for term in expression.terms() {
            if near_zero(term.coefficient) {
                continue;
            }
            let released = match self.vars.get_mut(&term.variable) {
                Some(data) => {
                    data.refs = data.refs.saturating_sub(1);
                    (data.refs == 0).then_some(data.symbol)
                }
                None => None,
            };
            if let Some(symbol) = released {
                self.vars.shift_remove(&term.variable);
                self.rows.shift_remove(&symbol);
            }
        }
    }

    /// Remove every trace of a constraint's secondary error symbol.
    fn release_symbol(&mut self, symbol: Symbol) {
        if self.rows.shift_remove(&symbol).is_none() {
            for row in self.rows.values_mut() {
                row.remove(symbol);
            }
            self.objective.remove(symbol);
        }
    }

    /// Create a new row for the given constraint.
    ///
    /// Terms are converted to cells, with any basic variable replaced by its
    /// row. Slack, error and dummy symbols are added according to the relation
    /// and strength, and the sign is flipped if needed so the constant is
    /// non-negative.
    fn create_row(&mut self, constraint: &Constraint) -> (Row, Tag) {
        let expression = constraint.expression();
        let strength = constraint.strength();
        let mut row = Row::new(expression.constant);

        for term in expression.terms() {
            if near_zero(term.coefficient) {
                continue;
            }
            let symbol = self.var_symbol(&term.variable);
            match self.rows.get(&symbol) {
                Some(basic) => row.insert_row(basic, term.coefficient),
                None => row.insert_symbol(symbol, term.coefficient),
            }
        }

        let tag = match constraint.relation() {
            Relation::LessOrEqual | Relation::GreaterOrEqual => {
                let coeff = if constraint.relation() == Relation::LessOrEqual {
                    1.0
                } else {
                    -1.0
                };
                let slack = self.symbols.slack();
                row.insert_symbol(slack, coeff);
                if strength.is_required() {
                    Tag {
                        marker: slack,
                        other: None,
                    }
                } else {
                    let error = self.symbols.error();
                    row.insert_symbol(error, -coeff);
                    self.objective.insert_symbol(error, strength.value());
                    Tag {
                        marker: slack,
                        other: Some(error),
                    }
                }
            }
            Relation::Equal if strength.is_required() => {
                let dummy = self.symbols.dummy();
                row.insert_unit(dummy);
                Tag {
                    marker: dummy,
                    other: None,
                }
            }
            Relation::Equal => {
                // expression = plus - minus
                let plus = self.symbols.error();
                let minus = self.symbols.error();
                row.insert_symbol(plus, -1.0);
                row.insert_symbol(minus, 1.0);
                self.objective.insert_symbol(plus, strength.value());
                self.objective.insert_symbol(minus, strength.value());
                Tag {
                    marker: plus,
                    other: Some(minus),
                }
            }
        };

        if is_negative(row.constant()) {
            row.reverse_sign();
        }

        (row, tag)
    }

    /// Add a row that has no subject, using an artificial variable.
    ///
    /// Returns false if the row cannot be satisfied. The caller restores the
    /// tableau in that case.
    fn add_with_artificial_variable(&mut self, row: &Row) -> Result<bool, SolverError> {
        let art = self.symbols.slack();
        self.rows.insert(art, row.clone());
        self.artificial = Some(row.clone());

        // Only successful if the artificial objective is driven to zero.
        let optimized = self.optimize(Objective::Artificial);
        let residual = self.artificial.take().map_or(0.0, |artificial| artificial.constant());
        optimized?;
        let success = near_zero(residual);

        if let Some(mut row) = self.rows.shift_remove(&art) {
            if row.is_constant() {
                return Ok(success);
            }
            let Some(entering) = row.any_pivotable_symbol() else {
                return Ok(false);
            };
            row.solve_for_symbols(art, entering)?;
            self.substitute(entering, &row);
            self.rows.insert(entering, row);
        }

        for row in self.rows.values_mut() {
            row.remove(art);
        }
        self.objective.remove(art);
        Ok(success)
    }

    /// Substitute a symbol throughout the tableau and the objectives.
    fn substitute(&mut self, symbol: Symbol, row: &Row) {
        for (&basic, other) in self.rows.iter_mut() {
            other.substitute(symbol, row);
            if basic.is_restricted() && is_negative(other.constant()) {
                self.infeasible_rows.push(basic);
            }
        }
        self.objective.substitute(symbol, row);
        if let Some(artificial) = self.artificial.as_mut() {
            artificial.substitute(symbol, row);
        }
    }

    /// Minimize an objective with the primal simplex method.
    ///
    /// Assumes the tableau is feasible.
    fn optimize(&mut self, objective: Objective) -> Result<(), SolverError> {
        for _ in 0..PIVOT_LIMIT {
            let Some(entering) = self
                .objective_row(objective)
                .and_then(|row| entering_symbol(row))
            else {
                return Ok(());
            };

            // Both objectives are bounded below by zero, so a column with no
            // leaving row only carries rounding residue.
            let Some((leaving, mut row)) = self.leaving_row(entering) else {
                trace!("dropping residue {:?} from the objective", entering);
                if let Some(row) = self.objective_row(objective) {
                    row.remove(entering);
                }
                continue;
            };

            trace!("pivot: {:?} enters, {:?} leaves", entering, leaving);
            row.solve_for_symbols(leaving, entering)?;
            self.substitute(entering, &row);
            self.rows.insert(entering, row);
        }
        Err(SolverError::InternalSolverError("Pivot limit exceeded"))
    }

    fn objective_row(&mut self, objective: Objective) -> Option<&mut Row> {
        match objective {
            Objective::Primary => Some(&mut self.objective),
            Objective::Artificial => self.artificial.as_mut(),
        }
    }

    /// Restore feasibility with the dual simplex method.
    ///
    /// The objective must already be optimal. Each infeasible row is pivoted
    /// on the column that keeps the objective optimal.
    fn dual_optimize(&mut self) -> Result<(), SolverError> {
        let mut pivots = 0;
        while let Some(leaving) = self.infeasible_rows.pop() {
            let Some(row) = self.rows.get(&leaving) else {
                continue;
            };
            if !is_negative(row.constant()) {
                continue;
            }
            let entering = self.dual_entering_symbol(row).ok_or_else(|| {
                SolverError::InternalSolverError("Dual optimize found no entering symbol")
            })?;

            pivots += 1;
            if pivots > PIVOT_LIMIT {
                return Err(SolverError::InternalSolverError("Pivot limit exceeded"));
            }
            if let Some(mut row) = self.rows.shift_remove(&leaving) {
                trace!("dual pivot: {:?} enters, {:?} leaves", entering, leaving);
                row.solve_for_symbols(leaving, entering)?;
                self.substitute(entering, &row);
                self.rows.insert(entering, row);
            }
        }
        Ok(())
    }

    /// Find the column to enter the basis for an infeasible row.
    ///
    /// Among the non-dummy symbols with a positive coefficient in the row, the
    /// one with the smallest objective-coefficient ratio wins.
    fn dual_entering_symbol(&self, row: &Row) -> Option<Symbol> {
        let mut best: Option<Pick> = None;
        for (symbol, coeff) in row.cells() {
            if symbol.is_dummy() || !is_positive(coeff) {
                continue;
            }
            let pick = Pick::new(self.objective.coefficient_for(symbol) / coeff, symbol);
            if pick.beats(&best) {
                best = Some(pick);
            }
        }
        best.map(|pick| pick.symbol)
    }

    /// Take the row that should leave the basis when `entering` enters.
    ///
    /// Standard ratio test over restricted rows in which `entering` has a
    /// negative coefficient. `None` when no such row exists.
    fn leaving_row(&mut self, entering: Symbol) -> Option<(Symbol, Row)> {
        let mut best: Option<Pick> = None;
        for (&symbol, row) in &self.rows {
            if !symbol.is_restricted() {
                continue;
            }
            let coeff = row.coefficient_for(entering);
            if !is_negative(coeff) {
                continue;
            }
            let pick = Pick::new(-row.constant() / coeff, symbol);
            if pick.beats(&best) {
                best = Some(pick);
            }
        }
        let symbol = best?.symbol;
        self.rows.shift_remove(&symbol).map(|row| (symbol, row))
    }

    /// Take the row to pivot on when removing a non-basic marker.
    ///
    /// Candidates in order of precedence:
    /// 1. restricted rows with a negative marker coefficient, smallest `-constant / coefficient`
    /// 2. restricted rows with a positive marker coefficient, smallest `constant / coefficient`
    /// 3. the last unrestricted row containing the marker
    fn marker_leaving_row(&mut self, marker: Symbol) -> Option<(Symbol, Row)> {
        let mut first: Option<Pick> = None;
        let mut second: Option<Pick> = None;
        let mut third: Option<Symbol> = None;

        for (&symbol, row) in &self.rows {
            let coeff = row.coefficient_for(marker);
            if near_zero(coeff) {
                continue;
            }
            if symbol.is_external() {
                third = Some(symbol);
                continue;
            }
            let (ratio, slot) = if is_negative(coeff) {
                (-row.constant() / coeff, &mut first)
            } else {
                (row.constant() / coeff, &mut second)
            };
            let pick = Pick {
                ratio,
                symbol,
                dummies: row.all_dummies(),
            };
            if pick.beats(slot) {
                *slot = Some(pick);
            }
        }

        let symbol = first.or(second).map(|pick| pick.symbol).or(third)?;
        self.rows.shift_remove(&symbol).map(|row| (symbol, row))
    }

    /// Remove the effects of a constraint's error symbols on the objective.
    fn remove_constraint_effects(&mut self, strength: Strength, tag: &Tag) {
        for marker in [Some(tag.marker), tag.other].into_iter().flatten() {
            if marker.is_error() {
                self.remove_marker_effects(marker, strength);
            }
        }
    }

    fn remove_marker_effects(&mut self, marker: Symbol, strength: Strength) {
        match self.rows.get(&marker) {
            Some(row) => self.objective.insert_row(row, -strength.value()),
            None => self.objective.insert_symbol(marker, -strength.value()),
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            rows: self.rows.clone(),
            objective: self.objective.clone(),
            infeasible_rows: self.infeasible_rows.clone(),
        }
    }

    /// Undo a failed insertion and hand back the error to report.
    ///
    /// The snapshot is taken after the row was built, so the objective may
    /// still carry the new constraint's error weights.
    fn rollback(
        &mut self,
        snapshot: Snapshot,
        constraint: &Constraint,
        tag: &Tag,
        error: SolverError,
    ) -> SolverError {
        self.rows = snapshot.rows;
        self.objective = snapshot.objective;
        self.infeasible_rows = snapshot.infeasible_rows;
        self.artificial = None;
        for symbol in [Some(tag.marker), tag.other].into_iter().flatten() {
            self.objective.remove(symbol);
        }
        self.release_variables(constraint.expression());
        debug!("rolled back constraint {:?}: {}", constraint, error);
        error
    }
}

/// Choose the subject for solving a new row.
///
/// The first external symbol wins. Failing that, a slack or error symbol from
/// the tag with a negative coefficient, which keeps the row constant
/// non-negative once solved. `None` means an artificial variable is needed.
fn choose_subject(row: &Row, tag: &Tag) -> Option<Symbol> {
    if let Some((symbol, _)) = row.cells().find(|(symbol, _)| symbol.is_external()) {
        return Some(symbol);
    }
    [Some(tag.marker), tag.other]
        .into_iter()
        .flatten()
        .find(|symbol| symbol.is_pivotable() && is_negative(row.coefficient_for(*symbol)))
}

/// The lowest-id non-dummy symbol with a negative objective coefficient.
fn entering_symbol(objective: &Row) -> Option<Symbol> {
    objective
        .cells()
        .filter(|(symbol, coeff)| !symbol.is_dummy() && is_negative(*coeff))
        .map(|(symbol, _)| symbol)
        .min()
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::Priority;

    fn assert_near(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_lower_bound_then_pin() {
        let mut solver = Solver::new();
        let x = Variable::named("x");

        // 100 <= x
        solver
            .add_constraint(&Expression::from_constant(100.0).less_than_or_equal_to(&x))
            .unwrap();
        solver.update_variables();
        assert_near(x.value(), 100.0);

        solver.add_constraint(&x.equal_to(110.0)).unwrap();
        solver.update_variables();
        assert_near(x.value(), 110.0);
    }

    #[test]
    fn test_unsatisfiable_leaves_tableau_untouched() {
        let mut solver = Solver::new();
        let x = Variable::named("x");
        solver
            .add_constraint(&Expression::from_constant(100.0).less_than_or_equal_to(&x))
            .unwrap();
        solver.update_variables();
        let rows_before = solver.rows.clone();
        let objective_before = solver.objective.clone();

        let conflicting = x.equal_to(10.0);
        assert_eq!(
            solver.add_constraint(&conflicting),
            Err(SolverError::UnsatisfiableConstraint)
        );
        assert!(!solver.has_constraint(&conflicting));
        assert_eq!(solver.rows, rows_before);
        assert_eq!(solver.objective, objective_before);
        assert_eq!(solver.vars[&x].refs, 1);

        solver.update_variables();
        assert_near(x.value(), 100.0);
    }

    #[test]
    fn test_unsatisfiable_required_equalities() {
        let mut solver = Solver::new();
        let x = Variable::named("x");
        let y = Variable::named("y");
        solver.add_constraint(&x.equal_to(y.clone())).unwrap();
        solver.add_constraint(&x.equal_to(5.0)).unwrap();
        let result = solver.add_constraint(&y.equal_to(6.0));
        assert_eq!(result, Err(SolverError::UnsatisfiableConstraint));
        solver.update_variables();
        assert_near(x.value(), 5.0);
        assert_near(y.value(), 5.0);
    }

    #[test]
    fn test_redundant_equality_is_accepted() {
        let mut solver = Solver::new();
        let x = Variable::named("x");
        let y = Variable::named("y");
        solver.add_constraint(&x.equal_to(y.clone())).unwrap();
        solver.add_constraint(&x.equal_to(5.0)).unwrap();
        let redundant = y.equal_to(5.0);
        solver.add_constraint(&redundant).unwrap();
        assert!(solver.has_constraint(&redundant));
        solver.remove_constraint(&redundant).unwrap();
        solver.update_variables();
        assert_near(y.value(), 5.0);
    }

    #[test]
    fn test_two_equalities() {
        let mut solver = Solver::new();
        let x = Variable::named("x");
        let y = Variable::named("y");
        solver
            .add_constraint(&(x.clone() + y.clone()).equal_to(10.0))
            .unwrap();
        solver.add_constraint(&x.equal_to(y.clone() * 2.0)).unwrap();
        solver.update_variables();
        assert_near(x.value(), 20.0 / 3.0);
        assert_near(y.value(), 10.0 / 3.0);
    }

    #[test]
    fn test_strength_ordering() {
        let mut solver = Solver::new();
        let x = Variable::named("x");
        solver
            .add_constraint(&x.equal_to(100.0).with_strength(Strength::WEAK))
            .unwrap();
        solver
            .add_constraint(&x.equal_to(50.0).with_strength(Strength::STRONG))
            .unwrap();
        solver.update_variables();
        assert_near(x.value(), 50.0);
    }

    #[test]
    fn test_weak_preference_inside_required_bounds() {
        let mut solver = Solver::new();
        let x = Variable::named("x");
        solver.add_constraint(&x.greater_than_or_equal_to(50.0)).unwrap();
        solver
            .add_constraint(&x.equal_to(10.0).with_strength(Priority::Weak))
            .unwrap();
        solver.update_variables();
        assert_near(x.value(), 50.0);
    }

    #[test]
    fn test_removal_restores_previous_solution() {
        let mut solver = Solver::new();
        let x = Variable::named("x");
        solver
            .add_constraint(&x.equal_to(20.0).with_strength(Strength::WEAK))
            .unwrap();
        solver.update_variables();
        assert_near(x.value(), 20.0);

        let strong = x.equal_to(80.0).with_strength(Strength::STRONG);
        solver.add_constraint(&strong).unwrap();
        solver.update_variables();
        assert_near(x.value(), 80.0);

        solver.remove_constraint(&strong).unwrap();
        solver.update_variables();
        assert_near(x.value(), 20.0);
        assert!(solver.is_feasible());
    }

    #[test]
    fn test_remove_required_inequality() {
        let mut solver = Solver::new();
        let x = Variable::named("x");
        let floor = x.greater_than_or_equal_to(30.0);
        solver.add_constraint(&floor).unwrap();
        solver
            .add_constraint(&x.equal_to(10.0).with_strength(Strength::MEDIUM))
            .unwrap();
        solver.update_variables();
        assert_near(x.value(), 30.0);

        solver.remove_constraint(&floor).unwrap();
        solver.update_variables();
        assert_near(x.value(), 10.0);
    }

    #[test]
    fn test_duplicate_and_unknown_constraints() {
        let mut solver = Solver::new();
        let x = Variable::named("x");
        let c = x.equal_to(1.0);
        solver.add_constraint(&c).unwrap();
        assert_eq!(
            solver.add_constraint(&c),
            Err(SolverError::DuplicateConstraint)
        );
        solver.remove_constraint(&c).unwrap();
        assert_eq!(
            solver.remove_constraint(&c),
            Err(SolverError::UnknownConstraint)
        );
    }

    #[test]
    fn test_variable_released_with_last_constraint() {
        let mut solver = Solver::new();
        let x = Variable::named("x");
        let a = x.greater_than_or_equal_to(10.0);
        let b = (x.clone() + x.clone()).less_than_or_equal_to(100.0);
        solver.add_constraints([&a, &b]).unwrap();
        assert_eq!(solver.vars[&x].refs, 3);

        solver.remove_constraint(&b).unwrap();
        assert_eq!(solver.vars[&x].refs, 1);
        solver.remove_constraint(&a).unwrap();
        assert!(solver.vars.is_empty());
        assert!(solver.rows.is_empty());
        assert_eq!(solver.value_of(&x), 0.0);
    }

    #[test]
    fn test_non_basic_variable_reads_zero() {
        let mut solver = Solver::new();
        let x = Variable::named("x");
        let y = Variable::named("y");
        // x is chosen as the subject, y stays a free column
        solver.add_constraint(&x.equal_to(y.clone() + 5.0)).unwrap();
        assert_near(solver.value_of(&y), 0.0);
        assert_near(solver.value_of(&x), 5.0);
    }

    #[test]
    fn test_symbol_ids_are_not_reused() {
        let mut solver = Solver::new();
        let x = Variable::named("x");
        let c = x.equal_to(1.0);
        solver.add_constraint(&c).unwrap();
        let first = solver.vars[&x].symbol;
        solver.remove_constraint(&c).unwrap();
        solver.add_constraint(&x.equal_to(2.0)).unwrap();
        let second = solver.vars[&x].symbol;
        assert!(second.id() > first.id());
    }

    #[test]
    fn test_reset() {
        let mut solver = Solver::new();
        let x = Variable::named("x");
        let c = x.equal_to(3.0);
        solver.add_constraint(&c).unwrap();
        solver.add_edit_variable(&x, Strength::WEAK).unwrap();
        solver.reset();
        assert!(!solver.has_constraint(&c));
        assert!(!solver.has_edit_variable(&x));
        assert_eq!(solver.tableau().count(), 0);
        solver.add_constraint(&c).unwrap();
        assert_near(solver.value_of(&x), 3.0);
    }

    #[test]
    fn test_rows_never_hold_basic_symbols() {
        let mut solver = Solver::new();
        let vars: Vec<Variable> = (0..4).map(|i| Variable::named(format!("v{}", i))).collect();
        solver.add_constraint(&vars[0].greater_than_or_equal_to(0.0)).unwrap();
        solver
            .add_constraint(&vars[1].equal_to(vars[0].clone() + 10.0))
            .unwrap();
        solver
            .add_constraint(&(vars[2].clone() + vars[1].clone()).less_than_or_equal_to(100.0))
            .unwrap();
        solver
            .add_constraint(&vars[3].equal_to(vars[2].clone() * 0.5).with_strength(Strength::MEDIUM))
            .unwrap();

        for (_, row) in &solver.rows {
            for (symbol, _) in row.cells() {
                assert!(!solver.rows.contains_key(&symbol));
            }
        }
        for (symbol, _) in solver.objective.cells() {
            assert!(!solver.rows.contains_key(&symbol));
        }
    }

    #[test]
    fn test_pick_tie_breaks() {
        let mut table = SymbolTable::default();
        let a = table.slack();
        let b = table.slack();
        let low = Pick::new(1.0, b);
        assert!(low.beats(&None));
        assert!(Pick::new(0.5, b).beats(&Some(Pick::new(1.0, a))));
        assert!(Pick::new(1.0, a).beats(&Some(low)));
        assert!(!Pick::new(1.0 + 1e-12, b).beats(&Some(Pick::new(1.0, a))));
        let dummy_row = Pick {
            ratio: 1.0,
            symbol: b,
            dummies: true,
        };
        assert!(dummy_row.beats(&Some(Pick::new(1.0, a))));
    }

    #[test]
    fn test_entering_symbol_takes_lowest_id() {
        let mut table = SymbolTable::default();
        let dummy = table.dummy();
        let low = table.slack();
        let mid = table.error();
        let high = table.error();
        let mut objective = Row::new(0.0);
        objective.insert_symbol(high, -3.0);
        objective.insert_symbol(dummy, -5.0);
        objective.insert_symbol(mid, 2.0);
        objective.insert_symbol(low, -1.0);
        assert_eq!(entering_symbol(&objective), Some(low));
        objective.remove(low);
        assert_eq!(entering_symbol(&objective), Some(high));
    }

    #[test]
    fn test_optimize_drops_objective_residue() {
        let mut solver = Solver::new();
        let x = Variable::named("x");
        solver.add_constraint(&x.greater_than_or_equal_to(1.0)).unwrap();
        let stray = solver.symbols.slack();
        solver.objective.insert_symbol(stray, -2e-8);
        assert!(solver.optimize(Objective::Primary).is_ok());
        assert_eq!(solver.objective.coefficient_for(stray), 0.0);
        assert_near(solver.value_of(&x), 1.0);
    }

    #[test]
    fn test_degenerate_removal_terminates() {
        let mut solver = Solver::new();
        let v: Vec<Variable> = (0..4).map(|i| Variable::named(format!("v{}", i))).collect();
        let zero = |solver: &mut Solver| {
            solver
                .add_constraint(&(v[0].clone() * 0.0).less_than_or_equal_to(0.0))
                .unwrap();
        };

        solver
            .add_constraint(
                &(v[1].clone() + 2.0 * v[2].clone())
                    .less_than_or_equal_to(0.0)
                    .with_strength(Strength::MEDIUM),
            )
            .unwrap();
        zero(&mut solver);
        solver
            .add_constraint(&(v[3].clone() * 0.0).less_than_or_equal_to(0.0))
            .unwrap();
        zero(&mut solver);
        solver
            .add_constraint(
                &(-3.0 * v[1].clone() + v[2].clone())
                    .equal_to(0.0)
                    .with_strength(Strength::MEDIUM),
            )
            .unwrap();
        zero(&mut solver);
        solver.add_edit_variable(&v[2], Strength::STRONG).unwrap();
        zero(&mut solver);
        solver.add_edit_variable(&v[1], Strength::STRONG).unwrap();
        zero(&mut solver);
        let pin = (-v[2].clone() - 1.0).equal_to(0.0);
        solver.add_constraint(&pin).unwrap();
        zero(&mut solver);

        assert_eq!(solver.remove_constraint(&pin), Ok(()));
        assert!(solver.is_feasible());
        solver.update_variables();
        assert_near(v[1].value(), 0.0);
        assert_near(v[2].value(), 0.0);
    }

    #[test]
    fn test_remove_edit_with_objective_residue() {
        let mut solver = Solver::new();
        let v: Vec<Variable> = (0..4).map(|i| Variable::named(format!("v{}", i))).collect();
        solver
            .add_constraint(&(3.0 * v[2].clone() - v[0].clone()).less_than_or_equal_to(0.0))
            .unwrap();
        solver.add_edit_variable(&v[2], Strength::STRONG).unwrap();
        solver.add_edit_variable(&v[1], Strength::STRONG).unwrap();
        solver.add_constraint(&v[3].greater_than_or_equal_to(0.0)).unwrap();
        solver
            .add_constraint(
                &(v[2].clone() - 5.0 * v[0].clone())
                    .less_than_or_equal_to(0.0)
                    .with_strength(Strength::STRONG),
            )
            .unwrap();
        solver
            .add_constraint(&(v[0].clone() + v[3].clone()).less_than_or_equal_to(0.0))
            .unwrap();

        assert_eq!(solver.remove_edit_variable(&v[2]), Ok(()));
        assert!(solver.is_feasible());
        assert_eq!(solver.edit_count(), 1);
        solver.update_variables();
        assert!(3.0 * v[2].value() - v[0].value() <= 1e-6);
        assert!(v[0].value() + v[3].value() <= 1e-6);
        assert!(v[3].value() >= -1e-6);
    }

    #[test]
    fn test_restricted_rows_hold_no_external_columns() {
        let mut solver = Solver::new();
        let x = Variable::named("x");
        let y = Variable::named("y");
        solver.add_constraint(&(x.clone() + y.clone()).equal_to(10.0)).unwrap();
        solver.add_constraint(&x.greater_than_or_equal_to(2.0)).unwrap();
        solver
            .add_constraint(&y.less_than_or_equal_to(3.0).with_strength(Strength::WEAK))
            .unwrap();
        let bound = y.greater_than_or_equal_to(0.0);
        solver.add_constraint(&bound).unwrap();
        solver.remove_constraint(&bound).unwrap();

        for (symbol, row) in solver.tableau() {
            if symbol.is_restricted() {
                assert!(row.cells().all(|(column, _)| !column.is_external()));
            }
        }
        assert!(solver.objective.cells().all(|(column, _)| !column.is_external()));
    }
}
