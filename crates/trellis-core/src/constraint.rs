//! Constraints: a normalized comparison against zero plus a strength.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::{near_zero, Expression, Strength, Term, Variable, EPSILON};

/// The relation of a constraint (equality or inequality).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Relation {
    LessOrEqual,
    Equal,
    GreaterOrEqual,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::LessOrEqual => write!(f, "<="),
            Relation::Equal => write!(f, "=="),
            Relation::GreaterOrEqual => write!(f, ">="),
        }
    }
}

#[derive(Debug)]
struct ConstraintData {
    expression: Expression,
    relation: Relation,
    strength: Strength,
}

/// A linear constraint `expression <relation> 0` with a strength.
///
/// Constraints are handles with reference identity: the solver tracks the
/// object that was added, so removing a constraint requires a clone of that
/// same handle. Two constraints built from identical expressions are
/// distinct.
#[derive(Clone)]
pub struct Constraint {
    data: Rc<ConstraintData>,
}

impl Constraint {
    /// Create a new constraint. The strength is clipped to the valid range.
    pub fn new(expression: Expression, relation: Relation, strength: Strength) -> Self {
        Self {
            data: Rc::new(ConstraintData {
                expression,
                relation,
                strength: strength.clip(),
            }),
        }
    }

    /// The normalized expression (compared against zero).
    pub fn expression(&self) -> &Expression {
        &self.data.expression
    }

    pub fn relation(&self) -> Relation {
        self.data.relation
    }

    pub fn strength(&self) -> Strength {
        self.data.strength
    }

    /// A new constraint with the same expression and relation but a
    /// different strength. The result has its own identity.
    pub fn with_strength(&self, strength: impl Into<Strength>) -> Constraint {
        Constraint::new(self.data.expression.clone(), self.data.relation, strength.into())
    }

    /// Check the constraint against the variables' current values.
    pub fn is_satisfied(&self) -> bool {
        let value = self.data.expression.value();
        match self.data.relation {
            Relation::LessOrEqual => value <= EPSILON,
            Relation::Equal => near_zero(value),
            Relation::GreaterOrEqual => value >= -EPSILON,
        }
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }
}

impl Eq for Constraint {}

impl Hash for Constraint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Rc::as_ptr(&self.data), state);
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("expression", &self.data.expression)
            .field("relation", &self.data.relation)
            .field("strength", &self.data.strength)
            .finish()
    }
}

impl Expression {
    fn relate(self, relation: Relation, rhs: impl Into<Expression>) -> Constraint {
        Constraint::new(self - rhs, relation, Strength::REQUIRED)
    }

    /// Build the required constraint `self == rhs`.
    pub fn equal_to(self, rhs: impl Into<Expression>) -> Constraint {
        self.relate(Relation::Equal, rhs)
    }

    /// Build the required constraint `self <= rhs`.
    pub fn less_than_or_equal_to(self, rhs: impl Into<Expression>) -> Constraint {
        self.relate(Relation::LessOrEqual, rhs)
    }

    /// Build the required constraint `self >= rhs`.
    pub fn greater_than_or_equal_to(self, rhs: impl Into<Expression>) -> Constraint {
        self.relate(Relation::GreaterOrEqual, rhs)
    }
}

impl Variable {
    /// Build the required constraint `self == rhs`.
    pub fn equal_to(&self, rhs: impl Into<Expression>) -> Constraint {
        Expression::from(self).equal_to(rhs)
    }

    /// Build the required constraint `self <= rhs`.
    pub fn less_than_or_equal_to(&self, rhs: impl Into<Expression>) -> Constraint {
        Expression::from(self).less_than_or_equal_to(rhs)
    }

    /// Build the required constraint `self >= rhs`.
    pub fn greater_than_or_equal_to(&self, rhs: impl Into<Expression>) -> Constraint {
        Expression::from(self).greater_than_or_equal_to(rhs)
    }
}

impl Term {
    pub fn equal_to(self, rhs: impl Into<Expression>) -> Constraint {
        Expression::from(self).equal_to(rhs)
    }

    pub fn less_than_or_equal_to(self, rhs: impl Into<Expression>) -> Constraint {
        Expression::from(self).less_than_or_equal_to(rhs)
    }

    pub fn greater_than_or_equal_to(self, rhs: impl Into<Expression>) -> Constraint {
        Expression::from(self).greater_than_or_equal_to(rhs)
    }
}
