//! Linear expressions over solver variables.
//!
//! An [`Expression`] is an ordered list of weighted [`Term`]s plus a
//! constant. The arithmetic operators build expressions directly, so a
//! layout rule reads like `left.clone() + width.clone() * 0.5 - 10.0`.

use std::ops::{Add, Div, Mul, Neg, Sub};

use smallvec::SmallVec;

use crate::Variable;

/// A variable scaled by a coefficient.
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub variable: Variable,
    pub coefficient: f64,
}

impl Term {
    /// Create a new term.
    pub fn new(variable: Variable, coefficient: f64) -> Self {
        Self {
            variable,
            coefficient,
        }
    }

    /// Evaluate the term with the variable's current value.
    pub fn value(&self) -> f64 {
        self.variable.value() * self.coefficient
    }
}

impl From<Variable> for Term {
    fn from(variable: Variable) -> Self {
        Term::new(variable, 1.0)
    }
}

impl From<&Variable> for Term {
    fn from(variable: &Variable) -> Self {
        Term::new(variable.clone(), 1.0)
    }
}

/// A linear expression: `constant + Σ(coefficient * variable)`.
///
/// Terms are kept in insertion order and are not merged, so the same
/// variable may appear more than once. The solver folds duplicates when
/// it converts the expression into a tableau row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expression {
    terms: SmallVec<[Term; 4]>,
    pub constant: f64,
}

impl Expression {
    /// Create an expression from terms and a constant.
    pub fn new(terms: impl IntoIterator<Item = Term>, constant: f64) -> Self {
        Self {
            terms: terms.into_iter().collect(),
            constant,
        }
    }

    /// Create a constant expression.
    pub fn from_constant(value: f64) -> Self {
        Self {
            terms: SmallVec::new(),
            constant: value,
        }
    }

    /// Create an expression from a single term.
    pub fn from_term(term: Term) -> Self {
        let mut terms = SmallVec::new();
        terms.push(term);
        Self {
            terms,
            constant: 0.0,
        }
    }

    /// Create an expression from a single variable.
    pub fn from_variable(variable: Variable) -> Self {
        Self::from_term(Term::from(variable))
    }

    /// Append a term to the expression.
    pub fn add_term(&mut self, variable: Variable, coefficient: f64) {
        self.terms.push(Term::new(variable, coefficient));
    }

    /// The terms in insertion order.
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Whether the expression has no variable terms.
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluate the expression with the variables' current values.
    pub fn value(&self) -> f64 {
        self.terms.iter().map(Term::value).sum::<f64>() + self.constant
    }

    fn scaled(mut self, factor: f64) -> Self {
        self.constant *= factor;
        for term in &mut self.terms {
            term.coefficient *= factor;
        }
        self
    }
}

impl From<f64> for Expression {
    fn from(value: f64) -> Self {
        Expression::from_constant(value)
    }
}

impl From<Variable> for Expression {
    fn from(variable: Variable) -> Self {
        Expression::from_variable(variable)
    }
}

impl From<&Variable> for Expression {
    fn from(variable: &Variable) -> Self {
        Expression::from_variable(variable.clone())
    }
}

impl From<Term> for Expression {
    fn from(term: Term) -> Self {
        Expression::from_term(term)
    }
}

// Expression arithmetic

impl<T: Into<Expression>> Add<T> for Expression {
    type Output = Expression;

    fn add(mut self, rhs: T) -> Expression {
        let rhs = rhs.into();
        self.constant += rhs.constant;
        self.terms.extend(rhs.terms);
        self
    }
}

impl<T: Into<Expression>> Sub<T> for Expression {
    type Output = Expression;

    fn sub(self, rhs: T) -> Expression {
        let rhs: Expression = rhs.into();
        self + (-rhs)
    }
}

impl Mul<f64> for Expression {
    type Output = Expression;

    fn mul(self, rhs: f64) -> Expression {
        self.scaled(rhs)
    }
}

impl Div<f64> for Expression {
    type Output = Expression;

    fn div(self, rhs: f64) -> Expression {
        self.scaled(1.0 / rhs)
    }
}

impl Neg for Expression {
    type Output = Expression;

    fn neg(self) -> Expression {
        self.scaled(-1.0)
    }
}

// Term arithmetic

impl<T: Into<Expression>> Add<T> for Term {
    type Output = Expression;

    fn add(self, rhs: T) -> Expression {
        Expression::from(self) + rhs
    }
}

impl<T: Into<Expression>> Sub<T> for Term {
    type Output = Expression;

    fn sub(self, rhs: T) -> Expression {
        Expression::from(self) - rhs
    }
}

impl Mul<f64> for Term {
    type Output = Term;

    fn mul(mut self, rhs: f64) -> Term {
        self.coefficient *= rhs;
        self
    }
}

impl Div<f64> for Term {
    type Output = Term;

    fn div(mut self, rhs: f64) -> Term {
        self.coefficient /= rhs;
        self
    }
}

impl Neg for Term {
    type Output = Term;

    fn neg(mut self) -> Term {
        self.coefficient = -self.coefficient;
        self
    }
}

// Variable arithmetic

impl<T: Into<Expression>> Add<T> for Variable {
    type Output = Expression;

    fn add(self, rhs: T) -> Expression {
        Expression::from(self) + rhs
    }
}

impl<T: Into<Expression>> Sub<T> for Variable {
    type Output = Expression;

    fn sub(self, rhs: T) -> Expression {
        Expression::from(self) - rhs
    }
}

impl Mul<f64> for Variable {
    type Output = Term;

    fn mul(self, rhs: f64) -> Term {
        Term::new(self, rhs)
    }
}

impl Div<f64> for Variable {
    type Output = Term;

    fn div(self, rhs: f64) -> Term {
        Term::new(self, 1.0 / rhs)
    }
}

impl Neg for Variable {
    type Output = Term;

    fn neg(self) -> Term {
        Term::new(self, -1.0)
    }
}

// Scalar on the left

impl Mul<Variable> for f64 {
    type Output = Term;

    fn mul(self, rhs: Variable) -> Term {
        rhs * self
    }
}

impl Mul<Term> for f64 {
    type Output = Term;

    fn mul(self, rhs: Term) -> Term {
        rhs * self
    }
}

impl Mul<Expression> for f64 {
    type Output = Expression;

    fn mul(self, rhs: Expression) -> Expression {
        rhs * self
    }
}

impl Add<Variable> for f64 {
    type Output = Expression;

    fn add(self, rhs: Variable) -> Expression {
        rhs + self
    }
}

impl Add<Term> for f64 {
    type Output = Expression;

    fn add(self, rhs: Term) -> Expression {
        rhs + self
    }
}

impl Add<Expression> for f64 {
    type Output = Expression;

    fn add(self, rhs: Expression) -> Expression {
        rhs + self
    }
}

impl Sub<Variable> for f64 {
    type Output = Expression;

    fn sub(self, rhs: Variable) -> Expression {
        Expression::from(self) - rhs
    }
}

impl Sub<Term> for f64 {
    type Output = Expression;

    fn sub(self, rhs: Term) -> Expression {
        Expression::from(self) - rhs
    }
}

impl Sub<Expression> for f64 {
    type Output = Expression;

    fn sub(self, rhs: Expression) -> Expression {
        Expression::from(self) - rhs
    }
}
