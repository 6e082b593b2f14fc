//! Solver variables.

use std::cell::Cell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

#[derive(Default)]
struct VariableData {
    name: Option<String>,
    value: Cell<f64>,
}

/// A real-valued unknown.
///
/// Variables are handles: cloning one yields another handle to the same
/// unknown, and equality and hashing follow that identity rather than the
/// name or value. The solver writes resolved values back through
/// [`Variable::set_value`] when `update_variables` is called.
#[derive(Clone, Default)]
pub struct Variable {
    data: Rc<VariableData>,
}

impl Variable {
    /// Create a new anonymous variable with value 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new variable with a debug name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            data: Rc::new(VariableData {
                name: Some(name.into()),
                value: Cell::new(0.0),
            }),
        }
    }

    /// The debug name, if one was given.
    pub fn name(&self) -> Option<&str> {
        self.data.name.as_deref()
    }

    /// The last value written by the solver (or by the caller).
    pub fn value(&self) -> f64 {
        self.data.value.get()
    }

    /// Overwrite the stored value.
    pub fn set_value(&self, value: f64) {
        self.data.value.set(value);
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Rc::as_ptr(&self.data), state);
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "Variable({}: {})", name, self.value()),
            None => write!(f, "Variable({:p}: {})", Rc::as_ptr(&self.data), self.value()),
        }
    }
}
