//! Tableau symbols.

use std::cmp::Ordering;
use std::fmt;

/// The kind of a tableau unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// An external variable (the actual unknowns we're solving for)
    External,
    /// A slack variable (for inequality constraints)
    Slack,
    /// An error variable (for non-required constraints)
    Error,
    /// A dummy variable (for required equality constraints)
    Dummy,
}

/// An opaque tableau unknown.
///
/// Symbols are only minted by the solver's [`SymbolTable`]. Identity is the
/// id, which is never reused, so a symbol cannot alias one that was released
/// earlier. Ordering follows the id and is what every pivot tie-break uses.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol {
    id: usize,
    kind: SymbolKind,
}

impl Symbol {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    pub fn is_external(&self) -> bool {
        self.kind == SymbolKind::External
    }

    pub fn is_slack(&self) -> bool {
        self.kind == SymbolKind::Slack
    }

    pub fn is_error(&self) -> bool {
        self.kind == SymbolKind::Error
    }

    pub fn is_dummy(&self) -> bool {
        self.kind == SymbolKind::Dummy
    }

    /// Restricted symbols must stay non-negative; external ones are free.
    pub fn is_restricted(&self) -> bool {
        !self.is_external()
    }

    /// Slack and error symbols may enter the basis during optimization.
    pub fn is_pivotable(&self) -> bool {
        self.is_slack() || self.is_error()
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.kind {
            SymbolKind::External => 'v',
            SymbolKind::Slack => 's',
            SymbolKind::Error => 'e',
            SymbolKind::Dummy => 'd',
        };
        write!(f, "{}{}", prefix, self.id)
    }
}

/// Allocator for fresh symbols.
#[derive(Debug, Default)]
pub(crate) struct SymbolTable {
    next_id: usize,
}

impl SymbolTable {
    pub(crate) fn create(&mut self, kind: SymbolKind) -> Symbol {
        // Ids start at 1 and only grow, across resets too.
        self.next_id += 1;
        Symbol {
            id: self.next_id,
            kind,
        }
    }

    pub(crate) fn external(&mut self) -> Symbol {
        self.create(SymbolKind::External)
    }

    pub(crate) fn slack(&mut self) -> Symbol {
        self.create(SymbolKind::Slack)
    }

    pub(crate) fn error(&mut self) -> Symbol {
        self.create(SymbolKind::Error)
    }

    pub(crate) fn dummy(&mut self) -> Symbol {
        self.create(SymbolKind::Dummy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let mut table = SymbolTable::default();
        let a = table.external();
        let b = table.slack();
        let c = table.error();
        assert!(a < b && b < c);
        assert_ne!(a, b);
    }

    #[test]
    fn test_classification() {
        let mut table = SymbolTable::default();
        let v = table.external();
        let s = table.slack();
        let e = table.error();
        let d = table.dummy();
        assert!(!v.is_restricted());
        assert!(s.is_restricted() && s.is_pivotable());
        assert!(e.is_pivotable());
        assert!(d.is_restricted() && !d.is_pivotable());
        assert_eq!(d.kind(), SymbolKind::Dummy);
    }

    #[test]
    fn test_debug_format() {
        let mut table = SymbolTable::default();
        let s = table.slack();
        assert_eq!(format!("{:?}", s), "s1");
    }
}
