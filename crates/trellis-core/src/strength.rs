//! Constraint strengths.
//!
//! A strength packs three priority tiers into one weight:
//! `strong * 1_000_000 + medium * 1_000 + weak`, each tier clamped to
//! `[0, 1000]`. Required constraints sit above every representable
//! combination and are never traded off against anything.

/// Constraint strength.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Strength(pub f64);

impl Strength {
    pub const REQUIRED: Strength = Strength(1_001_001_000.0);
    pub const STRONG: Strength = Strength(1_000_000.0);
    pub const MEDIUM: Strength = Strength(1_000.0);
    pub const WEAK: Strength = Strength(1.0);

    /// Create a strength from its three tiers, scaled by `weight`.
    pub fn create(strong: f64, medium: f64, weak: f64, weight: f64) -> Self {
        let tier = |v: f64| (v * weight).clamp(0.0, 1000.0);
        Self(tier(strong) * 1_000_000.0 + tier(medium) * 1_000.0 + tier(weak))
    }

    /// Create a custom strength, clipped to the valid range.
    pub fn new(value: f64) -> Self {
        Self(value).clip()
    }

    /// Clamp this strength into `[0, REQUIRED]`.
    pub fn clip(self) -> Self {
        Self(self.0.clamp(0.0, Self::REQUIRED.0))
    }

    /// The numeric weight used in the objective function.
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Check if this is a required constraint.
    pub fn is_required(&self) -> bool {
        self.0 >= Self::REQUIRED.0
    }
}

impl Default for Strength {
    fn default() -> Self {
        Self::REQUIRED
    }
}

impl From<Priority> for Strength {
    fn from(priority: Priority) -> Self {
        match priority {
            Priority::Required => Strength::REQUIRED,
            Priority::High => Strength::STRONG,
            Priority::Medium => Strength::MEDIUM,
            Priority::Low | Priority::Weak => Strength::WEAK,
        }
    }
}

/// Coarse priority levels used by layout front-ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Priority {
    Weak = 1,
    Low = 250,
    Medium = 500,
    High = 750,
    Required = 1000,
}

impl Default for Priority {
    fn default() -> Self {
        Self::Required
    }
}
