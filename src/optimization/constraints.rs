//! Constraint metadata for geometry parameter vectors.
//!
//! One [`Constraint`] describes one vector dimension: a human-readable
//! label, the category it is grouped under, whether the quantity is
//! dimensional, and optional bounds. The set is created alongside the
//! owning objective's dimension layout and only ever mutated to attach
//! externally-supplied bounds.

use serde::{Deserialize, Serialize};

/// Whether a dimension carries a physical length unit or is a pure ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintKind {
    Dimensional,
    Dimensionless,
}

/// Static metadata for one geometry-vector dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// Grouping label, e.g. "Hole size" or "Bore length".
    pub category: String,
    /// Display name for this dimension.
    pub name: String,
    pub kind: ConstraintKind,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl Constraint {
    pub fn new(category: impl Into<String>, name: impl Into<String>, kind: ConstraintKind) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
            kind,
            lower: None,
            upper: None,
        }
    }

    pub fn with_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.lower = Some(lower);
        self.upper = Some(upper);
        self
    }
}

/// Ordered constraint metadata for a whole parameter vector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSet {
    constraints: Vec<Constraint>,
}

impl ConstraintSet {
    pub fn new(constraints: Vec<Constraint>) -> Self {
        Self { constraints }
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn push(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Append another set's entries in order (merged-objective
    /// concatenation).
    pub fn extend(&mut self, other: ConstraintSet) {
        self.constraints.extend(other.constraints);
    }

    pub fn get(&self, index: usize) -> Option<&Constraint> {
        self.constraints.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter()
    }

    /// Category names in first-appearance order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for c in &self.constraints {
            if !seen.contains(&c.category.as_str()) {
                seen.push(c.category.as_str());
            }
        }
        seen
    }

    /// Attach an externally-supplied lower bound to one dimension.
    pub fn set_lower(&mut self, index: usize, value: f64) {
        if let Some(c) = self.constraints.get_mut(index) {
            c.lower = Some(value);
        }
    }

    /// Attach an externally-supplied upper bound to one dimension.
    pub fn set_upper(&mut self, index: usize, value: f64) {
        if let Some(c) = self.constraints.get_mut(index) {
            c.upper = Some(value);
        }
    }

    /// Lower bounds per dimension, 0.0 where none has been attached.
    pub fn lower_bounds(&self) -> Vec<f64> {
        self.constraints
            .iter()
            .map(|c| c.lower.unwrap_or(0.0))
            .collect()
    }

    /// Upper bounds per dimension, 0.0 where none has been attached.
    pub fn upper_bounds(&self) -> Vec<f64> {
        self.constraints
            .iter()
            .map(|c| c.upper.unwrap_or(0.0))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hole_constraints() -> ConstraintSet {
        ConstraintSet::new(vec![
            Constraint::new("Hole size", "Hole 1 diameter", ConstraintKind::Dimensional)
                .with_bounds(0.002, 0.012),
            Constraint::new("Hole size", "Hole 2 diameter", ConstraintKind::Dimensional),
        ])
    }

    #[test]
    fn unset_bounds_fall_back_to_zero() {
        let set = hole_constraints();
        assert_eq!(set.lower_bounds(), vec![0.002, 0.0]);
        assert_eq!(set.upper_bounds(), vec![0.012, 0.0]);
    }

    #[test]
    fn concatenation_preserves_order() {
        let mut set = hole_constraints();
        set.extend(ConstraintSet::new(vec![Constraint::new(
            "Bore length",
            "Bore length",
            ConstraintKind::Dimensional,
        )
        .with_bounds(0.2, 0.6)]));
        assert_eq!(set.len(), 3);
        assert_eq!(set.get(2).unwrap().category, "Bore length");
        assert_eq!(set.categories(), vec!["Hole size", "Bore length"]);
    }

    #[test]
    fn attaching_bounds_updates_queries() {
        let mut set = hole_constraints();
        set.set_lower(1, 0.003);
        set.set_upper(1, 0.010);
        assert_eq!(set.lower_bounds()[1], 0.003);
        assert_eq!(set.upper_bounds()[1], 0.010);
    }
}
