//! Concrete geometry mappings.
//!
//! A representative set of [`GeometryMapping`] implementations covering
//! the framework's seams: a univariate bore-length mapping routed
//! through a length-adjustment policy, a per-hole diameter mapping, and
//! a combined length-plus-hole-position mapping that overrides the
//! lower-bound validation hook. Larger optimizations compose these
//! through [`crate::optimization::merged::MergedMapping`].

use crate::bore::BoreLengthAdjuster;
use crate::error::{Error, Result};
use crate::geometry::Instrument;
use crate::optimization::constraints::{Constraint, ConstraintKind, ConstraintSet};
use crate::optimization::dispatcher::OptimizerKind;
use crate::optimization::objective::GeometryMapping;

/// One dimension: the bore length, applied through a length-adjustment
/// policy.
pub struct BoreLengthMapping {
    adjuster: BoreLengthAdjuster,
    bounds: Option<(f64, f64)>,
}

impl BoreLengthMapping {
    pub fn new(adjuster: BoreLengthAdjuster) -> Self {
        Self {
            adjuster,
            bounds: None,
        }
    }

    /// Attach default length bounds (m).
    pub fn with_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.bounds = Some((lower, upper));
        self
    }
}

impl GeometryMapping for BoreLengthMapping {
    fn dimensions(&self) -> usize {
        1
    }

    fn read(&self, instrument: &Instrument) -> Vec<f64> {
        vec![instrument.bore_length()]
    }

    fn write(&self, instrument: &mut Instrument, point: &[f64]) -> Result<()> {
        self.adjuster.apply(instrument, point[0])
    }

    fn constraints(&self) -> ConstraintSet {
        let mut constraint =
            Constraint::new("Bore length", "Bore length", ConstraintKind::Dimensional);
        if let Some((lower, upper)) = self.bounds {
            constraint = constraint.with_bounds(lower, upper);
        }
        ConstraintSet::new(vec![constraint])
    }

    fn optimizer_kind(&self) -> OptimizerKind {
        OptimizerKind::Brent
    }
}

/// One dimension per tone-hole diameter, top to bottom.
pub struct HoleSizeMapping {
    hole_count: usize,
    bounds: Option<(f64, f64)>,
}

impl HoleSizeMapping {
    pub fn new(hole_count: usize) -> Self {
        Self {
            hole_count,
            bounds: None,
        }
    }

    pub fn for_instrument(instrument: &Instrument) -> Self {
        Self::new(instrument.holes.len())
    }

    /// Attach the same default diameter bounds (m) to every hole.
    pub fn with_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.bounds = Some((lower, upper));
        self
    }
}

impl GeometryMapping for HoleSizeMapping {
    fn dimensions(&self) -> usize {
        self.hole_count
    }

    fn read(&self, instrument: &Instrument) -> Vec<f64> {
        instrument.holes.iter().map(|h| h.diameter).collect()
    }

    fn write(&self, instrument: &mut Instrument, point: &[f64]) -> Result<()> {
        if instrument.holes.len() != self.hole_count {
            return Err(Error::DimensionMismatch {
                expected: self.hole_count,
                actual: instrument.holes.len(),
            });
        }
        for (hole, &diameter) in instrument.holes.iter_mut().zip(point.iter()) {
            hole.diameter = diameter;
        }
        Ok(())
    }

    fn constraints(&self) -> ConstraintSet {
        ConstraintSet::new(
            (0..self.hole_count)
                .map(|i| {
                    let mut constraint = Constraint::new(
                        "Hole size",
                        format!("Hole {} diameter", i + 1),
                        ConstraintKind::Dimensional,
                    );
                    if let Some((lower, upper)) = self.bounds {
                        constraint = constraint.with_bounds(lower, upper);
                    }
                    constraint
                })
                .collect(),
        )
    }
}

/// Bore length (dimension 0, policy-routed) plus one dimension per
/// tone-hole position.
///
/// Rejects lower bounds that would let the bore end above the lowest
/// tone hole: the bore-length lower bound must clear the lowest hole by
/// at least `clearance`.
pub struct HolePositionMapping {
    adjuster: BoreLengthAdjuster,
    hole_count: usize,
    /// Minimum distance between the lowest hole and the bore end (m).
    clearance: f64,
}

impl HolePositionMapping {
    pub fn new(adjuster: BoreLengthAdjuster, hole_count: usize, clearance: f64) -> Self {
        Self {
            adjuster,
            hole_count,
            clearance,
        }
    }
}

impl GeometryMapping for HolePositionMapping {
    fn dimensions(&self) -> usize {
        1 + self.hole_count
    }

    fn read(&self, instrument: &Instrument) -> Vec<f64> {
        let mut point = Vec::with_capacity(self.dimensions());
        point.push(instrument.bore_length());
        point.extend(instrument.holes.iter().map(|h| h.position));
        point
    }

    fn write(&self, instrument: &mut Instrument, point: &[f64]) -> Result<()> {
        if instrument.holes.len() != self.hole_count {
            return Err(Error::DimensionMismatch {
                expected: self.hole_count,
                actual: instrument.holes.len(),
            });
        }
        for (hole, &position) in instrument.holes.iter_mut().zip(point[1..].iter()) {
            hole.position = position;
        }
        self.adjuster.apply(instrument, point[0])
    }

    fn constraints(&self) -> ConstraintSet {
        let mut constraints = ConstraintSet::new(vec![Constraint::new(
            "Bore length",
            "Bore length",
            ConstraintKind::Dimensional,
        )]);
        for i in 0..self.hole_count {
            constraints.push(Constraint::new(
                "Hole position",
                format!("Hole {} position", i + 1),
                ConstraintKind::Dimensional,
            ));
        }
        constraints
    }

    fn validate_lower_bounds(&self, instrument: &Instrument, bounds: &[f64]) -> Result<()> {
        if let Some(lowest) = instrument.lowest_hole_position() {
            let floor = lowest + self.clearance;
            if bounds[0] < floor {
                return Err(Error::InvalidBound(format!(
                    "bore-length lower bound {} is below the lowest tone hole at {} (clearance {})",
                    bounds[0], lowest, self.clearance
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BorePoint, ToneHole};
    use crate::optimization::objective::Objective;
    use crate::tuning::{Fingering, HalfWaveEvaluator};
    use approx::assert_relative_eq;

    fn flute() -> Instrument {
        Instrument::new(
            "flute",
            vec![
                BorePoint::new(0.0, 0.019),
                BorePoint::new(0.30, 0.019),
                BorePoint::new(0.60, 0.017),
            ],
            vec![
                ToneHole::new("h1", 0.25, 0.008, 0.004),
                ToneHole::new("h2", 0.35, 0.008, 0.004),
            ],
        )
    }

    #[test]
    fn bore_length_round_trip() {
        let mapping = BoreLengthMapping::new(BoreLengthAdjuster::MoveBottom);
        let mut instrument = flute();
        assert_eq!(mapping.read(&instrument), vec![0.60]);
        mapping.write(&mut instrument, &[0.55]).unwrap();
        assert_relative_eq!(instrument.bore_length(), 0.55);
        assert_eq!(mapping.optimizer_kind(), OptimizerKind::Brent);
    }

    #[test]
    fn bore_length_routes_through_the_policy() {
        let mapping = BoreLengthMapping::new(BoreLengthAdjuster::PreserveBore);
        let mut instrument = flute();
        // Shrinking past the interior point at 0.30 violates the policy.
        let err = mapping.write(&mut instrument, &[0.25]).unwrap_err();
        assert!(matches!(err, Error::BoreProfileViolation { .. }));
    }

    #[test]
    fn bore_length_default_bounds_reach_the_objective() {
        let mapping = BoreLengthMapping::new(BoreLengthAdjuster::MoveBottom).with_bounds(0.4, 0.8);
        let objective = Objective::new(
            Box::new(mapping),
            flute(),
            vec![Fingering::new("D", 280.0, vec![false, false])],
            HalfWaveEvaluator::default(),
        );
        assert_eq!(objective.lower_bounds(), &[0.4]);
        assert_eq!(objective.upper_bounds(), &[0.8]);
    }

    #[test]
    fn hole_sizes_map_one_dimension_per_hole() {
        let instrument = flute();
        let mapping = HoleSizeMapping::for_instrument(&instrument).with_bounds(0.002, 0.012);
        assert_eq!(mapping.dimensions(), 2);
        assert_eq!(mapping.read(&instrument), vec![0.008, 0.008]);
        let constraints = mapping.constraints();
        assert_eq!(constraints.lower_bounds(), vec![0.002, 0.002]);

        let mut instrument = instrument;
        mapping.write(&mut instrument, &[0.006, 0.010]).unwrap();
        assert_eq!(instrument.holes[0].diameter, 0.006);
        assert_eq!(instrument.holes[1].diameter, 0.010);
    }

    #[test]
    fn hole_size_write_rejects_a_mismatched_instrument() {
        let mapping = HoleSizeMapping::new(5);
        let mut instrument = flute();
        let err = mapping
            .write(&mut instrument, &[0.006, 0.006, 0.006, 0.006, 0.006])
            .unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { expected: 5, .. }));
    }

    #[test]
    fn hole_positions_carry_the_bore_length_in_dimension_zero() {
        let mapping = HolePositionMapping::new(BoreLengthAdjuster::MoveBottom, 2, 0.01);
        let mut instrument = flute();
        assert_eq!(mapping.read(&instrument), vec![0.60, 0.25, 0.35]);

        mapping.write(&mut instrument, &[0.58, 0.24, 0.36]).unwrap();
        assert_relative_eq!(instrument.bore_length(), 0.58);
        assert_relative_eq!(instrument.holes[0].position, 0.24);
        assert_relative_eq!(instrument.holes[1].position, 0.36);
    }

    #[test]
    fn bore_length_bound_must_clear_the_lowest_hole() {
        let mapping = HolePositionMapping::new(BoreLengthAdjuster::MoveBottom, 2, 0.01);
        let instrument = flute();
        // Lowest hole sits at 0.35, so the floor is 0.36.
        let err = mapping
            .validate_lower_bounds(&instrument, &[0.30, 0.1, 0.1])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidBound(_)));
        assert!(mapping
            .validate_lower_bounds(&instrument, &[0.36, 0.1, 0.1])
            .is_ok());
    }

    #[test]
    fn objective_bound_setter_invokes_the_hook() {
        let mapping = HolePositionMapping::new(BoreLengthAdjuster::MoveBottom, 2, 0.01);
        let mut objective = Objective::new(
            Box::new(mapping),
            flute(),
            vec![Fingering::new("D", 280.0, vec![false, false])],
            HalfWaveEvaluator::default(),
        );
        assert!(objective.set_lower_bounds(&[0.30, 0.1, 0.1]).is_err());
        assert!(objective.set_lower_bounds(&[0.40, 0.1, 0.1]).is_ok());
    }
}
