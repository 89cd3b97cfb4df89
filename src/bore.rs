//! Bore-length-adjustment policies.
//!
//! When an optimizer moves a bore-length parameter, the interior bore
//! points may have to move with it. The four policies here translate a
//! single "new bore length" scalar into bore-point updates while
//! preserving different invariants. They are the only code path allowed
//! to reposition bore points in response to a length change.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::Instrument;

/// Minimum axial spacing between adjacent bore points (m).
pub const MIN_POINT_SPACING: f64 = 1.0e-4;

/// Strategy for moving bore points when the bore length changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoreLengthAdjuster {
    /// Move only the terminal bore point; nudge colliding interior
    /// points upward. Diameters are untouched.
    #[default]
    MoveBottom,
    /// Shift the whole bell section (from the start of the longest
    /// inter-point segment) by the length change, compressing points
    /// under extreme shrinkage.
    PreserveBell,
    /// Like move-bottom, but recompute moved diameters from the existing
    /// bore profile so the taper angle is approximately preserved.
    PreserveTaper,
    /// Strict variant of preserve-taper: refuses to move interior points
    /// at or beyond the new terminus, failing with a descriptive error
    /// instead. For geometries where the lower bore is physically fixed.
    PreserveBore,
}

impl BoreLengthAdjuster {
    /// Apply the policy, setting the instrument's bore length to
    /// `new_length`.
    ///
    /// # Errors
    ///
    /// Every variant fails with [`Error::InvalidGeometry`] on a profile
    /// of fewer than two points. Beyond that, only
    /// [`BoreLengthAdjuster::PreserveBore`] can fail, with
    /// [`Error::BoreProfileViolation`] naming the offending points.
    pub fn apply(&self, instrument: &mut Instrument, new_length: f64) -> Result<()> {
        instrument.recompute();
        if instrument.bore_points.len() < 2 {
            return Err(Error::InvalidGeometry(
                "bore profile needs at least two points".into(),
            ));
        }
        match self {
            BoreLengthAdjuster::MoveBottom => {
                move_bottom(instrument, new_length, false);
                Ok(())
            }
            BoreLengthAdjuster::PreserveBell => {
                preserve_bell(instrument, new_length);
                Ok(())
            }
            BoreLengthAdjuster::PreserveTaper => {
                move_bottom(instrument, new_length, true);
                Ok(())
            }
            BoreLengthAdjuster::PreserveBore => preserve_bore(instrument, new_length),
        }
    }
}

/// Move the terminal point to `new_length`, then nudge any interior
/// point that would sit at or beyond its lower neighbour upward, point
/// by point from the terminus inward. With `retaper` set, moved points
/// (terminal included) get diameters re-interpolated from the original
/// profile.
fn move_bottom(instrument: &mut Instrument, new_length: f64, retaper: bool) {
    let profile = instrument.clone();
    let points = &mut instrument.bore_points;
    let last = points.len() - 1;

    points[last].position = new_length;
    if retaper {
        points[last].diameter = profile.interpolate_bore_diameter(new_length);
    }

    // Cascade upward: each point must clear the one below it.
    let mut ceiling = new_length - MIN_POINT_SPACING;
    for i in (1..last).rev() {
        if points[i].position > ceiling {
            points[i].position = ceiling;
            if retaper {
                points[i].diameter = profile.interpolate_bore_diameter(ceiling);
            }
        }
        ceiling = points[i].position - MIN_POINT_SPACING;
    }
    instrument.recompute();
}

/// Shift the bell section so its shape rides along with the new length.
fn preserve_bell(instrument: &mut Instrument, new_length: f64) {
    let points = &mut instrument.bore_points;
    let last = points.len() - 1;
    let delta = new_length - points[last].position;

    // Start of the longest inter-point segment; ties resolve to the
    // last segment scanned.
    let mut bell_index = 0;
    let mut longest = f64::NEG_INFINITY;
    for i in 0..last {
        let segment = points[i + 1].position - points[i].position;
        if segment >= longest {
            longest = segment;
            bell_index = i;
        }
    }

    for point in points.iter_mut().skip(bell_index) {
        point.position += delta;
    }

    // Compress rather than reorder anything the shift pushed into its
    // predecessor.
    for i in 1..points.len() {
        let floor = points[i - 1].position + MIN_POINT_SPACING;
        if points[i].position < floor {
            points[i].position = floor;
        }
    }
    instrument.recompute();
}

/// Strict policy: interior points at or beyond the new terminus are an
/// error, never silently migrated.
fn preserve_bore(instrument: &mut Instrument, new_length: f64) -> Result<()> {
    let last = instrument.bore_points.len() - 1;
    let offending: Vec<f64> = instrument.bore_points[..last]
        .iter()
        .map(|p| p.position)
        .filter(|&pos| pos >= new_length)
        .collect();
    if !offending.is_empty() {
        return Err(Error::BoreProfileViolation {
            positions: offending,
            requested: new_length,
        });
    }

    let diameter = instrument.interpolate_bore_diameter(new_length);
    let terminal = &mut instrument.bore_points[last];
    terminal.position = new_length;
    terminal.diameter = diameter;
    instrument.recompute();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BorePoint;
    use approx::assert_relative_eq;

    fn instrument_with_positions(positions: &[f64]) -> Instrument {
        Instrument::new(
            "bore",
            positions
                .iter()
                .map(|&p| BorePoint::new(p, 0.019))
                .collect(),
            vec![],
        )
    }

    fn positions(instrument: &Instrument) -> Vec<f64> {
        instrument.bore_points.iter().map(|p| p.position).collect()
    }

    #[test]
    fn move_bottom_simple_shrink() {
        let mut instrument = instrument_with_positions(&[0.0, 10.0, 20.0]);
        BoreLengthAdjuster::MoveBottom
            .apply(&mut instrument, 15.0)
            .unwrap();
        assert_eq!(positions(&instrument), vec![0.0, 10.0, 15.0]);
    }

    #[test]
    fn move_bottom_nudges_colliding_interior_points() {
        let mut instrument = instrument_with_positions(&[0.0, 10.0, 20.0, 30.0]);
        BoreLengthAdjuster::MoveBottom
            .apply(&mut instrument, 15.0)
            .unwrap();
        let got = positions(&instrument);
        assert_relative_eq!(got[3], 15.0);
        assert_relative_eq!(got[2], 15.0 - MIN_POINT_SPACING);
        // Point at 10 is already below the nudged point, so untouched.
        assert_relative_eq!(got[1], 10.0);
        assert_relative_eq!(got[0], 0.0);
    }

    #[test]
    fn move_bottom_leaves_diameters_alone() {
        let mut instrument = Instrument::new(
            "taper",
            vec![
                BorePoint::new(0.0, 0.020),
                BorePoint::new(10.0, 0.015),
                BorePoint::new(20.0, 0.010),
            ],
            vec![],
        );
        BoreLengthAdjuster::MoveBottom
            .apply(&mut instrument, 15.0)
            .unwrap();
        let diameters: Vec<f64> = instrument.bore_points.iter().map(|p| p.diameter).collect();
        assert_eq!(diameters, vec![0.020, 0.015, 0.010]);
    }

    #[test]
    fn preserve_bell_shifts_the_bell_section() {
        // Longest segment is 10..30, so the bell starts at 10.
        let mut instrument = instrument_with_positions(&[0.0, 5.0, 10.0, 30.0, 35.0]);
        BoreLengthAdjuster::PreserveBell
            .apply(&mut instrument, 40.0)
            .unwrap();
        assert_eq!(positions(&instrument), vec![0.0, 5.0, 15.0, 35.0, 40.0]);
    }

    #[test]
    fn preserve_bell_tie_goes_to_the_later_segment() {
        // Segments 0..10 and 10..20 tie; the later one wins, so only
        // the points from 10 onward shift.
        let mut instrument = instrument_with_positions(&[0.0, 10.0, 20.0]);
        BoreLengthAdjuster::PreserveBell
            .apply(&mut instrument, 25.0)
            .unwrap();
        assert_eq!(positions(&instrument), vec![0.0, 15.0, 25.0]);
    }

    #[test]
    fn preserve_bell_compresses_under_extreme_shrinkage() {
        let mut instrument = instrument_with_positions(&[0.0, 5.0, 10.0, 30.0]);
        BoreLengthAdjuster::PreserveBell
            .apply(&mut instrument, 8.0)
            .unwrap();
        let got = positions(&instrument);
        // Points stay strictly ordered with minimum spacing.
        for pair in got.windows(2) {
            assert!(pair[1] - pair[0] >= MIN_POINT_SPACING - 1e-12);
        }
        assert_relative_eq!(*got.last().unwrap(), 8.0);
    }

    #[test]
    fn preserve_taper_recomputes_moved_diameters() {
        let mut instrument = Instrument::new(
            "taper",
            vec![
                BorePoint::new(0.0, 0.020),
                BorePoint::new(10.0, 0.015),
                BorePoint::new(20.0, 0.010),
            ],
            vec![],
        );
        BoreLengthAdjuster::PreserveTaper
            .apply(&mut instrument, 15.0)
            .unwrap();
        let terminal = *instrument.bore_points.last().unwrap();
        assert_relative_eq!(terminal.position, 15.0);
        // Interpolated halfway between 0.015 and 0.010.
        assert_relative_eq!(terminal.diameter, 0.0125);
    }

    #[test]
    fn preserve_taper_extrapolates_on_extension() {
        let mut instrument = Instrument::new(
            "taper",
            vec![BorePoint::new(0.0, 0.020), BorePoint::new(10.0, 0.010)],
            vec![],
        );
        BoreLengthAdjuster::PreserveTaper
            .apply(&mut instrument, 15.0)
            .unwrap();
        let terminal = *instrument.bore_points.last().unwrap();
        assert_relative_eq!(terminal.position, 15.0);
        assert_relative_eq!(terminal.diameter, 0.005);
    }

    #[test]
    fn degenerate_profiles_are_rejected_by_every_policy() {
        for adjuster in [
            BoreLengthAdjuster::MoveBottom,
            BoreLengthAdjuster::PreserveBell,
            BoreLengthAdjuster::PreserveTaper,
            BoreLengthAdjuster::PreserveBore,
        ] {
            let mut instrument = instrument_with_positions(&[0.0]);
            let err = adjuster.apply(&mut instrument, 15.0).unwrap_err();
            assert!(matches!(err, Error::InvalidGeometry(_)));
        }
    }

    #[test]
    fn preserve_bore_rejects_trapped_interior_points() {
        let mut instrument = instrument_with_positions(&[0.0, 10.0, 20.0, 30.0]);
        let err = BoreLengthAdjuster::PreserveBore
            .apply(&mut instrument, 15.0)
            .unwrap_err();
        match err {
            Error::BoreProfileViolation {
                positions: offenders,
                requested,
            } => {
                assert_eq!(offenders, vec![20.0]);
                assert_relative_eq!(requested, 15.0);
            }
            other => panic!("expected BoreProfileViolation, got {other}"),
        }
        // Geometry untouched on failure.
        assert_eq!(positions(&instrument), vec![0.0, 10.0, 20.0, 30.0]);
    }

    #[test]
    fn preserve_bore_moves_only_the_terminal_point() {
        let mut instrument = Instrument::new(
            "bore",
            vec![
                BorePoint::new(0.0, 0.019),
                BorePoint::new(10.0, 0.019),
                BorePoint::new(20.0, 0.016),
                BorePoint::new(30.0, 0.010),
            ],
            vec![],
        );
        BoreLengthAdjuster::PreserveBore
            .apply(&mut instrument, 25.0)
            .unwrap();
        let got = positions(&instrument);
        assert_eq!(&got[..3], &[0.0, 10.0, 20.0]);
        assert_relative_eq!(got[3], 25.0);
        // Diameter interpolated on the 20..30 segment.
        assert_relative_eq!(instrument.bore_points[3].diameter, 0.013);
    }
}
