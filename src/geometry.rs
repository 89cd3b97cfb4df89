//! Instrument geometry: bore profile, tone holes, mouthpiece.
//!
//! The geometry is a mutable, interrelated model: bore points and tone
//! holes are kept sorted by axial position, and every mutating entry
//! point must be followed by [`Instrument::recompute`] so derived state
//! stays consistent.

use serde::{Deserialize, Serialize};

/// A position/diameter pair describing the bore profile at one axial
/// location. Positions and diameters are in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BorePoint {
    /// Distance from the top of the instrument (m).
    pub position: f64,
    /// Interior bore diameter at this position (m).
    pub diameter: f64,
}

impl BorePoint {
    pub fn new(position: f64, diameter: f64) -> Self {
        Self { position, diameter }
    }
}

/// A tone hole in the instrument body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneHole {
    pub name: String,
    /// Distance from the top of the instrument (m).
    pub position: f64,
    /// Hole diameter (m).
    pub diameter: f64,
    /// Chimney height through the wall (m).
    pub height: f64,
}

impl ToneHole {
    pub fn new(name: impl Into<String>, position: f64, diameter: f64, height: f64) -> Self {
        Self {
            name: name.into(),
            position,
            diameter,
            height,
        }
    }
}

/// Minimal mouthpiece description. The acoustic detail lives in the
/// external transfer-matrix model.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Mouthpiece {
    /// Position of the excitation reference plane (m).
    pub position: f64,
}

/// A parametric instrument geometry.
///
/// Bore points and tone holes are held sorted by position; the terminal
/// bore point defines the bore length. Only the bore-length-adjustment
/// policies in [`crate::bore`] may reposition bore points in response to
/// a length change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub name: String,
    pub mouthpiece: Mouthpiece,
    pub bore_points: Vec<BorePoint>,
    pub holes: Vec<ToneHole>,
}

impl Instrument {
    /// Create an instrument and establish the sorted invariant.
    pub fn new(
        name: impl Into<String>,
        bore_points: Vec<BorePoint>,
        holes: Vec<ToneHole>,
    ) -> Self {
        let mut instrument = Self {
            name: name.into(),
            mouthpiece: Mouthpiece::default(),
            bore_points,
            holes,
        };
        instrument.recompute();
        instrument
    }

    /// Recompute derived state after a mutation: restore the
    /// sorted-by-position ordering of bore points and tone holes.
    pub fn recompute(&mut self) {
        self.bore_points
            .sort_by(|a, b| a.position.total_cmp(&b.position));
        self.holes.sort_by(|a, b| a.position.total_cmp(&b.position));
    }

    /// Position of the terminal (bottom) bore point, i.e. the bore length.
    pub fn bore_length(&self) -> f64 {
        self.bore_points.last().map_or(0.0, |p| p.position)
    }

    /// Bore diameter at an arbitrary axial position, by linear
    /// interpolation inside the profile and linear extrapolation from
    /// the nearest segment beyond either end.
    pub fn interpolate_bore_diameter(&self, position: f64) -> f64 {
        let points = &self.bore_points;
        match points.len() {
            0 => 0.0,
            1 => points[0].diameter,
            _ => {
                // Segment whose span contains the position, or the end
                // segment for extrapolation.
                let seg = points
                    .windows(2)
                    .position(|w| position <= w[1].position)
                    .unwrap_or(points.len() - 2);
                let (a, b) = (points[seg], points[seg + 1]);
                let span = b.position - a.position;
                if span <= 0.0 {
                    return a.diameter;
                }
                let t = (position - a.position) / span;
                a.diameter + t * (b.diameter - a.diameter)
            }
        }
    }

    /// Scale every dimensional field by `factor` (length-unit conversion).
    pub fn convert_lengths(&mut self, factor: f64) {
        self.mouthpiece.position *= factor;
        for p in &mut self.bore_points {
            p.position *= factor;
            p.diameter *= factor;
        }
        for h in &mut self.holes {
            h.position *= factor;
            h.diameter *= factor;
            h.height *= factor;
        }
    }

    /// Position of the lowest (largest-position) tone hole, if any.
    pub fn lowest_hole_position(&self) -> Option<f64> {
        self.holes.last().map(|h| h.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn straight_bore() -> Instrument {
        Instrument::new(
            "test flute",
            vec![
                BorePoint::new(0.0, 0.019),
                BorePoint::new(0.30, 0.019),
                BorePoint::new(0.60, 0.019),
            ],
            vec![
                ToneHole::new("h1", 0.25, 0.008, 0.004),
                ToneHole::new("h2", 0.35, 0.008, 0.004),
            ],
        )
    }

    #[test]
    fn recompute_sorts_elements() {
        let mut instrument = straight_bore();
        instrument.bore_points[0].position = 0.45;
        instrument.recompute();
        let positions: Vec<f64> = instrument.bore_points.iter().map(|p| p.position).collect();
        assert_eq!(positions, vec![0.30, 0.45, 0.60]);
    }

    #[test]
    fn bore_length_is_terminal_position() {
        assert_relative_eq!(straight_bore().bore_length(), 0.60);
    }

    #[test]
    fn interpolation_inside_profile() {
        let instrument = Instrument::new(
            "taper",
            vec![BorePoint::new(0.0, 0.020), BorePoint::new(0.50, 0.010)],
            vec![],
        );
        assert_relative_eq!(instrument.interpolate_bore_diameter(0.25), 0.015);
    }

    #[test]
    fn interpolation_extrapolates_past_the_end() {
        let instrument = Instrument::new(
            "taper",
            vec![BorePoint::new(0.0, 0.020), BorePoint::new(0.50, 0.010)],
            vec![],
        );
        // Slope is -0.02 per metre, so 0.1 m past the end loses 0.002.
        assert_relative_eq!(instrument.interpolate_bore_diameter(0.60), 0.008);
    }

    #[test]
    fn unit_conversion_scales_all_lengths() {
        let mut instrument = straight_bore();
        instrument.convert_lengths(1000.0);
        assert_relative_eq!(instrument.bore_length(), 600.0);
        assert_relative_eq!(instrument.holes[0].diameter, 8.0);
    }
}
