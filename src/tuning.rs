//! Fingering targets and tuning evaluation.
//!
//! A fingering names a combination of open and closed holes with a
//! target pitch. A [`TuningEvaluator`] turns the current geometry plus a
//! list of fingering targets into one scalar error per target; the real
//! transfer-matrix model plugs in through the same trait.

use serde::{Deserialize, Serialize};

use crate::geometry::Instrument;

/// A named fingering with its target pitch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fingering {
    pub note: String,
    /// Target pitch (Hz).
    pub target_frequency: f64,
    /// Open/closed state per tone hole, in hole order (top to bottom).
    pub open_holes: Vec<bool>,
}

impl Fingering {
    pub fn new(note: impl Into<String>, target_frequency: f64, open_holes: Vec<bool>) -> Self {
        Self {
            note: note.into(),
            target_frequency,
            open_holes,
        }
    }
}

/// Computes one scalar error per fingering target for the current
/// geometry. Implementations must not mutate the instrument.
pub trait TuningEvaluator {
    fn errors(&self, instrument: &Instrument, targets: &[Fingering]) -> Vec<f64>;
}

/// Error in cents between an observed and a target frequency.
pub fn cents(observed: f64, target: f64) -> f64 {
    if observed <= 0.0 || target <= 0.0 {
        return 0.0;
    }
    1200.0 * (observed / target).log2()
}

/// First-order open-pipe pitch predictor.
///
/// Sounding length is the position of the uppermost open hole, or the
/// full bore length when every hole is closed; predicted pitch is the
/// half-wavelength resonance `c / 2L`. Crude, but monotone in the
/// geometry parameters, which is all the framework tests need.
#[derive(Debug, Clone)]
pub struct HalfWaveEvaluator {
    /// Speed of sound (m/s).
    pub speed_of_sound: f64,
}

impl Default for HalfWaveEvaluator {
    fn default() -> Self {
        Self {
            speed_of_sound: 343.0,
        }
    }
}

impl HalfWaveEvaluator {
    fn sounding_length(&self, instrument: &Instrument, fingering: &Fingering) -> f64 {
        instrument
            .holes
            .iter()
            .zip(fingering.open_holes.iter())
            .find(|(_, &open)| open)
            .map(|(hole, _)| hole.position)
            .unwrap_or_else(|| instrument.bore_length())
    }

    /// Predicted sounding frequency for one fingering.
    pub fn predicted_frequency(&self, instrument: &Instrument, fingering: &Fingering) -> f64 {
        let length = self.sounding_length(instrument, fingering);
        if length <= 0.0 {
            return 0.0;
        }
        self.speed_of_sound / (2.0 * length)
    }
}

impl TuningEvaluator for HalfWaveEvaluator {
    fn errors(&self, instrument: &Instrument, targets: &[Fingering]) -> Vec<f64> {
        targets
            .iter()
            .map(|fingering| {
                let predicted = self.predicted_frequency(instrument, fingering);
                cents(predicted, fingering.target_frequency)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BorePoint, ToneHole};
    use approx::assert_relative_eq;

    fn pipe(length: f64) -> Instrument {
        Instrument::new(
            "pipe",
            vec![BorePoint::new(0.0, 0.019), BorePoint::new(length, 0.019)],
            vec![ToneHole::new("h1", length * 0.75, 0.008, 0.004)],
        )
    }

    #[test]
    fn octave_is_1200_cents() {
        assert_relative_eq!(cents(880.0, 440.0), 1200.0);
        assert_relative_eq!(cents(440.0, 440.0), 0.0);
    }

    #[test]
    fn all_closed_uses_bore_length() {
        let evaluator = HalfWaveEvaluator::default();
        let instrument = pipe(0.343);
        let fingering = Fingering::new("D", 500.0, vec![false]);
        // c / 2L = 343 / 0.686 = 500 Hz
        assert_relative_eq!(
            evaluator.predicted_frequency(&instrument, &fingering),
            500.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn open_hole_shortens_sounding_length() {
        let evaluator = HalfWaveEvaluator::default();
        let instrument = pipe(0.343);
        let closed = Fingering::new("D", 500.0, vec![false]);
        let open = Fingering::new("E", 500.0, vec![true]);
        assert!(
            evaluator.predicted_frequency(&instrument, &open)
                > evaluator.predicted_frequency(&instrument, &closed)
        );
    }

    #[test]
    fn one_error_per_target() {
        let evaluator = HalfWaveEvaluator::default();
        let instrument = pipe(0.343);
        let targets = vec![
            Fingering::new("D", 500.0, vec![false]),
            Fingering::new("E", 560.0, vec![true]),
        ];
        let errors = evaluator.errors(&instrument, &targets);
        assert_eq!(errors.len(), 2);
        // Exact match on the first target.
        assert_relative_eq!(errors[0], 0.0, epsilon = 1e-9);
    }
}
