//! Relates two periods by a rational ratio and rotates/superimposes a
//! value sampled at one period onto a percept sampled at the other —
//! the mechanism octave- and beat-relationships are built from.

use crate::field::ReceptiveValue;
use crate::scalar::C64;
use crate::tau::rect1;

/// A fixed rotation between a source period and a target period related by
/// `ratio` (e.g. `2.0` for an octave, `3.0/2.0` for a fifth).
#[derive(Debug, Clone, Copy)]
pub struct Monochord {
    pub source_period: f64,
    pub target_period: f64,
    pub ratio: f64,
    pub period: f64,
    pub offset: f64,
    pub phi_offset: f64,
    pub value: C64,
}

impl Monochord {
    pub fn new(source_period: f64, target_period: f64, ratio: f64) -> Self {
        let period = source_period * ratio;
        let offset = target_period - period;
        let phi_offset = offset / target_period;
        Self {
            source_period,
            target_period,
            ratio,
            period,
            offset,
            phi_offset,
            value: rect1(phi_offset),
        }
    }

    /// Rotate a value sampled at the source period into the target
    /// period's phase frame, in place. Magnitude is unchanged; only phase
    /// advances by `phi_offset`.
    pub fn rotate(&self, value: &mut ReceptiveValue) {
        value.cval *= self.value;
        value.phi = (value.phi + self.phi_offset + 0.5).rem_euclid(1.0) - 0.5;
    }

    /// Rotate `source` into this monochord's target frame and additively
    /// superimpose it onto `target`.
    pub fn superimpose(&self, source: &ReceptiveValue, target: &mut ReceptiveValue) {
        let mut rotated = *source;
        self.rotate(&mut rotated);
        target.cval += rotated.cval;
        target.refresh_polar();
    }
}
