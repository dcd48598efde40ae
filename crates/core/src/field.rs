//! The two value types every sensor and percept is built from: the
//! (period, phase) coordinate system a sensor operates in, and the
//! timestamped complex sample carried along the pipeline.

use crate::scalar::C64;
use crate::tau::rad2tau;

/// The period/phase coordinate a [`crate::sensor::PeriodSensor`] is tuned
/// to, plus the smoothing factors that control how fast it adapts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReceptiveField {
    /// Target period, in samples.
    pub period: f64,
    /// Target phase, as a turn in `[-0.5, 0.5)`.
    pub phase: f64,
    /// Window, in periods, used to smooth the period estimate.
    pub period_factor: f64,
    /// Window, in periods, used to smooth the phase estimate.
    pub phase_factor: f64,
    /// Smoothed rate of change of `period`.
    pub glissando: f64,
}

impl ReceptiveField {
    pub fn new(period: f64, phase: f64, period_factor: f64, phase_factor: f64) -> Self {
        Self {
            period,
            phase,
            period_factor,
            phase_factor,
            glissando: 0.0,
        }
    }
}

/// A timestamped complex sample, carried alongside its polar decomposition
/// so downstream readers never recompute magnitude/phase from the complex
/// value themselves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReceptiveValue {
    pub timestamp: f64,
    pub cval: C64,
    pub r: f64,
    pub phi: f64,
}

impl ReceptiveValue {
    pub fn new(timestamp: f64, cval: C64) -> Self {
        let mut v = Self {
            timestamp,
            cval,
            r: 0.0,
            phi: 0.0,
        };
        v.refresh_polar();
        v
    }

    pub fn zero() -> Self {
        Self::new(0.0, C64::new(0.0, 0.0))
    }

    /// Recompute `r`/`phi` from `cval`. Call after mutating `cval` directly.
    pub fn refresh_polar(&mut self) {
        self.r = self.cval.norm();
        self.phi = rad2tau(self.cval.arg());
    }

    /// Recompute `cval` from `r`/`phi`, for call sites that build the polar
    /// form first (monochord construction does this).
    pub fn refresh_rect(&mut self) {
        self.cval = crate::tau::rect(self.phi, self.r);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_polar_matches_cval() {
        let v = ReceptiveValue::new(0.0, C64::new(0.0, 1.0));
        assert!((v.r - 1.0).abs() < 1e-12);
        assert!((v.phi - 0.25).abs() < 1e-12);
    }

    #[test]
    fn refresh_rect_round_trips_through_polar() {
        let mut v = ReceptiveValue::new(0.0, C64::new(0.0, 0.0));
        v.r = 2.0;
        v.phi = -0.25;
        v.refresh_rect();
        assert!((v.cval.re - 0.0).abs() < 1e-9);
        assert!((v.cval.im - (-2.0)).abs() < 1e-9);
    }
}
