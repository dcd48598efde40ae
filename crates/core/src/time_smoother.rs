//! Rotates a raw sample into a receptive field's reference frame and
//! smooths it there, optionally letting the field itself drift to track a
//! changing period.

use crate::field::{ReceptiveField, ReceptiveValue};
use crate::primitives::ExpSmoother;
use crate::scalar::C64;
use crate::tau::rect1;

/// Smooths a complex sample after rotating it into a field's phase frame,
/// against a fixed period/phase.
#[derive(Debug, Clone, Copy)]
pub struct TimeSmoother {
    pub field: ReceptiveField,
    smoother: ExpSmoother<C64>,
}

impl TimeSmoother {
    pub fn new(field: ReceptiveField, initial: C64) -> Self {
        Self {
            field,
            smoother: ExpSmoother::new(initial),
        }
    }

    /// Rotates `value` by the field's current phase/period, smooths it over
    /// a window of `period * period_factor` samples, and returns the
    /// resulting timestamped value.
    pub fn sample(&mut self, time: f64, value: C64) -> ReceptiveValue {
        let rotator = rect1((time + self.field.phase) / self.field.period);
        let w = self.field.period * self.field.period_factor;
        let cval = self.smoother.sample(rotator * value, w);
        ReceptiveValue::new(time, cval)
    }
}

/// A [`TimeSmoother`] whose period is allowed to drift: each call to
/// [`update_period`](Self::update_period) smooths the new target period and
/// tracks its rate of change (glissando) before committing it to the field.
#[derive(Debug, Clone, Copy)]
pub struct DynamicTimeSmoother {
    inner: TimeSmoother,
    period_state: ExpSmoother<f64>,
    glissando_state: ExpSmoother<f64>,
}

impl DynamicTimeSmoother {
    pub fn new(field: ReceptiveField, initial: C64) -> Self {
        Self {
            period_state: ExpSmoother::new(field.period),
            glissando_state: ExpSmoother::new(0.0),
            inner: TimeSmoother::new(field, initial),
        }
    }

    pub fn field(&self) -> &ReceptiveField {
        &self.inner.field
    }

    /// Smooths `new_period` and the period's rate of change, then rescales
    /// phase to hold the current rotation steady across the period change
    /// and commits the new period to the field.
    pub fn update_period(&mut self, new_period: f64) {
        let field = &mut self.inner.field;
        let w = field.period * field.period_factor;
        self.period_state.sample(new_period, w);
        self.glissando_state.sample(new_period - field.period, w);
        field.phase = field.phase / field.period * new_period;
        field.period = new_period;
    }

    pub fn update_phase(&mut self, new_phase: f64) {
        self.inner.field.phase = new_phase;
    }

    pub fn sample(&mut self, time: f64, value: C64) -> ReceptiveValue {
        self.inner.sample(time, value)
    }

    /// The field as reported to consumers outside this smoother. The
    /// source material this models reused the smoothed-period accumulator
    /// for *both* the period and the glissando fields here, so the
    /// reported glissando is actually the smoothed period rather than the
    /// period's rate of change — preserved deliberately for numeric
    /// parity with that behavior.
    pub fn effective_field(&self) -> ReceptiveField {
        let mut field = self.inner.field;
        field.period = self.period_state.v;
        field.glissando = self.period_state.v;
        field
    }

    /// The period's actual smoothed rate of change, bypassing the
    /// [`effective_field`](Self::effective_field) quirk above.
    pub fn glissando(&self) -> f64 {
        self.glissando_state.v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_smoother_tracks_steady_tone_at_matching_period() {
        let field = ReceptiveField::new(10.0, 0.0, 1.0, 1.0);
        let mut ts = TimeSmoother::new(field, C64::new(0.0, 0.0));
        let mut last = ReceptiveValue::zero();
        for t in 0..500 {
            last = ts.sample(t as f64, C64::new(1.0, 0.0));
        }
        assert!(last.r > 0.5);
    }

    #[test]
    fn time_smoother_impulse_decays_toward_zero() {
        let field = ReceptiveField::new(10.0, 0.0, 1.582, 1.0);
        let mut ts = TimeSmoother::new(field, C64::new(0.0, 0.0));
        ts.sample(0.0, C64::new(1.0, 0.0));
        let mut last = ReceptiveValue::zero();
        for t in 1..=1000 {
            last = ts.sample(t as f64, C64::new(0.0, 0.0));
        }
        assert!(last.r < 1e-3);
    }

    #[test]
    fn time_smoother_rejects_tone_at_an_unrelated_period() {
        let field = ReceptiveField::new(12.0, 0.0, 1.582, 1.0);
        let mut ts = TimeSmoother::new(field, C64::new(0.0, 0.0));
        let mut last = ReceptiveValue::zero();
        for t in 0..10_000 {
            let t = t as f64;
            let x = crate::tau::tau2rad(t / 10.0).sin();
            last = ts.sample(t, C64::new(x, 0.0));
        }
        assert!(last.r < 0.1);
    }

    #[test]
    fn update_period_rescales_phase_to_hold_rotation() {
        let field = ReceptiveField::new(10.0, 2.0, 1.0, 1.0);
        let mut dts = DynamicTimeSmoother::new(field, C64::new(0.0, 0.0));
        dts.update_period(20.0);
        assert!((dts.field().phase - 4.0).abs() < 1e-9);
        assert_eq!(dts.field().period, 20.0);
    }

    #[test]
    fn effective_field_mirrors_period_into_glissando() {
        let field = ReceptiveField::new(10.0, 0.0, 1.0, 1.0);
        let mut dts = DynamicTimeSmoother::new(field, C64::new(0.0, 0.0));
        dts.update_period(12.0);
        let effective = dts.effective_field();
        assert_eq!(effective.glissando, effective.period);
    }
}
