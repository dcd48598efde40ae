//! Leaf filters: exponential smoothing, delta/apex detection, distribution
//! tracking and the dynamic-window machinery that turns a target duration
//! into a smoothing factor keyed on an observed sample rate.

use crate::scalar::{Deviate, DeltaOp, SignProbe};
use std::ops::{Add, Div, Sub};

/// Single-pole IIR smoother: `v += (x - v) / w`.
///
/// `w < 1` is clamped to `1`, which makes the smoother a pass-through
/// (`v` becomes `x` exactly) rather than an amplifying filter.
#[derive(Debug, Clone, Copy)]
pub struct ExpSmoother<T> {
    pub v: T,
}

impl<T> ExpSmoother<T>
where
    T: Copy + Add<Output = T> + Sub<Output = T> + Div<f64, Output = T>,
{
    pub fn new(initial: T) -> Self {
        Self { v: initial }
    }

    pub fn sample(&mut self, x: T, w: f64) -> T {
        let w = if w < 1.0 { 1.0 } else { w };
        self.v = self.v + (x - self.v) / w;
        self.v
    }
}

/// An [`ExpSmoother`] with a fixed window, for call sites that never vary it.
#[derive(Debug, Clone, Copy)]
pub struct ExpSmoothing<T> {
    es: ExpSmoother<T>,
    w: f64,
}

impl<T> ExpSmoothing<T>
where
    T: Copy + Add<Output = T> + Sub<Output = T> + Div<f64, Output = T>,
{
    pub fn new(window_size: f64, initial: T) -> Self {
        Self {
            es: ExpSmoother::new(initial),
            w: window_size,
        }
    }

    pub fn sample(&mut self, x: T) -> T {
        self.es.sample(x, self.w)
    }

    pub fn v(&self) -> T {
        self.es.v
    }
}

/// First difference against the previous sample.
///
/// `sample` returns `None` on the very first call (no prior to difference
/// against) and `Some` on every call after, toggling that state exactly
/// once. The source this crate was modeled on instead latched `has_prior`
/// at construction time and never updated it, so a delta filter seeded
/// with `has_prior = true` silently never produced a value; this always
/// reports `None` on the first sample and `Some` on every one after,
/// regardless of how it was seeded.
#[derive(Debug, Clone, Copy)]
pub struct Delta<T> {
    has_prior: bool,
    prior: T,
}

impl<T: DeltaOp> Delta<T> {
    pub fn new(prior: T) -> Self {
        Self {
            has_prior: false,
            prior,
        }
    }

    /// Seed with an existing prior, as if one sample had already been taken.
    pub fn with_prior(prior: T) -> Self {
        Self {
            has_prior: true,
            prior,
        }
    }

    pub fn sample(&mut self, x: T) -> Option<T> {
        let result = if self.has_prior {
            Some(x.delta_from(self.prior))
        } else {
            None
        };
        self.has_prior = true;
        self.prior = x;
        result
    }

    pub fn has_prior(&self) -> bool {
        self.has_prior
    }

    pub fn prior(&self) -> T {
        self.prior
    }
}

/// Running average plus smoothed magnitude of deviation from that average.
///
/// The deviation is always a magnitude (`f64`), even when `T` is complex:
/// distance from a running mean has no phase, only size.
#[derive(Debug, Clone, Copy)]
pub struct Distribution<T> {
    pub ave: ExpSmoother<T>,
    pub dev: ExpSmoother<f64>,
}

impl<T> Distribution<T>
where
    T: Deviate + Copy + Add<Output = T> + Sub<Output = T> + Div<f64, Output = T>,
{
    pub fn new(initial: T) -> Self {
        Self {
            ave: ExpSmoother::new(initial),
            dev: ExpSmoother::new(0.0),
        }
    }

    /// Returns `(smoothed average, smoothed deviation)`. The deviation is
    /// measured against the average *before* this sample updates it.
    pub fn sample(&mut self, x: T, w: f64) -> (T, f64) {
        let deviation = x.deviation_from(self.ave.v);
        let ave = self.ave.sample(x, w);
        let dev = self.dev.sample(deviation, w);
        (ave, dev)
    }
}

/// Delta filter that additionally reports when the sign of the delta flips.
#[derive(Debug, Clone, Copy)]
pub struct Apex<T> {
    delta: Delta<T>,
    prior_is_positive: bool,
}

impl<T: DeltaOp + SignProbe> Apex<T> {
    pub fn new(prior: T) -> Self {
        Self {
            delta: Delta::new(prior),
            prior_is_positive: true,
        }
    }

    /// Returns `(is_apex, delta)`. `is_apex` is true only on the sample
    /// where the delta's sign differs from the previous delta's sign; the
    /// cached sign is refreshed on every sample that has one, flip or not.
    pub fn sample(&mut self, x: T) -> (bool, Option<T>) {
        let delta = self.delta.sample(x);
        let mut is_apex = false;
        if let Some(d) = delta {
            let is_positive = d.sign_probe() >= 0.0;
            if is_positive != self.prior_is_positive {
                self.prior_is_positive = is_positive;
                is_apex = true;
            }
        }
        (is_apex, delta)
    }
}

/// Converts a target duration into a smoothing factor keyed on the actual
/// spacing between samples of some monotonic sequence (typically time).
///
/// `sample` feeds the sequence value into an internal delta to get the
/// duration since the last call, smooths that duration, then returns
/// `target_duration / smoothed_duration` — a window size in units of
/// samples rather than seconds. On the first call (no prior sequence
/// value) it returns `target_duration` unchanged, seeding the window
/// before any duration has been observed.
#[derive(Debug, Clone, Copy)]
pub struct DynamicWindow {
    target_duration: f64,
    sequence_delta: Delta<f64>,
    duration_smoother: ExpSmoother<f64>,
    factor: f64,
}

impl DynamicWindow {
    pub fn new(target_duration: f64, factor: f64, initial_duration: f64) -> Self {
        Self {
            target_duration,
            sequence_delta: Delta::new(0.0),
            duration_smoother: ExpSmoother::new(initial_duration),
            factor,
        }
    }

    pub fn sample(&mut self, sequence_value: f64) -> f64 {
        match self.sequence_delta.sample(sequence_value) {
            Some(duration_since) => {
                let expected = self.duration_smoother.sample(duration_since, self.factor);
                if expected != 0.0 {
                    self.target_duration / expected
                } else {
                    0.0
                }
            }
            None => self.target_duration,
        }
    }
}

/// An [`ExpSmoother`] whose window size is supplied each call by a
/// [`DynamicWindow`] rather than fixed.
#[derive(Debug, Clone, Copy)]
pub struct SmoothDuration<T> {
    window: DynamicWindow,
    smoother: ExpSmoother<T>,
}

impl<T> SmoothDuration<T>
where
    T: Copy + Add<Output = T> + Sub<Output = T> + Div<f64, Output = T>,
{
    pub fn new(window: DynamicWindow, initial: T) -> Self {
        Self {
            window,
            smoother: ExpSmoother::new(initial),
        }
    }

    pub fn sample(&mut self, value: T, sequence_value: f64) -> T {
        let w = self.window.sample(sequence_value);
        self.smoother.sample(value, w)
    }

    pub fn v(&self) -> T {
        self.smoother.v
    }
}

/// A [`Distribution`] whose window size is supplied each call by a
/// [`DynamicWindow`].
#[derive(Debug, Clone, Copy)]
pub struct SmoothDurationDistribution<T> {
    window: DynamicWindow,
    distribution: Distribution<T>,
}

impl<T> SmoothDurationDistribution<T>
where
    T: Deviate + Copy + Add<Output = T> + Sub<Output = T> + Div<f64, Output = T>,
{
    pub fn new(window: DynamicWindow, initial: T) -> Self {
        Self {
            window,
            distribution: Distribution::new(initial),
        }
    }

    pub fn sample(&mut self, value: T, sequence_value: f64) -> (T, f64) {
        let w = self.window.sample(sequence_value);
        self.distribution.sample(value, w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::C64;

    #[test]
    fn exp_smoother_with_window_one_is_pass_through() {
        let mut es = ExpSmoother::new(0.0);
        assert_eq!(es.sample(5.0, 1.0), 5.0);
        assert_eq!(es.sample(-3.0, 0.1), -3.0);
    }

    #[test]
    fn exp_smoother_converges_toward_constant_input() {
        let mut es = ExpSmoother::new(0.0);
        let mut v = 0.0;
        for _ in 0..500 {
            v = es.sample(1.0, 10.0);
        }
        assert!((v - 1.0).abs() < 1e-6);
    }

    #[test]
    fn delta_first_sample_has_no_prior() {
        let mut d: Delta<f64> = Delta::new(0.0);
        assert_eq!(d.sample(3.0), None);
        assert_eq!(d.sample(5.0), Some(2.0));
        assert_eq!(d.sample(4.0), Some(-1.0));
    }

    #[test]
    fn delta_with_prior_has_value_on_first_sample() {
        let mut d: Delta<f64> = Delta::with_prior(10.0);
        assert_eq!(d.sample(12.0), Some(2.0));
    }

    #[test]
    fn delta_complex_is_ratio() {
        let mut d: Delta<C64> = Delta::new(C64::new(0.0, 0.0));
        d.sample(C64::new(2.0, 0.0));
        assert_eq!(d.sample(C64::new(4.0, 0.0)), Some(C64::new(2.0, 0.0)));
    }

    #[test]
    fn distribution_measures_deviation_before_updating_average() {
        let mut dist = Distribution::new(0.0);
        let (ave, dev) = dist.sample(10.0, 1.0);
        assert_eq!(ave, 10.0);
        assert_eq!(dev, 10.0);
    }

    #[test]
    fn apex_flags_sign_flip_only() {
        let mut apex: Apex<f64> = Apex::new(0.0);
        assert_eq!(apex.sample(1.0).0, false);
        assert_eq!(apex.sample(2.0).0, false);
        assert_eq!(apex.sample(1.0).0, true);
        assert_eq!(apex.sample(0.0).0, false);
    }

    #[test]
    fn dynamic_window_seeds_target_duration_on_first_sample() {
        let mut w = DynamicWindow::new(100.0, 10.0, 1.0);
        assert_eq!(w.sample(0.0), 100.0);
    }

    #[test]
    fn dynamic_window_tracks_observed_rate() {
        let mut w = DynamicWindow::new(100.0, 1.0, 1.0);
        let mut last = 0.0;
        for t in 1..200 {
            last = w.sample(t as f64);
        }
        assert!((last - 100.0).abs() < 1e-3);
    }
}
