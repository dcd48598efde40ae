//! Turns a bounded 2-D trajectory into an unbounded "lifecycle" value by
//! counting full turns around the origin and appending the fractional
//! phase — an odometer for oscillation, not just a snapshot of position.

use crate::primitives::{Delta, ExpSmoother};
use crate::scalar::C64;
use crate::tau::rad2tau;

/// Accumulates whole turns plus fractional phase of a complex value into a
/// single, monotonically-trackable real number.
#[derive(Debug, Clone, Copy)]
pub struct Lifecycle {
    pub max_r: f64,
    pub cval: C64,
    pub f: f64,
    pub r: f64,
    pub phi: f64,
    pub cycle: i64,
    pub lifecycle: f64,
}

impl Lifecycle {
    pub fn new(max_r: f64) -> Self {
        Self {
            max_r,
            cval: C64::new(0.0, 0.0),
            f: 0.0,
            r: 0.0,
            phi: 0.0,
            cycle: 0,
            lifecycle: 0.0,
        }
    }

    /// Feed one complex sample in. `cycle` decrements/increments when phase
    /// wraps backward/forward past the `[-0.5, 0.5)` boundary, so
    /// `lifecycle` grows (or shrinks) without bound as the value winds
    /// around the origin.
    pub fn sample(&mut self, cval: C64) -> f64 {
        self.cval = cval;
        self.f = cval.re - cval.im;
        let prev_phi = self.phi;
        self.r = cval.norm();
        self.phi = rad2tau(cval.arg());

        if self.phi - prev_phi > 0.5 {
            self.cycle -= 1;
        } else if self.phi - prev_phi < -0.5 {
            self.cycle += 1;
        }

        self.lifecycle = self.cycle as f64 + self.phi;
        self.lifecycle
    }
}

/// Builds a [`Lifecycle`] trajectory from the first and second derivative
/// of a three-point running window over a real-valued sequence.
#[derive(Debug, Clone, Copy)]
pub struct LifecycleDerive {
    pub lc: Lifecycle,
    response_factor: f64,
    d_avg: ExpSmoother<f64>,
    dd_avg: ExpSmoother<f64>,
    pub d: f64,
    pub dd: f64,
}

impl LifecycleDerive {
    pub fn new(max_r: f64, response_factor: f64) -> Self {
        Self {
            lc: Lifecycle::new(max_r),
            response_factor,
            d_avg: ExpSmoother::new(0.0),
            dd_avg: ExpSmoother::new(0.0),
            d: 0.0,
            dd: 0.0,
        }
    }

    fn derive(&mut self, v1: f64, v2: f64, v3: f64) {
        let d1 = v2 - v1;
        let d2 = v3 - v2;
        self.d = d1;
        self.dd = d2 - d1;
    }

    /// Feed the raw first/second derivative straight into the lifecycle,
    /// unsmoothed.
    pub fn sample_direct(&mut self, v1: f64, v2: f64, v3: f64) -> f64 {
        self.derive(v1, v2, v3);
        self.lc.sample(C64::new(self.d, self.dd))
    }

    /// Smooth the first/second derivative over `response_factor` samples
    /// before feeding the lifecycle, trading responsiveness for stability.
    pub fn sample_avg(&mut self, v1: f64, v2: f64, v3: f64) -> f64 {
        self.derive(v1, v2, v3);
        let d_avg = self.d_avg.sample(self.d, self.response_factor);
        let dd_avg = self.dd_avg.sample(self.dd, self.response_factor);
        self.lc.sample(C64::new(d_avg, dd_avg))
    }
}

/// Builds a [`Lifecycle`] trajectory from two chained first-differences of
/// a raw scalar stream, rather than a fixed three-point window.
#[derive(Debug, Clone, Copy)]
pub struct LifecycleIter {
    pub lc: Lifecycle,
    d_state: Delta<f64>,
    dd_state: Delta<f64>,
    pub d: f64,
    pub dd: f64,
}

impl LifecycleIter {
    pub fn new(max_r: f64) -> Self {
        Self {
            lc: Lifecycle::new(max_r),
            d_state: Delta::new(0.0),
            dd_state: Delta::new(0.0),
            d: 0.0,
            dd: 0.0,
        }
    }

    pub fn sample(&mut self, value: f64) -> f64 {
        self.d = self.d_state.sample(value).unwrap_or(0.0);
        self.dd = self.dd_state.sample(self.d).unwrap_or(0.0);
        self.lc.sample(C64::new(self.d, self.dd))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_counts_full_turns() {
        let mut lc = Lifecycle::new(1.0);
        let steps = 50;
        let mut last = 0.0;
        for i in 0..=steps * 10 {
            let phi = i as f64 / steps as f64;
            let rad = crate::tau::tau2rad(phi);
            last = lc.sample(C64::new(rad.cos(), rad.sin()));
        }
        assert_eq!(lc.cycle, 10);
        assert!((last - 10.0).abs() < 1e-6);
    }

    #[test]
    fn lifecycle_iter_starts_at_zero_with_no_history() {
        let mut lci = LifecycleIter::new(1.0);
        let v = lci.sample(5.0);
        assert_eq!(v, 0.0);
    }
}
