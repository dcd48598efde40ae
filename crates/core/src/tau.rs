//! Radian/turn conversions and the rectangular helpers built on them.
//!
//! Phase in this crate is carried as a *turn* — a fraction of one full cycle,
//! normalized to `[-0.5, +0.5)` — rather than a radian, so accumulated
//! rotations never need explicit `2*pi` bookkeeping.

use crate::scalar::C64;

pub const RADIAN_CYCLE: f64 = std::f64::consts::TAU;

/// Normalize a radian angle to a turn in `[-0.5, +0.5)`.
pub fn rad2tau(rad: f64) -> f64 {
    ((rad / RADIAN_CYCLE) + 0.5).rem_euclid(1.0) - 0.5
}

/// Convert a turn back to radians.
pub fn tau2rad(tau: f64) -> f64 {
    tau * RADIAN_CYCLE
}

/// Unit-magnitude complex rotator at the given turn.
pub fn rect1(tau: f64) -> C64 {
    let rad = tau2rad(tau);
    C64::new(rad.cos(), rad.sin())
}

/// Complex rotator at the given turn, scaled to the given magnitude.
pub fn rect(tau: f64, mag: f64) -> C64 {
    let rad = tau2rad(tau);
    C64::new(rad.cos() * mag, rad.sin() * mag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rad2tau_wraps_to_half_open_interval() {
        assert!((rad2tau(0.0) - 0.0).abs() < 1e-12);
        assert!((rad2tau(RADIAN_CYCLE) - 0.0).abs() < 1e-12);
        assert!((rad2tau(RADIAN_CYCLE / 2.0) - (-0.5)).abs() < 1e-9 || (rad2tau(RADIAN_CYCLE / 2.0) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn rect1_is_unit_magnitude() {
        for t in [-0.4, -0.1, 0.0, 0.25, 0.49] {
            assert!((rect1(t).norm() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn tau_roundtrip() {
        for t in [-0.3, 0.0, 0.2, 0.499] {
            assert!((rad2tau(tau2rad(t)) - t).abs() < 1e-9);
        }
    }
}
