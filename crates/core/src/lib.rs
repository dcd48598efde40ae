//! Real-time pitch and rhythm perception: turns a stream of raw samples
//! into a bank of period estimates and the lifecycle trajectories built on
//! top of them, without ever blocking on I/O or allocating on the sample
//! path.

pub use array::PeriodArray;
pub use config::{ConfigError, ConfigManager, ConfigSchema};
pub use error::{ReceptError, ReceptResult};
pub use field::{ReceptiveField, ReceptiveValue};
pub use lifecycle::{Lifecycle, LifecycleDerive, LifecycleIter};
pub use monochord::Monochord;
pub use note::{midi_note, note, Note};
pub use percept::{PeriodConcept, PeriodConceptState, PeriodPercept, PeriodRecept};
pub use primitives::{Apex, Delta, Distribution, DynamicWindow, ExpSmoother, ExpSmoothing};
pub use scalar::C64;
pub use scale_space::{PeriodScaleSpaceSensor, ScaleSpaceValue};
pub use sensor::PeriodSensor;

pub mod array;
pub mod config;
pub mod error;
pub mod field;
pub mod lifecycle;
pub mod monochord;
pub mod note;
pub mod percept;
pub mod primitives;
pub mod scalar;
pub mod scale_space;
pub mod sensor;
pub mod tau;
pub mod time_smoother;

use serde::{Deserialize, Serialize};

/// `1 / (1 - e^-1)`: the area under one decay constant's worth of the
/// exponential distribution. Used as the default `phase_factor` so a
/// sensor's concept-smoothing window (`period * phase_factor`, see
/// `percept.rs`) covers one full exponential "cycle area" of samples,
/// a distinct knob from the per-octave `bandwidth_factor`.
pub const CYCLE_AREA: f64 = 1.581_976_706_869_326_5;

/// Persisted/tunable settings for the perception engine and the display
/// driving it. See [`ConfigManager`] for validation and load/save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub columns: u16,
    pub lines: u16,
    pub fps: u32,
    pub sample_rate: u32,
    pub period_response_hz: f64,
    pub octave_bandwidth: f64,
    pub octaves: f64,
    pub bandwidth_factor: f64,
    pub scale_factor: f64,
    pub starting_note: i32,
    pub a4_hz: f64,
}

impl Settings {
    /// The base period, in samples, for [`Settings::starting_note`]
    /// semitones away from [`Settings::a4_hz`] at this sample rate.
    pub fn base_period(&self) -> f64 {
        let hz = self.a4_hz * 2f64.powf(self.starting_note as f64 / 12.0);
        self.sample_rate as f64 / hz
    }

    /// The base receptive field a [`PeriodArray`] should be constructed
    /// with: target period from [`Settings::base_period`], zero phase,
    /// [`Settings::bandwidth_factor`] for the period window, and
    /// [`CYCLE_AREA`] for the phase window — distinct knobs for distinct
    /// purposes, not the same value reused twice.
    pub fn base_field(&self) -> ReceptiveField {
        ReceptiveField::new(self.base_period(), 0.0, self.bandwidth_factor, CYCLE_AREA)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            columns: 80,
            lines: 24,
            fps: 60,
            sample_rate: 44100,
            period_response_hz: 60.0,
            octave_bandwidth: 12.0,
            octaves: 4.0,
            bandwidth_factor: 1.0,
            scale_factor: 2.0,
            starting_note: -21,
            a4_hz: 440.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_period_matches_starting_note() {
        let settings = Settings {
            starting_note: 0,
            ..Settings::default()
        };
        let period = settings.base_period();
        assert!((period - settings.sample_rate as f64 / settings.a4_hz).abs() < 1e-9);
    }
}
