//! Three [`PeriodSensor`]s tuned to the same target period at different
//! bandwidths, fused into a single period estimate plus a pair of
//! lifecycle odometers that track period drift and beat position.

use crate::field::ReceptiveField;
use crate::lifecycle::{Lifecycle, LifecycleDerive, LifecycleIter};
use crate::monochord::Monochord;
use crate::percept::PeriodConcept;
use crate::sensor::PeriodSensor;
use crate::{ReceptError, ReceptResult};

/// Registered monochords per sensor, matching the fixed capacity of the
/// source material this is modeled on.
pub const MAX_MONOCHORDS: usize = 256;

/// A monochord rotation registered on a sensor, plus the index of the
/// scale-space sensor (within the owning [`crate::array::PeriodArray`])
/// it pulls its source value from. Index-based rather than a borrowed or
/// raw pointer, since two sensors may reference each other across a
/// structure Rust's borrow checker won't let hold mutable aliases.
#[derive(Debug, Clone, Copy)]
pub struct MonochordEntry {
    pub source_index: usize,
    pub monochord: Monochord,
}

#[derive(Debug, Clone, Copy)]
pub struct PeriodScaleSpaceSensor {
    pub field: ReceptiveField,
    pub response_period: f64,
    pub scale_factor: f64,
    sensors: [PeriodSensor; 3],
    period_lifecycle: LifecycleDerive,
    beat_lifecycle: LifecycleIter,
    monochords: [MonochordEntry; MAX_MONOCHORDS],
    monochord_count: usize,
}

/// A snapshot of everything a renderer needs out of one scale-space sensor.
#[derive(Debug, Clone, Copy)]
pub struct ScaleSpaceValue {
    pub concept: Option<PeriodConcept>,
    pub period_lifecycle: Lifecycle,
    pub beat_lifecycle: Lifecycle,
}

impl PeriodScaleSpaceSensor {
    pub fn new(field: ReceptiveField, response_period: f64, scale_factor: f64) -> Self {
        let sensors = std::array::from_fn(|i| {
            let mut f = field;
            f.period_factor *= scale_factor.powf(-1.0 - i as f64);
            PeriodSensor::new(f)
        });

        let zero_entry = MonochordEntry {
            source_index: 0,
            monochord: Monochord::new(field.period, field.period, 1.0),
        };

        Self {
            field,
            response_period,
            scale_factor,
            sensors,
            period_lifecycle: LifecycleDerive::new(field.period, response_period),
            beat_lifecycle: LifecycleIter::new(field.period),
            monochords: [zero_entry; MAX_MONOCHORDS],
            monochord_count: 0,
        }
    }

    pub fn sensors(&self) -> &[PeriodSensor; 3] {
        &self.sensors
    }

    pub fn period_lifecycle(&self) -> &Lifecycle {
        &self.period_lifecycle.lc
    }

    pub fn beat_lifecycle(&self) -> &Lifecycle {
        &self.beat_lifecycle.lc
    }

    pub fn monochords(&self) -> &[MonochordEntry] {
        &self.monochords[..self.monochord_count]
    }

    /// Register a monochord pulling from `source_index`'s field period into
    /// this sensor's field period at the given ratio.
    pub fn add_monochord(&mut self, source_index: usize, source_period: f64, ratio: f64) -> ReceptResult<()> {
        if self.monochord_count == MAX_MONOCHORDS {
            return Err(ReceptError::CapacityExceeded("scale-space sensor monochord table is full"));
        }
        self.monochords[self.monochord_count] = MonochordEntry {
            source_index,
            monochord: Monochord::new(source_period, self.field.period, ratio),
        };
        self.monochord_count += 1;
        Ok(())
    }

    pub fn sample_sensor(&mut self, time: f64, value: f64) {
        for sensor in &mut self.sensors {
            sensor.sample(time, value);
        }
    }

    /// Apply one monochord rotation, pulling `source`'s three percepts
    /// into this sensor's three percepts and re-deriving their
    /// recept/concept state.
    pub fn superimpose_from(&mut self, source: &PeriodScaleSpaceSensor, monochord: &Monochord) {
        for i in 0..3 {
            let source_value = source.sensors[i].percept().value;
            self.sensors[i].superimpose_and_rederive(&source_value, monochord);
        }
    }

    pub fn sample_lifecycle(&mut self) {
        let r0 = self.sensors[0].percept().value.r;
        let r1 = self.sensors[1].percept().value.r;
        let r2 = self.sensors[2].percept().value.r;
        let lifecycle = self.period_lifecycle.sample_avg(r0, r1, r2);
        self.beat_lifecycle.sample(lifecycle);
    }

    pub fn values(&self) -> ScaleSpaceValue {
        ScaleSpaceValue {
            concept: self.sensors[0].concept().copied(),
            period_lifecycle: *self.period_lifecycle(),
            beat_lifecycle: *self.beat_lifecycle(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_monochord_rejects_past_capacity() {
        let field = ReceptiveField::new(10.0, 0.0, 1.0, 1.0);
        let mut sss = PeriodScaleSpaceSensor::new(field, 1.0, 2.0);
        for _ in 0..MAX_MONOCHORDS {
            assert!(sss.add_monochord(0, 10.0, 1.0).is_ok());
        }
        assert_eq!(
            sss.add_monochord(0, 10.0, 1.0),
            Err(ReceptError::CapacityExceeded("scale-space sensor monochord table is full"))
        );
    }

    #[test]
    fn sample_sensor_advances_all_three_scales() {
        let field = ReceptiveField::new(10.0, 0.0, 1.0, 1.0);
        let mut sss = PeriodScaleSpaceSensor::new(field, 1.0, 2.0);
        sss.sample_sensor(0.0, 1.0);
        sss.sample_lifecycle();
        assert!(sss.sensors()[0].recept().is_some());
        assert!(sss.sensors()[1].recept().is_some());
        assert!(sss.sensors()[2].recept().is_some());
    }
}
