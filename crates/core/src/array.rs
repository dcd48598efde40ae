//! A logarithmically-spaced bank of [`PeriodScaleSpaceSensor`]s covering a
//! range of octaves around a base period — the top-level perception
//! engine a CLI or other driver samples once per input frame.

use crate::field::ReceptiveField;
use crate::monochord::Monochord;
use crate::scale_space::{PeriodScaleSpaceSensor, ScaleSpaceValue};
use crate::{ReceptError, ReceptResult};

/// Matches the fixed capacity of the source material's sensor table.
pub const MAX_SENSORS: usize = 256;

pub struct PeriodArray {
    pub field: ReceptiveField,
    pub response_period: f64,
    pub octave_bandwidth: f64,
    pub scale_factor: f64,
    period_bandwidth: f64,
    sensors: Vec<PeriodScaleSpaceSensor>,
}

impl PeriodArray {
    pub fn new(field: ReceptiveField, response_period: f64, octave_bandwidth: f64, scale_factor: f64) -> Self {
        let period_bandwidth = 1.0 / (2f64.powf(1.0 / octave_bandwidth) - 1.0);
        Self {
            field,
            response_period,
            octave_bandwidth,
            scale_factor,
            period_bandwidth,
            sensors: Vec::with_capacity(MAX_SENSORS.min(64)),
        }
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    pub fn sensors(&self) -> &[PeriodScaleSpaceSensor] {
        &self.sensors
    }

    /// Register one more scale-space sensor tuned to `period`, with a
    /// per-octave bandwidth scaled by `bandwidth_factor`. Returns the
    /// sensor's index, used to wire up monochords and read values back.
    pub fn add_period_sensor(&mut self, period: f64, bandwidth_factor: f64) -> ReceptResult<usize> {
        if self.sensors.len() == MAX_SENSORS {
            return Err(ReceptError::CapacityExceeded("period array sensor table is full"));
        }

        let mut field = self.field;
        field.period = period;
        field.period_factor = self.period_bandwidth * bandwidth_factor;

        let sensor = PeriodScaleSpaceSensor::new(field, self.response_period, self.scale_factor);
        self.sensors.push(sensor);
        Ok(self.sensors.len() - 1)
    }

    /// Populate the array with a logarithmic grid of sensors spanning
    /// `octaves` below the base field period, one sensor per
    /// `1 / octave_bandwidth` of an octave, up to and including the base
    /// period itself.
    pub fn populate(&mut self, octaves: f64, bandwidth_factor: f64) -> ReceptResult<()> {
        let start = -(self.octave_bandwidth * octaves) as i64;
        for n in start..=0 {
            let period = self.field.period * 2f64.powf(n as f64 / self.octave_bandwidth);
            self.add_period_sensor(period, bandwidth_factor)?;
        }
        Ok(())
    }

    /// Register a monochord on `target_index` pulling from
    /// `source_index`'s current field period at the given ratio.
    pub fn add_monochord(&mut self, source_index: usize, target_index: usize, ratio: f64) -> ReceptResult<()> {
        let source_period = self
            .sensors
            .get(source_index)
            .ok_or(ReceptError::InvalidParameter("monochord source index out of range"))?
            .field
            .period;
        let target = self
            .sensors
            .get_mut(target_index)
            .ok_or(ReceptError::InvalidParameter("monochord target index out of range"))?;
        target.add_monochord(source_index, source_period, ratio)
    }

    pub fn sample_sensor(&mut self, time: f64, value: f64) {
        for sensor in &mut self.sensors {
            sensor.sample_sensor(time, value);
        }
    }

    pub fn sample_monochords(&mut self) {
        for i in 0..self.sensors.len() {
            apply_monochords(&mut self.sensors, i);
        }
    }

    pub fn sample_lifecycle(&mut self) {
        for sensor in &mut self.sensors {
            sensor.sample_lifecycle();
        }
    }

    /// Advance every sensor one sample: fan out the raw sample, apply
    /// registered monochord superpositions, then advance the lifecycle
    /// odometers — in that order, per sensor, before moving to the next
    /// sensor, so a monochord pulling from a higher index sees last
    /// sample's value while one pulling from a lower index sees this
    /// sample's.
    pub fn sample(&mut self, time: f64, value: f64) {
        for i in 0..self.sensors.len() {
            self.sensors[i].sample_sensor(time, value);
            apply_monochords(&mut self.sensors, i);
            self.sensors[i].sample_lifecycle();
        }
    }

    pub fn values(&self) -> Vec<ScaleSpaceValue> {
        self.sensors.iter().map(|s| s.values()).collect()
    }
}

/// Apply every monochord registered on `sensors[target_index]`, pulling
/// each one's source value live out of `sensors` by index. Source and
/// target may be the same sensor, any two distinct sensors, or the source
/// may come later in the array than the target (not yet sampled this
/// pass) — all handled without holding two live mutable borrows at once.
fn apply_monochords(sensors: &mut [PeriodScaleSpaceSensor], target_index: usize) {
    let entries: Vec<_> = sensors[target_index].monochords().to_vec();
    for entry in entries {
        superimpose_pair(sensors, target_index, entry.source_index, &entry.monochord);
    }
}

fn superimpose_pair(sensors: &mut [PeriodScaleSpaceSensor], target_index: usize, source_index: usize, monochord: &Monochord) {
    if source_index == target_index {
        let snapshot = sensors[target_index];
        sensors[target_index].superimpose_from(&snapshot, monochord);
        return;
    }

    if source_index < target_index {
        let (left, right) = sensors.split_at_mut(target_index);
        right[0].superimpose_from(&left[source_index], monochord);
    } else {
        let (left, right) = sensors.split_at_mut(source_index);
        left[target_index].superimpose_from(&right[0], monochord);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn populate_builds_logarithmic_grid() {
        let field = ReceptiveField::new(100.0, 0.0, 1.0, 1.0);
        let mut array = PeriodArray::new(field, 1.0, 12.0, 2.0);
        array.populate(2.0, 1.0).unwrap();
        assert_eq!(array.len(), 25);
        let periods: Vec<f64> = array.sensors().iter().map(|s| s.field.period).collect();
        assert!((periods[0] - 25.0).abs() < 1e-6);
        assert!((periods[periods.len() - 1] - 100.0).abs() < 1e-6);
    }

    #[test]
    fn add_monochord_validates_indices() {
        let field = ReceptiveField::new(10.0, 0.0, 1.0, 1.0);
        let mut array = PeriodArray::new(field, 1.0, 12.0, 2.0);
        array.add_period_sensor(10.0, 1.0).unwrap();
        assert_eq!(
            array.add_monochord(0, 5, 2.0),
            Err(ReceptError::InvalidParameter("monochord target index out of range"))
        );
    }

    #[test]
    fn sample_runs_full_array_without_panicking() {
        let field = ReceptiveField::new(10.0, 0.0, 1.0, 1.0);
        let mut array = PeriodArray::new(field, 1.0, 12.0, 2.0);
        array.populate(1.0, 1.0).unwrap();
        array.add_monochord(0, 1, 2.0).unwrap();
        for t in 0..50 {
            array.sample(t as f64, (t as f64).sin());
        }
        assert_eq!(array.values().len(), array.len());
    }

    #[test]
    fn octave_monochord_pulls_source_into_target() {
        let mut array = PeriodArray::new(ReceptiveField::new(10.0, 0.0, 1.582, 1.0), 1.0, 12.0, 2.0);
        let source = array.add_period_sensor(10.0, 1.0).unwrap();
        let target = array.add_period_sensor(20.0, 1.0).unwrap();
        array.add_monochord(source, target, 2.0).unwrap();

        for t in 0..2000 {
            let t = t as f64;
            let x = crate::tau::tau2rad(t / 10.0).sin();
            array.sample(t, x);
        }

        let source_value = array.sensors()[source].sensors()[0].percept().value.cval;
        let target_value = array.sensors()[target].sensors()[0].percept().value.cval;
        assert!((source_value - target_value).norm() < 0.05);
    }
}
