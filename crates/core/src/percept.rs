//! The percept/recept/concept chain: an immutable snapshot of a sensor's
//! output (percept), the first difference between two percepts (recept),
//! and a running statistical summary of recepts over time (concept).

use crate::field::{ReceptiveField, ReceptiveValue};
use crate::primitives::{Delta, ExpSmoother};
use crate::scalar::delta_dc;

/// A single timestamped observation out of a [`crate::sensor::PeriodSensor`]:
/// the field it was taken under, and the smoothed complex value.
#[derive(Debug, Clone, Copy)]
pub struct PeriodPercept {
    pub field: ReceptiveField,
    pub value: ReceptiveValue,
}

impl PeriodPercept {
    pub fn new(field: ReceptiveField, value: ReceptiveValue) -> Self {
        Self { field, value }
    }
}

/// The first difference between two consecutive percepts: an instantaneous
/// estimate of how far the observed period is from the field's target.
#[derive(Debug, Clone, Copy)]
pub struct PeriodRecept {
    pub field: ReceptiveField,
    pub frequency: f64,
    pub value: ReceptiveValue,
    pub duration: f64,
    pub instant_frequency: f64,
    pub instant_period: f64,
}

impl PeriodRecept {
    pub fn init(phase: &PeriodPercept, prior_phase: &PeriodPercept) -> Self {
        let mut field = phase.field;
        field.period = (phase.field.period + prior_phase.field.period) / 2.0;
        field.glissando = (phase.field.glissando + prior_phase.field.glissando) / 2.0;

        let frequency = if field.period != 0.0 { 1.0 / field.period } else { 0.0 };

        let cval = delta_dc(phase.value.cval, prior_phase.value.cval);
        let value = ReceptiveValue::new(phase.value.timestamp, cval);
        let duration = phase.value.timestamp - prior_phase.value.timestamp;

        let phi_t = if duration > 0.0 { value.phi / duration } else { 0.0 };
        let instant_frequency = frequency - phi_t;
        let instant_period = if instant_frequency != 0.0 {
            1.0 / instant_frequency
        } else {
            0.0
        };

        Self {
            field,
            frequency,
            value,
            duration,
            instant_frequency,
            instant_period,
        }
    }
}

/// Long-lived accumulators behind [`PeriodConcept`] — kept separate from the
/// concept snapshot itself so the concept can stay an immutable, freely
/// copyable value.
#[derive(Debug, Clone, Copy)]
pub struct PeriodConceptState {
    avg_instant_period: ExpSmoother<f64>,
    instant_period_delta: Delta<f64>,
    instant_period_stddev: ExpSmoother<f64>,
}

impl PeriodConceptState {
    pub fn new(field: &ReceptiveField) -> Self {
        Self {
            avg_instant_period: ExpSmoother::new(field.period),
            instant_period_delta: Delta::new(0.0),
            instant_period_stddev: ExpSmoother::new(field.period),
        }
    }
}

/// A running statistical summary of how far instantaneous period estimates
/// have drifted from the sensor's target, and how noisy that drift is.
#[derive(Debug, Clone, Copy)]
pub struct PeriodConcept {
    pub avg_instant_period: f64,
    pub avg_instant_period_offset: f64,
    pub instant_period_delta: f64,
    pub instant_period_stddev: f64,
}

impl PeriodConcept {
    pub fn init(state: &mut PeriodConceptState, recept: &PeriodRecept) -> Self {
        let avg_instant_period = state
            .avg_instant_period
            .sample(recept.instant_period, recept.field.period * recept.field.phase_factor);
        let avg_instant_period_offset = avg_instant_period - recept.field.period;

        let instant_period_delta = match state.instant_period_delta.sample(avg_instant_period) {
            Some(d) => d,
            None => avg_instant_period,
        };

        let instant_period_stddev = state.instant_period_stddev.sample(
            instant_period_delta.abs(),
            (recept.instant_period * recept.field.phase_factor).abs(),
        );

        Self {
            avg_instant_period,
            avg_instant_period_offset,
            instant_period_delta,
            instant_period_stddev,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::C64;

    fn field() -> ReceptiveField {
        ReceptiveField::new(10.0, 0.0, 1.0, 1.0)
    }

    #[test]
    fn recept_frequency_is_reciprocal_of_mean_period() {
        let a = PeriodPercept::new(field(), ReceptiveValue::new(0.0, C64::new(1.0, 0.0)));
        let b = PeriodPercept::new(field(), ReceptiveValue::new(10.0, C64::new(1.0, 0.0)));
        let recept = PeriodRecept::init(&b, &a);
        assert!((recept.frequency - 0.1).abs() < 1e-12);
    }

    #[test]
    fn recept_zero_duration_yields_zero_phi_rate() {
        let a = PeriodPercept::new(field(), ReceptiveValue::new(5.0, C64::new(1.0, 0.0)));
        let b = PeriodPercept::new(field(), ReceptiveValue::new(5.0, C64::new(0.0, 1.0)));
        let recept = PeriodRecept::init(&b, &a);
        assert_eq!(recept.duration, 0.0);
        assert!((recept.instant_frequency - recept.frequency).abs() < 1e-12);
    }

    #[test]
    fn concept_first_sample_seeds_delta_with_average() {
        let f = field();
        let mut state = PeriodConceptState::new(&f);
        let a = PeriodPercept::new(f, ReceptiveValue::new(0.0, C64::new(1.0, 0.0)));
        let b = PeriodPercept::new(f, ReceptiveValue::new(10.0, C64::new(1.0, 0.0)));
        let recept = PeriodRecept::init(&b, &a);
        let concept = PeriodConcept::init(&mut state, &recept);
        assert_eq!(concept.instant_period_delta, concept.avg_instant_period);
    }
}
