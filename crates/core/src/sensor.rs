//! A [`PeriodSensor`] ties a [`crate::time_smoother::DynamicTimeSmoother`] to
//! the percept/recept/concept chain, sampling a raw signal into a single
//! evolving estimate of "what period is this".

use crate::field::{ReceptiveField, ReceptiveValue};
use crate::monochord::Monochord;
use crate::percept::{PeriodConcept, PeriodConceptState, PeriodPercept, PeriodRecept};
use crate::scalar::C64;
use crate::time_smoother::DynamicTimeSmoother;

/// Below this period (in samples) a fed-back period estimate is treated as
/// numerically unreliable and ignored, guarding against runaway feedback
/// near the Nyquist limit.
pub const MIN_FEEDBACK_PERIOD: f64 = 2.0;

#[derive(Debug, Clone, Copy)]
pub struct PeriodSensor {
    dts: DynamicTimeSmoother,
    concept_state: PeriodConceptState,
    percept: PeriodPercept,
    prior_percept: PeriodPercept,
    has_prior_percept: bool,
    recept: Option<PeriodRecept>,
    concept: Option<PeriodConcept>,
}

impl PeriodSensor {
    pub fn new(field: ReceptiveField) -> Self {
        let dts = DynamicTimeSmoother::new(field, C64::new(0.0, 0.0));
        let concept_state = PeriodConceptState::new(&field);
        let percept = PeriodPercept::new(dts.effective_field(), ReceptiveValue::zero());
        Self {
            dts,
            concept_state,
            percept,
            prior_percept: percept,
            has_prior_percept: false,
            recept: None,
            concept: None,
        }
    }

    pub fn field(&self) -> ReceptiveField {
        self.dts.effective_field()
    }

    pub fn percept(&self) -> &PeriodPercept {
        &self.percept
    }

    pub fn recept(&self) -> Option<&PeriodRecept> {
        self.recept.as_ref()
    }

    pub fn concept(&self) -> Option<&PeriodConcept> {
        self.concept.as_ref()
    }

    /// Feed one raw sample through the time smoother, roll percepts
    /// forward, and re-derive the recept/concept chain.
    pub fn sample(&mut self, time: f64, value: f64) {
        if self.has_prior_percept {
            self.prior_percept = self.percept;
        }

        let rv = self.dts.sample(time, C64::new(value, 0.0));
        self.percept = PeriodPercept::new(self.dts.effective_field(), rv);

        if !self.has_prior_percept {
            self.prior_percept = self.percept;
            self.has_prior_percept = true;
        }

        self.receive();
    }

    /// Rotate `source_value` through `monochord` onto this sensor's current
    /// percept and re-derive the recept/concept chain against it. Used to
    /// fuse a percept pulled from another sensor into this one's.
    pub fn superimpose_and_rederive(&mut self, source_value: &ReceptiveValue, monochord: &Monochord) {
        monochord.superimpose(source_value, &mut self.percept.value);
        self.receive();
    }

    fn receive(&mut self) {
        let recept = PeriodRecept::init(&self.percept, &self.prior_percept);
        let concept = PeriodConcept::init(&mut self.concept_state, &recept);
        self.recept = Some(recept);
        self.concept = Some(concept);
    }

    pub fn update_period(&mut self, period: f64) {
        self.dts.update_period(period);
    }

    pub fn update_phase(&mut self, phase: f64) {
        self.dts.update_phase(phase);
    }

    /// Feed the concept's average instantaneous period back in as the new
    /// target period, unless it has drifted below [`MIN_FEEDBACK_PERIOD`].
    pub fn update_from_concept(&mut self) {
        if let Some(concept) = self.concept {
            if concept.avg_instant_period > MIN_FEEDBACK_PERIOD {
                self.update_period(concept.avg_instant_period);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensor_reports_no_recept_before_first_sample() {
        let field = ReceptiveField::new(10.0, 0.0, 1.0, 1.0);
        let sensor = PeriodSensor::new(field);
        assert!(sensor.recept().is_none());
    }

    #[test]
    fn sensor_converges_on_matching_tone() {
        let field = ReceptiveField::new(10.0, 0.0, 1.0, 1.0);
        let mut sensor = PeriodSensor::new(field);
        for t in 0..2000 {
            let t = t as f64;
            let x = (crate::tau::tau2rad(t / 10.0)).sin();
            sensor.sample(t, x);
        }
        let concept = sensor.concept().unwrap();
        assert!((concept.avg_instant_period_offset).abs() < 1.0);
    }

    #[test]
    fn update_from_concept_ignores_subnyquist_estimates() {
        let field = ReceptiveField::new(10.0, 0.0, 1.0, 1.0);
        let mut sensor = PeriodSensor::new(field);
        sensor.sample(0.0, 1.0);
        sensor.concept = Some(PeriodConcept {
            avg_instant_period: 1.0,
            avg_instant_period_offset: 0.0,
            instant_period_delta: 0.0,
            instant_period_stddev: 0.0,
        });
        let before = sensor.field().period;
        sensor.update_from_concept();
        assert_eq!(sensor.field().period, before);
    }
}
