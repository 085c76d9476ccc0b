use crate::model::{Equations, NumericDomainError};
use crate::state::StateVector;
use crate::stats::Accumulator;
use crate::stepper::EulerStepper;

/// Simulation engine.
///
/// Owns the system of equations, the state vector, and the stepper, and
/// accumulates a time-indexed history of the state, recorded once per
/// [`Simulation::advance`] call rather than once per integration step.
pub struct Simulation<E: Equations> {
    eqs: E,
    state: StateVector,
    stepper: EulerStepper,
    history: Vec<Vec<f64>>,
    timestamps: Vec<f64>,
}

impl<E: Equations> Simulation<E> {
    /// Create a new `Simulation` with the given equations and step size.
    pub fn new(eqs: E, time_step: f64) -> Self {
        let dim = eqs.dim();
        Self {
            eqs,
            state: StateVector::new(dim),
            stepper: EulerStepper::new(time_step),
            history: vec![Vec::new(); dim],
            timestamps: Vec::new(),
        }
    }

    /// Set the initial state and seed the history with a single sample at time 0.
    ///
    /// # Panics
    /// Panics if `values` does not match the dimension of the equations.
    pub fn initialize(&mut self, values: &[f64]) {
        self.state.reset(values);
        for (series, &val) in self.history.iter_mut().zip(values) {
            series.clear();
            series.push(val);
        }
        self.timestamps.clear();
        self.timestamps.push(0.0);
    }

    /// Advance the state by `count` integration steps, then record one sample.
    ///
    /// Each step recomputes the derivatives from the current state before
    /// delegating to the stepper. Intermediate sub-step states are not
    /// recorded.
    ///
    /// # Errors
    /// Returns a [`NumericDomainError`] if derivative evaluation fails, in
    /// which case the state and history are left as of the last good step
    /// and the run should be abandoned.
    pub fn advance(&mut self, count: usize) -> Result<(), NumericDomainError> {
        for _ in 0..count {
            let (values, derivatives) = self.state.eval_parts_mut();
            self.eqs.derivatives(values, derivatives)?;
            self.stepper.step(&mut self.state);
        }

        for (series, &val) in self.history.iter_mut().zip(self.state.values()) {
            series.push(val);
        }
        self.timestamps.push(self.state.time());

        Ok(())
    }

    /// Arithmetic mean of the recorded history, one entry per state dimension.
    pub fn summary(&self) -> Vec<f64> {
        self.history
            .iter()
            .map(|series| {
                let mut acc = Accumulator::new();
                for &val in series {
                    acc.add(val);
                }
                acc.mean()
            })
            .collect()
    }

    /// Current simulation time.
    pub fn now(&self) -> f64 {
        self.state.time()
    }

    /// Current value of each state variable.
    pub fn values(&self) -> &[f64] {
        self.state.values()
    }

    /// Recorded history, one time series per state dimension.
    pub fn history(&self) -> &[Vec<f64>] {
        &self.history
    }

    /// Recording times, parallel to each history series.
    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PredatorPrey, PredatorPreyPesticide, Rates};
    use approx::assert_relative_eq;

    const ZERO_RATES: Rates = Rates {
        prey_birth: 0.0,
        prey_death: 0.0,
        pred_birth: 0.0,
        pred_death: 0.0,
        pest_use: 0.0,
        pest_decay: 0.0,
    };

    #[test]
    fn zero_rates_conserve_populations() {
        let mut sim = Simulation::new(PredatorPrey::new(ZERO_RATES), 0.01);
        sim.initialize(&[150.0, 50.0]);

        while sim.now() < 10.0 {
            sim.advance(1).unwrap();
        }

        assert_relative_eq!(sim.values()[0], 150.0);
        assert_relative_eq!(sim.values()[1], 50.0);
        assert!(sim.history()[0].iter().all(|&val| val == 150.0));
        assert!(sim.history()[1].iter().all(|&val| val == 50.0));
    }

    #[test]
    fn two_species_scenario_records_expected_history() {
        let rates = Rates {
            prey_birth: 0.05,
            prey_death: 0.001,
            pred_birth: 0.0005,
            pred_death: 0.01,
            ..ZERO_RATES
        };
        let mut sim = Simulation::new(PredatorPrey::new(rates), 0.01);
        sim.initialize(&[150.0, 50.0]);

        while sim.now() < 1000.0 {
            sim.advance(1).unwrap();
        }

        // One seed sample plus one per advance call.
        assert_eq!(sim.timestamps().len(), 100_001);
        assert_eq!(sim.history()[0].len(), 100_001);
        assert_eq!(sim.history()[1].len(), 100_001);
        for series in sim.history() {
            assert!(series.iter().all(|val| val.is_finite()));
        }
    }

    #[test]
    fn advance_respects_reporting_interval() {
        let mut sim = Simulation::new(PredatorPrey::new(ZERO_RATES), 0.01);
        sim.initialize(&[1.0, 1.0]);

        sim.advance(100).unwrap();

        assert_relative_eq!(sim.now(), 1.0, epsilon = 1e-12);
        assert_eq!(sim.timestamps().len(), 2);
    }

    #[test]
    fn summary_is_idempotent() {
        let rates = Rates {
            prey_birth: 0.05,
            prey_death: 0.001,
            pred_birth: 0.0005,
            pred_death: 0.01,
            ..ZERO_RATES
        };
        let mut sim = Simulation::new(PredatorPrey::new(rates), 0.01);
        sim.initialize(&[150.0, 50.0]);
        for _ in 0..100 {
            sim.advance(10).unwrap();
        }

        let first = sim.summary();
        let second = sim.summary();
        assert_eq!(first, second);
    }

    #[test]
    fn initialize_resets_history() {
        let mut sim = Simulation::new(PredatorPrey::new(ZERO_RATES), 0.01);
        sim.initialize(&[1.0, 2.0]);
        sim.advance(5).unwrap();
        sim.initialize(&[3.0, 4.0]);

        assert_eq!(sim.timestamps(), &[0.0]);
        assert_eq!(sim.history()[0], vec![3.0]);
        assert_eq!(sim.history()[1], vec![4.0]);
        assert_relative_eq!(sim.now(), 0.0);
    }

    #[test]
    fn pesticide_domain_error_aborts_advance() {
        let rates = Rates {
            pest_use: 0.0005,
            pest_decay: 0.05,
            ..ZERO_RATES
        };
        let mut sim = Simulation::new(PredatorPreyPesticide::new(rates), 0.01);
        sim.initialize(&[20.0, 60.0, 0.0]);

        assert!(sim.advance(1).is_err());
        // Nothing was recorded past the seed sample.
        assert_eq!(sim.timestamps().len(), 1);
    }
}
