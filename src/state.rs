//! Simulation state types.

/// State of a system of coupled ordinary differential equations.
///
/// Holds the current value of each state variable, the most recently
/// computed time derivative of each, and the current simulation time.
/// The number of equations is fixed at construction.
pub struct StateVector {
    values: Vec<f64>,
    derivatives: Vec<f64>,
    steps: u64,
    time: f64,
}

impl StateVector {
    /// Create a new `StateVector` with `n_eqs` state variables, all zero, at time 0.
    pub fn new(n_eqs: usize) -> Self {
        Self {
            values: vec![0.0; n_eqs],
            derivatives: vec![0.0; n_eqs],
            steps: 0,
            time: 0.0,
        }
    }

    /// Current value of each state variable.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Overwrite the state variables and reset time to 0.
    ///
    /// # Panics
    /// Panics if `values` does not match the dimension fixed at construction.
    pub fn reset(&mut self, values: &[f64]) {
        assert_eq!(values.len(), self.values.len());
        self.values.copy_from_slice(values);
        self.derivatives.fill(0.0);
        self.steps = 0;
        self.time = 0.0;
    }

    /// Current simulation time.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Split borrow used by derivative evaluation: values (shared), derivatives (mutable).
    pub(crate) fn eval_parts_mut(&mut self) -> (&[f64], &mut [f64]) {
        (&self.values, &mut self.derivatives)
    }

    /// Split borrow used by the integrator.
    pub(crate) fn step_parts_mut(&mut self) -> (&mut [f64], &[f64]) {
        (&mut self.values, &self.derivatives)
    }

    /// Advance the clock by one step of size `time_step`.
    ///
    /// The time is recomputed from the step count instead of accumulated,
    /// so the clock does not drift over long runs.
    pub(crate) fn tick(&mut self, time_step: f64) {
        self.steps += 1;
        self.time = self.steps as f64 * time_step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_are_fixed_at_construction() {
        let state = StateVector::new(3);
        assert_eq!(state.values().len(), 3);
        assert_eq!(state.time(), 0.0);
    }

    #[test]
    fn reset_seeds_values_and_clears_time() {
        let mut state = StateVector::new(2);
        state.tick(0.01);
        state.reset(&[150.0, 50.0]);
        assert_eq!(state.values(), &[150.0, 50.0]);
        assert_eq!(state.time(), 0.0);
    }

    #[test]
    fn clock_does_not_drift() {
        let mut state = StateVector::new(1);
        for _ in 0..100_000 {
            state.tick(0.01);
        }
        // Accumulating `time += h` instead would land just below 1000.
        assert!(state.time() >= 1000.0);
    }

    #[test]
    #[should_panic]
    fn reset_rejects_mismatched_dimension() {
        let mut state = StateVector::new(2);
        state.reset(&[1.0, 2.0, 3.0]);
    }
}
