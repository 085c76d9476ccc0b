//! Fixed-step explicit Euler integrator.

use crate::state::StateVector;

/// Forward Euler stepper with a fixed step size.
///
/// Advances a [`StateVector`] one increment at a time, assuming its
/// derivatives were freshly computed for the current values. First-order
/// and conditionally stable: the step size must be small relative to the
/// fastest timescale in the model. No validation of derivative magnitude
/// or boundedness is performed; that is the model's concern.
pub struct EulerStepper {
    time_step: f64,
}

impl EulerStepper {
    /// Create a stepper with the given fixed step size.
    ///
    /// # Panics
    /// Panics if `time_step` is not strictly positive.
    pub fn new(time_step: f64) -> Self {
        assert!(time_step > 0.0, "time step must be strictly positive");
        Self { time_step }
    }

    /// Advance the state one step: `values[i] += derivatives[i] * h`, `time += h`.
    pub fn step(&self, state: &mut StateVector) {
        let (values, derivatives) = state.step_parts_mut();
        for (val, der) in values.iter_mut().zip(derivatives) {
            *val += der * self.time_step;
        }
        state.tick(self.time_step);
    }
}
