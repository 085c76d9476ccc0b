//! Population-dynamics model definitions.

use thiserror::Error;

/// The single named numeric failure mode of the models.
///
/// Derivative evaluation hit an undefined operation or produced a
/// non-finite value. Not recovered from: it aborts the affected run.
#[derive(Debug, Error)]
pub enum NumericDomainError {
    #[error("pesticide level must be strictly positive, but is {0}")]
    NonPositivePesticide(f64),

    #[error("derivative of state variable {index} is not finite ({value})")]
    NonFiniteDerivative { index: usize, value: f64 },
}

/// A system of coupled ordinary differential equations.
///
/// Implementors compute the time derivatives from the current state
/// variables; integration is delegated to [`crate::stepper::EulerStepper`]
/// by the owning [`crate::engine::Simulation`].
pub trait Equations {
    /// Number of coupled equations.
    fn dim(&self) -> usize;

    /// Compute `derivatives` from `values`. Both slices have length [`Self::dim`].
    fn derivatives(
        &self,
        values: &[f64],
        derivatives: &mut [f64],
    ) -> Result<(), NumericDomainError>;
}

/// Biological rate constants shared by both model variants.
///
/// Immutable after construction. The two-species model ignores the
/// pesticide rates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rates {
    /// Prey birth rate.
    pub prey_birth: f64,
    /// Prey death rate per predator encounter.
    pub prey_death: f64,
    /// Predator birth rate per prey encounter.
    pub pred_birth: f64,
    /// Predator death rate.
    pub pred_death: f64,
    /// Pesticide application rate per predator.
    pub pest_use: f64,
    /// Pesticide decay rate.
    pub pest_decay: f64,
}

fn check_finite(derivatives: &[f64]) -> Result<(), NumericDomainError> {
    for (index, &value) in derivatives.iter().enumerate() {
        if !value.is_finite() {
            return Err(NumericDomainError::NonFiniteDerivative { index, value });
        }
    }
    Ok(())
}

/// Classic two-species Lotka-Volterra system.
///
/// State variables: prey weight, predator weight.
pub struct PredatorPrey {
    rates: Rates,
}

impl PredatorPrey {
    pub fn new(rates: Rates) -> Self {
        Self { rates }
    }
}

impl Equations for PredatorPrey {
    fn dim(&self) -> usize {
        2
    }

    fn derivatives(
        &self,
        values: &[f64],
        derivatives: &mut [f64],
    ) -> Result<(), NumericDomainError> {
        let (prey, pred) = (values[0], values[1]);
        let r = &self.rates;

        derivatives[0] = r.prey_birth * prey - r.prey_death * prey * pred;
        derivatives[1] = r.pred_birth * prey * pred - r.pred_death * pred;

        check_finite(derivatives)
    }
}

/// Three-species variant coupling the predator-prey system to a pesticide level.
///
/// State variables: prey weight, predator weight, pesticide level. The
/// pesticide enters through `sqrt` and a division, so the level must stay
/// strictly positive; a non-positive level is reported as a
/// [`NumericDomainError`] rather than clamped.
pub struct PredatorPreyPesticide {
    rates: Rates,
}

impl PredatorPreyPesticide {
    pub fn new(rates: Rates) -> Self {
        Self { rates }
    }
}

impl Equations for PredatorPreyPesticide {
    fn dim(&self) -> usize {
        3
    }

    fn derivatives(
        &self,
        values: &[f64],
        derivatives: &mut [f64],
    ) -> Result<(), NumericDomainError> {
        let (prey, pred, pest) = (values[0], values[1], values[2]);
        let r = &self.rates;

        // Negated comparison also rejects NaN.
        if !(pest > 0.0) {
            return Err(NumericDomainError::NonPositivePesticide(pest));
        }

        derivatives[0] = r.prey_birth * prey - r.prey_death * prey * pred * pest.sqrt();
        derivatives[1] = r.pred_birth * prey * pred - r.pred_death * pred * pest;
        derivatives[2] = r.pest_use * pred / pest.sqrt() - r.pest_decay;

        check_finite(derivatives)
    }
}
