use crate::model::Rates;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Simulation configuration parameters.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Config {
    pub model: ModelConfig,
    pub init: InitConfig,
    pub output: OutputConfig,
    pub sweep: SweepConfig,
}

/// Biological rate constants of the models.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
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

/// Initial populations.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct InitConfig {
    /// Initial prey weight.
    pub prey: f64,
    /// Initial predator weight.
    pub pred: f64,
    /// Initial pesticide level.
    pub pest: f64,
}

/// Integration and recording parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Simulated time at which a run stops.
    pub end_time: f64,
    /// Fixed integration step size.
    pub time_step: f64,
    /// Number of integration steps between recorded samples.
    pub steps_per_record: usize,
}

/// Factorial sweep parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Symmetric perturbation fraction applied to each rate constant.
    pub scale: f64,
}

impl Config {
    /// Load a [`Config`] from a TOML file.
    ///
    /// Performs validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        let config: Config =
            toml::from_str(&contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        check_num(self.model.prey_birth, 0.0..100.0).context("invalid prey birth rate")?;
        check_num(self.model.prey_death, 0.0..100.0).context("invalid prey death rate")?;
        check_num(self.model.pred_birth, 0.0..100.0).context("invalid predator birth rate")?;
        check_num(self.model.pred_death, 0.0..100.0).context("invalid predator death rate")?;
        check_num(self.model.pest_use, 0.0..100.0).context("invalid pesticide use rate")?;
        check_num(self.model.pest_decay, 0.0..100.0).context("invalid pesticide decay rate")?;

        check_num(self.init.prey, 0.0..1e9).context("invalid initial prey weight")?;
        check_num(self.init.pred, 0.0..1e9).context("invalid initial predator weight")?;
        check_num(self.init.pest, 0.0..1e9).context("invalid initial pesticide level")?;

        check_num(self.output.end_time, 1e-9..1e9).context("invalid end time")?;
        check_num(self.output.time_step, 1e-9..1e9).context("invalid time step")?;
        if self.output.time_step > self.output.end_time {
            bail!("time step must not exceed the end time");
        }
        check_num(self.output.steps_per_record, 1..1_000_000)
            .context("invalid number of steps per record")?;

        check_num(self.sweep.scale, 0.0..1.0).context("invalid perturbation scale")?;

        Ok(())
    }

    /// Rate constants of the model section.
    pub fn rates(&self) -> Rates {
        Rates {
            prey_birth: self.model.prey_birth,
            prey_death: self.model.prey_death,
            pred_birth: self.model.pred_birth,
            pred_death: self.model.pred_death,
            pest_use: self.model.pest_use,
            pest_decay: self.model.pest_decay,
        }
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}
