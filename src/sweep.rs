//! Full-factorial parameter sweep.

use crate::engine::Simulation;
use crate::model::{PredatorPreyPesticide, Rates};
use anyhow::{Context, Result};
use std::io::Write;

/// Number of perturbed rate constants.
pub const N_FACTORS: usize = 6;

/// Header of the textual sweep report. Column order is fixed: the six
/// factor levels in factor order, then the mean of each state dimension.
pub const CSV_HEADER: &str =
    "prey_birth,prey_death,pred_birth,pred_death,pest_use,pest_decay,mean_prey,mean_pred,mean_pest";

/// Summary of one sweep combination.
///
/// `levels[i]` is 0 if factor `i` took its low value (`base * (1 - scale)`)
/// and 1 if it took its high value (`base * (1 + scale)`). Factor order:
/// prey birth, prey death, predator birth, predator death, pesticide use,
/// pesticide decay.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepRow {
    pub levels: [u8; N_FACTORS],
    pub means: [f64; 3],
}

/// Full-factorial sweep over the pesticide model's six rate constants.
///
/// Each of the 2^6 = 64 combinations perturbs every rate independently to
/// `base * (1 ± scale)` and runs a fresh three-species simulation from the
/// same initial populations to the same end time. Runs are independent;
/// rows are emitted in combination-index order.
pub struct Sweep {
    base: Rates,
    scale: f64,
    init: [f64; 3],
    end_time: f64,
    time_step: f64,
    steps_per_record: usize,
}

impl Sweep {
    pub fn new(
        base: Rates,
        scale: f64,
        init: [f64; 3],
        end_time: f64,
        time_step: f64,
        steps_per_record: usize,
    ) -> Self {
        Self {
            base,
            scale,
            init,
            end_time,
            time_step,
            steps_per_record,
        }
    }

    /// Run all 64 combinations and collect their summary rows.
    ///
    /// A combination whose derivative evaluation fails is logged and
    /// excluded from the result; it is never replaced by a defaulted row.
    pub fn run(&self) -> Vec<SweepRow> {
        let n_combinations = 1usize << N_FACTORS;
        let mut rows = Vec::with_capacity(n_combinations);

        for mask in 0..n_combinations {
            let levels = decode_levels(mask);
            match self.run_combination(mask) {
                Ok(means) => rows.push(SweepRow { levels, means }),
                Err(error) => {
                    log::warn!("combination {levels:?} aborted: {error}");
                }
            }
        }

        rows
    }

    fn run_combination(&self, mask: usize) -> Result<[f64; 3]> {
        let rates = self.perturbed_rates(mask);
        let mut sim = Simulation::new(PredatorPreyPesticide::new(rates), self.time_step);
        sim.initialize(&self.init);

        while sim.now() < self.end_time {
            sim.advance(self.steps_per_record)
                .context("failed to advance simulation")?;
        }

        let summary = sim.summary();
        Ok([summary[0], summary[1], summary[2]])
    }

    fn perturbed_rates(&self, mask: usize) -> Rates {
        let pick = |bit: usize, base: f64| {
            if mask >> bit & 1 == 1 {
                base * (1.0 + self.scale)
            } else {
                base * (1.0 - self.scale)
            }
        };
        Rates {
            prey_birth: pick(0, self.base.prey_birth),
            prey_death: pick(1, self.base.prey_death),
            pred_birth: pick(2, self.base.pred_birth),
            pred_death: pick(3, self.base.pred_death),
            pest_use: pick(4, self.base.pest_use),
            pest_decay: pick(5, self.base.pest_decay),
        }
    }
}

fn decode_levels(mask: usize) -> [u8; N_FACTORS] {
    std::array::from_fn(|bit| (mask >> bit & 1) as u8)
}

/// Write the sweep report as comma-separated text with a header row.
pub fn write_csv<W: Write>(writer: &mut W, rows: &[SweepRow]) -> Result<()> {
    writeln!(writer, "{CSV_HEADER}").context("failed to write header")?;
    for row in rows {
        for level in row.levels {
            write!(writer, "{level},").context("failed to write level")?;
        }
        let [prey, pred, pest] = row.means;
        writeln!(writer, "{prey},{pred},{pest}").context("failed to write means")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::HashSet;

    fn base_rates() -> Rates {
        Rates {
            prey_birth: 0.05,
            prey_death: 0.001,
            pred_birth: 0.0005,
            pred_death: 0.01,
            pest_use: 0.0005,
            pest_decay: 0.05,
        }
    }

    fn short_sweep() -> Sweep {
        Sweep::new(base_rates(), 0.1, [20.0, 60.0, 0.5], 10.0, 0.01, 10)
    }

    #[test]
    fn sweep_covers_all_combinations_once() {
        let rows = short_sweep().run();
        assert_eq!(rows.len(), 64);

        let distinct: HashSet<_> = rows.iter().map(|row| row.levels).collect();
        assert_eq!(distinct.len(), 64);
    }

    #[test]
    fn levels_decode_the_combination_index() {
        assert_eq!(decode_levels(0), [0; 6]);
        assert_eq!(decode_levels(63), [1; 6]);
        assert_eq!(decode_levels(0b100101), [1, 0, 1, 0, 0, 1]);
    }

    #[test]
    fn perturbation_scales_each_rate_symmetrically() {
        let sweep = short_sweep();
        let low = sweep.perturbed_rates(0);
        let high = sweep.perturbed_rates(63);

        assert_relative_eq!(low.prey_birth, 0.05 * 0.9);
        assert_relative_eq!(high.prey_birth, 0.05 * 1.1);
        assert_relative_eq!(low.pest_decay, 0.05 * 0.9);
        assert_relative_eq!(high.pest_decay, 0.05 * 1.1);
    }

    #[test]
    fn sweep_is_deterministic() {
        let sweep = short_sweep();
        let mut first = Vec::new();
        let mut second = Vec::new();
        write_csv(&mut first, &sweep.run()).unwrap();
        write_csv(&mut second, &sweep.run()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn failed_combinations_are_excluded() {
        // Pesticide only decays, so every run drives it to zero and aborts.
        let rates = Rates {
            pest_use: 0.0,
            pest_decay: 1.0,
            ..base_rates()
        };
        let sweep = Sweep::new(rates, 0.1, [20.0, 60.0, 0.5], 10.0, 0.01, 10);
        assert!(sweep.run().is_empty());
    }

    #[test]
    fn csv_has_header_and_one_line_per_row() {
        let rows = vec![SweepRow {
            levels: [0, 1, 0, 1, 0, 1],
            means: [1.5, 2.5, 0.5],
        }];
        let mut out = Vec::new();
        write_csv(&mut out, &rows).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));
        assert_eq!(lines.next(), Some("0,1,0,1,0,1,1.5,2.5,0.5"));
        assert_eq!(lines.next(), None);
    }
}
