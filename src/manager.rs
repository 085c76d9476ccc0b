use crate::config::Config;
use crate::engine::Simulation;
use crate::model::{Equations, PredatorPrey, PredatorPreyPesticide};
use crate::stats::Accumulator;
use crate::sweep::{self, Sweep};
use anyhow::{Context, Result};
use std::{
    fs::File,
    io::{BufWriter, Write, stdout},
    path::{Path, PathBuf},
};

/// Ties a simulation directory and its configuration to the CLI commands.
///
/// The core only exposes state, history, and summaries; all text formatting
/// and file naming happens here.
pub struct Manager {
    sim_dir: PathBuf,
    cfg: Config,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(sim_dir: P) -> Result<Self> {
        let sim_dir = sim_dir.as_ref().to_path_buf();

        let cfg =
            Config::from_file(sim_dir.join("config.toml")).context("failed to construct cfg")?;
        log::info!("{cfg:#?}");

        Ok(Self { sim_dir, cfg })
    }

    /// Run a single simulation to the configured end time and print a report.
    ///
    /// The two-species variant prints one line per recorded sample; both
    /// variants end with a per-dimension mean summary.
    pub fn run_simulation(&self, pesticide: bool) -> Result<()> {
        let cfg = &self.cfg;
        let out = stdout();
        let mut out = out.lock();

        if pesticide {
            let mut sim = Simulation::new(PredatorPreyPesticide::new(cfg.rates()), cfg.output.time_step);
            sim.initialize(&[cfg.init.prey, cfg.init.pred, cfg.init.pest]);
            self.drive(&mut sim)?;
            report_summary(&mut out, &sim, &["prey", "predator", "pesticide"])?;
        } else {
            let mut sim = Simulation::new(PredatorPrey::new(cfg.rates()), cfg.output.time_step);
            sim.initialize(&[cfg.init.prey, cfg.init.pred]);

            while sim.now() < cfg.output.end_time {
                sim.advance(cfg.output.steps_per_record)
                    .context("failed to advance simulation")?;
                let values = sim.values();
                writeln!(
                    out,
                    "time={:10.6} prey={:10.6} predator={:10.6}",
                    sim.now(),
                    values[0],
                    values[1]
                )?;
            }
            report_summary(&mut out, &sim, &["prey", "predator"])?;
        }

        Ok(())
    }

    fn drive<E: Equations>(&self, sim: &mut Simulation<E>) -> Result<()> {
        let n_records = (self.cfg.output.end_time
            / (self.cfg.output.time_step * self.cfg.output.steps_per_record as f64))
            .ceil() as usize;
        let mut recorded = 0usize;

        while sim.now() < self.cfg.output.end_time {
            sim.advance(self.cfg.output.steps_per_record)
                .context("failed to advance simulation")?;

            recorded += 1;
            if recorded % (n_records / 10).max(1) == 0 {
                let progress = 100.0 * recorded as f64 / n_records as f64;
                log::info!("completed {progress:06.2}%");
            }
        }

        Ok(())
    }

    /// Run the full-factorial sweep and write its report to `sweep.csv`.
    pub fn run_sweep(&self) -> Result<()> {
        let cfg = &self.cfg;
        let sweep = Sweep::new(
            cfg.rates(),
            cfg.sweep.scale,
            [cfg.init.prey, cfg.init.pred, cfg.init.pest],
            cfg.output.end_time,
            cfg.output.time_step,
            cfg.output.steps_per_record,
        );

        let rows = sweep.run();
        log::info!("completed {} of 64 combinations", rows.len());

        let file = self.sweep_file();
        let file = File::create(&file).with_context(|| format!("failed to create {file:?}"))?;
        let mut writer = BufWriter::new(file);
        sweep::write_csv(&mut writer, &rows).context("failed to write sweep report")?;
        writer.flush().context("failed to flush writer stream")?;

        log::info!("wrote {:?}", self.sweep_file());

        Ok(())
    }

    fn sweep_file(&self) -> PathBuf {
        self.sim_dir.join("sweep.csv")
    }
}

fn report_summary<W: Write, E: Equations>(
    out: &mut W,
    sim: &Simulation<E>,
    names: &[&str],
) -> Result<()> {
    writeln!(
        out,
        "recorded {} samples up to time {:.2}",
        sim.timestamps().len(),
        sim.now()
    )?;
    for (name, series) in names.iter().zip(sim.history()) {
        let mut acc = Accumulator::new();
        for &val in series {
            acc.add(val);
        }
        writeln!(
            out,
            "{name}: mean={:10.6} std_dev={:10.6}",
            acc.mean(),
            acc.std_dev()
        )?;
    }
    Ok(())
}
