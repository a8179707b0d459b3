use crate::analysis::Analyzer;
use crate::config::Config;
use crate::engine::Engine;
use anyhow::{Context, Result};
use glob::glob;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Owns a simulation directory: its config and its `run-NNNN` run directories.
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

    /// Simulate a new run in the next free run directory.
    pub fn create_run(&self) -> Result<()> {
        let run_idx = self.run_dirs().context("failed to list run dirs")?.len();

        let run_dir = self.run_dir(run_idx);
        fs::create_dir_all(&run_dir).with_context(|| format!("failed to create {run_dir:?}"))?;
        log::info!("created {run_dir:?}");

        // Offset a fixed seed so that runs differ but stay reproducible.
        let mut cfg = self.cfg.clone();
        cfg.run.seed = cfg.run.seed.map(|seed| seed.wrapping_add(run_idx as u64));

        let mut engine = Engine::generate_initial_condition(cfg)
            .context("failed to generate initial condition")?;
        engine
            .perform_simulation(self.records_file(run_idx))
            .context("failed to perform simulation")?;

        Ok(())
    }

    /// Summarize the records of every run.
    pub fn analyze_sim(&self) -> Result<()> {
        let n_runs = self.run_dirs().context("failed to list run dirs")?.len();
        for run_idx in 0..n_runs {
            let mut analyzer = Analyzer::new(self.cfg.clone());

            analyzer
                .add_file(self.records_file(run_idx))
                .context("failed to add file")?;

            analyzer
                .save_results(self.results_file(run_idx))
                .context("failed to save results")?;
            log::info!("analyzed {:?}", self.run_dir(run_idx));
        }

        Ok(())
    }

    /// Remove every run directory.
    pub fn clean_sim(&self) -> Result<()> {
        for run_dir in self.run_dirs().context("failed to list run dirs")? {
            fs::remove_dir_all(&run_dir)
                .with_context(|| format!("failed to remove {run_dir:?}"))?;
            log::info!("removed {run_dir:?}");
        }

        Ok(())
    }

    fn run_dirs(&self) -> Result<Vec<PathBuf>> {
        let pattern = self.sim_dir.join("run-*");
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        let run_dirs = glob(pattern)
            .context("failed to glob run dirs")?
            .filter_map(Result::ok)
            .filter(|p| p.is_dir())
            .collect();
        Ok(run_dirs)
    }

    fn run_dir(&self, run_idx: usize) -> PathBuf {
        self.sim_dir.join(format!("run-{run_idx:04}"))
    }

    fn records_file(&self, run_idx: usize) -> PathBuf {
        self.run_dir(run_idx).join("records.msgpack")
    }

    fn results_file(&self, run_idx: usize) -> PathBuf {
        self.run_dir(run_idx).join("results.msgpack")
    }
}
