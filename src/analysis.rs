use crate::config::Config;
use crate::stats::{TimeSeries, TimeSeriesReport};
use crate::types::Record;
use anyhow::{Context, Result};
use rmp_serde::{decode, encode};
use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

type Extractor = fn(&Record) -> f64;

/// Observables summarized for every run.
const OBSERVABLES: [(&str, Extractor); 9] = [
    ("n_wolves", |rec| rec.n_wolves as f64),
    ("n_packs", |rec| rec.n_packs as f64),
    ("n_pairs", |rec| rec.n_pairs as f64),
    ("n_pubs", |rec| rec.n_pubs as f64),
    ("n_subadults", |rec| rec.n_subadults as f64),
    ("n_vagrants", |rec| rec.n_vagrants as f64),
    ("n_adults", |rec| rec.n_adults as f64),
    ("n_females", |rec| rec.n_females as f64),
    ("avg_age", |rec| rec.avg_age),
];

/// Reads the records of a run and summarizes every observable.
pub struct Analyzer {
    cfg: Config,
    series: Vec<TimeSeries>,
}

impl Analyzer {
    pub fn new(cfg: Config) -> Self {
        let mut series = Vec::new();
        series.resize_with(OBSERVABLES.len(), TimeSeries::new);
        Self { cfg, series }
    }

    /// Add every record of a file written by the engine.
    pub fn add_file<P: AsRef<Path>>(&mut self, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
        let mut reader = BufReader::new(file);

        for i_step in 0..self.cfg.run.n_steps {
            let record: Record = decode::from_read(&mut reader)
                .with_context(|| format!("failed to deserialize record {i_step}"))?;
            self.update(&record);
        }

        Ok(())
    }

    pub fn report(&self) -> BTreeMap<String, TimeSeriesReport> {
        OBSERVABLES
            .iter()
            .zip(&self.series)
            .map(|((name, _), series)| (name.to_string(), series.report()))
            .collect()
    }

    /// Save the summary of every observable to a binary file.
    pub fn save_results<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        let results = self.report();
        for (name, report) in &results {
            log::info!("{name}: {report:?}");
        }

        let file = file.as_ref();
        let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        let mut writer = BufWriter::new(file);
        encode::write_named(&mut writer, &results).context("failed to serialize results")?;
        writer.flush().context("failed to flush writer stream")?;

        Ok(())
    }

    fn update(&mut self, record: &Record) {
        for ((_, extract), series) in OBSERVABLES.iter().zip(&mut self.series) {
            series.push(extract(record));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use std::{env, fs};

    #[test]
    fn summarizes_a_simulated_run() {
        let dir = env::temp_dir().join(format!("wolfpack-analysis-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("failed to create scratch dir");
        let records_file = dir.join("records.msgpack");

        let mut cfg = Config::default();
        cfg.run.n_steps = 24;
        cfg.run.seed = Some(21);

        let mut engine = Engine::generate_initial_condition(cfg.clone()).unwrap();
        engine.perform_simulation(&records_file).unwrap();

        let mut analyzer = Analyzer::new(cfg);
        analyzer.add_file(&records_file).unwrap();
        let report = analyzer.report();

        assert_eq!(report.len(), OBSERVABLES.len());
        let n_wolves = &report["n_wolves"];
        assert_eq!(n_wolves.n_vals, 24);
        assert!(n_wolves.min > 0.0);
        assert!(report["n_pairs"].max >= 9.0);

        analyzer
            .save_results(dir.join("results.msgpack"))
            .unwrap();
        assert!(dir.join("results.msgpack").exists());

        fs::remove_dir_all(&dir).ok();
    }
}
