use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Simulation configuration parameters.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Initial population.
    pub init: InitConfig,
    /// Run length and random seed.
    pub run: RunConfig,
}

/// Composition of the initial population.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InitConfig {
    /// Number of alpha pairs founded together with a litter.
    pub n_packs_with_pups: usize,
    /// Number of pubs in each of those litters.
    pub n_pups_per_pack: usize,
    /// Number of unattached pubs.
    pub n_lone_pups: usize,
    /// Number of unattached vagrants.
    pub n_vagrants: usize,
    /// Number of alpha pairs without members.
    pub n_pairs: usize,
}

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            n_packs_with_pups: 8,
            n_pups_per_pack: 4,
            n_lone_pups: 10,
            n_vagrants: 12,
            n_pairs: 9,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Number of monthly steps per run.
    pub n_steps: usize,
    /// Seed of the random number generator (drawn from the OS if absent).
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            n_steps: 145,
            seed: None,
        }
    }
}

impl Config {
    /// Load a [`Config`] from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        let config: Config = toml::from_str(&contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let init = &self.init;
        check_num(init.n_packs_with_pups, 0..=100).context("invalid number of packs with pups")?;
        check_num(init.n_pups_per_pack, 0..=20).context("invalid number of pups per pack")?;
        check_num(init.n_lone_pups, 0..=1_000).context("invalid number of lone pups")?;
        check_num(init.n_vagrants, 0..=1_000).context("invalid number of vagrants")?;
        check_num(init.n_pairs, 0..=100).context("invalid number of pairs")?;

        // Every initial pack claims a territory; keep them well below grid capacity.
        check_num(init.n_packs_with_pups + init.n_pairs, 0..=100)
            .context("invalid total number of initial packs")?;

        check_num(self.run.n_steps, 1..=100_000).context("invalid number of steps")?;

        Ok(())
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
