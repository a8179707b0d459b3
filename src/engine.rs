use crate::config::Config;
use crate::grid::{GRID_HEIGHT, GRID_WIDTH, Grid};
use crate::pack::{Pack, PackState};
use crate::types::{Gender, PackId, Pos, Record, Status, WolfId, WolfView};
use crate::wolf::{MAX_AGE, Wolf, WolfTraits};
use anyhow::{Context, Result};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::Uniform;
use rmp_serde::encode;
use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

mod placement;


/// Month index at which packs breed.
const BREEDING_MONTH: usize = 5;
/// Upper bound of the survival draw; compared against each wolf's survival probability.
const SURVIVAL_DRAW_MAX: f64 = 0.78;
/// Members of a dissolved pack at most this old die with it.
const MAX_ORPHAN_AGE: u32 = 6;

/// Simulation engine.
///
/// Owns the population, the packs, the grid and the random number generator,
/// and advances them one month per [`Engine::step`].
pub struct Engine {
    cfg: Config,
    rng: ChaCha12Rng,

    step: usize,
    next_wolf_id: WolfId,
    next_pack_id: PackId,

    wolves: BTreeMap<WolfId, Wolf>,
    packs: BTreeMap<PackId, Pack>,
    grid: Grid,
}

impl Engine {
    /// Create an `Engine` with an empty world.
    pub fn new(cfg: Config) -> Result<Self> {
        cfg.validate().context("failed to validate config")?;

        let seed = cfg.run.seed.unwrap_or_else(rand::random);
        log::info!("seeding rng with {seed}");

        Ok(Self {
            cfg,
            rng: ChaCha12Rng::seed_from_u64(seed),
            step: 0,
            next_wolf_id: 0,
            next_pack_id: 0,
            wolves: BTreeMap::new(),
            packs: BTreeMap::new(),
            grid: Grid::new(GRID_WIDTH, GRID_HEIGHT),
        })
    }

    /// Create an `Engine` populated according to the configuration.
    pub fn generate_initial_condition(cfg: Config) -> Result<Self> {
        let mut engine = Self::new(cfg)?;
        engine
            .seed_population()
            .context("failed to seed initial population")?;
        log::info!(
            "seeded {} wolves in {} packs",
            engine.n_wolves(),
            engine.packs.len()
        );
        Ok(engine)
    }

    /// Perform the simulation and save a record of every step to a binary file.
    pub fn perform_simulation<P: AsRef<Path>>(&mut self, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        let mut writer = BufWriter::new(file);

        let n_steps = self.cfg.run.n_steps;
        let steps_per_report = (n_steps / 10).max(1);
        for i_step in 0..n_steps {
            let record = self.record();
            encode::write(&mut writer, &record).context("failed to serialize record")?;

            self.step().context("failed to perform step")?;

            if (i_step + 1) % steps_per_report == 0 || i_step + 1 == n_steps {
                let progress = 100.0 * (i_step + 1) as f64 / n_steps as f64;
                log::info!(
                    "completed {progress:06.2}% ({} wolves, {} packs)",
                    self.n_wolves(),
                    self.n_packs()
                );
            }
        }

        writer.flush().context("failed to flush writer stream")?;

        Ok(())
    }

    /// Advance the simulation by one month.
    pub fn step(&mut self) -> Result<()> {
        self.step += 1;

        self.survival_of_wolves()
            .context("failed to apply survival")?;
        self.dispersal_of_wolves()
            .context("failed to apply dispersal")?;
        self.removal_of_packs()
            .context("failed to remove dissolved packs")?;
        self.settlement_of_vagrants()
            .context("failed to settle vagrants")?;
        self.ageing_of_wolves();
        self.transition_of_wolves();

        if self.month() == BREEDING_MONTH {
            self.reproduction_of_packs()
                .context("failed to apply reproduction")?;
        }

        self.relocate_all().context("failed to move wolves")?;

        Ok(())
    }

    pub fn steps(&self) -> usize {
        self.step
    }

    pub fn month(&self) -> usize {
        self.step % 12
    }

    pub fn wolf(&self, id: WolfId) -> Option<&Wolf> {
        self.wolves.get(&id)
    }

    pub fn pack(&self, id: PackId) -> Option<&Pack> {
        self.packs.get(&id)
    }

    pub fn packs(&self) -> impl Iterator<Item = &Pack> {
        self.packs.values()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn wolf_views(&self) -> Vec<WolfView> {
        self.wolves.values().map(Wolf::view).collect()
    }

    pub fn n_wolves(&self) -> usize {
        self.wolves.len()
    }

    /// Packs with at least one member or alpha.
    pub fn n_packs(&self) -> usize {
        self.packs
            .values()
            .filter(|pack| !pack.members().is_empty() || pack.anchor().is_some())
            .count()
    }

    /// Packs with an alpha pair and no other members.
    pub fn n_pairs(&self) -> usize {
        self.packs
            .values()
            .filter(|pack| pack.members().is_empty() && pack.state() == PackState::Established)
            .count()
    }

    pub fn count_status(&self, status: Status) -> usize {
        self.wolves
            .values()
            .filter(|wolf| wolf.status() == status)
            .count()
    }

    pub fn count_gender(&self, gender: Gender) -> usize {
        self.wolves
            .values()
            .filter(|wolf| wolf.gender() == gender)
            .count()
    }

    /// Mean age in months, `NaN` if the population is extinct.
    pub fn avg_age(&self) -> f64 {
        if self.wolves.is_empty() {
            return f64::NAN;
        }
        let sum: u64 = self.wolves.values().map(|wolf| wolf.age() as u64).sum();
        sum as f64 / self.wolves.len() as f64
    }

    pub fn record(&self) -> Record {
        Record {
            step: self.step,
            month: self.month(),
            n_wolves: self.n_wolves(),
            n_packs: self.n_packs(),
            n_pairs: self.n_pairs(),
            n_pubs: self.count_status(Status::Pub),
            n_subadults: self.count_status(Status::Subadult),
            n_vagrants: self.count_status(Status::Vagrant),
            n_adults: self.count_status(Status::Adult),
            n_females: self.count_gender(Gender::Female),
            avg_age: self.avg_age(),
        }
    }

    /// Kill a wolf and remove it from its pack, the grid and the population.
    ///
    /// A female alpha's territory passes to the male alpha, who moves onto her cell.
    /// Returns the dead wolf, or `None` if it was not alive.
    pub fn kill(&mut self, id: WolfId) -> Result<Option<Wolf>> {
        let Some(wolf) = self.wolves.get_mut(&id) else {
            return Ok(None);
        };
        if !wolf.die() {
            return Ok(None);
        }
        let pos = wolf.pos();

        if let Some(pack_id) = wolf.pack() {
            let pack = self.get_pack(pack_id)?;
            if pack.alpha_f() == Some(id) {
                if let (Some(alpha_m), Some(pos)) = (pack.alpha_m(), pos) {
                    self.move_wolf(alpha_m, pos)?;
                }
            }
            self.detach(id)?;
        }

        let mut wolf = self
            .wolves
            .remove(&id)
            .with_context(|| format!("wolf {id} vanished while dying"))?;
        if let Some(pos) = wolf.pos() {
            self.grid.remove(id, pos);
            wolf.set_pos(None);
        }
        Ok(Some(wolf))
    }

    /// Make a wolf leave its pack, turning it into a vagrant if old enough.
    pub fn disperse(&mut self, id: WolfId) -> Result<()> {
        self.get_wolf_mut(id)?.disperse();
        self.detach(id)
    }

    fn survival_of_wolves(&mut self) -> Result<()> {
        let draw_dist = Uniform::new(0.0, SURVIVAL_DRAW_MAX)?;
        for id in self.wolf_ids() {
            let Some(wolf) = self.wolves.get(&id) else {
                continue;
            };
            let draw = draw_dist.sample(&mut self.rng);
            if !survives(wolf, draw) {
                self.kill(id)?;
            }
        }
        Ok(())
    }

    fn dispersal_of_wolves(&mut self) -> Result<()> {
        for pack_id in self.pack_ids() {
            let members = self.get_pack(pack_id)?.members().to_vec();
            for id in members {
                if self.get_wolf(id)?.is_due_to_disperse() {
                    self.disperse(id)?;
                }
            }
        }
        Ok(())
    }

    fn removal_of_packs(&mut self) -> Result<()> {
        for pack_id in self.pack_ids() {
            let pack = self.get_pack(pack_id)?;
            if pack.state() != PackState::Dissolved {
                continue;
            }
            let members = pack.members().to_vec();
            for id in members {
                if self.get_wolf(id)?.age() <= MAX_ORPHAN_AGE {
                    self.kill(id)?;
                } else {
                    self.disperse(id)?;
                }
            }
            self.packs.remove(&pack_id);
            log::debug!("step {}: pack {pack_id} dissolved", self.step);
        }
        Ok(())
    }

    fn settlement_of_vagrants(&mut self) -> Result<()> {
        for pack_id in self.pack_ids() {
            let pack = self.get_pack(pack_id)?;
            match (pack.alpha_m(), pack.alpha_f()) {
                (None, Some(_)) => self.find_missing_alpha(pack_id, Gender::Male)?,
                (Some(_), None) => self.find_missing_alpha(pack_id, Gender::Female)?,
                (Some(_), Some(_)) | (None, None) => {}
            }
        }
        self.pair_up()?;
        self.vagrant_females_settle()?;
        Ok(())
    }

    /// Fill the empty alpha slot of `gender` with the first eligible vagrant.
    fn find_missing_alpha(&mut self, pack_id: PackId, gender: Gender) -> Result<()> {
        let Some(&id) = self.eligible_vagrants(gender).first() else {
            return Ok(());
        };
        self.join_pack(pack_id, id, true)?;
        log::debug!("step {}: wolf {id} fills alpha slot of pack {pack_id}", self.step);

        if gender == Gender::Female {
            // The new female takes over the male's territory center.
            let alpha_m = self
                .get_pack(pack_id)?
                .alpha_m()
                .context("pack lost its male alpha")?;
            let center = self.get_wolf(alpha_m)?.pos();
            match center {
                Some(center) => self.move_wolf(id, center)?,
                None => self.place_new_member(id)?,
            }
            self.place_new_member(alpha_m)?;
        }
        Ok(())
    }

    fn pair_up(&mut self) -> Result<()> {
        let males = self.eligible_vagrants(Gender::Male);
        let females = self.eligible_vagrants(Gender::Female);
        for (male, female) in males.into_iter().zip(females) {
            let pack_id = self.found_pack();
            self.join_pack(pack_id, male, true)?;
            self.join_pack(pack_id, female, true)?;
            self.place_new_member(female)?;
            self.place_new_member(male)?;
            log::debug!("step {}: wolves {male} and {female} found pack {pack_id}", self.step);
        }
        Ok(())
    }

    fn vagrant_females_settle(&mut self) -> Result<()> {
        for female in self.eligible_vagrants(Gender::Female) {
            let pack_id = self.found_pack();
            self.join_pack(pack_id, female, true)?;
            self.place_new_member(female)?;
            log::debug!("step {}: wolf {female} settles as pack {pack_id}", self.step);
        }
        Ok(())
    }

    fn ageing_of_wolves(&mut self) {
        for wolf in self.wolves.values_mut() {
            wolf.grow_older();
        }
    }

    fn transition_of_wolves(&mut self) {
        for wolf in self.wolves.values_mut() {
            wolf.advance_step(&mut self.rng);
        }
    }

    fn reproduction_of_packs(&mut self) -> Result<()> {
        for pack_id in self.pack_ids() {
            let litter = self
                .packs
                .get_mut(&pack_id)
                .with_context(|| format!("pack {pack_id} not found"))?
                .reproduction(&mut self.rng);
            for _ in 0..litter {
                let id = self.spawn_wolf(0, Status::Pub, WolfTraits::default());
                self.join_pack(pack_id, id, false)?;
                self.place_new_member(id)?;
            }
            if litter > 0 {
                log::debug!("step {}: pack {pack_id} has a litter of {litter}", self.step);
            }
        }
        Ok(())
    }

    fn seed_population(&mut self) -> Result<()> {
        let init = self.cfg.init.clone();

        for _ in 0..init.n_packs_with_pups {
            let pack_id = self.seed_pair()?;
            for _ in 0..init.n_pups_per_pack {
                let id = self.spawn_wolf(3, Status::Pub, WolfTraits::default());
                self.join_pack(pack_id, id, false)?;
                self.place_new_member(id)?;
            }
            self.get_pack_mut(pack_id)?.set_breeding_time_together(1);
        }

        for _ in 0..init.n_lone_pups {
            let age = self.rng.random_range(7..=12);
            let id = self.spawn_wolf(age, Status::Pub, WolfTraits::default());
            self.place_new_member(id)?;
        }

        for _ in 0..init.n_vagrants {
            let age = self.rng.random_range(12..=70);
            let id = self.spawn_wolf(age, Status::Vagrant, WolfTraits::default());
            self.place_new_member(id)?;
        }

        for _ in 0..init.n_pairs {
            self.seed_pair()?;
        }

        Ok(())
    }

    /// Found a pack from a new adult pair, placing the female first as anchor.
    fn seed_pair(&mut self) -> Result<PackId> {
        let male = self.spawn_alpha(Gender::Male);
        let female = self.spawn_alpha(Gender::Female);

        let pack_id = self.found_pack();
        self.join_pack(pack_id, female, true)?;
        self.join_pack(pack_id, male, true)?;
        self.place_new_member(female)?;
        self.place_new_member(male)?;
        Ok(pack_id)
    }

    fn spawn_alpha(&mut self, gender: Gender) -> WolfId {
        let age = self.rng.random_range(30..=80);
        let traits = WolfTraits {
            gender: Some(gender),
            ..Default::default()
        };
        self.spawn_wolf(age, Status::Adult, traits)
    }

    fn spawn_wolf(&mut self, age: u32, status: Status, traits: WolfTraits) -> WolfId {
        self.next_wolf_id += 1;
        let id = self.next_wolf_id;
        let wolf = Wolf::new(id, age, status, traits, &mut self.rng);
        self.wolves.insert(id, wolf);
        id
    }

    fn found_pack(&mut self) -> PackId {
        self.next_pack_id += 1;
        let id = self.next_pack_id;
        self.packs.insert(id, Pack::new(id));
        id
    }

    fn join_pack(&mut self, pack_id: PackId, id: WolfId, as_alpha: bool) -> Result<()> {
        let pack = self
            .packs
            .get_mut(&pack_id)
            .with_context(|| format!("pack {pack_id} not found"))?;
        let wolf = self
            .wolves
            .get_mut(&id)
            .with_context(|| format!("wolf {id} not found"))?;
        pack.join(wolf, as_alpha);
        Ok(())
    }

    /// Cut the link between a wolf and its pack, if any.
    fn detach(&mut self, id: WolfId) -> Result<()> {
        let wolf = self
            .wolves
            .get_mut(&id)
            .with_context(|| format!("wolf {id} not found"))?;
        if let Some(pack_id) = wolf.pack() {
            let pack = self
                .packs
                .get_mut(&pack_id)
                .with_context(|| format!("pack {pack_id} not found"))?;
            pack.remove(wolf);
        }
        Ok(())
    }

    fn move_wolf(&mut self, id: WolfId, to: Pos) -> Result<()> {
        let wolf = self
            .wolves
            .get_mut(&id)
            .with_context(|| format!("wolf {id} not found"))?;
        self.grid.move_to(id, wolf.pos(), to);
        wolf.set_pos(Some(to));
        Ok(())
    }

    /// Unattached vagrants of `gender` eligible this step, in population order.
    fn eligible_vagrants(&self, gender: Gender) -> Vec<WolfId> {
        self.wolves
            .values()
            .filter(|wolf| wolf.is_eligible_vagrant(gender))
            .map(Wolf::id)
            .collect()
    }

    fn wolf_ids(&self) -> Vec<WolfId> {
        self.wolves.keys().copied().collect()
    }

    fn pack_ids(&self) -> Vec<PackId> {
        self.packs.keys().copied().collect()
    }

    fn get_wolf(&self, id: WolfId) -> Result<&Wolf> {
        self.wolves
            .get(&id)
            .with_context(|| format!("wolf {id} not found"))
    }

    fn get_wolf_mut(&mut self, id: WolfId) -> Result<&mut Wolf> {
        self.wolves
            .get_mut(&id)
            .with_context(|| format!("wolf {id} not found"))
    }

    fn get_pack(&self, id: PackId) -> Result<&Pack> {
        self.packs
            .get(&id)
            .with_context(|| format!("pack {id} not found"))
    }

    fn get_pack_mut(&mut self, id: PackId) -> Result<&mut Pack> {
        self.packs
            .get_mut(&id)
            .with_context(|| format!("pack {id} not found"))
    }
}

/// A wolf survives the month if the draw does not exceed its survival
/// probability and it has not reached [`MAX_AGE`].
fn survives(wolf: &Wolf, draw: f64) -> bool {
    draw <= wolf.survival_prob() && wolf.age() < MAX_AGE
}
