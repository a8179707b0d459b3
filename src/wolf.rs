//! Individual wolves and their life-history transitions.

use crate::types::{Gender, PackId, Pos, Status, WolfId, WolfView};
use rand::prelude::*;
use std::ops::RangeInclusive;

/// Range of the age (months) at which a wolf leaves its natal pack.
pub const AGE_OF_DISPERSAL: RangeInclusive<u32> = 12..=40;
/// Range of the age (months) at which a wolf settles.
pub const AGE_OF_SETTLEMENT: RangeInclusive<u32> = 20..=84;
/// Maximum lifespan in months.
pub const MAX_AGE: u32 = 132;

/// Age at which a pub becomes a subadult.
const SUBADULT_AGE: u32 = 12;
/// Youngest age at which a dispersing wolf becomes a vagrant.
const VAGRANT_AGE: u32 = 10;
/// Pubs younger than this use the newborn survival table entry.
const NEWBORN_AGE: u32 = 6;

/// Optional traits of a new wolf. Unset fields are sampled.
#[derive(Debug, Default, Clone, Copy)]
pub struct WolfTraits {
    pub gender: Option<Gender>,
    pub age_of_dispersal: Option<u32>,
    pub age_of_settlement: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct Wolf {
    id: WolfId,
    age: u32,
    gender: Gender,
    status: Status,
    survival_prob: f64,
    alive: bool,
    age_of_death: Option<u32>,
    age_of_dispersal: u32,
    age_of_settlement: u32,
    pack: Option<PackId>,
    pos: Option<Pos>,
}

impl Wolf {
    /// Create a new wolf, sampling every trait not given in `traits`.
    ///
    /// # Panics
    /// Panics if a given age of dispersal or settlement lies outside its range.
    pub fn new<R: Rng>(
        id: WolfId,
        age: u32,
        status: Status,
        traits: WolfTraits,
        rng: &mut R,
    ) -> Self {
        let gender = traits.gender.unwrap_or_else(|| {
            if rng.random_bool(0.5) {
                Gender::Male
            } else {
                Gender::Female
            }
        });
        let age_of_dispersal = traits
            .age_of_dispersal
            .unwrap_or_else(|| rng.random_range(AGE_OF_DISPERSAL));
        let age_of_settlement = traits
            .age_of_settlement
            .unwrap_or_else(|| rng.random_range(AGE_OF_SETTLEMENT));
        assert!(AGE_OF_DISPERSAL.contains(&age_of_dispersal));
        assert!(AGE_OF_SETTLEMENT.contains(&age_of_settlement));

        let mut wolf = Self {
            id,
            age,
            gender,
            status,
            survival_prob: 0.0,
            alive: true,
            age_of_death: None,
            age_of_dispersal,
            age_of_settlement,
            pack: None,
            pos: None,
        };
        wolf.assign_survival_prob(rng);
        wolf
    }

    pub fn id(&self) -> WolfId {
        self.id
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn survival_prob(&self) -> f64 {
        self.survival_prob
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn age_of_death(&self) -> Option<u32> {
        self.age_of_death
    }

    pub fn age_of_dispersal(&self) -> u32 {
        self.age_of_dispersal
    }

    pub fn age_of_settlement(&self) -> u32 {
        self.age_of_settlement
    }

    pub fn pack(&self) -> Option<PackId> {
        self.pack
    }

    pub fn pos(&self) -> Option<Pos> {
        self.pos
    }

    pub fn view(&self) -> WolfView {
        WolfView {
            id: self.id,
            age: self.age,
            gender: self.gender,
            status: self.status,
            pos: self.pos,
            color: self.status.color(),
        }
    }

    /// Update the social status and refresh the survival probability.
    pub fn advance_step<R: Rng>(&mut self, rng: &mut R) {
        self.assign_social_status();
        self.assign_survival_prob(rng);
    }

    pub fn grow_older(&mut self) {
        self.age += 1;
    }

    /// Leave the natal pack. Old enough wolves become vagrants.
    ///
    /// Only the wolf's own status changes here; the pack link is cut by
    /// [`Pack::remove`](crate::pack::Pack::remove).
    pub fn disperse(&mut self) {
        if self.age >= VAGRANT_AGE {
            self.status = Status::Vagrant;
        }
    }

    /// Mark the wolf as dead. Returns `false` if it was already dead.
    pub fn die(&mut self) -> bool {
        if !self.alive {
            return false;
        }
        self.alive = false;
        self.age_of_death = Some(self.age);
        true
    }

    /// Pack member of natal status that reached its age of dispersal.
    pub fn is_due_to_disperse(&self) -> bool {
        let natal = match self.status {
            Status::Pub | Status::Subadult => true,
            Status::Vagrant | Status::Adult => false,
        };
        natal && self.age == self.age_of_dispersal
    }

    /// Unattached vagrant of the given gender that may found or join a pack this step.
    pub fn is_eligible_vagrant(&self, gender: Gender) -> bool {
        self.status == Status::Vagrant
            && self.gender == gender
            && self.age == self.age_of_dispersal
            && self.pack.is_none()
    }

    pub(crate) fn set_pack(&mut self, pack: Option<PackId>) {
        self.pack = pack;
    }

    pub(crate) fn set_pos(&mut self, pos: Option<Pos>) {
        self.pos = pos;
    }

    pub(crate) fn promote_to_adult(&mut self) {
        self.status = Status::Adult;
    }

    #[cfg(test)]
    pub(crate) fn set_survival_prob(&mut self, survival_prob: f64) {
        self.survival_prob = survival_prob;
    }

    fn assign_social_status(&mut self) {
        match self.status {
            Status::Pub if self.age == SUBADULT_AGE => self.status = Status::Subadult,
            Status::Pub | Status::Subadult | Status::Vagrant | Status::Adult => {}
        }
    }

    fn assign_survival_prob<R: Rng>(&mut self, rng: &mut R) {
        // (base, jitter) per status.
        let (base, jitter) = match self.status {
            Status::Pub if self.age < NEWBORN_AGE => (0.65, 0.10),
            Status::Pub => (0.85, 0.13),
            Status::Subadult => (0.74, 0.13),
            Status::Vagrant => (0.42, 0.10),
            Status::Adult => (0.82, 0.03),
        };
        self.survival_prob = base + rng.random_range(-jitter..=jitter);
    }
}
