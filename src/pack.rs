//! Packs: an alpha pair plus subordinate members.

use crate::types::{Gender, PackId, WolfId};
use crate::wolf::Wolf;
use rand::prelude::*;
use std::ops::RangeInclusive;

/// Range of the number of pubs in a litter.
pub const LITTER_SIZE: RangeInclusive<usize> = 4..=6;

/// Base probability that a freshly formed pair reproduces.
const PROB_REP: f64 = 0.79;
/// Jitter applied to [`PROB_REP`].
const JITTER_REP: f64 = 0.05;

/// Lifecycle stage of a pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackState {
    /// One alpha slot filled, none lost yet.
    Forming,
    /// Both alpha slots filled.
    Established,
    /// One alpha slot filled after an alpha was lost.
    Dissolving,
    /// Both alpha slots empty. The engine removes the pack.
    Dissolved,
}

#[derive(Debug, Clone)]
pub struct Pack {
    id: PackId,
    alpha_m: Option<WolfId>,
    alpha_f: Option<WolfId>,
    members: Vec<WolfId>,
    breeding_time_together: u32,
    lost_alpha: bool,
}

impl Pack {
    pub fn new(id: PackId) -> Self {
        Self {
            id,
            alpha_m: None,
            alpha_f: None,
            members: Vec::new(),
            breeding_time_together: 0,
            lost_alpha: false,
        }
    }

    pub fn id(&self) -> PackId {
        self.id
    }

    pub fn alpha_m(&self) -> Option<WolfId> {
        self.alpha_m
    }

    pub fn alpha_f(&self) -> Option<WolfId> {
        self.alpha_f
    }

    /// Subordinate (non-alpha) members.
    pub fn members(&self) -> &[WolfId] {
        &self.members
    }

    /// Number of consecutive seasons the current pair has been evaluated for breeding.
    pub fn breeding_time_together(&self) -> u32 {
        self.breeding_time_together
    }

    /// Wolf at the territory center: the female alpha, else the male alpha.
    pub fn anchor(&self) -> Option<WolfId> {
        self.alpha_f.or(self.alpha_m)
    }

    pub fn state(&self) -> PackState {
        match (self.alpha_m, self.alpha_f) {
            (Some(_), Some(_)) => PackState::Established,
            (None, None) => PackState::Dissolved,
            _ if self.lost_alpha => PackState::Dissolving,
            _ => PackState::Forming,
        }
    }

    /// Add `wolf` to the pack, either as the alpha of its gender or as a member.
    ///
    /// An occupied alpha slot is overwritten; callers check the slot first.
    pub fn join(&mut self, wolf: &mut Wolf, as_alpha: bool) {
        if as_alpha {
            match wolf.gender() {
                Gender::Male => self.alpha_m = Some(wolf.id()),
                Gender::Female => self.alpha_f = Some(wolf.id()),
            }
            wolf.promote_to_adult();
            self.breeding_time_together = 0;
            if self.alpha_m.is_some() && self.alpha_f.is_some() {
                self.lost_alpha = false;
            }
        } else {
            self.members.push(wolf.id());
        }
        wolf.set_pack(Some(self.id));
    }

    /// Remove `wolf` from the pack, clearing its alpha slot if it holds one.
    ///
    /// # Panics
    /// Panics if the pack does not track `wolf`.
    pub fn remove(&mut self, wolf: &mut Wolf) {
        let id = wolf.id();
        assert_eq!(
            wolf.pack(),
            Some(self.id),
            "wolf {id} is not linked to pack {}",
            self.id
        );
        if self.alpha_f == Some(id) {
            self.alpha_f = None;
            self.lost_alpha = true;
        } else if self.alpha_m == Some(id) {
            self.alpha_m = None;
            self.lost_alpha = true;
        } else {
            let Some(idx) = self.members.iter().position(|&member| member == id) else {
                panic!("wolf {id} is not tracked by pack {}", self.id);
            };
            self.members.swap_remove(idx);
        }
        wolf.set_pack(None);
    }

    /// Evaluate this season's breeding and return the litter size (0 if none).
    ///
    /// Only packs with both alphas breed. An established pair always breeds;
    /// a fresh pair breeds with probability around [`PROB_REP`].
    pub fn reproduction<R: Rng>(&mut self, rng: &mut R) -> usize {
        if self.state() != PackState::Established {
            return 0;
        }
        let breeds = self.breeding_time_together > 0 || Self::should_reproduce(rng);
        self.breeding_time_together += 1;
        if breeds {
            rng.random_range(LITTER_SIZE)
        } else {
            0
        }
    }

    pub(crate) fn set_breeding_time_together(&mut self, seasons: u32) {
        self.breeding_time_together = seasons;
    }

    fn should_reproduce<R: Rng>(rng: &mut R) -> bool {
        let threshold = PROB_REP + rng.random_range(-JITTER_REP..=JITTER_REP);
        threshold > rng.random::<f64>()
    }
}
