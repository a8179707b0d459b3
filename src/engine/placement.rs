//! Placement and movement of wolves around their pack's territory center.

use super::Engine;
use crate::grid::PACK_RADIUS;
use crate::types::{Pos, WolfId};
use anyhow::Result;

/// Where a wolf belongs on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// Territory center of its pack.
    Anchor,
    /// Within [`PACK_RADIUS`] of the anchor's cell, if the anchor is placed.
    NearAnchor(Option<Pos>),
    /// Anywhere on the grid.
    Unconstrained,
}

impl Engine {
    /// Place a new or newly promoted wolf.
    ///
    /// Anchors claim a fresh territory clear of every other wolf. Members take an
    /// empty cell near their anchor and stay pending if none is free.
    pub(super) fn place_new_member(&mut self, id: WolfId) -> Result<()> {
        match self.placement_of(id)? {
            Placement::Anchor => {
                let wolf = self.get_wolf_mut(id)?;
                if let Some(pos) = wolf.pos() {
                    wolf.set_pos(None);
                    self.grid.remove(id, pos);
                }
                let center = self.grid.find_territory_center(&mut self.rng, PACK_RADIUS);
                self.move_wolf(id, center)?;
            }
            Placement::NearAnchor(Some(center)) => {
                if let Some(pos) = self.grid.find_empty_near(&mut self.rng, center, PACK_RADIUS) {
                    self.move_wolf(id, pos)?;
                }
            }
            Placement::NearAnchor(None) => {}
            Placement::Unconstrained => {
                if let Some(pos) = self.grid.find_empty_cell(&mut self.rng) {
                    self.move_wolf(id, pos)?;
                }
            }
        }
        Ok(())
    }

    /// Movement phase: members wander around their anchor, loners anywhere.
    pub(super) fn relocate_all(&mut self) -> Result<()> {
        for id in self.wolf_ids() {
            match self.placement_of(id)? {
                Placement::Anchor => {
                    if self.get_wolf(id)?.pos().is_none() {
                        self.place_new_member(id)?;
                    }
                }
                Placement::NearAnchor(Some(center)) => {
                    if let Some(pos) = self.grid.find_empty_near(&mut self.rng, center, PACK_RADIUS)
                    {
                        self.move_wolf(id, pos)?;
                    }
                }
                Placement::NearAnchor(None) => {}
                Placement::Unconstrained => {
                    if let Some(pos) = self.grid.find_empty_cell(&mut self.rng) {
                        self.move_wolf(id, pos)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn placement_of(&self, id: WolfId) -> Result<Placement> {
        let Some(pack_id) = self.get_wolf(id)?.pack() else {
            return Ok(Placement::Unconstrained);
        };
        // A pack without alphas is about to be removed; its members wait.
        let Some(anchor) = self.get_pack(pack_id)?.anchor() else {
            return Ok(Placement::NearAnchor(None));
        };
        if anchor == id {
            return Ok(Placement::Anchor);
        }
        Ok(Placement::NearAnchor(self.get_wolf(anchor)?.pos()))
    }
}
