//! Simulation data types.

use serde::{Deserialize, Serialize};

/// Identifier of a wolf. Assigned in increasing order and never reused.
pub type WolfId = u64;

/// Identifier of a pack. Assigned in increasing order and never reused.
pub type PackId = u64;

/// Grid coordinate `(x, y)`.
pub type Pos = (usize, usize);

/// Gender of a wolf, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Female,
    Male,
}

/// Social status of a wolf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Pub,
    Subadult,
    Vagrant,
    Adult,
}

impl Status {
    /// Marker color used by renderers for this status.
    pub fn color(self) -> Color {
        match self {
            Status::Pub => Color::Blue,
            Status::Subadult => Color::Yellow,
            Status::Vagrant => Color::Green,
            Status::Adult => Color::Red,
        }
    }
}

/// Marker color of a wolf. Only meaningful to renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Color {
    Blue,
    Yellow,
    Green,
    Red,
}

impl Color {
    pub fn hex(self) -> &'static str {
        match self {
            Color::Blue => "#0000FF",
            Color::Yellow => "#FFFF00",
            Color::Green => "#00FF00",
            Color::Red => "#FF0000",
        }
    }
}

/// Read-only snapshot of a living wolf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WolfView {
    pub id: WolfId,
    pub age: u32,
    pub gender: Gender,
    pub status: Status,
    /// `None` while the wolf is waiting for a free cell.
    pub pos: Option<Pos>,
    pub color: Color,
}

/// Record of the simulation at a single step.
///
/// Sampled before the step's phases run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Number of steps performed so far.
    pub step: usize,
    /// Month index (`step % 12`).
    pub month: usize,

    /// Number of living wolves.
    pub n_wolves: usize,
    /// Number of packs with at least one member or alpha.
    pub n_packs: usize,
    /// Number of packs with an alpha pair and no other members.
    pub n_pairs: usize,

    pub n_pubs: usize,
    pub n_subadults: usize,
    pub n_vagrants: usize,
    pub n_adults: usize,
    pub n_females: usize,

    /// Mean age in months (`NaN` if the population is extinct).
    pub avg_age: f64,
}
