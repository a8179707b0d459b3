//! Individual-based simulation of territorial wolf packs on a bounded grid.
//!
//! The [`engine::Engine`] advances the population one month per step; the
//! remaining modules load configuration, write per-step records and summarize them.

pub mod analysis;
pub mod config;
pub mod engine;
pub mod grid;
pub mod manager;
pub mod pack;
pub mod stats;
pub mod types;
pub mod wolf;
