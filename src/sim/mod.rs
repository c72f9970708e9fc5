//! Deterministic simulation module
//!
//! All board logic lives here. This module must be pure and deterministic:
//! - Discrete ticks only, one cell of travel per tick
//! - Seeded RNG only (and only at run start, for the IO generator)
//! - Stable iteration order (by photon ID)
//! - No rendering or platform dependencies

pub mod board;
pub mod cell;
pub mod step;

pub use board::{Board, Photon, ToolSlot};
pub use cell::{Cell, CellType, GridVec};
pub use step::step;
