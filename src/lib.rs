//! Fliplight - a photon-routing puzzle board simulator
//!
//! Core modules:
//! - `sim`: Deterministic board simulation (cells, photons, tick engine)
//! - `level`: Level definitions, the script host surface, and the legacy
//!   text level format
//!
//! The crate contains no rendering, input handling, or persistence; a
//! driver owns a [`sim::Board`], calls [`sim::Board::step`] once per
//! discrete tick, and reads the completion evaluator after each step.

pub mod level;
pub mod sim;

pub use level::{FixedIo, IoGenerator, LevelBuilder, LevelDefinition, LevelError};
pub use sim::{Board, Cell, CellType, GridVec, Photon, ToolSlot};

/// Simulation configuration constants
pub mod consts {
    /// Tick interval at which new input photons are dispensed
    pub const INPUT_CADENCE: i32 = 3;
}
