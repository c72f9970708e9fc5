//! Board state, lifecycle and completion evaluation
//!
//! The board owns the grid, the live photon table, the tool inventory and
//! all run bookkeeping. It is exclusively owned by one driver at a time;
//! nothing here spawns threads or blocks.

use std::collections::BTreeMap;
use std::fmt;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::INPUT_CADENCE;
use crate::level::{self, IoGenerator, LevelDefinition, LevelError};

use super::cell::{Cell, CellType, GridVec};

/// A discrete light token moving one cell per tick.
///
/// A STILL direction means the photon is stuck in a tarpit. Ids start at 1
/// each run; 0 is reserved as the tarpit "no photon" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photon {
    pub id: u32,
    pub value: i32,
    pub pos: GridVec,
    pub dir: GridVec,
}

/// One tool inventory entry. A negative count means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSlot {
    pub template: Cell,
    pub count: i32,
}

/// The puzzle board.
///
/// Run state is either not running (`current_time == -1`) or running
/// (`current_time >= 0`). `start` is the only way in, `stop` the only way
/// out, and `step` advances exactly one tick while running.
pub struct Board {
    size: i32,
    min: i32,
    cells: Vec<Cell>,
    /// Grid as it looked at `start`, restored on `stop` so run side effects
    /// (tarpit occupancy) never leak into the player's layout.
    snapshot: Option<Vec<Cell>>,
    /// Live photons, keyed by id. BTreeMap gives stable id-ordered
    /// iteration, which the tick engine relies on for determinism.
    pub(crate) photons: BTreeMap<u32, Photon>,
    next_photon_id: u32,
    tools: Vec<ToolSlot>,
    io: Box<dyn IoGenerator>,
    before_dialog: Option<String>,
    after_dialog: Option<String>,
    pub(crate) current_time: i32,
    pub(crate) cadence: i32,
    pub(crate) inputs: Vec<i32>,
    golden: Vec<i32>,
    pub(crate) outputs: Vec<i32>,
    input_pos: Option<GridVec>,
    input_dir: GridVec,
}

impl Board {
    /// Construct a board from a level definition.
    pub fn new(level: LevelDefinition) -> Self {
        let size = level.size;
        let mut board = Self {
            size,
            min: level::origin_offset(size),
            cells: vec![Cell::EMPTY; (size * size) as usize],
            snapshot: None,
            photons: BTreeMap::new(),
            next_photon_id: 1,
            tools: level.tools,
            io: level.io,
            before_dialog: level.before_dialog,
            after_dialog: level.after_dialog,
            current_time: -1,
            cadence: INPUT_CADENCE,
            inputs: Vec::new(),
            golden: Vec::new(),
            outputs: Vec::new(),
            input_pos: None,
            input_dir: GridVec::RIGHT,
        };
        for (pos, cell) in level.preset {
            board.set(pos.x, pos.y, cell);
        }
        log::info!(
            "loaded {size}x{size} level with {} preset cells, {} tools",
            board.cells.iter().filter(|c| !c.is_empty()).count(),
            board.tools.len()
        );
        board
    }

    /// Construct a board from a legacy direct-grammar text level.
    pub fn from_text(text: &str) -> Result<Self, LevelError> {
        level::text::parse(text).map(Self::new)
    }

    // --- Grid access ---

    pub fn size(&self) -> i32 {
        self.size
    }

    /// Inclusive bounds, origin near-centered.
    pub fn bounds(&self) -> (GridVec, GridVec) {
        let max = self.size - 1 + self.min;
        (GridVec::new(self.min, self.min), GridVec::new(max, max))
    }

    pub fn is_in_bounds(&self, pos: GridVec) -> bool {
        let (lo, hi) = self.bounds();
        pos.x >= lo.x && pos.x <= hi.x && pos.y >= lo.y && pos.y <= hi.y
    }

    fn index(&self, pos: GridVec) -> usize {
        ((pos.y - self.min) * self.size + (pos.x - self.min)) as usize
    }

    /// Cell at a coordinate; out-of-bounds reads return Empty.
    pub fn get(&self, x: i32, y: i32) -> Cell {
        let pos = GridVec::new(x, y);
        if self.is_in_bounds(pos) {
            self.cells[self.index(pos)]
        } else {
            Cell::EMPTY
        }
    }

    /// Write a cell; out-of-bounds writes are silently ignored.
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) {
        let pos = GridVec::new(x, y);
        if self.is_in_bounds(pos) {
            let idx = self.index(pos);
            self.cells[idx] = cell;
        }
    }

    // --- Tool inventory ---

    pub fn tools(&self) -> &[ToolSlot] {
        &self.tools
    }

    /// Take a fresh copy of a tool's template, decrementing a finite count.
    /// Exhausted or out-of-range slots yield the Empty cell.
    pub fn take_tool(&mut self, index: usize) -> Cell {
        match self.tools.get_mut(index) {
            Some(slot) if slot.count != 0 => {
                if slot.count > 0 {
                    slot.count -= 1;
                }
                slot.template
            }
            _ => Cell::EMPTY,
        }
    }

    /// Put a cell back into the inventory. Level fixtures (Input, Output,
    /// Wall) and the Empty cell are rejected; anything else is accepted,
    /// landing in the first slot of matching type or a new slot.
    pub fn return_tool(&mut self, cell: Cell) -> bool {
        if cell.is_empty() || !cell.is_movable() {
            return false;
        }
        if let Some(slot) = self.tools.iter_mut().find(|s| s.template.kind == cell.kind) {
            if slot.count >= 0 {
                slot.count += 1;
            }
        } else {
            self.tools.push(ToolSlot {
                template: Cell::new(cell.kind, cell.param),
                count: 1,
            });
        }
        true
    }

    // --- Lifecycle ---

    /// Begin a run: derive the input and golden sequences from the seed,
    /// snapshot the player's grid and dispense the first input photon.
    ///
    /// Callers must `stop` a running board before starting it again.
    pub fn start(&mut self, seed: u64) {
        let mut rng = Pcg32::seed_from_u64(seed);
        let (inputs, golden) = self.io.generate(&mut |max_exclusive| {
            if max_exclusive <= 0 {
                0
            } else {
                rng.random_range(0..max_exclusive)
            }
        });
        self.inputs = inputs;
        self.golden = golden;
        self.outputs.clear();
        self.photons.clear();
        self.next_photon_id = 1;
        self.snapshot = Some(self.cells.clone());

        self.input_pos = None;
        let (lo, hi) = self.bounds();
        'scan: for y in lo.y..=hi.y {
            for x in lo.x..=hi.x {
                let cell = self.get(x, y);
                if cell.kind == CellType::Input {
                    self.input_pos = Some(GridVec::new(x, y));
                    self.input_dir = GridVec::from_direction_param(cell.param);
                    break 'scan;
                }
            }
        }
        if self.input_pos.is_none() {
            log::warn!("level has no input cell; nothing will be dispensed");
        }

        self.current_time = 0;
        log::info!(
            "run started: seed {seed}, {} inputs, {} golden values",
            self.inputs.len(),
            self.golden.len()
        );
        self.dispense_input(0);
    }

    /// Advance one tick. No-op when not running.
    pub fn step(&mut self) {
        super::step::step(self);
    }

    /// Abort the run: restore the start-time grid and drop all photons.
    pub fn stop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            self.cells = snapshot;
        }
        self.photons.clear();
        self.current_time = -1;
        log::info!("run stopped");
    }

    // --- Completion evaluator ---

    /// All scheduled inputs dispensed and nothing left in flight.
    pub fn is_complete(&self) -> bool {
        self.photons.is_empty() && self.current_time >= self.cadence * self.inputs.len() as i32
    }

    /// Accumulated output equals the golden sequence exactly.
    pub fn is_output_match(&self) -> bool {
        self.outputs == self.golden
    }

    // --- Run state accessors ---

    pub fn is_running(&self) -> bool {
        self.current_time >= 0
    }

    /// Ticks elapsed since `start`, or -1 when not running.
    pub fn current_time(&self) -> i32 {
        self.current_time
    }

    pub fn photons(&self) -> impl Iterator<Item = &Photon> {
        self.photons.values()
    }

    pub fn photon_count(&self) -> usize {
        self.photons.len()
    }

    pub fn inputs(&self) -> &[i32] {
        &self.inputs
    }

    pub fn golden(&self) -> &[i32] {
        &self.golden
    }

    pub fn outputs(&self) -> &[i32] {
        &self.outputs
    }

    pub fn before_dialog(&self) -> Option<&str> {
        self.before_dialog.as_deref()
    }

    pub fn after_dialog(&self) -> Option<&str> {
        self.after_dialog.as_deref()
    }

    // --- Internals shared with the tick engine ---

    pub(crate) fn spawn_photon(&mut self, value: i32, pos: GridVec, dir: GridVec) -> u32 {
        let id = self.next_photon_id;
        self.next_photon_id += 1;
        self.photons.insert(id, Photon { id, value, pos, dir });
        id
    }

    pub(crate) fn dispense_input(&mut self, index: usize) {
        let Some(pos) = self.input_pos else { return };
        if let Some(&value) = self.inputs.get(index) {
            let dir = self.input_dir;
            let id = self.spawn_photon(value, pos, dir);
            log::debug!("dispensed input #{index} value {value} as photon {id}");
        }
    }
}

impl fmt::Display for Board {
    /// Rows top to bottom, cells as grammar glyphs, live photons as '@'.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (lo, hi) = self.bounds();
        for y in (lo.y..=hi.y).rev() {
            for x in lo.x..=hi.x {
                let here = GridVec::new(x, y);
                let ch = if self.photons.values().any(|p| p.pos == here) {
                    '@'
                } else {
                    self.get(x, y).glyph()
                };
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
