//! Level definitions and the script host surface
//!
//! A level is produced externally, either by an embedded script interpreter
//! driving [`LevelBuilder`] (the narrow host surface of callbacks the core
//! exposes), or by the legacy direct-grammar text format in [`text`].
//! The core never depends on an interpreter's value representation beyond
//! primitive ints, strings and integer sequences.

pub mod text;

use thiserror::Error;

use crate::sim::cell::{Cell, GridVec};
use crate::sim::board::ToolSlot;

/// Level loading failures. Nothing in the simulation step itself errors;
/// the taxonomy is entirely about getting a level onto the board.
#[derive(Debug, Error)]
pub enum LevelError {
    /// A character outside the cell grammar.
    #[error("unrecognized cell character {ch:?}")]
    InvalidCellEncoding { ch: char },
    /// Structural violation in the legacy text format.
    #[error("level parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
    /// Failure surfaced by the external level interpreter, or misuse of the
    /// host callbacks by a level script. Propagated unchanged.
    #[error("level script error: {0}")]
    Interpreter(String),
}

/// Generates the dispensed input sequence and the golden output sequence
/// for one run, given a source of uniform random integers.
///
/// Called exactly once per run start. `random_next(max_exclusive)` draws
/// from the run's seeded generator.
pub trait IoGenerator {
    fn generate(&mut self, random_next: &mut dyn FnMut(i32) -> i32) -> (Vec<i32>, Vec<i32>);
}

impl<F> IoGenerator for F
where
    F: FnMut(&mut dyn FnMut(i32) -> i32) -> (Vec<i32>, Vec<i32>),
{
    fn generate(&mut self, random_next: &mut dyn FnMut(i32) -> i32) -> (Vec<i32>, Vec<i32>) {
        self(random_next)
    }
}

/// Constant input/golden sequences, ignoring the random source.
///
/// Used by legacy text levels (which have no generator function) and tests.
#[derive(Debug, Clone, Default)]
pub struct FixedIo {
    pub inputs: Vec<i32>,
    pub golden: Vec<i32>,
}

impl FixedIo {
    pub fn new(inputs: Vec<i32>, golden: Vec<i32>) -> Self {
        Self { inputs, golden }
    }
}

impl IoGenerator for FixedIo {
    fn generate(&mut self, _random_next: &mut dyn FnMut(i32) -> i32) -> (Vec<i32>, Vec<i32>) {
        (self.inputs.clone(), self.golden.clone())
    }
}

/// A fully assembled level, ready to be loaded onto a board.
pub struct LevelDefinition {
    /// Board is `size` x `size`.
    pub size: i32,
    /// Preset cell contents at board coordinates.
    pub preset: Vec<(GridVec, Cell)>,
    /// Placeable cell templates; negative count means unbounded.
    pub tools: Vec<ToolSlot>,
    pub before_dialog: Option<String>,
    pub after_dialog: Option<String>,
    pub io: Box<dyn IoGenerator>,
}

/// The host surface a level interpreter drives.
///
/// An adapter around whatever embedded interpreter is chosen calls these
/// methods while evaluating a level script, then reads the dialogs and
/// calls [`LevelBuilder::build`]. Interpreter-side evaluation failures are
/// surfaced as [`LevelError::Interpreter`] by the adapter.
#[derive(Default)]
pub struct LevelBuilder {
    size: Option<i32>,
    preset: Vec<(GridVec, Cell)>,
    tools: Vec<ToolSlot>,
    before_dialog: Option<String>,
    after_dialog: Option<String>,
    io: Option<Box<dyn IoGenerator>>,
}

impl LevelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an `n` x `n` grid. Must precede [`LevelBuilder::set_preset`].
    pub fn set_size(&mut self, n: i32) -> Result<&mut Self, LevelError> {
        if n <= 0 {
            return Err(LevelError::Interpreter(format!(
                "set_size called with non-positive size {n}"
            )));
        }
        self.size = Some(n);
        Ok(self)
    }

    /// Append one tool inventory entry. `count` of `None` (or any negative
    /// value) means unbounded.
    pub fn add_tool(&mut self, glyph: char, count: Option<i32>) -> Result<&mut Self, LevelError> {
        let template = Cell::from_char(glyph)?;
        self.tools.push(ToolSlot {
            template,
            count: count.unwrap_or(-1),
        });
        Ok(self)
    }

    /// Fill the grid from a block of text using the cell grammar, bottom
    /// row first, left to right. Rows beyond the grid height are ignored
    /// and over-wide rows are truncated to the grid width.
    pub fn set_preset(&mut self, block: &str) -> Result<&mut Self, LevelError> {
        let n = self.size.ok_or_else(|| {
            LevelError::Interpreter("set_preset called before set_size".into())
        })?;
        let min = origin_offset(n);
        self.preset.clear();
        for (row, line) in block.lines().take(n as usize).enumerate() {
            let y = min + row as i32;
            for (col, ch) in line.chars().take(n as usize).enumerate() {
                let cell = Cell::from_char(ch)?;
                if !cell.is_empty() {
                    self.preset.push((GridVec::new(min + col as i32, y), cell));
                }
            }
        }
        Ok(self)
    }

    pub fn set_before_dialog(&mut self, text: impl Into<String>) -> &mut Self {
        self.before_dialog = Some(text.into());
        self
    }

    pub fn set_after_dialog(&mut self, text: impl Into<String>) -> &mut Self {
        self.after_dialog = Some(text.into());
        self
    }

    pub fn set_io(&mut self, io: impl IoGenerator + 'static) -> &mut Self {
        self.io = Some(Box::new(io));
        self
    }

    pub fn build(self) -> Result<LevelDefinition, LevelError> {
        let size = self.size.ok_or_else(|| {
            LevelError::Interpreter("level script never called set_size".into())
        })?;
        Ok(LevelDefinition {
            size,
            preset: self.preset,
            tools: self.tools,
            before_dialog: self.before_dialog,
            after_dialog: self.after_dialog,
            io: self.io.unwrap_or_else(|| Box::new(FixedIo::default())),
        })
    }
}

/// Lowest board coordinate of an `n`-wide axis; the origin sits
/// near-centered, matching the board's bounds derivation.
pub(crate) fn origin_offset(n: i32) -> i32 {
    -(n / 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::cell::CellType;

    #[test]
    fn test_builder_assembles_level() {
        let mut builder = LevelBuilder::new();
        builder.set_size(5).unwrap();
        builder.add_tool('-', Some(3)).unwrap();
        builder.add_tool('0', None).unwrap();
        builder.set_preset("i...o").unwrap();
        builder.set_before_dialog("hello");
        let level = builder.build().unwrap();

        assert_eq!(level.size, 5);
        assert_eq!(level.tools.len(), 2);
        assert_eq!(level.tools[0].count, 3);
        assert_eq!(level.tools[1].count, -1);
        assert_eq!(level.before_dialog.as_deref(), Some("hello"));
        assert!(level.after_dialog.is_none());
        // Bottom row: input at (-2,-2), output at (2,-2)
        assert_eq!(level.preset.len(), 2);
        assert_eq!(level.preset[0].0, GridVec::new(-2, -2));
        assert_eq!(level.preset[0].1.kind, CellType::Input);
        assert_eq!(level.preset[1].0, GridVec::new(2, -2));
        assert_eq!(level.preset[1].1.kind, CellType::Output);
    }

    #[test]
    fn test_preset_requires_size() {
        let mut builder = LevelBuilder::new();
        match builder.set_preset("..") {
            Err(LevelError::Interpreter(msg)) => assert!(msg.contains("set_size")),
            Err(other) => panic!("expected Interpreter error, got {other:?}"),
            Ok(_) => panic!("expected Interpreter error"),
        }
    }

    #[test]
    fn test_preset_truncates_oversize_rows() {
        let mut builder = LevelBuilder::new();
        builder.set_size(3).unwrap();
        // 4 columns and 4 rows on a 3x3 board: the extras are dropped
        builder
            .set_preset("...#\n....\n....\n####")
            .unwrap();
        let level = builder.build().unwrap();
        assert!(level.preset.is_empty());
    }

    #[test]
    fn test_build_without_size_fails() {
        assert!(matches!(
            LevelBuilder::new().build(),
            Err(LevelError::Interpreter(_))
        ));
    }
}
