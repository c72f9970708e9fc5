//! Cell model and character grammar
//!
//! A cell is the typed, rotatable unit of board content. Every cell type
//! carries a `param` selecting a variant (mirror orientation, generator
//! digit, sluice direction, tarpit operator, input direction); rotating a
//! cell cycles `param` modulo a fixed per-type count.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Neg};

use crate::level::LevelError;

/// Integer grid vector, used for both positions and directions.
///
/// Y grows upward. A zero vector as a direction means "stuck", which is
/// only valid while a photon occupies a tarpit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridVec {
    pub x: i32,
    pub y: i32,
}

impl GridVec {
    pub const UP: GridVec = GridVec { x: 0, y: 1 };
    pub const LEFT: GridVec = GridVec { x: -1, y: 0 };
    pub const DOWN: GridVec = GridVec { x: 0, y: -1 };
    pub const RIGHT: GridVec = GridVec { x: 1, y: 0 };
    pub const STILL: GridVec = GridVec { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Direction for a sluice/input param: 0,1,2,3 = up,left,down,right.
    pub fn from_direction_param(param: i32) -> Self {
        match param.rem_euclid(4) {
            0 => Self::UP,
            1 => Self::LEFT,
            2 => Self::DOWN,
            _ => Self::RIGHT,
        }
    }

    /// Rotated 90 degrees counterclockwise.
    pub fn turned_left(self) -> Self {
        Self::new(-self.y, self.x)
    }

    /// Rotated 90 degrees clockwise.
    pub fn turned_right(self) -> Self {
        Self::new(self.y, -self.x)
    }

    pub fn is_still(self) -> bool {
        self.x == 0 && self.y == 0
    }
}

impl Add for GridVec {
    type Output = GridVec;
    fn add(self, rhs: GridVec) -> GridVec {
        GridVec::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Neg for GridVec {
    type Output = GridVec;
    fn neg(self) -> GridVec {
        GridVec::new(-self.x, -self.y)
    }
}

/// Cell types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CellType {
    #[default]
    Empty,
    /// Reflects or absorbs photons depending on orientation
    Mirror,
    /// Emits a fixed-value photon when hit, bouncing the trigger back
    Generator,
    /// Forces photons into a fixed direction
    Sluice,
    /// Splitter: one photon in, two photons out at right angles
    Process,
    /// Holds the first photon and algebraically combines it with the second
    Tarpit,
    /// Photon source; param encodes the emission direction
    Input,
    /// Photon sink; consumed values form the output sequence
    Output,
    Wall,
}

impl CellType {
    /// Number of distinct `param` variants this type cycles through.
    pub fn rotation_count(self) -> i32 {
        match self {
            CellType::Empty => 1,
            CellType::Mirror => 4,
            CellType::Generator => 10,
            CellType::Sluice => 4,
            CellType::Process => 1,
            CellType::Tarpit => 5,
            CellType::Input => 4,
            CellType::Output => 1,
            CellType::Wall => 1,
        }
    }
}

/// A single board cell.
///
/// `tarpit_id` is transient run state: the id of the photon currently stuck
/// in this tarpit, 0 when unoccupied. It is always 0 outside an active run
/// and meaningless for non-tarpit cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cell {
    pub kind: CellType,
    pub param: i32,
    pub tarpit_id: u32,
}

impl Cell {
    pub const EMPTY: Cell = Cell {
        kind: CellType::Empty,
        param: 0,
        tarpit_id: 0,
    };

    pub const fn new(kind: CellType, param: i32) -> Self {
        Self {
            kind,
            param,
            tarpit_id: 0,
        }
    }

    /// Decode a single grammar character.
    ///
    /// Case-sensitive. Unrecognized characters fail with
    /// [`LevelError::InvalidCellEncoding`].
    pub fn from_char(ch: char) -> Result<Self, LevelError> {
        let cell = match ch {
            ' ' | '.' => Cell::EMPTY,
            '-' => Cell::new(CellType::Mirror, 0),
            '/' => Cell::new(CellType::Mirror, 1),
            '|' => Cell::new(CellType::Mirror, 2),
            '\\' => Cell::new(CellType::Mirror, 3),
            '0'..='9' => Cell::new(CellType::Generator, ch as i32 - '0' as i32),
            '^' => Cell::new(CellType::Sluice, 0),
            '<' => Cell::new(CellType::Sluice, 1),
            'v' => Cell::new(CellType::Sluice, 2),
            '>' => Cell::new(CellType::Sluice, 3),
            'X' => Cell::new(CellType::Process, 0),
            '+' => Cell::new(CellType::Tarpit, 0),
            '_' => Cell::new(CellType::Tarpit, 1),
            '*' => Cell::new(CellType::Tarpit, 2),
            '?' => Cell::new(CellType::Tarpit, 3),
            '%' => Cell::new(CellType::Tarpit, 4),
            // Inputs default to emitting rightward
            'i' => Cell::new(CellType::Input, 3),
            'o' => Cell::new(CellType::Output, 0),
            '#' => Cell::new(CellType::Wall, 0),
            _ => return Err(LevelError::InvalidCellEncoding { ch }),
        };
        Ok(cell)
    }

    /// Canonical grammar character for this cell (Empty renders '.').
    pub fn glyph(&self) -> char {
        match self.kind {
            CellType::Empty => '.',
            CellType::Mirror => ['-', '/', '|', '\\'][self.param.rem_euclid(4) as usize],
            CellType::Generator => {
                char::from_digit(self.param.rem_euclid(10) as u32, 10).unwrap_or('0')
            }
            CellType::Sluice => ['^', '<', 'v', '>'][self.param.rem_euclid(4) as usize],
            CellType::Process => 'X',
            CellType::Tarpit => ['+', '_', '*', '?', '%'][self.param.rem_euclid(5) as usize],
            CellType::Input => 'i',
            CellType::Output => 'o',
            CellType::Wall => '#',
        }
    }

    /// Cycle to the next variant. Exact inverse of [`Cell::rotate_backward`].
    pub fn rotate_forward(self) -> Self {
        Cell {
            param: (self.param + 1).rem_euclid(self.kind.rotation_count()),
            ..self
        }
    }

    /// Cycle to the previous variant. Exact inverse of [`Cell::rotate_forward`].
    pub fn rotate_backward(self) -> Self {
        let n = self.kind.rotation_count();
        Cell {
            param: (self.param + n - 1).rem_euclid(n),
            ..self
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kind == CellType::Empty
    }

    /// Whether an editor may pick this cell up. Input, Output and Wall are
    /// fixtures of the level.
    pub fn is_movable(&self) -> bool {
        !matches!(
            self.kind,
            CellType::Input | CellType::Output | CellType::Wall
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_grammar_decodes_every_type() {
        let cases = [
            (' ', CellType::Empty, 0),
            ('.', CellType::Empty, 0),
            ('-', CellType::Mirror, 0),
            ('/', CellType::Mirror, 1),
            ('|', CellType::Mirror, 2),
            ('\\', CellType::Mirror, 3),
            ('0', CellType::Generator, 0),
            ('7', CellType::Generator, 7),
            ('9', CellType::Generator, 9),
            ('^', CellType::Sluice, 0),
            ('<', CellType::Sluice, 1),
            ('v', CellType::Sluice, 2),
            ('>', CellType::Sluice, 3),
            ('X', CellType::Process, 0),
            ('+', CellType::Tarpit, 0),
            ('_', CellType::Tarpit, 1),
            ('*', CellType::Tarpit, 2),
            ('?', CellType::Tarpit, 3),
            ('%', CellType::Tarpit, 4),
            ('i', CellType::Input, 3),
            ('o', CellType::Output, 0),
            ('#', CellType::Wall, 0),
        ];
        for (ch, kind, param) in cases {
            let cell = Cell::from_char(ch).unwrap();
            assert_eq!(cell.kind, kind, "char {ch:?}");
            assert_eq!(cell.param, param, "char {ch:?}");
            assert_eq!(cell.tarpit_id, 0);
        }
    }

    #[test]
    fn test_grammar_rejects_unknown() {
        for ch in ['q', 'I', 'O', '!', '@'] {
            match Cell::from_char(ch) {
                Err(LevelError::InvalidCellEncoding { ch: bad }) => assert_eq!(bad, ch),
                other => panic!("expected InvalidCellEncoding for {ch:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_direction_params() {
        assert_eq!(GridVec::from_direction_param(0), GridVec::UP);
        assert_eq!(GridVec::from_direction_param(1), GridVec::LEFT);
        assert_eq!(GridVec::from_direction_param(2), GridVec::DOWN);
        assert_eq!(GridVec::from_direction_param(3), GridVec::RIGHT);
    }

    #[test]
    fn test_turns_are_quarter_rotations() {
        let right = GridVec::RIGHT;
        assert_eq!(right.turned_left(), GridVec::UP);
        assert_eq!(right.turned_right(), GridVec::DOWN);
        assert_eq!(right.turned_left().turned_left(), -right);
    }

    fn arb_cell() -> impl Strategy<Value = Cell> {
        (0u8..9, 0i32..10).prop_map(|(kind_idx, raw_param)| {
            let kind = [
                CellType::Empty,
                CellType::Mirror,
                CellType::Generator,
                CellType::Sluice,
                CellType::Process,
                CellType::Tarpit,
                CellType::Input,
                CellType::Output,
                CellType::Wall,
            ][kind_idx as usize];
            Cell::new(kind, raw_param % kind.rotation_count())
        })
    }

    proptest! {
        #[test]
        fn prop_full_rotation_is_identity(cell in arb_cell()) {
            let mut rotated = cell;
            for _ in 0..cell.kind.rotation_count() {
                rotated = rotated.rotate_forward();
            }
            prop_assert_eq!(rotated, cell);
        }

        #[test]
        fn prop_rotations_are_inverse(cell in arb_cell()) {
            prop_assert_eq!(cell.rotate_forward().rotate_backward(), cell);
            prop_assert_eq!(cell.rotate_backward().rotate_forward(), cell);
        }
    }
}
