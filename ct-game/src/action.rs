use std::fmt::{Debug, Display, Formatter};

use crate::board::TileColor;
use crate::cell::Cell;
use crate::rules::{ACTION_COUNT, CELL_COUNT, TILE_CHOICES};

/// A tile placed as part of an action. Placing a [TileColor::White] tile is not possible.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Placement {
    pub color: TileColor,
    pub cell: Cell,
}

/// The structured form of an [Action].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ActionParts {
    pub from: Cell,
    pub to: Cell,
    pub placement: Option<Placement>,
}

/// A move from one cell to another, optionally followed by a tile placement.
///
/// Encoded as `(from * 25 + to) * 51 + tile_index`, where `tile_index` is `0` for no placement,
/// `1 + cell` for a black tile and `26 + cell` for a gray tile.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Action(u32);

impl Action {
    pub fn new(from: Cell, to: Cell, placement: Option<Placement>) -> Action {
        let move_index = from.index() * CELL_COUNT + to.index();
        let tile_index = match placement {
            None => 0,
            Some(Placement { color, cell }) => match color {
                TileColor::Black => 1 + cell.index(),
                TileColor::Gray => 1 + CELL_COUNT + cell.index(),
                TileColor::White => panic!("White tiles can't be placed"),
            },
        };

        Action((move_index * TILE_CHOICES + tile_index) as u32)
    }

    pub fn try_from_u32(value: u32) -> Option<Action> {
        ((value as usize) < ACTION_COUNT).then_some(Action(value))
    }

    pub fn to_u32(self) -> u32 {
        self.0
    }

    /// The index into the move policy, `from * 25 + to`.
    pub fn move_index(self) -> usize {
        self.0 as usize / TILE_CHOICES
    }

    /// The index into the tile policy.
    pub fn tile_index(self) -> usize {
        self.0 as usize % TILE_CHOICES
    }

    pub fn from(self) -> Cell {
        Cell::new((self.move_index() / CELL_COUNT) as u8)
    }

    pub fn to(self) -> Cell {
        Cell::new((self.move_index() % CELL_COUNT) as u8)
    }

    pub fn placement(self) -> Option<Placement> {
        let tile_index = self.tile_index();
        if tile_index == 0 {
            None
        } else if tile_index <= CELL_COUNT {
            Some(Placement {
                color: TileColor::Black,
                cell: Cell::new((tile_index - 1) as u8),
            })
        } else {
            Some(Placement {
                color: TileColor::Gray,
                cell: Cell::new((tile_index - 1 - CELL_COUNT) as u8),
            })
        }
    }

    pub fn decode(self) -> ActionParts {
        ActionParts {
            from: self.from(),
            to: self.to(),
            placement: self.placement(),
        }
    }

    /// The same action seen from the other side of the board, every cell is point-reflected.
    /// This is an involution.
    pub fn flip(self) -> Action {
        let placement = self.placement().map(|p| Placement {
            color: p.color,
            cell: p.cell.flip(),
        });
        Action::new(self.from().flip(), self.to().flip(), placement)
    }
}

impl From<ActionParts> for Action {
    fn from(parts: ActionParts) -> Self {
        Action::new(parts.from, parts.to, parts.placement)
    }
}

impl Debug for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Action({}, {})", self.0, self)
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.from(), self.to())?;
        if let Some(placement) = self.placement() {
            write!(f, "+{}:{}", placement.color.to_char(), placement.cell)?;
        }
        Ok(())
    }
}
