use std::fmt::{Debug, Display, Formatter};

use crate::rules::{BOARD_SIZE, CELL_COUNT};

/// A square of the board, indexed as `y * 5 + x`. Row `0` is the home row of [Player::B](crate::board::Player::B).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Cell(u8);

impl Cell {
    pub fn new(index: u8) -> Cell {
        assert!((index as usize) < CELL_COUNT, "Cell index {} out of bounds", index);
        Cell(index)
    }

    pub fn try_new(index: u8) -> Option<Cell> {
        ((index as usize) < CELL_COUNT).then_some(Cell(index))
    }

    pub fn from_xy(x: u8, y: u8) -> Cell {
        assert!(x < BOARD_SIZE && y < BOARD_SIZE, "Coordinate ({}, {}) out of bounds", x, y);
        Cell(y * BOARD_SIZE + x)
    }

    pub fn all() -> impl Iterator<Item = Cell> {
        (0..CELL_COUNT as u8).map(Cell)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn x(self) -> u8 {
        self.0 % BOARD_SIZE
    }

    pub fn y(self) -> u8 {
        self.0 / BOARD_SIZE
    }

    /// Point reflection through the center of the board.
    pub fn flip(self) -> Cell {
        Cell(CELL_COUNT as u8 - 1 - self.0)
    }

    /// The neighbouring cell in direction `(dx, dy)`, if it is still on the board.
    pub fn offset(self, dx: i8, dy: i8) -> Option<Cell> {
        let x = self.x() as i8 + dx;
        let y = self.y() as i8 + dy;
        let range = 0..BOARD_SIZE as i8;
        (range.contains(&x) && range.contains(&y)).then(|| Cell::from_xy(x as u8, y as u8))
    }
}

impl Debug for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Cell({}, {})", self.x(), self.y())
    }
}

/// Files `a-e` from left to right, ranks `1-5` counted from the home row of [Player::A](crate::board::Player::A).
impl Display for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let file = (b'a' + self.x()) as char;
        let rank = BOARD_SIZE - self.y();
        write!(f, "{}{}", file, rank)
    }
}

#[cfg(test)]
mod test {
    use crate::cell::Cell;

    #[test]
    fn coordinates() {
        let cell = Cell::from_xy(3, 1);
        assert_eq!(cell.index(), 8);
        assert_eq!((cell.x(), cell.y()), (3, 1));
        assert_eq!(cell.to_string(), "d4");
        assert_eq!(Cell::new(20).to_string(), "a1");
    }

    #[test]
    fn flip() {
        assert_eq!(Cell::new(0).flip(), Cell::new(24));
        assert_eq!(Cell::new(12).flip(), Cell::new(12));
        for cell in Cell::all() {
            assert_eq!(cell.flip().flip(), cell);
            assert_eq!((cell.flip().x(), cell.flip().y()), (4 - cell.x(), 4 - cell.y()));
        }
    }

    #[test]
    fn offset() {
        let corner = Cell::from_xy(0, 0);
        assert_eq!(corner.offset(-1, 0), None);
        assert_eq!(corner.offset(1, 1), Some(Cell::from_xy(1, 1)));
        assert_eq!(Cell::from_xy(4, 4).offset(0, 1), None);
    }

    #[test]
    fn try_new() {
        assert_eq!(Cell::try_new(24), Some(Cell::new(24)));
        assert_eq!(Cell::try_new(25), None);
    }
}
