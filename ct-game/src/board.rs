use std::collections::{HashMap, VecDeque};
use std::fmt::{Display, Formatter};

use crate::action::{Action, Placement};
use crate::cell::Cell;
use crate::rules::{
    BOARD_SIZE, CELL_COUNT, HISTORY_SIZE, INITIAL_BLACK_TILES, INITIAL_GRAY_TILES, REPETITION_LIMIT,
    REPETITION_START_MOVE,
};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Player {
    /// Starts on row 4 and moves first.
    A,
    /// Starts on row 0.
    B,
}

impl Player {
    pub fn other(self) -> Player {
        match self {
            Player::A => Player::B,
            Player::B => Player::A,
        }
    }

    /// `0` for [Player::A], `1` for [Player::B].
    pub fn index(self) -> usize {
        match self {
            Player::A => 0,
            Player::B => 1,
        }
    }

    /// `1` for [Player::A], `2` for [Player::B], `0` is used for empty cells.
    pub fn id(self) -> u8 {
        self.index() as u8 + 1
    }

    /// The row this player has to reach to win.
    pub fn target_row(self) -> u8 {
        match self {
            Player::A => 0,
            Player::B => BOARD_SIZE - 1,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Player::A => 'A',
            Player::B => 'B',
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TileColor {
    White,
    Black,
    Gray,
}

impl TileColor {
    pub fn id(self) -> u8 {
        match self {
            TileColor::White => 0,
            TileColor::Black => 1,
            TileColor::Gray => 2,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            TileColor::White => 'W',
            TileColor::Black => 'B',
            TileColor::Gray => 'G',
        }
    }

    /// The directions a piece standing on this tile slides in.
    pub fn directions(self) -> &'static [(i8, i8)] {
        match self {
            TileColor::White => &ORTHOGONAL,
            TileColor::Black => &DIAGONAL,
            TileColor::Gray => &ALL_DIRECTIONS,
        }
    }
}

const ORTHOGONAL: [(i8, i8); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];
const DIAGONAL: [(i8, i8); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];
const ALL_DIRECTIONS: [(i8, i8); 8] = [(0, -1), (0, 1), (-1, 0), (1, 0), (-1, -1), (1, -1), (-1, 1), (1, 1)];

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Outcome {
    WonBy(Player),
    Draw,
}

impl Outcome {
    /// The value of this outcome for `pov`: `1` for a win, `-1` for a loss and `0` for a draw.
    pub fn pov_value(self, pov: Player) -> f32 {
        match self {
            Outcome::WonBy(player) if player == pov => 1.0,
            Outcome::WonBy(_) => -1.0,
            Outcome::Draw => 0.0,
        }
    }
}

/// The tiles a player still has in hand.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TileCounts {
    pub black: u8,
    pub gray: u8,
}

impl TileCounts {
    pub const INITIAL: TileCounts = TileCounts {
        black: INITIAL_BLACK_TILES,
        gray: INITIAL_GRAY_TILES,
    };

    pub fn get(self, color: TileColor) -> u8 {
        match color {
            TileColor::White => 0,
            TileColor::Black => self.black,
            TileColor::Gray => self.gray,
        }
    }

    pub fn is_empty(self) -> bool {
        self.black == 0 && self.gray == 0
    }

    /// The colors that can still be placed, black before gray.
    pub fn available_colors(self) -> impl Iterator<Item = TileColor> {
        let black = (self.black > 0).then_some(TileColor::Black);
        let gray = (self.gray > 0).then_some(TileColor::Gray);
        black.into_iter().chain(gray)
    }

    fn decrement(&mut self, color: TileColor) {
        let count = match color {
            TileColor::White => panic!("White tiles can't be placed"),
            TileColor::Black => &mut self.black,
            TileColor::Gray => &mut self.gray,
        };
        assert!(*count > 0, "No {:?} tiles left to place", color);
        *count -= 1;
    }
}

/// The part of the state that is remembered for the network input.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Snapshot {
    pub pieces: [Option<Player>; CELL_COUNT],
    pub tiles: [TileColor; CELL_COUNT],
    pub tile_counts: [TileCounts; 2],
}

/// The full state of a game of Contrast.
///
/// Besides the position itself this tracks the last [HISTORY_SIZE] snapshots (newest first),
/// and from move [REPETITION_START_MOVE] on, how often each position has occurred.
#[derive(Debug, Clone)]
pub struct Board {
    pieces: [Option<Player>; CELL_COUNT],
    tiles: [TileColor; CELL_COUNT],
    tile_counts: [TileCounts; 2],

    next_player: Player,
    outcome: Option<Outcome>,
    move_count: u32,

    history: VecDeque<Snapshot>,
    repetitions: HashMap<u64, u32>,
}

const FNV_OFFSET: u64 = 14695981039346656037;
const FNV_PRIME: u64 = 1099511628211;
const KEY_MOVE_MULTIPLIER: u64 = 987654321;

impl Default for Board {
    fn default() -> Self {
        let mut pieces = [None; CELL_COUNT];
        for x in 0..BOARD_SIZE {
            pieces[Cell::from_xy(x, BOARD_SIZE - 1).index()] = Some(Player::A);
            pieces[Cell::from_xy(x, 0).index()] = Some(Player::B);
        }

        Board::from_parts(
            pieces,
            [TileColor::White; CELL_COUNT],
            [TileCounts::INITIAL; 2],
            Player::A,
        )
    }
}

impl Board {
    /// Build an arbitrary non-terminal position at move zero, the history is just this position.
    pub fn from_parts(
        pieces: [Option<Player>; CELL_COUNT],
        tiles: [TileColor; CELL_COUNT],
        tile_counts: [TileCounts; 2],
        next_player: Player,
    ) -> Board {
        let mut board = Board {
            pieces,
            tiles,
            tile_counts,
            next_player,
            outcome: None,
            move_count: 0,
            history: VecDeque::with_capacity(HISTORY_SIZE + 1),
            repetitions: HashMap::new(),
        };
        board.push_snapshot();
        board
    }

    /// Reset to the standard starting position.
    pub fn reset(&mut self) {
        *self = Board::default();
    }

    pub fn piece(&self, cell: Cell) -> Option<Player> {
        self.pieces[cell.index()]
    }

    pub fn tile(&self, cell: Cell) -> TileColor {
        self.tiles[cell.index()]
    }

    pub fn tile_counts(&self, player: Player) -> TileCounts {
        self.tile_counts[player.index()]
    }

    pub fn next_player(&self) -> Player {
        self.next_player
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_done(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    /// The retained snapshots, newest first. The first one is always the current position.
    pub fn snapshot_history(&self) -> impl Iterator<Item = &Snapshot> + '_ {
        self.history.iter()
    }

    /// The snapshot `depth` moves ago, or the oldest retained one if the history is shorter.
    pub fn snapshot(&self, depth: usize) -> &Snapshot {
        self.history
            .get(depth)
            .or_else(|| self.history.back())
            .expect("History always contains the current position")
    }

    /// The cells the piece on `cell` can move to.
    /// Empty if `cell` does not hold a piece of the player to move.
    ///
    /// A piece slides along each direction allowed by the tile under it, jumping over its own pieces,
    /// until it lands on the first empty cell. An opponent piece blocks the direction completely.
    pub fn legal_destinations(&self, cell: Cell) -> Vec<Cell> {
        let player = self.next_player;
        if self.piece(cell) != Some(player) {
            return vec![];
        }

        let mut result = vec![];
        for &(dx, dy) in self.tile(cell).directions() {
            let mut curr = cell.offset(dx, dy);
            while let Some(next) = curr {
                match self.piece(next) {
                    None => {
                        result.push(next);
                        break;
                    }
                    Some(p) if p == player => curr = next.offset(dx, dy),
                    Some(_) => break,
                }
            }
        }
        result
    }

    /// Every legal action, empty if the game is done.
    ///
    /// For each piece and each destination the plain move comes first, followed by a placement on every white cell that
    /// is not the destination and not occupied after the move, black before gray.
    pub fn legal_actions(&self) -> Vec<Action> {
        if self.is_done() {
            return vec![];
        }

        let player = self.next_player;
        let counts = self.tile_counts(player);
        let white_cells: Vec<Cell> = Cell::all().filter(|&c| self.tile(c) == TileColor::White).collect();

        let mut result = vec![];
        for from in Cell::all().filter(|&c| self.piece(c) == Some(player)) {
            for to in self.legal_destinations(from) {
                result.push(Action::new(from, to, None));

                if counts.is_empty() {
                    continue;
                }

                for &cell in &white_cells {
                    let occupied = cell != from && self.piece(cell).is_some();
                    if cell == to || occupied {
                        continue;
                    }
                    for color in counts.available_colors() {
                        result.push(Action::new(from, to, Some(Placement { color, cell })));
                    }
                }
            }
        }
        result
    }

    pub fn has_legal_action(&self) -> bool {
        !self.is_done()
            && Cell::all()
                .filter(|&c| self.piece(c) == Some(self.next_player))
                .any(|c| !self.legal_destinations(c).is_empty())
    }

    /// Whether `action` is part of [Self::legal_actions].
    pub fn is_legal(&self, action: Action) -> bool {
        if self.is_done() {
            return false;
        }

        let parts = action.decode();
        if !self.legal_destinations(parts.from).contains(&parts.to) {
            return false;
        }

        match parts.placement {
            None => true,
            Some(Placement { color, cell }) => {
                self.tile_counts(self.next_player).get(color) > 0
                    && self.tile(cell) == TileColor::White
                    && cell != parts.to
                    && (cell == parts.from || self.piece(cell).is_none())
            }
        }
    }

    /// Play `action` for the player to move. Does nothing if the game is already done.
    ///
    /// The action is not checked for legality beyond some cheap debug assertions, callers must use
    /// [Self::is_legal] or [Self::legal_actions] first.
    pub fn apply(&mut self, action: Action) {
        if self.is_done() {
            return;
        }

        let player = self.next_player;
        let parts = action.decode();
        debug_assert_eq!(self.piece(parts.from), Some(player), "No own piece to move for {}", action);
        debug_assert_eq!(self.piece(parts.to), None, "Destination is occupied for {}", action);

        self.pieces[parts.to.index()] = self.pieces[parts.from.index()].take();

        if let Some(Placement { color, cell }) = parts.placement {
            self.tiles[cell.index()] = color;
            self.tile_counts[player.index()].decrement(color);
        }

        self.outcome = self.target_row_outcome();
        self.next_player = player.other();

        // stalemate loses
        if self.outcome.is_none() && !self.has_legal_action() {
            self.outcome = Some(Outcome::WonBy(player));
        }

        self.move_count += 1;
        self.push_snapshot();

        if self.outcome.is_none() && self.move_count >= REPETITION_START_MOVE {
            let count = self.repetitions.entry(self.structural_hash()).or_insert(0);
            *count += 1;
            if *count >= REPETITION_LIMIT {
                self.outcome = Some(Outcome::Draw);
            }
        }
    }

    pub fn clone_and_apply(&self, action: Action) -> Board {
        let mut next = self.clone();
        next.apply(action);
        next
    }

    /// [Player::A] is checked first.
    fn target_row_outcome(&self) -> Option<Outcome> {
        [Player::A, Player::B].into_iter().find_map(|player| {
            let y = player.target_row();
            (0..BOARD_SIZE)
                .any(|x| self.piece(Cell::from_xy(x, y)) == Some(player))
                .then_some(Outcome::WonBy(player))
        })
    }

    fn push_snapshot(&mut self) {
        self.history.push_front(Snapshot {
            pieces: self.pieces,
            tiles: self.tiles,
            tile_counts: self.tile_counts,
        });
        self.history.truncate(HISTORY_SIZE);
    }

    /// FNV-1a over the `(piece, tile)` pairs in cell order, followed by the player to move.
    /// Tile counts and history are not included.
    pub fn structural_hash(&self) -> u64 {
        let mut hash = FNV_OFFSET;
        let mut feed = |value: u8| {
            hash ^= value as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        };

        for (piece, tile) in self.pieces.iter().zip(&self.tiles) {
            feed(piece.map_or(0, Player::id));
            feed(tile.id());
        }
        feed(self.next_player.id());

        hash
    }

    /// The key used to identify this position in a search tree.
    ///
    /// Continues [Self::structural_hash] with the tile counts of both players, since those decide which placements
    /// are legal, and separates identical positions reached at different move counts.
    pub fn position_key(&self) -> u64 {
        let mut hash = self.structural_hash();
        for counts in self.tile_counts {
            for value in [counts.black, counts.gray] {
                hash ^= value as u64;
                hash = hash.wrapping_mul(FNV_PRIME);
            }
        }

        hash ^ (self.move_count as u64).wrapping_mul(KEY_MOVE_MULTIPLIER)
    }

    /// How often the current position has been counted for the repetition rule.
    pub fn repetition_count(&self) -> u32 {
        self.repetitions.get(&self.structural_hash()).copied().unwrap_or(0)
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for y in 0..BOARD_SIZE {
            write!(f, "{} ", BOARD_SIZE - y)?;
            for x in 0..BOARD_SIZE {
                let cell = Cell::from_xy(x, y);
                let piece = self.piece(cell).map_or('.', Player::to_char);
                let tile = match self.tile(cell) {
                    TileColor::White => ' ',
                    TileColor::Black => 'b',
                    TileColor::Gray => 'g',
                };
                write!(f, "{}{} ", piece, tile)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "  a  b  c  d  e")?;

        let a = self.tile_counts(Player::A);
        let b = self.tile_counts(Player::B);
        write!(
            f,
            "move {}, next {}, tiles A {}b {}g, B {}b {}g",
            self.move_count,
            self.next_player.to_char(),
            a.black,
            a.gray,
            b.black,
            b.gray
        )?;
        if let Some(outcome) = self.outcome {
            write!(f, ", outcome {:?}", outcome)?;
        }
        Ok(())
    }
}
