#![warn(missing_debug_implementations)]

//! A single game of Contrast together with the search state of an engine playing it.
//!
//! [Session] is the surface an outer application talks to: it validates every action before playing it,
//! keeps an undo stack and runs the search on request. All values crossing this boundary use plain integers,
//! cells are indexed as `y * 5 + x` and actions use the encoding of [Action].

use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use ct_game::action::Action;
use ct_game::board::{Board, Outcome, Player, TileColor};
use ct_game::cell::Cell;
use ct_net::model::TowerShape;
use ct_net::weights::{load_weights_from_path, WeightsError};
use ct_zero::network::cpu::CpuNetwork;
use ct_zero::network::Network;
use ct_zero::zero::tree::Tree;
use ct_zero::zero::wrapper::{SearchStats, ZeroSettings};

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("illegal action {0}")]
    IllegalAction(Action),
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("{0} is not a valid action encoding")]
    InvalidAction(u32),
    #[error("{0} is not a valid cell index")]
    InvalidCell(u8),
    #[error(transparent)]
    Weights(#[from] WeightsError),
}

/// A snapshot of the position for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// `0` empty, `1` player A, `2` player B.
    pub pieces: [u8; 25],
    /// `0` white, `1` black, `2` gray.
    pub tiles: [u8; 25],
    /// Tiles in hand: A black, A gray, B black, B gray.
    pub tile_counts: [u8; 4],
    pub current_player: u8,
    pub game_over: bool,
    /// `0` for no winner (ongoing or draw), otherwise the winning player.
    pub winner: u8,
    pub move_count: u32,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub game_over: bool,
    pub winner: u8,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ThinkResult {
    /// `None` if the game is over.
    pub action: Option<Action>,
    /// The estimated value for the player to move.
    pub value: f32,
    pub stats: SearchStats,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct DecodedAction {
    pub from_x: u8,
    pub from_y: u8,
    pub to_x: u8,
    pub to_y: u8,
    /// `0` for no placement, `1` black, `2` gray.
    pub tile_type: u8,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tile_x: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tile_y: Option<u8>,
}

#[derive(Debug)]
pub struct Session<N: Network = CpuNetwork> {
    board: Board,
    history: Vec<Board>,

    network: N,
    tree: Tree,
    settings: ZeroSettings,
    rng: StdRng,
}

impl Session<CpuNetwork> {
    /// Load the network weights and start a new game.
    pub fn initialize(
        model_path: impl AsRef<Path>,
        shape: TowerShape,
        settings: ZeroSettings,
        seed: u64,
    ) -> SessionResult<Self> {
        let net = load_weights_from_path(model_path.as_ref(), shape)?;
        tracing::info!("Session initialized with {:?}", settings);
        Ok(Session::new(CpuNetwork::new(net), settings, StdRng::seed_from_u64(seed)))
    }
}

impl<N: Network> Session<N> {
    pub fn new(network: N, settings: ZeroSettings, rng: StdRng) -> Self {
        Session {
            board: Board::default(),
            history: vec![],
            network,
            tree: Tree::new(),
            settings,
            rng,
        }
    }

    /// Start a new game. The search tree is kept, its nodes stay valid for identical positions.
    pub fn reset_game(&mut self) {
        self.board.reset();
        self.history.clear();
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn settings(&self) -> ZeroSettings {
        self.settings
    }

    pub fn set_settings(&mut self, settings: ZeroSettings) {
        self.settings = settings;
    }

    pub fn state(&self) -> GameState {
        let board = &self.board;

        let mut pieces = [0; 25];
        let mut tiles = [0; 25];
        for cell in Cell::all() {
            pieces[cell.index()] = board.piece(cell).map_or(0, Player::id);
            tiles[cell.index()] = board.tile(cell).id();
        }

        let a = board.tile_counts(Player::A);
        let b = board.tile_counts(Player::B);

        GameState {
            pieces,
            tiles,
            tile_counts: [a.black, a.gray, b.black, b.gray],
            current_player: board.next_player().id(),
            game_over: board.is_done(),
            winner: winner_id(board.outcome()),
            move_count: board.move_count(),
        }
    }

    /// The destinations of the piece on `cell`, empty if it does not belong to the player to move.
    pub fn valid_moves(&self, cell: u8) -> SessionResult<Vec<u8>> {
        let cell = Cell::try_new(cell).ok_or(SessionError::InvalidCell(cell))?;
        let destinations = self.board.legal_destinations(cell);
        Ok(destinations.into_iter().map(|c| c.index() as u8).collect())
    }

    /// Play `action` if it is legal, the position is left untouched otherwise.
    pub fn apply_action(&mut self, action: u32) -> SessionResult<StepResult> {
        let action = Action::try_from_u32(action).ok_or(SessionError::InvalidAction(action))?;
        if !self.board.is_legal(action) {
            return Err(SessionError::IllegalAction(action));
        }

        let player = self.board.next_player();
        self.history.push(self.board.clone());
        self.board.apply(action);

        match self.board.outcome() {
            Some(Outcome::Draw) => tracing::warn!("Game drawn by repetition after {} moves", self.board.move_count()),
            Some(Outcome::WonBy(winner)) if winner == player && !reached_target(&self.board, winner) => {
                tracing::warn!("{:?} has no legal actions left and loses", winner.other())
            }
            _ => {}
        }

        Ok(StepResult {
            game_over: self.board.is_done(),
            winner: winner_id(self.board.outcome()),
        })
    }

    /// Restore the position before the last applied action.
    pub fn undo(&mut self) -> SessionResult<()> {
        self.board = self.history.pop().ok_or(SessionError::NothingToUndo)?;
        Ok(())
    }

    /// Search the current position and return the most visited action with the root value.
    pub fn think(&mut self, simulations: u64) -> ThinkResult {
        let stats = self.settings.expand_tree(
            &mut self.tree,
            &self.board,
            &mut self.network,
            &mut self.rng,
            simulations,
        );

        ThinkResult {
            action: self.tree.best_action(&self.board),
            value: self.tree.root_value(&self.board),
            stats,
        }
    }

    pub fn decode_action(action: u32) -> SessionResult<DecodedAction> {
        let parts = Action::try_from_u32(action)
            .ok_or(SessionError::InvalidAction(action))?
            .decode();

        let (tile_type, tile_x, tile_y) = match parts.placement {
            None => (TileColor::White.id(), None, None),
            Some(p) => (p.color.id(), Some(p.cell.x()), Some(p.cell.y())),
        };

        Ok(DecodedAction {
            from_x: parts.from.x(),
            from_y: parts.from.y(),
            to_x: parts.to.x(),
            to_y: parts.to.y(),
            tile_type,
            tile_x,
            tile_y,
        })
    }
}

fn winner_id(outcome: Option<Outcome>) -> u8 {
    match outcome {
        Some(Outcome::WonBy(player)) => player.id(),
        Some(Outcome::Draw) | None => 0,
    }
}

fn reached_target(board: &Board, player: Player) -> bool {
    Cell::all().any(|c| c.y() == player.target_row() && board.piece(c) == Some(player))
}
