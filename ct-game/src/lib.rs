#![warn(missing_debug_implementations)]

//! The rules of Contrast, a two-player game on a 5x5 board where the tile under a piece decides how it moves.
//!
//! * [board::Board] holds the full game state and implements move generation and the terminal rules.
//! * [action::Action] is the compact integer encoding of a move with an optional tile placement.
//! * [mapping] turns a board into the input tensor of the network.

pub mod action;
pub mod board;
pub mod cell;
pub mod mapping;
pub mod rules;
