//! Co Tu Lenh rules engine.
//!
//! # Board
//!
//! ```text
//! 11 files (a..k) x 12 ranks (1..12). Red starts on ranks 1-6, Blue on 7-12.
//!
//!   a b | c | d e f g h i j k
//!  water|mix|      land          river between ranks 6 and 7,
//!                                bridges on files f and h
//! ```
//!
//! # Layout
//!
//! ```text
//! square      geometry, terrain, square sets
//! piece       sides, piece types, units and stacks
//! stack       carrier table and stack merging
//! movement    range tables and the heroic bonus
//! board       occupancy with a commander index
//! air_defense per-side defended squares
//! movegen     pseudo-legal moves and attack tests
//! action      reversible mutations of a position
//! deploy      deploy-session bookkeeping
//! notation    move text
//! fen         position text
//! game        legal-move filter, turns, sessions, undo, outcome
//! ```
//!
//! # Example
//!
//! ```
//! use cotulenh_core::Game;
//!
//! let mut game = Game::new();
//! game.apply_san("I&c4").unwrap();
//! assert_eq!(game.history().len(), 1);
//! game.undo();
//! assert_eq!(game.fen(), cotulenh_core::DEFAULT_POSITION);
//! ```

pub mod action;
pub mod air_defense;
pub mod board;
pub mod deploy;
pub mod error;
pub mod fen;
pub mod game;
pub mod movegen;
pub mod movement;
pub mod moves;
pub mod notation;
pub mod piece;
pub mod square;
pub mod stack;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use action::{Action, Position};
pub use air_defense::AirDefense;
pub use board::Board;
pub use deploy::{DeploySession, DeployView};
pub use error::{GameError, Result};
pub use fen::DEFAULT_POSITION;
pub use game::{Game, GameStatus, MoveFilter, MoveView, TurnRecord};
pub use movegen::MoveContext;
pub use moves::{Move, MoveMode};
pub use piece::{Piece, PieceType, Side, Unit};
pub use square::{Square, Terrain};
