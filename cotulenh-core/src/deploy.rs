//! Deploy sessions: splitting one stack across several squares in a single turn.
//!
//! ```text
//!            deploy sub-move
//! Inactive ───────────────────▶ Active ──┐ sub-move / recombine
//!    ▲                            │  ◀───┘
//!    │   cancel (revert all)      │
//!    ├────────────────────────────┤
//!    │   origin exhausted/commit  │
//!    └──── history entry ◀────────┘
//! ```
//!
//! The session itself only tracks bookkeeping; the board changes live in the
//! game's command log so they can be reverted exactly.

use arrayvec::ArrayVec;
use serde::Serialize;

use crate::board::Board;
use crate::moves::Move;
use crate::piece::{Piece, PieceType, Side, MAX_STACK};
use crate::square::Square;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DeploySession {
    origin: Square,
    side: Side,
    stack: Piece,
    moves: Vec<Move>,
    notations: Vec<String>,
    acted: ArrayVec<PieceType, MAX_STACK>,
}

impl DeploySession {
    /// Open a session on `origin`, which holds `stack` before any unit has left.
    pub fn start(origin: Square, stack: Piece) -> DeploySession {
        DeploySession {
            origin,
            side: stack.side,
            stack,
            moves: Vec::new(),
            notations: Vec::new(),
            acted: ArrayVec::new(),
        }
    }

    #[inline]
    pub fn origin(&self) -> Square {
        self.origin
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    /// The stack as it stood when the session began.
    pub fn stack(&self) -> &Piece {
        &self.stack
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn notations(&self) -> &[String] {
        &self.notations
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn has_acted(&self, kind: PieceType) -> bool {
        self.acted.contains(&kind)
    }

    /// Squares that received units during this session.
    pub fn deployed_squares(&self) -> Vec<Square> {
        let mut squares = Vec::new();
        for mv in self.moves.iter().filter(|m| m.mode.relocates()) {
            if !squares.contains(&mv.to) {
                squares.push(mv.to);
            }
        }
        squares
    }

    pub fn is_deployed(&self, sq: Square) -> bool {
        self.moves.iter().any(|m| m.mode.relocates() && m.to == sq)
    }

    pub(crate) fn record(&mut self, mv: Move, notation: String) {
        for unit in mv.piece.units() {
            if !self.acted.contains(&unit.kind) {
                self.acted.push(unit.kind);
            }
        }
        self.moves.push(mv);
        self.notations.push(notation);
    }

    /// Forget the most recent sub-move.
    pub(crate) fn pop(&mut self) -> Option<Move> {
        let mv = self.moves.pop()?;
        self.notations.pop();
        self.acted.retain(|kind| !mv.piece.contains(*kind));
        Some(mv)
    }

    /// Units on the origin that have not acted yet.
    pub fn pending(&self, board: &Board) -> ArrayVec<PieceType, MAX_STACK> {
        board
            .get(self.origin)
            .map(|p| p.units().map(|u| u.kind).filter(|k| !self.has_acted(*k)).collect())
            .unwrap_or_default()
    }

    /// Every unit has left or otherwise acted.
    pub fn is_complete(&self, board: &Board) -> bool {
        self.pending(board).is_empty()
    }

    /// Notation of the whole deploy turn: `origin:[staying<]sub,sub`.
    pub fn turn_notation(&self, board: &Board) -> String {
        let mut out = format!("{}:", self.origin);
        if let Some(staying) = board.get(self.origin) {
            out.push_str(&staying.san_code());
            out.push('<');
        }
        out.push_str(&self.notations.join(","));
        out
    }

    /// Serializable snapshot for callers outside the engine.
    pub fn view(&self, board: &Board) -> DeployView {
        DeployView {
            origin: self.origin,
            side: self.side,
            stack: self.stack.fen_code(),
            remaining: board.get(self.origin).map(Piece::fen_code),
            moves: self.notations.clone(),
            deployed: self.deployed_squares(),
        }
    }
}

/// Session state as reported to callers.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct DeployView {
    pub origin: Square,
    pub side: Side,
    pub stack: String,
    pub remaining: Option<String>,
    pub moves: Vec<String>,
    pub deployed: Vec<Square>,
}
