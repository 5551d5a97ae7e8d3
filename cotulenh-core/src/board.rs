//! Square occupancy plus a cached commander index.

use crate::error::{GameError, Result};
use crate::piece::{Piece, PieceType, Side};
use crate::square::Square;

/// Mapping from square to piece.
///
/// Storage is indexed by the raw 0..256 square index, so lookups never need a
/// bounds translation. Every write goes through [`Board::set`], which keeps the
/// commander cache in step with the squares.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Board {
    squares: Box<[Option<Piece>; 256]>,
    commanders: [Option<Square>; 2],
}

impl Board {
    /// Create an empty board.
    pub fn empty() -> Board {
        Board {
            squares: Box::new(std::array::from_fn(|_| None)),
            commanders: [None; 2],
        }
    }

    #[inline]
    pub fn get(&self, sq: Square) -> Option<&Piece> {
        self.squares[sq.index() as usize].as_ref()
    }

    #[inline]
    pub fn is_empty(&self, sq: Square) -> bool {
        self.get(sq).is_none()
    }

    /// Replace the contents of a square, returning what was there.
    pub fn set(&mut self, sq: Square, piece: Option<Piece>) -> Option<Piece> {
        if let Some(side) = piece.as_ref().and_then(commander_side) {
            self.commanders[side.index()] = Some(sq);
        }
        let prior = std::mem::replace(&mut self.squares[sq.index() as usize], piece);
        if let Some(side) = prior.as_ref().and_then(commander_side) {
            let still_here = self.get(sq).and_then(commander_side) == Some(side);
            if self.commanders[side.index()] == Some(sq) && !still_here {
                self.commanders[side.index()] = None;
            }
        }
        prior
    }

    /// Square of a side's commander, whether standing alone or carried.
    #[inline]
    pub fn commander(&self, side: Side) -> Option<Square> {
        self.commanders[side.index()]
    }

    /// Iterate over occupied squares.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, &Piece)> + '_ {
        Square::all().filter_map(move |sq| self.get(sq).map(|p| (sq, p)))
    }

    /// Iterate over squares occupied by one side.
    pub fn pieces_of(&self, side: Side) -> impl Iterator<Item = (Square, &Piece)> + '_ {
        self.pieces().filter(move |(_, p)| p.side == side)
    }

    /// Check whether a piece may stand on a square (its carrier decides).
    pub fn terrain_allows(piece: &Piece, sq: Square) -> bool {
        piece.kind.terrain_class().allows(sq.terrain())
    }

    /// Reject any piece standing on terrain its carrier cannot occupy.
    pub fn validate_terrain(&self, skip: Option<Square>) -> Result<()> {
        for (sq, piece) in self.pieces() {
            if Some(sq) != skip && !Board::terrain_allows(piece, sq) {
                return Err(GameError::InvariantViolation(format!(
                    "{} cannot stand on {sq} ({:?})",
                    piece.fen_code(),
                    sq.terrain()
                )));
            }
        }
        Ok(())
    }

    /// Check that no side has more than one commander on the board.
    pub(crate) fn validate_commanders(&self) -> Result<()> {
        for side in [Side::Red, Side::Blue] {
            let count = self
                .pieces_of(side)
                .filter(|(_, p)| p.contains(PieceType::Commander))
                .count();
            if count > 1 {
                return Err(GameError::malformed(format!("{side:?} has {count} commanders")));
            }
        }
        Ok(())
    }

    /// Check that every square strictly between two aligned squares is empty.
    pub fn line_is_clear(&self, from: Square, to: Square) -> bool {
        let df = to.file() as i8 - from.file() as i8;
        let dr = to.rank() as i8 - from.rank() as i8;
        if !(df == 0 || dr == 0 || df.abs() == dr.abs()) || from == to {
            return false;
        }
        let step = (df.signum(), dr.signum());
        let mut sq = from;
        loop {
            sq = match sq.offset(step.0, step.1) {
                Some(next) => next,
                None => return false,
            };
            if sq == to {
                return true;
            }
            if !self.is_empty(sq) {
                return false;
            }
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

fn commander_side(piece: &Piece) -> Option<Side> {
    piece.contains(PieceType::Commander).then_some(piece.side)
}
