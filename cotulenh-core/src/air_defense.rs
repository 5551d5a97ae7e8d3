//! Air-defense zones.
//!
//! Each anti-air, missile or navy unit (carried or not) covers every square
//! within its level as a Euclidean radius: `df² + dr² <= level²`.
//!
//! ```text
//! level 1        level 2
//!   . X .        . . X . .
//!   X S X        . X X X .
//!   . X .        X X S X X
//!                . X X X .
//!                . . X . .
//! ```

use crate::board::Board;
use crate::piece::Side;
use crate::square::{Square, SquareSet};

/// Per-side union of covered squares.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct AirDefense {
    zones: [SquareSet; 2],
}

impl AirDefense {
    /// Compute both zones from scratch.
    pub fn compute(board: &Board) -> AirDefense {
        let mut zones = [SquareSet::EMPTY; 2];
        for (sq, piece) in board.pieces() {
            for unit in piece.units() {
                let level = unit.air_defense_level();
                if level > 0 {
                    cover(&mut zones[unit.side.index()], sq, level);
                }
            }
        }
        AirDefense { zones }
    }

    /// Squares covered by `side`'s air defense.
    #[inline]
    pub fn zone(&self, side: Side) -> &SquareSet {
        &self.zones[side.index()]
    }

    /// Check whether `side`'s air defense covers `sq`.
    #[inline]
    pub fn covers(&self, side: Side, sq: Square) -> bool {
        self.zones[side.index()].contains(sq)
    }
}

fn cover(zone: &mut SquareSet, center: Square, level: u8) {
    let r = level as i8;
    for df in -r..=r {
        for dr in -r..=r {
            if (df as i16).pow(2) + (dr as i16).pow(2) <= (r as i16).pow(2) {
                if let Some(sq) = center.offset(df, dr) {
                    zone.insert(sq);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::{Piece, PieceType, Unit};

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn test_empty_board_has_no_zones() {
        let zones = AirDefense::compute(&Board::empty());
        assert!(zones.zone(Side::Red).is_empty());
        assert!(zones.zone(Side::Blue).is_empty());
    }

    #[test]
    fn test_level_one_is_a_plus() {
        let mut board = Board::empty();
        board.set(sq("f5"), Some(Piece::new(PieceType::AntiAir, Side::Red)));
        let zones = AirDefense::compute(&board);
        let red = zones.zone(Side::Red);
        assert_eq!(red.len(), 5);
        assert!(red.contains(sq("f6")));
        assert!(red.contains(sq("e5")));
        assert!(!red.contains(sq("g6")));
        assert!(zones.zone(Side::Blue).is_empty());
    }

    #[test]
    fn test_level_two_has_thirteen_squares() {
        let mut board = Board::empty();
        board.set(sq("f6"), Some(Piece::new(PieceType::Missile, Side::Blue)));
        let zones = AirDefense::compute(&board);
        assert_eq!(zones.zone(Side::Blue).len(), 13);
        assert!(zones.covers(Side::Blue, sq("f8")));
        assert!(zones.covers(Side::Blue, sq("g7")));
        assert!(!zones.covers(Side::Blue, sq("g8")));
    }

    #[test]
    fn test_heroic_and_carried_units_count() {
        let mut board = Board::empty();
        let mut engineer = Piece::new(PieceType::Engineer, Side::Red);
        engineer.carrying.push(Unit::new(PieceType::AntiAir, Side::Red).heroic());
        board.set(sq("f6"), Some(engineer));
        let zones = AirDefense::compute(&board);
        assert_eq!(zones.zone(Side::Red).len(), 13);
    }

    #[test]
    fn test_zone_clipped_at_edge() {
        let mut board = Board::empty();
        board.set(sq("a1"), Some(Piece::new(PieceType::Navy, Side::Red)));
        let zones = AirDefense::compute(&board);
        assert_eq!(zones.zone(Side::Red).len(), 3);
    }
}
