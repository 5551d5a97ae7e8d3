//! The move type.

use serde::{Deserialize, Serialize};

use crate::piece::Piece;
use crate::square::Square;

/// How a move resolves at its destination.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveMode {
    /// Move to an empty square.
    Normal,
    /// Remove the target and take its square.
    Capture,
    /// Remove the target without leaving the origin.
    StayCapture,
    /// Attacker and target are both removed.
    SuicideCapture,
    /// Join a friendly piece, forming a stack.
    Combine,
    /// Deploy sub-move that joins a piece deployed earlier in the same session.
    Recombine,
}

impl MoveMode {
    #[inline]
    pub const fn is_capture(self) -> bool {
        matches!(self, MoveMode::Capture | MoveMode::StayCapture | MoveMode::SuicideCapture)
    }

    #[inline]
    pub const fn is_combine(self) -> bool {
        matches!(self, MoveMode::Combine | MoveMode::Recombine)
    }

    /// Whether the moving units end up on the destination square.
    #[inline]
    pub const fn relocates(self) -> bool {
        matches!(
            self,
            MoveMode::Normal | MoveMode::Capture | MoveMode::Combine | MoveMode::Recombine
        )
    }

    /// Notation marker written before the destination.
    pub const fn marker(self) -> &'static str {
        match self {
            MoveMode::Normal => "",
            MoveMode::Capture => "x",
            MoveMode::StayCapture => "_",
            MoveMode::SuicideCapture => "@",
            MoveMode::Combine | MoveMode::Recombine => "&",
        }
    }
}

/// A move of one unit or a whole stack.
///
/// `piece` holds the moving units as they were before the move (heroic flags
/// included). `deploy` is set for every move that splits a stack or belongs to
/// a running deploy session; a deploy sub-move can itself be a capture, so it
/// is a flag rather than a mode.
#[derive(Clone, PartialEq, Eq, Debug, Hash, Serialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub mode: MoveMode,
    pub deploy: bool,
}

impl Move {
    /// Square the moving units occupy afterwards, `None` when they are destroyed.
    pub fn landing(&self) -> Option<Square> {
        match self.mode {
            MoveMode::SuicideCapture => None,
            MoveMode::StayCapture => Some(self.from),
            _ => Some(self.to),
        }
    }

    #[inline]
    pub fn is_capture(&self) -> bool {
        self.mode.is_capture()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::{PieceType, Side};

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn test_landing() {
        let mut mv = Move {
            from: sq("c3"),
            to: sq("c5"),
            piece: Piece::new(PieceType::Tank, Side::Red),
            captured: Some(Piece::new(PieceType::Infantry, Side::Blue)),
            mode: MoveMode::Capture,
            deploy: false,
        };
        assert_eq!(mv.landing(), Some(sq("c5")));
        mv.mode = MoveMode::StayCapture;
        assert_eq!(mv.landing(), Some(sq("c3")));
        mv.mode = MoveMode::SuicideCapture;
        assert_eq!(mv.landing(), None);
    }

    #[test]
    fn test_mode_markers() {
        assert_eq!(MoveMode::Normal.marker(), "");
        assert_eq!(MoveMode::Recombine.marker(), MoveMode::Combine.marker());
        assert!(MoveMode::SuicideCapture.is_capture());
        assert!(!MoveMode::Combine.is_capture());
        assert!(!MoveMode::StayCapture.relocates());
    }

    #[test]
    fn test_move_serializes_codes() {
        let mut navy = Piece::new(PieceType::Navy, Side::Red);
        navy.carrying.push(crate::piece::Unit::new(PieceType::AirForce, Side::Red));
        let mv = Move {
            from: sq("b2"),
            to: sq("b5"),
            piece: navy,
            captured: Some(Piece::new(PieceType::Navy, Side::Blue)),
            mode: MoveMode::Capture,
            deploy: false,
        };
        let json = serde_json::to_value(&mv).unwrap();
        assert_eq!(json["from"], "b2");
        assert_eq!(json["piece"], "N(F)");
        assert_eq!(json["captured"], "n");
        assert_eq!(json["mode"], "capture");
        assert_eq!(json["deploy"], false);
    }
}
