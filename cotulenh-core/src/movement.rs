//! Per-type movement and capture ranges.

use crate::piece::{PieceType, Unit};

/// Range used for "unlimited" sliders; longer than any line on the board.
pub const UNLIMITED: u8 = 12;

/// Movement profile of a single unit.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MoveRules {
    pub move_orth: u8,
    pub move_diag: u8,
    pub capture_orth: u8,
    pub capture_diag: u8,
    /// Pieces in the way do not stop movement.
    pub move_through: bool,
    /// Pieces in the way do not stop captures.
    pub capture_through: bool,
}

impl MoveRules {
    const fn new(move_orth: u8, move_diag: u8, capture_orth: u8, capture_diag: u8) -> Self {
        MoveRules {
            move_orth,
            move_diag,
            capture_orth,
            capture_diag,
            move_through: false,
            capture_through: false,
        }
    }

    const fn capture_through(mut self) -> Self {
        self.capture_through = true;
        self
    }

    const fn move_through(mut self) -> Self {
        self.move_through = true;
        self
    }

    /// Base table for a piece type.
    pub const fn base(kind: PieceType) -> MoveRules {
        match kind {
            PieceType::Commander => MoveRules::new(UNLIMITED, 0, 1, 0),
            PieceType::Infantry | PieceType::Engineer | PieceType::AntiAir => {
                MoveRules::new(1, 0, 1, 0)
            }
            PieceType::Militia => MoveRules::new(1, 1, 1, 1),
            PieceType::Tank => MoveRules::new(2, 0, 2, 0).capture_through(),
            PieceType::Artillery => MoveRules::new(3, 3, 3, 3).capture_through(),
            PieceType::Missile => MoveRules::new(2, 1, 2, 1).capture_through(),
            PieceType::AirForce => MoveRules::new(4, 4, 4, 4).capture_through().move_through(),
            PieceType::Navy => MoveRules::new(4, 4, 4, 4).capture_through(),
            PieceType::Headquarter => MoveRules::new(0, 0, 0, 0),
        }
    }

    /// Rules for a unit, applying the heroic bonus.
    pub const fn for_unit(unit: Unit) -> MoveRules {
        let base = MoveRules::base(unit.kind);
        if unit.heroic {
            base.promoted()
        } else {
            base
        }
    }

    /// Heroic table: every range grows by one and diagonal movement opens up.
    pub const fn promoted(self) -> MoveRules {
        let move_orth = bump(self.move_orth);
        let capture_orth = bump(self.capture_orth);
        MoveRules {
            move_orth,
            move_diag: if self.move_diag == 0 { move_orth } else { bump(self.move_diag) },
            capture_orth,
            capture_diag: if self.capture_diag == 0 { capture_orth } else { bump(self.capture_diag) },
            ..self
        }
    }

    /// (move range, capture range) along an orthogonal or diagonal ray.
    #[inline]
    pub const fn ranges(&self, diagonal: bool) -> (u8, u8) {
        if diagonal {
            (self.move_diag, self.capture_diag)
        } else {
            (self.move_orth, self.capture_orth)
        }
    }
}

const fn bump(range: u8) -> u8 {
    if range >= UNLIMITED {
        UNLIMITED
    } else {
        range + 1
    }
}

/// Capture range of `attacker` against a target whose carrier is `target`.
///
/// Navy fires one square shorter at anything that is not a ship.
pub const fn capture_range_against(attacker: PieceType, range: u8, target: PieceType) -> u8 {
    match (attacker, target) {
        (PieceType::Navy, PieceType::Navy) => range,
        (PieceType::Navy, _) => range.saturating_sub(1),
        _ => range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Side;

    #[test]
    fn test_base_tables() {
        let tank = MoveRules::base(PieceType::Tank);
        assert_eq!(tank.ranges(false), (2, 2));
        assert_eq!(tank.ranges(true), (0, 0));
        assert!(tank.capture_through);
        assert!(!tank.move_through);

        let air = MoveRules::base(PieceType::AirForce);
        assert!(air.move_through && air.capture_through);
    }

    #[test]
    fn test_heroic_opens_diagonals() {
        let inf = MoveRules::for_unit(Unit::new(PieceType::Infantry, Side::Red).heroic());
        assert_eq!(inf.ranges(false), (2, 2));
        assert_eq!(inf.ranges(true), (2, 2));
    }

    #[test]
    fn test_heroic_headquarter_can_move() {
        let hq = MoveRules::base(PieceType::Headquarter);
        assert_eq!(hq.ranges(false), (0, 0));
        let hero = hq.promoted();
        assert_eq!(hero.ranges(false), (1, 1));
        assert_eq!(hero.ranges(true), (1, 1));
    }

    #[test]
    fn test_heroic_commander_keeps_unlimited_slide() {
        let hero = MoveRules::base(PieceType::Commander).promoted();
        assert_eq!(hero.ranges(false), (UNLIMITED, 2));
        assert_eq!(hero.ranges(true), (UNLIMITED, 2));
    }

    #[test]
    fn test_heroic_missile() {
        let hero = MoveRules::base(PieceType::Missile).promoted();
        assert_eq!(hero.ranges(false), (3, 3));
        assert_eq!(hero.ranges(true), (2, 2));
    }

    #[test]
    fn test_navy_range_against_land() {
        assert_eq!(capture_range_against(PieceType::Navy, 4, PieceType::Navy), 4);
        assert_eq!(capture_range_against(PieceType::Navy, 4, PieceType::Tank), 3);
        assert_eq!(capture_range_against(PieceType::Tank, 2, PieceType::Navy), 2);
    }
}
