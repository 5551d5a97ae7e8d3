//! Stacking: which carriers may carry which pieces, and the merge algorithm.
//!
//! ```text
//! Carrier       Slots (one piece per slot)
//! Navy          [air force] [tank] [commander | infantry | militia]
//! Air force     [tank] [commander | infantry | militia]
//! Tank          [commander | infantry | militia]
//! Engineer      [artillery | anti-air | missile]
//! Headquarter   [commander]
//! ```
//!
//! Carriers are tried in table order, so the result of a merge does not depend
//! on the order the pieces were supplied in.

use arrayvec::ArrayVec;

use crate::piece::{Piece, PieceType, Unit, MAX_STACK};

use PieceType::*;

const FOOT: &[PieceType] = &[Commander, Infantry, Militia];

const CARRIERS: [(PieceType, &[&[PieceType]]); 5] = [
    (Navy, &[&[AirForce], &[Tank], FOOT]),
    (AirForce, &[&[Tank], FOOT]),
    (Tank, &[FOOT]),
    (Engineer, &[&[Artillery, AntiAir, Missile]]),
    (Headquarter, &[&[Commander]]),
];

fn slots_of(carrier: PieceType) -> Option<&'static [&'static [PieceType]]> {
    CARRIERS.iter().find(|(kind, _)| *kind == carrier).map(|(_, slots)| *slots)
}

/// Check whether `carrier` has any slot for `carried`.
pub fn can_carry(carrier: PieceType, carried: PieceType) -> bool {
    slots_of(carrier).is_some_and(|slots| slots.iter().any(|slot| slot.contains(&carried)))
}

/// Merge a set of units into one piece.
///
/// Returns `None` when the units belong to different sides, exceed the maximum
/// stack size, or no carrier in the table can hold all the others.
pub fn form_stack(units: &[Unit]) -> Option<Piece> {
    let first = *units.first()?;
    if units.len() == 1 {
        return Some(Piece::from_unit(first));
    }
    if units.len() > MAX_STACK || units.iter().any(|u| u.side != first.side) {
        return None;
    }

    for (carrier_kind, slots) in CARRIERS.iter() {
        let Some(carrier_idx) = units.iter().position(|u| u.kind == *carrier_kind) else {
            continue;
        };
        let rest: ArrayVec<Unit, MAX_STACK> = units
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != carrier_idx)
            .map(|(_, u)| *u)
            .collect();
        if rest.len() > slots.len() {
            continue;
        }
        let mut assignment: [Option<Unit>; MAX_STACK] = [None; MAX_STACK];
        if assign(&rest, slots, &mut assignment) {
            let mut piece = Piece::from_unit(units[carrier_idx]);
            piece.carrying.extend(assignment.iter().take(slots.len()).flatten().copied());
            return Some(piece);
        }
    }
    None
}

/// Backtracking slot assignment; slot `i` of `assignment` receives at most one unit.
fn assign(units: &[Unit], slots: &[&[PieceType]], assignment: &mut [Option<Unit>]) -> bool {
    let Some((unit, rest)) = units.split_first() else {
        return true;
    };
    for (i, slot) in slots.iter().enumerate() {
        if assignment[i].is_none() && slot.contains(&unit.kind) {
            assignment[i] = Some(*unit);
            if assign(rest, slots, assignment) {
                return true;
            }
            assignment[i] = None;
        }
    }
    false
}

/// Merge two pieces (a mover joining a stationary piece).
pub fn merge(stationary: &Piece, mover: &Piece) -> Option<Piece> {
    let units: ArrayVec<Unit, { MAX_STACK * 2 }> =
        stationary.units().chain(mover.units()).collect();
    if units.len() > MAX_STACK {
        return None;
    }
    form_stack(&units)
}

/// Re-form a piece from its own units, giving the canonical carrier and order.
pub fn canonicalize(piece: &Piece) -> Option<Piece> {
    let units: ArrayVec<Unit, MAX_STACK> = piece.units().collect();
    form_stack(&units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Side;

    fn red(kind: PieceType) -> Unit {
        Unit::new(kind, Side::Red)
    }

    #[test]
    fn test_can_carry() {
        assert!(can_carry(Navy, AirForce));
        assert!(can_carry(Navy, Infantry));
        assert!(can_carry(Tank, Commander));
        assert!(can_carry(Engineer, Missile));
        assert!(!can_carry(Tank, Artillery));
        assert!(!can_carry(Infantry, Tank));
    }

    #[test]
    fn test_single_unit_is_trivial_stack() {
        let piece = form_stack(&[red(Artillery)]).unwrap();
        assert!(!piece.is_stack());
    }

    #[test]
    fn test_carrier_chosen_regardless_of_order() {
        let a = form_stack(&[red(Infantry), red(Tank)]).unwrap();
        let b = form_stack(&[red(Tank), red(Infantry)]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.kind, Tank);
        assert_eq!(a.fen_code(), "T(I)");
    }

    #[test]
    fn test_navy_full_stack_order() {
        let piece = form_stack(&[red(Infantry), red(Tank), red(AirForce), red(Navy)]).unwrap();
        assert_eq!(piece.fen_code(), "N(FTI)");
    }

    #[test]
    fn test_air_force_prefers_to_carry_tank() {
        let piece = form_stack(&[red(Tank), red(AirForce), red(Militia)]).unwrap();
        assert_eq!(piece.fen_code(), "F(TM)");
    }

    #[test]
    fn test_rejects_mixed_sides() {
        let blue_inf = Unit::new(Infantry, Side::Blue);
        assert!(form_stack(&[red(Tank), blue_inf]).is_none());
    }

    #[test]
    fn test_rejects_slot_conflict() {
        assert!(form_stack(&[red(Tank), red(Infantry), red(Militia)]).is_none());
        assert!(form_stack(&[red(Artillery), red(Infantry)]).is_none());
    }

    #[test]
    fn test_merge_keeps_heroic_flags() {
        let tank = Piece::from_unit(red(Tank).heroic());
        let inf = Piece::new(Infantry, Side::Red);
        let merged = merge(&inf, &tank).unwrap();
        assert_eq!(merged.fen_code(), "+T(I)");
    }

    #[test]
    fn test_merge_too_large() {
        let navy = form_stack(&[red(Navy), red(AirForce), red(Tank), red(Infantry)]).unwrap();
        assert!(merge(&navy, &Piece::new(Militia, Side::Red)).is_none());
    }

    #[test]
    fn test_canonicalize_reorders() {
        let mut piece = Piece::new(Navy, Side::Red);
        piece.carrying.push(red(Infantry));
        piece.carrying.push(red(AirForce));
        assert_eq!(canonicalize(&piece).unwrap().fen_code(), "N(FI)");
    }
}
