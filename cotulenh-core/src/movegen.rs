//! Pseudo-legal move generation and attack detection.
//!
//! Every ray is walked by [`scan`], which is shared by move generation and by
//! the attack test used for commander safety, so the two can never disagree.
//!
//! Per destination square:
//! - empty and terrain-compatible: normal move
//! - enemy: capture, or stay-capture when the mover cannot stand there (or a
//!   heavy piece would cross the river off a bridge), or suicide-capture when an
//!   aerial mover is inside the enemy air-defense zone
//! - friendly: combine when the stacking table accepts the merge

use crate::air_defense::AirDefense;
use crate::board::Board;
use crate::moves::{Move, MoveMode};
use crate::movement::{capture_range_against, MoveRules, UNLIMITED};
use crate::piece::{Piece, PieceType, Side, Unit};
use crate::square::{Square, DIRECTIONS};
use crate::stack;

/// Board plus the zone data the generator consults.
#[derive(Clone, Copy)]
pub struct MoveContext<'a> {
    pub board: &'a Board,
    pub zones: &'a AirDefense,
}

impl<'a> MoveContext<'a> {
    pub fn new(board: &'a Board, zones: &'a AirDefense) -> Self {
        MoveContext { board, zones }
    }

    /// Moves of the piece on `from`: the whole piece, plus one deploy move set per
    /// unit when the piece is a stack.
    pub fn piece_moves(&self, from: Square, out: &mut Vec<Move>) {
        let Some(piece) = self.board.get(from) else {
            return;
        };
        self.moves_for(from, piece, false, out);
        if piece.is_stack() {
            for unit in piece.units() {
                self.deploy_moves(from, piece, unit, out);
            }
        }
    }

    /// Deploy moves of one unit out of the stack on `from`.
    ///
    /// Nothing is generated when the units left behind could not form a stack.
    pub fn deploy_moves(&self, from: Square, stack_piece: &Piece, unit: Unit, out: &mut Vec<Move>) {
        if can_split(stack_piece, unit) {
            self.moves_for(from, &Piece::from_unit(unit), true, out);
        }
    }

    /// Pseudo-legal moves for all pieces of `side`.
    pub fn side_moves(&self, side: Side) -> Vec<Move> {
        let mut out = Vec::with_capacity(128);
        for (sq, _) in self.board.pieces_of(side) {
            self.piece_moves(sq, &mut out);
        }
        out
    }

    /// Moves of `mover` (a unit or stack) standing on `from`, using its carrier's rules.
    pub fn moves_for(&self, from: Square, mover: &Piece, deploy: bool, out: &mut Vec<Move>) {
        for dir in DIRECTIONS {
            self.scan(from, mover, dir, &mut |to, mode| {
                let captured = if mode.is_capture() { self.board.get(to).cloned() } else { None };
                out.push(Move { from, to, piece: mover.clone(), captured, mode, deploy });
            });
        }
    }

    /// Walk one ray from `from`, reporting every reachable destination and its mode.
    fn scan(&self, from: Square, mover: &Piece, dir: (i8, i8), emit: &mut impl FnMut(Square, MoveMode)) {
        let carrier = mover.carrier();
        let rules = MoveRules::for_unit(carrier);
        let diagonal = dir.0 != 0 && dir.1 != 0;
        let (move_range, capture_range) = rules.ranges(diagonal);
        let flying = carrier.kind == PieceType::Commander && !mover.is_stack() && !diagonal;
        let limit = if flying { UNLIMITED } else { move_range.max(capture_range) };
        let enemy = mover.side.opponent();
        let aerial = carrier.kind == PieceType::AirForce;

        let mut move_blocked = false;
        let mut capture_blocked = false;
        let mut seen_piece = false;
        let mut sq = from;
        for step in 1..=limit {
            sq = match sq.offset(dir.0, dir.1) {
                Some(next) => next,
                None => break,
            };
            let defended = aerial && self.zones.covers(enemy, sq);
            let stranded = carrier.kind.is_heavy() && !river_crossing_allowed(from, sq);
            let fits = Board::terrain_allows(mover, sq);

            match self.board.get(sq) {
                None => {
                    if !move_blocked && step <= move_range && fits && !stranded && !defended {
                        emit(sq, MoveMode::Normal);
                    }
                }
                Some(target) if target.side == enemy => {
                    let range = capture_range_against(carrier.kind, capture_range, target.kind);
                    let in_range = !capture_blocked && step <= range;
                    let commander_duel =
                        flying && !seen_piece && target.contains(PieceType::Commander);
                    if in_range || commander_duel {
                        if defended {
                            emit(sq, MoveMode::SuicideCapture);
                        } else if !fits || stranded {
                            emit(sq, MoveMode::StayCapture);
                        } else {
                            emit(sq, MoveMode::Capture);
                            if aerial {
                                emit(sq, MoveMode::StayCapture);
                            }
                        }
                    }
                }
                Some(target) => {
                    if !move_blocked && step <= move_range && !stranded && !defended {
                        if let Some(merged) = stack::merge(target, mover) {
                            if Board::terrain_allows(&merged, sq) {
                                emit(sq, MoveMode::Combine);
                            }
                        }
                    }
                }
            }

            if defended {
                break;
            }
            if self.board.get(sq).is_some() {
                seen_piece = true;
                move_blocked |= !rules.move_through;
                capture_blocked |= !rules.capture_through;
            }
            if move_blocked && capture_blocked {
                break;
            }
        }
    }

    /// Check whether `unit` standing on `from` can capture on `target`.
    pub fn attacks(&self, from: Square, unit: Unit, target: Square) -> bool {
        let df = target.file() as i8 - from.file() as i8;
        let dr = target.rank() as i8 - from.rank() as i8;
        if from == target || !(df == 0 || dr == 0 || df.abs() == dr.abs()) {
            return false;
        }
        let mut hit = false;
        self.scan(from, &Piece::from_unit(unit), (df.signum(), dr.signum()), &mut |to, mode| {
            hit |= to == target && mode.is_capture();
        });
        hit
    }

    /// Check whether any unit of `by` can capture on `target`.
    ///
    /// A carried unit only counts when it could deploy out of its stack, the
    /// same condition move generation applies.
    pub fn is_attacked(&self, target: Square, by: Side) -> bool {
        self.board.pieces_of(by).any(|(sq, piece)| {
            let carrier = piece.carrier();
            piece.units().any(|unit| {
                (unit == carrier || can_split(piece, unit)) && self.attacks(sq, unit, target)
            })
        })
    }

    /// Both commanders on one file or rank with nothing between them.
    pub fn commanders_exposed(&self) -> bool {
        match (self.board.commander(Side::Red), self.board.commander(Side::Blue)) {
            (Some(red), Some(blue)) => {
                (red.file() == blue.file() || red.rank() == blue.rank())
                    && self.board.line_is_clear(red, blue)
            }
            _ => false,
        }
    }

    /// The side's commander is neither attacked nor exposed. A side without a
    /// commander has already lost and counts as safe here.
    pub fn commander_safe(&self, side: Side) -> bool {
        match self.board.commander(side) {
            Some(sq) => !self.commanders_exposed() && !self.is_attacked(sq, side.opponent()),
            None => true,
        }
    }
}

/// `unit` may leave `stack_piece` when the units left behind still form a piece.
fn can_split(stack_piece: &Piece, unit: Unit) -> bool {
    let rest = stack_piece.units_without(&Piece::from_unit(unit));
    rest.is_empty() || stack::form_stack(&rest).is_some()
}

/// Heavy pieces may change banks only by a vertical move along a bridge file.
pub fn river_crossing_allowed(from: Square, to: Square) -> bool {
    from.bank() == to.bank() || (from.file() == to.file() && from.is_bridge_file())
}
