//! Reversible mutations.
//!
//! Every change to a [`Position`] is recorded as an [`Action`] holding the
//! complete prior state it replaced. Reverting a list of actions in reverse
//! order restores the position exactly, commander cache and zones included.
//!
//! ```text
//! Put   { square, prior, next }   square contents before and after
//! Zones { prior }                 air-defense zones before recomputation
//! Turn  { turn, halfmoves, fullmoves }   counters before the turn switched
//! ```

use crate::air_defense::AirDefense;
use crate::board::Board;
use crate::error::GameError;
use crate::movegen::MoveContext;
use crate::moves::{Move, MoveMode};
use crate::piece::{Piece, Side};
use crate::square::Square;
use crate::stack;

/// One recorded mutation.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Action {
    Put {
        square: Square,
        prior: Option<Piece>,
        next: Option<Piece>,
    },
    Zones {
        prior: AirDefense,
    },
    Turn {
        turn: Side,
        halfmoves: u32,
        fullmoves: u32,
    },
}

/// A move together with the actions it produced.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct LogEntry {
    pub mv: Move,
    pub actions: Vec<Action>,
}

/// Entries applied during the current turn that are not yet part of history.
#[derive(Clone, Default, Debug)]
pub struct CommandLog {
    entries: Vec<LogEntry>,
}

impl CommandLog {
    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    pub fn pop(&mut self) -> Option<LogEntry> {
        self.entries.pop()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drain every pending entry, oldest first.
    pub fn take(&mut self) -> Vec<LogEntry> {
        std::mem::take(&mut self.entries)
    }
}

/// Board, zones, turn and counters: the state that actions mutate.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Position {
    pub board: Board,
    pub zones: AirDefense,
    pub turn: Side,
    pub halfmoves: u32,
    pub fullmoves: u32,
}

impl Position {
    pub fn new(board: Board, turn: Side, halfmoves: u32, fullmoves: u32) -> Position {
        let zones = AirDefense::compute(&board);
        Position { board, zones, turn, halfmoves, fullmoves }
    }

    #[inline]
    pub fn ctx(&self) -> MoveContext<'_> {
        MoveContext::new(&self.board, &self.zones)
    }

    fn put(&mut self, square: Square, next: Option<Piece>, log: &mut Vec<Action>) {
        let prior = self.board.set(square, next.clone());
        log.push(Action::Put { square, prior, next });
    }

    fn refresh_zones(&mut self, log: &mut Vec<Action>) {
        let fresh = AirDefense::compute(&self.board);
        if fresh != self.zones {
            log.push(Action::Zones { prior: self.zones });
            self.zones = fresh;
        }
    }

    /// Apply a generated move to the board. Turn and counters are untouched.
    ///
    /// Afterwards every moved unit whose attack now reaches the enemy commander
    /// is promoted to heroic.
    pub fn make(&mut self, mv: &Move) -> Vec<Action> {
        let mut log = Vec::with_capacity(6);
        let remainder = if mv.deploy {
            self.board.get(mv.from).and_then(|origin| stack::form_stack(&origin.units_without(&mv.piece)))
        } else {
            None
        };

        match mv.mode {
            MoveMode::Normal | MoveMode::Capture => {
                self.put(mv.from, remainder, &mut log);
                self.put(mv.to, Some(mv.piece.clone()), &mut log);
            }
            MoveMode::StayCapture => {
                self.put(mv.to, None, &mut log);
            }
            MoveMode::SuicideCapture => {
                self.put(mv.from, remainder, &mut log);
                self.put(mv.to, None, &mut log);
            }
            MoveMode::Combine | MoveMode::Recombine => {
                let merged = self
                    .board
                    .get(mv.to)
                    .and_then(|target| stack::merge(target, &mv.piece))
                    .unwrap_or_else(|| {
                        panic!("{}", GameError::InvariantViolation(format!("cannot merge onto {}", mv.to)))
                    });
                self.put(mv.from, remainder, &mut log);
                self.put(mv.to, Some(merged), &mut log);
            }
        }

        let defends = |p: &Piece| p.units().any(|u| u.air_defense_level() > 0);
        if defends(&mv.piece) || mv.captured.as_ref().is_some_and(defends) {
            self.refresh_zones(&mut log);
        }

        if let Some(landing) = mv.landing() {
            self.promote(mv, landing, &mut log);
        }
        log
    }

    fn promote(&mut self, mv: &Move, landing: Square, log: &mut Vec<Action>) {
        let Some(target) = self.board.commander(mv.piece.side.opponent()) else {
            return;
        };
        let mut promoted_defender = false;
        for moved in mv.piece.units() {
            let Some(here) = self.board.get(landing) else {
                return;
            };
            let Some(unit) = here.unit(moved.kind) else {
                continue;
            };
            if unit.heroic || !self.ctx().attacks(landing, unit, target) {
                continue;
            }
            let next = here.with_heroic(unit.kind);
            promoted_defender |= unit.air_defense_level() > 0;
            self.put(landing, Some(next), log);
        }
        if promoted_defender {
            self.refresh_zones(log);
        }
    }

    /// Hand the turn to the other side and advance the counters.
    pub fn advance_turn(&mut self, capture: bool, log: &mut Vec<Action>) {
        log.push(Action::Turn {
            turn: self.turn,
            halfmoves: self.halfmoves,
            fullmoves: self.fullmoves,
        });
        self.halfmoves = if capture { 0 } else { self.halfmoves.saturating_add(1) };
        if self.turn == Side::Blue {
            self.fullmoves = self.fullmoves.saturating_add(1);
        }
        self.turn = self.turn.opponent();
    }

    /// Undo a list of actions, newest first.
    ///
    /// # Panics
    ///
    /// Panics when a square no longer holds what the action left there: the log
    /// and the board have diverged, which is a logic defect.
    pub fn revert(&mut self, actions: &[Action]) {
        for action in actions.iter().rev() {
            match action {
                Action::Put { square, prior, next } => {
                    if self.board.get(*square) != next.as_ref() {
                        panic!(
                            "{}",
                            GameError::InvariantViolation(format!(
                                "undo mismatch on {square}: expected {:?}, found {:?}",
                                next.as_ref().map(Piece::fen_code),
                                self.board.get(*square).map(Piece::fen_code),
                            ))
                        );
                    }
                    self.board.set(*square, prior.clone());
                }
                Action::Zones { prior } => self.zones = *prior,
                Action::Turn { turn, halfmoves, fullmoves } => {
                    self.turn = *turn;
                    self.halfmoves = *halfmoves;
                    self.fullmoves = *fullmoves;
                }
            }
        }
    }
}
