//! The game: position, pending deploy session, history and the legal-move filter.

use serde::Serialize;
use tracing::{debug, trace};

use crate::action::{Action, CommandLog, LogEntry, Position};
use crate::board::Board;
use crate::deploy::{DeploySession, DeployView};
use crate::error::{GameError, Result};
use crate::fen::{self, DEFAULT_POSITION};
use crate::moves::{Move, MoveMode};
use crate::notation::{format_move, MoveText};
use crate::piece::{Piece, PieceType, Side, Unit};
use crate::square::Square;
use crate::stack;

/// Restricts [`Game::moves`] to one origin square and/or one moving piece type.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct MoveFilter {
    pub square: Option<Square>,
    pub piece: Option<PieceType>,
}

impl MoveFilter {
    pub fn matches(&self, mv: &Move) -> bool {
        self.square.map_or(true, |sq| mv.from == sq)
            && self.piece.map_or(true, |kind| mv.piece.kind == kind)
    }
}

/// A legal move with its notation, as reported to callers.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct MoveView {
    pub san: String,
    #[serde(flatten)]
    pub mv: Move,
}

/// One completed turn: a single move, or every sub-move of a deploy session.
#[derive(Clone, Debug)]
pub struct TurnRecord {
    entries: Vec<LogEntry>,
    closing: Vec<Action>,
    notation: String,
    key: String,
}

impl TurnRecord {
    pub fn notation(&self) -> &str {
        &self.notation
    }

    pub fn moves(&self) -> impl Iterator<Item = &Move> + '_ {
        self.entries.iter().map(|e| &e.mv)
    }
}

/// Outcome of the position.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum GameStatus {
    InProgress,
    CommanderCaptured { winner: Side },
    Checkmate { winner: Side },
    Stalemate,
    FiftyMoves,
    Repetition,
}

impl GameStatus {
    pub fn is_over(self) -> bool {
        self != GameStatus::InProgress
    }

    pub fn winner(self) -> Option<Side> {
        match self {
            GameStatus::CommanderCaptured { winner } | GameStatus::Checkmate { winner } => Some(winner),
            _ => None,
        }
    }
}

/// A game of Co Tu Lenh.
///
/// Owns all of its state. Hosts running several games keep one `Game` per game.
#[derive(Clone, Debug)]
pub struct Game {
    pos: Position,
    log: CommandLog,
    session: Option<DeploySession>,
    history: Vec<TurnRecord>,
    start_key: String,
}

impl Game {
    /// New game from the standard start position.
    pub fn new() -> Game {
        Game::from_fen(DEFAULT_POSITION)
            .unwrap_or_else(|err| unreachable!("start position rejected: {err}"))
    }

    /// Load a position, including an open deploy session.
    ///
    /// A deploy suffix is loaded by rebuilding the board as it stood before the
    /// session and replaying the listed sub-moves, so the session can be undone
    /// or cancelled exactly as if it had been played here.
    pub fn from_fen(text: &str) -> Result<Game> {
        let parts = fen::parse(text)?;
        parts.board.validate_commanders()?;
        let skip = parts.deploy.as_ref().map(|d| d.origin);
        parts.board.validate_terrain(skip)?;

        let Some(deploy) = parts.deploy else {
            return Ok(Game::with_position(Position::new(
                parts.board,
                parts.turn,
                parts.halfmoves,
                parts.fullmoves,
            )));
        };

        if parts.board.get(deploy.origin) != deploy.remaining.as_ref() {
            return Err(GameError::malformed(format!(
                "deploy remainder does not match the board on {}",
                deploy.origin
            )));
        }
        let before = pre_session_board(&parts.board, parts.turn, &deploy)?;
        let mut game = Game::with_position(Position::new(
            before,
            parts.turn,
            parts.halfmoves,
            parts.fullmoves,
        ));
        for (notation, captured) in &deploy.moves {
            let replay = |err: GameError| GameError::malformed(format!("replaying {notation}: {err}"));
            let mv = game.parse_move(notation).map_err(replay)?;
            if !mv.deploy || mv.from != deploy.origin || mv.captured != *captured {
                return Err(GameError::malformed(format!("{notation} does not fit the deploy session")));
            }
            game.apply(&mv).map_err(replay)?;
        }
        if game.session.is_none() || game.pos.board != parts.board {
            return Err(GameError::malformed("deploy moves do not reproduce the board"));
        }
        Ok(game)
    }

    fn with_position(pos: Position) -> Game {
        let start_key = fen::position_key(&pos);
        Game {
            pos,
            log: CommandLog::default(),
            session: None,
            history: Vec::new(),
            start_key,
        }
    }

    /// Position text, with a deploy suffix while a session is open.
    pub fn fen(&self) -> String {
        fen::format(&self.pos, self.session.as_ref())
    }

    #[inline]
    pub fn turn(&self) -> Side {
        self.pos.turn
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.pos.board
    }

    #[inline]
    pub fn position(&self) -> &Position {
        &self.pos
    }

    pub fn halfmoves(&self) -> u32 {
        self.pos.halfmoves
    }

    pub fn fullmoves(&self) -> u32 {
        self.pos.fullmoves
    }

    pub fn deploy_session(&self) -> Option<&DeploySession> {
        self.session.as_ref()
    }

    pub fn deploy_view(&self) -> Option<DeployView> {
        self.session.as_ref().map(|s| s.view(&self.pos.board))
    }

    pub fn history(&self) -> &[TurnRecord] {
        &self.history
    }

    /// Generated moves before the commander-safety filter.
    fn pseudo_moves(&self) -> Vec<Move> {
        let ctx = self.pos.ctx();
        let Some(session) = &self.session else {
            return ctx.side_moves(self.pos.turn);
        };

        let mut out = Vec::new();
        let origin = session.origin();
        let Some(piece) = self.pos.board.get(origin) else {
            return out;
        };
        let pending: Vec<Unit> = piece.units().filter(|u| !session.has_acted(u.kind)).collect();
        if pending.len() == piece.len() {
            ctx.moves_for(origin, piece, true, &mut out);
        }
        if piece.is_stack() {
            for unit in pending {
                ctx.deploy_moves(origin, piece, unit, &mut out);
            }
        }
        for mv in out.iter_mut() {
            if mv.mode == MoveMode::Combine && session.is_deployed(mv.to) {
                mv.mode = MoveMode::Recombine;
            }
        }
        out
    }

    /// Every move the side to move may play, deploy sub-moves included.
    pub fn legal_moves(&self) -> Vec<Move> {
        let side = self.pos.turn;
        if self.pos.board.commander(side).is_none() || self.pos.board.commander(side.opponent()).is_none() {
            return Vec::new();
        }
        let mut scratch = self.pos.clone();
        self.pseudo_moves()
            .into_iter()
            .filter(|mv| {
                let actions = scratch.make(mv);
                let captured_commander = scratch.board.commander(side.opponent()).is_none();
                let safe = captured_commander || scratch.ctx().commander_safe(side);
                let stranded = self.strands_origin(&scratch.board, mv);
                scratch.revert(&actions);
                safe && !stranded
            })
            .collect()
    }

    /// A sub-move that closes the session must not leave the origin holding
    /// units that cannot stand on its terrain. `board` is the board after `mv`.
    fn strands_origin(&self, board: &Board, mv: &Move) -> bool {
        let Some(session) = &self.session else {
            return false;
        };
        let origin = session.origin();
        let Some(rest) = board.get(origin) else {
            return false;
        };
        let closes = rest.units().all(|u| session.has_acted(u.kind) || mv.piece.contains(u.kind));
        closes && !Board::terrain_allows(rest, origin)
    }

    pub fn moves(&self, filter: MoveFilter) -> Vec<Move> {
        self.legal_moves().into_iter().filter(|mv| filter.matches(mv)).collect()
    }

    /// Legal moves paired with their notation.
    pub fn move_views(&self, filter: MoveFilter) -> Vec<MoveView> {
        let legal = self.legal_moves();
        legal
            .iter()
            .filter(|mv| filter.matches(mv))
            .map(|mv| MoveView { san: format_move(mv, &legal), mv: mv.clone() })
            .collect()
    }

    /// Notation of a move in the current position.
    pub fn san(&self, mv: &Move) -> String {
        format_move(mv, &self.legal_moves())
    }

    /// Resolve notation text to the one legal move it names.
    ///
    /// While a deploy session is open, text naming anything other than a
    /// sub-move from the origin is a `SessionState` error.
    pub fn parse_move(&self, text: &str) -> Result<Move> {
        let parsed = MoveText::parse(text)?;
        if let Some(session) = &self.session {
            if !self.pseudo_moves().iter().any(|mv| parsed.matches(mv)) {
                return Err(GameError::session(format!(
                    "{parsed} is not a sub-move of the deploy session on {}",
                    session.origin()
                )));
            }
        }
        parsed.resolve(&self.legal_moves()).cloned()
    }

    /// Play a legal move. Nothing changes when the move is rejected.
    pub fn apply(&mut self, mv: &Move) -> Result<()> {
        if let Some(session) = &self.session {
            if !mv.deploy || mv.from != session.origin() {
                return Err(GameError::session(format!(
                    "deploy session on {} must be finished first",
                    session.origin()
                )));
            }
        }
        let status = self.status();
        if status.is_over() {
            return Err(GameError::illegal(format!("game is over: {status:?}")));
        }
        let legal = self.legal_moves();
        if !legal.contains(mv) {
            return Err(GameError::illegal(format!("{} is not legal here", format_move(mv, &legal))));
        }
        let notation = format_move(mv, &legal);
        self.play(mv.clone(), notation);
        Ok(())
    }

    /// Parse and play a move given in notation.
    pub fn apply_san(&mut self, text: &str) -> Result<Move> {
        let mv = self.parse_move(text)?;
        self.apply(&mv)?;
        Ok(mv)
    }

    fn play(&mut self, mv: Move, notation: String) {
        trace!(%notation, side = ?self.pos.turn, "apply move");
        if mv.deploy && self.session.is_none() {
            if let Some(stack) = self.pos.board.get(mv.from) {
                debug!(origin = %mv.from, stack = %stack, "deploy session started");
                self.session = Some(DeploySession::start(mv.from, stack.clone()));
            }
        }

        let actions = self.pos.make(&mv);
        let entry = LogEntry { mv: mv.clone(), actions };
        let Some(session) = self.session.as_mut() else {
            self.finish_turn(vec![entry], notation);
            return;
        };
        session.record(mv, notation);
        self.log.push(entry);
        if session.is_complete(&self.pos.board) {
            self.complete_session();
        }
    }

    fn complete_session(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        let notation = session.turn_notation(&self.pos.board);
        let entries = self.log.take();
        debug!(origin = %session.origin(), moves = entries.len(), %notation, "deploy session complete");
        self.finish_turn(entries, notation);
    }

    fn finish_turn(&mut self, entries: Vec<LogEntry>, notation: String) {
        let capture = entries.iter().any(|e| e.mv.is_capture());
        let mut closing = Vec::with_capacity(1);
        self.pos.advance_turn(capture, &mut closing);
        let key = fen::position_key(&self.pos);
        self.history.push(TurnRecord { entries, closing, notation, key });
    }

    /// End the open deploy session, leaving any unmoved units on the origin.
    pub fn commit_deploy(&mut self) -> Result<()> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| GameError::session("no deploy session to commit"))?;
        let origin = session.origin();
        if let Some(rest) = self.pos.board.get(origin) {
            if !Board::terrain_allows(rest, origin) {
                return Err(GameError::illegal(format!("{rest} cannot stay on {origin}")));
            }
        }
        debug!(%origin, "deploy session committed");
        self.complete_session();
        Ok(())
    }

    /// Undo every sub-move of the open deploy session.
    pub fn cancel_deploy(&mut self) -> Result<()> {
        let session = self
            .session
            .take()
            .ok_or_else(|| GameError::session("no deploy session to cancel"))?;
        for entry in self.log.take().iter().rev() {
            self.pos.revert(&entry.actions);
        }
        debug!(origin = %session.origin(), "deploy session cancelled");
        Ok(())
    }

    /// Take back the latest sub-move of an open session, or else the latest
    /// completed turn. Returns the notation of what was undone.
    pub fn undo(&mut self) -> Option<String> {
        if let Some(session) = self.session.as_mut() {
            let entry = self.log.pop()?;
            self.pos.revert(&entry.actions);
            let notation = session.notations().last().cloned();
            session.pop();
            if session.is_empty() {
                self.session = None;
            }
            debug!(?notation, "undo deploy sub-move");
            return notation;
        }
        let record = self.history.pop()?;
        self.pos.revert(&record.closing);
        for entry in record.entries.iter().rev() {
            self.pos.revert(&entry.actions);
        }
        debug!(notation = %record.notation, "undo turn");
        Some(record.notation)
    }

    /// The side to move has its commander under attack or exposed.
    pub fn is_check(&self) -> bool {
        let side = self.pos.turn;
        match self.pos.board.commander(side) {
            Some(sq) => {
                let ctx = self.pos.ctx();
                ctx.is_attacked(sq, side.opponent()) || ctx.commanders_exposed()
            }
            None => false,
        }
    }

    pub fn is_checkmate(&self) -> bool {
        self.session.is_none() && self.is_check() && self.legal_moves().is_empty()
    }

    fn repetitions(&self) -> usize {
        let current = fen::position_key(&self.pos);
        let earlier = self.history.iter().filter(|r| r.key == current).count();
        earlier + usize::from(self.start_key == current)
    }

    pub fn status(&self) -> GameStatus {
        for side in [self.pos.turn, self.pos.turn.opponent()] {
            if self.pos.board.commander(side).is_none() {
                return GameStatus::CommanderCaptured { winner: side.opponent() };
            }
        }
        if self.session.is_some() {
            return GameStatus::InProgress;
        }
        if self.legal_moves().is_empty() {
            return if self.is_check() {
                GameStatus::Checkmate { winner: self.pos.turn.opponent() }
            } else {
                GameStatus::Stalemate
            };
        }
        if self.pos.halfmoves >= 100 {
            return GameStatus::FiftyMoves;
        }
        if self.repetitions() >= 3 {
            return GameStatus::Repetition;
        }
        GameStatus::InProgress
    }

    pub fn is_game_over(&self) -> bool {
        self.status().is_over()
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

/// Rebuild the board as it stood before the listed deploy sub-moves.
///
/// The first sub-move reaching a square tells what stood there: nothing for a
/// plain move, the bracketed piece for a capture, and for a combine whatever is
/// there now minus the units that arrived during the session.
fn pre_session_board(board: &Board, side: Side, deploy: &fen::DeployText) -> Result<Board> {
    let parsed: Vec<(MoveText, Piece)> = deploy
        .moves
        .iter()
        .map(|(notation, _)| {
            let text = MoveText::parse(notation)?;
            let piece = text.piece_for(side);
            Ok((text, piece))
        })
        .collect::<Result<_>>()?;

    let mut units: Vec<Unit> = Vec::new();
    let moved = parsed.iter().flat_map(|(_, piece)| piece.units());
    for unit in moved.chain(deploy.remaining.iter().flat_map(|p| p.units())) {
        if !units.iter().any(|u| u.kind == unit.kind) {
            units.push(unit);
        }
    }
    let stack = stack::form_stack(&units)
        .ok_or_else(|| GameError::malformed("deploy units do not form a stack"))?;

    let mut before = board.clone();
    let mut touched: Vec<Square> = Vec::new();
    for ((text, _), (_, captured)) in parsed.iter().zip(&deploy.moves) {
        let to = text.to();
        if to == deploy.origin {
            return Err(GameError::malformed("deploy move returns to its origin"));
        }
        if touched.contains(&to) {
            continue;
        }
        touched.push(to);
        let prior = match text.marker() {
            "" => None,
            "&" => {
                let arrived: Vec<PieceType> = parsed
                    .iter()
                    .filter(|(t, _)| t.to() == to && matches!(t.marker(), "" | "x" | "&"))
                    .flat_map(|(_, piece)| piece.units().map(|u| u.kind).collect::<Vec<_>>())
                    .collect();
                let rest: Vec<Unit> = board
                    .get(to)
                    .map(|p| p.units().filter(|u| !arrived.contains(&u.kind)).collect())
                    .unwrap_or_default();
                Some(
                    stack::form_stack(&rest)
                        .ok_or_else(|| GameError::malformed(format!("nothing to combine with on {to}")))?,
                )
            }
            _ => Some(captured.clone().ok_or_else(|| {
                GameError::malformed(format!("capture on {to} does not name the captured piece"))
            })?),
        };
        before.set(to, prior);
    }
    before.set(deploy.origin, Some(stack));
    Ok(before)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    const TANK_STACK: &str = "3c7/11/11/11/11/11/11/5T(I)5/11/11/11/10C r - - 0 1";

    #[test]
    fn test_new_game() {
        let game = Game::new();
        assert_eq!(game.fen(), DEFAULT_POSITION);
        assert_eq!(game.turn(), Side::Red);
        assert!(!game.is_check());
        assert!(!game.legal_moves().is_empty());
        assert!(game.legal_moves().iter().all(|m| m.piece.side == Side::Red));
        assert_eq!(game.status(), GameStatus::InProgress);
    }

    #[test]
    fn test_apply_and_undo() {
        let mut game = Game::new();
        let err = game.apply_san("Ic7").unwrap_err();
        assert!(matches!(err, GameError::IllegalMove(_)));

        game.apply_san("I&c4").unwrap();
        assert_eq!(game.turn(), Side::Blue);
        assert_eq!(game.board().get(sq("c4")).map(Piece::fen_code), Some("N(I)".to_string()));
        assert_eq!(game.history().len(), 1);
        assert_eq!(game.history()[0].notation(), "I&c4");
        assert_eq!(game.halfmoves(), 1);

        assert_eq!(game.undo().as_deref(), Some("I&c4"));
        assert_eq!(game.fen(), DEFAULT_POSITION);
        assert_eq!(game.undo(), None);
    }

    #[test]
    fn test_deploy_session_flow() {
        let mut game = Game::from_fen(TANK_STACK).unwrap();
        game.apply_san("T>f7").unwrap();
        assert_eq!(game.turn(), Side::Red);
        let session = game.deploy_session().unwrap();
        assert_eq!(session.origin(), sq("f5"));
        assert_eq!(
            game.fen(),
            "3c7/11/11/11/11/5T5/11/5I5/11/11/11/10C r - - 0 1 DEPLOY f5:I:T>f7..."
        );

        let err = game.apply_san("Ck2").unwrap_err();
        assert!(matches!(err, GameError::SessionState(_)));

        game.apply_san("I>f6").unwrap();
        assert!(game.deploy_session().is_none());
        assert_eq!(game.turn(), Side::Blue);
        assert_eq!(game.history().last().unwrap().notation(), "f5:T>f7,I>f6");
        assert_eq!(game.fullmoves(), 1);
    }

    #[test]
    fn test_non_origin_move_during_session() {
        let mut game = Game::from_fen(TANK_STACK).unwrap();
        game.apply_san("T>f7").unwrap();
        let commander_move = Move {
            from: sq("k1"),
            to: sq("k2"),
            piece: Piece::new(PieceType::Commander, Side::Red),
            captured: None,
            mode: MoveMode::Normal,
            deploy: false,
        };
        let err = game.apply(&commander_move).unwrap_err();
        assert!(matches!(err, GameError::SessionState(_)));
    }

    #[test]
    fn test_commit_and_cancel_need_session() {
        let mut game = Game::from_fen(TANK_STACK).unwrap();
        assert!(matches!(game.commit_deploy(), Err(GameError::SessionState(_))));
        assert!(matches!(game.cancel_deploy(), Err(GameError::SessionState(_))));
    }

    #[test]
    fn test_commit_leaves_remainder() {
        let mut game = Game::from_fen(TANK_STACK).unwrap();
        game.apply_san("T>f7").unwrap();
        game.commit_deploy().unwrap();
        assert_eq!(game.turn(), Side::Blue);
        assert_eq!(game.history().last().unwrap().notation(), "f5:I<T>f7");
        assert_eq!(game.board().get(sq("f5")).map(Piece::fen_code), Some("I".to_string()));
    }

    #[test]
    fn test_commit_rejects_stranded_remainder() {
        let mut game =
            Game::from_fen("3c7/11/11/11/11/11/11/1N(T)9/11/11/11/10C r - - 0 1").unwrap();
        game.apply_san("N>b7").unwrap();
        let before = game.fen();
        assert!(matches!(game.commit_deploy(), Err(GameError::IllegalMove(_))));
        assert_eq!(game.fen(), before);
        game.cancel_deploy().unwrap();
        assert_eq!(game.fen(), "3c7/11/11/11/11/11/11/1N(T)9/11/11/11/10C r - - 0 1");
    }

    #[test]
    fn test_undo_pops_sub_moves() {
        let mut game = Game::from_fen(TANK_STACK).unwrap();
        game.apply_san("T>f7").unwrap();
        assert_eq!(game.undo().as_deref(), Some("T>f7"));
        assert!(game.deploy_session().is_none());
        assert_eq!(game.fen(), TANK_STACK);
    }

    #[test]
    fn test_load_open_session() {
        let text = "3c7/11/11/11/11/5T5/11/5I5/11/11/11/10C r - - 0 1 DEPLOY f5:I:T>f7...";
        let mut game = Game::from_fen(text).unwrap();
        assert_eq!(game.fen(), text);
        game.cancel_deploy().unwrap();
        assert_eq!(game.fen(), TANK_STACK);
    }

    #[test]
    fn test_load_rejects_inconsistent_session() {
        let text = "3c7/11/11/11/11/5T5/11/5I5/11/11/11/10C r - - 0 1 DEPLOY f5:I:T>f8...";
        assert!(matches!(Game::from_fen(text), Err(GameError::MalformedInput(_))));
        let text = "3c7/11/11/11/11/5T5/11/5I5/11/11/11/10C r - - 0 1 DEPLOY f5:M:T>f7...";
        assert!(matches!(Game::from_fen(text), Err(GameError::MalformedInput(_))));
    }

    #[test]
    fn test_load_rejects_bad_terrain() {
        let err = Game::from_fen("3c7/11/11/11/11/11/11/1T9/11/11/11/10C r - - 0 1").unwrap_err();
        assert!(matches!(err, GameError::InvariantViolation(_)));
    }

    #[test]
    fn test_move_filter() {
        let game = Game::new();
        let from_c5 = game.moves(MoveFilter { square: Some(sq("c5")), piece: None });
        assert!(!from_c5.is_empty());
        assert!(from_c5.iter().all(|m| m.from == sq("c5")));
        let tanks = game.moves(MoveFilter { square: None, piece: Some(PieceType::Tank) });
        assert!(tanks.iter().all(|m| m.piece.kind == PieceType::Tank));
        let views = game.move_views(MoveFilter { square: Some(sq("c5")), piece: None });
        assert!(views.iter().any(|v| v.san == "I&c4"));
    }

    const TANK_HUNTS: &str = "3c7/11/3T7/11/11/11/11/11/11/11/11/10C";

    #[test]
    fn test_check_with_escape() {
        let game = Game::from_fen(&format!("{TANK_HUNTS} b - - 0 1")).unwrap();
        assert!(game.is_check());
        assert!(!game.is_checkmate());
        assert!(game.legal_moves().iter().all(|m| m.to != sq("d11")));
        assert_eq!(game.status(), GameStatus::InProgress);
    }

    #[test]
    fn test_commander_capture_ends_game() {
        let mut game = Game::from_fen(&format!("{TANK_HUNTS} r - - 0 1")).unwrap();
        assert!(!game.is_check());
        game.apply_san("Txd12").unwrap();
        assert_eq!(game.status(), GameStatus::CommanderCaptured { winner: Side::Red });
        assert!(game.is_game_over());
        assert!(game.legal_moves().is_empty());
    }

    #[test]
    fn test_checkmate() {
        // Both neighbours of k12 are red infantry, each covered by a tank.
        let game = Game::from_fen("9Ic/10I/9T1/10T/11/11/11/11/11/11/11/3C7 b - - 0 1").unwrap();
        assert!(game.is_check());
        assert!(game.is_checkmate());
        assert_eq!(game.status(), GameStatus::Checkmate { winner: Side::Red });
    }

    #[test]
    fn test_fifty_move_rule() {
        let game = Game::from_fen("3c7/11/11/11/11/11/11/11/11/11/11/10C r - - 100 60").unwrap();
        assert_eq!(game.status(), GameStatus::FiftyMoves);
    }

    #[test]
    fn test_no_moves_after_fifty_move_draw() {
        let mut game =
            Game::from_fen("3c7/11/11/11/11/11/11/11/11/11/11/10C r - - 4294967295 1").unwrap();
        assert_eq!(game.status(), GameStatus::FiftyMoves);
        let before = game.fen();
        let err = game.apply_san("Ck2").unwrap_err();
        assert!(matches!(err, GameError::IllegalMove(_)));
        assert_eq!(game.fen(), before);
    }

    #[test]
    fn test_counters_saturate_at_limit() {
        let mut game =
            Game::from_fen("3c7/11/11/11/11/11/11/11/11/11/11/10C b - - 0 4294967295").unwrap();
        game.apply_san("Cd11").unwrap();
        assert_eq!(game.fullmoves(), u32::MAX);
        assert_eq!(game.halfmoves(), 1);
        game.undo();
        assert_eq!(game.fen(), "3c7/11/11/11/11/11/11/11/11/11/11/10C b - - 0 4294967295");
    }

    #[test]
    fn test_session_text_with_foreign_move() {
        let mut game = Game::from_fen(TANK_STACK).unwrap();
        game.apply_san("T>f7").unwrap();
        assert!(matches!(game.parse_move("Ck1"), Err(GameError::SessionState(_))));
        assert!(matches!(game.parse_move("T>f8"), Err(GameError::SessionState(_))));
        assert!(matches!(game.parse_move("Iz9"), Err(GameError::MalformedInput(_))));
        assert_eq!(game.parse_move("I>f6").unwrap().to, sq("f6"));
    }

    #[test]
    fn test_repetition() {
        let mut game = Game::from_fen("3c7/11/11/11/11/11/11/11/11/11/11/10C r - - 0 1").unwrap();
        for _ in 0..2 {
            game.apply_san("Ck2").unwrap();
            game.apply_san("Cd11").unwrap();
            game.apply_san("Ck1").unwrap();
            game.apply_san("Cd12").unwrap();
        }
        assert_eq!(game.status(), GameStatus::Repetition);
    }
}
