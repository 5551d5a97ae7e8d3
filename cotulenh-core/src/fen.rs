//! Position text.
//!
//! ```text
//! <placement> <turn> - - <halfmoves> <fullmoves>[ DEPLOY <origin>:<remaining>:<sub>,<sub>...]
//!
//!   placement  ranks 12..1 separated by '/', digits for empty runs
//!   turn       r | b
//!   sub        move notation, plus [code] of the captured piece
//! ```
//!
//! Example with an open deploy session:
//!
//! ```text
//! 3c7/11/11/11/11/11/11/5I5/11/11/11/10C r - - 0 1 DEPLOY f5:I:T>f7...
//! ```

use crate::action::Position;
use crate::board::Board;
use crate::deploy::DeploySession;
use crate::error::{GameError, Result};
use crate::piece::{parse_unit_group, Piece, Side};
use crate::square::{Square, FILES, RANKS};
use crate::stack;

/// Start position of a new game.
pub const DEFAULT_POSITION: &str =
    "6c4/1n2fh1hf2/3a2s2a1/2n1gt1tg2/2ie2m2ei/11/11/2IE2M2EI/2N1GT1TG2/3A2S2A1/1N2FH1HF2/6C4 r - - 0 1";

const DEPLOY_MARKER: &str = " DEPLOY ";
const INCOMPLETE: &str = "...";

/// Fields of a parsed position text.
#[derive(Clone, Debug)]
pub(crate) struct FenParts {
    pub board: Board,
    pub turn: Side,
    pub halfmoves: u32,
    pub fullmoves: u32,
    pub deploy: Option<DeployText>,
}

/// The deploy suffix: where the session runs and what already happened.
#[derive(Clone, Debug)]
pub(crate) struct DeployText {
    pub origin: Square,
    pub remaining: Option<Piece>,
    pub moves: Vec<(String, Option<Piece>)>,
}

pub(crate) fn parse(text: &str) -> Result<FenParts> {
    let text = text.trim();
    let (main, deploy) = match text.split_once(DEPLOY_MARKER) {
        Some((main, suffix)) => (main, Some(parse_deploy(suffix)?)),
        None => (text, None),
    };

    let fields: Vec<&str> = main.split_whitespace().collect();
    let [placement, turn, _, _, halfmoves, fullmoves] = fields[..] else {
        return Err(GameError::malformed(format!("expected 6 fields, got {}", fields.len())));
    };
    let board = parse_placement(placement)?;
    let turn = match turn.chars().collect::<Vec<_>>()[..] {
        [c] => Side::from_char(c),
        _ => None,
    }
    .ok_or_else(|| GameError::malformed(format!("bad turn {turn:?}")))?;
    let halfmoves = halfmoves
        .parse()
        .map_err(|_| GameError::malformed(format!("bad halfmove clock {halfmoves:?}")))?;
    let fullmoves: u32 = fullmoves
        .parse()
        .map_err(|_| GameError::malformed(format!("bad move number {fullmoves:?}")))?;
    if fullmoves == 0 {
        return Err(GameError::malformed("move number starts at 1"));
    }

    Ok(FenParts { board, turn, halfmoves, fullmoves, deploy })
}

fn parse_placement(placement: &str) -> Result<Board> {
    let rows: Vec<&str> = placement.split('/').collect();
    if rows.len() != RANKS as usize {
        return Err(GameError::malformed(format!("expected {RANKS} ranks, got {}", rows.len())));
    }

    let mut board = Board::empty();
    for (row, text) in rows.iter().enumerate() {
        let rank = RANKS - 1 - row as u8;
        let mut file = 0u8;
        let mut rest = *text;
        while !rest.is_empty() {
            let digits = rest.bytes().take(2).take_while(u8::is_ascii_digit).count();
            if digits > 0 {
                let run: u8 = rest[..digits]
                    .parse()
                    .map_err(|_| GameError::malformed(format!("bad run in {text:?}")))?;
                if run == 0 {
                    return Err(GameError::malformed(format!("zero run in {text:?}")));
                }
                file = file.saturating_add(run);
                rest = &rest[digits..];
                continue;
            }
            let (units, after) = parse_unit_group(rest)?;
            let sq = Square::new(file, rank)
                .ok_or_else(|| GameError::malformed(format!("rank {text:?} is too long")))?;
            let piece = stack::form_stack(&units)
                .ok_or_else(|| GameError::malformed(format!("impossible stack on {sq}")))?;
            board.set(sq, Some(piece));
            file += 1;
            rest = after;
        }
        if file != FILES {
            return Err(GameError::malformed(format!("rank {text:?} covers {file} files")));
        }
    }
    Ok(board)
}

fn parse_deploy(suffix: &str) -> Result<DeployText> {
    let body = suffix
        .trim()
        .strip_suffix(INCOMPLETE)
        .ok_or_else(|| GameError::malformed("deploy suffix must end with \"...\""))?;
    let mut parts = body.splitn(3, ':');
    let (Some(origin), Some(remaining), Some(moves)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(GameError::malformed(format!("bad deploy suffix {suffix:?}")));
    };

    let origin: Square = origin.parse()?;
    let remaining = if remaining.is_empty() { None } else { Some(parse_piece(remaining)?) };
    let moves = moves
        .split(',')
        .filter(|token| !token.is_empty())
        .map(|token| match token.strip_suffix(']').and_then(|t| t.split_once('[')) {
            Some((notation, captured)) => Ok((notation.to_string(), Some(parse_piece(captured)?))),
            None => Ok((token.to_string(), None)),
        })
        .collect::<Result<Vec<_>>>()?;
    if moves.is_empty() {
        return Err(GameError::malformed("deploy suffix lists no moves"));
    }
    Ok(DeployText { origin, remaining, moves })
}

fn parse_piece(code: &str) -> Result<Piece> {
    let units = Piece::parse_units(code)?;
    stack::form_stack(&units).ok_or_else(|| GameError::malformed(format!("impossible stack {code:?}")))
}

/// Placement field of the position text.
pub(crate) fn placement(board: &Board) -> String {
    let mut out = String::with_capacity(96);
    for rank in (0..RANKS).rev() {
        let mut empty = 0;
        for file in 0..FILES {
            match Square::new(file, rank).and_then(|sq| board.get(sq)) {
                Some(piece) => {
                    if empty > 0 {
                        out.push_str(&empty.to_string());
                        empty = 0;
                    }
                    out.push_str(&piece.fen_code());
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            out.push_str(&empty.to_string());
        }
        if rank > 0 {
            out.push('/');
        }
    }
    out
}

/// Placement and side to move, the identity used for repetition counting.
pub(crate) fn position_key(pos: &Position) -> String {
    format!("{} {}", placement(&pos.board), pos.turn.to_char())
}

pub(crate) fn format(pos: &Position, session: Option<&DeploySession>) -> String {
    let mut out = format!(
        "{} {} - - {} {}",
        placement(&pos.board),
        pos.turn.to_char(),
        pos.halfmoves,
        pos.fullmoves
    );
    if let Some(session) = session {
        let remaining = pos.board.get(session.origin()).map(Piece::fen_code).unwrap_or_default();
        let moves: Vec<String> = session
            .moves()
            .iter()
            .zip(session.notations())
            .map(|(mv, notation)| match &mv.captured {
                Some(captured) => format!("{notation}[{}]", captured.fen_code()),
                None => notation.clone(),
            })
            .collect();
        out.push_str(DEPLOY_MARKER);
        out.push_str(&format!("{}:{remaining}:{}{INCOMPLETE}", session.origin(), moves.join(",")));
    }
    out
}
