//! Move notation.
//!
//! ```text
//! <piece>[<from>][>][<marker>]<to>
//!
//!   piece   uppercase code with carried group and heroic marks, e.g. +N(F+T)
//!   from    only written when another legal move would read the same
//!   >       deploy sub-move
//!   marker  x capture, _ stay-capture, @ suicide-capture, & combine
//! ```

use crate::error::{GameError, Result};
use crate::moves::Move;
use crate::piece::{parse_unit_group, Piece, Side};
use crate::square::{parse_square_prefix, Square};
use crate::stack;

const MARKERS: [&str; 4] = ["x", "_", "@", "&"];

/// A parsed notation string, matched against generated moves.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MoveText {
    piece: Piece,
    code: String,
    from: Option<Square>,
    deploy: bool,
    marker: &'static str,
    to: Square,
}

impl MoveText {
    /// Parse notation text. Checks syntax only; legality is up to the caller.
    pub fn parse(text: &str) -> Result<MoveText> {
        let text = text.trim();
        let (mut units, mut rest) = parse_unit_group(text)?;
        for unit in units.iter_mut() {
            unit.side = Side::Red;
        }
        let piece = stack::form_stack(&units)
            .ok_or_else(|| GameError::malformed(format!("impossible stack in {text:?}")))?;

        let mut from = None;
        if let Some((sq, after)) = parse_square_prefix(rest) {
            if !after.is_empty() {
                from = Some(sq);
                rest = after;
            }
        }
        let deploy = match rest.strip_prefix('>') {
            Some(after) => {
                rest = after;
                true
            }
            None => false,
        };
        let mut marker = "";
        for m in MARKERS {
            if let Some(after) = rest.strip_prefix(m) {
                marker = m;
                rest = after;
                break;
            }
        }
        let to = rest
            .parse::<Square>()
            .map_err(|_| GameError::malformed(format!("bad destination in {text:?}")))?;

        Ok(MoveText { code: piece.san_code(), piece, from, deploy, marker, to })
    }

    #[inline]
    pub fn to(&self) -> Square {
        self.to
    }

    #[inline]
    pub fn marker(&self) -> &'static str {
        self.marker
    }

    /// The written piece, owned by `side`.
    pub fn piece_for(&self, side: Side) -> Piece {
        let mut piece = self.piece.clone();
        piece.side = side;
        for unit in piece.carrying.iter_mut() {
            unit.side = side;
        }
        piece
    }

    pub fn matches(&self, mv: &Move) -> bool {
        mv.to == self.to
            && mv.deploy == self.deploy
            && mv.mode.marker() == self.marker
            && self.from.map_or(true, |from| from == mv.from)
            && mv.piece.san_code() == self.code
    }

    /// Pick the single legal move this text names.
    pub fn resolve<'a>(&self, legal: &'a [Move]) -> Result<&'a Move> {
        let mut found = legal.iter().filter(|mv| self.matches(mv));
        match (found.next(), found.next()) {
            (Some(mv), None) => Ok(mv),
            (None, _) => Err(GameError::illegal(format!("no legal move matches {self}"))),
            (Some(_), Some(_)) => Err(GameError::illegal(format!("{self} is ambiguous"))),
        }
    }
}

impl std::fmt::Display for MoveText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.code)?;
        if let Some(from) = self.from {
            write!(f, "{from}")?;
        }
        if self.deploy {
            f.write_str(">")?;
        }
        write!(f, "{}{}", self.marker, self.to)
    }
}

/// Write the notation of `mv`, adding the origin square when another move in
/// `legal` would otherwise read the same.
pub fn format_move(mv: &Move, legal: &[Move]) -> String {
    let code = mv.piece.san_code();
    let ambiguous = legal.iter().any(|other| {
        other.from != mv.from
            && other.to == mv.to
            && other.deploy == mv.deploy
            && other.mode.marker() == mv.mode.marker()
            && other.piece.san_code() == code
    });
    let mut out = code;
    if ambiguous {
        out.push_str(&mv.from.to_string());
    }
    if mv.deploy {
        out.push('>');
    }
    out.push_str(mv.mode.marker());
    out.push_str(&mv.to.to_string());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::MoveMode;
    use crate::piece::{PieceType, Unit};

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn mv(kind: PieceType, from: &str, to: &str, mode: MoveMode) -> Move {
        Move {
            from: sq(from),
            to: sq(to),
            piece: Piece::new(kind, Side::Red),
            captured: None,
            mode,
            deploy: false,
        }
    }

    #[test]
    fn test_format_plain_and_capture() {
        let a = mv(PieceType::Tank, "e3", "e5", MoveMode::Normal);
        assert_eq!(format_move(&a, &[a.clone()]), "Te5");
        let b = mv(PieceType::Tank, "e3", "e5", MoveMode::StayCapture);
        assert_eq!(format_move(&b, &[]), "T_e5");
    }

    #[test]
    fn test_format_disambiguates() {
        let a = mv(PieceType::Infantry, "e4", "e5", MoveMode::Normal);
        let b = mv(PieceType::Infantry, "e6", "e5", MoveMode::Normal);
        let legal = vec![a.clone(), b];
        assert_eq!(format_move(&a, &legal), "Ie4e5");
    }

    #[test]
    fn test_format_deploy_stack_code() {
        let mut navy = Piece::new(PieceType::Navy, Side::Blue);
        navy.heroic = true;
        navy.carrying.push(Unit::new(PieceType::AirForce, Side::Blue));
        let m = Move {
            from: sq("b10"),
            to: sq("b8"),
            piece: navy,
            captured: None,
            mode: MoveMode::Normal,
            deploy: true,
        };
        assert_eq!(format_move(&m, &[]), "+N(F)>b8");
    }

    #[test]
    fn test_parse_parts() {
        let text = MoveText::parse("N(FT)c3>xc5").unwrap();
        assert_eq!(text.code, "N(FT)");
        assert_eq!(text.from, Some(sq("c3")));
        assert!(text.deploy);
        assert_eq!(text.marker, "x");
        assert_eq!(text.to, sq("c5"));
        assert_eq!(text.to_string(), "N(FT)c3>xc5");
    }

    #[test]
    fn test_parse_canonicalizes_carried_order() {
        let text = MoveText::parse("N(TF)&c5").unwrap();
        assert_eq!(text.code, "N(FT)");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(MoveText::parse(""), Err(GameError::MalformedInput(_))));
        assert!(matches!(MoveText::parse("Qe5"), Err(GameError::MalformedInput(_))));
        assert!(matches!(MoveText::parse("Te"), Err(GameError::MalformedInput(_))));
        assert!(matches!(MoveText::parse("T(A)e5"), Err(GameError::MalformedInput(_))));
        assert!(matches!(MoveText::parse("Tx"), Err(GameError::MalformedInput(_))));
    }

    #[test]
    fn test_resolve() {
        let a = mv(PieceType::Infantry, "e4", "e5", MoveMode::Normal);
        let b = mv(PieceType::Infantry, "e6", "e5", MoveMode::Normal);
        let legal = vec![a.clone(), b.clone()];
        assert!(matches!(
            MoveText::parse("Ie5").unwrap().resolve(&legal),
            Err(GameError::IllegalMove(_))
        ));
        assert_eq!(MoveText::parse("Ie6e5").unwrap().resolve(&legal).unwrap(), &b);
        assert!(matches!(
            MoveText::parse("Ixe5").unwrap().resolve(&legal),
            Err(GameError::IllegalMove(_))
        ));
    }
}
