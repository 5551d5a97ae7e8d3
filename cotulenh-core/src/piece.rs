//! Sides, piece types, units and stacks.

use std::fmt;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{GameError, Result};
use crate::square::Terrain;

/// Most pieces a carrier can hold.
pub const MAX_CARRIED: usize = 3;
/// Largest stack, carrier included.
pub const MAX_STACK: usize = MAX_CARRIED + 1;

/// Side identifier. Red moves first and starts on ranks 1-6.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Red,
    Blue,
}

impl Side {
    /// Get the opposing side.
    #[inline]
    pub const fn opponent(self) -> Side {
        match self {
            Side::Red => Side::Blue,
            Side::Blue => Side::Red,
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Side::Red => 0,
            Side::Blue => 1,
        }
    }

    /// Turn letter used in position text.
    pub const fn to_char(self) -> char {
        match self {
            Side::Red => 'r',
            Side::Blue => 'b',
        }
    }

    pub const fn from_char(c: char) -> Option<Side> {
        match c {
            'r' => Some(Side::Red),
            'b' => Some(Side::Blue),
            _ => None,
        }
    }
}

/// Piece type.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceType {
    Commander,
    Infantry,
    Tank,
    Militia,
    Engineer,
    Artillery,
    AntiAir,
    Missile,
    AirForce,
    Navy,
    Headquarter,
}

/// Where a piece type may stand.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TerrainClass {
    /// Water or mixed squares.
    Water,
    /// Land or mixed squares.
    Land,
    /// Anywhere.
    Any,
}

impl TerrainClass {
    #[inline]
    pub const fn allows(self, terrain: Terrain) -> bool {
        match self {
            TerrainClass::Water => terrain.has_water(),
            TerrainClass::Land => terrain.has_land(),
            TerrainClass::Any => true,
        }
    }
}

impl PieceType {
    pub const ALL: [PieceType; 11] = [
        PieceType::Commander,
        PieceType::Infantry,
        PieceType::Tank,
        PieceType::Militia,
        PieceType::Engineer,
        PieceType::Artillery,
        PieceType::AntiAir,
        PieceType::Missile,
        PieceType::AirForce,
        PieceType::Navy,
        PieceType::Headquarter,
    ];

    /// Lowercase letter code.
    pub const fn to_char(self) -> char {
        match self {
            PieceType::Commander => 'c',
            PieceType::Infantry => 'i',
            PieceType::Tank => 't',
            PieceType::Militia => 'm',
            PieceType::Engineer => 'e',
            PieceType::Artillery => 'a',
            PieceType::AntiAir => 'g',
            PieceType::Missile => 's',
            PieceType::AirForce => 'f',
            PieceType::Navy => 'n',
            PieceType::Headquarter => 'h',
        }
    }

    /// Parse a letter code in either case.
    pub fn from_char(c: char) -> Option<PieceType> {
        let lower = c.to_ascii_lowercase();
        PieceType::ALL.into_iter().find(|t| t.to_char() == lower)
    }

    pub const fn terrain_class(self) -> TerrainClass {
        match self {
            PieceType::Navy => TerrainClass::Water,
            PieceType::AirForce => TerrainClass::Any,
            _ => TerrainClass::Land,
        }
    }

    /// Heavy pieces may only cross the river over a bridge.
    pub const fn is_heavy(self) -> bool {
        matches!(self, PieceType::Artillery | PieceType::AntiAir | PieceType::Missile)
    }

    /// Base air-defense radius (0 = no zone).
    pub const fn air_defense_level(self) -> u8 {
        match self {
            PieceType::AntiAir | PieceType::Navy => 1,
            PieceType::Missile => 2,
            _ => 0,
        }
    }
}

/// A single piece: the carrier of a stack or one of its carried pieces.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Unit {
    pub kind: PieceType,
    pub side: Side,
    pub heroic: bool,
}

impl Unit {
    #[inline]
    pub const fn new(kind: PieceType, side: Side) -> Unit {
        Unit { kind, side, heroic: false }
    }

    #[inline]
    pub const fn heroic(mut self) -> Unit {
        self.heroic = true;
        self
    }

    /// Air-defense radius including the heroic bonus.
    pub const fn air_defense_level(self) -> u8 {
        let base = self.kind.air_defense_level();
        if base > 0 && self.heroic {
            base + 1
        } else {
            base
        }
    }

    /// Letter code with side case and heroic marker, as used in position text.
    pub fn fen_code(self) -> String {
        let c = self.kind.to_char();
        let c = match self.side {
            Side::Red => c.to_ascii_uppercase(),
            Side::Blue => c,
        };
        if self.heroic {
            format!("+{c}")
        } else {
            c.to_string()
        }
    }

    /// Letter code in uppercase with heroic marker, as used in move notation.
    pub fn san_code(self) -> String {
        let c = self.kind.to_char().to_ascii_uppercase();
        if self.heroic {
            format!("+{c}")
        } else {
            c.to_string()
        }
    }
}

/// A piece on the board. The piece's own fields describe the carrier; a
/// non-empty `carrying` list makes it a stack.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct Piece {
    pub kind: PieceType,
    pub side: Side,
    pub heroic: bool,
    pub carrying: ArrayVec<Unit, MAX_CARRIED>,
}

impl Piece {
    #[inline]
    pub fn new(kind: PieceType, side: Side) -> Piece {
        Piece::from_unit(Unit::new(kind, side))
    }

    pub fn from_unit(unit: Unit) -> Piece {
        Piece {
            kind: unit.kind,
            side: unit.side,
            heroic: unit.heroic,
            carrying: ArrayVec::new(),
        }
    }

    #[inline]
    pub fn carrier(&self) -> Unit {
        Unit { kind: self.kind, side: self.side, heroic: self.heroic }
    }

    #[inline]
    pub fn is_stack(&self) -> bool {
        !self.carrying.is_empty()
    }

    /// Number of units, carrier included.
    #[inline]
    pub fn len(&self) -> usize {
        1 + self.carrying.len()
    }

    /// Units of the piece, carrier first.
    pub fn units(&self) -> impl Iterator<Item = Unit> + '_ {
        std::iter::once(self.carrier()).chain(self.carrying.iter().copied())
    }

    pub fn contains(&self, kind: PieceType) -> bool {
        self.units().any(|u| u.kind == kind)
    }

    pub fn unit(&self, kind: PieceType) -> Option<Unit> {
        self.units().find(|u| u.kind == kind)
    }

    /// Units left after taking away every unit whose type appears in `taken`.
    pub fn units_without(&self, taken: &Piece) -> ArrayVec<Unit, MAX_STACK> {
        self.units().filter(|u| !taken.contains(u.kind)).collect()
    }

    /// Copy of the piece with the heroic flag of one unit set.
    pub fn with_heroic(&self, kind: PieceType) -> Piece {
        let mut piece = self.clone();
        if piece.kind == kind {
            piece.heroic = true;
        }
        for unit in piece.carrying.iter_mut() {
            if unit.kind == kind {
                unit.heroic = true;
            }
        }
        piece
    }

    /// Position-text code: carrier followed by a parenthetical carried group.
    pub fn fen_code(&self) -> String {
        self.code_with(Unit::fen_code)
    }

    /// Move-notation code: like [`Piece::fen_code`] but always uppercase.
    pub fn san_code(&self) -> String {
        self.code_with(Unit::san_code)
    }

    fn code_with(&self, unit_code: fn(Unit) -> String) -> String {
        let mut out = unit_code(self.carrier());
        if self.is_stack() {
            out.push('(');
            for unit in &self.carrying {
                out.push_str(&unit_code(*unit));
            }
            out.push(')');
        }
        out
    }

    /// Parse a position-text piece code (`T`, `+n`, `N(F+T)`).
    ///
    /// Returns the units in written order; stacking rules are checked by the caller.
    pub fn parse_units(code: &str) -> Result<ArrayVec<Unit, MAX_STACK>> {
        let (units, rest) = parse_unit_group(code)?;
        if !rest.is_empty() {
            return Err(GameError::malformed(format!("trailing text in piece code {code:?}")));
        }
        Ok(units)
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fen_code())
    }
}

impl Serialize for Piece {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parse one unit (`+T`, `n`) at the start of `s`.
pub(crate) fn parse_unit_prefix(s: &str) -> Option<(Unit, &str)> {
    let (heroic, s) = match s.strip_prefix('+') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let c = s.chars().next()?;
    let kind = PieceType::from_char(c)?;
    let side = if c.is_ascii_uppercase() { Side::Red } else { Side::Blue };
    Some((Unit { kind, side, heroic }, &s[c.len_utf8()..]))
}

/// Parse a carrier plus optional `(...)` carried group at the start of `s`.
pub(crate) fn parse_unit_group(s: &str) -> Result<(ArrayVec<Unit, MAX_STACK>, &str)> {
    let mut units = ArrayVec::new();
    let (carrier, mut rest) = parse_unit_prefix(s)
        .ok_or_else(|| GameError::malformed(format!("expected piece code in {s:?}")))?;
    units.push(carrier);
    if let Some(inner) = rest.strip_prefix('(') {
        rest = inner;
        loop {
            if let Some(after) = rest.strip_prefix(')') {
                rest = after;
                break;
            }
            let (unit, after) = parse_unit_prefix(rest)
                .ok_or_else(|| GameError::malformed(format!("bad carried group in {s:?}")))?;
            units
                .try_push(unit)
                .map_err(|_| GameError::malformed(format!("stack too large in {s:?}")))?;
            rest = after;
        }
        if units.len() == 1 {
            return Err(GameError::malformed(format!("empty carried group in {s:?}")));
        }
    }
    Ok((units, rest))
}
