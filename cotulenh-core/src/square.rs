//! Board geometry and terrain.
//!
//! # Square Encoding
//!
//! ```text
//! index = row * 16 + file
//!
//!   file: 0..11  (a..k)
//!   row:  0..12  (row 0 = rank 12, row 11 = rank 1)
//!
//! Only 132 of the 256 indices are on the board. A square is valid iff
//! (index & 0x0F) < 11 && (index >> 4) < 12.
//! ```
//!
//! # Terrain
//!
//! ```text
//!   Water: files a, b
//!   Mixed: file c, plus d6 e6 d7 e7 (river mouth)
//!   Land:  everything else
//!
//!   River between ranks 6 and 7, bridged on files f and h.
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::GameError;

/// Number of files (a..k).
pub const FILES: u8 = 11;
/// Number of ranks (1..12).
pub const RANKS: u8 = 12;
/// Number of valid squares.
pub const NUM_SQUARES: usize = FILES as usize * RANKS as usize;

/// A square on the 11x12 board, packed into a single index.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square(u8);

impl Square {
    /// Create a square from a 0-based file and a 0-based rank (rank 0 = rank 1).
    #[inline]
    pub const fn new(file: u8, rank: u8) -> Option<Square> {
        if file < FILES && rank < RANKS {
            Some(Square((RANKS - 1 - rank) * 16 + file))
        } else {
            None
        }
    }

    /// Create a square from a raw index, rejecting off-board indices.
    #[inline]
    pub const fn from_index(index: u8) -> Option<Square> {
        if Self::is_valid_index(index) {
            Some(Square(index))
        } else {
            None
        }
    }

    /// O(1) bounds test on a raw index.
    #[inline]
    pub const fn is_valid_index(index: u8) -> bool {
        (index & 0x0F) < FILES && (index >> 4) < RANKS
    }

    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// 0-based file (0 = a).
    #[inline]
    pub const fn file(self) -> u8 {
        self.0 & 0x0F
    }

    /// 0-based rank (0 = rank 1).
    #[inline]
    pub const fn rank(self) -> u8 {
        RANKS - 1 - (self.0 >> 4)
    }

    /// Step by a file/rank delta, returning `None` when leaving the board.
    #[inline]
    pub fn offset(self, df: i8, dr: i8) -> Option<Square> {
        let file = self.file() as i8 + df;
        let rank = self.rank() as i8 + dr;
        if file < 0 || rank < 0 {
            return None;
        }
        Square::new(file as u8, rank as u8)
    }

    /// Iterate over all 132 squares, rank 12 first, file a first.
    pub fn all() -> impl Iterator<Item = Square> {
        (0u8..=255).filter_map(Square::from_index)
    }

    pub fn terrain(self) -> Terrain {
        match self.file() {
            0 | 1 => Terrain::Water,
            2 => Terrain::Mixed,
            3 | 4 if self.rank() == 5 || self.rank() == 6 => Terrain::Mixed,
            _ => Terrain::Land,
        }
    }

    /// Which bank of the river the square lies on (0 = ranks 1-6, 1 = ranks 7-12).
    #[inline]
    pub const fn bank(self) -> u8 {
        if self.rank() < 6 {
            0
        } else {
            1
        }
    }

    /// Files f and h carry the bridges.
    #[inline]
    pub const fn is_bridge_file(self) -> bool {
        matches!(self.file(), 5 | 7)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file()) as char, self.rank() + 1)
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Square({self})")
    }
}

impl FromStr for Square {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match parse_square_prefix(s) {
            Some((sq, rest)) if rest.is_empty() => Ok(sq),
            _ => Err(GameError::malformed(format!("invalid square: {s:?}"))),
        }
    }
}

/// Parse a square at the start of `s`, returning the square and the unparsed remainder.
///
/// Digits are consumed greedily, so `c12c4` yields `c12` and leaves `c4`.
pub(crate) fn parse_square_prefix(s: &str) -> Option<(Square, &str)> {
    let bytes = s.as_bytes();
    let file = *bytes.first()?;
    if !(b'a'..b'a' + FILES).contains(&file) {
        return None;
    }
    let digits = bytes[1..].iter().take(2).take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let rank: u8 = s[1..1 + digits].parse().ok()?;
    if rank == 0 {
        return None;
    }
    let sq = Square::new(file - b'a', rank - 1)?;
    Some((sq, &s[1 + digits..]))
}

impl Serialize for Square {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Square {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Terrain classification of a square.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    Water,
    Mixed,
    Land,
}

impl Terrain {
    #[inline]
    pub const fn has_water(self) -> bool {
        matches!(self, Terrain::Water | Terrain::Mixed)
    }

    #[inline]
    pub const fn has_land(self) -> bool {
        matches!(self, Terrain::Land | Terrain::Mixed)
    }
}

/// The eight ray directions as (file delta, rank delta). Orthogonal first.
pub const DIRECTIONS: [(i8, i8); 8] = [
    (0, 1),
    (0, -1),
    (1, 0),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// A 256-bit set of square indices.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SquareSet([u64; 4]);

impl SquareSet {
    pub const EMPTY: SquareSet = SquareSet([0; 4]);

    #[inline]
    pub fn insert(&mut self, sq: Square) {
        let i = sq.index() as usize;
        self.0[i >> 6] |= 1 << (i & 63);
    }

    #[inline]
    pub fn contains(&self, sq: Square) -> bool {
        let i = sq.index() as usize;
        self.0[i >> 6] & (1 << (i & 63)) != 0
    }

    pub fn len(&self) -> usize {
        self.0.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&w| w == 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = Square> + '_ {
        Square::all().filter(move |&sq| self.contains(sq))
    }
}

impl fmt::Debug for SquareSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn test_square_count() {
        assert_eq!(Square::all().count(), NUM_SQUARES);
        assert_eq!(NUM_SQUARES, 132);
    }

    #[test]
    fn test_square_index_layout() {
        assert_eq!(sq("a12").index(), 0x00);
        assert_eq!(sq("k12").index(), 0x0A);
        assert_eq!(sq("a1").index(), 0xB0);
        assert_eq!(sq("k1").index(), 0xBA);
    }

    #[test]
    fn test_off_board_indices() {
        assert!(!Square::is_valid_index(0x0B));
        assert!(!Square::is_valid_index(0x0F));
        assert!(!Square::is_valid_index(0xC0));
        assert!(Square::is_valid_index(0xBA));
    }

    #[test]
    fn test_square_roundtrip_text() {
        for s in Square::all() {
            assert_eq!(sq(&s.to_string()), s);
        }
    }

    #[test]
    fn test_parse_rejects_bad_squares() {
        assert!("l1".parse::<Square>().is_err());
        assert!("a0".parse::<Square>().is_err());
        assert!("a13".parse::<Square>().is_err());
        assert!("a".parse::<Square>().is_err());
        assert!("a1x".parse::<Square>().is_err());
    }

    #[test]
    fn test_parse_prefix_is_greedy() {
        let (first, rest) = parse_square_prefix("c12c4").unwrap();
        assert_eq!(first, sq("c12"));
        assert_eq!(rest, "c4");
    }

    #[test]
    fn test_offset_edges() {
        assert_eq!(sq("a1").offset(-1, 0), None);
        assert_eq!(sq("k12").offset(0, 1), None);
        assert_eq!(sq("e5").offset(1, 1), Some(sq("f6")));
    }

    #[test]
    fn test_terrain() {
        assert_eq!(sq("a5").terrain(), Terrain::Water);
        assert_eq!(sq("b12").terrain(), Terrain::Water);
        assert_eq!(sq("c1").terrain(), Terrain::Mixed);
        assert_eq!(sq("d6").terrain(), Terrain::Mixed);
        assert_eq!(sq("e7").terrain(), Terrain::Mixed);
        assert_eq!(sq("d5").terrain(), Terrain::Land);
        assert_eq!(sq("f6").terrain(), Terrain::Land);
        assert_eq!(sq("k12").terrain(), Terrain::Land);
    }

    #[test]
    fn test_banks_and_bridges() {
        assert_eq!(sq("f6").bank(), 0);
        assert_eq!(sq("f7").bank(), 1);
        assert!(sq("f6").is_bridge_file());
        assert!(sq("h7").is_bridge_file());
        assert!(!sq("g7").is_bridge_file());
    }

    #[test]
    fn test_square_set() {
        let mut set = SquareSet::EMPTY;
        assert!(set.is_empty());
        set.insert(sq("a1"));
        set.insert(sq("k12"));
        set.insert(sq("a1"));
        assert_eq!(set.len(), 2);
        assert!(set.contains(sq("k12")));
        assert!(!set.contains(sq("k11")));
    }

    #[test]
    fn test_square_serde() {
        let json = serde_json::to_string(&sq("c3")).unwrap();
        assert_eq!(json, "\"c3\"");
        let back: Square = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sq("c3"));
    }
}
