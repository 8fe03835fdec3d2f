//! Side (Bid / Ask) for orders, trades and rendered levels.

/// Book side.
///
/// Wire representation is a single char:
/// - `'B'` => Bid
/// - `'S'` => Ask (the seller's side)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Side {
    Bid,
    Ask,
}

impl Side {
    /// Wire char for this side (`'B'` / `'S'`).
    pub fn as_char(self) -> char {
        match self {
            Side::Bid => 'B',
            Side::Ask => 'S',
        }
    }

    /// Try to parse from a char (`'B'` / `'S'`, case-sensitive).
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'B' => Some(Side::Bid),
            'S' => Some(Side::Ask),
            _ => None,
        }
    }

    /// The other side of the book.
    pub fn opposite(self) -> Self {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }

    /// Char for an optional side; `'U'` when unknown / absent.
    pub fn char_or_unknown(side: Option<Side>) -> char {
        side.map(Side::as_char).unwrap_or('U')
    }
}
