//! Board coordinates.
//!
//! A `Square` is a 1-based (rank, file) pair, both always in 1..=8. Off-board
//! coordinates never construct a `Square`; they are represented as `None` by
//! the fallible constructors, so any `Square` that exists is on the board.

use std::fmt;

use crate::engine::types::ChessError;

/// A board coordinate: rank 1-8 (White's back rank is 1), file 1-8 (a-h).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Square {
    rank: u8,
    file: u8,
}

impl Square {
    /// Build a square from coordinates the caller has already validated.
    #[inline]
    pub fn at(rank: u8, file: u8) -> Self {
        debug_assert!(
            (1..=8).contains(&rank) && (1..=8).contains(&file),
            "square coordinates out of range: rank {rank}, file {file}"
        );
        Square { rank, file }
    }

    /// Parse algebraic notation like "e4".
    pub fn from_algebraic(text: &str) -> Result<Self, ChessError> {
        let bytes = text.as_bytes();
        if bytes.len() != 2 {
            return Err(ChessError::MalformedCoordinate(text.to_string()));
        }
        let file = match bytes[0] {
            b'a'..=b'h' => bytes[0] - b'a' + 1,
            _ => return Err(ChessError::MalformedCoordinate(text.to_string())),
        };
        let rank = match bytes[1] {
            b'1'..=b'8' => bytes[1] - b'1' + 1,
            _ => return Err(ChessError::MalformedCoordinate(text.to_string())),
        };
        Ok(Square { rank, file })
    }

    #[inline]
    pub fn rank(self) -> u8 {
        self.rank
    }

    #[inline]
    pub fn file(self) -> u8 {
        self.file
    }

    /// The file as its letter, 'a'..='h'.
    #[inline]
    pub fn file_letter(self) -> char {
        (b'a' + self.file - 1) as char
    }

    /// Algebraic notation like "e4".
    pub fn to_algebraic(self) -> String {
        format!("{}{}", self.file_letter(), self.rank)
    }

    /// Packed integer key (rank * 10 + file), for fast set membership.
    #[inline]
    pub fn key(self) -> u8 {
        self.rank * 10 + self.file
    }

    /// The square `delta_rank` / `delta_file` away, or `None` off the board.
    pub fn offset(self, delta_rank: i8, delta_file: i8) -> Option<Square> {
        let rank = self.rank as i16 + delta_rank as i16;
        let file = self.file as i16 + delta_file as i16;
        if (1..=8).contains(&rank) && (1..=8).contains(&file) {
            Some(Square {
                rank: rank as u8,
                file: file as u8,
            })
        } else {
            None
        }
    }

    /// All 64 squares, rank 1 to 8, file a to h within each rank.
    pub fn all() -> impl Iterator<Item = Square> {
        (1..=8u8).flat_map(|rank| (1..=8u8).map(move |file| Square { rank, file }))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
