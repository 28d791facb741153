//! The `chess` module provides the board layer consumed by the repetition detector: squares,
//! pieces, bitboards, positions and their Zobrist keys.
//
//  Copyright 2019 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::ops;
use std::fmt::{self, Display};
use std::mem;
use std::str::FromStr;
use std::convert::TryFrom;
use error::*;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Which side a piece or player is on, based on the color of the pieces for that side.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    /// The number of colors
    pub const COUNT: usize = 2;
    /// Both colors, in index order
    pub const ALL: [Color; Color::COUNT] = [Color::White, Color::Black];
}

impl ops::Not for Color {
    type Output = Color;

    /// Returns the opposite color
    ///
    /// # Example
    /// ```
    /// use reprise::chess::Color;
    /// assert_eq!(!Color::White, Color::Black);
    /// assert_eq!(!Color::Black, Color::White);
    /// ```
    fn not(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => 'w'.fmt(f),
            Color::Black => 'b'.fmt(f),
        }
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "w" => Ok(Color::White),
            "b" => Ok(Color::Black),
            _   => Err(Error::ParseError),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::White
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The type of a chess piece
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum Piece {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl Piece {
    /// The number of piece types
    pub const COUNT: usize = Piece::King as usize + 1;
    /// Every piece type, in index order
    pub const ALL: [Piece; Piece::COUNT] = [
        Piece::Pawn, Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen, Piece::King,
    ];

    /// Returns `true` for pieces which move along rays and can be blocked
    pub fn is_sliding(self) -> bool {
        match self {
            Piece::Bishop | Piece::Rook | Piece::Queen => true,
            _ => false,
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Piece::Pawn => "P",
            Piece::Knight => "N",
            Piece::Bishop => "B",
            Piece::Rook => "R",
            Piece::Queen => "Q",
            Piece::King => "K",
        }.fmt(f)
    }
}

impl FromStr for Piece {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "P"|"p" => Ok(Piece::Pawn),
            "N"|"n" => Ok(Piece::Knight),
            "B"|"b" => Ok(Piece::Bishop),
            "R"|"r" => Ok(Piece::Rook),
            "Q"|"q" => Ok(Piece::Queen),
            "K"|"k" => Ok(Piece::King),
            _       => Err(Error::ParseError),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Vertical column of the board, labeled from left to right from `White`'s perspective as
/// `A` through `H`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum File {
    // discriminants are spelled out so nothing can go wrong when we use transmute later
    A = 0, B = 1, C = 2, D = 3, E = 4, F = 5, G = 6, H = 7,
}

impl File {
    /// The number of files
    pub const COUNT: usize = File::H as usize + 1;
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ((b'a' + *self as u8) as char).fmt(f)
    }
}

impl FromStr for File {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c @ 'a'..='h'), None) => File::try_from(c as usize - 'a' as usize),
            (Some(c @ 'A'..='H'), None) => File::try_from(c as usize - 'A' as usize),
            _ => Err(Error::ParseError),
        }
    }
}

impl TryFrom<usize> for File {
    type Error = Error;

    fn try_from(value: usize) -> Result<Self> {
        if value < Self::COUNT {
            unsafe { Ok(mem::transmute::<u8, File>(value as u8)) }
        } else {
            Err(Error::TryFromIntError)
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Horizontal row of the board, labeled from nearest to farthest from `White`'s perspective
/// as `R1` through `R8`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum Rank {
    // discriminants are spelled out so nothing can go wrong when we use transmute later
    R1 = 0, R2 = 1, R3 = 2, R4 = 3, R5 = 4, R6 = 5, R7 = 6, R8 = 7,
}

impl Rank {
    /// The number of ranks
    pub const COUNT: usize = Rank::R8 as usize + 1;

    /// The rank on which `color`'s king and rooks start the game
    pub fn home(color: Color) -> Rank {
        match color {
            Color::White => Rank::R1,
            Color::Black => Rank::R8,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (*self as usize + 1).fmt(f)
    }
}

impl FromStr for Rank {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c @ '1'..='8'), None) => Rank::try_from(c as usize - '1' as usize),
            _ => Err(Error::ParseError),
        }
    }
}

impl TryFrom<usize> for Rank {
    type Error = Error;

    fn try_from(value: usize) -> Result<Self> {
        if value < Self::COUNT {
            unsafe { Ok(mem::transmute::<u8, Rank>(value as u8)) }
        } else {
            Err(Error::TryFromIntError)
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A specific square on the board, labeled using the `File` and `Rank` as coordinates.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum Square {
    // discriminants are spelled out so nothing can go wrong when we use transmute later
    A1 = 0o00, A2 = 0o01, A3 = 0o02, A4 = 0o03, A5 = 0o04, A6 = 0o05, A7 = 0o06, A8 = 0o07,
    B1 = 0o10, B2 = 0o11, B3 = 0o12, B4 = 0o13, B5 = 0o14, B6 = 0o15, B7 = 0o16, B8 = 0o17,
    C1 = 0o20, C2 = 0o21, C3 = 0o22, C4 = 0o23, C5 = 0o24, C6 = 0o25, C7 = 0o26, C8 = 0o27,
    D1 = 0o30, D2 = 0o31, D3 = 0o32, D4 = 0o33, D5 = 0o34, D6 = 0o35, D7 = 0o36, D8 = 0o37,
    E1 = 0o40, E2 = 0o41, E3 = 0o42, E4 = 0o43, E5 = 0o44, E6 = 0o45, E7 = 0o46, E8 = 0o47,
    F1 = 0o50, F2 = 0o51, F3 = 0o52, F4 = 0o53, F5 = 0o54, F6 = 0o55, F7 = 0o56, F8 = 0o57,
    G1 = 0o60, G2 = 0o61, G3 = 0o62, G4 = 0o63, G5 = 0o64, G6 = 0o65, G7 = 0o66, G8 = 0o67,
    H1 = 0o70, H2 = 0o71, H3 = 0o72, H4 = 0o73, H5 = 0o74, H6 = 0o75, H7 = 0o76, H8 = 0o77,
}

impl Square {
    /// The number of squares
    pub const COUNT: usize = Square::H8 as usize + 1;

    /// Returns a square from its file and rank
    pub fn from_coord(file: File, rank: Rank) -> Square {
        Square::try_from(((file as usize) << 3) + rank as usize).expect("INFALLIBLE")
    }

    /// Returns the square's file
    pub fn file(self) -> File {
        File::try_from((self as usize) >> 3).expect("INFALLIBLE")
    }

    /// Returns the square's rank
    pub fn rank(self) -> Rank {
        Rank::try_from((self as usize) & 7).expect("INFALLIBLE")
    }

    /// Returns the square `files` to the right and `ranks` up from this one, or `None` if that
    /// falls off the board.
    pub fn offset(self, files: i8, ranks: i8) -> Option<Square> {
        let file = self.file() as i8 + files;
        let rank = self.rank() as i8 + ranks;

        if (0..File::COUNT as i8).contains(&file) && (0..Rank::COUNT as i8).contains(&rank) {
            Some(Square::try_from(((file as usize) << 3) + rank as usize).expect("INFALLIBLE"))
        } else {
            None
        }
    }

    /// Returns an iterator over every square, from `A1` to `H8`
    pub fn all() -> impl Iterator<Item = Square> {
        (0..Square::COUNT).map(|i| Square::try_from(i).expect("INFALLIBLE"))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format!("{}{}", self.file(), self.rank()).fmt(f)
    }
}

impl FromStr for Square {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.len() == 2 && s.is_char_boundary(1) {
            Ok(Square::from_coord(s[..1].parse()?, s[1..].parse()?))
        } else {
            Err(Error::ParseError)
        }
    }
}

impl TryFrom<usize> for Square {
    type Error = Error;

    fn try_from(value: usize) -> Result<Self> {
        if value < Self::COUNT {
            unsafe { Ok(mem::transmute::<u8, Square>(value as u8)) }
        } else {
            Err(Error::TryFromIntError)
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
pub mod bitboard;
pub mod position;
pub use position::Position;
pub use position::zobrist::{self, Zobrist};
pub use position::moves::{Move, MoveType, Promotion};

pub mod error;

#[cfg(test)]
mod color_tests {
    use super::Color;

    #[test]
    fn display_and_fromstr_agree() {
        for &c in Color::ALL.iter() {
            assert_eq!(c.to_string().parse::<Color>().unwrap(), c);
        }
        assert!("x".parse::<Color>().is_err());
    }

    #[test]
    fn not_flips_the_color() {
        assert_eq!(!Color::White, Color::Black);
        assert_eq!(!!Color::Black, Color::Black);
    }
}
