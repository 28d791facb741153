//! Contains structure and data for Zobrist hash keys
//!
//! The key tables are generated once per process from a fixed seed, so fingerprints are
//! reproducible between runs.
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::fmt;
use std::ops;
use lazy_static::lazy_static;
use log::debug;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use super::*;

/// Seed used to generate the process-wide key tables
pub const SEED: u64 = 0x7a3f_19c2_5e6d_0b81;

lazy_static! {
    static ref KEYS: Keys = Keys::generate(SEED);
}

/// Returns the process-wide key tables, generating them on first use
pub fn keys() -> &'static Keys {
    &KEYS
}

/// Generates the process-wide key tables if that hasn't happened yet
pub fn init() {
    lazy_static::initialize(&KEYS);
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The random values XORed together to form a `Zobrist` key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keys {
    piece_square: [[[u64; Square::COUNT]; Piece::COUNT]; Color::COUNT],
    castling: [[u64; 2]; Color::COUNT],
    ep_file: [u64; File::COUNT],
    black_to_move: u64,
}

impl Keys {
    /// Generates a complete set of keys from `seed`. Equal seeds give equal keys.
    pub fn generate(seed: u64) -> Keys {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut keys = Keys {
            piece_square: [[[0; Square::COUNT]; Piece::COUNT]; Color::COUNT],
            castling: [[0; 2]; Color::COUNT],
            ep_file: [0; File::COUNT],
            black_to_move: 0,
        };

        for by_piece in keys.piece_square.iter_mut() {
            for by_square in by_piece.iter_mut() {
                for key in by_square.iter_mut() {
                    *key = rng.gen();
                }
            }
        }
        for by_side in keys.castling.iter_mut() {
            for key in by_side.iter_mut() {
                *key = rng.gen();
            }
        }
        for key in keys.ep_file.iter_mut() {
            *key = rng.gen();
        }
        keys.black_to_move = rng.gen();

        debug!("generated zobrist keys from seed {:#018x}", seed);
        keys
    }

    /// Key for a piece of color `c` and type `p` standing on `sq`
    #[inline]
    pub fn piece_square(&self, c: Color, p: Piece, sq: Square) -> u64 {
        self.piece_square[c as usize][p as usize][sq as usize]
    }

    /// Combined key for the castling `flags` held by color `c`
    pub fn castling(&self, c: Color, flags: u8) -> u64 {
        let mut key = 0;
        if flags & CASTLE_KING_SIDE != 0 {
            key ^= self.castling[c as usize][0];
        }
        if flags & CASTLE_QUEEN_SIDE != 0 {
            key ^= self.castling[c as usize][1];
        }
        key
    }

    /// Key for an en passant square on `file`
    #[inline]
    pub fn ep_file(&self, file: File) -> u64 {
        self.ep_file[file as usize]
    }

    /// Key which is present when it is black's turn
    #[inline]
    pub fn black_to_move(&self) -> u64 {
        self.black_to_move
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A 64-bit hash key generated from a position
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Hash)]
pub struct Zobrist(u64);

impl Zobrist {
    /// Creates a new zobrist key
    pub fn new() -> Zobrist {
        Zobrist(0)
    }

    /// Toggles piece placement
    pub fn toggle_piece_placement(&mut self, c: Color, p: Piece, sq: Square) {
        self.0 ^= keys().piece_square(c, p, sq);
    }

    /// Toggles an en passant square
    pub fn toggle_ep_square(&mut self, sq: Square) {
        self.0 ^= keys().ep_file(sq.file());
    }

    /// Toggles castling flags
    pub fn toggle_castling_rights(&mut self, c: Color, flags: u8) {
        self.0 ^= keys().castling(c, flags);
    }

    /// Toggles whose turn it is
    pub fn toggle_turn(&mut self) {
        self.0 ^= keys().black_to_move();
    }
}

impl ops::BitXor for Zobrist {
    type Output = Zobrist;

    fn bitxor(self, rhs: Zobrist) -> Zobrist {
        Zobrist(self.0 ^ rhs.0)
    }
}

impl fmt::Display for Zobrist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::LowerHex for Zobrist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl fmt::UpperHex for Zobrist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.0, f)
    }
}

impl From<Zobrist> for u64 {
    fn from(key: Zobrist) -> u64 {
        key.0
    }
}

impl From<u64> for Zobrist {
    fn from(key: u64) -> Zobrist {
        Zobrist(key)
    }
}
