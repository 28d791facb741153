//! Provides the tables and functions used to compute attacks
//
//  Copyright 2019 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use lazy_static::lazy_static;
use super::*;

const KNIGHT_STEPS: [(i8, i8); 8] = [(1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2)];
const KING_STEPS: [(i8, i8); 8] = [(0, 1), (1, 1), (1, 0), (1, -1), (0, -1), (-1, -1), (-1, 0), (-1, 1)];
const BISHOP_RAYS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];
const ROOK_RAYS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

lazy_static! {
    static ref KNIGHT_ATTACKS: Vec<Bitboard> = Square::all().map(|sq| steps(sq, &KNIGHT_STEPS)).collect();
    static ref KING_ATTACKS: Vec<Bitboard> = Square::all().map(|sq| steps(sq, &KING_STEPS)).collect();
    static ref PAWN_ATTACKS: [Vec<Bitboard>; Color::COUNT] = [
        Square::all().map(|sq| steps(sq, &[(-1, 1), (1, 1)])).collect(),
        Square::all().map(|sq| steps(sq, &[(-1, -1), (1, -1)])).collect(),
    ];
    // indexed by `a * 64 + b`
    static ref BETWEEN: Vec<Bitboard> = {
        let mut between = vec![Bitboard::new(); Square::COUNT * Square::COUNT];
        for a in Square::all() {
            for &(files, ranks) in BISHOP_RAYS.iter().chain(ROOK_RAYS.iter()) {
                let mut passed = Bitboard::new();
                let mut next = a.offset(files, ranks);
                while let Some(b) = next {
                    between[a as usize * Square::COUNT + b as usize] = passed;
                    passed.insert(b);
                    next = b.offset(files, ranks);
                }
            }
        }
        between
    };
}

fn steps(sq: Square, deltas: &[(i8, i8)]) -> Bitboard {
    deltas.iter().filter_map(|&(files, ranks)| sq.offset(files, ranks)).collect()
}

// walks each ray until it leaves the board or hits an occupied square, which is included
fn rays(sq: Square, occ: Bitboard, dirs: &[(i8, i8)]) -> Bitboard {
    let mut attacks = Bitboard::new();
    for &(files, ranks) in dirs {
        let mut next = sq.offset(files, ranks);
        while let Some(to) = next {
            attacks.insert(to);
            if occ.contains(to) {
                break;
            }
            next = to.offset(files, ranks);
        }
    }
    attacks
}

/// Computes knight-like attacks to or from `sq`
#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    KNIGHT_ATTACKS[sq as usize]
}

/// Computes king-like attacks to or from `sq`
#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    KING_ATTACKS[sq as usize]
}

/// Computes the squares attacked by a pawn of color `c` standing on `sq`
///
/// Pawn attacks are not symmetric, so the squares from which a pawn of color `c` attacks `sq`
/// are `pawn_attacks(!c, sq)`.
#[inline]
pub fn pawn_attacks(c: Color, sq: Square) -> Bitboard {
    PAWN_ATTACKS[c as usize][sq as usize]
}

/// Computes bishop-like attacks to or from `sq` based on the occupied squares given by `occ`
pub fn bishop_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    rays(sq, occ, &BISHOP_RAYS)
}

/// Computes rook-like attacks to or from `sq` based on the occupied squares given by `occ`
pub fn rook_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    rays(sq, occ, &ROOK_RAYS)
}

/// Computes queen-like attacks to or from `sq` based on the occupied squares given by `occ`
#[inline]
pub fn queen_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    rook_attacks(sq, occ) | bishop_attacks(sq, occ)
}

/// Computes the squares attacked from `sq` by a non-pawn piece, based on the occupied squares
/// given by `occ`.
///
/// # Panics
/// Panics if `piece` is `Piece::Pawn`, since pawn attacks depend on color.
pub fn piece_attacks(piece: Piece, sq: Square, occ: Bitboard) -> Bitboard {
    match piece {
        Piece::Knight => knight_attacks(sq),
        Piece::Bishop => bishop_attacks(sq, occ),
        Piece::Rook => rook_attacks(sq, occ),
        Piece::Queen => queen_attacks(sq, occ),
        Piece::King => king_attacks(sq),
        Piece::Pawn => panic!("pawn attacks depend on color"),
    }
}

/// Computes the squares attacked from `sq` by a non-pawn piece on an otherwise empty board
#[inline]
pub fn pseudo_attacks(piece: Piece, sq: Square) -> Bitboard {
    piece_attacks(piece, sq, Bitboard::new())
}

/// Returns the squares strictly between `a` and `b` if they share a rank, file or diagonal,
/// and the empty set otherwise.
///
/// # Example
/// ```
/// use reprise::chess::Square;
/// use reprise::chess::bitboard::between;
///
/// let squares: Vec<_> = between(Square::A1, Square::D4).into_iter().collect();
/// assert_eq!(squares, vec![Square::B2, Square::C3]);
/// assert!(between(Square::A1, Square::B3).is_empty());
/// ```
#[inline]
pub fn between(a: Square, b: Square) -> Bitboard {
    BETWEEN[a as usize * Square::COUNT + b as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knight_and_king_attack_counts() {
        assert_eq!(knight_attacks(Square::A1).len(), 2);
        assert_eq!(knight_attacks(Square::D4).len(), 8);
        assert_eq!(king_attacks(Square::H8).len(), 3);
        assert_eq!(king_attacks(Square::E4).len(), 8);
        assert!(knight_attacks(Square::G1).contains(Square::F3));
    }

    #[test]
    fn pawn_attacks_point_forward() {
        let white: Vec<_> = pawn_attacks(Color::White, Square::E4).into_iter().collect();
        assert_eq!(white, vec![Square::D5, Square::F5]);
        let black: Vec<_> = pawn_attacks(Color::Black, Square::A5).into_iter().collect();
        assert_eq!(black, vec![Square::B4]);
    }

    #[test]
    fn sliders_stop_at_blockers() {
        let occ = Bitboard::from(Square::D6) | Square::F4.into();
        let att = rook_attacks(Square::D4, occ);
        assert!(att.contains(Square::D6));
        assert!(!att.contains(Square::D7));
        assert!(att.contains(Square::F4));
        assert!(!att.contains(Square::G4));
        assert_eq!(att.len(), 2 + 3 + 2 + 3);

        assert_eq!(bishop_attacks(Square::A1, Bitboard::new()).len(), 7);
        assert_eq!(queen_attacks(Square::D4, Bitboard::new()).len(), 27);
    }

    #[test]
    fn empty_board_attacks_are_symmetric() {
        for &p in &[Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen, Piece::King] {
            for a in Square::all() {
                for b in pseudo_attacks(p, a) {
                    assert!(pseudo_attacks(p, b).contains(a), "{} {} {}", p, a, b);
                }
            }
        }
    }

    #[test]
    fn between_is_symmetric_and_exclusive() {
        assert_eq!(between(Square::E1, Square::H1).len(), 2);
        assert_eq!(between(Square::H1, Square::E1), between(Square::E1, Square::H1));
        assert!(between(Square::E1, Square::F1).is_empty());
        assert!(between(Square::G1, Square::F3).is_empty());
        assert!(between(Square::C3, Square::C3).is_empty());
        assert_eq!(between(Square::H8, Square::A1).len(), 6);
    }
}
