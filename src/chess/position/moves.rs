//! Contains structures to represent and apply moves
//
//  Copyright 2019 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use super::*;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The type of move
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MoveType {
    /// Any move which is not castling, a two-square pawn advancement, en-passant capture, or pawn
    /// promotion
    Standard,
    /// A castling move
    Castling,
    /// A two-square pawn advancement
    Advance2,
    /// An en passant capture
    EnPassant,
    /// A pawn promotion to the given piece type
    Promotion(Promotion),
}

impl Default for MoveType {
    fn default() -> Self {
        MoveType::Standard
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Which piece to promote to for a promotion move
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Promotion {
    ToKnight,
    ToBishop,
    ToRook,
    ToQueen,
}

impl Default for Promotion {
    fn default() -> Self {
        Promotion::ToQueen
    }
}

impl From<Promotion> for Piece {
    fn from(prom: Promotion) -> Self {
        match prom {
            Promotion::ToKnight => Knight,
            Promotion::ToBishop => Bishop,
            Promotion::ToRook => Rook,
            Promotion::ToQueen => Queen,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A valid (pseudo-legal) move from a specific position.
///
/// Note that the move might not be fully legal, specifically, it may leave the mover in check or
/// involve castling through check. Use `Move::make()` to verify full legality.
///
/// Cannot outlive the position it is tied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move<'a> {
    pub (super) pos: &'a Position,
    pub (super) piece: Piece,
    pub (super) orig: Square,
    pub (super) dest: Square,
    pub (super) capt_pc: Option<Piece>,
    pub (super) move_type: MoveType,
}

impl<'a> Move<'a> {
    /// Returns the position from which this move is valid.
    pub fn position(&self) -> &Position {
        self.pos
    }
    /// Returns the piece to be moved.
    pub fn piece(&self) -> Piece {
        self.piece
    }
    /// Returns the origin of the moved piece.
    pub fn origin(&self) -> Square {
        self.orig
    }
    /// Returns the destination of the moved piece.
    pub fn destination(&self) -> Square {
        self.dest
    }
    /// Returns the captured piece, if any.
    pub fn captured_piece(&self) -> Option<Piece> {
        self.capt_pc
    }
    /// Returns the type of move.
    pub fn move_type(&self) -> MoveType {
        self.move_type
    }
    /// Returns `true` if the move is a capture.
    pub fn is_capture(&self) -> bool {
        self.capt_pc.is_some()
    }

    /// Returns the castling flags the mover gives up by making this move
    pub fn castling_rights_lost(&self) -> u8 {
        let rights = self.pos.castling_rights[self.pos.turn as usize];
        let home = Rank::home(self.pos.turn);

        if self.orig == Square::from_coord(File::E, home) && self.piece == King {
            rights
        } else if self.orig == Square::from_coord(File::H, home) {
            rights & CASTLE_KING_SIDE
        } else if self.orig == Square::from_coord(File::A, home) {
            rights & CASTLE_QUEEN_SIDE
        } else {
            0
        }
    }

    /// Returns `true` if the position before the move can recur after it: the move is not a
    /// capture, not a pawn move, not castling, and gives up no castling rights.
    pub fn is_reversible(&self) -> bool {
        self.capt_pc.is_none()
            && self.piece != Pawn
            && self.move_type != MoveType::Castling
            && self.castling_rights_lost() == 0
    }

    /// Make the move, returning the resulting position.
    ///
    /// Fails if the mover castles out of or through check, or leaves their own king under attack.
    pub fn make(&self) -> Result<Position> {
        if self.move_type == MoveType::Castling {
            let passed = Square::from_coord(
                if self.dest.file() == File::G { File::F } else { File::D },
                self.orig.rank(),
            );
            if self.pos.in_check || self.pos.square_attacked_by(passed, !self.pos.turn) {
                return Err(Error::CastlingThroughCheck);
            }
        }

        let pos = self.make_unchecked();
        if pos.square_attacked_by(pos.king_location(!pos.turn), pos.turn) {
            return Err(Error::SelfCheck);
        }

        Ok(pos)
    }

    /// Make the move without checking the safety of the mover's king, returning the resulting
    /// position.
    pub fn make_unchecked(&self) -> Position {
        let mut pos = self.pos.clone();
        let us = pos.turn;
        let them = !us;

        // clear captured piece (including en passant)
        if let Some(capt_pc) = self.capt_pc {
            let sq = if self.move_type == MoveType::EnPassant {
                Square::from_coord(self.dest.file(), self.orig.rank())
            } else {
                self.dest
            };

            let mask: Bitboard = sq.into();
            pos.occ_squares ^= mask;
            pos.occ_by_color[them as usize] ^= mask;
            pos.occ_by_piece[them as usize][capt_pc as usize] ^= mask;
            pos.zobrist.toggle_piece_placement(them, capt_pc, sq);

            // a rook captured in its corner takes its castling right with it
            let home = Rank::home(them);
            let lost = if sq == Square::from_coord(File::H, home) {
                pos.castling_rights[them as usize] & CASTLE_KING_SIDE
            } else if sq == Square::from_coord(File::A, home) {
                pos.castling_rights[them as usize] & CASTLE_QUEEN_SIDE
            } else {
                0
            };
            pos.castling_rights[them as usize] &= !lost;
            pos.zobrist.toggle_castling_rights(them, lost);
        }

        // move piece to new location (update piece type if promotion)
        let mask = Bitboard::from(self.orig) | self.dest.into();
        pos.occ_squares ^= mask;
        pos.occ_by_color[us as usize] ^= mask;
        pos.occ_by_piece[us as usize][self.piece as usize] ^= self.orig.into();
        pos.zobrist.toggle_piece_placement(us, self.piece, self.orig);
        let placed = match self.move_type {
            MoveType::Promotion(prom) => Piece::from(prom),
            _ => self.piece,
        };
        pos.occ_by_piece[us as usize][placed as usize] ^= self.dest.into();
        pos.zobrist.toggle_piece_placement(us, placed, self.dest);

        // move rook for castling moves
        if self.move_type == MoveType::Castling {
            let rank = self.orig.rank();
            let (orig, dest) = if self.dest.file() == File::G {
                (Square::from_coord(File::H, rank), Square::from_coord(File::F, rank))
            } else {
                (Square::from_coord(File::A, rank), Square::from_coord(File::D, rank))
            };

            let mask = Bitboard::from(orig) | dest.into();
            pos.occ_squares ^= mask;
            pos.occ_by_color[us as usize] ^= mask;
            pos.occ_by_piece[us as usize][Rook as usize] ^= mask;
            pos.zobrist.toggle_piece_placement(us, Rook, orig);
            pos.zobrist.toggle_piece_placement(us, Rook, dest);
        }

        // update en passant square
        if let Some(ep_sq) = pos.ep_square {
            pos.zobrist.toggle_ep_square(ep_sq);
        }
        pos.ep_square = if self.move_type == MoveType::Advance2 {
            between(self.orig, self.dest).peek()
        } else {
            None
        };
        if let Some(ep_sq) = pos.ep_square {
            pos.zobrist.toggle_ep_square(ep_sq);
        }

        let lost = self.castling_rights_lost();
        pos.castling_rights[us as usize] &= !lost;
        pos.zobrist.toggle_castling_rights(us, lost);

        // switch turns
        pos.turn = them;
        pos.zobrist.toggle_turn();

        // update move counters
        if pos.turn == White {
            pos.move_num += 1;
        }
        if self.capt_pc.is_some() || self.piece == Pawn {
            pos.draw_plies = 0;
        } else {
            pos.draw_plies += 1;
        }

        pos.in_check = pos.square_attacked_by(pos.king_location(them), us);

        pos
    }
}

impl<'a> fmt::Display for Move<'a> {
    /// Formats the move in coordinate notation (eg g1f3, e7e8q, or e1g1)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = format!("{}{}", self.orig, self.dest);
        if let MoveType::Promotion(prom) = self.move_type {
            s += &Piece::from(prom).to_string().to_lowercase();
        }
        fmt::Display::fmt(&s, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(fen: &str, moves: &[&str]) -> Position {
        let mut pos: Position = fen.parse().unwrap();
        for mv in moves {
            pos = pos.move_from_str(mv).unwrap().make().unwrap();
        }
        pos
    }

    // incremental keys must equal keys computed from scratch
    fn assert_consistent(pos: &Position) {
        let fresh: Position = pos.to_fen_str().parse().unwrap();
        assert_eq!(pos.zobrist_key(), fresh.zobrist_key(), "{}", pos);
        assert_eq!(*pos, fresh);
    }

    #[test]
    fn knight_moves_return_to_the_same_key() {
        let start = Position::new();
        let pos = play(START_FEN, &["g1f3", "g8f6", "f3g1", "f6g8"]);
        assert_eq!(pos.zobrist_key(), start.zobrist_key());
        assert_eq!(pos.draw_plies(), 4);
        assert_eq!(pos.move_number(), 3);
    }

    #[test]
    fn incremental_keys_match_recalculation() {
        assert_consistent(&play(START_FEN, &["e2e4"]));
        assert_consistent(&play(START_FEN, &["e2e4", "d7d5", "e4d5", "d8d5", "b1c3"]));
        assert_consistent(&play("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", &["e1g1", "a8a1"]));
        assert_consistent(&play("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", &["a1a8"]));
        assert_consistent(&play("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 3", &["e5d6"]));
        assert_consistent(&play("4k3/P7/8/8/8/8/8/4K3 w - - 0 1", &["a7a8r"]));
    }

    #[test]
    fn castling_moves_the_rook_and_clears_rights() {
        let pos = play("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", &["e1c1"]);
        assert_eq!(pos.piece_at(Square::D1), Some((White, Rook)));
        assert_eq!(pos.piece_at(Square::C1), Some((White, King)));
        assert_eq!(pos.piece_at(Square::A1), None);
        assert_eq!(pos.castling_rights(White), 0);
        assert_eq!(pos.castling_rights(Black), CASTLE_BOTH_SIDES);
    }

    #[test]
    fn capturing_a_rook_clears_the_opponents_right() {
        let pos = play("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", &["h1h8"]);
        assert_eq!(pos.castling_rights(White), CASTLE_QUEEN_SIDE);
        assert_eq!(pos.castling_rights(Black), CASTLE_QUEEN_SIDE);
    }

    #[test]
    fn en_passant_removes_the_passed_pawn() {
        let pos = play("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 3", &["e5d6"]);
        assert_eq!(pos.piece_at(Square::D5), None);
        assert_eq!(pos.piece_at(Square::D6), Some((White, Pawn)));
        assert_eq!(pos.ep_square(), None);

        let pos = play(START_FEN, &["e2e4"]);
        assert_eq!(pos.ep_square(), Some(Square::E3));
        assert_eq!(pos.draw_plies(), 0);
    }

    #[test]
    fn make_rejects_self_check_and_castling_through_check() {
        let pos: Position = "4k3/8/8/8/8/8/4r3/R3K2R w KQ - 0 1".parse().unwrap();
        assert!(pos.in_check());
        assert_eq!(pos.move_from_str("e1g1").unwrap().make().err(), Some(Error::CastlingThroughCheck));
        assert_eq!(pos.move_from_str("a1a2").unwrap().make().err(), Some(Error::SelfCheck));
        assert!(pos.move_from_str("a1a2").unwrap().make_unchecked().zobrist_key() != pos.zobrist_key());

        let pos: Position = "4k3/8/8/8/8/8/5r2/R3K2R w KQ - 0 1".parse().unwrap();
        assert_eq!(pos.move_from_str("e1g1").unwrap().make().err(), Some(Error::CastlingThroughCheck));
        assert!(pos.move_from_str("e1c1").unwrap().make().is_ok());
    }

    #[test]
    fn reversibility() {
        let pos: Position = "r3k2r/8/8/8/8/8/8/R3K1NR w KQkq - 0 1".parse().unwrap();
        let rev = |s: &str| pos.move_from_str(s).unwrap().is_reversible();
        assert!(rev("g1f3"));
        assert!(!rev("a1b1"));
        assert!(!rev("h1h2"));
        assert!(!rev("e1d1"));
        assert!(!rev("e1c1"));
        assert!(!rev("a1a8"));

        let pos: Position = "4k3/8/8/8/8/8/4P3/R3K3 w - - 0 1".parse().unwrap();
        assert!(pos.move_from_str("a1b1").unwrap().is_reversible());
        assert!(pos.move_from_str("e1d1").unwrap().is_reversible());
        assert!(!pos.move_from_str("e2e3").unwrap().is_reversible());
    }

    #[test]
    fn coordinate_display() {
        let pos: Position = "4k3/P7/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        assert_eq!(pos.move_from_str("a7a8n").unwrap().to_string(), "a7a8n");
        assert_eq!(Position::new().move_from_str("g1f3").unwrap().to_string(), "g1f3");
    }
}
