//! Contains structures related to the `Position`
//
//  Copyright 2019 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::convert::TryInto;
use std::fmt;
use lazy_static::lazy_static;
use regex::Regex;
use super::*;

use bitboard::*;

use Color::*;
use Piece::*;

pub mod zobrist;
pub mod moves;

use zobrist::Zobrist;
use moves::{Move, MoveType, Promotion};

/// FEN string for the standard starting position
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Castling flag for the king side
pub const CASTLE_KING_SIDE: u8 = 0x1;
/// Castling flag for the queen side
pub const CASTLE_QUEEN_SIDE: u8 = 0x2;
/// Both castling flags
pub const CASTLE_BOTH_SIDES: u8 = CASTLE_KING_SIDE | CASTLE_QUEEN_SIDE;

lazy_static! {
    static ref COORD_MOVE: Regex = Regex::new(r"^([a-h][1-8])([a-h][1-8])([nbrqNBRQ])?$")
        .expect("INFALLIBLE");
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A representation of the arrangement of pieces on the board at a given point in the game, as well
/// as castling availability and en passant legality.
#[allow(missing_copy_implementations,)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    zobrist: Zobrist,
    occ_squares: Bitboard,
    occ_by_color: [Bitboard; Color::COUNT],
    occ_by_piece: [[Bitboard; Piece::COUNT]; Color::COUNT],
    turn: Color,

    in_check: bool,
    ep_square: Option<Square>,
    castling_rights: [u8; Color::COUNT],

    draw_plies: usize,
    move_num: usize,
}

impl Position {
    /// Returns the standard starting Position
    pub fn new() -> Position {
        Position::from_fen_str(START_FEN).expect("INFALLIBLE")
    }

    fn empty_board() -> Position {
        Position {
            zobrist: Zobrist::new(),
            occ_squares: Bitboard::new(),
            occ_by_color: [Bitboard::new(); Color::COUNT],
            occ_by_piece: [[Bitboard::new(); Piece::COUNT]; Color::COUNT],
            turn: White,
            in_check: false,
            ep_square: None,
            castling_rights: [0, 0],
            draw_plies: 0,
            move_num: 1,
        }
    }

    fn put_piece(&mut self, c: Color, p: Piece, sq: Square) {
        self.occ_squares.insert(sq);
        self.occ_by_color[c as usize].insert(sq);
        self.occ_by_piece[c as usize][p as usize].insert(sq);
    }

    /// Parse a position from a FEN string
    ///
    /// The half move clock and move number may be omitted, in which case they default to 0 and
    /// 1 respectively.
    pub fn from_fen_str(s: &str) -> Result<Position> {
        let mut pos = Position::empty_board();
        let mut fields = s.split_whitespace();

        // parse the board, from rank 8 down to rank 1
        let board = fields.next().ok_or(Error::ParseError)?;
        let mut r = Rank::COUNT - 1;
        let mut f = 0;
        for c in board.chars() {
            match c {
                '1'..='8' => {
                    f += c.to_digit(10).expect("INFALLIBLE") as usize;
                    if f > File::COUNT {
                        return Err(Error::ParseError);
                    }
                }
                '/' => {
                    if f == File::COUNT && r > 0 {
                        r -= 1;
                        f = 0;
                    } else {
                        return Err(Error::ParseError);
                    }
                }
                _ => {
                    let sq = Square::from_coord(f.try_into()?, r.try_into()?);
                    let color = if c.is_ascii_uppercase() { White } else { Black };
                    let piece: Piece = c.to_string().parse()?;
                    pos.put_piece(color, piece, sq);
                    f += 1;
                }
            }
        }
        if r > 0 || f != File::COUNT {
            return Err(Error::ParseError);
        }

        pos.turn = fields.next().ok_or(Error::ParseError)?.parse()?;

        match fields.next() {
            Some("-") => {},
            Some(castling_flags) => {
                for c in castling_flags.chars() {
                    match c {
                        'K' => pos.castling_rights[White as usize] |= CASTLE_KING_SIDE,
                        'Q' => pos.castling_rights[White as usize] |= CASTLE_QUEEN_SIDE,
                        'k' => pos.castling_rights[Black as usize] |= CASTLE_KING_SIDE,
                        'q' => pos.castling_rights[Black as usize] |= CASTLE_QUEEN_SIDE,
                        _ => return Err(Error::ParseError),
                    }
                }
            },
            None => return Err(Error::ParseError),
        }

        match fields.next() {
            Some("-") => {},
            Some(ep_square) => pos.ep_square = Some(ep_square.parse()?),
            None => return Err(Error::ParseError),
        }

        if let Some(plies) = fields.next() {
            pos.draw_plies = plies.parse().map_err(|_| Error::ParseError)?;
        }
        if let Some(move_num) = fields.next() {
            pos.move_num = move_num.parse().map_err(|_| Error::ParseError)?;
        }
        if fields.next().is_some() {
            return Err(Error::ParseError);
        }

        pos.validate()?;
        pos.in_check = pos.square_attacked_by(pos.king_location(pos.turn), !pos.turn);
        pos.calc_zobrist();

        Ok(pos)
    }

    // checks that a freshly parsed position could occur in a game
    fn validate(&self) -> Result<()> {
        for &c in Color::ALL.iter() {
            if self.occupied_by_piece(c, King).len() != 1 {
                return Err(Error::InvalidKingCount);
            }
            if self.occupied_by_piece(c, Pawn).intersects(Bitboard::from(Rank::R1) | Rank::R8.into()) {
                return Err(Error::InvalidPawnRank);
            }
        }

        if self.square_attacked_by(self.king_location(!self.turn), self.turn) {
            return Err(Error::KingCapturable);
        }

        if let Some(ep_square) = self.ep_square {
            if self.occ_squares.contains(ep_square) {
                return Err(Error::EnPassantSquareOccupied);
            }
            let (ep_rank, forward) = if self.turn == White { (Rank::R6, 1) } else { (Rank::R3, -1) };
            let pawn_sq = ep_square.offset(0, -forward);
            if ep_square.rank() != ep_rank
                || pawn_sq.map(|sq| self.piece_at(sq)) != Some(Some((!self.turn, Pawn))) {
                return Err(Error::MissingEnPassantPawn);
            }
        }

        for &c in Color::ALL.iter() {
            let rights = self.castling_rights[c as usize];
            if rights == 0 {
                continue;
            }
            let r = Rank::home(c);
            let rooks = self.occupied_by_piece(c, Rook);
            if self.king_location(c) != Square::from_coord(File::E, r)
                || (rights & CASTLE_KING_SIDE != 0 && !rooks.contains(Square::from_coord(File::H, r)))
                || (rights & CASTLE_QUEEN_SIDE != 0 && !rooks.contains(Square::from_coord(File::A, r))) {
                return Err(Error::InvalidCastlingFlags);
            }
        }

        Ok(())
    }

    /// Converts the position to a FEN string
    pub fn to_fen_str(&self) -> String {
        let mut board = String::new();

        for r in (0..Rank::COUNT).rev() {
            let rank: Rank = r.try_into().expect("INFALLIBLE");
            let mut empty = 0;
            for f in 0..File::COUNT {
                let sq = Square::from_coord(f.try_into().expect("INFALLIBLE"), rank);
                match self.piece_at(sq) {
                    Some((c, p)) => {
                        if empty > 0 {
                            board += &empty.to_string();
                            empty = 0;
                        }
                        if c == White {
                            board += &p.to_string();
                        } else {
                            board += &p.to_string().to_lowercase();
                        }
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                board += &empty.to_string();
            }
            if r > 0 {
                board += "/";
            }
        }

        let mut castling = String::new();
        for &(c, flag, ch) in &[
            (White, CASTLE_KING_SIDE, 'K'), (White, CASTLE_QUEEN_SIDE, 'Q'),
            (Black, CASTLE_KING_SIDE, 'k'), (Black, CASTLE_QUEEN_SIDE, 'q'),
        ] {
            if self.castling_rights[c as usize] & flag != 0 {
                castling.push(ch);
            }
        }
        if castling.is_empty() {
            castling.push('-');
        }

        let ep_square = match self.ep_square {
            Some(sq) => sq.to_string(),
            None => "-".to_string(),
        };

        format!("{} {} {} {} {} {}", board, self.turn, castling, ep_square,
                                     self.draw_plies, self.move_num)
    }

    /// Returns the color whose turn it is
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// Returns `true` if the color to move is in check.
    pub fn in_check(&self) -> bool {
        self.in_check
    }

    /// Returns the number of consecutive plies without a capture or pawn move (the fifty move
    /// counter)
    pub fn draw_plies(&self) -> usize {
        self.draw_plies
    }

    /// Returns the full move number
    pub fn move_number(&self) -> usize {
        self.move_num
    }

    /// Returns the en passant square, if any
    pub fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    /// Returns the castling flags still held by color `c`
    pub fn castling_rights(&self, c: Color) -> u8 {
        self.castling_rights[c as usize]
    }

    /// Returns all occupied squares
    pub fn occupied(&self) -> Bitboard {
        self.occ_squares
    }

    /// Returns the squares occupied by color `c`
    pub fn occupied_by(&self, c: Color) -> Bitboard {
        self.occ_by_color[c as usize]
    }

    /// Returns the squares occupied by pieces of color `c` and type `p`
    pub fn occupied_by_piece(&self, c: Color, p: Piece) -> Bitboard {
        self.occ_by_piece[c as usize][p as usize]
    }

    /// Returns the square where the king of the given color is located
    pub fn king_location(&self, c: Color) -> Square {
        self.occupied_by_piece(c, King).peek().expect("INFALLIBLE")
    }

    /// Returns the color and type of piece, if any, at the given location
    pub fn piece_at(&self, sq: Square) -> Option<(Color, Piece)> {
        if !self.occ_squares.contains(sq) {
            return None;
        }
        let c = if self.occ_by_color[White as usize].contains(sq) { White } else { Black };
        Piece::ALL.iter()
            .find(|&&p| self.occ_by_piece[c as usize][p as usize].contains(sq))
            .map(|&p| (c, p))
    }

    /// Return the position's Zobrist key
    pub fn zobrist_key(&self) -> Zobrist {
        self.zobrist
    }

    /// Validates the pseudo-legality of the move from `orig` to `dest`, with the given move type,
    /// and returns a `Move` tied to this position.
    ///
    /// `MoveType::Standard` may be passed when the move type is unknown. Note that this function
    /// does not validate if the move leaves the mover in check or if it involves castling through
    /// check. Use `Move::make()` to perform those validations.
    pub fn validate_move(&self, orig: Square, dest: Square, move_type: MoveType) -> Result<Move> {
        let mut valid_move_type = MoveType::Standard;

        // Step 1: determine move piece and validate piece of correct color at orig
        let piece = match self.piece_at(orig) {
            Some((c, p)) if c == self.turn => p,
            _ => return Err(Error::IllegalMove),
        };

        // Step 2: determine capture piece, if any, including en passant
        let capt_pc = match self.piece_at(dest) {
            Some((c, _)) if c == self.turn => return Err(Error::IllegalMove),
            Some((_, p)) => Some(p),
            None if piece == Pawn && Some(dest) == self.ep_square => {
                valid_move_type = MoveType::EnPassant;
                Some(Pawn)
            },
            None => None,
        };

        // Step 3: validate piece movement
        match piece {
            Pawn => {
                let (forward, initial) = if self.turn == White { (1, Rank::R2) } else { (-1, Rank::R7) };

                if capt_pc.is_some() {
                    if !pawn_attacks(self.turn, orig).contains(dest) {
                        return Err(Error::IllegalMove);
                    }
                } else if orig.offset(0, forward) == Some(dest) {
                    // single advance
                } else if orig.rank() == initial && orig.offset(0, 2 * forward) == Some(dest)
                    && between(orig, dest).is_disjoint(self.occ_squares) {
                    valid_move_type = MoveType::Advance2;
                } else {
                    return Err(Error::IllegalMove);
                }

                if dest.rank() == Rank::R1 || dest.rank() == Rank::R8 {
                    valid_move_type = match move_type {
                        MoveType::Promotion(_) => move_type,
                        _ => MoveType::Promotion(Promotion::ToQueen),
                    };
                }
            },
            King if self.is_castling_move(orig, dest) => {
                let rook_file = if dest.file() == File::G { File::H } else { File::A };
                let flag = if dest.file() == File::G { CASTLE_KING_SIDE } else { CASTLE_QUEEN_SIDE };
                let rook_sq = Square::from_coord(rook_file, orig.rank());
                if self.castling_rights[self.turn as usize] & flag == 0
                    || !between(orig, rook_sq).is_disjoint(self.occ_squares) {
                    return Err(Error::IllegalMove);
                }
                valid_move_type = MoveType::Castling;
            },
            _ => {
                if !piece_attacks(piece, orig, self.occ_squares).contains(dest) {
                    return Err(Error::IllegalMove);
                }
            },
        }

        // Step 4: validate move type (allowing Standard to be used as unknown)
        if move_type != valid_move_type && move_type != MoveType::Standard {
            return Err(Error::IllegalMove);
        }

        Ok(Move {
            pos: self,
            piece,
            orig,
            dest,
            capt_pc,
            move_type: valid_move_type,
        })
    }

    // a king move two files sideways from its home square
    fn is_castling_move(&self, orig: Square, dest: Square) -> bool {
        orig == Square::from_coord(File::E, Rank::home(self.turn))
            && dest.rank() == orig.rank()
            && (dest.file() == File::G || dest.file() == File::C)
    }

    /// Parses a move in coordinate notation (eg `g1f3` or `e7e8q`), validates the
    /// pseudo-legality of the move, and returns a `Move` tied to this position.
    ///
    /// Note that this function does not validate if the move leaves the mover in check or if it
    /// involves castling through check. Use `Move::make()` to perform those validations.
    pub fn move_from_str(&self, s: &str) -> Result<Move> {
        let caps = COORD_MOVE.captures(s.trim()).ok_or(Error::ParseError)?;
        let orig: Square = caps[1].parse()?;
        let dest: Square = caps[2].parse()?;
        let move_type = match caps.get(3) {
            Some(prom) => MoveType::Promotion(match prom.as_str().parse::<Piece>()? {
                Knight => Promotion::ToKnight,
                Bishop => Promotion::ToBishop,
                Rook => Promotion::ToRook,
                _ => Promotion::ToQueen,
            }),
            None => MoveType::Standard,
        };

        self.validate_move(orig, dest, move_type)
    }

    /// Calculate the positions's Zobrist key from scratch
    fn calc_zobrist(&mut self) {
        self.zobrist = Zobrist::new();

        if self.turn == Black {
            self.zobrist.toggle_turn();
        }

        if let Some(ep_square) = self.ep_square {
            self.zobrist.toggle_ep_square(ep_square);
        }

        for &c in Color::ALL.iter() {
            self.zobrist.toggle_castling_rights(c, self.castling_rights[c as usize]);
            for &p in Piece::ALL.iter() {
                for sq in self.occ_by_piece[c as usize][p as usize] {
                    self.zobrist.toggle_piece_placement(c, p, sq);
                }
            }
        }
    }

    /// Returns `true` if `sq` is attacked by a piece of color `c`.
    pub fn square_attacked_by(&self, sq: Square, c: Color) -> bool {
        let pieces = &self.occ_by_piece[c as usize];
        let diagonal = pieces[Bishop as usize] | pieces[Queen as usize];
        let straight = pieces[Rook as usize] | pieces[Queen as usize];

        bishop_attacks(sq, self.occ_squares).intersects(diagonal)
            || rook_attacks(sq, self.occ_squares).intersects(straight)
            || knight_attacks(sq).intersects(pieces[Knight as usize])
            || king_attacks(sq).intersects(pieces[King as usize])
            || pawn_attacks(!c, sq).intersects(pieces[Pawn as usize])
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::new()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_fen_str(), f)
    }
}

impl std::str::FromStr for Position {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Position::from_fen_str(s)
    }
}
