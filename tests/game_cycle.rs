//! Compares upcoming-cycle detection against trying every reversible move
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::cmp;
use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use reprise::chess::{MoveType, Position, Square};
use reprise::game::Game;
use reprise::repetition::History;

const POSITIONS: [&str; 5] = [
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1",
    "4k3/8/2n5/8/3B4/8/5N2/4K2R w K - 0 1",
    "6k1/5ppp/8/3q4/8/2B5/5PPP/3R2K1 w - - 0 1",
    "8/3k4/8/1r6/8/4Q3/8/2K5 b - - 0 1",
];

// legal moves from `pos` in coordinate notation, with their reversibility and resulting positions
fn legal_moves(pos: &Position) -> Vec<(String, bool, Position)> {
    let mut moves = Vec::new();
    for orig in pos.occupied_by(pos.turn()) {
        for dest in Square::all() {
            if let Ok(mv) = pos.validate_move(orig, dest, MoveType::Standard) {
                if let Ok(next) = mv.make() {
                    moves.push((mv.to_string(), mv.is_reversible(), next));
                }
            }
        }
    }
    moves
}

// tries every pseudo-legal reversible move and looks for the result among the earlier positions
fn brute_force(history: &History, pos: &Position) -> bool {
    let end = cmp::min(history.reversible_plies(), pos.draw_plies());
    if end < 3 {
        return false;
    }
    let n = history.len() - 1;

    for orig in pos.occupied_by(pos.turn()) {
        for dest in Square::all() {
            let mv = match pos.validate_move(orig, dest, MoveType::Standard) {
                Ok(mv) if mv.is_reversible() => mv,
                _ => continue,
            };
            let key = mv.make_unchecked().zobrist_key();
            let found = (3..=end).step_by(2)
                .any(|dist| history.get(n - dist).map(|r| r.key()) == Some(key));
            if found {
                return true;
            }
        }
    }

    false
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn cuckoo_agrees_with_brute_force(index in 0..POSITIONS.len(), seed in any::<u64>(), len in 8usize..48) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut game = Game::starting_at(POSITIONS[index].parse().unwrap());

        for _ in 0..len {
            let pos = game.position();
            let expected = brute_force(game.history(), pos);
            prop_assert_eq!(game.history().has_game_cycle(pos, usize::MAX), expected, "{}", pos);
            for ply in 0..game.ply() {
                prop_assert!(!game.has_game_cycle(ply) || expected, "{} at ply {}", pos, ply);
            }

            let moves = legal_moves(pos);
            // head back to an earlier position half of the time, so cycles actually occur
            let returning: Vec<_> = moves.iter()
                .filter(|(_, reversible, next)| {
                    *reversible && game.history().iter().any(|r| r.key() == next.zobrist_key())
                })
                .collect();
            let choice = if !returning.is_empty() && rng.gen_bool(0.5) {
                returning.choose(&mut rng).map(|(s, _, _)| s.clone())
            } else {
                let quiet: Vec<_> = moves.iter().filter(|(_, reversible, _)| *reversible).collect();
                if !quiet.is_empty() && rng.gen_bool(0.9) {
                    quiet.choose(&mut rng).map(|(s, _, _)| s.clone())
                } else {
                    moves.choose(&mut rng).map(|(s, _, _)| s.clone())
                }
            };

            match choice {
                Some(s) => { game.make_move_from_str(&s).unwrap(); },
                None => break,
            }
        }
    }
}

#[test]
fn king_shuffle_agrees_with_brute_force() {
    // pawn moves are left out, so the span covers every ply
    let fen = "7k/8/8/8/8/8/PPP5/K7 w - - 0 1";
    let mut game = Game::starting_at(fen.parse().unwrap());
    for mv in &["a1b1", "h8g8", "b1a1", "g8h8"] {
        game.make_move_from_str(mv).unwrap();
        let pos = game.position();
        assert_eq!(game.history().has_game_cycle(pos, usize::MAX), brute_force(game.history(), pos));
    }
    assert!(game.is_repetition(4));
}
