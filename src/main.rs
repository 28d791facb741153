//! Replays a sequence of moves and reports repetitions and upcoming cycles after each ply.
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
#![warn(missing_docs, missing_debug_implementations, unused_extern_crates)]
#![warn(clippy::unimplemented, clippy::todo)]
#![warn(clippy::option_unwrap_used, clippy::result_unwrap_used)]

use std::fs::File;
use std::path::PathBuf;
use clap::{App, Arg, crate_version};
use log::info;
use simplelog::{WriteLogger, LevelFilter, Config};
use reprise::chess::Position;
use reprise::chess::position::START_FEN;
use reprise::game::Game;
use reprise::repetition;

fn main() -> Result<(), Error> {
    let matches =
        App::new("reprise")
            .version(crate_version!())
            .author("Mike Leany")
            .about("Replays moves in coordinate notation (eg g1f3 or e7e8q) and reports, after \
                    each ply,\nwhether the position is a repetition and whether a reversible \
                    move can recreate an\nearlier position.")
            .arg(Arg::with_name("fen")
                .long("fen")
                .value_name("FEN_STRING")
                .takes_value(true)
                .default_value(START_FEN)
                .hide_default_value(true)
                .help("Initial position in Forsyth-Edwards Notation (FEN). Defaults to the \
                       standard starting position."))
            .arg(Arg::with_name("log")
                .long("log")
                .short("l")
                .help("Turns on logging"))
            .arg(Arg::with_name("log-file")
                .long("log-file")
                .value_name("LOG_FILE")
                .takes_value(true)
                .default_value("reprise.log")
                .help("Sets the log file if logging is turned on"))
            .arg(Arg::with_name("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .takes_value(true)
                .possible_values(&["off", "error", "warn", "info", "debug", "trace"])
                .default_value("info")
                .help("Sets the log level if logging is turned on"))
            .arg(Arg::with_name("moves")
                .value_name("MOVES")
                .multiple(true)
                .help("Moves to replay from the initial position"))
            .get_matches();

    let log_file = PathBuf::from(matches.value_of_os("log-file").expect("INFALLIBLE"));
    let log_level = match matches.value_of("log-level") {
        Some("off") => LevelFilter::Off,
        Some("error") => LevelFilter::Error,
        Some("warn") => LevelFilter::Warn,
        Some("info") => LevelFilter::Info,
        Some("debug") => LevelFilter::Debug,
        Some("trace") => LevelFilter::Trace,
        Some(level) => return Err(Error(format!("{}: invalid log level", level))),
        None => unreachable!(),
    };

    if matches.is_present("log") {
        let file = File::create(&log_file).map_err(|err| {
            Error(format!("{}: {}", log_file.display(), err))
        })?;
        WriteLogger::init(log_level, Config::default(), file)
            .map_err(|err| Error(err.to_string()))?;
    }

    repetition::init();

    let fen = matches.value_of("fen").expect("INFALLIBLE");
    let pos: Position = fen.parse().map_err(|err| Error(format!("{}: {}", fen, err)))?;
    info!("replaying from {}", pos);
    let mut game = Game::starting_at(pos);

    println!("{:>4}  {:<6}  {:<16}  {:<5}  {:<5}  {:<5}", "ply", "move", "key", "rev", "rep", "cycle");
    print_ply(&game, "-");

    for mv in matches.values_of("moves").into_iter().flatten() {
        let ply = game.ply() + 1;
        game.make_move_from_str(mv).map_err(|err| Error(format!("ply {}: {}: {}", ply, mv, err)))?;
        print_ply(&game, mv);
    }

    info!("final position {}", game.position());
    println!("\n{}", game.position());

    Ok(())
}

// the replayed game has no search, so every position is treated as the root
fn print_ply(game: &Game, mv: &str) {
    let record = game.history().last().expect("INFALLIBLE");
    let yes_no = |b: bool| if b { "yes" } else { "no" };

    println!("{:>4}  {:<6}  {:016x}  {:<5}  {:<5}  {:<5}",
        game.ply(),
        mv,
        record.key(),
        yes_no(record.reversible()),
        yes_no(game.is_repetition(0)),
        yes_no(game.has_game_cycle(0)));
}

struct Error(String);

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for Error { }
