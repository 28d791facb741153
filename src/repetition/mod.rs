//! Detects repeated positions and upcoming cycles during a game or search.
//!
//! A [`History`] records the Zobrist key of every position reached. `detect_repetition` reports
//! whether the latest position has occurred before, and `has_game_cycle` reports whether the side
//! to move could recreate an earlier position with a single reversible move, using the
//! [`CuckooTable`] instead of generating moves.
//!
//! [`History`]: history/struct.History.html
//! [`CuckooTable`]: cuckoo/struct.CuckooTable.html
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use crate::chess::zobrist;

pub mod cuckoo;
pub mod history;

pub use cuckoo::{CuckooTable, ReversibleMove};
pub use history::{History, Record};

/// Generates the Zobrist keys and then builds the cuckoo table from them.
///
/// Both happen on first use anyway. Calling this at startup moves the cost out of the first
/// search.
pub fn init() {
    zobrist::init();
    cuckoo::init();
}
