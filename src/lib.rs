//-
// Copyright (c) 2026, the Mergebox authors
//
// This file is part of Mergebox.
//
// Mergebox is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// Mergebox is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along
// with Mergebox. If not, see <http://www.gnu.org/licenses/>.

//! Mergebox merges the contents of several hierarchical mail stores into a
//! single destination store, preserving folder structure and reconciling
//! folders that exist by name in both trees.
//!
//! The crate is organised around a capability boundary: the merge traversal
//! (`merge`) only ever manipulates stores, folders and items through the
//! traits in [`store::provider`]. How a store is actually opened, enumerated
//! or persisted is the concern of whichever provider implements those
//! traits; [`store::memory`] is the in-memory reference implementation.
//!
//! The main entry point is [`merge::coordinator::merge_stores`].

#[cfg(test)]
macro_rules! assert_matches {
    ($expected:pat, $actual:expr) => {
        match $actual {
            $expected => (),
            unexpected => panic!(
                "Expected {} matches {}, got {:?}",
                stringify!($expected),
                stringify!($actual),
                unexpected
            ),
        }
    };
}

pub mod merge;
pub mod store;
pub mod support;

pub use crate::merge::coordinator::merge_stores;
pub use crate::merge::progress::{CancelFlag, ProgressSink};
pub use crate::support::error::Error;
