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

//! Name-based matching of folders across two trees.

use crate::store::provider::Folder;
use crate::support::error::Error;

/// Find an immediate child of `parent` whose name matches `name`, ignoring
/// ASCII case.
///
/// Only direct children are considered. If duplicate-named children exist,
/// the first in provider enumeration order wins, so repeated runs always
/// land on the same folder. The tree is never mutated.
pub fn find_child_by_name<F: Folder>(
    parent: &F,
    name: &str,
) -> Result<Option<F>, Error> {
    for child in parent.children()? {
        if child.name().eq_ignore_ascii_case(name) {
            return Ok(Some(child));
        }
    }

    Ok(None)
}
