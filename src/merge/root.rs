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

//! Resolution of a store's canonical top-level content folder.
//!
//! The authoritative path reads the store's content-root structural
//! property and resolves the identifier it names. Some store/provider
//! combinations omit or mis-populate that property, so a linear scan of the
//! session's top-level folders serves as the fallback.

use log::debug;

use crate::store::provider::{
    same_store_path, Folder, PropertyValue, Session, Store,
    PROP_CONTENT_ROOT_ENTRY_ID,
};
use crate::support::error::Error;
use crate::support::hex_id;

/// Resolve the root content folder of the attached store at `store_path`.
///
/// Failure is reported as `Error::RootNotFound` and is fatal only for that
/// one store; callers skip the store and keep the run going.
pub fn resolve_root<S: Session>(
    session: &S,
    store_path: &str,
) -> Result<S::Folder, Error> {
    // Property resolution failures fall through to the scan rather than
    // aborting; they are surfaced as diagnostics only.
    match resolve_by_property(session, store_path) {
        Ok(Some(folder)) => return Ok(folder),
        Ok(None) => (),
        Err(e) => debug!(
            "structural property resolution failed for {}: {}",
            store_path, e
        ),
    }

    for folder in session.top_level_folders()? {
        match folder.owning_store() {
            Ok(store) if same_store_path(&store.path(), store_path) => {
                return Ok(folder)
            }
            Ok(_) => (),
            // One unreadable folder must not abort the scan.
            Err(e) => debug!("skipping unreadable top-level folder: {}", e),
        }
    }

    Err(Error::RootNotFound)
}

fn resolve_by_property<S: Session>(
    session: &S,
    store_path: &str,
) -> Result<Option<S::Folder>, Error> {
    let store = match session
        .stores()?
        .into_iter()
        .find(|s| same_store_path(&s.path(), store_path))
    {
        Some(store) => store,
        None => return Ok(None),
    };

    let entry_id = match store.structural_property(PROP_CONTENT_ROOT_ENTRY_ID)?
    {
        Some(PropertyValue::Text(s)) => s,
        Some(PropertyValue::Bytes(b)) => hex_id::encode_upper(&b),
        None => return Ok(None),
    };

    session.resolve_folder_by_id(&entry_id, &store.store_id())
}
