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

//! The capability boundary between the merge traversal and whatever actually
//! backs a mail store.
//!
//! The traversal code treats stores, folders and items purely as opaque
//! handles obtained through these traits. Handles are owned values; a
//! provider that needs to release backing resources does so when the handle
//! is dropped, so every exit path releases every handle without explicit
//! bookkeeping in the traversal.

use crate::support::error::Error;

/// Key of the well-known structural property identifying a store's content
/// subtree (its root folder) by an opaque entry identifier.
pub const PROP_CONTENT_ROOT_ENTRY_ID: &str = "content-root-entry-id";

/// Value of a store-level structural property.
///
/// Providers are free to hand identifiers back either as text or as a raw
/// byte sequence; byte sequences get a deterministic upper-case hex encoding
/// before use (see `support::hex_id`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropertyValue {
    Text(String),
    Bytes(Vec<u8>),
}

/// The closed set of content kinds a folder can declare as its default.
///
/// The merge core never inspects item contents; the kind exists only so a
/// newly created destination folder can be given the same declared default
/// as its source counterpart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemKind {
    Mail,
    Appointment,
    Contact,
    Task,
    Note,
}

/// An open provider session through which stores are attached and folders
/// resolved.
pub trait Session {
    type Store: Store;
    type Folder: Folder<Store = Self::Store>;

    /// Attach the store at `path`, creating it if the provider supports
    /// creation and nothing exists there yet.
    fn attach_store(&self, path: &str) -> Result<Self::Store, Error>;

    /// Detach a previously attached store.
    fn detach_store(&self, store: Self::Store) -> Result<(), Error>;

    /// Enumerate the currently attached stores.
    fn stores(&self) -> Result<Vec<Self::Store>, Error>;

    /// Resolve an (entry id, store id) pair to a folder handle.
    ///
    /// `Ok(None)` means the identifier is well-formed but names no folder in
    /// that store.
    fn resolve_folder_by_id(
        &self,
        entry_id: &str,
        store_id: &str,
    ) -> Result<Option<Self::Folder>, Error>;

    /// Enumerate the top-level folders of every attached store.
    fn top_level_folders(&self) -> Result<Vec<Self::Folder>, Error>;
}

/// An attached store.
pub trait Store {
    /// The path this store was attached from.
    fn path(&self) -> String;

    /// The provider-assigned opaque identifier of this store.
    fn store_id(&self) -> String;

    /// Read a store-level structural property, if the store carries it.
    fn structural_property(
        &self,
        key: &str,
    ) -> Result<Option<PropertyValue>, Error>;
}

/// A folder within an attached store.
pub trait Folder: Clone + Sized {
    type Store: Store;
    type Item: Item<Folder = Self>;

    fn name(&self) -> String;

    /// The store this folder belongs to.
    fn owning_store(&self) -> Result<Self::Store, Error>;

    /// Snapshot of the items currently in this folder, in provider
    /// enumeration order.
    fn items(&self) -> Result<Vec<Self::Item>, Error>;

    /// Snapshot of the immediate child folders, in provider enumeration
    /// order.
    fn children(&self) -> Result<Vec<Self>, Error>;

    /// The folder's declared default content kind, if any.
    fn default_item_kind(&self) -> Result<Option<ItemKind>, Error>;

    /// Create an immediate child folder.
    ///
    /// Some root-like folders reject an explicit kind; callers that care
    /// retry with `None`.
    fn create_child(
        &self,
        name: &str,
        kind: Option<ItemKind>,
    ) -> Result<Self, Error>;
}

/// An opaque unit of content inside a folder.
pub trait Item: Sized {
    type Folder;

    /// Create a copy of this item alongside the original, in the same
    /// folder.
    fn duplicate(&self) -> Result<Self, Error>;

    /// Move this item into `dest`, removing it from its current folder. The
    /// handle remains valid and refers to the item at its new location.
    fn relocate(&self, dest: &Self::Folder) -> Result<(), Error>;

    /// Remove this item from its folder. The handle is dead afterwards.
    fn remove(&self) -> Result<(), Error>;
}

/// Whether two store paths refer to the same file.
///
/// Store paths come from case-preserving but case-insensitive filesystems,
/// so comparison ignores ASCII case. Separator style and a redundant
/// leading `./` are folded away first; anything beyond that (symlinks,
/// `..` traversal) is out of scope for this comparison.
pub fn same_store_path(a: &str, b: &str) -> bool {
    normalized(a).eq_ignore_ascii_case(&normalized(b))
}

fn normalized(path: &str) -> String {
    let path = path
        .strip_prefix("./")
        .or_else(|| path.strip_prefix(".\\"))
        .unwrap_or(path);
    path.replace('\\', "/")
}

/// The file-name portion of a store path, for human-readable messages.
pub fn store_file_name(path: &str) -> &str {
    path.rsplit(|c| '/' == c || '\\' == c)
        .next()
        .unwrap_or(path)
}
