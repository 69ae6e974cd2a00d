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

//! In-memory store provider.
//!
//! This is the reference implementation of the `provider` traits and the
//! substrate for the crate's tests. A `MemSession` owns a single arena of
//! stores, folders and items behind a mutex; the handle types are thin ids
//! into that arena, so they are cheap to clone and naturally survive the
//! item moving between folders.
//!
//! Besides the trait surface it exposes seeding methods (`seed_store`,
//! `add_child`, `add_item`) and fault-injection knobs (`fail_next_creates`,
//! `fail_next_attaches`, `fail_next_relocates`) so callers can script the
//! transient failures a live provider would produce.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::store::provider::{
    same_store_path, Folder, Item, ItemKind, PropertyValue, Session, Store,
    PROP_CONTENT_ROOT_ENTRY_ID,
};
use crate::support::error::Error;
use crate::support::hex_id;

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    stores: Vec<StoreRec>,
    folders: HashMap<u64, FolderRec>,
    items: HashMap<u64, ItemRec>,
    /// Lower-cased folder name => number of `create_child` calls for that
    /// name which fail before one is allowed to succeed.
    fail_creates: HashMap<String, u32>,
    /// Lower-cased store path => number of `attach_store` calls which fail.
    fail_attaches: HashMap<String, u32>,
}

#[derive(Debug)]
struct StoreRec {
    path: String,
    store_id: String,
    attached: bool,
    root: u64,
    props: HashMap<String, PropertyValue>,
}

#[derive(Debug)]
struct FolderRec {
    name: String,
    store_id: String,
    entry_id: Option<String>,
    children: Vec<u64>,
    items: Vec<u64>,
    default_kind: Option<ItemKind>,
    rejects_typed_create: bool,
}

#[derive(Debug)]
struct ItemRec {
    folder: u64,
    body: String,
    fail_relocates: u32,
}

impl State {
    fn fresh_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn folder(&self, id: u64) -> Result<&FolderRec, Error> {
        self.folders.get(&id).ok_or(Error::NxFolder)
    }

    fn folder_mut(&mut self, id: u64) -> Result<&mut FolderRec, Error> {
        self.folders.get_mut(&id).ok_or(Error::NxFolder)
    }

    fn item(&self, id: u64) -> Result<&ItemRec, Error> {
        self.items.get(&id).ok_or(Error::NxItem)
    }

    fn store_by_id(&self, store_id: &str) -> Result<&StoreRec, Error> {
        self.stores
            .iter()
            .find(|s| s.store_id == store_id)
            .ok_or(Error::NxStore)
    }

    /// Create a store record with a root folder, initially detached.
    ///
    /// The content-root structural property is populated with the raw bytes
    /// of an entry id, the way a real provider hands the identifier back.
    fn new_store(&mut self, path: &str) -> usize {
        let root = self.fresh_id();
        let store_id = format!("S{:04}", self.fresh_id());
        let entry_bytes = root.to_be_bytes().to_vec();

        self.folders.insert(
            root,
            FolderRec {
                name: "Top of Store".to_owned(),
                store_id: store_id.clone(),
                entry_id: Some(hex_id::encode_upper(&entry_bytes)),
                children: Vec::new(),
                items: Vec::new(),
                default_kind: None,
                rejects_typed_create: false,
            },
        );

        let mut props = HashMap::new();
        props.insert(
            PROP_CONTENT_ROOT_ENTRY_ID.to_owned(),
            PropertyValue::Bytes(entry_bytes),
        );

        self.stores.push(StoreRec {
            path: path.to_owned(),
            store_id,
            attached: false,
            root,
            props,
        });
        self.stores.len() - 1
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemSession {
    state: Arc<Mutex<State>>,
}

#[derive(Clone, Debug)]
pub struct MemStore {
    state: Arc<Mutex<State>>,
    store_id: String,
}

#[derive(Clone, Debug)]
pub struct MemFolder {
    state: Arc<Mutex<State>>,
    id: u64,
}

#[derive(Clone, Debug)]
pub struct MemItem {
    state: Arc<Mutex<State>>,
    id: u64,
}

impl MemSession {
    pub fn new() -> Self {
        MemSession::default()
    }

    /// Create a detached store at `path` and return a handle to it.
    ///
    /// The store is not attached; it becomes visible to the traversal only
    /// once `attach_store` opens it.
    pub fn seed_store(&self, path: &str) -> MemStore {
        let mut state = self.state.lock().unwrap();
        let ix = state.new_store(path);
        MemStore {
            state: Arc::clone(&self.state),
            store_id: state.stores[ix].store_id.clone(),
        }
    }

    /// Replace or clear the structural property of the store at `path`.
    pub fn set_structural_property(
        &self,
        path: &str,
        value: Option<PropertyValue>,
    ) {
        let mut state = self.state.lock().unwrap();
        if let Some(store) = state
            .stores
            .iter_mut()
            .find(|s| same_store_path(&s.path, path))
        {
            match value {
                Some(v) => {
                    store.props.insert(PROP_CONTENT_ROOT_ENTRY_ID.to_owned(), v)
                }
                None => store.props.remove(PROP_CONTENT_ROOT_ENTRY_ID),
            };
        }
    }

    /// Make the next `times` calls to `create_child` for `name` fail.
    pub fn fail_next_creates(&self, name: &str, times: u32) {
        self.state
            .lock()
            .unwrap()
            .fail_creates
            .insert(name.to_ascii_lowercase(), times);
    }

    /// Make the next `times` calls to `attach_store` for `path` fail.
    pub fn fail_next_attaches(&self, path: &str, times: u32) {
        self.state
            .lock()
            .unwrap()
            .fail_attaches
            .insert(path.to_ascii_lowercase(), times);
    }

    /// The root folder of the store at `path`, attached or not.
    ///
    /// Seeding and assertion helper; the traversal itself only discovers
    /// roots through the `Session` trait.
    pub fn root_of(&self, path: &str) -> Option<MemFolder> {
        let state = self.state.lock().unwrap();
        state
            .stores
            .iter()
            .find(|s| same_store_path(&s.path, path))
            .map(|s| MemFolder {
                state: Arc::clone(&self.state),
                id: s.root,
            })
    }
}

impl Session for MemSession {
    type Store = MemStore;
    type Folder = MemFolder;

    fn attach_store(&self, path: &str) -> Result<MemStore, Error> {
        let mut state = self.state.lock().unwrap();

        if let Some(n) =
            state.fail_attaches.get_mut(&path.to_ascii_lowercase())
        {
            if *n > 0 {
                *n -= 1;
                return Err(Error::Provider(format!(
                    "transient failure attaching {}",
                    path
                )));
            }
        }

        let ix = match state
            .stores
            .iter()
            .position(|s| same_store_path(&s.path, path))
        {
            Some(ix) if state.stores[ix].attached => {
                return Err(Error::StoreInUse)
            }
            Some(ix) => ix,
            None => state.new_store(path),
        };

        state.stores[ix].attached = true;
        Ok(MemStore {
            state: Arc::clone(&self.state),
            store_id: state.stores[ix].store_id.clone(),
        })
    }

    fn detach_store(&self, store: MemStore) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        let rec = state
            .stores
            .iter_mut()
            .find(|s| s.store_id == store.store_id)
            .ok_or(Error::NxStore)?;
        if !rec.attached {
            return Err(Error::NxStore);
        }

        rec.attached = false;
        Ok(())
    }

    fn stores(&self) -> Result<Vec<MemStore>, Error> {
        let state = self.state.lock().unwrap();
        Ok(state
            .stores
            .iter()
            .filter(|s| s.attached)
            .map(|s| MemStore {
                state: Arc::clone(&self.state),
                store_id: s.store_id.clone(),
            })
            .collect())
    }

    fn resolve_folder_by_id(
        &self,
        entry_id: &str,
        store_id: &str,
    ) -> Result<Option<MemFolder>, Error> {
        let state = self.state.lock().unwrap();
        Ok(state
            .folders
            .iter()
            .find(|(_, f)| {
                f.store_id == store_id
                    && f.entry_id.as_deref() == Some(entry_id)
            })
            .map(|(&id, _)| MemFolder {
                state: Arc::clone(&self.state),
                id,
            }))
    }

    fn top_level_folders(&self) -> Result<Vec<MemFolder>, Error> {
        let state = self.state.lock().unwrap();
        Ok(state
            .stores
            .iter()
            .filter(|s| s.attached)
            .map(|s| MemFolder {
                state: Arc::clone(&self.state),
                id: s.root,
            })
            .collect())
    }
}

impl Store for MemStore {
    fn path(&self) -> String {
        let state = self.state.lock().unwrap();
        state
            .store_by_id(&self.store_id)
            .map(|s| s.path.clone())
            .unwrap_or_default()
    }

    fn store_id(&self) -> String {
        self.store_id.clone()
    }

    fn structural_property(
        &self,
        key: &str,
    ) -> Result<Option<PropertyValue>, Error> {
        let state = self.state.lock().unwrap();
        Ok(state.store_by_id(&self.store_id)?.props.get(key).cloned())
    }
}

impl MemFolder {
    /// Add a child folder directly, bypassing the fault-injection knobs.
    pub fn add_child(
        &self,
        name: &str,
        kind: Option<ItemKind>,
    ) -> MemFolder {
        let mut state = self.state.lock().unwrap();
        let id = state.fresh_id();
        let store_id = state.folders[&self.id].store_id.clone();
        state.folders.insert(
            id,
            FolderRec {
                name: name.to_owned(),
                store_id,
                entry_id: None,
                children: Vec::new(),
                items: Vec::new(),
                default_kind: kind,
                rejects_typed_create: false,
            },
        );
        state.folders.get_mut(&self.id).unwrap().children.push(id);
        MemFolder {
            state: Arc::clone(&self.state),
            id,
        }
    }

    /// Add an item with the given body text.
    pub fn add_item(&self, body: &str) -> MemItem {
        let mut state = self.state.lock().unwrap();
        let id = state.fresh_id();
        state.items.insert(
            id,
            ItemRec {
                folder: self.id,
                body: body.to_owned(),
                fail_relocates: 0,
            },
        );
        state.folders.get_mut(&self.id).unwrap().items.push(id);
        MemItem {
            state: Arc::clone(&self.state),
            id,
        }
    }

    /// Make this folder reject `create_child` calls that pass an explicit
    /// kind, the way some root-like folders do.
    pub fn reject_typed_creates(&self) {
        let mut state = self.state.lock().unwrap();
        if let Some(rec) = state.folders.get_mut(&self.id) {
            rec.rejects_typed_create = true;
        }
    }

    /// Bodies of the items currently in this folder, in order.
    pub fn item_bodies(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        let rec = &state.folders[&self.id];
        rec.items
            .iter()
            .map(|id| state.items[id].body.clone())
            .collect()
    }

    /// Names of the immediate child folders, in order.
    pub fn child_names(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        let rec = &state.folders[&self.id];
        rec.children
            .iter()
            .map(|id| state.folders[id].name.clone())
            .collect()
    }
}

impl Folder for MemFolder {
    type Store = MemStore;
    type Item = MemItem;

    fn name(&self) -> String {
        let state = self.state.lock().unwrap();
        state
            .folders
            .get(&self.id)
            .map(|f| f.name.clone())
            .unwrap_or_default()
    }

    fn owning_store(&self) -> Result<MemStore, Error> {
        let state = self.state.lock().unwrap();
        let store_id = state.folder(self.id)?.store_id.clone();
        state.store_by_id(&store_id)?;
        Ok(MemStore {
            state: Arc::clone(&self.state),
            store_id,
        })
    }

    fn items(&self) -> Result<Vec<MemItem>, Error> {
        let state = self.state.lock().unwrap();
        Ok(state
            .folder(self.id)?
            .items
            .iter()
            .map(|&id| MemItem {
                state: Arc::clone(&self.state),
                id,
            })
            .collect())
    }

    fn children(&self) -> Result<Vec<MemFolder>, Error> {
        let state = self.state.lock().unwrap();
        Ok(state
            .folder(self.id)?
            .children
            .iter()
            .map(|&id| MemFolder {
                state: Arc::clone(&self.state),
                id,
            })
            .collect())
    }

    fn default_item_kind(&self) -> Result<Option<ItemKind>, Error> {
        let state = self.state.lock().unwrap();
        Ok(state.folder(self.id)?.default_kind)
    }

    fn create_child(
        &self,
        name: &str,
        kind: Option<ItemKind>,
    ) -> Result<MemFolder, Error> {
        let mut state = self.state.lock().unwrap();

        if let Some(n) = state.fail_creates.get_mut(&name.to_ascii_lowercase())
        {
            if *n > 0 {
                *n -= 1;
                return Err(Error::Provider(format!(
                    "transient failure creating folder {}",
                    name
                )));
            }
        }

        let parent = state.folder(self.id)?;
        if kind.is_some() && parent.rejects_typed_create {
            return Err(Error::BadItemKind);
        }
        let store_id = parent.store_id.clone();

        let id = state.fresh_id();
        state.folders.insert(
            id,
            FolderRec {
                name: name.to_owned(),
                store_id,
                entry_id: None,
                children: Vec::new(),
                items: Vec::new(),
                default_kind: kind,
                rejects_typed_create: false,
            },
        );
        state.folder_mut(self.id)?.children.push(id);
        Ok(MemFolder {
            state: Arc::clone(&self.state),
            id,
        })
    }
}

impl MemItem {
    /// Make the next `times` relocations of this item fail.
    ///
    /// Duplicates inherit the remaining failure count, so the knob tracks
    /// the content rather than one particular handle.
    pub fn fail_next_relocates(&self, times: u32) {
        let mut state = self.state.lock().unwrap();
        if let Some(rec) = state.items.get_mut(&self.id) {
            rec.fail_relocates = times;
        }
    }

    pub fn body(&self) -> String {
        let state = self.state.lock().unwrap();
        state
            .items
            .get(&self.id)
            .map(|i| i.body.clone())
            .unwrap_or_default()
    }
}

impl Item for MemItem {
    type Folder = MemFolder;

    fn duplicate(&self) -> Result<MemItem, Error> {
        let mut state = self.state.lock().unwrap();
        let rec = state.item(self.id)?;
        let (folder, body, fail_relocates) =
            (rec.folder, rec.body.clone(), rec.fail_relocates);

        let id = state.fresh_id();
        state.items.insert(
            id,
            ItemRec {
                folder,
                body,
                fail_relocates,
            },
        );
        state.folder_mut(folder)?.items.push(id);
        Ok(MemItem {
            state: Arc::clone(&self.state),
            id,
        })
    }

    fn relocate(&self, dest: &MemFolder) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();

        let rec = state.items.get_mut(&self.id).ok_or(Error::NxItem)?;
        if rec.fail_relocates > 0 {
            rec.fail_relocates -= 1;
            return Err(Error::Provider(
                "transient failure relocating item".to_owned(),
            ));
        }
        let old_folder = rec.folder;
        rec.folder = dest.id;

        state
            .folder_mut(old_folder)?
            .items
            .retain(|&id| id != self.id);
        state.folder_mut(dest.id)?.items.push(self.id);
        Ok(())
    }

    fn remove(&self) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        let folder = state.item(self.id)?.folder;
        state.folder_mut(folder)?.items.retain(|&id| id != self.id);
        state.items.remove(&self.id);
        Ok(())
    }
}
