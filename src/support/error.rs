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

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No store attached at that path")]
    NxStore,
    #[error("Store is already attached")]
    StoreInUse,
    #[error("Root folder not found")]
    RootNotFound,
    #[error("No such folder")]
    NxFolder,
    #[error("No such item")]
    NxItem,
    #[error("Folder rejects the requested item kind")]
    BadItemKind,
    #[error("Provider error: {0}")]
    Provider(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}
