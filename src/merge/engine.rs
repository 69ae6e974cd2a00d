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

//! The recursive folder merge.
//!
//! `merge_into` reconciles one (source folder, destination folder) pair: it
//! transfers every item of the source folder into the destination, then
//! recurses into each source subfolder against the matching (or newly
//! created) destination subfolder. Traversal is depth-first, pre-order and
//! fully sequential; cancellation is polled at every folder entry, before
//! every item, and before every subfolder.
//!
//! Failures are handled at the narrowest scope that can continue: a bad
//! item skips that item, an unresolvable subfolder skips that subtree, and
//! only an error enumerating the current folder itself unwinds to the
//! caller.

use std::thread;
use std::time::Duration;

use log::{error, warn};

use crate::merge::matcher::find_child_by_name;
use crate::merge::progress::{CancelFlag, ProgressSink, NOT_A_COUNT};
use crate::store::provider::{Folder, Item};
use crate::support::error::Error;

/// Bounded retry for the folder lookup/creation step.
///
/// That step is the one most prone to transient contention against a live
/// store, so it gets a fixed number of attempts with a fixed delay between
/// them. Item and store operations are never retried; retrying a whole-item
/// transfer risks duplicating the item.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            attempts: 3,
            delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Policy with no inter-attempt delay, for tests.
    pub fn immediate(attempts: u32) -> Self {
        RetryPolicy {
            attempts,
            delay: Duration::from_millis(0),
        }
    }
}

#[derive(Default)]
pub struct MergeEngine {
    retry: RetryPolicy,
}

impl MergeEngine {
    pub fn new() -> Self {
        MergeEngine::default()
    }

    pub fn with_retry(retry: RetryPolicy) -> Self {
        MergeEngine { retry }
    }

    /// Merge the contents of `source` into `dest`.
    ///
    /// Returns `Err` only when the source folder itself cannot be
    /// enumerated; everything narrower is reported through `sink` and
    /// swallowed.
    pub fn merge_into<F: Folder>(
        &self,
        source: &F,
        dest: &F,
        cancel: &CancelFlag,
        sink: &mut dyn ProgressSink,
    ) -> Result<(), Error> {
        if cancel.is_cancelled() {
            return Ok(());
        }

        self.transfer_items(source, dest, cancel, sink)?;

        for source_child in source.children()? {
            if cancel.is_cancelled() {
                break;
            }

            let dest_child =
                match self.match_or_create(dest, &source_child, sink) {
                    Some(folder) => folder,
                    // Already reported; skip this subtree, keep siblings.
                    None => continue,
                };
            self.merge_into(&source_child, &dest_child, cancel, sink)?;
        }

        Ok(())
    }

    /// Transfer every item of `source` into `dest`.
    ///
    /// Iteration runs last-to-first so that providers whose collections
    /// shrink as items leave them stay consistent with our snapshot.
    fn transfer_items<F: Folder>(
        &self,
        source: &F,
        dest: &F,
        cancel: &CancelFlag,
        sink: &mut dyn ProgressSink,
    ) -> Result<(), Error> {
        for item in source.items()?.into_iter().rev() {
            if cancel.is_cancelled() {
                return Ok(());
            }

            if let Err(e) = transfer_item(&item, dest) {
                let message = format!(
                    "Failed to move an item out of folder {}: {}",
                    source.name(),
                    e
                );
                warn!("{}", message);
                sink.progress(NOT_A_COUNT, &message);
            }
        }

        Ok(())
    }

    /// Find the destination counterpart of `source_child` by name, creating
    /// it when absent, under the bounded retry policy.
    ///
    /// `None` means every attempt failed; the failure has been
    /// reported and the caller skips the subtree.
    fn match_or_create<F: Folder>(
        &self,
        dest: &F,
        source_child: &F,
        sink: &mut dyn ProgressSink,
    ) -> Option<F> {
        let name = source_child.name();

        let mut attempt = 0;
        loop {
            attempt += 1;
            match match_or_create_once(dest, source_child, &name) {
                Ok(folder) => return Some(folder),
                Err(e) if attempt < self.retry.attempts => {
                    let message = format!(
                        "Retrying folder {} (attempt {} of {}): {}",
                        name, attempt, self.retry.attempts, e
                    );
                    warn!("{}", message);
                    sink.progress(NOT_A_COUNT, &message);
                    thread::sleep(self.retry.delay);
                }
                Err(e) => {
                    let message =
                        format!("Giving up on folder {}: {}", name, e);
                    error!("{}", message);
                    sink.progress(NOT_A_COUNT, &message);
                    return None;
                }
            }
        }
    }
}

/// One attempt at resolving the destination counterpart of a source child.
fn match_or_create_once<F: Folder>(
    dest: &F,
    source_child: &F,
    name: &str,
) -> Result<F, Error> {
    if let Some(existing) = find_child_by_name(dest, name)? {
        return Ok(existing);
    }

    match dest.create_child(name, source_child.default_item_kind()?) {
        Ok(folder) => Ok(folder),
        // Root-like and special folders can reject an explicit kind; the
        // untyped creation is the compatible form. Any other failure goes
        // to the retry loop untouched.
        Err(Error::BadItemKind) => dest.create_child(name, None),
        Err(e) => Err(e),
    }
}

/// Move one item into `dest` without ever holding its only copy in limbo.
///
/// The duplicate is created first, relocated into the destination, and only
/// then is the original removed from the source, so a failure anywhere in
/// between never loses the item. A duplicate stranded by a failed
/// relocation is removed best-effort so the source folder is left as it
/// was.
fn transfer_item<I: Item>(item: &I, dest: &I::Folder) -> Result<(), Error> {
    let copy = item.duplicate()?;

    if let Err(e) = copy.relocate(dest) {
        if let Err(e2) = copy.remove() {
            warn!("could not remove stranded item copy: {}", e2);
        }
        return Err(e);
    }

    item.remove()
}
