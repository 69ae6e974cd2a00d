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

//! Progress reporting and cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Count value for sink events that are warnings or errors rather than a
/// source-store count.
pub const NOT_A_COUNT: i64 = -1;

/// Receiver of the run's log-style progress channel.
///
/// Events carry a sequential count of source stores processed, or
/// [`NOT_A_COUNT`] when the message is a warning or error, plus a
/// human-readable message. This is not a percentage channel.
pub trait ProgressSink {
    fn progress(&mut self, count: i64, message: &str);
}

impl<F: FnMut(i64, &str)> ProgressSink for F {
    fn progress(&mut self, count: i64, message: &str) {
        self(count, message)
    }
}

/// A sink that drops everything, for callers that do not care.
pub struct DiscardProgress;

impl ProgressSink for DiscardProgress {
    fn progress(&mut self, _count: i64, _message: &str) {}
}

/// Shared flag polled by the traversal for cooperative cancellation.
///
/// Once raised it is never lowered; the traversal observes it at folder
/// entry, before each item, and before each subfolder, and returns cleanly
/// up the stack.
#[derive(Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        CancelFlag::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
