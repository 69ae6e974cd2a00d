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

//! The per-run coordinator.
//!
//! One destination store is attached for the whole run; each source store
//! is attached, fully drained into the destination, and detached before the
//! next is attached. Only a destination that cannot be attached or whose
//! root cannot be resolved aborts the run; every per-source failure is
//! reported through the sink and the run continues.

use log::warn;

use crate::merge::engine::MergeEngine;
use crate::merge::progress::{CancelFlag, ProgressSink, NOT_A_COUNT};
use crate::merge::root::resolve_root;
use crate::store::provider::{same_store_path, store_file_name, Session};
use crate::support::error::Error;

/// Merge every store named by `source_paths`, in order, into the store at
/// `dest_path`.
///
/// A source path that names the destination itself is skipped silently,
/// without a progress-count increment. Cancellation stops the loop between
/// sources and between folders, never mid-item.
pub fn merge_stores<S: Session>(
    session: &S,
    source_paths: &[String],
    dest_path: &str,
    cancel: &CancelFlag,
    sink: &mut dyn ProgressSink,
) -> Result<(), Error> {
    merge_stores_with(
        session,
        source_paths,
        dest_path,
        cancel,
        sink,
        &MergeEngine::new(),
    )
}

/// As `merge_stores`, with an explicit engine (and thus retry policy).
pub fn merge_stores_with<S: Session>(
    session: &S,
    source_paths: &[String],
    dest_path: &str,
    cancel: &CancelFlag,
    sink: &mut dyn ProgressSink,
    engine: &MergeEngine,
) -> Result<(), Error> {
    let dest_store = session.attach_store(dest_path)?;
    let result = drain_sources(
        session,
        source_paths,
        dest_path,
        cancel,
        sink,
        engine,
    );

    // The destination is detached last, even when cancelled or when root
    // resolution failed.
    if let Err(e) = session.detach_store(dest_store) {
        warn!("failed to detach destination store {}: {}", dest_path, e);
    }
    result
}

fn drain_sources<S: Session>(
    session: &S,
    source_paths: &[String],
    dest_path: &str,
    cancel: &CancelFlag,
    sink: &mut dyn ProgressSink,
    engine: &MergeEngine,
) -> Result<(), Error> {
    let dest_root = resolve_root(session, dest_path)?;

    let mut count = 0;
    for path in source_paths {
        if cancel.is_cancelled() {
            break;
        }
        if same_store_path(path, dest_path) {
            continue;
        }

        count += 1;
        sink.progress(
            count,
            &format!("Merging {}", store_file_name(path)),
        );

        let source_store = match session.attach_store(path) {
            Ok(store) => store,
            Err(e) => {
                sink.progress(
                    NOT_A_COUNT,
                    &format!("Failed to open {}: {}", path, e),
                );
                continue;
            }
        };

        match resolve_root(session, path) {
            Ok(source_root) => {
                if let Err(e) =
                    engine.merge_into(&source_root, &dest_root, cancel, sink)
                {
                    sink.progress(
                        NOT_A_COUNT,
                        &format!("Failed while merging {}: {}", path, e),
                    );
                }
            }
            Err(e) => sink.progress(
                NOT_A_COUNT,
                &format!("Cannot find the root folder of {}: {}", path, e),
            ),
        }

        if let Err(e) = session.detach_store(source_store) {
            warn!("failed to detach source store {}: {}", path, e);
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::merge::engine::RetryPolicy;
    use crate::merge::matcher::find_child_by_name;
    use crate::merge::progress::DiscardProgress;
    use crate::store::memory::MemSession;
    use crate::store::provider::ItemKind;

    fn collect_events(
    ) -> (Arc<Mutex<Vec<(i64, String)>>>, impl FnMut(i64, &str)) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink_events = Arc::clone(&events);
        let sink = move |count: i64, message: &str| {
            sink_events.lock().unwrap().push((count, message.to_owned()))
        };
        (events, sink)
    }

    fn fast_engine() -> MergeEngine {
        MergeEngine::with_retry(RetryPolicy::immediate(3))
    }

    #[test]
    fn end_to_end_merge_of_two_sources() {
        let session = MemSession::new();
        session.seed_store("a.pst");
        session.seed_store("b.pst");
        session.seed_store("dest.pst");

        let a = session.root_of("a.pst").unwrap();
        let inbox = a.add_child("Inbox", Some(ItemKind::Mail));
        inbox.add_item("m1");
        inbox.add_item("m2");
        inbox.add_child("Drafts", Some(ItemKind::Mail)).add_item("m3");

        let b = session.root_of("b.pst").unwrap();
        b.add_child("Inbox", Some(ItemKind::Mail)).add_item("m4");

        let (events, mut sink) = collect_events();
        merge_stores_with(
            &session,
            &["a.pst".to_owned(), "b.pst".to_owned()],
            "dest.pst",
            &CancelFlag::new(),
            &mut sink,
            &fast_engine(),
        )
        .unwrap();

        let dest = session.root_of("dest.pst").unwrap();
        let dest_inbox =
            find_child_by_name(&dest, "Inbox").unwrap().unwrap();
        let mut bodies = dest_inbox.item_bodies();
        bodies.sort();
        assert_eq!(
            vec!["m1".to_owned(), "m2".to_owned(), "m4".to_owned()],
            bodies
        );
        let dest_drafts =
            find_child_by_name(&dest_inbox, "Drafts").unwrap().unwrap();
        assert_eq!(vec!["m3".to_owned()], dest_drafts.item_bodies());

        // Source folders persist, emptied of items.
        assert!(inbox.item_bodies().is_empty());

        // One count event per source, in order.
        let events = events.lock().unwrap();
        let counts = events
            .iter()
            .filter(|(c, _)| *c != NOT_A_COUNT)
            .cloned()
            .collect::<Vec<_>>();
        assert_eq!(
            vec![
                (1, "Merging a.pst".to_owned()),
                (2, "Merging b.pst".to_owned())
            ],
            counts
        );

        // Everything is detached once the run is over.
        assert!(session.stores().unwrap().is_empty());
    }

    #[test]
    fn self_merge_is_skipped_without_count() {
        let session = MemSession::new();
        session.seed_store("C:\\a.pst");
        session.seed_store("C:\\B.PST");
        session
            .root_of("C:\\a.pst")
            .unwrap()
            .add_child("Inbox", Some(ItemKind::Mail))
            .add_item("m1");

        let (events, mut sink) = collect_events();
        merge_stores_with(
            &session,
            &["C:\\a.pst".to_owned(), "C:\\B.PST".to_owned()],
            "c:\\B.pst",
            &CancelFlag::new(),
            &mut sink,
            &fast_engine(),
        )
        .unwrap();

        let events = events.lock().unwrap();
        let counts = events
            .iter()
            .filter(|(c, _)| *c != NOT_A_COUNT)
            .cloned()
            .collect::<Vec<_>>();
        assert_eq!(vec![(1, "Merging a.pst".to_owned())], counts);

        let dest = session.root_of("C:\\B.PST").unwrap();
        let inbox = find_child_by_name(&dest, "Inbox").unwrap().unwrap();
        assert_eq!(vec!["m1".to_owned()], inbox.item_bodies());
    }

    #[test]
    fn unattachable_destination_is_fatal() {
        let session = MemSession::new();
        session.seed_store("a.pst");
        session.fail_next_attaches("dest.pst", 1);

        assert_matches!(
            Err(Error::Provider(..)),
            merge_stores_with(
                &session,
                &["a.pst".to_owned()],
                "dest.pst",
                &CancelFlag::new(),
                &mut DiscardProgress,
                &fast_engine(),
            )
        );
    }

    #[test]
    fn bad_source_is_reported_and_skipped() {
        let session = MemSession::new();
        session.seed_store("bad.pst");
        session.seed_store("good.pst");
        session.seed_store("dest.pst");
        session
            .root_of("good.pst")
            .unwrap()
            .add_child("Inbox", Some(ItemKind::Mail))
            .add_item("m1");
        session.fail_next_attaches("bad.pst", 1);

        let (events, mut sink) = collect_events();
        merge_stores_with(
            &session,
            &["bad.pst".to_owned(), "good.pst".to_owned()],
            "dest.pst",
            &CancelFlag::new(),
            &mut sink,
            &fast_engine(),
        )
        .unwrap();

        let events = events.lock().unwrap();
        assert!(events
            .iter()
            .any(|(c, m)| *c == NOT_A_COUNT && m.contains("bad.pst")));

        // The good source was still merged, and both counts were emitted.
        let dest = session.root_of("dest.pst").unwrap();
        let inbox = find_child_by_name(&dest, "Inbox").unwrap().unwrap();
        assert_eq!(vec!["m1".to_owned()], inbox.item_bodies());
        assert_eq!(
            2,
            events.iter().filter(|(c, _)| *c != NOT_A_COUNT).count()
        );

        // The destination was detached despite the bad source.
        assert!(session.stores().unwrap().is_empty());
    }

    #[test]
    fn cancellation_stops_between_sources() {
        let session = MemSession::new();
        session.seed_store("a.pst");
        session.seed_store("b.pst");
        session.seed_store("dest.pst");
        session
            .root_of("a.pst")
            .unwrap()
            .add_child("Inbox", Some(ItemKind::Mail))
            .add_item("m1");
        session
            .root_of("b.pst")
            .unwrap()
            .add_child("Later", Some(ItemKind::Mail))
            .add_item("m2");

        let cancel = CancelFlag::new();
        let cancel_from_sink = cancel.clone();
        let mut sink = move |count: i64, _message: &str| {
            // Cancel as soon as the first source's count event arrives.
            if 1 == count {
                cancel_from_sink.cancel();
            }
        };

        merge_stores_with(
            &session,
            &["a.pst".to_owned(), "b.pst".to_owned()],
            "dest.pst",
            &cancel,
            &mut sink,
            &fast_engine(),
        )
        .unwrap();

        let dest = session.root_of("dest.pst").unwrap();
        assert!(dest.child_names().is_empty());
        // The second source was never touched.
        let later = session.root_of("b.pst").unwrap();
        assert_eq!(vec!["Later".to_owned()], later.child_names());

        // Destination detached even though the run was cancelled.
        assert!(session.stores().unwrap().is_empty());
    }
}
