use duplica::{IngestionMode, Mutation, PrepareWindow, WindowError};
use std::cell::RefCell;
use std::rc::Rc;

fn mutation(decree: u64, ballot: u64) -> Mutation {
    Mutation::new(decree, ballot, decree, Vec::new())
}

fn recording_window(
    initial_decree: u64,
    capacity: usize,
) -> (PrepareWindow, Rc<RefCell<Vec<u64>>>) {
    let committed = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&committed);
    let window = PrepareWindow::new(
        initial_decree,
        capacity,
        Box::new(move |mutation: Mutation| {
            sink.borrow_mut().push(mutation.decree());
        }),
    );
    (window, committed)
}

#[test]
fn commits_contiguous_prefix_below_highest_decree() {
    let (mut window, committed) = recording_window(0, 8);
    window.prepare(mutation(3, 1), IngestionMode::Passive).unwrap();
    window.prepare(mutation(1, 1), IngestionMode::Passive).unwrap();
    assert_eq!(*committed.borrow(), vec![1]);
    assert_eq!(window.last_committed_decree(), 1);
    assert_eq!(window.in_flight(), 1);

    window.prepare(mutation(2, 1), IngestionMode::Passive).unwrap();
    assert_eq!(*committed.borrow(), vec![1, 2]);
    assert_eq!(window.last_committed_decree(), 2);
    assert_eq!(window.in_flight(), 1);

    // Decree 3 commits only once something above it is admitted.
    window.prepare(mutation(4, 1), IngestionMode::Passive).unwrap();
    assert_eq!(*committed.borrow(), vec![1, 2, 3]);
    assert_eq!(window.last_committed_decree(), 3);
}

#[test]
fn highest_admitted_decree_never_commits_on_its_own_prepare() {
    let (mut window, committed) = recording_window(0, 8);
    window.prepare(mutation(1, 1), IngestionMode::Passive).unwrap();
    assert!(committed.borrow().is_empty());
    assert_eq!(window.last_committed_decree(), 0);
    assert_eq!(window.in_flight(), 1);
}

#[test]
fn each_decree_commits_exactly_once() {
    let (mut window, committed) = recording_window(0, 8);
    for decree in 1..=6 {
        window
            .prepare(mutation(decree, 1), IngestionMode::Passive)
            .unwrap();
    }
    assert_eq!(*committed.borrow(), vec![1, 2, 3, 4, 5]);
}

#[test]
fn higher_ballot_replaces_slot_in_place() {
    let (mut window, committed) = recording_window(0, 8);
    window.prepare(mutation(1, 1), IngestionMode::Passive).unwrap();
    window.prepare(mutation(1, 3), IngestionMode::Passive).unwrap();
    assert_eq!(window.in_flight(), 1);
    assert_eq!(window.get_mutation_by_decree(1).unwrap().ballot(), 3);
    assert_eq!(window.counters().replaced, 1);

    window.prepare(mutation(2, 1), IngestionMode::Passive).unwrap();
    assert_eq!(*committed.borrow(), vec![1]);
}

#[test]
fn equal_or_lower_ballot_cannot_replace() {
    let (mut window, _) = recording_window(0, 8);
    window.prepare(mutation(2, 3), IngestionMode::Passive).unwrap();
    assert_eq!(
        window.prepare(mutation(2, 3), IngestionMode::Passive),
        Err(WindowError::BallotNotGreater {
            decree: 2,
            held: 3,
            incoming: 3,
        })
    );
    assert_eq!(
        window.prepare(mutation(2, 1), IngestionMode::Passive),
        Err(WindowError::BallotNotGreater {
            decree: 2,
            held: 3,
            incoming: 1,
        })
    );
    assert_eq!(window.get_mutation_by_decree(2).unwrap().ballot(), 3);
}

#[test]
fn stale_decree_is_rejected_at_the_window_layer() {
    let (mut window, _) = recording_window(0, 8);
    window.prepare(mutation(1, 1), IngestionMode::Passive).unwrap();
    window.prepare(mutation(2, 1), IngestionMode::Passive).unwrap();
    assert_eq!(window.last_committed_decree(), 1);
    assert_eq!(
        window.prepare(mutation(1, 2), IngestionMode::Passive),
        Err(WindowError::StaleDecree {
            decree: 1,
            committed: 1,
        })
    );
}

#[test]
fn decree_beyond_capacity_is_out_of_window() {
    let (mut window, _) = recording_window(0, 3);
    for decree in 2..=4 {
        window
            .prepare(mutation(decree, 1), IngestionMode::Passive)
            .unwrap();
    }
    assert_eq!(window.in_flight(), 3);
    assert_eq!(
        window.prepare(mutation(5, 1), IngestionMode::Passive),
        Err(WindowError::OutOfWindow {
            decree: 5,
            committed: 0,
            capacity: 3,
        })
    );
}

#[test]
fn frontier_starts_at_initial_decree() {
    let (mut window, committed) = recording_window(100, 4);
    assert_eq!(window.last_committed_decree(), 100);
    assert_eq!(
        window.prepare(mutation(100, 1), IngestionMode::Passive),
        Err(WindowError::StaleDecree {
            decree: 100,
            committed: 100,
        })
    );
    window
        .prepare(mutation(101, 1), IngestionMode::Passive)
        .unwrap();
    window
        .prepare(mutation(102, 1), IngestionMode::Passive)
        .unwrap();
    assert_eq!(*committed.borrow(), vec![101]);
}

#[test]
fn counters_track_admissions_and_modes() {
    let (mut window, _) = recording_window(0, 8);
    window.prepare(mutation(1, 1), IngestionMode::Passive).unwrap();
    window.prepare(mutation(3, 1), IngestionMode::Active).unwrap();
    window.prepare(mutation(3, 2), IngestionMode::Passive).unwrap();
    let counters = window.counters();
    // Replacement is counted once, as a replacement, not as a new admission.
    assert_eq!(counters.admitted, 2);
    assert_eq!(counters.replaced, 1);
    assert_eq!(counters.committed, 1);
    assert_eq!(counters.passive_admissions, 1);
}
