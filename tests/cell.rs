use std::panic::{AssertUnwindSafe, catch_unwind};

use deferred::{Action, DeferCell, Deferred, Error};
use futures::{StreamExt, executor::block_on};

#[test]
fn cell_applies_actions_in_order() {
    let cell = DeferCell::new();
    assert!(cell.get().is_pending(), "New cell should be pending");

    cell.resolve(1);
    cell.resolve_with(|prev: Option<i32>| prev.unwrap_or_default() + 1);
    assert_eq!(cell.get(), Deferred::Resolved(2));

    cell.reset();
    assert_eq!(cell.get(), Deferred::Resolved(2), "Reset should keep a value");

    cell.reject("offline");
    assert!(cell.with(Deferred::is_rejected));

    cell.reset();
    assert!(cell.get().is_pending(), "Reset should clear a rejection");

    cell.dispatch(Action::resolve(5));
    cell.init();
    assert!(cell.get().is_pending(), "Init should always clear");
}

#[test]
fn cell_broadcasts_changes() {
    let cell = DeferCell::from(Deferred::Resolved(1));
    let changes = cell.changes();

    cell.reset();
    cell.resolve(2);
    cell.reject(Error::msg("boom"));
    cell.reset();
    drop(cell);

    let seen = block_on(changes.collect::<Vec<_>>());
    assert_eq!(
        seen,
        vec![
            Deferred::Resolved(2),
            Deferred::Rejected(Error::msg("boom")),
            Deferred::Pending,
        ],
        "A no-op reset should not be broadcast"
    );
}

#[test]
fn closed_subscribers_are_dropped() {
    let cell = DeferCell::new();
    let first = cell.changes();
    let mut second = cell.changes();
    drop(first);

    cell.resolve("ready");
    assert_eq!(
        block_on(second.next()),
        Some(Deferred::Resolved("ready")),
        "Remaining subscriber should still be notified"
    );
}

#[test]
fn panicking_updater_keeps_previous_state() {
    let cell = DeferCell::from(Deferred::Resolved(5));
    let changes = cell.changes();

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        cell.resolve_with(|_: Option<i32>| panic!("updater failed"));
    }));
    assert!(outcome.is_err(), "Updater panic should propagate to the caller");
    assert_eq!(
        cell.get(),
        Deferred::Resolved(5),
        "Failed update should leave the value untouched"
    );

    cell.resolve_with(|prev: Option<i32>| prev.unwrap_or_default() + 1);
    drop(cell);

    let seen = block_on(changes.collect::<Vec<_>>());
    assert_eq!(seen, vec![Deferred::Resolved(6)]);
}

#[test]
fn subscribing_after_drops_keeps_working() {
    let cell = DeferCell::from(Deferred::Resolved(1));
    for _ in 0..3 {
        drop(cell.changes());
    }

    let changes = cell.changes();
    cell.resolve(2);
    drop(cell);
    assert_eq!(
        block_on(changes.collect::<Vec<_>>()),
        vec![Deferred::Resolved(2)]
    );
}
