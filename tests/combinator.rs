use deferred::{All, Deferred, Error, all};

#[test]
fn first_rejection_wins() {
    let joined = all([
        Deferred::Resolved(1),
        Deferred::Rejected(Error::msg("E1")),
        Deferred::Pending,
        Deferred::Rejected(Error::msg("E2")),
    ]);
    assert_eq!(
        joined,
        Deferred::Rejected(Error::msg("E1")),
        "Leftmost rejection should be reported"
    );
}

#[test]
fn rejection_beats_earlier_pending() {
    let joined = all([Deferred::<u8>::Pending, Deferred::Rejected(Error::msg("late"))]);
    assert_eq!(joined.error().map(Error::message), Some("late"));

    let joined = (Deferred::<u8>::Pending, Deferred::<&str>::Rejected(Error::msg("late"))).all();
    assert_eq!(joined.error().map(Error::message), Some("late"));
}

#[test]
fn pending_beats_resolved() {
    let joined = all([Deferred::Resolved(1), Deferred::Pending, Deferred::Resolved(3)]);
    assert_eq!(joined, Deferred::Pending);
}

#[test]
fn all_resolved_keeps_positions() {
    let joined = all([Deferred::Resolved(3), Deferred::Resolved(1), Deferred::Resolved(2)]);
    assert_eq!(joined, Deferred::Resolved(vec![3, 1, 2]));

    let joined = (Deferred::Resolved(1), Deferred::Resolved("a")).all();
    assert_eq!(joined, Deferred::Resolved((1, "a")));
}

#[test]
fn empty_and_single_inputs() {
    assert_eq!(all(Vec::<Deferred<u8>>::new()), Deferred::Resolved(vec![]));
    assert_eq!(().all(), Deferred::Resolved(()));

    assert_eq!(all([Deferred::Resolved(5)]), Deferred::Resolved(vec![5]));
    assert_eq!((Deferred::Resolved(5),).all(), Deferred::Resolved((5,)));
    assert_eq!((Deferred::<u8>::Pending,).all(), Deferred::Pending);
}

#[test]
fn wide_tuple() {
    let joined = (
        Deferred::Resolved(1u8),
        Deferred::Resolved(2u16),
        Deferred::Resolved(3u32),
        Deferred::Resolved(4u64),
        Deferred::Resolved('5'),
        Deferred::Resolved("6"),
        Deferred::Resolved(7i8),
        Deferred::Resolved(8i16),
        Deferred::Resolved(9i32),
        Deferred::Resolved(10i64),
        Deferred::Resolved(11usize),
        Deferred::<bool>::Pending,
    )
        .all();
    assert!(joined.is_pending(), "Last pending input should hold the join");
}
