use deferred::{Deferred, Error, Gate, GateOptions, Scope};

#[derive(Clone, Debug, PartialEq)]
enum View {
    Spinner,
    Failure,
    Content(String),
}

fn never(_: &Scope<'_>) -> View {
    View::Content("never".into())
}

fn options<T>() -> GateOptions<T, View> {
    GateOptions::new()
        .pending(View::Spinner)
        .failed(View::Failure)
}

#[test]
fn pending_renders_pending_fallback() {
    let gate = Gate::<u32>::new();
    let rendered = gate.render(&Scope::root(), &Deferred::Pending, &options(), never);
    assert_eq!(rendered, Some(View::Spinner));
}

#[test]
fn rejected_renders_failed_fallback() {
    let gate = Gate::<u32>::new();
    let state = Deferred::Rejected(Error::msg("boom"));
    let rendered = gate.render(&Scope::root(), &state, &options(), never);
    assert_eq!(rendered, Some(View::Failure));
}

#[test]
fn fallbacks_default_to_nothing() {
    let gate = Gate::<u32>::new();
    let bare = GateOptions::<u32, View>::default();

    assert_eq!(gate.render(&Scope::root(), &Deferred::Pending, &bare, never), None);
    assert_eq!(
        gate.render(&Scope::root(), &Deferred::Rejected(Error::msg("x")), &bare, never),
        None
    );
}

#[test]
fn invalid_value_renders_failed_fallback() {
    let gate = Gate::<u32>::new();
    let strict = options().validate(|value: &u32| *value > 10);

    let rendered = gate.render(&Scope::root(), &Deferred::Resolved(3), &strict, never);
    assert_eq!(rendered, Some(View::Failure), "Value 3 should fail validation");

    let rendered = gate.render(&Scope::root(), &Deferred::Resolved(30), &strict, |scope| {
        View::Content(gate.value(scope).map(u32::to_string).unwrap_or_default())
    });
    assert_eq!(rendered, Some(View::Content("30".into())));
}

#[test]
fn resolved_value_is_published_to_children_only() {
    let gate = Gate::<String>::new();
    let state = Deferred::Resolved("ada".to_string());

    let rendered = gate.render(&Scope::root(), &state, &options(), |scope| {
        let name = gate.value(scope).cloned().unwrap_or_default();
        View::Content(name)
    });
    assert_eq!(rendered, Some(View::Content("ada".into())));

    assert_eq!(
        gate.value(&Scope::root()),
        None,
        "Value should not leak outside the render"
    );
}

#[test]
fn nested_gates_see_enclosing_values() {
    let user = Gate::<String>::new();
    let count = Gate::<u32>::new();
    let other = Gate::<String>::new();

    let rendered = user.render(
        &Scope::root(),
        &Deferred::Resolved("ada".to_string()),
        &options(),
        |scope| {
            count
                .render(scope, &Deferred::Resolved(3), &options(), |scope| {
                    assert!(
                        other.value(scope).is_none(),
                        "Gates of the same type should not collide"
                    );
                    let name = user.value(scope).cloned().unwrap_or_default();
                    let count = count.value(scope).copied().unwrap_or_default();
                    View::Content(format!("{name}:{count}"))
                })
                .unwrap_or(View::Failure)
        },
    );
    assert_eq!(rendered, Some(View::Content("ada:3".into())));
}

#[test]
fn nearest_publication_wins() {
    let gate = Gate::<u32>::new();

    let rendered = gate.render(&Scope::root(), &Deferred::Resolved(1), &options(), |outer| {
        gate.render(outer, &Deferred::Resolved(2), &options(), |inner| {
            View::Content(format!(
                "{}{}",
                gate.value(outer).copied().unwrap_or_default(),
                gate.value(inner).copied().unwrap_or_default()
            ))
        })
        .unwrap_or(View::Failure)
    });
    assert_eq!(rendered, Some(View::Content("12".into())));
}
