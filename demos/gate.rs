use deferred::{All, Deferred, Error, Gate, GateOptions, Scope};

#[derive(Clone, Debug)]
struct User {
    name: String,
}

fn page(user: &Deferred<User>, unread: &Deferred<u32>) -> String {
    let user_gate = Gate::<User>::new();
    let options = GateOptions::new()
        .pending("Loading...".to_string())
        .failed("Something went wrong.".to_string())
        .validate(|user: &User| !user.name.is_empty());

    // Render the page only once both requests are in.
    let joined = (user.clone(), unread.clone()).all();
    let inbox_gate = Gate::<(User, u32)>::new();
    let inbox = GateOptions::new()
        .pending("Loading inbox...".to_string())
        .failed("Inbox unavailable.".to_string());

    user_gate
        .render(&Scope::root(), user, &options, |scope| {
            let name = user_gate.value(scope).map_or("?", |user| user.name.as_str());
            let body = inbox_gate
                .render(scope, &joined, &inbox, |scope| {
                    let unread = inbox_gate.value(scope).map_or(0, |(_, unread)| *unread);
                    format!("{unread} unread")
                })
                .unwrap_or_default();
            format!("Hello {name}! {body}")
        })
        .unwrap_or_default()
}

fn main() {
    let ada = Deferred::Resolved(User {
        name: "Ada".to_string(),
    });

    println!("{}", page(&Deferred::Pending, &Deferred::Pending));
    println!("{}", page(&ada, &Deferred::Pending));
    println!("{}", page(&ada, &Deferred::Resolved(3)));
    println!("{}", page(&ada, &Deferred::Rejected(Error::msg("timeout"))));
    println!(
        "{}",
        page(
            &Deferred::Resolved(User {
                name: String::new()
            }),
            &Deferred::Resolved(3)
        )
    );
}
