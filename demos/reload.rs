use std::{
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};

use deferred::{Controller, Deferred, Error, Producer};
use futures::task::{FutureObj, Spawn, SpawnError};

struct TokioSpawner(tokio::runtime::Handle);

impl Spawn for TokioSpawner {
    fn spawn_obj(&self, future: FutureObj<'static, ()>) -> Result<(), SpawnError> {
        self.0.spawn(future);
        Ok(())
    }
}

fn describe(state: &Deferred<u32>) -> String {
    match state {
        Deferred::Pending => "pending".to_string(),
        Deferred::Resolved(value) => format!("resolved: {value}"),
        Deferred::Rejected(error) => format!("rejected: {error}"),
    }
}

#[tokio::main]
async fn main() {
    // Every call takes a little longer than the previous one.
    let calls = Arc::new(AtomicU32::new(0));
    let producer = Producer::new(move || {
        let call = calls.fetch_add(1, Ordering::Relaxed);
        async move {
            tokio::time::sleep(Duration::from_millis(100 * u64::from(call + 1))).await;
            Ok::<_, Error>(call)
        }
    });

    let controller = Controller::builder(producer)
        .spawner(TokioSpawner(tokio::runtime::Handle::current()))
        .name("counter")
        .build();

    tokio::time::sleep(Duration::from_millis(150)).await;
    println!("After first run: {}", controller.with_state(describe));

    // Soft reload, the previous value stays visible.
    controller.reload(false);
    println!("Right after soft reload: {}", controller.with_state(describe));
    tokio::time::sleep(Duration::from_millis(250)).await;
    println!("After soft reload: {}", controller.with_state(describe));

    // Hard reload, pending right away.
    controller.reload(true);
    println!("Right after hard reload: {}", controller.with_state(describe));

    // Reload again before the hard reload lands; only the latest run counts.
    let handle = controller.reload_handle();
    handle.reload(false);
    tokio::time::sleep(Duration::from_millis(500)).await;
    println!("After superseded reload: {}", controller.with_state(describe));
}
