use std::{sync::Arc, time::Duration};

use deferred::{Controller, Error, Producer};
use futures::task::{FutureObj, Spawn, SpawnError};
use futures_lite::StreamExt;
use macro_rules_attribute::apply;
use smol::Timer;
use smol_macros::{Executor, main};

struct SmolSpawner(Arc<smol::Executor<'static>>);

impl Spawn for SmolSpawner {
    fn spawn_obj(&self, future: FutureObj<'static, ()>) -> Result<(), SpawnError> {
        self.0.spawn(future).detach();
        Ok(())
    }
}

#[apply(main!)]
async fn main(ex: Arc<Executor<'static>>) {
    let producer = Producer::new(|| async {
        Timer::after(Duration::from_millis(200)).await;
        Ok::<_, Error>("fetched")
    });

    let controller = Controller::builder(producer)
        .spawner(SmolSpawner(ex))
        .name("smol")
        .build();

    let mut changes = controller.changes();
    controller.reload(true);
    while let Some(state) = changes.next().await {
        println!("State changed: {state:?}");
        if state.is_resolved() {
            break;
        }
    }
}
