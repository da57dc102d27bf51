use std::rc::Rc;

use anyhow::Result;
use holdall_core::{ActionTree, MountScope, StateSelector, create_store, patch};
use serde_json::json;

fn render(name: &str, scope: &MountScope) {
    match scope.take_scheduled() {
        Some(value) => log::info!("{name} re-rendered with {value}"),
        None => log::info!("{name} unchanged"),
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let store = create_store(
        json!({ "counter": 0, "status": "idle" }),
        ActionTree::new()
            .action("increment", |store, _| {
                let next = store.with_state(|s| s["counter"].as_i64().unwrap_or(0) + 1);
                store.set_state(patch!({ "counter": next }));
            })
            .group(
                "session",
                ActionTree::new().action("set_status", |store, args| {
                    store.set_state(patch!({ "status": args[0].clone() }));
                }),
            ),
    )?;

    // two components, each projecting its own slice of the store
    let header = MountScope::new();
    let header_counter: StateSelector = Rc::new(|s| s["counter"].clone());
    let (counter, actions) = store.use_store(&header, Some(header_counter), None);
    log::info!("header mounted, counter = {counter:?}");

    let footer = MountScope::new();
    let footer_status: StateSelector = Rc::new(|s| s["status"].clone());
    store.use_store(&footer, Some(footer_status), None);
    log::info!("footer mounted, {} listeners live", store.listener_count());

    actions["increment"].call(&[]);
    render("header", &header); // re-rendered with 1
    render("footer", &footer); // unchanged: status didn't move

    actions["session"]["set_status"].call(&[json!("busy")]);
    render("header", &header);
    render("footer", &footer); // re-rendered with "busy"

    // three mutations, one notification pass per subscriber
    store.batch_updates(|| {
        store.set_state(patch!({ "counter": 10 }));
        store.set_state(patch!({ "counter": 20 }));
        store.set_state(patch!({ "status": "done" }));
    });
    render("header", &header); // re-rendered with 20, never saw 10
    render("footer", &footer); // re-rendered with "done"

    footer.unmount();
    log::info!("footer unmounted, {} listener left", store.listener_count());

    store.set_state(patch!({ "status": "idle" }));
    render("header", &header); // unchanged
    log::info!("final state: {}", store.state());

    Ok(())
}
