#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::rc::Rc;

    use serde_json::{Value, json};

    use crate::{
        ActionTree, Actions, ActionsSelector, MountScope, StateSelector, Store, StoreError,
        create_store, patch,
    };

    fn counter_store() -> Store {
        create_store(
            json!({ "counter": 0 }),
            ActionTree::new()
                .action("set", |store, args| {
                    store.set_state(patch!({ "counter": args[0].clone() }));
                })
                .action("increment", |store, _| {
                    let next = store.with_state(|s| s["counter"].as_i64().unwrap_or(0) + 1);
                    store.set_state(patch!({ "counter": next }));
                }),
        )
        .unwrap()
    }

    fn counter_selector() -> StateSelector {
        Rc::new(|state: &Value| state["counter"].clone())
    }

    #[test]
    fn rejects_every_non_object_initial_state() {
        for initial in [json!(null), json!(true), json!(1), json!("text"), json!([1, 2])] {
            let result = create_store(initial, ActionTree::new());
            assert!(matches!(
                result,
                Err(StoreError::InvalidInitialState { .. })
            ));
        }
    }

    #[test]
    fn object_initial_state_round_trips() {
        let initial = json!({ "appState": { "counter": 0 }, "label": "idle" });
        let store = create_store(initial.clone(), ActionTree::new()).unwrap();
        assert_eq!(store.state(), initial);
    }

    #[test]
    fn action_updates_state_synchronously() {
        let store = counter_store();
        store.actions()["set"].call(&[json!(2)]);
        assert_eq!(store.state()["counter"], json!(2));
    }

    #[test]
    fn action_can_derive_next_state_from_current() {
        let store = counter_store();
        store.actions()["increment"].call(&[]);
        store.actions()["increment"].call(&[]);
        assert_eq!(store.state()["counter"], json!(2));
    }

    #[test]
    fn set_state_works_outside_any_action() {
        let store = create_store(json!({ "counter": 0 }), ActionTree::new()).unwrap();
        store.set_state(patch!({ "counter": 2 }));
        assert_eq!(store.state()["counter"], json!(2));
    }

    #[test]
    fn deferred_action_mutates_when_it_resumes() {
        // an action whose body suspends: it stashes a continuation that
        // calls back into the mutator after the action itself returned
        let pending: Rc<RefCell<Option<Box<dyn FnOnce()>>>> = Rc::new(RefCell::new(None));
        let store = create_store(
            json!({ "counter": 0 }),
            ActionTree::new().action("set_later", {
                let pending = pending.clone();
                move |store, args| {
                    let store = store.clone();
                    let value = args[0].clone();
                    *pending.borrow_mut() = Some(Box::new(move || {
                        store.set_state(patch!({ "counter": value }));
                    }));
                }
            }),
        )
        .unwrap();

        store.actions()["set_later"].call(&[json!(2)]);
        assert_eq!(store.state()["counter"], json!(0));

        let resume = pending.borrow_mut().take().unwrap();
        resume();
        assert_eq!(store.state()["counter"], json!(2));
    }

    #[test]
    fn hook_projects_state_and_reacts_to_changes() {
        let store = counter_store();
        let scope = MountScope::new();

        let (counter, actions) = store.use_store(&scope, Some(counter_selector()), None);
        assert_eq!(counter, Some(json!(0)));
        assert_eq!(store.listener_count(), 1);

        actions["increment"].call(&[]);
        assert_eq!(scope.take_scheduled(), Some(json!(1)));

        // mutation from outside any action reaches the subscriber too
        store.set_state(patch!({ "counter": 7 }));
        assert_eq!(scope.take_scheduled(), Some(json!(7)));
    }

    #[test]
    fn selector_ignores_unrelated_keys() {
        let store = create_store(
            json!({ "a": { "counter": 0 }, "b": 0 }),
            ActionTree::new(),
        )
        .unwrap();
        let scope = MountScope::new();
        let selector: StateSelector = Rc::new(|s| s["a"]["counter"].clone());
        store.use_store(&scope, Some(selector), None);

        store.set_state(patch!({ "b": 1 }));
        assert_eq!(scope.triggers_fired(), 0);

        store.set_state(patch!({ "a": { "counter": 5 } }));
        assert_eq!(scope.triggers_fired(), 1);
        assert_eq!(scope.take_scheduled(), Some(json!(5)));
    }

    #[test]
    fn full_state_selector_uses_deep_equality() {
        let store = create_store(json!({ "a": { "x": 1 }, "b": 0 }), ActionTree::new()).unwrap();
        let scope = MountScope::new();
        let selector: StateSelector = Rc::new(|s| s.clone());
        store.use_store(&scope, Some(selector), None);

        // top-level identity churns, content does not: no re-render
        store.set_state(patch!({ "a": { "x": 1 } }));
        assert_eq!(scope.triggers_fired(), 0);

        store.set_state(patch!({ "b": 1 }));
        assert_eq!(scope.triggers_fired(), 1);
        assert_eq!(
            scope.take_scheduled(),
            Some(json!({ "a": { "x": 1 }, "b": 1 }))
        );
    }

    #[test]
    fn selectorless_subscription_registers_no_listener() {
        let store = counter_store();
        let scope = MountScope::new();

        let (state, actions) = store.use_store(&scope, None, None);
        assert_eq!(state, None);
        assert_eq!(store.listener_count(), 0);

        // never reacts to state changes; the actions are still live
        actions["set"].call(&[json!(3)]);
        assert_eq!(scope.triggers_fired(), 0);
        assert_eq!(store.state()["counter"], json!(3));
    }

    #[test]
    fn actions_projection_without_state_selector() {
        let store = counter_store();
        let scope = MountScope::new();
        let selector: ActionsSelector = Rc::new(|a| a["increment"].clone());

        let (state, increment) = store.use_store(&scope, None, Some(selector));
        assert_eq!(state, None);
        increment.call(&[]);
        assert_eq!(store.state()["counter"], json!(1));
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn projected_actions_are_memoized_per_selector() {
        let store = create_store(
            json!({ "counter": 0 }),
            ActionTree::new().group(
                "grp",
                ActionTree::new().action("noop", |_, _| {}),
            ),
        )
        .unwrap();
        let scope = MountScope::new();
        let selector: ActionsSelector = Rc::new(|a| a["grp"].clone());

        let (_, first) = store.use_store(&scope, None, Some(selector.clone()));
        let (_, second) = store.use_store(&scope, None, Some(selector));
        assert!(Actions::ptr_eq(&first, &second));
    }

    #[test]
    fn batch_collapses_mutations_into_one_pass() {
        let store = counter_store();
        let scope = MountScope::new();
        store.use_store(&scope, Some(counter_selector()), None);

        store.batch_updates(|| {
            store.set_state(patch!({ "counter": 1 }));
            store.set_state(patch!({ "counter": 2 }));
            store.set_state(patch!({ "counter": 3 }));
            // intermediate states never reached the subscriber
            assert_eq!(scope.triggers_fired(), 0);
        });

        assert_eq!(scope.triggers_fired(), 1);
        assert_eq!(scope.take_scheduled(), Some(json!(3)));
        assert_eq!(store.state()["counter"], json!(3));
    }

    #[test]
    fn batch_with_no_net_change_stays_silent() {
        let store = counter_store();
        let scope = MountScope::new();
        store.use_store(&scope, Some(counter_selector()), None);

        store.batch_updates(|| {
            store.set_state(patch!({ "counter": 5 }));
            store.set_state(patch!({ "counter": 0 }));
        });

        // the single pass ran, but the projection is back where it started
        assert_eq!(scope.triggers_fired(), 0);
    }

    #[test]
    fn panicking_batch_restores_the_flag_without_a_pass() {
        let store = counter_store();
        let scope = MountScope::new();
        store.use_store(&scope, Some(counter_selector()), None);

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            store.batch_updates(|| {
                store.set_state(patch!({ "counter": 1 }));
                panic!("boom");
            });
        }));
        assert!(outcome.is_err());

        // the mutation before the panic landed, but no pass ran for the batch
        assert_eq!(store.state()["counter"], json!(1));
        assert_eq!(scope.triggers_fired(), 0);

        // non-batched mode is back: the next mutation notifies as usual
        store.set_state(patch!({ "counter": 2 }));
        assert_eq!(scope.take_scheduled(), Some(json!(2)));
    }

    #[test]
    fn unmount_removes_exactly_this_listener() {
        let store = counter_store();
        let first = MountScope::new();
        let second = MountScope::new();
        store.use_store(&first, Some(counter_selector()), None);
        store.use_store(&second, Some(counter_selector()), None);
        assert_eq!(store.listener_count(), 2);

        second.unmount();
        assert_eq!(store.listener_count(), 1);

        // the surviving subscriber still hears mutations
        store.set_state(patch!({ "counter": 9 }));
        assert_eq!(first.take_scheduled(), Some(json!(9)));

        first.unmount();
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn remount_effect_runs_once_per_instance() {
        let store = counter_store();
        let scope = MountScope::new();

        // the same instance rendering repeatedly must not re-register
        store.use_store(&scope, Some(counter_selector()), None);
        store.use_store(&scope, Some(counter_selector()), None);
        store.use_store(&scope, Some(counter_selector()), None);
        assert_eq!(store.listener_count(), 1);
    }

    #[test]
    fn notification_order_is_registration_order() {
        let store = create_store(json!({ "counter": 0 }), ActionTree::new()).unwrap();
        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let order = order.clone();
            store.add_listener(Rc::new(move |_| order.borrow_mut().push(tag)));
        }

        store.set_state(patch!({ "counter": 1 }));
        assert_eq!(*order.borrow(), ["first", "second", "third"]);
    }

    #[test]
    fn listener_may_unmount_another_mid_pass() {
        let store = counter_store();
        let doomed = Rc::new(RefCell::new(Some(MountScope::new())));
        store.use_store(doomed.borrow().as_ref().unwrap(), Some(counter_selector()), None);

        // second listener unmounts the first's scope while a pass is running
        let unmounter = {
            let doomed = doomed.clone();
            Rc::new(move |_: &Value| {
                if let Some(scope) = doomed.borrow_mut().take() {
                    scope.unmount();
                }
            })
        };
        store.add_listener(unmounter);

        // the pass itself must complete without incident
        store.set_state(patch!({ "counter": 1 }));
        assert_eq!(store.listener_count(), 1);
    }
}
