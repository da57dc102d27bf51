//! The framework-facing entry point: subscribe a component to projections of
//! the store for the lifetime of its instance.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::actions::Actions;
use crate::host::{Cleanup, ComposeHost};
use crate::registry::ListenerFn;
use crate::store::Store;

/// Projects full state down to the slice a subscriber cares about.
pub type StateSelector = Rc<dyn Fn(&Value) -> Value>;

/// Projects the bound action tree down to a subtree.
pub type ActionsSelector = Rc<dyn Fn(&Actions) -> Actions>;

impl Store {
    /// Subscribes the component currently rendering on `host`.
    ///
    /// Returns `(projected_state, projected_actions)`:
    ///
    /// - With a state selector, the projection is computed synchronously on
    ///   every call — once per render. At mount, a listener is registered
    ///   that re-projects on every mutation, compares to the last projected
    ///   value by deep structural equality, and only on change fires the
    ///   host's render trigger with the new projection. The shallow merge
    ///   producing fresh top-level identities therefore never causes a
    ///   spurious render: the comparison is on the selected value, not the
    ///   container. The listener is deregistered by the effect's cleanup at
    ///   unmount.
    /// - Without a state selector, the projection is `None` and no listener
    ///   is registered at all — the subscription never reacts to state
    ///   changes and only the actions projection is meaningful.
    /// - The actions projection is memoized per (selector identity, bound
    ///   tree identity), so repeated renders with the same selector handle
    ///   get the identical `Actions` handle back.
    ///
    /// Selectors are captured once, at mount: passing a different selector
    /// on a later render of the same instance does not re-register the
    /// listener. Unmounting never cancels in-flight deferred work; a later
    /// `set_state` simply no longer reaches this component.
    pub fn use_store(
        &self,
        host: &dyn ComposeHost,
        state_selector: Option<StateSelector>,
        actions_selector: Option<ActionsSelector>,
    ) -> (Option<Value>, Actions) {
        let actions = match &actions_selector {
            Some(selector) => self.projected_actions(selector),
            None => self.actions().clone(),
        };

        let Some(selector) = state_selector else {
            return (None, actions);
        };

        let projected = self.with_state(|state| selector(state));

        let trigger = host.render_trigger();
        let store = self.clone();
        let initial = projected.clone();
        host.on_mount(Box::new(move || {
            let last = RefCell::new(initial);
            let run: ListenerFn = Rc::new(move |new_state: &Value| {
                let mapped = selector(new_state);
                if mapped != *last.borrow() {
                    *last.borrow_mut() = mapped.clone();
                    trigger(mapped);
                }
            });
            let id = store.add_listener(run);
            let cleanup: Cleanup = Box::new(move || store.remove_listener(id));
            cleanup
        }));

        (Some(projected), actions)
    }

    fn projected_actions(&self, selector: &ActionsSelector) -> Actions {
        let key = (
            Rc::as_ptr(selector) as *const () as usize,
            self.actions().identity(),
        );
        if let Some(cached) = self.actions_memo().borrow().get(&key) {
            return cached.clone();
        }
        let projected = selector(self.actions());
        self.actions_memo()
            .borrow_mut()
            .insert(key, projected.clone());
        projected
    }
}
