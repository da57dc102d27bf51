use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::{Map, Value};

use crate::actions::{ActionTree, Actions};
use crate::error::{StoreError, value_kind};
use crate::registry::{ListenerFn, ListenerId, Registry};

/// Cloneable handle to one shared store.
///
/// A store owns the canonical state (always an object graph), the bound
/// action tree, and the listener registry. There is no hidden singleton:
/// every store is an explicit value returned by [`create_store`], and a
/// process can hold any number of independent ones. A store has no explicit
/// teardown; individual listeners come and go as components mount and
/// unmount.
///
/// Everything here is single-threaded and synchronous: mutation and
/// notification run on whatever call stack triggered them.
#[derive(Clone)]
pub struct Store {
    inner: Rc<StoreInner>,
}

pub(crate) struct StoreInner {
    state: RefCell<Value>,
    listeners: RefCell<Registry>,
    in_batch: Cell<bool>,
    actions: Actions,
    actions_memo: RefCell<HashMap<(usize, usize), Actions>>,
}

/// Creates a store from an initial state and an action-definition tree.
///
/// Fails with [`StoreError::InvalidInitialState`] unless `initial` is an
/// object — the one validated precondition in the core. The action tree is
/// bound eagerly, exactly once; bound leaves hold a weak handle back to the
/// store, so caching the tree on the store does not leak it.
pub fn create_store(initial: Value, actions: ActionTree) -> Result<Store, StoreError> {
    if !initial.is_object() {
        return Err(StoreError::InvalidInitialState {
            found: value_kind(&initial),
        });
    }
    let inner = Rc::new_cyclic(|weak| StoreInner {
        state: RefCell::new(initial),
        listeners: RefCell::new(Registry::new()),
        in_batch: Cell::new(false),
        actions: actions.bind(weak),
        actions_memo: RefCell::new(HashMap::new()),
    });
    Ok(Store { inner })
}

impl Store {
    pub(crate) fn from_inner(inner: Rc<StoreInner>) -> Self {
        Self { inner }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> Value {
        self.inner.state.borrow().clone()
    }

    /// Projects the current state without cloning it.
    pub fn with_state<R>(&self, f: impl FnOnce(&Value) -> R) -> R {
        f(&self.inner.state.borrow())
    }

    /// Applies `patch` as a top-level shallow merge.
    ///
    /// Each patch key replaces that key's entire value — the merge does not
    /// recurse, so a patched nested object must carry the full shape its
    /// caller wants to survive. Keys absent from the patch keep their whole
    /// subtree untouched.
    ///
    /// Outside a batch this synchronously notifies every listener, in
    /// registration order, with the post-merge state. Calls from inside an
    /// action, a batch callback, or external code are all equivalent here.
    pub fn set_state(&self, patch: Map<String, Value>) {
        {
            let mut state = self.inner.state.borrow_mut();
            if let Some(fields) = state.as_object_mut() {
                for (key, value) in patch {
                    fields.insert(key, value);
                }
            }
        }
        if !self.inner.in_batch.get() {
            self.notify_listeners();
        }
    }

    /// Runs `f` with listener notification suppressed, then fires one pass.
    ///
    /// Mutations inside `f` land in canonical state immediately; subscribers
    /// observe only the final state, in exactly one pass per call. The pass
    /// runs while the flag is still set, so mutations performed by listeners
    /// during the pass stay silent too. If `f` unwinds, the guard still
    /// restores the flag, and no pass runs for this batch.
    pub fn batch_updates(&self, f: impl FnOnce()) {
        let _guard = BatchGuard::arm(&self.inner.in_batch);
        f();
        self.notify_listeners();
    }

    /// The bound action tree, computed once at construction.
    pub fn actions(&self) -> &Actions {
        &self.inner.actions
    }

    /// Number of live subscriptions. Introspection for tests and devtools.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    fn notify_listeners(&self) {
        let state = self.inner.state.borrow().clone();
        // Registry cell released before user callbacks run: a listener may
        // mount or unmount other components mid-pass.
        let runs = self.inner.listeners.borrow().snapshot();
        for run in runs.iter() {
            run(&state);
        }
    }

    pub(crate) fn add_listener(&self, run: ListenerFn) -> ListenerId {
        self.inner.listeners.borrow_mut().add(run)
    }

    pub(crate) fn remove_listener(&self, id: ListenerId) {
        self.inner.listeners.borrow_mut().remove(id);
    }

    pub(crate) fn actions_memo(&self) -> &RefCell<HashMap<(usize, usize), Actions>> {
        &self.inner.actions_memo
    }
}

/// Restores the previous batching flag on every exit path, unwinds included.
struct BatchGuard<'a> {
    flag: &'a Cell<bool>,
    prev: bool,
}

impl<'a> BatchGuard<'a> {
    fn arm(flag: &'a Cell<bool>) -> Self {
        let prev = flag.replace(true);
        Self { flag, prev }
    }
}

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(self.prev);
    }
}
