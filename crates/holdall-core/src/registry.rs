use std::rc::Rc;

use serde_json::Value;
use smallvec::SmallVec;

pub(crate) type ListenerFn = Rc<dyn Fn(&Value)>;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct ListenerId(u64);

/// Ordered set of live subscriptions. Notification order is insertion order;
/// removal is by identity, never by value.
pub(crate) struct Registry {
    next_id: u64,
    entries: SmallVec<[Entry; 4]>,
}

struct Entry {
    id: ListenerId,
    run: ListenerFn,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            next_id: 0,
            entries: SmallVec::new(),
        }
    }

    pub(crate) fn add(&mut self, run: ListenerFn) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, run });
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) {
        self.entries.retain(|entry| entry.id != id);
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Run closures, cloned out so the pass can iterate with the registry
    /// cell released (a listener may unmount another mid-pass).
    pub(crate) fn snapshot(&self) -> SmallVec<[ListenerFn; 4]> {
        self.entries.iter().map(|entry| entry.run.clone()).collect()
    }
}
