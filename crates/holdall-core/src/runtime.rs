//! A minimal reference host, enough lifecycle to exercise the hook without a
//! real UI framework: one `MountScope` per component instance.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::Value;

use crate::host::{Cleanup, ComposeHost};

/// One component instance's render slot and lifecycle.
///
/// The render trigger stores the most recent projected value in a slot (a
/// real framework would re-run the component body); `unmount` runs the
/// cleanups registered by mount effects, in order. Also the reference for
/// embedding the hook in an actual framework.
pub struct MountScope {
    slot: Rc<RefCell<Option<Value>>>,
    fired: Rc<Cell<usize>>,
    effect_ran: Cell<bool>,
    disposers: RefCell<Vec<Cleanup>>,
}

impl MountScope {
    pub fn new() -> Self {
        Self {
            slot: Rc::new(RefCell::new(None)),
            fired: Rc::new(Cell::new(0)),
            effect_ran: Cell::new(false),
            disposers: RefCell::new(Vec::new()),
        }
    }

    /// Takes the value the trigger last scheduled for re-render, if any.
    pub fn take_scheduled(&self) -> Option<Value> {
        self.slot.borrow_mut().take()
    }

    /// How many times the render trigger fired over this scope's lifetime.
    pub fn triggers_fired(&self) -> usize {
        self.fired.get()
    }

    /// Unmounts the instance: runs every registered cleanup, in order.
    pub fn unmount(self) {
        let disposers = std::mem::take(&mut *self.disposers.borrow_mut());
        for dispose in disposers {
            dispose();
        }
    }
}

impl Default for MountScope {
    fn default() -> Self {
        Self::new()
    }
}

impl ComposeHost for MountScope {
    fn render_trigger(&self) -> Rc<dyn Fn(Value)> {
        let slot = Rc::clone(&self.slot);
        let fired = Rc::clone(&self.fired);
        Rc::new(move |value| {
            fired.set(fired.get() + 1);
            *slot.borrow_mut() = Some(value);
        })
    }

    fn on_mount(&self, effect: Box<dyn FnOnce() -> Cleanup>) {
        // At most once per instance; re-renders land here again and no-op.
        if self.effect_ran.get() {
            return;
        }
        self.effect_ran.set(true);
        self.disposers.borrow_mut().push(effect());
    }
}
