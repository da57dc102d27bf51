//! # A hook-style shared store
//!
//! One store of nested plain-data state, mutated through named actions, with
//! components subscribed to selector projections — only components whose
//! *projected* state actually changed re-render. Three pieces:
//!
//! - [`Store`] — canonical state, shallow-merge mutation, bound actions.
//! - [`Store::use_store`] — the subscription hook a component calls while
//!   rendering.
//! - [`Store::batch_updates`] — collapses a run of mutations into a single
//!   notification pass.
//!
//! ## Stores and actions
//!
//! A store is an explicit owned value; create as many as you need. Actions
//! are defined once, in an arbitrarily nested tree, and bound to the store
//! at construction so callers never pass the store explicitly:
//!
//! ```rust
//! use holdall_core::{ActionTree, create_store, patch};
//! use serde_json::json;
//!
//! let store = create_store(
//!     json!({ "counter": 0 }),
//!     ActionTree::new().action("set", |store, args| {
//!         store.set_state(patch!({ "counter": args[0].clone() }));
//!     }),
//! )
//! .unwrap();
//!
//! store.actions()["set"].call(&[json!(2)]);
//! assert_eq!(store.state()["counter"], json!(2));
//! ```
//!
//! `set_state` merges shallowly at the top level only: a patched key replaces
//! that key's entire value; everything else keeps its whole subtree.
//!
//! ## Subscribing components
//!
//! The hook needs two capabilities from the host framework, abstracted as
//! [`ComposeHost`]. [`MountScope`] is a minimal built-in host:
//!
//! ```rust
//! use std::rc::Rc;
//!
//! use holdall_core::{ActionTree, MountScope, StateSelector, create_store, patch};
//! use serde_json::json;
//!
//! let store = create_store(json!({ "counter": 0 }), ActionTree::new()).unwrap();
//!
//! let scope = MountScope::new();
//! let selector: StateSelector = Rc::new(|s| s["counter"].clone());
//! let (counter, _actions) = store.use_store(&scope, Some(selector), None);
//! assert_eq!(counter, Some(json!(0)));
//!
//! store.set_state(patch!({ "counter": 1 }));
//! assert_eq!(scope.take_scheduled(), Some(json!(1)));
//!
//! scope.unmount();
//! assert_eq!(store.listener_count(), 0);
//! ```
//!
//! Change detection is deep structural equality on the selector's output, so
//! the fresh top-level identities produced by the merge never cause spurious
//! renders on their own.
//!
//! ## Batching
//!
//! ```rust
//! # use holdall_core::{ActionTree, create_store, patch};
//! # use serde_json::json;
//! # let store = create_store(json!({ "counter": 0 }), ActionTree::new()).unwrap();
//! store.batch_updates(|| {
//!     store.set_state(patch!({ "counter": 1 }));
//!     store.set_state(patch!({ "counter": 2 }));
//! });
//! // subscribers saw one pass, with counter == 2
//! ```

pub mod actions;
pub mod error;
pub mod hook;
pub mod host;
mod registry;
pub mod runtime;
pub mod store;
pub mod tests;

pub use actions::*;
pub use error::*;
pub use hook::*;
pub use host::*;
pub use runtime::*;
pub use store::*;

/// Builds a patch map for [`Store::set_state`] from an object literal.
///
/// The body is `json!` syntax; values may be arbitrarily nested data or
/// expressions.
#[macro_export]
macro_rules! patch {
    ({ $($body:tt)* }) => {{
        match $crate::__json::json!({ $($body)* }) {
            $crate::__json::Value::Object(map) => map,
            _ => ::core::unreachable!(),
        }
    }};
}

#[doc(hidden)]
pub use serde_json as __json;
