//! Action trees: named mutators, arbitrarily namespaced.
//!
//! The definition side is a tagged tree (`Leaf` holds a user function taking
//! the store as its first argument, `Branch` a nested namespace). Binding
//! happens once, at store construction: the bound tree mirrors the definition
//! tree, but every leaf has the store pre-bound, so callers invoke it with
//! call arguments only.

use std::ops::Index;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use serde_json::Value;

use crate::store::{Store, StoreInner};

/// A user-supplied action: receives the owning store plus its call arguments.
pub type ActionFn = dyn Fn(&Store, &[Value]);

/// One node of the action-definition tree.
pub enum ActionNode {
    Leaf(Rc<ActionFn>),
    Branch(IndexMap<String, ActionNode>),
}

/// Builder for the definition tree handed to [`create_store`].
///
/// An empty tree is valid; a store does not have to expose actions at all.
///
/// [`create_store`]: crate::create_store
#[derive(Default)]
pub struct ActionTree {
    nodes: IndexMap<String, ActionNode>,
}

impl ActionTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a leaf action under `name`.
    pub fn action(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&Store, &[Value]) + 'static,
    ) -> Self {
        self.nodes.insert(name.into(), ActionNode::Leaf(Rc::new(f)));
        self
    }

    /// Nests `subtree` as a namespace under `name`.
    pub fn group(mut self, name: impl Into<String>, subtree: ActionTree) -> Self {
        self.nodes
            .insert(name.into(), ActionNode::Branch(subtree.nodes));
        self
    }

    pub(crate) fn bind(self, store: &Weak<StoreInner>) -> Actions {
        bind_branch(self.nodes, store)
    }
}

/// A bound action tree, cached on its store at construction.
///
/// Every node sits behind an `Rc`, so projecting a subtree is a cheap handle
/// clone with stable identity — the property the hook's projected-actions
/// memoization keys on.
#[derive(Clone)]
pub struct Actions(Rc<Node>);

enum Node {
    Leaf(Rc<dyn Fn(&[Value])>),
    Branch(IndexMap<String, Actions>),
}

fn bind_branch(nodes: IndexMap<String, ActionNode>, store: &Weak<StoreInner>) -> Actions {
    let bound = nodes
        .into_iter()
        .map(|(name, node)| (name, bind_node(node, store)))
        .collect();
    Actions(Rc::new(Node::Branch(bound)))
}

fn bind_node(node: ActionNode, store: &Weak<StoreInner>) -> Actions {
    match node {
        ActionNode::Leaf(f) => {
            let store = store.clone();
            Actions(Rc::new(Node::Leaf(Rc::new(move |args: &[Value]| {
                match store.upgrade() {
                    Some(inner) => f(&Store::from_inner(inner), args),
                    None => log::warn!("action invoked after its store was dropped; ignoring"),
                }
            }))))
        }
        ActionNode::Branch(nodes) => bind_branch(nodes, store),
    }
}

impl Actions {
    /// Child lookup on a namespace node. `None` for missing names and leaves.
    pub fn get(&self, name: &str) -> Option<&Actions> {
        match &*self.0 {
            Node::Branch(children) => children.get(name),
            Node::Leaf(_) => None,
        }
    }

    /// Invokes a leaf action.
    ///
    /// Panics when called on a namespace node — misuse of the tree is the
    /// caller's error and is not translated by the core.
    pub fn call(&self, args: &[Value]) {
        match &*self.0 {
            Node::Leaf(f) => f(args),
            Node::Branch(_) => panic!("called a namespace node as an action"),
        }
    }

    /// True when both handles point at the same bound node.
    pub fn ptr_eq(a: &Actions, b: &Actions) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    pub(crate) fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl Index<&str> for Actions {
    type Output = Actions;

    fn index(&self, name: &str) -> &Actions {
        match self.get(name) {
            Some(child) => child,
            None => panic!("no action {name:?} at this node"),
        }
    }
}
