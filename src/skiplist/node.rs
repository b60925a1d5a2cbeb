// Copyright (c) Sienna Satterwhite, CesiumDB Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use std::ops::{
    Index,
    IndexMut,
};

/// Handle to a node slot inside a [`NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

/// The head sentinel always occupies the first slot.
pub(crate) const HEAD: NodeId = NodeId(0);

/// Nodes make up the skip list. Every node carries a vector of forward links,
/// one per level it reaches, so `forward.len() == level + 1`. The links are
/// plain arena handles; the arena slot is the only owner of the node.
///
/// `value` is only ever `None` for the head sentinel.
#[derive(Debug)]
pub(crate) struct Node<T> {
    value: Option<T>,
    forward: Vec<Option<NodeId>>,
}

impl<T> Node<T> {
    /// Create a valueless head node reaching every level up to `max_level`.
    pub(crate) fn head(max_level: usize) -> Self {
        Node {
            value: None,
            forward: vec![None; max_level + 1],
        }
    }

    pub(crate) fn new(value: T, level: usize) -> Self {
        Node {
            value: Some(value),
            forward: vec![None; level + 1],
        }
    }

    pub(crate) fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// The highest level this node is linked on.
    pub(crate) fn level(&self) -> usize {
        self.forward.len() - 1
    }

    /// The successor on `level`, or `None` at the end of the level or when
    /// this node does not reach `level`.
    pub(crate) fn next(&self, level: usize) -> Option<NodeId> {
        self.forward.get(level).copied().flatten()
    }

    pub(crate) fn set_next(&mut self, level: usize, next: Option<NodeId>) {
        self.forward[level] = next;
    }

    pub(crate) fn into_value(self) -> Option<T> {
        self.value
    }
}

/// Slab-style storage for the nodes of one list. Released slots are recycled
/// by later allocations, so a handle must never be followed after release.
#[derive(Debug)]
pub(crate) struct NodeArena<T> {
    slots: Vec<Option<Node<T>>>,
    free: Vec<usize>,
}

impl<T> NodeArena<T> {
    /// Create an arena holding only the head sentinel.
    pub(crate) fn new(max_level: usize) -> Self {
        NodeArena {
            slots: vec![Some(Node::head(max_level))],
            free: Vec::new(),
        }
    }

    pub(crate) fn alloc(&mut self, node: Node<T>) -> NodeId {
        match self.free.pop() {
            | Some(idx) => {
                self.slots[idx] = Some(node);
                NodeId(idx)
            },
            | None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            },
        }
    }

    /// Release a slot, handing back the node it held. The head can never be
    /// released.
    pub(crate) fn release(&mut self, id: NodeId) -> Option<Node<T>> {
        if id == HEAD {
            return None;
        }
        let node = self.slots.get_mut(id.0)?.take()?;
        self.free.push(id.0);
        Some(node)
    }

    /// Drop every node except the head, and clear the head's links.
    pub(crate) fn reset(&mut self) {
        let max_level = self[HEAD].level();
        self.slots.clear();
        self.free.clear();
        self.slots.push(Some(Node::head(max_level)));
    }

    /// Number of live nodes, head included.
    pub(crate) fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}

impl<T> Index<NodeId> for NodeArena<T> {
    type Output = Node<T>;

    fn index(&self, id: NodeId) -> &Self::Output {
        match self.slots.get(id.0) {
            | Some(Some(node)) => node,
            | _ => unreachable!("followed a released node handle {:?}", id),
        }
    }
}

impl<T> IndexMut<NodeId> for NodeArena<T> {
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        match self.slots.get_mut(id.0) {
            | Some(Some(node)) => node,
            | _ => unreachable!("followed a released node handle {:?}", id),
        }
    }
}
