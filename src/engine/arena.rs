//! Page-owned node storage.
//!
//! All nodes of a page live in one slab; the tree is expressed with
//! [`NodeKey`] handles. The parent pointer is a plain back-handle for
//! traversal - the child list is the only ownership edge, so there are no
//! reference cycles to manage.

use slab::Slab;

use crate::node::{Node, NodeBehavior};
use crate::types::{NodeFlags, NodeKey, NodeKind, UiMessage};

// =============================================================================
// Slot - one node's state
// =============================================================================

pub(crate) struct Slot {
    /// Assigned identifier. Survives detach so a re-attached node keeps its
    /// identity when still free (delta stability across move operations).
    pub id: Option<String>,
    pub kind: NodeKind,
    /// Taken out of the slot while one of its hooks runs.
    pub behavior: Option<Box<dyn NodeBehavior>>,
    pub parent: Option<NodeKey>,
    pub children: Vec<NodeKey>,
    pub flags: NodeFlags,
    /// Messages accepted by this node when it is a fence.
    pub messages: Vec<UiMessage>,
    /// z-order while stacked as an overlay.
    pub z_index: Option<i32>,
}

impl Slot {
    pub fn from_template(node: Node) -> Self {
        let mut flags = NodeFlags::NONE;
        if node.focus_requested {
            flags |= NodeFlags::FOCUS_REQUESTED;
        }
        if node.error_fence {
            flags |= NodeFlags::ERROR_FENCE;
        }
        Self {
            id: node.id,
            kind: node.kind,
            behavior: Some(node.behavior),
            parent: None,
            children: Vec::new(),
            flags,
            messages: Vec::new(),
            z_index: None,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.flags.contains(NodeFlags::ATTACHED)
    }

    pub fn is_container(&self) -> bool {
        self.kind == NodeKind::Container
    }
}

// =============================================================================
// Arena
// =============================================================================

#[derive(Default)]
pub(crate) struct Arena {
    slots: Slab<Slot>,
}

impl Arena {
    pub fn insert(&mut self, slot: Slot) -> NodeKey {
        NodeKey(self.slots.insert(slot))
    }

    pub fn remove(&mut self, key: NodeKey) -> Option<Slot> {
        self.slots.try_remove(key.0)
    }

    pub fn get(&self, key: NodeKey) -> Option<&Slot> {
        self.slots.get(key.0)
    }

    pub fn get_mut(&mut self, key: NodeKey) -> Option<&mut Slot> {
        self.slots.get_mut(key.0)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }
}
