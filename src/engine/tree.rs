//! Structural tree mutation.
//!
//! All operations that change parent/child structure live here. Each one
//! does three things besides the mutation itself: capture the before-image
//! of the identity map (first mutation of the cycle only), flag the changed
//! container and its ancestors so a changed-only build can find its way
//! down, and register or unregister the moved subtree.

use crate::engine::arena::Slot;
use crate::error::PageError;
use crate::node::Node;
use crate::types::{NodeFlags, NodeKey};
use crate::Page;

impl Page {
    /// Append a new child under `parent`.
    ///
    /// If `parent` is attached the child subtree registers immediately;
    /// otherwise it stays detached until an attached ancestor appears.
    pub fn add_child(&mut self, parent: NodeKey, node: Node) -> Result<NodeKey, PageError> {
        self.ensure_container(parent)?;
        let key = self.arena.insert(Slot::from_template(node));
        self.slot_mut(key)?.parent = Some(parent);
        self.slot_mut(parent)?.children.push(key);

        if self.slot(parent)?.is_attached() {
            self.mark_structural_change();
            self.flag_child_updates_upward(parent);
            self.register_subtree(key)?;
        }
        Ok(key)
    }

    /// Append an existing detached subtree under `parent`.
    ///
    /// The subtree keeps any identifiers it was assigned before, so a
    /// detach-then-attach move renders as a move rather than a fresh create.
    pub fn attach_child(&mut self, parent: NodeKey, key: NodeKey) -> Result<(), PageError> {
        self.ensure_container(parent)?;
        if self.slot(key)?.is_attached() {
            return Err(PageError::StillAttached);
        }

        // Unlink from a previous (necessarily detached) parent.
        if let Some(old) = self.slot(key)?.parent {
            self.slot_mut(old)?.children.retain(|c| *c != key);
        }
        self.slot_mut(key)?.parent = Some(parent);
        self.slot_mut(parent)?.children.push(key);

        if self.slot(parent)?.is_attached() {
            self.mark_structural_change();
            self.flag_child_updates_upward(parent);
            self.register_subtree(key)?;
        }
        Ok(())
    }

    /// Detach a node (and its whole subtree) from its parent.
    ///
    /// The subtree stays in page storage so it can be re-attached; use
    /// [`discard`](Self::discard) to free it for good.
    pub fn remove_child(&mut self, key: NodeKey) -> Result<(), PageError> {
        if key == self.root {
            return Err(PageError::RootDetach);
        }
        let parent = self.slot(key)?.parent.ok_or(PageError::NotOwned { key })?;
        let was_attached = self.slot(key)?.is_attached();

        if was_attached {
            self.mark_structural_change();
            self.unregister_subtree(key)?;
        }
        self.slot_mut(parent)?.children.retain(|c| *c != key);
        self.slot_mut(key)?.parent = None;
        if was_attached {
            self.flag_child_updates_upward(parent);
        }
        Ok(())
    }

    /// Drop every child of `parent` and install `nodes` in their place.
    ///
    /// The container is flagged as wholesale-replaced, which escalates it to
    /// a full subtree rebuild on the next changed-only build.
    pub fn replace_children(
        &mut self,
        parent: NodeKey,
        nodes: Vec<Node>,
    ) -> Result<Vec<NodeKey>, PageError> {
        self.remove_all_children(parent)?;
        let mut keys = Vec::with_capacity(nodes.len());
        for node in nodes {
            keys.push(self.add_child(parent, node)?);
        }
        Ok(keys)
    }

    /// Drop every child of `parent`, flagging it as wholesale-replaced.
    pub fn remove_all_children(&mut self, parent: NodeKey) -> Result<(), PageError> {
        self.ensure_container(parent)?;
        let attached = self.slot(parent)?.is_attached();
        if attached {
            self.mark_structural_change();
        }

        let old = self.slot(parent)?.children.clone();
        for child in old {
            if self.is_attached(child) {
                self.unregister_subtree(child)?;
            }
            self.slot_mut(child)?.parent = None;
        }
        self.slot_mut(parent)?.children.clear();

        if attached {
            self.slot_mut(parent)?.flags |= NodeFlags::CHILDREN_REPLACED;
            self.flag_child_updates_upward(parent);
        }
        Ok(())
    }

    /// Free a detached subtree's storage. Keys into it become invalid.
    pub fn discard(&mut self, key: NodeKey) -> Result<(), PageError> {
        if self.slot(key)?.is_attached() {
            return Err(PageError::StillAttached);
        }
        if let Some(old) = self.slot(key)?.parent {
            self.slot_mut(old)?.children.retain(|c| *c != key);
        }

        let mut stack = vec![key];
        while let Some(cur) = stack.pop() {
            if let Some(slot) = self.arena.remove(cur) {
                stack.extend(slot.children);
            }
            self.pending.unmark(cur);
            if self.focus == Some(cur) {
                self.focus = None;
            }
            if self.active == Some(cur) {
                self.active = None;
            }
            if self.pop_in == Some(cur) {
                self.pop_in = None;
            }
            self.remove_after_render.retain(|k| *k != cur);
        }
        Ok(())
    }

    /// Mark a node as needing a rebuild on the next build pass.
    ///
    /// This is the entry point event dispatch uses when an inbound action
    /// changed component state. The changed-only build finds the node by the
    /// child-update flags planted on its ancestor chain.
    pub fn mark_changed(&mut self, key: NodeKey) -> Result<(), PageError> {
        let (attached, start) = {
            let slot = self.slot_mut(key)?;
            slot.flags |= NodeFlags::NEEDS_BUILD;
            let start = if slot.is_container() { Some(key) } else { slot.parent };
            (slot.is_attached(), start)
        };
        if attached {
            self.pending.mark(key);
            if let Some(start) = start {
                self.flag_child_updates_upward(start);
            }
        }
        Ok(())
    }

    /// Walk from `start` to the root, planting the child-update flag.
    /// Stops early when a flagged ancestor is found - flags always travel
    /// all the way up, so a flagged node implies a flagged chain above it.
    pub(crate) fn flag_child_updates_upward(&mut self, start: NodeKey) {
        let mut cur = Some(start);
        while let Some(key) = cur {
            let Some(slot) = self.arena.get_mut(key) else { break };
            if slot.flags.contains(NodeFlags::CHILD_UPDATES) {
                break;
            }
            slot.flags |= NodeFlags::CHILD_UPDATES;
            cur = slot.parent;
        }
    }

    fn ensure_container(&self, key: NodeKey) -> Result<(), PageError> {
        if !self.slot(key)?.is_container() {
            return Err(PageError::NotAContainer { key });
        }
        Ok(())
    }
}
