//! Structural before-image and post-render cleanup.
//!
//! Attribute-level changes are detected by the (external) renderer, which
//! keeps previous property values per node. Structural changes - nodes
//! moved, added or deleted - are detected by diffing identity maps instead:
//! the first mutating operation of a request cycle stores a shallow copy of
//! the map, and the renderer compares it against the live map once the
//! build settles. Mutating operations never emit diff records themselves.

use std::collections::HashMap;

use crate::error::PageError;
use crate::types::{NodeFlags, NodeKey};
use crate::Page;

impl Page {
    /// Capture the before-image of the identity map.
    ///
    /// Idempotent per request cycle: only the first call copies; the copy
    /// survives until [`clear_delta`](Self::clear_delta). The presence of
    /// the before-image is what signals "a structural delta is due".
    pub fn mark_structural_change(&mut self) {
        if self.before_map.is_some() {
            return;
        }
        tracing::trace!(nodes = self.identity.len(), "structural before-image captured");
        self.before_map = Some(self.identity.clone());
    }

    /// The identity map as it was before this cycle's first structural
    /// change, or `None` when no structure changed.
    pub fn before_map(&self) -> Option<&HashMap<String, NodeKey>> {
        self.before_map.as_ref()
    }

    /// Queue a node for silent removal after the next render.
    ///
    /// Used for nodes the client side tears down on its own: removing them
    /// during the cycle would produce a spurious delta, so they are dropped
    /// from the tree only after the response went out.
    pub fn add_remove_after_render(&mut self, key: NodeKey) {
        self.remove_after_render.push(key);
    }

    /// Nodes queued for post-render removal.
    pub fn remove_after_render_list(&self) -> &[NodeKey] {
        &self.remove_after_render
    }

    /// Forget all delta state once a response has been fully rendered.
    ///
    /// Drops the queued post-render nodes from the tree, discards the
    /// before-image, and clears the per-node change markers, leaving the
    /// tree clean for the next request cycle.
    pub fn clear_delta(&mut self) -> Result<(), PageError> {
        for key in std::mem::take(&mut self.remove_after_render) {
            if self.is_attached(key) {
                self.remove_child(key)?;
            }
        }
        self.before_map = None;
        self.clear_change_flags(self.root);
        Ok(())
    }

    fn clear_change_flags(&mut self, key: NodeKey) {
        let Some(slot) = self.arena.get_mut(key) else { return };
        slot.flags
            .remove(NodeFlags::CHILD_UPDATES | NodeFlags::CHILDREN_REPLACED);
        let children = slot.children.clone();
        for child in children {
            self.clear_change_flags(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test_util::{inert_leaf, new_page};
    use crate::types::NodeFlags;

    #[test]
    fn test_before_image_captured_once_per_cycle() {
        let mut page = new_page();
        page.clear_delta().unwrap();
        assert!(page.before_map().is_none());

        let a = page.add_child(page.root(), inert_leaf()).unwrap();
        let before = page.before_map().expect("first mutation captures");
        let captured = before.len();

        // Further mutations in the same cycle must not refresh the image.
        page.add_child(page.root(), inert_leaf()).unwrap();
        page.remove_child(a).unwrap();
        assert_eq!(page.before_map().unwrap().len(), captured);
    }

    #[test]
    fn test_clear_delta_resets_markers() {
        let mut page = new_page();
        page.add_child(page.root(), inert_leaf()).unwrap();
        assert!(page.before_map().is_some());
        assert!(page
            .node_flags(page.root())
            .unwrap()
            .contains(NodeFlags::CHILD_UPDATES));

        page.clear_delta().unwrap();
        assert!(page.before_map().is_none());
        assert!(!page
            .node_flags(page.root())
            .unwrap()
            .contains(NodeFlags::CHILD_UPDATES));
    }

    #[test]
    fn test_remove_after_render_drops_nodes_without_delta() {
        let mut page = new_page();
        let a = page.add_child(page.root(), inert_leaf()).unwrap();
        page.clear_delta().unwrap();

        page.add_remove_after_render(a);
        assert_eq!(page.remove_after_render_list(), &[a]);

        page.clear_delta().unwrap();
        assert!(!page.is_attached(a));
        assert!(page.remove_after_render_list().is_empty());
        // The removal happened after the render: no fresh before-image may
        // survive into the next cycle.
        assert!(page.before_map().is_none());
    }
}
