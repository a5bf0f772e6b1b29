//! Floating surface stack.
//!
//! Overlays are nodes rendered above the base layout with an explicit
//! stacking order. The page keeps them in a stack whose z-orders only ever
//! grow: a new overlay lands strictly above the current top, so re-opening
//! dialogs keeps climbing instead of fighting over a fixed band. A modal
//! overlay gets a synthesized full-surface backdrop node directly below it;
//! clicking the backdrop asks the overlay to close itself - the overlay
//! decides what that means.

use crate::error::{NodeError, PageError};
use crate::node::{Node, NodeBehavior, NodeCtx};
use crate::types::{NodeFlags, NodeKey};
use crate::Page;

// =============================================================================
// Stack entry
// =============================================================================

/// Bookkeeping for one stacked overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayEntry {
    pub node: NodeKey,
    pub z_index: i32,
    pub modal: bool,
    backdrop: Option<NodeKey>,
}

impl OverlayEntry {
    /// The synthesized backdrop node, for modal overlays.
    pub fn backdrop(&self) -> Option<NodeKey> {
        self.backdrop
    }
}

/// Behavior of the synthesized backdrop. It renders nothing itself; the
/// (external) renderer recognizes the backdrop flag and covers the surface.
struct Backdrop;

impl NodeBehavior for Backdrop {
    fn build(&mut self, _ctx: &mut NodeCtx<'_>) -> Result<(), NodeError> {
        Ok(())
    }
}

// =============================================================================
// Page surface
// =============================================================================

impl Page {
    /// Stack a detached node as a floating surface over the base layout.
    ///
    /// No-op when the node is already stacked. Otherwise the node gets a
    /// z-order strictly above every stacked overlay and is appended to the
    /// root content, after everything else. A modal overlay additionally
    /// gets a backdrop node just below it in z-order.
    pub fn add_overlay(&mut self, key: NodeKey, modal: bool) -> Result<(), PageError> {
        if self.overlays.iter().any(|e| e.node == key) {
            return Ok(());
        }
        if self.slot(key)?.is_attached() {
            return Err(PageError::StillAttached);
        }

        // Strictly above the current top of the stack.
        let mut z = self.options().overlay_base_z;
        let step = self.options().overlay_z_step;
        for entry in &self.overlays {
            if entry.z_index >= z {
                z = entry.z_index + step;
            }
        }
        self.slot_mut(key)?.z_index = Some(z);

        let backdrop = if modal {
            let b = self.add_child(self.root, Node::leaf(Backdrop))?;
            {
                let slot = self.slot_mut(b)?;
                slot.z_index = Some(z - 1);
                slot.flags |= NodeFlags::BACKDROP;
            }
            Some(b)
        } else {
            None
        };

        self.overlays.push(OverlayEntry { node: key, z_index: z, modal, backdrop });
        // Backdrop first, overlay after: the overlay is always last in the
        // root's child list.
        self.attach_child(self.root, key)?;
        tracing::debug!(%key, z_index = z, modal, "overlay stacked");
        Ok(())
    }

    /// Drop an overlay's stack bookkeeping and its backdrop.
    ///
    /// No-op when the node is not stacked. Removing the overlay node itself
    /// from the tree stays the caller's job.
    pub fn remove_overlay(&mut self, key: NodeKey) -> Result<(), PageError> {
        let Some(pos) = self.overlays.iter().position(|e| e.node == key) else {
            return Ok(());
        };
        let entry = self.overlays.remove(pos);
        self.drop_backdrop(entry.backdrop)?;
        if let Some(slot) = self.arena.get_mut(key) {
            slot.z_index = None;
        }
        Ok(())
    }

    /// The overlay stack, bottom to top.
    pub fn overlays(&self) -> &[OverlayEntry] {
        &self.overlays
    }

    /// The z-order assigned to a stacked overlay or its backdrop.
    pub fn z_index(&self, key: NodeKey) -> Option<i32> {
        self.arena.get(key)?.z_index
    }

    /// Route a click on a modal backdrop to its overlay's close hook.
    pub fn backdrop_clicked(&mut self, backdrop: NodeKey) -> Result<(), PageError> {
        let overlay = self
            .overlays
            .iter()
            .find(|e| e.backdrop == Some(backdrop))
            .map(|e| e.node)
            .ok_or(PageError::NotOwned { key: backdrop })?;
        self.with_behavior(overlay, |b, ctx| b.on_close_request(ctx));
        Ok(())
    }

    /// Called when a node leaves the page: an overlay that detaches takes
    /// its stack entry and backdrop with it.
    pub(crate) fn overlay_detached(&mut self, key: NodeKey) -> Result<(), PageError> {
        let Some(pos) = self.overlays.iter().position(|e| e.node == key) else {
            return Ok(());
        };
        let entry = self.overlays.remove(pos);
        self.drop_backdrop(entry.backdrop)
    }

    fn drop_backdrop(&mut self, backdrop: Option<NodeKey>) -> Result<(), PageError> {
        let Some(backdrop) = backdrop else { return Ok(()) };
        if self.is_attached(backdrop) {
            self.remove_child(backdrop)?;
        }
        // The engine synthesized it; nothing else can hold the key.
        self.discard(backdrop)
    }
}
