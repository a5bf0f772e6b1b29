//! Node identity registry - identifier minting and the attach/detach
//! protocol.
//!
//! Every attached node has exactly one identity-map entry. Identifiers are
//! minted from a per-page counter encoded as `_` plus base-36 digits
//! (`0-9`, `A-Z`, least-significant digit first), so they are short, unique
//! for the page's lifetime, and never reused even after a node goes away.
//!
//! A node that detaches keeps its identifier; if it re-attaches while the
//! identifier is still free it is reused, so a move (detach + attach)
//! renders as a move instead of a delete-plus-create of a fresh identifier.

use std::collections::hash_map::Entry;

use crate::error::PageError;
use crate::types::{NodeFlags, NodeKey};
use crate::Page;

impl Page {
    /// Mint the next identifier.
    pub(crate) fn next_node_id(&mut self) -> String {
        let mut id = self.next_id;
        self.next_id += 1;

        let mut out = String::with_capacity(8);
        out.push('_');
        while id != 0 {
            let d = (id % 36) as u8;
            let c = if d <= 9 { b'0' + d } else { b'A' + (d - 10) };
            out.push(c as char);
            id /= 36;
        }
        out
    }

    /// Register a node and all its (detached) descendants, parent first.
    ///
    /// Attach hooks may add further children; those self-register through
    /// the tree operations and are skipped here.
    pub(crate) fn register_subtree(&mut self, key: NodeKey) -> Result<(), PageError> {
        self.register_node(key)?;
        let children = self.slot(key)?.children.clone();
        for child in children {
            if !self.is_attached(child) {
                self.register_subtree(child)?;
            }
        }
        Ok(())
    }

    fn register_node(&mut self, key: NodeKey) -> Result<(), PageError> {
        if self.slot(key)?.is_attached() {
            return Err(PageError::StillAttached);
        }

        // Keep a supplied identifier when still free, otherwise mint one.
        let id = match self.slot(key)?.id.clone() {
            Some(id) if !self.identity.contains_key(&id) => id,
            _ => self.next_node_id(),
        };
        match self.identity.entry(id.clone()) {
            Entry::Occupied(_) => return Err(PageError::DuplicateId { id }),
            Entry::Vacant(entry) => {
                entry.insert(key);
            }
        }

        {
            let slot = self.slot_mut(key)?;
            slot.id = Some(id.clone());
            slot.flags |= NodeFlags::ATTACHED;
        }
        tracing::trace!(id = %id, %key, "node attached");

        // Ask the node for its page-level resource requirements.
        let contributions = self
            .slot(key)?
            .behavior
            .as_ref()
            .map(|b| b.header_contributions())
            .unwrap_or_default();
        for entry in contributions {
            self.contributors.add(entry.contribution, entry.order);
        }

        self.with_behavior(key, |b, ctx| b.on_attach(ctx));

        // Resolve a focus request made before attachment.
        let focus_requested = {
            let slot = self.slot_mut(key)?;
            let requested = slot.flags.contains(NodeFlags::FOCUS_REQUESTED);
            slot.flags.remove(NodeFlags::FOCUS_REQUESTED);
            requested
        };
        if focus_requested {
            self.focus = Some(key);
        }

        self.slot_mut(key)?.flags |= NodeFlags::NEEDS_BUILD;
        self.pending.mark(key);

        // A message carried while detached must not be lost: hand it to the
        // nearest fence now that the node has ancestors.
        let carried = self
            .slot(key)?
            .behavior
            .as_ref()
            .and_then(|b| b.pending_message());
        if let Some(msg) = carried {
            self.post_message(key, msg)?;
        }
        Ok(())
    }

    /// Unregister a node and all its attached descendants, children first.
    pub(crate) fn unregister_subtree(&mut self, key: NodeKey) -> Result<(), PageError> {
        let children = self.slot(key)?.children.clone();
        for child in children {
            if self.is_attached(child) {
                self.unregister_subtree(child)?;
            }
        }
        self.unregister_node(key)
    }

    fn unregister_node(&mut self, key: NodeKey) -> Result<(), PageError> {
        if !self.slot(key)?.is_attached() {
            return Err(PageError::NotOwned { key });
        }
        let id = self.slot(key)?.id.clone().ok_or(PageError::MissingId)?;

        // Error attribution must never point at a detached node.
        if self.active == Some(key) {
            self.active = self.slot(key)?.parent;
        }

        self.with_behavior(key, |b, ctx| b.on_detach(ctx));

        self.slot_mut(key)?.flags.remove(NodeFlags::ATTACHED);
        if self.identity.remove(&id).is_none() {
            return Err(PageError::UnknownId { id });
        }
        self.pending.unmark(key);
        self.overlay_detached(key)?;
        tracing::trace!(id = %id, "node detached");
        Ok(())
    }
}
