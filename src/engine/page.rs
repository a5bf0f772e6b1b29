//! The Page - root aggregate of one browser view instance.
//!
//! One Page per logical view. It owns every node transitively reachable from
//! the root content node, the identity map, the pending-build set, and all
//! per-round-trip signal state (focus, scripts, header contributions,
//! overlays). There is no ambient global state anywhere: everything a
//! request needs travels through the Page it targets.
//!
//! The hosting layer serializes requests per page; nothing here locks.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use crate::error::PageError;
use crate::header::HeaderContributors;
use crate::node::{Node, NodeBehavior, NodeCtx};
use crate::overlay::OverlayEntry;
use crate::pipeline::PendingBuilds;
use crate::types::{NodeFlags, NodeKey, NodeKind, PageOptions, UiMessage};

use super::arena::{Arena, Slot};

// =============================================================================
// Page
// =============================================================================

pub struct Page {
    pub(crate) arena: Arena,
    pub(crate) root: NodeKey,

    /// Next counter value for minted identifiers.
    pub(crate) next_id: u64,
    /// Identifier -> node handle for every attached node.
    pub(crate) identity: HashMap<String, NodeKey>,

    /// Nodes whose build hook must run before the current pass settles.
    pub(crate) pending: PendingBuilds,
    /// Before-image of the identity map, captured on the first structural
    /// mutation of a request cycle.
    pub(crate) before_map: Option<HashMap<String, NodeKey>>,

    pub(crate) contributors: HeaderContributors,
    pub(crate) overlays: Vec<OverlayEntry>,

    /// Node the engine currently attributes activity to, for error handling.
    /// Never points at a detached node.
    pub(crate) active: Option<NodeKey>,
    pub(crate) focus: Option<NodeKey>,
    pub(crate) shelved: bool,
    pub(crate) pop_in: Option<NodeKey>,
    pub(crate) scripts: Option<String>,

    /// Nodes to silently drop from the tree after the next render.
    pub(crate) remove_after_render: Vec<NodeKey>,

    pub(crate) full_render_completed: bool,
    pub(crate) consecutive_failures: u32,
    pub(crate) request_counter: u64,

    data: HashMap<TypeId, Box<dyn Any>>,
    options: PageOptions,
}

impl Page {
    /// Create a page around its root content node.
    ///
    /// The root is forced to container kind and always acts as an error
    /// fence, whatever the template says - the root accepts any message.
    pub fn new(root: Node, options: PageOptions) -> Result<Self, PageError> {
        let mut slot = Slot::from_template(root);
        slot.kind = NodeKind::Container;
        slot.flags |= NodeFlags::ERROR_FENCE;

        let mut arena = Arena::default();
        let root_key = arena.insert(slot);

        let mut page = Self {
            arena,
            root: root_key,
            next_id: 1,
            identity: HashMap::new(),
            pending: PendingBuilds::default(),
            before_map: None,
            contributors: HeaderContributors::default(),
            overlays: Vec::new(),
            active: None,
            focus: None,
            shelved: false,
            pop_in: None,
            scripts: None,
            remove_after_render: Vec::new(),
            full_render_completed: false,
            consecutive_failures: 0,
            request_counter: 0,
            data: HashMap::new(),
            options,
        };
        page.register_subtree(root_key)?;
        Ok(page)
    }

    /// Insert a detached node into the page's storage without attaching it.
    ///
    /// Children can be added to it while detached; the whole subtree
    /// registers when it is attached under an attached parent.
    pub fn create(&mut self, node: Node) -> NodeKey {
        self.arena.insert(Slot::from_template(node))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The root content node.
    pub fn root(&self) -> NodeKey {
        self.root
    }

    pub fn options(&self) -> &PageOptions {
        &self.options
    }

    pub fn page_tag(&self) -> u64 {
        self.options.page_tag
    }

    /// The identifier assigned to a node, if it has been registered at least
    /// once.
    pub fn node_id(&self, key: NodeKey) -> Option<&str> {
        self.arena.get(key)?.id.as_deref()
    }

    /// Look a node up by its assigned identifier.
    pub fn node_by_id(&self, id: &str) -> Option<NodeKey> {
        self.identity.get(id).copied()
    }

    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.arena.get(key)?.parent
    }

    /// Ordered child list; empty for leaves and unknown keys.
    pub fn children(&self, key: NodeKey) -> &[NodeKey] {
        self.arena.get(key).map(|s| s.children.as_slice()).unwrap_or(&[])
    }

    pub fn kind(&self, key: NodeKey) -> Option<NodeKind> {
        self.arena.get(key).map(|s| s.kind)
    }

    pub fn is_attached(&self, key: NodeKey) -> bool {
        self.arena.get(key).is_some_and(Slot::is_attached)
    }

    pub fn node_flags(&self, key: NodeKey) -> Option<NodeFlags> {
        self.arena.get(key).map(|s| s.flags)
    }

    /// Read-only view of a node's component state.
    pub fn behavior(&self, key: NodeKey) -> Option<&dyn NodeBehavior> {
        self.arena.get(key)?.behavior.as_deref()
    }

    /// Number of live node slots (attached plus detached).
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Number of attached (registered) nodes.
    pub fn attached_count(&self) -> usize {
        self.identity.len()
    }

    /// The current identity map: identifier -> node, attached nodes only.
    pub fn identity_map(&self) -> impl Iterator<Item = (&str, NodeKey)> {
        self.identity.iter().map(|(id, key)| (id.as_str(), *key))
    }

    // =========================================================================
    // Active node (error attribution)
    // =========================================================================

    /// The node user activity is currently attributed to.
    pub fn active(&self) -> Option<NodeKey> {
        self.active
    }

    /// Point error attribution at an attached node, or clear it.
    pub fn set_active(&mut self, key: Option<NodeKey>) -> Result<(), PageError> {
        if let Some(key) = key {
            if !self.is_attached(key) {
                return Err(PageError::NotOwned { key });
            }
        }
        self.active = key;
        Ok(())
    }

    // =========================================================================
    // Messages
    // =========================================================================

    /// Deliver a message from an attached node to its nearest fence
    /// ancestor. The root is always a fence, so delivery terminates.
    pub fn post_message(&mut self, from: NodeKey, msg: UiMessage) -> Result<(), PageError> {
        if !self.is_attached(from) {
            return Err(PageError::NotOwned { key: from });
        }
        let mut cur = from;
        loop {
            let slot = self.arena.get(cur).ok_or(PageError::NotOwned { key: cur })?;
            if slot.flags.contains(NodeFlags::ERROR_FENCE) {
                break;
            }
            cur = slot.parent.ok_or(PageError::NotOwned { key: cur })?;
        }
        if let Some(slot) = self.arena.get_mut(cur) {
            slot.messages.push(msg);
        }
        Ok(())
    }

    /// Messages accumulated on a fence node.
    pub fn messages(&self, key: NodeKey) -> &[UiMessage] {
        self.arena.get(key).map(|s| s.messages.as_slice()).unwrap_or(&[])
    }

    /// Drain the messages accumulated on a fence node.
    pub fn take_messages(&mut self, key: NodeKey) -> Vec<UiMessage> {
        self.arena
            .get_mut(key)
            .map(|s| std::mem::take(&mut s.messages))
            .unwrap_or_default()
    }

    // =========================================================================
    // Per-page data
    // =========================================================================

    /// Store one value per type on the page.
    pub fn set_data<T: 'static>(&mut self, value: T) {
        self.data.insert(TypeId::of::<T>(), Box::new(value));
    }

    pub fn get_data<T: 'static>(&self) -> Option<&T> {
        self.data.get(&TypeId::of::<T>())?.downcast_ref()
    }

    // =========================================================================
    // Internal plumbing
    // =========================================================================

    pub(crate) fn slot(&self, key: NodeKey) -> Result<&Slot, PageError> {
        self.arena.get(key).ok_or(PageError::NotOwned { key })
    }

    pub(crate) fn slot_mut(&mut self, key: NodeKey) -> Result<&mut Slot, PageError> {
        self.arena.get_mut(key).ok_or(PageError::NotOwned { key })
    }

    /// Run a closure against a node's behavior with the behavior temporarily
    /// moved out of its slot, so the closure can hold `&mut Page` through the
    /// [`NodeCtx`]. Returns `None` when the node is gone or a hook on it is
    /// already in flight.
    pub(crate) fn with_behavior<R>(
        &mut self,
        key: NodeKey,
        f: impl FnOnce(&mut dyn NodeBehavior, &mut NodeCtx<'_>) -> R,
    ) -> Option<R> {
        let mut behavior = self.arena.get_mut(key)?.behavior.take()?;
        let mut ctx = NodeCtx { page: self, key };
        let out = f(&mut *behavior, &mut ctx);
        // The hook may have discarded its own slot; only restore if it lives.
        if let Some(slot) = self.arena.get_mut(key) {
            slot.behavior = Some(behavior);
        }
        Some(out)
    }
}
