//! Node templates and the component capability trait.
//!
//! Components implement [`NodeBehavior`], a small closed hook set: build,
//! attach/detach notification, shelve/unshelve notification, header
//! contribution declaration, and the close-request hook used by modal
//! backdrops. There is no open-ended subclassing - everything a component can
//! do during a hook goes through the [`NodeCtx`] handed to it.
//!
//! A [`Node`] is the detached template handed to the page when a component is
//! created. The page moves it into its arena and from then on the component
//! is addressed by [`NodeKey`].

use crate::error::{NodeError, PageError};
use crate::header::HeaderContributionEntry;
use crate::types::{NodeKey, NodeKind, UiMessage};
use crate::Page;

// =============================================================================
// NodeBehavior - the closed capability set
// =============================================================================

/// Hook set implemented by every component.
///
/// All hooks except [`build`](Self::build) default to no-ops. Hooks receive a
/// [`NodeCtx`] scoped to the node they fire on; there is no ambient page
/// state.
pub trait NodeBehavior {
    /// Produce or refresh this node's content.
    ///
    /// Invoked by the build orchestrator when the node needs a (re)build.
    /// May add children, mark other nodes changed, request focus, queue
    /// scripts - the fixed-point loop observes all of it on the next pass.
    fn build(&mut self, ctx: &mut NodeCtx<'_>) -> Result<(), NodeError>;

    /// Fired after the node is registered and has its identifier.
    fn on_attach(&mut self, _ctx: &mut NodeCtx<'_>) {}

    /// Fired just before the node loses its page linkage.
    fn on_detach(&mut self, _ctx: &mut NodeCtx<'_>) {}

    /// Page-level resource requirements this component depends on.
    ///
    /// Collected once at attach time; duplicates are dropped by the page.
    fn header_contributions(&self) -> Vec<HeaderContributionEntry> {
        Vec::new()
    }

    /// A message the component carried while detached, delivered to the
    /// nearest fence ancestor at attach time so it is not lost.
    fn pending_message(&self) -> Option<UiMessage> {
        None
    }

    /// Containers may demand that their whole subtree is rebuilt whenever a
    /// changed-only build reaches them.
    fn must_render_children_fully(&self) -> bool {
        false
    }

    /// Fired when the owning page is suspended.
    fn on_shelve(&mut self, _ctx: &mut NodeCtx<'_>) {}

    /// Fired when the owning page resumes.
    fn on_unshelve(&mut self, _ctx: &mut NodeCtx<'_>) {}

    /// Fired on an overlay when its backdrop is clicked. The overlay decides
    /// how (and whether) to close itself.
    fn on_close_request(&mut self, _ctx: &mut NodeCtx<'_>) {}
}

// =============================================================================
// Node - detached component template
// =============================================================================

/// A component plus construction-time settings, not yet owned by a page.
pub struct Node {
    pub(crate) id: Option<String>,
    pub(crate) kind: NodeKind,
    pub(crate) behavior: Box<dyn NodeBehavior>,
    pub(crate) focus_requested: bool,
    pub(crate) error_fence: bool,
}

impl Node {
    /// A node without container semantics.
    pub fn leaf(behavior: impl NodeBehavior + 'static) -> Self {
        Self::with_kind(NodeKind::Leaf, behavior)
    }

    /// A node that owns an ordered child list.
    pub fn container(behavior: impl NodeBehavior + 'static) -> Self {
        Self::with_kind(NodeKind::Container, behavior)
    }

    fn with_kind(kind: NodeKind, behavior: impl NodeBehavior + 'static) -> Self {
        Self {
            id: None,
            kind,
            behavior: Box::new(behavior),
            focus_requested: false,
            error_fence: false,
        }
    }

    /// Request a specific identifier. Kept only when still free at
    /// registration time; a colliding identifier is silently replaced by a
    /// minted one.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Ask for focus before the node is attached. Resolved the moment the
    /// node registers with a page.
    pub fn with_focus(mut self) -> Self {
        self.focus_requested = true;
        self
    }

    /// Make this node accept messages posted by its descendants.
    pub fn error_fence(mut self) -> Self {
        self.error_fence = true;
        self
    }
}

// =============================================================================
// NodeCtx - what a hook may touch
// =============================================================================

/// Mutable page access scoped to the node a hook fires on.
///
/// The common operations are methods here; anything else goes through
/// [`page`](Self::page).
pub struct NodeCtx<'a> {
    pub(crate) page: &'a mut Page,
    pub(crate) key: NodeKey,
}

impl NodeCtx<'_> {
    /// The node this hook fires on.
    pub fn key(&self) -> NodeKey {
        self.key
    }

    /// The full page, for operations without a shortcut here.
    pub fn page(&mut self) -> &mut Page {
        self.page
    }

    /// Append a child under this node.
    pub fn add_child(&mut self, node: Node) -> Result<NodeKey, PageError> {
        let key = self.key;
        self.page.add_child(key, node)
    }

    /// Mark this node as needing a rebuild on the next pass.
    pub fn mark_changed(&mut self) -> Result<(), PageError> {
        let key = self.key;
        self.page.mark_changed(key)
    }

    /// Move the page focus to this node.
    pub fn request_focus(&mut self) -> Result<(), PageError> {
        let key = self.key;
        self.page.request_focus(key)
    }

    /// Queue a script statement for the next response.
    pub fn append_script(&mut self, js: impl AsRef<str>) {
        self.page.append_script(js);
    }

    /// Post a message from this node to the nearest fence ancestor.
    pub fn post_message(&mut self, msg: UiMessage) -> Result<(), PageError> {
        let key = self.key;
        self.page.post_message(key, msg)
    }
}
