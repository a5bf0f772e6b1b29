//! Core types for arbor-ui.
//!
//! These types define the foundation that everything builds on.
//! They flow through the build pipeline and define what the page engine
//! and the (external) renderer agree on.

use std::fmt;

// =============================================================================
// NodeKey - handle into the page-owned node arena
// =============================================================================

/// Handle to a node slot owned by a [`Page`](crate::Page).
///
/// Keys are page-local: a key minted by one page is meaningless to another.
/// Parent/child relations are expressed through keys, never through owning
/// references, so the tree cannot form reference cycles.
///
/// A key stays valid while the node's slot exists (attached or detached).
/// [`Page::discard`](crate::Page::discard) frees the slot and invalidates
/// the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(pub(crate) usize);

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// NodeKind
// =============================================================================

/// Structural kind of a node.
///
/// Containers own an ordered child list; leaves never have children.
/// The kind is fixed at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Leaf,
    Container,
}

// =============================================================================
// Node state flags (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Per-node lifecycle and change-tracking state as a bitfield.
    ///
    /// Combine with bitwise OR: `NodeFlags::ATTACHED | NodeFlags::NEEDS_BUILD`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct NodeFlags: u16 {
        const NONE = 0;
        /// Node is registered with the page and reachable from the root.
        const ATTACHED = 1 << 0;
        /// Node's build hook must run on the next build pass.
        const NEEDS_BUILD = 1 << 1;
        /// Node asked for focus before it was attached.
        const FOCUS_REQUESTED = 1 << 2;
        /// Container's child list changed since the last render.
        const CHILD_UPDATES = 1 << 3;
        /// Container's children were wholesale replaced since the last render.
        const CHILDREN_REPLACED = 1 << 4;
        /// Node accepts messages posted by its descendants.
        const ERROR_FENCE = 1 << 5;
        /// Node is a synthesized modal backdrop.
        const BACKDROP = 1 << 6;
    }
}

// =============================================================================
// Messages
// =============================================================================

/// Severity of a [`UiMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A message posted on a node, delivered to the nearest fence ancestor.
///
/// The page root is always a fence, so delivery always terminates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiMessage {
    pub severity: Severity,
    pub text: String,
}

impl UiMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self { severity: Severity::Info, text: text.into() }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self { severity: Severity::Warning, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { severity: Severity::Error, text: text.into() }
    }
}

// =============================================================================
// PageOptions
// =============================================================================

/// Tunables for a [`Page`](crate::Page).
///
/// Construct with struct update syntax over [`Default`]:
///
/// ```
/// use arbor_ui::PageOptions;
///
/// let opts = PageOptions { max_build_passes: 25, ..PageOptions::default() };
/// assert_eq!(opts.overlay_base_z, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOptions {
    /// Ceiling on fixed-point build passes before the build is declared
    /// non-converging. A safety bound, not an algorithmic constant.
    pub max_build_passes: usize,
    /// z-order assigned to the first stacked overlay.
    pub overlay_base_z: i32,
    /// Minimum z-order distance between stacked overlays.
    pub overlay_z_step: i32,
    /// Host-supplied tag identifying this page instance, echoed back by the
    /// client so stale-session requests can be detected.
    pub page_tag: u64,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            max_build_passes: 10,
            overlay_base_z: 100,
            overlay_z_step: 100,
            page_tag: 0,
        }
    }
}
