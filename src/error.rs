//! Engine errors.
//!
//! Invariant violations (double registration, identity map corruption,
//! foreign nodes, shelve protocol misuse) are programmer errors and surface
//! as dedicated variants - they are never swallowed or retried. Build errors
//! raised by node implementations propagate through the traversal wrapped in
//! [`PageError::NodeBuild`], attributed to the failing node's identifier.

use thiserror::Error;

/// Error type node implementations return from their build hook.
pub type NodeError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by [`Page`](crate::Page) operations.
#[derive(Debug, Error)]
pub enum PageError {
    /// The node is already registered with a page; nodes belong to exactly
    /// one page at a time.
    #[error("node is still attached to a page")]
    StillAttached,

    /// The key does not name a live node of this page.
    #[error("node {key} does not belong to this page")]
    NotOwned { key: crate::NodeKey },

    /// An attached node had no identifier during detach. Identity map
    /// corruption.
    #[error("the node's assigned identifier has gone")]
    MissingId,

    /// Registration computed an identifier that is already occupied.
    /// Identity map corruption.
    #[error("duplicate node identifier '{id}'")]
    DuplicateId { id: String },

    /// Detach found no identity-map entry for the node. Identity map
    /// corruption.
    #[error("no node with identifier '{id}' is registered")]
    UnknownId { id: String },

    /// A child operation was attempted on a leaf node.
    #[error("node {key} is not a container")]
    NotAContainer { key: crate::NodeKey },

    /// The root content node cannot be detached from its page.
    #[error("the root content node cannot be detached")]
    RootDetach,

    /// `shelve()` on a page that is already shelved.
    #[error("page is already shelved")]
    AlreadyShelved,

    /// `unshelve()` on a page that is not shelved.
    #[error("page is not shelved")]
    NotShelved,

    /// The fixed-point build loop exceeded its pass ceiling.
    #[error("building the tree failed after {passes} passes: the tree keeps changing every build")]
    BuildDiverged { passes: usize },

    /// A node implementation's build hook failed. The whole build pass for
    /// the request is aborted.
    #[error("building node '{id}' failed")]
    NodeBuild {
        id: String,
        #[source]
        source: NodeError,
    },
}
