//! # arbor-ui
//!
//! Server-resident retained UI component tree for Rust.
//!
//! The authoritative UI state lives on the server; the rendered document
//! lives in the browser. arbor-ui keeps the two consistent across
//! independent request/response cycles by rebuilding exactly the parts of
//! the tree that changed and handing the (external) renderer everything it
//! needs to emit an incremental delta instead of a full page.
//!
//! ## Architecture
//!
//! ```text
//! event dispatch            arbor-ui (this crate)              renderer
//! ──────────────            ─────────────────────              ────────
//! applies user actions  →   Page: node arena + identity map
//!   marks nodes changed     pending-build set (fixed point)
//!                           structural before-image        →   identity-map diff
//!                           header contribution log        →   undelivered tail
//!                           overlay stack / focus / scripts →  response payload
//!                                                          ←   clear_delta()
//! ```
//!
//! A request runs one build - [`Page::full_build`] for the first render,
//! [`Page::delta_build`] for every interaction after it - then the renderer
//! reads the settled state and calls [`Page::clear_delta`]. One request owns
//! a page at a time; the hosting layer serializes, the engine never locks.
//!
//! ## Modules
//!
//! - [`types`] - node keys, kinds, state flags, messages, page options
//! - [`engine`] - the [`Page`] aggregate: storage, identity, tree mutation
//! - [`pipeline`] - full/changed-only builds and the fixed-point loop
//! - [`header`] - deduplicated, ordered page resource requirements
//! - [`overlay`] - floating surface stack with modal backdrops
//! - [`state`] - focus, shelve/unshelve, pop-in, deferred scripts

pub mod engine;
pub mod error;
pub mod header;
pub mod node;
pub mod overlay;
pub mod pipeline;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use engine::Page;
pub use error::{NodeError, PageError};
pub use header::{HeaderContribution, HeaderContributionEntry};
pub use node::{Node, NodeBehavior, NodeCtx};
pub use overlay::OverlayEntry;
pub use types::{NodeFlags, NodeKey, NodeKind, PageOptions, Severity, UiMessage};

#[cfg(test)]
pub(crate) mod test_util {
    //! Shared helpers for the unit tests: inert nodes and a build-counting
    //! probe.

    use std::cell::Cell;
    use std::rc::Rc;

    use crate::error::NodeError;
    use crate::node::{Node, NodeBehavior, NodeCtx};
    use crate::types::PageOptions;
    use crate::Page;

    /// Does nothing on any hook.
    pub struct Inert;

    impl NodeBehavior for Inert {
        fn build(&mut self, _ctx: &mut NodeCtx<'_>) -> Result<(), NodeError> {
            Ok(())
        }
    }

    /// Counts build-hook invocations through a shared cell.
    pub struct Probe {
        hits: Rc<Cell<usize>>,
    }

    impl Probe {
        pub fn new(hits: &Rc<Cell<usize>>) -> Self {
            Self { hits: hits.clone() }
        }
    }

    impl NodeBehavior for Probe {
        fn build(&mut self, _ctx: &mut NodeCtx<'_>) -> Result<(), NodeError> {
            self.hits.set(self.hits.get() + 1);
            Ok(())
        }
    }

    pub fn inert_leaf() -> Node {
        Node::leaf(Inert)
    }

    pub fn inert_container() -> Node {
        Node::container(Inert)
    }

    pub fn new_page() -> Page {
        Page::new(Node::container(Inert), PageOptions::default()).expect("fresh page")
    }
}
