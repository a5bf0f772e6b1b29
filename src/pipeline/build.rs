//! Full and changed-only build passes plus the fixed-point loop.
//!
//! A request runs exactly one of the two entry points and always leaves the
//! page idle again, whether it succeeds or errors:
//!
//! - [`Page::full_build`] - first render. Visits the root and every
//!   descendant unconditionally.
//! - [`Page::delta_build`] - interaction round-trips. Walks only where
//!   change flags lead: leaves are rebuilt directly, containers are entered
//!   only when their child list changed, and a wholesale-replaced container
//!   escalates to a full subtree rebuild. A changed container additionally
//!   gets a gated full sweep so children attached between builds are not
//!   missed; nodes that already built stay untouched.
//!
//! Either entry then loops: building a node may register children, mark
//! siblings, or request focus, all of which land in the pending set; the
//! loop drains a snapshot of the set, rebuilds those subtrees, and repeats
//! until a drain leaves nothing behind. A pass ceiling turns an oscillating
//! tree into a hard error instead of an endless loop.

use crate::error::PageError;
use crate::types::{NodeFlags, NodeKey};
use crate::Page;

impl Page {
    /// The build phase of a full page render.
    pub fn full_build(&mut self) -> Result<(), PageError> {
        self.pending.clear();
        self.build_subtree(self.root)?;
        self.rebuild_loop()?;
        tracing::debug!(nodes = self.attached_count(), "full build settled");
        Ok(())
    }

    /// The build phase of a delta render: changed subtrees only.
    pub fn delta_build(&mut self) -> Result<(), PageError> {
        self.pending.clear();
        self.build_changed(self.root)?;
        self.rebuild_loop()?;
        tracing::debug!(nodes = self.attached_count(), "delta build settled");
        Ok(())
    }

    /// Loop over the pending set until it stays empty.
    fn rebuild_loop(&mut self) -> Result<(), PageError> {
        let limit = self.options().max_build_passes;
        let mut passes = 0;
        while !self.pending.is_empty() {
            if passes >= limit {
                return Err(PageError::BuildDiverged { passes });
            }
            passes += 1;
            if passes * 2 > limit {
                tracing::warn!(passes, pending = self.pending.len(), "build pass churn");
            }
            for key in self.pending.drain_snapshot() {
                // A drained node may have been detached by an earlier member
                // of the same snapshot.
                if self.is_attached(key) {
                    self.build_subtree(key)?;
                }
            }
        }
        if passes > 0 {
            tracing::debug!(passes, "pending builds converged");
        }
        Ok(())
    }

    /// Build a node and then every descendant, unconditionally.
    pub(crate) fn build_subtree(&mut self, key: NodeKey) -> Result<(), PageError> {
        self.build_node(key)?;
        self.pending.unmark(key);
        let children = self.slot(key)?.children.clone();
        for child in children {
            if self.is_attached(child) {
                self.build_subtree(child)?;
            }
        }
        Ok(())
    }

    /// Walk by change flags, building only what changed.
    fn build_changed(&mut self, key: NodeKey) -> Result<(), PageError> {
        self.pending.unmark(key);

        let (is_container, flags) = {
            let slot = self.slot(key)?;
            (slot.is_container(), slot.flags)
        };
        if !is_container {
            // No container semantics: always rebuilt directly.
            return self.build_node(key);
        }

        let child_updates = flags.contains(NodeFlags::CHILD_UPDATES);
        let replaced = flags.contains(NodeFlags::CHILDREN_REPLACED);

        if child_updates && !replaced {
            self.build_node(key)?;
            let children = self.slot(key)?.children.clone();
            for child in children {
                if self.is_attached(child) {
                    self.build_changed(child)?;
                }
            }
        }

        // Safety net for everything the selective walk cannot see: children
        // attached between builds carry only their own needs-build flag, so
        // a container whose child list changed (or was wholesale replaced,
        // or demands it) gets a full sweep. The per-node gate keeps the
        // sweep from re-running hooks that already fired above.
        let demands_full = self
            .slot(key)?
            .behavior
            .as_ref()
            .is_some_and(|b| b.must_render_children_fully());
        if replaced || child_updates || demands_full {
            self.build_subtree(key)?;
        }
        Ok(())
    }

    /// True while nodes are awaiting a build pass.
    pub fn has_pending_builds(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Run a node's build hook if it needs one.
    ///
    /// The needs-build flag is cleared before the hook runs; a hook that
    /// marks its own node again leaves the node flagged for a later cycle.
    fn build_node(&mut self, key: NodeKey) -> Result<(), PageError> {
        {
            let slot = self.slot_mut(key)?;
            if !slot.flags.contains(NodeFlags::NEEDS_BUILD) {
                return Ok(());
            }
            slot.flags.remove(NodeFlags::NEEDS_BUILD);
        }
        let result = self
            .with_behavior(key, |b, ctx| b.build(ctx))
            .unwrap_or(Ok(()));
        result.map_err(|source| PageError::NodeBuild {
            id: self
                .node_id(key)
                .unwrap_or("<unregistered>")
                .to_string(),
            source,
        })
    }
}
