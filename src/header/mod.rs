//! Header contributions - page-level resource requirements.
//!
//! Components depend on scripts and stylesheets that must reach the client
//! exactly once, however many components ask for them and however many
//! round-trips the page lives through. The page keeps contributions in two
//! shapes: a set for duplicate detection (equality, not identity) and an
//! ordered list for stable first-registered emission order. A watermark
//! records how much of the list earlier responses already delivered; a
//! render only emits the tail past it.

use std::collections::HashSet;

use crate::Page;

// =============================================================================
// Contribution types
// =============================================================================

/// One page-level resource requirement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HeaderContribution {
    /// A script file, by path or URL.
    Script(String),
    /// A stylesheet, by path or URL.
    Stylesheet(String),
}

impl HeaderContribution {
    pub fn script(path: impl Into<String>) -> Self {
        Self::Script(path.into())
    }

    pub fn stylesheet(path: impl Into<String>) -> Self {
        Self::Stylesheet(path.into())
    }
}

/// A contribution plus its ordering weight. Lower weights render first;
/// equal weights keep registration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderContributionEntry {
    pub contribution: HeaderContribution,
    pub order: i32,
}

impl HeaderContributionEntry {
    pub fn new(contribution: HeaderContribution, order: i32) -> Self {
        Self { contribution, order }
    }
}

// =============================================================================
// The contributor log
// =============================================================================

#[derive(Default)]
pub(crate) struct HeaderContributors {
    seen: HashSet<HeaderContribution>,
    ordered: Vec<HeaderContributionEntry>,
    rendered: usize,
}

impl HeaderContributors {
    /// Append a contribution unless an equal one is already present.
    pub fn add(&mut self, contribution: HeaderContribution, order: i32) {
        if self.seen.contains(&contribution) {
            return;
        }
        self.seen.insert(contribution.clone());
        self.ordered.push(HeaderContributionEntry::new(contribution, order));
    }

    pub fn all(&self) -> &[HeaderContributionEntry] {
        &self.ordered
    }

    /// The tail that has not been delivered to the client yet.
    pub fn new_since_render(&self) -> &[HeaderContributionEntry] {
        &self.ordered[self.rendered.min(self.ordered.len())..]
    }

    /// Advance the watermark: everything registered so far counts as
    /// delivered.
    pub fn mark_rendered(&mut self) {
        self.rendered = self.ordered.len();
    }
}

// =============================================================================
// Page surface
// =============================================================================

impl Page {
    /// Register a page-level resource requirement.
    ///
    /// Call from a node's attach-time contribution hook or from application
    /// code. Duplicates (by equality) are dropped.
    pub fn add_header_contribution(&mut self, contribution: HeaderContribution, order: i32) {
        self.contributors.add(contribution, order);
    }

    /// Every contribution registered so far, in first-registered order.
    pub fn header_contributions(&self) -> &[HeaderContributionEntry] {
        self.contributors.all()
    }

    /// Contributions not yet delivered to the client.
    pub fn new_header_contributions(&self) -> &[HeaderContributionEntry] {
        self.contributors.new_since_render()
    }

    /// Record that everything registered so far has been delivered.
    pub fn mark_header_contributions_rendered(&mut self) {
        self.contributors.mark_rendered();
    }
}
