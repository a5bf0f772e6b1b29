//! Page lifecycle: shelve/unshelve suspension, the single-slot pop-in,
//! the per-round-trip script buffer, and request bookkeeping.

use crate::error::PageError;
use crate::types::NodeKey;
use crate::Page;

impl Page {
    // =========================================================================
    // Shelve / unshelve
    // =========================================================================

    /// Suspend the page. Every attached node is notified, depth first.
    ///
    /// Shelving an already-shelved page is a programmer error.
    pub fn shelve(&mut self) -> Result<(), PageError> {
        if self.shelved {
            return Err(PageError::AlreadyShelved);
        }
        self.shelved = true;
        self.notify_suspension(self.root, true);
        tracing::debug!("page shelved");
        Ok(())
    }

    /// Resume a shelved page. Strict inverse of [`shelve`](Self::shelve).
    pub fn unshelve(&mut self) -> Result<(), PageError> {
        if !self.shelved {
            return Err(PageError::NotShelved);
        }
        self.shelved = false;
        self.notify_suspension(self.root, false);
        tracing::debug!("page unshelved");
        Ok(())
    }

    pub fn is_shelved(&self) -> bool {
        self.shelved
    }

    fn notify_suspension(&mut self, key: NodeKey, shelving: bool) {
        self.with_behavior(key, |b, ctx| {
            if shelving {
                b.on_shelve(ctx);
            } else {
                b.on_unshelve(ctx);
            }
        });
        let children = self.children(key).to_vec();
        for child in children {
            if self.is_attached(child) {
                self.notify_suspension(child, shelving);
            }
        }
    }

    // =========================================================================
    // Pop-in
    // =========================================================================

    /// Install a node as the page's single pop-in.
    ///
    /// A different live pop-in is removed from the tree first. Adding the
    /// node to the tree is the caller's job - this only records which node
    /// plays the role.
    pub fn set_pop_in(&mut self, key: NodeKey) -> Result<(), PageError> {
        self.slot(key)?;
        if self.pop_in != Some(key) {
            if let Some(old) = self.pop_in.take() {
                if self.is_attached(old) {
                    self.remove_child(old)?;
                }
            }
        }
        self.pop_in = Some(key);
        Ok(())
    }

    /// Remove any live pop-in from the tree and clear the slot.
    pub fn clear_pop_in(&mut self) -> Result<(), PageError> {
        if let Some(old) = self.pop_in.take() {
            if self.is_attached(old) {
                self.remove_child(old)?;
            }
        }
        Ok(())
    }

    pub fn pop_in(&self) -> Option<NodeKey> {
        self.pop_in
    }

    // =========================================================================
    // Deferred scripts
    // =========================================================================

    /// Queue a script statement to run in the browser after the current
    /// round-trip's deltas are applied. Statements accumulate in order.
    pub fn append_script(&mut self, js: impl AsRef<str>) {
        self.scripts
            .get_or_insert_with(String::new)
            .push_str(js.as_ref());
    }

    /// Hand the queued scripts to the renderer and clear the buffer, so
    /// nothing replays on a later cycle.
    pub fn take_scripts(&mut self) -> Option<String> {
        self.scripts.take()
    }

    // =========================================================================
    // Request bookkeeping
    // =========================================================================

    pub fn request_counter(&self) -> u64 {
        self.request_counter
    }

    pub fn increment_request_counter(&mut self) {
        self.request_counter += 1;
    }

    /// Consecutive full-render failures, maintained by the hosting layer to
    /// decide when to abandon the page.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn set_consecutive_failures(&mut self, count: u32) {
        self.consecutive_failures = count;
    }

    /// Whether an initial full render completed successfully.
    pub fn full_render_completed(&self) -> bool {
        self.full_render_completed
    }

    pub fn set_full_render_completed(&mut self, completed: bool) {
        self.full_render_completed = completed;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use crate::test_util::{inert_container, new_page};
    use crate::{Node, NodeBehavior, NodeCtx, NodeError, PageError};

    #[test]
    fn test_shelve_protocol_is_strict() {
        let mut page = new_page();
        page.shelve().unwrap();
        assert!(page.is_shelved());
        assert!(matches!(page.shelve(), Err(PageError::AlreadyShelved)));

        page.unshelve().unwrap();
        assert!(!page.is_shelved());
        assert!(matches!(page.unshelve(), Err(PageError::NotShelved)));
    }

    #[test]
    fn test_shelve_notifies_the_tree() {
        struct Sleeper {
            shelved: Rc<Cell<u32>>,
            unshelved: Rc<Cell<u32>>,
        }

        impl NodeBehavior for Sleeper {
            fn build(&mut self, _ctx: &mut NodeCtx<'_>) -> Result<(), NodeError> {
                Ok(())
            }

            fn on_shelve(&mut self, _ctx: &mut NodeCtx<'_>) {
                self.shelved.set(self.shelved.get() + 1);
            }

            fn on_unshelve(&mut self, _ctx: &mut NodeCtx<'_>) {
                self.unshelved.set(self.unshelved.get() + 1);
            }
        }

        let mut page = new_page();
        let shelved = Rc::new(Cell::new(0));
        let unshelved = Rc::new(Cell::new(0));
        let holder = page.add_child(page.root(), inert_container()).unwrap();
        page.add_child(
            holder,
            Node::leaf(Sleeper { shelved: shelved.clone(), unshelved: unshelved.clone() }),
        )
        .unwrap();

        page.shelve().unwrap();
        assert_eq!((shelved.get(), unshelved.get()), (1, 0));

        page.unshelve().unwrap();
        assert_eq!((shelved.get(), unshelved.get()), (1, 1));
    }

    #[test]
    fn test_pop_in_is_single_slot() {
        let mut page = new_page();
        let first = page.add_child(page.root(), inert_container()).unwrap();
        let second = page.add_child(page.root(), inert_container()).unwrap();

        page.set_pop_in(first).unwrap();
        assert_eq!(page.pop_in(), Some(first));

        // Installing another pop-in removes the first from the tree.
        page.set_pop_in(second).unwrap();
        assert_eq!(page.pop_in(), Some(second));
        assert!(!page.is_attached(first));

        page.clear_pop_in().unwrap();
        assert_eq!(page.pop_in(), None);
        assert!(!page.is_attached(second));
    }

    #[test]
    fn test_scripts_flush_exactly_once() {
        let mut page = new_page();
        assert_eq!(page.take_scripts(), None);

        page.append_script("WebUI.refresh();");
        page.append_script("WebUI.focus('_7');");
        assert_eq!(
            page.take_scripts().as_deref(),
            Some("WebUI.refresh();WebUI.focus('_7');")
        );
        assert_eq!(page.take_scripts(), None);
    }

    #[test]
    fn test_request_bookkeeping() {
        let mut page = new_page();
        assert_eq!(page.request_counter(), 0);
        page.increment_request_counter();
        page.increment_request_counter();
        assert_eq!(page.request_counter(), 2);

        assert!(!page.full_render_completed());
        page.set_full_render_completed(true);
        assert!(page.full_render_completed());

        page.set_consecutive_failures(3);
        assert_eq!(page.consecutive_failures(), 3);
    }
}
