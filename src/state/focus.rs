//! Focus handling.
//!
//! One pending-focus pointer per page. A node attached to the page focuses
//! immediately; a node that asks for focus while detached carries the
//! request as a flag, resolved the moment it registers.

use crate::error::PageError;
use crate::types::{NodeFlags, NodeKey};
use crate::Page;

impl Page {
    /// The node that currently holds the focus request, if any.
    pub fn focus_target(&self) -> Option<NodeKey> {
        self.focus
    }

    /// Focus an attached node.
    pub fn set_focus(&mut self, key: NodeKey) -> Result<(), PageError> {
        if !self.is_attached(key) {
            return Err(PageError::NotOwned { key });
        }
        self.focus = Some(key);
        Ok(())
    }

    /// Drop the page's focus request.
    pub fn clear_focus(&mut self) {
        self.focus = None;
    }

    /// Ask for focus on a node that may not be attached yet.
    ///
    /// Attached nodes focus immediately; detached ones are flagged and
    /// resolved at registration.
    pub fn request_focus(&mut self, key: NodeKey) -> Result<(), PageError> {
        let attached = {
            let slot = self.slot_mut(key)?;
            if !slot.is_attached() {
                slot.flags |= NodeFlags::FOCUS_REQUESTED;
            }
            slot.is_attached()
        };
        if attached {
            self.focus = Some(key);
        }
        Ok(())
    }

    /// Withdraw a node's own pending focus request.
    pub fn clear_focus_request(&mut self, key: NodeKey) -> Result<(), PageError> {
        self.slot_mut(key)?.flags.remove(NodeFlags::FOCUS_REQUESTED);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::test_util::{inert_leaf, new_page};
    use crate::PageError;

    #[test]
    fn test_focus_attached_node() {
        let mut page = new_page();
        let a = page.add_child(page.root(), inert_leaf()).unwrap();
        page.request_focus(a).unwrap();
        assert_eq!(page.focus_target(), Some(a));

        page.clear_focus();
        assert_eq!(page.focus_target(), None);
    }

    #[test]
    fn test_detached_request_resolves_on_attach() {
        let mut page = new_page();
        let holder = page.create(inert_leaf());
        page.request_focus(holder).unwrap();
        assert_eq!(page.focus_target(), None);

        page.attach_child(page.root(), holder).unwrap();
        assert_eq!(page.focus_target(), Some(holder));
    }

    #[test]
    fn test_withdrawn_request_stays_unresolved() {
        let mut page = new_page();
        let holder = page.create(inert_leaf());
        page.request_focus(holder).unwrap();
        page.clear_focus_request(holder).unwrap();

        page.attach_child(page.root(), holder).unwrap();
        assert_eq!(page.focus_target(), None);
    }

    #[test]
    fn test_set_focus_rejects_detached() {
        let mut page = new_page();
        let holder = page.create(inert_leaf());
        assert!(matches!(
            page.set_focus(holder),
            Err(PageError::NotOwned { .. })
        ));
    }
}
