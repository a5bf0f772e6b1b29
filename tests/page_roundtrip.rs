//! Whole request/response cycles: build, renderer reads, cleanup, repeat.

mod common;

use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;

use pretty_assertions::assert_eq;

use arbor_ui::{
    HeaderContribution, HeaderContributionEntry, Node, NodeBehavior, NodeCtx, NodeError,
    PageOptions, UiMessage,
};

use common::{page, Inert};

/// A widget that needs a script, queues a statement while building, and
/// complains into the nearest fence.
struct Widget;

impl NodeBehavior for Widget {
    fn build(&mut self, ctx: &mut NodeCtx<'_>) -> Result<(), NodeError> {
        ctx.append_script("Arbor.init('calendar');");
        Ok(())
    }

    fn header_contributions(&self) -> Vec<HeaderContributionEntry> {
        vec![
            HeaderContributionEntry::new(HeaderContribution::script("js/calendar.js"), -760),
            HeaderContributionEntry::new(HeaderContribution::stylesheet("css/calendar.css"), 0),
        ]
    }
}

#[test]
fn first_and_second_cycle_deliver_disjoint_header_tails() {
    let mut page = page();
    page.add_child(page.root(), Node::leaf(Widget)).unwrap();
    page.add_child(page.root(), Node::leaf(Widget)).unwrap();

    page.full_build().unwrap();

    // Two widgets, one set of requirements.
    let first: Vec<_> = page.new_header_contributions().to_vec();
    assert_eq!(first.len(), 2);
    page.mark_header_contributions_rendered();
    assert!(page.new_header_contributions().is_empty());
    page.clear_delta().unwrap();

    // A later cycle only ships what is new.
    struct Late;
    impl NodeBehavior for Late {
        fn build(&mut self, _ctx: &mut NodeCtx<'_>) -> Result<(), NodeError> {
            Ok(())
        }
        fn header_contributions(&self) -> Vec<HeaderContributionEntry> {
            vec![HeaderContributionEntry::new(
                HeaderContribution::script("js/charts.js"),
                0,
            )]
        }
    }
    page.add_child(page.root(), Node::leaf(Late)).unwrap();
    page.delta_build().unwrap();

    let second: Vec<_> = page.new_header_contributions().to_vec();
    assert_eq!(
        second,
        vec![HeaderContributionEntry::new(
            HeaderContribution::script("js/charts.js"),
            0
        )]
    );
    page.mark_header_contributions_rendered();

    let mut joined = first;
    joined.extend(second);
    assert_eq!(joined, page.header_contributions().to_vec());
}

#[test]
fn scripts_queued_during_build_flush_once() {
    let mut page = page();
    page.add_child(page.root(), Node::leaf(Widget)).unwrap();

    page.full_build().unwrap();
    assert_eq!(page.take_scripts().as_deref(), Some("Arbor.init('calendar');"));

    // Nothing replays on the next cycle.
    page.clear_delta().unwrap();
    page.delta_build().unwrap();
    assert_eq!(page.take_scripts(), None);
}

#[test]
fn renderer_sees_structural_delta_through_the_before_image() {
    let mut page = page();
    let list = page.add_child(page.root(), Node::container(Inert)).unwrap();
    let old_leaf = page.add_child(list, Node::leaf(Inert)).unwrap();
    page.full_build().unwrap();
    page.clear_delta().unwrap();
    assert!(page.before_map().is_none());

    // Interaction: one node leaves, one arrives.
    page.remove_child(old_leaf).unwrap();
    let new_leaf = page.add_child(list, Node::leaf(Inert)).unwrap();
    page.delta_build().unwrap();

    let before = page.before_map().expect("structure changed this cycle");
    let before_ids: HashSet<&str> = before.keys().map(String::as_str).collect();
    let after_ids: HashSet<&str> = page.identity_map().map(|(id, _)| id).collect();

    let removed: Vec<_> = before_ids.difference(&after_ids).collect();
    let added: Vec<_> = after_ids.difference(&before_ids).collect();
    assert_eq!(removed, vec![&page.node_id(old_leaf).unwrap()]);
    assert_eq!(added, vec![&page.node_id(new_leaf).unwrap()]);

    page.clear_delta().unwrap();
    assert!(page.before_map().is_none());
}

#[test]
fn modal_overlay_lifecycle() {
    struct Dialog {
        closed: Rc<Cell<bool>>,
    }

    impl NodeBehavior for Dialog {
        fn build(&mut self, _ctx: &mut NodeCtx<'_>) -> Result<(), NodeError> {
            Ok(())
        }

        fn on_close_request(&mut self, ctx: &mut NodeCtx<'_>) {
            self.closed.set(true);
            let key = ctx.key();
            ctx.page().remove_overlay(key).unwrap();
            ctx.page().remove_child(key).unwrap();
        }
    }

    let mut page = page();
    page.full_build().unwrap();
    page.clear_delta().unwrap();

    let closed = Rc::new(Cell::new(false));
    let dialog = page.create(Node::container(Dialog { closed: closed.clone() }));
    page.add_overlay(dialog, true).unwrap();
    page.delta_build().unwrap();

    let entry = page.overlays()[0].clone();
    assert_eq!(entry.z_index, 100);
    assert!(entry.modal);
    let backdrop = entry.backdrop().expect("modal backdrop");

    // The user clicks past the dialog; the dialog closes itself.
    page.backdrop_clicked(backdrop).unwrap();
    assert!(closed.get());
    assert!(page.overlays().is_empty());
    assert!(!page.is_attached(dialog));
    page.delta_build().unwrap();
    page.clear_delta().unwrap();
}

#[test]
fn shelved_page_resumes_where_it_left() {
    let mut page = page();
    let form = page.add_child(page.root(), Node::container(Inert)).unwrap();
    page.full_build().unwrap();
    page.clear_delta().unwrap();

    page.shelve().unwrap();
    assert!(page.is_shelved());
    page.unshelve().unwrap();

    // The tree is intact and still buildable after resumption.
    page.add_child(form, Node::leaf(Inert)).unwrap();
    page.delta_build().unwrap();
    assert!(page.is_attached(form));
}

#[test]
fn messages_posted_during_interaction_collect_at_the_root_fence() {
    let mut page = page();
    let field = page.add_child(page.root(), Node::leaf(Inert)).unwrap();
    page.full_build().unwrap();

    page.post_message(field, UiMessage::error("mandatory field is empty"))
        .unwrap();
    let root = page.root();
    assert_eq!(page.messages(root).len(), 1);

    let drained = page.take_messages(root);
    assert_eq!(drained[0].text, "mandatory field is empty");
    assert!(page.messages(root).is_empty());
}

#[test]
fn page_options_reach_the_engine() {
    let page = arbor_ui::Page::new(
        Node::container(Inert),
        PageOptions { page_tag: 77, overlay_base_z: 500, ..PageOptions::default() },
    )
    .unwrap();
    assert_eq!(page.page_tag(), 77);
    assert_eq!(page.options().overlay_base_z, 500);
}
