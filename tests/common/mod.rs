//! Shared node implementations for the integration tests.
#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use arbor_ui::{Node, NodeBehavior, NodeCtx, NodeError, Page, PageOptions};

/// Does nothing on any hook.
pub struct Inert;

impl NodeBehavior for Inert {
    fn build(&mut self, _ctx: &mut NodeCtx<'_>) -> Result<(), NodeError> {
        Ok(())
    }
}

/// Counts build-hook invocations through a shared cell.
pub struct Counting {
    hits: Rc<Cell<usize>>,
}

impl Counting {
    pub fn new(hits: &Rc<Cell<usize>>) -> Self {
        Self { hits: hits.clone() }
    }
}

impl NodeBehavior for Counting {
    fn build(&mut self, _ctx: &mut NodeCtx<'_>) -> Result<(), NodeError> {
        self.hits.set(self.hits.get() + 1);
        Ok(())
    }
}

pub fn counter() -> Rc<Cell<usize>> {
    Rc::new(Cell::new(0))
}

pub fn page() -> Page {
    Page::new(Node::container(Inert), PageOptions::default()).expect("fresh page")
}
