//! Per-page signal state: focus, suspension, pop-in, deferred scripts, and
//! request bookkeeping.

mod focus;
mod lifecycle;
