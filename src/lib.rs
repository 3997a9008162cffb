//! dock keeps a small library of launchable project profiles: one default
//! entry anchored at the top, pinned profiles above the rest, and an
//! explicit user-chosen order below. The `engine` module owns the
//! move-and-reorder semantics (optimistic applies, per-group save queues,
//! reload on failure); `io` persists the library as JSON behind the
//! `OrderGateway` trait; `cli` is the `dk` binary on top.

pub mod cli;
pub mod engine;
pub mod io;
pub mod logging;
pub mod model;
pub mod ops;
