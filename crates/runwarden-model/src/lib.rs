//! Domain types shared by every runwarden crate.
//!
//! Nothing here performs I/O or holds locks: the model only describes runs,
//! their lifecycle, GC bookkeeping and the events the controller emits.

mod domain;
pub use domain::*;
