//! Helpers for timestamps and the on-disk store.

pub(crate) mod cache;
pub(crate) mod date;
