//! HTTP handlers: the generic resource router and the content lookups.

pub mod lookup;
pub mod resource;
