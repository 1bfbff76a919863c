//! Client side of the API: a typed HTTP client and the local mirror store
//! that UI code reads from.

pub mod api;
pub mod mirror;
