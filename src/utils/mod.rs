//!
//! Shared text utilities.

pub mod line_ending;
pub mod slug;
