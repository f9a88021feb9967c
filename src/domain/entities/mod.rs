//! Core domain entities.
//!
//! - [`Link`] - A shortened URL mapping
//! - [`Click`] - One recorded visit to a link
//!
//! Creation inputs live in separate `New*` structs because ids and counters
//! are assigned by the store.

pub mod click;
pub mod link;

pub use click::{Click, NewClick};
pub use link::{Link, NewLink};
