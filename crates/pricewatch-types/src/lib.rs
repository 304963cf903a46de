//! Shared types for the pricewatch catalog.

pub mod endpoints;

mod catalog;
mod request;
mod validate;

pub use catalog::*;
pub use request::*;
pub use validate::*;
