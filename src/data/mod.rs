//! Data module: dynamic per-element property storage.
#![warn(missing_docs)]

pub mod column;
pub mod property;

pub use property::{PropHandle, PropertyRegistry, PropertyValue};
