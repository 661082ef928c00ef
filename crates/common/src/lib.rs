//! Shared types for the hangar viewer.

mod types;

pub use types::{Color, ModelNode};
