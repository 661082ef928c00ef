//! Input: held-key tracking and the key-to-movement action table.
//!
//! # Invariants
//! - Key identifiers are stored lowercase; lookups are case-insensitive.
//! - The state for a key always equals the most recent event for that key.
//! - Nothing clears the state except a key-up; a missed key-up leaves the key held.

pub mod action;
pub mod state;

pub use action::MoveAction;
pub use state::{InputState, KeyDisposition, SuppressPolicy};

/// Normalize a key identifier the way the tracker stores it.
pub fn normalize_key(key: &str) -> String {
    key.to_lowercase()
}

pub fn crate_info() -> &'static str {
    "hangar-input v0.1.0"
}
