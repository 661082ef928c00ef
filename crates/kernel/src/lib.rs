//! Viewer kernel: scene state, per-frame movement, frame loop lifecycle.
//!
//! # Invariants
//! - All mutation of input, model node and scene goes through [`Session`] on one thread.
//! - The model node never drops below the configured floor.
//! - Movement per frame is a fixed step, independent of elapsed time.
//! - Once disposed, the frame loop never runs another frame.

pub mod config;
pub mod frame;
pub mod movement;
pub mod scene;
pub mod session;

pub use config::{ConfigError, HangarConfig, Placement};
pub use frame::{FrameLoop, LoopState};
pub use movement::{MovementConfig, MovementMapper};
pub use scene::{GroundPlane, ModelInstance, Scene, SpotLight};
pub use session::{LoadOutcome, Session};

pub fn crate_info() -> &'static str {
    "hangar-kernel v0.1.0"
}
