//! wgpu render backend for the hangar viewer.
//!
//! Draws the ground plane and the loaded model under a single spotlight,
//! with a depth-only shadow pass sampled through a 3x3 PCF filter. The
//! camera orbits a fixed target with damping.
//!
//! # Invariants
//! - Renderer never mutates the scene.
//! - Camera motion is not part of the session state; the kernel never sees it.

mod camera;
mod gpu;
mod shaders;

pub use camera::OrbitCamera;
pub use gpu::WgpuRenderer;
