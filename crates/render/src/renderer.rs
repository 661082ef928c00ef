use std::fmt::Write as _;

use glam::Vec3;
use hangar_kernel::Scene;

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(4.0, 5.0, 11.0),
            target: Vec3::new(0.0, 1.0, 0.0),
            fov_degrees: 45.0,
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame of the scene from the given view.
    fn render(&self, scene: &Scene, view: &RenderView) -> Self::Output;
}

/// Human-readable dump of the scene, for the CLI and tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, view: &RenderView) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Camera: eye=({:.2}, {:.2}, {:.2}) target=({:.2}, {:.2}, {:.2}) fov={:.0}",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.fov_degrees
        );

        let g = &scene.ground;
        let _ = writeln!(
            out,
            "Ground: {:.0}x{:.0} receive_shadow={}",
            g.size, g.size, g.receive_shadow
        );

        let l = &scene.spotlight;
        let _ = writeln!(
            out,
            "Spotlight: pos=({:.1}, {:.1}, {:.1}) intensity={:.0} angle={:.2} shadows={}",
            l.position.x, l.position.y, l.position.z, l.intensity, l.angle, l.cast_shadow
        );

        match scene.model() {
            Some(instance) => {
                let p = instance.node.position;
                let _ = writeln!(
                    out,
                    "Model: {} meshes={} triangles={}",
                    instance.model.name,
                    instance.model.meshes.len(),
                    instance.model.triangle_count()
                );
                let _ = writeln!(
                    out,
                    "  pos=({:.3}, {:.3}, {:.3}) yaw={:.3}",
                    p.x, p.y, p.z, instance.node.yaw
                );
            }
            None => out.push_str("Model: <none>\n"),
        }

        out
    }
}
