use std::f32::consts::{PI, TAU};

use glam::{Mat4, Vec3};

/// Keeps the polar angle away from the poles where `look_at` degenerates.
const POLAR_EPSILON: f32 = 1e-6;

/// Perspective camera orbiting a fixed target.
///
/// Drag and scroll input accumulate into pending deltas; [`OrbitCamera::update`]
/// applies a fraction of them each frame when damping is enabled, so motion
/// eases out after the input stops. Panning is not supported: the target
/// never moves.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Polar angle bounds, measured from +Y.
    pub min_polar: f32,
    pub max_polar: f32,
    pub enable_damping: bool,
    /// Fraction of the pending rotation applied per update.
    pub damping: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    radius: f32,
    /// Azimuth around +Y, measured from +Z toward +X.
    theta: f32,
    phi: f32,
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        let mut camera = Self {
            target: Vec3::new(0.0, 1.0, 0.0),
            fov: 45.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 1.0,
            far: 1000.0,
            min_distance: 5.0,
            max_distance: 20.0,
            min_polar: 0.5,
            max_polar: 1.5,
            enable_damping: true,
            damping: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            radius: 1.0,
            theta: 0.0,
            phi: PI / 2.0,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
        };
        camera.look_from(Vec3::new(4.0, 5.0, 11.0));
        camera
    }
}

impl OrbitCamera {
    /// Place the eye at `eye`, keeping the target, then apply the bounds.
    pub fn look_from(&mut self, eye: Vec3) {
        let offset = eye - self.target;
        self.radius = offset.length();
        if self.radius > 0.0 {
            self.theta = offset.x.atan2(offset.z);
            self.phi = (offset.y / self.radius).clamp(-1.0, 1.0).acos();
        }
        self.delta_theta = 0.0;
        self.delta_phi = 0.0;
        self.scale = 1.0;
        self.update();
    }

    pub fn eye(&self) -> Vec3 {
        let sin_phi = self.phi.sin();
        self.target
            + self.radius
                * Vec3::new(
                    sin_phi * self.theta.sin(),
                    self.phi.cos(),
                    sin_phi * self.theta.cos(),
                )
    }

    pub fn distance(&self) -> f32 {
        self.radius
    }

    pub fn polar_angle(&self) -> f32 {
        self.phi
    }

    pub fn azimuth(&self) -> f32 {
        self.theta
    }

    /// Queue a rotation from a pointer drag of `dx`, `dy` pixels. A drag across
    /// the full viewport height is one full turn.
    pub fn rotate(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let k = TAU * self.rotate_speed / viewport_height.max(1.0);
        self.delta_theta -= dx * k;
        self.delta_phi -= dy * k;
    }

    /// Queue a zoom from scroll wheel lines. Positive lines move closer.
    pub fn zoom(&mut self, lines: f32) {
        let step = 0.95_f32.powf(self.zoom_speed);
        self.scale *= step.powf(lines);
    }

    /// Apply pending input and bounds. Call once per frame.
    pub fn update(&mut self) {
        let factor = if self.enable_damping { self.damping } else { 1.0 };

        self.theta += self.delta_theta * factor;
        self.phi += self.delta_phi * factor;
        self.phi = self
            .phi
            .clamp(self.min_polar, self.max_polar)
            .clamp(POLAR_EPSILON, PI - POLAR_EPSILON);

        self.radius = (self.radius * self.scale).clamp(self.min_distance, self.max_distance);
        self.scale = 1.0;

        if self.enable_damping {
            self.delta_theta *= 1.0 - self.damping;
            self.delta_phi *= 1.0 - self.damping;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
