use glam::{Mat4, Vec3};
use hangar_assets::LoadedModel;
use hangar_common::{Color, ModelNode};

/// Square floor centered on the origin in the XZ plane.
#[derive(Debug, Clone)]
pub struct GroundPlane {
    pub size: f32,
    pub color: Color,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Default for GroundPlane {
    fn default() -> Self {
        Self {
            size: 20.0,
            color: Color::from_hex_srgb(0x555555),
            cast_shadow: false,
            receive_shadow: true,
        }
    }
}

/// A cone light aimed at a fixed target.
#[derive(Debug, Clone)]
pub struct SpotLight {
    pub position: Vec3,
    pub target: Vec3,
    pub color: Color,
    /// Luminous intensity; falls off with the inverse square of distance.
    pub intensity: f32,
    /// Distance at which the light reaches zero.
    pub range: f32,
    /// Half-angle of the cone in radians.
    pub angle: f32,
    /// Fraction of the cone that is softened, `0..=1`.
    pub penumbra: f32,
    pub cast_shadow: bool,
    /// Added to the light-space depth before the shadow comparison.
    pub shadow_bias: f32,
    pub shadow_near: f32,
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 25.0, 0.0),
            target: Vec3::ZERO,
            color: Color::WHITE,
            intensity: 3000.0,
            range: 100.0,
            angle: 0.22,
            penumbra: 1.0,
            cast_shadow: true,
            shadow_bias: -0.0001,
            shadow_near: 0.5,
        }
    }
}

impl SpotLight {
    pub fn direction(&self) -> Vec3 {
        (self.target - self.position).normalize_or(Vec3::NEG_Y)
    }

    /// Cosine of the outer cone edge.
    pub fn cone_cos(&self) -> f32 {
        self.angle.cos()
    }

    /// Cosine of the angle where the penumbra ends and full intensity starts.
    pub fn penumbra_cos(&self) -> f32 {
        (self.angle * (1.0 - self.penumbra.clamp(0.0, 1.0))).cos()
    }

    /// View-projection used to render and sample the shadow map.
    pub fn shadow_view_projection(&self) -> Mat4 {
        let dir = self.direction();
        // Straight-down lights would make a degenerate basis with a +Y up vector.
        let up = if dir.dot(Vec3::Y).abs() > 0.99 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let view = Mat4::look_at_rh(self.position, self.target, up);
        let proj = Mat4::perspective_rh(self.angle * 2.0, 1.0, self.shadow_near, self.range);
        proj * view
    }
}

/// The loaded model: CPU geometry plus the node the mapper moves.
#[derive(Debug, Clone)]
pub struct ModelInstance {
    pub node: ModelNode,
    pub model: LoadedModel,
}

/// Everything that is drawn: ground, light and, once loaded, the model.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub ground: GroundPlane,
    pub spotlight: SpotLight,
    model: Option<ModelInstance>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(&self) -> Option<&ModelInstance> {
        self.model.as_ref()
    }

    pub fn model_node(&self) -> Option<&ModelNode> {
        self.model.as_ref().map(|m| &m.node)
    }

    pub fn model_node_mut(&mut self) -> Option<&mut ModelNode> {
        self.model.as_mut().map(|m| &mut m.node)
    }

    /// Attach a model at the given node transform, replacing any previous one.
    pub fn attach_model(&mut self, model: LoadedModel, node: ModelNode) {
        self.model = Some(ModelInstance { node, model });
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }
}
