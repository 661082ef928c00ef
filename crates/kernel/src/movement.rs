use hangar_common::ModelNode;
use hangar_input::{InputState, MoveAction};
use serde::{Deserialize, Serialize};

/// Fixed per-frame increments. Not scaled by frame time, so apparent speed
/// follows the display refresh rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Linear and vertical step per frame, in world units.
    pub step: f32,
    /// Yaw step per frame, in radians.
    pub yaw_step: f32,
    /// Lowest height the model can descend to.
    pub floor: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            step: 0.1,
            yaw_step: 0.05,
            floor: 1.05,
        }
    }
}

/// Apply one action to the node.
///
/// `yaw` is the facing sampled at the start of the frame, so translations
/// within a frame do not see a yaw change made by another key that frame.
pub fn apply_action(action: MoveAction, node: &mut ModelNode, yaw: f32, config: &MovementConfig) {
    let s = config.step;
    let (sin, cos) = yaw.sin_cos();
    let p = &mut node.position;
    match action {
        MoveAction::Forward => {
            p.x += sin * s;
            p.z += cos * s;
        }
        MoveAction::Backward => {
            p.x -= sin * s;
            p.z -= cos * s;
        }
        MoveAction::StrafeLeft => {
            p.x += cos * s;
            p.z -= sin * s;
        }
        MoveAction::StrafeRight => {
            p.x -= cos * s;
            p.z += sin * s;
        }
        MoveAction::Ascend => p.y += s,
        MoveAction::Descend => p.y = (p.y - s).max(config.floor),
        MoveAction::YawLeft => node.yaw += config.yaw_step,
        MoveAction::YawRight => node.yaw -= config.yaw_step,
    }
}

/// Maps held keys to model movement once per frame.
#[derive(Debug, Clone, Default)]
pub struct MovementMapper {
    config: MovementConfig,
}

impl MovementMapper {
    pub fn new(config: MovementConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    /// Apply every held, bound action exactly once. Returns how many were applied;
    /// zero when there is no model.
    pub fn apply_frame(&self, input: &InputState, node: Option<&mut ModelNode>) -> usize {
        let Some(node) = node else {
            return 0;
        };
        let yaw = node.yaw;
        let mut applied = 0;
        for action in input.held_actions() {
            apply_action(action, node, yaw, &self.config);
            applied += 1;
        }
        applied
    }
}
