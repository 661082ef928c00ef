use hangar_assets::LoadEvent;
use hangar_input::{InputState, KeyDisposition};

use crate::{FrameLoop, HangarConfig, MovementMapper, Placement, Scene};

/// What applying a load event did to the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoadOutcome {
    /// Still loading; fraction when the total size is known.
    Progress(Option<f32>),
    /// The model is now part of the scene.
    Attached,
    /// The load failed; the scene stays without a model.
    Failed,
    /// The session was already disposed; the event was dropped.
    Discarded,
}

/// All cross-frame viewer state, owned by the application and passed by
/// reference into event handlers and the frame update.
#[derive(Debug)]
pub struct Session {
    input: InputState,
    scene: Scene,
    mapper: MovementMapper,
    placement: Placement,
    frame_loop: FrameLoop,
    load_failed: bool,
}

impl Session {
    pub fn new(config: &HangarConfig) -> Self {
        Self {
            input: InputState::with_policy(config.suppress),
            scene: Scene::new(),
            mapper: MovementMapper::new(config.movement),
            placement: config.placement,
            frame_loop: FrameLoop::new(),
            load_failed: false,
        }
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn is_running(&self) -> bool {
        self.frame_loop.is_running()
    }

    pub fn frame(&self) -> u64 {
        self.frame_loop.frame()
    }

    pub fn model_loaded(&self) -> bool {
        self.scene.has_model()
    }

    pub fn load_failed(&self) -> bool {
        self.load_failed
    }

    /// Key-down from the window. Ignored once disposed.
    pub fn key_down(&mut self, key: &str) -> KeyDisposition {
        if !self.is_running() {
            return KeyDisposition::PassThrough;
        }
        self.input.key_down(key)
    }

    /// Key-up from the window. Ignored once disposed.
    pub fn key_up(&mut self, key: &str) -> KeyDisposition {
        if !self.is_running() {
            return KeyDisposition::PassThrough;
        }
        self.input.key_up(key)
    }

    /// Fold one loader event into the scene.
    pub fn apply_load_event(&mut self, event: LoadEvent) -> LoadOutcome {
        if !self.is_running() {
            tracing::debug!("discarding load event after dispose");
            return LoadOutcome::Discarded;
        }
        match event {
            LoadEvent::Progress(progress) => {
                let fraction = progress.fraction();
                if let Some(f) = fraction {
                    tracing::debug!("loading {:.0}%", f * 100.0);
                }
                LoadOutcome::Progress(fraction)
            }
            LoadEvent::Loaded(mut model) => {
                model.enable_shadows();
                tracing::info!(
                    name = %model.name,
                    meshes = model.meshes.len(),
                    triangles = model.triangle_count(),
                    "model loaded"
                );
                self.scene.attach_model(model, self.placement.node());
                LoadOutcome::Attached
            }
            LoadEvent::Failed(e) => {
                tracing::error!("model load failed: {e}");
                self.load_failed = true;
                LoadOutcome::Failed
            }
        }
    }

    /// Run the model update for one frame.
    ///
    /// Returns the number of movement actions applied, or `None` once the
    /// session is disposed and no further frames should be scheduled.
    pub fn tick(&mut self) -> Option<usize> {
        let frame = self.frame_loop.begin_frame()?;
        let applied = self
            .mapper
            .apply_frame(&self.input, self.scene.model_node_mut());
        if applied > 0 {
            tracing::trace!(frame, applied, "applied movement");
        }
        Some(applied)
    }

    /// Stop the frame loop. Later input and load events are ignored.
    pub fn dispose(&mut self) {
        if self.frame_loop.dispose() {
            tracing::info!(frames = self.frame_loop.frame(), "session disposed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use hangar_assets::{AssetError, LoadProgress, LoadedModel, MeshData};

    fn session() -> Session {
        Session::new(&HangarConfig::default())
    }

    fn one_mesh_model() -> LoadedModel {
        LoadedModel {
            name: "ship".into(),
            meshes: vec![MeshData {
                name: "hull_0".into(),
                positions: vec![[0.0; 3]; 3],
                normals: vec![[0.0, 1.0, 0.0]; 3],
                indices: vec![0, 1, 2],
                uvs: Vec::new(),
                base_color: [1.0; 4],
                base_color_texture: None,
                transform: glam::Mat4::IDENTITY,
                cast_shadow: false,
                receive_shadow: false,
            }],
        }
    }

    #[test]
    fn frames_before_load_do_nothing() {
        let mut s = session();
        s.key_down("w");
        for _ in 0..5 {
            assert_eq!(s.tick(), Some(0));
        }
        assert!(!s.model_loaded());
    }

    #[test]
    fn loaded_model_is_placed_and_shadowed() {
        let mut s = session();
        let outcome = s.apply_load_event(LoadEvent::Loaded(one_mesh_model()));
        assert_eq!(outcome, LoadOutcome::Attached);

        let instance = s.scene().model().unwrap();
        assert_eq!(instance.node.position, Vec3::new(0.0, 1.05, -1.0));
        assert_eq!(instance.node.yaw, 0.0);
        assert!(instance.model.meshes.iter().all(|m| m.cast_shadow && m.receive_shadow));
    }

    #[test]
    fn hold_forward_ten_frames_after_load() {
        let mut s = session();
        s.apply_load_event(LoadEvent::Loaded(LoadedModel::empty("ship")));
        s.key_down("W");
        for _ in 0..10 {
            assert_eq!(s.tick(), Some(1));
        }
        let node = s.scene().model_node().unwrap();
        assert!((node.position - Vec3::new(0.0, 1.05, 0.0)).length() < 1e-5);
    }

    #[test]
    fn failed_load_leaves_scene_empty_and_mapper_idle() {
        let mut s = session();
        s.apply_load_event(LoadEvent::Progress(LoadProgress {
            loaded: 10,
            total: 100,
        }));
        let outcome = s.apply_load_event(LoadEvent::Failed(AssetError::NoScene));
        assert_eq!(outcome, LoadOutcome::Failed);
        assert!(s.load_failed());

        for key in ["w", "a", "s", "d", "q", "e", "arrowup", "arrowdown"] {
            s.key_down(key);
        }
        for _ in 0..1000 {
            assert_eq!(s.tick(), Some(0));
        }
        assert!(s.scene().model().is_none());
    }

    #[test]
    fn progress_reports_fraction() {
        let mut s = session();
        let outcome = s.apply_load_event(LoadEvent::Progress(LoadProgress {
            loaded: 3,
            total: 4,
        }));
        assert_eq!(outcome, LoadOutcome::Progress(Some(0.75)));
    }

    #[test]
    fn dispose_stops_ticks_and_drops_late_loads() {
        let mut s = session();
        s.tick();
        s.dispose();
        assert!(!s.is_running());
        assert_eq!(s.tick(), None);

        let outcome = s.apply_load_event(LoadEvent::Loaded(one_mesh_model()));
        assert_eq!(outcome, LoadOutcome::Discarded);
        assert!(!s.model_loaded());
        assert_eq!(s.frame(), 1);
    }

    #[test]
    fn input_after_dispose_is_ignored() {
        let mut s = session();
        s.dispose();
        assert_eq!(s.key_down("w"), KeyDisposition::PassThrough);
        assert!(!s.input().is_held("w"));
    }
}
