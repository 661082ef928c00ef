use std::path::{Path, PathBuf};

use glam::Vec3;
use hangar_common::ModelNode;
use hangar_input::SuppressPolicy;
use serde::{Deserialize, Serialize};

use crate::MovementConfig;

/// Errors from reading a tuning file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Where the model is placed when it finishes loading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Placement {
    pub position: Vec3,
    pub yaw: f32,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 1.05, -1.0),
            yaw: 0.0,
        }
    }
}

impl Placement {
    pub fn node(&self) -> ModelNode {
        ModelNode::new(self.position, self.yaw)
    }
}

/// Viewer tuning. Every field is optional in the YAML file.
///
/// ```yaml
/// asset: millennium_falcon/scene.gltf
/// suppress: mapped_only
/// movement:
///   step: 0.2
/// placement:
///   position: [0.0, 1.05, -1.0]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HangarConfig {
    pub asset: PathBuf,
    pub movement: MovementConfig,
    pub placement: Placement,
    pub suppress: SuppressPolicy,
}

impl Default for HangarConfig {
    fn default() -> Self {
        Self {
            asset: PathBuf::from("millennium_falcon/scene.gltf"),
            movement: MovementConfig::default(),
            placement: Placement::default(),
            suppress: SuppressPolicy::default(),
        }
    }
}

impl HangarConfig {
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&text)
    }

    /// Apply command-line overrides on top of file or default values.
    pub fn with_overrides(mut self, asset: Option<PathBuf>, mapped_keys_only: bool) -> Self {
        if let Some(asset) = asset {
            self.asset = asset;
        }
        if mapped_keys_only {
            self.suppress = SuppressPolicy::MappedOnly;
        }
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.movement;
        if !(m.step.is_finite() && m.step > 0.0) {
            return Err(ConfigError::Invalid {
                field: "movement.step",
                reason: format!("must be a positive number, got {}", m.step),
            });
        }
        if !m.yaw_step.is_finite() {
            return Err(ConfigError::Invalid {
                field: "movement.yaw_step",
                reason: format!("must be finite, got {}", m.yaw_step),
            });
        }
        if !m.floor.is_finite() {
            return Err(ConfigError::Invalid {
                field: "movement.floor",
                reason: format!("must be finite, got {}", m.floor),
            });
        }
        if self.placement.position.y < m.floor {
            tracing::warn!(
                y = self.placement.position.y,
                floor = m.floor,
                "model placement starts below the movement floor"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_gives_defaults() {
        let config = HangarConfig::from_yaml("{}").unwrap();
        assert_eq!(config, HangarConfig::default());
        assert_eq!(config.movement.step, 0.1);
        assert_eq!(config.placement.position, Vec3::new(0.0, 1.05, -1.0));
        assert_eq!(config.suppress, SuppressPolicy::AllKeys);
    }

    #[test]
    fn partial_yaml_overrides_only_named_fields() {
        let yaml = "
suppress: mapped_only
movement:
  step: 0.25
placement:
  position: [1.0, 2.0, 3.0]
";
        let config = HangarConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.suppress, SuppressPolicy::MappedOnly);
        assert_eq!(config.movement.step, 0.25);
        assert_eq!(config.movement.floor, 1.05);
        assert_eq!(config.placement.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(config.placement.yaw, 0.0);
    }

    #[test]
    fn non_positive_step_is_rejected() {
        let err = HangarConfig::from_yaml("movement: { step: 0.0 }").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "movement.step",
                ..
            }
        ));
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let err = HangarConfig::from_yaml("movement: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hangar.yaml");
        std::fs::write(&path, "asset: models/ship.glb\n").unwrap();
        let config = HangarConfig::load(&path).unwrap();
        assert_eq!(config.asset, PathBuf::from("models/ship.glb"));
    }

    #[test]
    fn overrides_replace_asset_and_policy() {
        let config = HangarConfig::default()
            .with_overrides(Some(PathBuf::from("other.glb")), true);
        assert_eq!(config.asset, PathBuf::from("other.glb"));
        assert_eq!(config.suppress, SuppressPolicy::MappedOnly);

        let untouched = HangarConfig::default().with_overrides(None, false);
        assert_eq!(untouched, HangarConfig::default());
    }

    #[test]
    fn placement_builds_node() {
        let node = Placement::default().node();
        assert_eq!(node.position, Vec3::new(0.0, 1.05, -1.0));
        assert_eq!(node.yaw, 0.0);
    }
}
