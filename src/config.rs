//! Tunable timings and tolerances, loadable from TOML.
//!
//! Every field has a default, so a partial file (say only `rotation_ms`)
//! works.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::error::CubeError;

/// Smallest usable `epsilon` relative to `spacing`.
pub const MIN_EPSILON_RATIO: f32 = 1e-4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Distance between neighbouring slot centres in world units.
    pub spacing: f32,
    /// Tolerance for matching coordinates against layers and slots.
    pub epsilon: f32,
    /// Length of one quarter-turn animation.
    pub rotation_ms: u64,
    /// Minimum gap between accepted user moves.
    pub debounce_ms: u64,
    /// Pause after each scripted move completes, before the next starts.
    pub script_delay_ms: u64,
    /// Maximum entries kept in the analytical history.
    pub history_capacity: usize,
    /// Moves per scramble.
    pub scramble_length: usize,
    pub easing: Easing,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spacing: 1.0,
            epsilon: 0.01,
            rotation_ms: 350,
            debounce_ms: 350,
            script_delay_ms: 300,
            history_capacity: 1000,
            scramble_length: 20,
            easing: Easing::default(),
        }
    }
}

impl Config {
    /// Loads a config from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, CubeError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that slots can be told apart and that a settled turn lands
    /// within tolerance.
    ///
    /// `epsilon` must be at least `spacing * MIN_EPSILON_RATIO` to absorb
    /// float rounding, and below half the spacing so that neighbouring slots
    /// never both match.
    pub fn validate(&self) -> Result<(), CubeError> {
        if !(self.spacing.is_finite() && self.spacing > 0.0) {
            return Err(CubeError::InvalidConfig(format!(
                "spacing must be positive, got {}",
                self.spacing
            )));
        }
        let min = self.spacing * MIN_EPSILON_RATIO;
        let max = self.spacing / 2.0;
        if !(self.epsilon >= min && self.epsilon < max) {
            return Err(CubeError::InvalidConfig(format!(
                "epsilon must be in [{min}, {max}) for spacing {}, got {}",
                self.spacing, self.epsilon
            )));
        }
        Ok(())
    }

    pub fn rotation_duration(&self) -> Duration {
        Duration::from_millis(self.rotation_ms)
    }

    pub fn debounce_interval(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn script_delay(&self) -> Duration {
        Duration::from_millis(self.script_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("rotation_ms = 120\neasing = \"smooth_step\"\n").unwrap();
        assert_eq!(config.rotation_duration(), Duration::from_millis(120));
        assert_eq!(config.easing, Easing::SmoothStep);
        assert_eq!(config.history_capacity, 1000);
        assert_eq!(config.epsilon, 0.01);
    }

    #[test]
    fn test_default_round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_validate_rejects_unusable_tolerances() {
        assert!(Config::default().validate().is_ok());
        let cases = [
            (0.0, 0.01),
            (-1.0, 0.01),
            (1.0, 0.0),
            (1.0, 1e-9),
            (1.0, 0.5),
            (1.0, f32::NAN),
        ];
        for (spacing, epsilon) in cases {
            let config = Config {
                spacing,
                epsilon,
                ..Config::default()
            };
            assert!(
                matches!(config.validate(), Err(CubeError::InvalidConfig(_))),
                "spacing {spacing} epsilon {epsilon} accepted"
            );
        }
    }

    #[test]
    fn test_load_validates() {
        let path = std::env::temp_dir().join(format!("cuber-{}-tight.toml", std::process::id()));
        std::fs::write(&path, "epsilon = 1e-9\n").unwrap();
        let result = Config::load(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(CubeError::InvalidConfig(_))));
    }

    #[test]
    fn test_load_reports_missing_file() {
        let missing = Path::new("definitely/not/here.toml");
        assert!(matches!(Config::load(missing), Err(CubeError::Io(_))));
    }
}
