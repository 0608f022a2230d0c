use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::runtime::Error;

/// Load a TOML configuration file.
pub fn from_file<T: DeserializeOwned>(path: impl AsRef<std::path::Path>) -> std::io::Result<T> {
    let contents = std::fs::read_to_string(path)?;

    toml::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
}

/// Open loop motion parameters.
#[derive(Clone, Debug, serde_derive::Deserialize, PartialEq)]
pub struct MotionConfig {
    /// Straight line speed in m/s.
    #[serde(default = "MotionConfig::default_move_speed")]
    pub move_speed: f64,
    /// Rotational speed in rad/s.
    #[serde(default = "MotionConfig::default_spin_speed")]
    pub spin_speed: f64,
    /// Publish period in seconds.
    #[serde(default = "MotionConfig::default_sample_dt")]
    pub sample_dt: f64,
    /// Number of zero commands in a halt pulse train.
    #[serde(default = "MotionConfig::default_halt_ticks")]
    pub halt_ticks: usize,
    /// Whether the proximity alarm cancels a spin.
    #[serde(default = "MotionConfig::default_spin_interruptible")]
    pub spin_interruptible: bool,
}

impl MotionConfig {
    fn default_move_speed() -> f64 {
        1.0
    }

    fn default_spin_speed() -> f64 {
        0.5
    }

    fn default_sample_dt() -> f64 {
        0.01
    }

    fn default_halt_ticks() -> usize {
        100
    }

    fn default_spin_interruptible() -> bool {
        true
    }

    /// Reject parameters that would never terminate or never move.
    pub fn validate(&self) -> crate::runtime::Result {
        if !(self.move_speed.is_finite() && self.move_speed > 0.0) {
            return Err(Error::InvalidConfig("move_speed must be positive"));
        }
        if !(self.spin_speed.is_finite() && self.spin_speed > 0.0) {
            return Err(Error::InvalidConfig("spin_speed must be positive"));
        }
        if !(self.sample_dt.is_finite() && self.sample_dt > 0.0) {
            return Err(Error::InvalidConfig("sample_dt must be positive"));
        }
        if self.halt_ticks == 0 {
            return Err(Error::InvalidConfig("halt_ticks must be non-zero"));
        }

        Ok(())
    }

    #[inline]
    pub fn sample_interval(&self) -> Duration {
        Duration::from_secs_f64(self.sample_dt)
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            move_speed: Self::default_move_speed(),
            spin_speed: Self::default_spin_speed(),
            sample_dt: Self::default_sample_dt(),
            halt_ticks: Self::default_halt_ticks(),
            spin_interruptible: Self::default_spin_interruptible(),
        }
    }
}
