use mobot::{service::TcpServerConfig, MotionConfig};

#[derive(Clone, Debug, serde_derive::Deserialize, PartialEq, Eq)]
pub struct DriveConfig {
    /// Network address of the drive controller.
    #[serde(default = "DriveConfig::default_address")]
    pub address: String,
}

impl DriveConfig {
    fn default_address() -> String {
        format!("127.0.0.1:{}", mobot::consts::DEFAULT_DRIVE_PORT)
    }
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            address: Self::default_address(),
        }
    }
}

#[derive(Clone, Debug, Default, serde_derive::Deserialize, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Enable simulation mode.
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Clone, Debug, Default, serde_derive::Deserialize)]
pub struct Config {
    /// Motion configuration.
    #[serde(default)]
    pub motion: MotionConfig,
    /// Server configuration.
    #[serde(default)]
    pub server: TcpServerConfig,
    /// Drive configuration.
    #[serde(default)]
    pub drive: DriveConfig,
    /// Simulation configuration.
    #[serde(default)]
    pub simulation: SimulationConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config.motion, MotionConfig::default());
        assert_eq!(config.server.listen, "127.0.0.1:30061");
        assert_eq!(config.drive.address, "127.0.0.1:30062");
        assert!(!config.simulation.enabled);
    }

    #[test]
    fn test_config_sections() {
        let config: Config = toml::from_str(
            r#"
            [motion]
            move_speed = 0.4
            halt_ticks = 20

            [server]
            listen = "0.0.0.0:30061"

            [drive]
            address = "10.0.0.7:30062"

            [simulation]
            enabled = true
            "#,
        )
        .unwrap();

        assert_eq!(config.motion.move_speed, 0.4);
        assert_eq!(config.motion.halt_ticks, 20);
        assert_eq!(config.motion.spin_speed, 0.5);
        assert_eq!(config.server.listen, "0.0.0.0:30061");
        assert_eq!(config.server.max_connections, 8);
        assert_eq!(config.drive.address, "10.0.0.7:30062");
        assert!(config.simulation.enabled);
    }
}
