use std::time::Duration;

use config::{Config, ConfigError, File, FileFormat};
use serde::Deserialize;
use tracing::{error, info};

use rover_drive::{DriveError, RampConfig, Speed};

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub serial: SerialSettings,
    #[serde(default)]
    pub pins: PinMap,
    #[serde(default)]
    pub drive: DriveSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SerialSettings {
    /// Substring picking the paired module out of the discovered ports.
    pub device: String,
    pub baud: u32,
    pub timeout_ms: u64,
    pub settle_ms: u64,
}

impl Default for SerialSettings {
    fn default() -> Self {
        SerialSettings {
            device: "HC-05".to_string(),
            baud: rover_firmata::DEFAULT_BAUD,
            timeout_ms: 1000,
            settle_ms: 500,
        }
    }
}

impl SerialSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// Board pin assignments for the HW-095 driver, HC-05 wiring defaults.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PinMap {
    pub ena: u8,
    pub in1: u8,
    pub in2: u8,
    pub enb: u8,
    pub in3: u8,
    pub in4: u8,
}

impl Default for PinMap {
    fn default() -> Self {
        PinMap {
            ena: 11,
            in1: 13,
            in2: 12,
            enb: 6,
            in3: 10,
            in4: 9,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DriveSettings {
    pub default_speed: f32,
    pub ramp_step: f32,
    pub ramp_interval_ms: u64,
}

impl Default for DriveSettings {
    fn default() -> Self {
        DriveSettings {
            default_speed: 0.3,
            ramp_step: 0.05,
            ramp_interval_ms: 50,
        }
    }
}

impl DriveSettings {
    pub fn ramp(&self) -> Result<RampConfig, DriveError> {
        RampConfig::new(self.ramp_step, Duration::from_millis(self.ramp_interval_ms))
    }

    pub fn speed(&self) -> Result<Speed, DriveError> {
        Speed::new(self.default_speed)
    }
}

pub fn load_settings() -> Result<Settings, ConfigError> {
    info!("Attempting to load configuration from {}", DEFAULT_CONFIG_PATH);

    let settings = Config::builder()
        .add_source(File::new(DEFAULT_CONFIG_PATH, FileFormat::Toml).required(false))
        .build()
        .and_then(|config| config.try_deserialize::<Settings>());

    match settings {
        Ok(settings) => {
            info!("Successfully loaded configuration: {:?}", settings);
            Ok(settings)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}
