// Copyright (c) 2022 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Configuration file handling.

use crate::entity::{
    ButtonDeviceClass, DEFAULT_RESET_ICON, EntityCategory, EntityId, EntityInfo,
    EntityInfoBuilder,
};
use crate::errors::ServiceError;
use crate::radar::MAX_CYCLE_QUERIES;
use config::{Config, Source};
use log::warn;
use serde_with::{DurationMilliSeconds, DurationSeconds, serde_as};
use std::time::Duration;
use url::Url;

/// Default configuration file.
pub const DEF_CONFIG_FILE: &str = "configuration.yaml";

pub const DEF_RADAR_URL: &str = "serial:///dev/ttyUSB0";

/// Environment variable to enable radar frame tracing.
///
/// Logs every received and sent frame as hex dump with `debug` level.
pub const ENV_FRAME_TRACING: &str = "MR24_FRAME_TRACING";

#[derive(Default, serde::Deserialize, serde::Serialize)]
pub struct Settings {
    pub radar: RadarSettings,
    #[serde(default)]
    pub entities: EntitySettings,
}

#[serde_as]
#[derive(Clone, serde::Deserialize, serde::Serialize)]
pub struct RadarSettings {
    /// Radar connection: `serial:///dev/ttyUSB0` or `tcp://host:port` for a serial bridge.
    pub url: Url,
    /// Update cycle interval. Every cycle evaluates the heartbeat and queues the next queries.
    #[serde_as(as = "DurationSeconds")]
    #[serde(rename = "update_interval_sec")]
    pub update_interval: Duration,
    /// Pause between two queued queries. All queries of a cycle must fit into `update_interval`.
    #[serde_as(as = "DurationMilliSeconds")]
    #[serde(rename = "query_spacing_ms")]
    pub query_spacing: Duration,
}

impl Default for RadarSettings {
    fn default() -> Self {
        Self {
            url: Url::parse(DEF_RADAR_URL).unwrap(),
            update_interval: Duration::from_secs(1),
            query_spacing: Duration::from_millis(100),
        }
    }
}

/// Optional entities attached to the radar.
#[derive(Clone, Default, serde::Deserialize, serde::Serialize)]
pub struct EntitySettings {
    /// Reset button. Not created if missing.
    pub reset: Option<ButtonSettings>,
}

/// Presentation metadata of a button entity.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ButtonSettings {
    #[serde(default = "default_reset_name")]
    pub name: String,
    #[serde(default = "default_reset_device_class")]
    pub device_class: ButtonDeviceClass,
    #[serde(default = "default_reset_category")]
    pub entity_category: EntityCategory,
    #[serde(default = "default_reset_icon")]
    pub icon: String,
}

impl Default for ButtonSettings {
    fn default() -> Self {
        Self {
            name: default_reset_name(),
            device_class: default_reset_device_class(),
            entity_category: default_reset_category(),
            icon: default_reset_icon(),
        }
    }
}

impl ButtonSettings {
    /// Entity metadata of the reset button.
    pub fn to_info(&self) -> Result<EntityInfo, ServiceError> {
        if self.name.trim().is_empty() {
            return Err(ServiceError::BadRequest(
                "Reset button name must not be empty".into(),
            ));
        }
        let id = EntityId::Reset;
        let info = EntityInfoBuilder::default()
            .entity_id(id.to_string())
            .entity_type(id.entity_type())
            .name(self.name.trim())
            .device_class(self.device_class.to_string())
            .entity_category(self.entity_category)
            .icon(self.icon.as_str())
            .build()?;
        Ok(info)
    }
}

fn default_reset_name() -> String {
    "Module Reset".into()
}
fn default_reset_device_class() -> ButtonDeviceClass {
    ButtonDeviceClass::Restart
}
fn default_reset_category() -> EntityCategory {
    EntityCategory::Config
}
fn default_reset_icon() -> String {
    DEFAULT_RESET_ICON.into()
}

/// Load the configuration settings.
///
/// The application provides default values which can be overriden in the following order:
/// 1. Configuration settings in the yaml or json configuration file specified in `filename`
/// 2. Environment variables with prefix `MR24_`, nested keys separated by `__`.
///    E.g. `MR24_RADAR__URL=tcp://192.168.1.20:8899` sets the `radar.url` key.
pub fn get_configuration(filename: Option<&str>) -> Result<Settings, config::ConfigError> {
    load_configuration(filename.map(config::File::with_name))
}

fn load_configuration<S>(file: Option<S>) -> Result<Settings, config::ConfigError>
where
    S: Source + Send + Sync + 'static,
{
    // default configuration
    let mut config = Config::builder().add_source(Config::try_from(&Settings::default())?);
    // read optional configuration file to override defaults
    if let Some(file) = file {
        config = config.add_source(file);
    }

    let config = config
        .add_source(
            config::Environment::with_prefix("MR24")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let settings: Settings = config.try_deserialize()?;

    check_cfg_values(settings)
}

fn check_cfg_values(mut settings: Settings) -> Result<Settings, config::ConfigError> {
    let radar = &mut settings.radar;
    if radar.update_interval.is_zero()
        || radar.query_spacing.as_millis() < 10
        || radar.query_spacing * MAX_CYCLE_QUERIES >= radar.update_interval
    {
        warn!(
            "Invalid radar timing settings (update interval {:?}, query spacing {:?}), using defaults.",
            radar.update_interval, radar.query_spacing
        );
        let defaults = RadarSettings::default();
        radar.update_interval = defaults.update_interval;
        radar.query_spacing = defaults.query_spacing;
    }

    match radar.url.scheme() {
        "tcp" => {
            if radar.url.host_str().is_none() || radar.url.port().is_none() {
                return Err(config::ConfigError::Message(format!(
                    "radar.url requires host and port: {}",
                    radar.url
                )));
            }
        }
        "serial" => {
            if radar.url.path().is_empty() || radar.url.path() == "/" {
                return Err(config::ConfigError::Message(format!(
                    "radar.url requires a device path: {}",
                    radar.url
                )));
            }
        }
        scheme => {
            return Err(config::ConfigError::Message(format!(
                "invalid scheme in radar.url: {scheme}. Valid: [serial, tcp]"
            )));
        }
    }

    if let Some(reset) = &settings.entities.reset {
        if let Err(e) = reset.to_info() {
            return Err(config::ConfigError::Message(format!(
                "invalid entities.reset configuration: {e}"
            )));
        }
    }

    Ok(settings)
}
