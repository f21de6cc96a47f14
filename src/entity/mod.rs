// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Entities exposed by the radar component.
//!
//! An entity is a discrete observable or controllable unit: sensors, text sensors, a binary
//! presence sensor, a switch, a select and the optional reset button. Presentation metadata in
//! [`EntityInfo`] is passed through to the host and has no behaviour attached.

pub mod button;
mod store;

pub use button::{Pressable, ResetButton};
pub use store::EntityStore;

use crate::protocol::SceneMode;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityType {
    Sensor,
    BinarySensor,
    TextSensor,
    Switch,
    Select,
    Button,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityCategory {
    Config,
    Diagnostic,
}

/// Device classes a button entity may declare.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ButtonDeviceClass {
    Identify,
    Restart,
    Update,
}

/// All entities of the radar component.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, AsRefStr, Display, EnumIter, EnumString,
)]
#[strum(serialize_all = "snake_case")]
pub enum EntityId {
    Heartbeat,
    ProductModel,
    ProductId,
    HardwareModel,
    FirmwareVersion,
    KeepAway,
    MotionStatus,
    SomeoneExists,
    MovementSigns,
    CustomPresenceOfDetection,
    CustomMotionDistance,
    CustomSpatialStaticValue,
    CustomSpatialMotionValue,
    CustomMotionSpeed,
    UnderlyingOpenFunction,
    SceneMode,
    Reset,
}

impl EntityId {
    pub fn entity_type(self) -> EntityType {
        match self {
            EntityId::Heartbeat
            | EntityId::ProductModel
            | EntityId::ProductId
            | EntityId::HardwareModel
            | EntityId::FirmwareVersion
            | EntityId::KeepAway
            | EntityId::MotionStatus => EntityType::TextSensor,
            EntityId::SomeoneExists => EntityType::BinarySensor,
            EntityId::MovementSigns
            | EntityId::CustomPresenceOfDetection
            | EntityId::CustomMotionDistance
            | EntityId::CustomSpatialStaticValue
            | EntityId::CustomSpatialMotionValue
            | EntityId::CustomMotionSpeed => EntityType::Sensor,
            EntityId::UnderlyingOpenFunction => EntityType::Switch,
            EntityId::SceneMode => EntityType::Select,
            EntityId::Reset => EntityType::Button,
        }
    }

    /// Entities holding a state. Buttons are stateless.
    pub fn stateful() -> impl Iterator<Item = EntityId> {
        EntityId::iter().filter(|id| id.entity_type() != EntityType::Button)
    }

    /// Default presentation metadata.
    pub fn info(self) -> EntityInfo {
        let mut info = EntityInfo {
            entity_id: self.to_string(),
            entity_type: self.entity_type(),
            name: String::new(),
            device_class: None,
            entity_category: None,
            icon: None,
            unit: None,
            options: Vec::new(),
        };
        let diagnostic = Some(EntityCategory::Diagnostic);

        match self {
            EntityId::Heartbeat => {
                info.name = "Heartbeat".into();
                info.entity_category = diagnostic;
                info.icon = Some("mdi:connection".into());
            }
            EntityId::ProductModel => {
                info.name = "Product Model".into();
                info.entity_category = diagnostic;
                info.icon = Some("mdi:information-outline".into());
            }
            EntityId::ProductId => {
                info.name = "Product ID".into();
                info.entity_category = diagnostic;
                info.icon = Some("mdi:information-outline".into());
            }
            EntityId::HardwareModel => {
                info.name = "Hardware Model".into();
                info.entity_category = diagnostic;
                info.icon = Some("mdi:information-outline".into());
            }
            EntityId::FirmwareVersion => {
                info.name = "Firmware Version".into();
                info.entity_category = diagnostic;
                info.icon = Some("mdi:information-outline".into());
            }
            EntityId::KeepAway => {
                info.name = "Active Reporting Of Proximity".into();
                info.icon = Some("mdi:walk".into());
            }
            EntityId::MotionStatus => {
                info.name = "Motion Info".into();
                info.icon = Some("mdi:human-greeting".into());
            }
            EntityId::SomeoneExists => {
                info.name = "Presence Information".into();
                info.device_class = Some("occupancy".into());
                info.icon = Some("mdi:motion-sensor".into());
            }
            EntityId::MovementSigns => {
                info.name = "Body Movement Parameter".into();
                info.icon = Some("mdi:human-greeting-variant".into());
            }
            EntityId::CustomPresenceOfDetection => {
                info.name = "Static Distance".into();
                info.device_class = Some("distance".into());
                info.unit = Some("m".into());
            }
            EntityId::CustomMotionDistance => {
                info.name = "Motion Distance".into();
                info.device_class = Some("distance".into());
                info.unit = Some("m".into());
            }
            EntityId::CustomSpatialStaticValue => {
                info.name = "Existence Energy".into();
                info.icon = Some("mdi:counter".into());
            }
            EntityId::CustomSpatialMotionValue => {
                info.name = "Motion Energy".into();
                info.icon = Some("mdi:counter".into());
            }
            EntityId::CustomMotionSpeed => {
                info.name = "Motion Speed".into();
                info.device_class = Some("speed".into());
                info.unit = Some("m/s".into());
            }
            EntityId::UnderlyingOpenFunction => {
                info.name = "Underlying Open Function Info Output Switch".into();
                info.entity_category = Some(EntityCategory::Config);
                info.icon = Some("mdi:electric-switch".into());
            }
            EntityId::SceneMode => {
                info.name = "Scene".into();
                info.entity_category = Some(EntityCategory::Config);
                info.icon = Some("mdi:hoop-house".into());
                info.options = SceneMode::iter().map(|m| m.to_string()).collect();
            }
            EntityId::Reset => {
                info.name = "Module Reset".into();
                info.device_class = Some(ButtonDeviceClass::Restart.to_string());
                info.entity_category = Some(EntityCategory::Config);
                info.icon = Some(DEFAULT_RESET_ICON.into());
            }
        }

        info
    }
}

pub const DEFAULT_RESET_ICON: &str = "mdi:restart-alert";

/// Entity presentation metadata.
#[derive(Builder, Clone, Debug, PartialEq, Serialize)]
pub struct EntityInfo {
    #[builder(setter(into))]
    pub entity_id: String,
    pub entity_type: EntityType,
    #[builder(setter(into))]
    pub name: String,
    #[builder(default, setter(into, strip_option))]
    pub device_class: Option<String>,
    #[builder(default, setter(strip_option))]
    pub entity_category: Option<EntityCategory>,
    #[builder(default, setter(into, strip_option))]
    pub icon: Option<String>,
    #[builder(default, setter(into, strip_option))]
    pub unit: Option<String>,
    /// Select options
    #[builder(default)]
    pub options: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EntityState {
    Number(f32),
    Bool(bool),
    Text(String),
}

impl From<f32> for EntityState {
    fn from(value: f32) -> Self {
        EntityState::Number(value)
    }
}

impl From<u8> for EntityState {
    fn from(value: u8) -> Self {
        EntityState::Number(f32::from(value))
    }
}

impl From<bool> for EntityState {
    fn from(value: bool) -> Self {
        EntityState::Bool(value)
    }
}

impl From<String> for EntityState {
    fn from(value: String) -> Self {
        EntityState::Text(value)
    }
}

impl From<&str> for EntityState {
    fn from(value: &str) -> Self {
        EntityState::Text(value.to_string())
    }
}

/// Published entity state change.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EntityChange {
    pub entity_type: EntityType,
    pub entity_id: String,
    pub state: EntityState,
}
