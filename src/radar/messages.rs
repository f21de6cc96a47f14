// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Actix actor message definitions used to communicate with the [`Radar`] component.

#[allow(unused_imports)] // used for doc links
use super::Radar;
use crate::entity::{EntityChange, EntityInfo, ResetButton};
use crate::errors::ServiceError;
use actix::prelude::{Message, Recipient};
use derive_more::Constructor;

/// Request a radar module reset. Sent by the reset button to its parent.
#[derive(Debug, Message)]
#[rtype(result = "()")]
pub struct ResetDevice {
    /// Entity requesting the reset
    pub entity_id: String,
}

/// Attach the reset button to the radar, transferring ownership.
///
/// Fails with [`ServiceError::AlreadyExists`] if the radar already owns a reset button.
#[derive(Message)]
#[rtype(result = "Result<(), ServiceError>")]
pub struct SetResetButton(pub ResetButton);

/// Host request: press a button entity.
#[derive(Constructor, Message)]
#[rtype(result = "Result<(), ServiceError>")]
pub struct PressButton {
    pub entity_id: String,
}

/// Host request: turn a switch entity on or off.
#[derive(Constructor, Message)]
#[rtype(result = "Result<(), ServiceError>")]
pub struct SetSwitch {
    pub entity_id: String,
    pub on: bool,
}

/// Host request: choose an option of a select entity.
#[derive(Constructor, Message)]
#[rtype(result = "Result<(), ServiceError>")]
pub struct SelectOption {
    pub entity_id: String,
    pub option: String,
}

/// Retrieve all known entity states.
#[derive(Message)]
#[rtype(result = "Vec<EntityChange>")]
pub struct GetEntityStates;

/// Retrieve the metadata of all entities, including attached buttons.
#[derive(Message)]
#[rtype(result = "Vec<EntityInfo>")]
pub struct GetEntities;

/// Subscribe to entity state changes. The current states are sent immediately.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Subscribe(pub Recipient<EntityEvent>);

/// Get notified when the radar connection closes.
#[derive(Message)]
#[rtype(result = "()")]
pub struct WatchConnection(pub Recipient<ConnectionEvent>);

/// Entity state change published by the radar.
#[derive(Clone, Debug, Message)]
#[rtype(result = "()")]
pub struct EntityEvent {
    pub radar_id: String,
    pub entity_change: EntityChange,
}

/// Radar connection states
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Closed,
}

/// Radar connection events
#[derive(Clone, Debug, Message)]
#[rtype(result = "()")]
pub struct ConnectionEvent {
    pub radar_id: String,
    pub state: ConnectionState,
}
