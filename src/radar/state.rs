// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Radar device state without any I/O.
//!
//! Consumes decoded [`Report`]s, tracks the output mode of the radar, plans the periodic query
//! cycle and translates everything into entity state changes.

use crate::entity::{EntityChange, EntityId, EntityStore};
use crate::protocol::{Command, Report};
use log::{debug, info, warn};
use rust_fsm::*;
use std::collections::VecDeque;

state_machine! {
    derive(Debug)
    OutputMode(PowerOn)

    PowerOn => {
        SwitchOn => Underlying,
        SwitchOff => Standard,
    },
    Standard => {
        SwitchOn => Underlying,
        Reset => PowerOn,
    },
    Underlying => {
        SwitchOff => Standard,
        Reset => PowerOn,
    },
}

/// Number of update cycles after power-on which check the underlying open function switch.
pub const POWER_ON_CHECKS: u8 = 4;

/// Most queries planned in one update cycle (standard mode without cached product information).
pub const MAX_CYCLE_QUERIES: u32 = 7;

pub const HEARTBEAT_NORMAL: &str = "Normal";
pub const HEARTBEAT_ABNORMAL: &str = "Abnormal";

/// Reporting mode of the radar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Underlying open function switch state not yet known.
    PowerOn,
    /// Standard human presence reports, queried periodically.
    Standard,
    /// Underlying open function on: the radar streams raw values by itself.
    Underlying,
}

#[derive(Debug, Default)]
struct ProductInfo {
    model: Option<String>,
    id: Option<String>,
    hardware_model: Option<String>,
    firmware_version: Option<String>,
}

pub struct RadarState {
    store: EntityStore,
    machine: StateMachine<OutputMode>,
    power_on_checks: u8,
    /// Set after the first update cycle: heartbeat state is published from then on.
    heartbeat_armed: bool,
    heartbeat_received: bool,
    product: ProductInfo,
    queries: VecDeque<Command>,
}

impl Default for RadarState {
    fn default() -> Self {
        Self {
            store: Default::default(),
            machine: StateMachine::new(),
            power_on_checks: 0,
            heartbeat_armed: false,
            heartbeat_received: false,
            product: Default::default(),
            queries: Default::default(),
        }
    }
}

impl RadarState {
    pub fn mode(&self) -> Mode {
        match self.machine.state() {
            OutputModeState::PowerOn => Mode::PowerOn,
            OutputModeState::Standard => Mode::Standard,
            OutputModeState::Underlying => Mode::Underlying,
        }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn pending_queries(&self) -> usize {
        self.queries.len()
    }

    fn transition(&mut self, input: OutputModeInput) {
        let from = self.mode();
        if self.machine.consume(&input).is_ok() && from != self.mode() {
            info!("Radar output mode changed: {from:?} -> {:?}", self.mode());
        }
    }

    /// Start a new update cycle: publish the heartbeat state of the last cycle and plan the
    /// queries of this cycle.
    pub fn update(&mut self) -> Vec<EntityChange> {
        let mut changes = Vec::with_capacity(1);
        if self.heartbeat_armed {
            let state = if self.heartbeat_received {
                HEARTBEAT_NORMAL
            } else {
                HEARTBEAT_ABNORMAL
            };
            changes.extend(self.store.publish(EntityId::Heartbeat, state));
        }
        self.heartbeat_armed = true;
        self.heartbeat_received = false;

        let power_on_check = self.power_on_checks < POWER_ON_CHECKS;
        if power_on_check {
            self.power_on_checks += 1;
        }

        if !self.queries.is_empty() {
            debug!(
                "Update cycle started with {} pending queries, dropping them",
                self.queries.len()
            );
        }
        self.queries.clear();
        // leads the cycle: the heartbeat state depends on it even if the cycle is cut short
        self.queries.push_back(Command::QueryHeartbeat);
        match self.mode() {
            Mode::PowerOn => {
                self.queries.push_back(Command::QueryUnderlyingOpen);
            }
            Mode::Standard => {
                self.queries.extend([
                    Command::QueryProductModel,
                    Command::QueryProductId,
                    Command::QueryFirmwareVersion,
                    Command::QueryHardwareModel,
                    Command::QueryPresence,
                    Command::QueryKeepAway,
                ]);
            }
            Mode::Underlying => {
                if power_on_check {
                    self.queries.push_back(Command::QueryUnderlyingOpen);
                }
            }
        }

        changes
    }

    /// Next query of the current cycle. Product information queries are skipped once known.
    pub fn next_query(&mut self) -> Option<Command> {
        while let Some(cmd) = self.queries.pop_front() {
            let cached = match cmd {
                Command::QueryProductModel => self.product.model.is_some(),
                Command::QueryProductId => self.product.id.is_some(),
                Command::QueryHardwareModel => self.product.hardware_model.is_some(),
                Command::QueryFirmwareVersion => self.product.firmware_version.is_some(),
                _ => false,
            };
            if !cached {
                return Some(cmd);
            }
        }
        None
    }

    pub fn handle_report(&mut self, report: Report) -> Vec<EntityChange> {
        let mut changes = Vec::new();
        let store = &mut self.store;

        match report {
            Report::Heartbeat => self.heartbeat_received = true,
            Report::ResetAck => info!("Radar acknowledged module reset"),
            Report::ProductModel(value) => {
                self.product.model = Some(value.clone());
                changes.extend(store.publish(EntityId::ProductModel, value));
            }
            Report::ProductId(value) => {
                self.product.id = Some(value.clone());
                changes.extend(store.publish(EntityId::ProductId, value));
            }
            Report::HardwareModel(value) => {
                debug!("Hardware model: {value}");
                self.product.hardware_model = Some(value.clone());
                changes.extend(store.publish(EntityId::HardwareModel, value));
            }
            Report::FirmwareVersion(value) => {
                self.product.firmware_version = Some(value.clone());
                changes.extend(store.publish(EntityId::FirmwareVersion, value));
            }
            Report::InitStatus(status) => debug!("Radar init status: {status:#04x}"),
            Report::SceneMode(mode) => {
                changes.extend(store.publish(EntityId::SceneMode, mode.to_string()));
            }
            Report::Presence(someone) => {
                changes.extend(store.publish(EntityId::SomeoneExists, someone));
            }
            Report::MotionStatus(status) => {
                changes.extend(store.publish(EntityId::MotionStatus, status.to_string()));
            }
            Report::MovementSigns(value) => {
                changes.extend(store.publish(EntityId::MovementSigns, value));
            }
            Report::KeepAway(value) => {
                changes.extend(store.publish(EntityId::KeepAway, value.to_string()));
            }
            Report::UnderlyingOpen(on) => {
                changes.extend(store.publish(EntityId::UnderlyingOpenFunction, on));
                self.transition(if on {
                    OutputModeInput::SwitchOn
                } else {
                    OutputModeInput::SwitchOff
                });
            }
            Report::Underlying(values) => {
                changes.extend(
                    [
                        store.publish(EntityId::CustomSpatialStaticValue, values.static_value),
                        store.publish(
                            EntityId::CustomPresenceOfDetection,
                            values.presence_distance,
                        ),
                        store.publish(EntityId::CustomSpatialMotionValue, values.motion_value),
                        store.publish(EntityId::CustomMotionDistance, values.motion_distance),
                        store.publish(EntityId::CustomMotionSpeed, values.motion_speed),
                    ]
                    .into_iter()
                    .flatten(),
                );
            }
            Report::StaticValue(value) => {
                changes.extend(store.publish(EntityId::CustomSpatialStaticValue, value));
            }
            Report::MotionValue(value) => {
                changes.extend(store.publish(EntityId::CustomSpatialMotionValue, value));
            }
            Report::PresenceDistance(value) => {
                changes.extend(store.publish(EntityId::CustomPresenceOfDetection, value));
            }
            Report::MotionDistance(value) => {
                changes.extend(store.publish(EntityId::CustomMotionDistance, value));
            }
            Report::MotionSpeed(value) => {
                changes.extend(store.publish(EntityId::CustomMotionSpeed, value));
            }
            Report::Ignored { control, command } => {
                debug!("Ignoring report {control:#04x}/{command:#04x}");
            }
            Report::Unsupported { control, command } => {
                debug!("Unsupported report {control:#04x}/{command:#04x}");
            }
        }

        changes
    }

    /// Switch the underlying open function. The values of the previous mode are cleared.
    pub fn set_underlying_open(&mut self, on: bool) -> (Command, Vec<EntityChange>) {
        let store = &mut self.store;
        let changes = [
            store.publish(EntityId::KeepAway, ""),
            store.publish(EntityId::MotionStatus, ""),
            store.publish(EntityId::CustomSpatialStaticValue, 0.0f32),
            store.publish(EntityId::CustomSpatialMotionValue, 0.0f32),
            store.publish(EntityId::CustomMotionDistance, 0.0f32),
            store.publish(EntityId::CustomPresenceOfDetection, 0.0f32),
            store.publish(EntityId::CustomMotionSpeed, 0.0f32),
        ]
        .into_iter()
        .flatten()
        .collect();

        (Command::SetUnderlyingOpen(on), changes)
    }

    /// Prepare a module reset: forget product information and redo the power-on checks.
    pub fn reset(&mut self) -> Command {
        if self.mode() == Mode::PowerOn {
            debug!("Radar reset requested during power-on checks");
        } else {
            self.transition(OutputModeInput::Reset);
        }
        if self.product.model.is_none() && self.product.firmware_version.is_none() {
            warn!("Resetting radar before product information was received");
        }
        self.product = ProductInfo::default();
        self.power_on_checks = 0;
        self.queries.clear();
        Command::Reset
    }
}
