// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Line based host console: entity state output as JSON lines and text commands from stdin.

use crate::entity::EntityChange;
use crate::errors::ServiceError;
use crate::radar::{
    ConnectionEvent, ConnectionState, EntityEvent, GetEntities, GetEntityStates, PressButton,
    Radar, SelectOption, SetSwitch,
};
use actix::{Actor, Addr, Context, Handler};
use log::{debug, error, info};
use std::str::FromStr;
use tokio::sync::oneshot;

pub const HELP: &str = "\
Commands:
  press <entity_id>              press a button
  switch <entity_id> on|off      turn a switch on or off
  select <entity_id> <option>    choose a select option
  states                         print all entity states
  entities                       print all entities
  help                           print this help";

#[derive(Debug, PartialEq)]
pub enum HostCommand {
    Press(String),
    Switch { entity_id: String, on: bool },
    Select { entity_id: String, option: String },
    States,
    Entities,
    Help,
}

impl FromStr for HostCommand {
    type Err = ServiceError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (cmd, args) = split_word(line);

        match cmd.to_ascii_lowercase().as_str() {
            "press" => {
                let (entity_id, rest) = split_word(args);
                if entity_id.is_empty() || !rest.is_empty() {
                    return Err(usage("press <entity_id>"));
                }
                Ok(HostCommand::Press(entity_id.into()))
            }
            "switch" => {
                let (entity_id, value) = split_word(args);
                let on = match value.to_ascii_lowercase().as_str() {
                    "on" | "true" | "1" => true,
                    "off" | "false" | "0" => false,
                    _ => return Err(usage("switch <entity_id> on|off")),
                };
                Ok(HostCommand::Switch {
                    entity_id: entity_id.into(),
                    on,
                })
            }
            "select" => {
                let (entity_id, option) = split_word(args);
                if option.is_empty() {
                    return Err(usage("select <entity_id> <option>"));
                }
                Ok(HostCommand::Select {
                    entity_id: entity_id.into(),
                    option: option.into(),
                })
            }
            "states" => Ok(HostCommand::States),
            "entities" => Ok(HostCommand::Entities),
            "help" | "?" => Ok(HostCommand::Help),
            _ => Err(ServiceError::BadRequest(format!(
                "Unknown command '{cmd}'. Enter 'help' for a list of commands"
            ))),
        }
    }
}

/// Split off the first word. The remainder is trimmed.
fn split_word(text: &str) -> (&str, &str) {
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (text, ""),
    }
}

fn usage(text: &str) -> ServiceError {
    ServiceError::BadRequest(format!("Usage: {text}"))
}

/// Execute a host command on the radar and return the output lines.
pub async fn execute(cmd: HostCommand, radar: &Addr<Radar>) -> Result<Vec<String>, ServiceError> {
    debug!("Executing {cmd:?}");
    match cmd {
        HostCommand::Press(entity_id) => {
            radar.send(PressButton::new(entity_id.clone())).await??;
            Ok(vec![format!("Pressed {entity_id}")])
        }
        HostCommand::Switch { entity_id, on } => {
            radar.send(SetSwitch::new(entity_id, on)).await??;
            Ok(Vec::new())
        }
        HostCommand::Select { entity_id, option } => {
            radar.send(SelectOption::new(entity_id, option)).await??;
            Ok(Vec::new())
        }
        HostCommand::States => radar
            .send(GetEntityStates)
            .await?
            .iter()
            .map(json_line)
            .collect(),
        HostCommand::Entities => radar
            .send(GetEntities)
            .await?
            .iter()
            .map(|info| Ok(serde_json::to_string(info)?))
            .collect(),
        HostCommand::Help => Ok(HELP.lines().map(str::to_string).collect()),
    }
}

pub fn json_line(change: &EntityChange) -> Result<String, ServiceError> {
    Ok(serde_json::to_string(change)?)
}

/// Prints entity state changes to stdout and signals a closed radar connection.
pub struct ConsoleSink {
    closed: Option<oneshot::Sender<()>>,
}

impl ConsoleSink {
    pub fn new(closed: oneshot::Sender<()>) -> Self {
        Self {
            closed: Some(closed),
        }
    }
}

impl Actor for ConsoleSink {
    type Context = Context<Self>;
}

impl Handler<EntityEvent> for ConsoleSink {
    type Result = ();

    fn handle(&mut self, msg: EntityEvent, _ctx: &mut Self::Context) -> Self::Result {
        match json_line(&msg.entity_change) {
            Ok(line) => println!("{line}"),
            Err(e) => error!("[{}] Can't print entity change: {e}", msg.radar_id),
        }
    }
}

impl Handler<ConnectionEvent> for ConsoleSink {
    type Result = ();

    fn handle(&mut self, msg: ConnectionEvent, _ctx: &mut Self::Context) -> Self::Result {
        info!("[{}] Radar connection {:?}", msg.radar_id, msg.state);
        if msg.state == ConnectionState::Closed
            && let Some(closed) = self.closed.take()
        {
            let _ = closed.send(());
        }
    }
}
