// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Creates the configured optional entities and wires them to their radar.

use crate::configuration::EntitySettings;
use crate::entity::ResetButton;
use crate::errors::ServiceError;
use crate::radar::{Radar, SetResetButton};
use actix::Addr;
use log::info;

/// Create the optional entities of `settings` and attach them to `radar`.
///
/// Every created entity receives a weak back-reference to the radar, so it never keeps a stopped
/// radar alive. Returns the identifiers of the attached entities.
pub async fn bind_entities(
    settings: &EntitySettings,
    radar: &Addr<Radar>,
) -> Result<Vec<String>, ServiceError> {
    let mut bound = Vec::new();

    if let Some(reset) = &settings.reset {
        let button = ResetButton::new(reset.to_info()?, radar.clone().recipient().downgrade());
        let entity_id = button.entity_id().to_string();
        radar.send(SetResetButton(button)).await??;
        info!("Bound reset button '{entity_id}'");
        bound.push(entity_id);
    }

    Ok(bound)
}
