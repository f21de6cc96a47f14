// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! StreamHandler trait implementation to receive radar frames.

use super::Radar;
use crate::protocol::{Frame, ProtocolError, Report};
use actix::{ActorContext, Context, Running, StreamHandler};
use log::{debug, error, info, warn};

impl StreamHandler<Result<Frame, ProtocolError>> for Radar {
    fn handle(&mut self, msg: Result<Frame, ProtocolError>, _ctx: &mut Self::Context) {
        let frame = match msg {
            Ok(frame) => frame,
            Err(e) => {
                error!("[{}] Radar transport error: {e}", self.id);
                return;
            }
        };

        match Report::try_from(&frame) {
            Ok(report) => {
                let changes = self.state.handle_report(report);
                self.publish(changes);
            }
            Err(e) => warn!("[{}] Invalid radar report: {e}", self.id),
        }
    }

    fn started(&mut self, _: &mut Context<Self>) {
        debug!("[{}] Radar StreamHandler connected", self.id);
    }

    fn finished(&mut self, ctx: &mut Context<Self>) {
        info!("[{}] Radar connection closed", self.id);
        ctx.stop()
    }
}

impl actix::io::WriteHandler<ProtocolError> for Radar {
    fn error(&mut self, err: ProtocolError, _ctx: &mut Self::Context) -> Running {
        error!("[{}] Error writing to radar: {err}", self.id);
        Running::Stop
    }
}
