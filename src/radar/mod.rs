// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! MR24HPC1 radar component implemented as an Actix actor.
//!
//! The actor owns the framed radar transport, the device state and all entities, including the
//! optional reset button. Serial frames, timers and host requests are mailbox messages and are
//! handled one at a time.

mod handler;
mod messages;
mod state;
mod streamhandler;

pub use messages::*;
pub use state::{
    HEARTBEAT_ABNORMAL, HEARTBEAT_NORMAL, MAX_CYCLE_QUERIES, Mode, POWER_ON_CHECKS, RadarState,
};

use crate::configuration::RadarSettings;
use crate::entity::{EntityChange, Pressable, ResetButton};
use crate::errors::ServiceError;
use crate::protocol::{Command, Frame, FrameCodec};
use crate::transport::BoxedTransport;
use actix::io::SinkWrite;
use actix::prelude::{Actor, AsyncContext, Context, Recipient};
use actix_codec::Framed;
use futures::StreamExt;
use futures::stream::SplitSink;
use log::{debug, error, info, warn};
use std::time::Duration;

type FrameSink = SplitSink<Framed<BoxedTransport, FrameCodec>, Frame>;

pub struct Radar {
    /// Radar identifier used in log messages and events
    id: String,
    sink: SinkWrite<Frame, FrameSink>,
    state: RadarState,
    reset_button: Option<ResetButton>,
    subscribers: Vec<Recipient<EntityEvent>>,
    connection_watchers: Vec<Recipient<ConnectionEvent>>,
    update_interval: Duration,
    query_spacing: Duration,
}

impl Radar {
    /// Start the radar actor on the given transport.
    ///
    /// Must be called from within a running actix system.
    pub fn start(
        id: impl Into<String>,
        transport: BoxedTransport,
        settings: &RadarSettings,
        frame_tracing: bool,
    ) -> actix::Addr<Self> {
        let id = id.into();
        let update_interval = settings.update_interval;
        let query_spacing = settings.query_spacing;
        Radar::create(move |ctx| {
            let (sink, stream) =
                Framed::new(transport, FrameCodec::with_tracing(frame_tracing)).split();
            ctx.add_stream(stream);
            Radar {
                id,
                sink: SinkWrite::new(sink, ctx),
                state: RadarState::default(),
                reset_button: None,
                subscribers: Vec::new(),
                connection_watchers: Vec::new(),
                update_interval,
                query_spacing,
            }
        })
    }

    /// Attach the reset button. The radar owns the button from now on.
    ///
    /// At most one reset button can be attached.
    pub fn set_reset_button(&mut self, button: ResetButton) -> Result<(), ServiceError> {
        if let Some(existing) = &self.reset_button {
            return Err(ServiceError::AlreadyExists(format!(
                "reset button '{}'",
                existing.entity_id()
            )));
        }
        if !button.has_parent() {
            warn!(
                "[{}] Attaching reset button '{}' without parent reference",
                self.id,
                button.entity_id()
            );
        }
        info!("[{}] Reset button '{}' attached", self.id, button.entity_id());
        self.reset_button = Some(button);
        Ok(())
    }

    pub fn reset_button(&self) -> Option<&dyn Pressable> {
        self.reset_button.as_ref().map(|b| b as &dyn Pressable)
    }

    fn send_command(&mut self, cmd: Command) {
        debug!("[{}] Sending {cmd:?}", self.id);
        if self.sink.write(cmd.into()).is_err() {
            error!("[{}] Radar connection closed, can't send {cmd:?}", self.id);
        }
    }

    fn publish(&self, changes: Vec<EntityChange>) {
        for entity_change in changes {
            debug!(
                "[{}] {} = {:?}",
                self.id, entity_change.entity_id, entity_change.state
            );
            for subscriber in &self.subscribers {
                subscriber.do_send(EntityEvent {
                    radar_id: self.id.clone(),
                    entity_change: entity_change.clone(),
                });
            }
        }
    }

    fn update(&mut self) {
        let changes = self.state.update();
        self.publish(changes);
    }

    fn reset_device(&mut self) {
        let cmd = self.state.reset();
        info!("[{}] Resetting radar module", self.id);
        self.send_command(cmd);
    }

    fn notify_connection(&self, state: ConnectionState) {
        for watcher in &self.connection_watchers {
            watcher.do_send(ConnectionEvent {
                radar_id: self.id.clone(),
                state,
            });
        }
    }
}

impl Actor for Radar {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(
            "[{}] Radar started: update interval {:?}, query spacing {:?}",
            self.id, self.update_interval, self.query_spacing
        );
        self.update();
        ctx.run_interval(self.update_interval, |act, _ctx| act.update());
        ctx.run_interval(self.query_spacing, |act, _ctx| {
            if let Some(cmd) = act.state.next_query() {
                act.send_command(cmd);
            }
        });
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        info!("[{}] Radar stopped", self.id);
        self.notify_connection(ConnectionState::Closed);
    }
}
