// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Actix message handler for host requests and entity wiring.

use super::{
    ConnectionEvent, ConnectionState, EntityEvent, GetEntities, GetEntityStates, PressButton,
    Radar, ResetDevice, SelectOption, SetResetButton, SetSwitch, Subscribe, WatchConnection,
};
use crate::entity::{EntityId, EntityInfo};
use crate::errors::ServiceError;
use crate::protocol::{Command, SceneMode};
use actix::{Handler, MessageResult};
use log::{debug, info, warn};
use std::str::FromStr;

impl Handler<ResetDevice> for Radar {
    type Result = ();

    fn handle(&mut self, msg: ResetDevice, _ctx: &mut Self::Context) -> Self::Result {
        debug!("[{}] Reset requested by {}", self.id, msg.entity_id);
        self.reset_device();
    }
}

impl Handler<SetResetButton> for Radar {
    type Result = Result<(), ServiceError>;

    fn handle(&mut self, msg: SetResetButton, _ctx: &mut Self::Context) -> Self::Result {
        self.set_reset_button(msg.0)
    }
}

impl Handler<PressButton> for Radar {
    type Result = Result<(), ServiceError>;

    fn handle(&mut self, msg: PressButton, _ctx: &mut Self::Context) -> Self::Result {
        let Some(button) = self
            .reset_button()
            .filter(|b| b.info().entity_id == msg.entity_id)
        else {
            return Err(ServiceError::NotFound(msg.entity_id));
        };

        if button.press() {
            Ok(())
        } else {
            Err(ServiceError::InternalServerError(format!(
                "Button '{}' is not connected to the radar",
                msg.entity_id
            )))
        }
    }
}

impl Handler<SetSwitch> for Radar {
    type Result = Result<(), ServiceError>;

    fn handle(&mut self, msg: SetSwitch, _ctx: &mut Self::Context) -> Self::Result {
        match EntityId::from_str(&msg.entity_id) {
            Ok(EntityId::UnderlyingOpenFunction) => {
                info!(
                    "[{}] Setting underlying open function: {}",
                    self.id,
                    if msg.on { "on" } else { "off" }
                );
                let (cmd, changes) = self.state.set_underlying_open(msg.on);
                self.send_command(cmd);
                self.publish(changes);
                Ok(())
            }
            _ => Err(ServiceError::NotFound(msg.entity_id)),
        }
    }
}

impl Handler<SelectOption> for Radar {
    type Result = Result<(), ServiceError>;

    fn handle(&mut self, msg: SelectOption, _ctx: &mut Self::Context) -> Self::Result {
        match EntityId::from_str(&msg.entity_id) {
            Ok(EntityId::SceneMode) => {
                let mode = SceneMode::from_str(&msg.option).inspect_err(|_| {
                    warn!("[{}] Invalid scene mode '{}'", self.id, msg.option)
                })?;
                info!("[{}] Setting scene mode: {mode}", self.id);
                self.send_command(Command::SetSceneMode(mode));
                Ok(())
            }
            _ => Err(ServiceError::NotFound(msg.entity_id)),
        }
    }
}

impl Handler<GetEntityStates> for Radar {
    type Result = MessageResult<GetEntityStates>;

    fn handle(&mut self, _msg: GetEntityStates, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.state.store().snapshot())
    }
}

impl Handler<GetEntities> for Radar {
    type Result = MessageResult<GetEntities>;

    fn handle(&mut self, _msg: GetEntities, _ctx: &mut Self::Context) -> Self::Result {
        let mut entities: Vec<EntityInfo> = EntityId::stateful().map(EntityId::info).collect();
        if let Some(button) = self.reset_button() {
            entities.push(button.info().clone());
        }
        MessageResult(entities)
    }
}

impl Handler<Subscribe> for Radar {
    type Result = ();

    fn handle(&mut self, msg: Subscribe, _ctx: &mut Self::Context) -> Self::Result {
        for entity_change in self.state.store().snapshot() {
            msg.0.do_send(EntityEvent {
                radar_id: self.id.clone(),
                entity_change,
            });
        }
        self.subscribers.push(msg.0);
    }
}

impl Handler<WatchConnection> for Radar {
    type Result = ();

    fn handle(&mut self, msg: WatchConnection, _ctx: &mut Self::Context) -> Self::Result {
        msg.0.do_send(ConnectionEvent {
            radar_id: self.id.clone(),
            state: ConnectionState::Connected,
        });
        self.connection_watchers.push(msg.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::RadarSettings;
    use crate::entity::{EntityChange, EntityState, EntityType, ResetButton};
    use crate::protocol::{Frame, FrameCodec};
    use crate::radar::HEARTBEAT_NORMAL;
    use actix::{Actor, Addr, Context, Message};
    use actix_codec::Framed;
    use futures::{SinkExt, StreamExt};
    use std::time::Duration;
    use tokio::io::{AsyncWriteExt, DuplexStream};
    use tokio::time::{sleep, timeout};

    type Device = Framed<DuplexStream, FrameCodec>;

    fn start_radar() -> (Addr<Radar>, Device) {
        let (radar, device) = start_radar_raw();
        (radar, Framed::new(device, FrameCodec::default()))
    }

    fn start_radar_raw() -> (Addr<Radar>, DuplexStream) {
        let (host, device) = tokio::io::duplex(1024);
        let settings = RadarSettings {
            // no periodic traffic during tests
            update_interval: Duration::from_secs(3600),
            query_spacing: Duration::from_secs(3600),
            ..Default::default()
        };
        let radar = Radar::start("test", Box::new(host), &settings, false);
        (radar, device)
    }

    async fn attach_reset_button(radar: &Addr<Radar>) -> Result<(), ServiceError> {
        let button = ResetButton::new(
            EntityId::Reset.info(),
            radar.clone().recipient().downgrade(),
        );
        radar.send(SetResetButton(button)).await.unwrap()
    }

    async fn next_frame(device: &mut Device) -> Option<Frame> {
        match timeout(Duration::from_millis(500), device.next()).await {
            Ok(Some(Ok(frame))) => Some(frame),
            _ => None,
        }
    }

    #[derive(Default)]
    struct Collector {
        changes: Vec<EntityChange>,
        connection: Vec<ConnectionState>,
    }

    impl Actor for Collector {
        type Context = Context<Self>;
    }

    impl Handler<EntityEvent> for Collector {
        type Result = ();

        fn handle(&mut self, msg: EntityEvent, _: &mut Self::Context) -> Self::Result {
            self.changes.push(msg.entity_change);
        }
    }

    impl Handler<ConnectionEvent> for Collector {
        type Result = ();

        fn handle(&mut self, msg: ConnectionEvent, _: &mut Self::Context) -> Self::Result {
            self.connection.push(msg.state);
        }
    }

    #[derive(Message)]
    #[rtype(result = "(Vec<EntityChange>, Vec<ConnectionState>)")]
    struct Collected;

    impl Handler<Collected> for Collector {
        type Result = MessageResult<Collected>;

        fn handle(&mut self, _: Collected, _: &mut Self::Context) -> Self::Result {
            MessageResult((self.changes.clone(), self.connection.clone()))
        }
    }

    fn button_count(entities: &[EntityInfo]) -> usize {
        entities
            .iter()
            .filter(|e| e.entity_type == EntityType::Button)
            .count()
    }

    type CollectedEvents = (Vec<EntityChange>, Vec<ConnectionState>);

    async fn wait_for<F>(collector: &Addr<Collector>, condition: F) -> CollectedEvents
    where
        F: Fn(&CollectedEvents) -> bool,
    {
        for _ in 0..100 {
            let collected = collector.send(Collected).await.unwrap();
            if condition(&collected) {
                return collected;
            }
            sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not met in time");
    }

    #[actix::test]
    async fn each_press_sends_exactly_one_reset_frame() {
        let (radar, mut device) = start_radar();
        attach_reset_button(&radar).await.unwrap();

        for _ in 0..3 {
            let result = radar.send(PressButton::new("reset".into())).await.unwrap();
            assert_eq!(Ok(()), result);
        }

        for _ in 0..3 {
            assert_eq!(Some(Command::Reset.to_frame()), next_frame(&mut device).await);
        }
        assert_eq!(None, next_frame(&mut device).await, "no extra reset frames");
    }

    #[actix::test]
    async fn press_without_reset_button_is_not_found() {
        let (radar, _device) = start_radar();

        let result = radar.send(PressButton::new("reset".into())).await.unwrap();

        assert_eq!(Err(ServiceError::NotFound("reset".into())), result);
    }

    #[actix::test]
    async fn press_of_unknown_button_is_not_found() {
        let (radar, _device) = start_radar();
        attach_reset_button(&radar).await.unwrap();

        let result = radar.send(PressButton::new("restart".into())).await.unwrap();

        assert_eq!(Err(ServiceError::NotFound("restart".into())), result);
    }

    #[actix::test]
    async fn only_one_reset_button_can_be_attached() {
        let (radar, _device) = start_radar();

        assert_eq!(Ok(()), attach_reset_button(&radar).await);
        assert!(matches!(
            attach_reset_button(&radar).await,
            Err(ServiceError::AlreadyExists(_))
        ));

        let entities = radar.send(GetEntities).await.unwrap();
        assert_eq!(1, button_count(&entities));
    }

    #[actix::test]
    async fn unparented_button_press_fails() {
        let (radar, mut device) = start_radar();
        let button = ResetButton::unparented(EntityId::Reset.info());
        radar.send(SetResetButton(button)).await.unwrap().unwrap();

        let result = radar.send(PressButton::new("reset".into())).await.unwrap();

        assert!(matches!(result, Err(ServiceError::InternalServerError(_))));
        assert_eq!(None, next_frame(&mut device).await);
    }

    #[actix::test]
    async fn reports_are_published_to_subscribers() {
        let (radar, mut device) = start_radar();
        let collector = Collector::default().start();
        radar.send(Subscribe(collector.clone().recipient())).await.unwrap();

        device
            .send(Frame::new(0x80, 0x01, vec![0x01]))
            .await
            .unwrap();

        let (changes, _) = wait_for(&collector, |(changes, _)| !changes.is_empty()).await;
        assert_eq!(
            EntityChange {
                entity_type: EntityType::BinarySensor,
                entity_id: "someone_exists".into(),
                state: EntityState::Bool(true),
            },
            changes[0]
        );

        let states = radar.send(GetEntityStates).await.unwrap();
        assert_eq!(1, states.len());
    }

    #[actix::test]
    async fn corrupt_frames_are_skipped() {
        let (radar, mut device) = start_radar_raw();
        let collector = Collector::default().start();
        radar.send(Subscribe(collector.clone().recipient())).await.unwrap();

        let mut corrupt = Frame::new(0x80, 0x01, vec![0x01]).to_bytes().to_vec();
        // checksum
        corrupt[7] ^= 0xFF;
        device.write_all(&corrupt).await.unwrap();
        device.write_all(&Frame::new(0x80, 0x82, vec![0x02]).to_bytes()).await.unwrap();

        let (changes, _) = wait_for(&collector, |(changes, _)| !changes.is_empty()).await;
        assert_eq!(1, changes.len());
        assert_eq!("motion_status", changes[0].entity_id);
    }

    #[actix::test]
    async fn switch_sends_command_and_clears_values() {
        let (radar, mut device) = start_radar();

        let result = radar
            .send(SetSwitch::new("underlying_open_function".into(), true))
            .await
            .unwrap();

        assert_eq!(Ok(()), result);
        assert_eq!(
            Some(Command::SetUnderlyingOpen(true).to_frame()),
            next_frame(&mut device).await
        );
        let states = radar.send(GetEntityStates).await.unwrap();
        assert!(
            states
                .iter()
                .any(|c| c.entity_id == "custom_motion_speed" && c.state == EntityState::Number(0.0))
        );
    }

    #[actix::test]
    async fn select_scene_mode() {
        let (radar, mut device) = start_radar();

        let result = radar
            .send(SelectOption::new("scene_mode".into(), "Bedroom".into()))
            .await
            .unwrap();
        assert_eq!(Ok(()), result);
        assert_eq!(
            Some(Command::SetSceneMode(SceneMode::Bedroom).to_frame()),
            next_frame(&mut device).await
        );

        let result = radar
            .send(SelectOption::new("scene_mode".into(), "Kitchen".into()))
            .await
            .unwrap();
        assert!(matches!(result, Err(ServiceError::BadRequest(_))));
    }

    #[actix::test]
    async fn closed_transport_notifies_watchers() {
        let (radar, device) = start_radar();
        let collector = Collector::default().start();
        radar
            .send(WatchConnection(collector.clone().recipient()))
            .await
            .unwrap();

        drop(device);

        let (_, connection) = wait_for(&collector, |(_, c)| c.len() == 2).await;
        assert_eq!(
            vec![ConnectionState::Connected, ConnectionState::Closed],
            connection
        );
    }

    #[actix::test]
    async fn heartbeat_stays_normal_when_cycles_are_cut_short() {
        let (host, device) = tokio::io::duplex(1024);
        // seven standard queries need 420 ms, the cycle only lasts 200 ms
        let settings = RadarSettings {
            update_interval: Duration::from_millis(200),
            query_spacing: Duration::from_millis(60),
            ..Default::default()
        };
        let radar = Radar::start("slow", Box::new(host), &settings, false);
        let mut device: Device = Framed::new(device, FrameCodec::default());

        let mock_radar = async {
            while let Some(Ok(frame)) = device.next().await {
                let reply = match (frame.control, frame.command) {
                    (0x01, 0x01) => Frame::new(0x01, 0x01, vec![0x0F]),
                    (0x08, 0x80) => Frame::new(0x08, 0x80, vec![0x00]),
                    _ => continue,
                };
                if device.send(reply).await.is_err() {
                    break;
                }
            }
        };
        let _ = timeout(Duration::from_millis(1100), mock_radar).await;

        let states = radar.send(GetEntityStates).await.unwrap();
        let heartbeat = states.iter().find(|c| c.entity_id == "heartbeat");
        assert_eq!(
            Some(&EntityState::Text(HEARTBEAT_NORMAL.into())),
            heartbeat.map(|c| &c.state)
        );
    }
}
