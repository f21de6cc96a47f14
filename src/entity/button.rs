// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Button entities.

use super::EntityInfo;
use crate::radar::ResetDevice;
use actix::WeakRecipient;
use log::{info, warn};

/// Capability of an entity which can be pressed from the host.
pub trait Pressable {
    fn info(&self) -> &EntityInfo;

    /// Trigger the entity action. Returns false if the action couldn't be requested.
    fn press(&self) -> bool;
}

/// Button entity requesting a radar module reset from its parent component.
///
/// The button is owned by its parent and only holds a weak reference back to the parent's
/// mailbox, so it never keeps the parent alive.
pub struct ResetButton {
    info: EntityInfo,
    parent: Option<WeakRecipient<ResetDevice>>,
}

impl ResetButton {
    pub fn new(info: EntityInfo, parent: WeakRecipient<ResetDevice>) -> Self {
        Self {
            info,
            parent: Some(parent),
        }
    }

    /// A button which isn't wired to a parent. Pressing it has no effect.
    pub fn unparented(info: EntityInfo) -> Self {
        Self { info, parent: None }
    }

    pub fn entity_id(&self) -> &str {
        &self.info.entity_id
    }

    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    /// Request exactly one device reset from the parent component.
    ///
    /// A missing or stopped parent turns the press into a no-op.
    pub fn on_press(&self) -> bool {
        let Some(parent) = self
            .parent
            .as_ref()
            .and_then(|p| p.upgrade())
            .filter(|p| p.connected())
        else {
            warn!(
                "[{}] Reset button pressed without running parent component, ignoring",
                self.info.entity_id
            );
            return false;
        };

        info!("[{}] Reset button pressed", self.info.entity_id);
        parent.do_send(ResetDevice {
            entity_id: self.info.entity_id.clone(),
        });
        true
    }
}

impl Pressable for ResetButton {
    fn info(&self) -> &EntityInfo {
        &self.info
    }

    fn press(&self) -> bool {
        self.on_press()
    }
}

impl std::fmt::Debug for ResetButton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetButton")
            .field("info", &self.info)
            .field("parented", &self.parent.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityId;
    use actix::{Actor, ActorContext, Context, Handler, Message};
    use std::time::Duration;
    use tokio::time::sleep;

    #[derive(Default)]
    struct CountingParent {
        resets: Vec<String>,
    }

    impl Actor for CountingParent {
        type Context = Context<Self>;
    }

    impl Handler<ResetDevice> for CountingParent {
        type Result = ();

        fn handle(&mut self, msg: ResetDevice, _: &mut Self::Context) -> Self::Result {
            self.resets.push(msg.entity_id);
        }
    }

    #[derive(Message)]
    #[rtype(result = "Vec<String>")]
    struct GetResets;

    impl Handler<GetResets> for CountingParent {
        type Result = Vec<String>;

        fn handle(&mut self, _: GetResets, _: &mut Self::Context) -> Self::Result {
            self.resets.clone()
        }
    }

    #[derive(Message)]
    #[rtype(result = "()")]
    struct Stop;

    impl Handler<Stop> for CountingParent {
        type Result = ();

        fn handle(&mut self, _: Stop, ctx: &mut Self::Context) -> Self::Result {
            ctx.stop();
        }
    }

    #[actix::test]
    async fn every_press_sends_one_reset_request() {
        let parent = CountingParent::default().start();
        let button = ResetButton::new(
            EntityId::Reset.info(),
            parent.clone().recipient().downgrade(),
        );

        for _ in 0..3 {
            assert!(button.press());
        }

        let resets = parent.send(GetResets).await.unwrap();
        assert_eq!(vec!["reset"; 3], resets);
    }

    #[test]
    fn unparented_press_is_a_noop() {
        let button = ResetButton::unparented(EntityId::Reset.info());

        assert!(!button.has_parent());
        assert!(!button.on_press());
        assert_eq!("reset", button.entity_id());
    }

    #[actix::test]
    async fn press_after_parent_stopped_is_a_noop() {
        let parent = CountingParent::default().start();
        let button = ResetButton::new(
            EntityId::Reset.info(),
            parent.clone().recipient().downgrade(),
        );
        assert!(button.has_parent());

        parent.send(Stop).await.unwrap();
        drop(parent);

        let mut pressed = true;
        for _ in 0..100 {
            pressed = button.press();
            if !pressed {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
        assert!(!pressed, "press of a stopped parent must be ignored");
        assert!(!button.on_press());
    }
}
