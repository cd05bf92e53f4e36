//! §4.4 plugin 5/8, §4.7: issues link requests to configured servers during
//! init and reacts to `unlink_notify` by shutting its own actor down.
//!
//! Outgoing sends happen from [`Plugin::activate`], which has full
//! [`ActorContext`] access; the asynchronous replies are handled by plain
//! [`Handler`] closures that only stash results into shared cells and push a
//! [`crate::actor::control::ControlMessage`] so the owning supervisor
//! re-polls this actor's init pipeline (§4.4 `init_continue`).

use std::any::TypeId;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::actor::context::ActorContext;
use crate::actor::plugin::{Plugin, PluginId, Reaction};
use crate::error::ExtendedError;
use crate::message::{Handler, LinkRequest, LinkResponse, Payload, UnlinkNotify};
use crate::subscription::OwnerTag;

#[derive(Debug, Default)]
pub struct LinkClientPlugin {
    needs_init: Cell<bool>,
    remaining: Rc<Cell<usize>>,
    failure: Rc<RefCell<Option<ExtendedError>>>,
}

impl LinkClientPlugin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Plugin for LinkClientPlugin {
    fn id(&self) -> PluginId {
        PluginId::LinkClient
    }

    fn reactions(&self) -> Reaction {
        if self.needs_init.get() {
            Reaction::INIT
        } else {
            Reaction::empty()
        }
    }

    fn activate(&mut self, ctx: &mut ActorContext) {
        let targets = ctx.config().link_targets.clone();
        self.needs_init.set(!targets.is_empty());
        self.remaining.set(targets.len());
        if targets.is_empty() {
            return;
        }

        let Some(address) = ctx.main_address().cloned() else {
            return;
        };

        let remaining = self.remaining.clone();
        let failure = self.failure.clone();
        let control = ctx.control();
        let actor = ctx.id();
        ctx.subscribe(
            address.clone(),
            Handler::new(
                ctx.id(),
                TypeId::of::<LinkResponse>(),
                LinkResponse::TYPE_NAME,
                move |envelope| {
                    let Some(response) = envelope.downcast::<LinkResponse>() else {
                        return Ok(());
                    };
                    if let Err(err) = &response.result {
                        *failure.borrow_mut() = Some(err.clone());
                    }
                    let prev = remaining.get();
                    if prev > 0 {
                        remaining.set(prev - 1);
                    }
                    control.continue_init(actor);
                    Ok(())
                },
            ),
            OwnerTag::Plugin,
        );

        let control_for_unlink = ctx.control();
        let actor_for_unlink = ctx.id();
        ctx.subscribe(
            address.clone(),
            Handler::new(
                ctx.id(),
                TypeId::of::<UnlinkNotify>(),
                UnlinkNotify::TYPE_NAME,
                move |envelope| {
                    let Some(notify) = envelope.downcast::<UnlinkNotify>() else {
                        return Ok(());
                    };
                    // §4.7 default `on_unlink` action: begin shutting this
                    // actor down, propagating the server's failure if any.
                    control_for_unlink.begin_shutdown(actor_for_unlink, notify.reason.clone());
                    Ok(())
                },
            ),
            OwnerTag::Plugin,
        );

        for target in &targets {
            ctx.send(target.clone(), LinkRequest { client: address.clone() });
        }
    }

    fn handle_init(&mut self, ctx: &mut ActorContext) -> bool {
        if let Some(err) = self.failure.borrow_mut().take() {
            // Not ready: the queued shutdown takes over before this
            // plugin's init precondition is ever satisfied (§7).
            ctx.fail(err);
            return false;
        }
        self.remaining.get() == 0
    }
}
