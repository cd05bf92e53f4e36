//! §4.4 plugin 4/8, §4.7: accepts incoming links, tracks clients, and
//! notifies them when this actor begins shutting down.
//!
//! Every handler this plugin subscribes is fully self-contained: a
//! `link_request`/`unlink_request` already carries the client's own
//! [`Address`], whose `supervisor_handle()` is enough to address the reply
//! directly -- unlike link-client or registry, this plugin never needs to
//! reach back into `ActorContext` from inside a closure.

use std::any::TypeId;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::actor::context::ActorContext;
use crate::actor::plugin::{Plugin, PluginId, Reaction};
use crate::address::Address;
use crate::error::{ErrorCode, ExtendedError};
use crate::message::{Envelope, Handler, LinkRequest, LinkResponse, Payload, UnlinkNotify, UnlinkRequest, UnlinkResponse};
use crate::subscription::OwnerTag;

#[derive(Debug, Default)]
pub struct LinkServerPlugin {
    clients: Rc<RefCell<Vec<Address>>>,
    accepting: Rc<Cell<bool>>,
}

impl LinkServerPlugin {
    pub fn new() -> Self {
        Self {
            clients: Rc::new(RefCell::new(Vec::new())),
            accepting: Rc::new(Cell::new(true)),
        }
    }

    /// Clients currently linked, for tests and introspection.
    pub fn clients(&self) -> Vec<Address> {
        self.clients.borrow().clone()
    }
}

impl Plugin for LinkServerPlugin {
    fn id(&self) -> PluginId {
        PluginId::LinkServer
    }

    fn reactions(&self) -> Reaction {
        // Needs to be polled during shutdown so `handle_shutdown` actually
        // fires `unlink_notify` at every linked client (§4.7, P7) --
        // without the bit it would never run.
        Reaction::SHUTDOWN
    }

    fn activate(&mut self, ctx: &mut ActorContext) {
        let Some(address) = ctx.main_address().cloned() else {
            return;
        };

        let clients = self.clients.clone();
        let accepting = self.accepting.clone();
        ctx.subscribe(
            address.clone(),
            Handler::new(
                ctx.id(),
                TypeId::of::<LinkRequest>(),
                LinkRequest::TYPE_NAME,
                move |envelope| {
                    let Some(request) = envelope.downcast::<LinkRequest>() else {
                        return Ok(());
                    };
                    let response = if accepting.get() {
                        clients.borrow_mut().push(request.client.clone());
                        LinkResponse { result: Ok(()) }
                    } else {
                        LinkResponse {
                            result: Err(ExtendedError::new("server is shutting down", ErrorCode::ActorNotLinkable)),
                        }
                    };
                    let reply = Envelope::new(request.client.clone(), response);
                    let _ = request.client.supervisor_handle().enqueue(reply);
                    Ok(())
                },
            ),
            OwnerTag::Plugin,
        );

        let clients_for_unlink = self.clients.clone();
        ctx.subscribe(
            address,
            Handler::new(
                ctx.id(),
                TypeId::of::<UnlinkRequest>(),
                UnlinkRequest::TYPE_NAME,
                move |envelope| {
                    let Some(request) = envelope.downcast::<UnlinkRequest>() else {
                        return Ok(());
                    };
                    clients_for_unlink.borrow_mut().retain(|client| client != &request.client);
                    let reply = Envelope::new(request.client.clone(), UnlinkResponse { result: Ok(()) });
                    let _ = request.client.supervisor_handle().enqueue(reply);
                    Ok(())
                },
            ),
            OwnerTag::Plugin,
        );
    }

    /// Refuses any further links and fires `unlink_notify` at every
    /// currently-linked client (§4.7 "When server begins shutdown, it sends
    /// `unlink_notify` to each linked client"). This never blocks shutdown:
    /// the notification is fire-and-forget.
    fn handle_shutdown(&mut self, ctx: &mut ActorContext) -> bool {
        if self.accepting.get() {
            self.accepting.set(false);
            if let Some(server) = ctx.main_address().cloned() {
                let reason = ctx.shutdown_reason().cloned();
                for client in self.clients.borrow().iter() {
                    let notify = Envelope::new(
                        client.clone(),
                        UnlinkNotify {
                            server: server.clone(),
                            reason: reason.clone(),
                        },
                    );
                    let _ = client.supervisor_handle().enqueue(notify);
                }
            }
        }
        true
    }
}
