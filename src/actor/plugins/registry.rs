//! §4.4 plugin 6/8, §4.6: the client side of the name registry -- registers
//! this actor's main address under a name and/or resolves names into a
//! `link_request`, composing "discover then link" (§4.4 item 6).
//!
//! Distinct from [`crate::registry::RegistryActor`], which is the server
//! side this plugin talks to.

use std::any::TypeId;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::actor::context::ActorContext;
use crate::actor::plugin::{Plugin, PluginId, Reaction};
use crate::error::ExtendedError;
use crate::message::{
    DiscoveryRequest, DiscoveryResponse, Envelope, Handler, LinkRequest, Payload, RegisterName, RegisterNameResponse,
};
use crate::subscription::OwnerTag;

#[derive(Debug, Default)]
pub struct RegistryPlugin {
    needs_init: Cell<bool>,
    register_done: Rc<Cell<bool>>,
    register_failed: Rc<RefCell<Option<ExtendedError>>>,
    discover_remaining: Rc<Cell<usize>>,
    discover_failed: Rc<RefCell<Option<ExtendedError>>>,
}

impl RegistryPlugin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Plugin for RegistryPlugin {
    fn id(&self) -> PluginId {
        PluginId::Registry
    }

    fn reactions(&self) -> Reaction {
        if self.needs_init.get() {
            Reaction::INIT
        } else {
            Reaction::empty()
        }
    }

    fn activate(&mut self, ctx: &mut ActorContext) {
        let registry = ctx.config().registry_address.clone();
        let register_name = ctx.config().register_name.clone();
        let discover_names = ctx.config().discover_names.clone();

        self.register_done.set(register_name.is_none());
        self.discover_remaining.set(0);

        let needs_init = registry.is_some() && (register_name.is_some() || !discover_names.is_empty());
        self.needs_init.set(needs_init);

        let Some(registry) = registry else {
            return;
        };
        let Some(address) = ctx.main_address().cloned() else {
            return;
        };

        let control = ctx.control();
        let actor = ctx.id();

        if let Some(name) = register_name {
            let done = self.register_done.clone();
            let failed = self.register_failed.clone();
            let control = control.clone();
            ctx.subscribe(
                address.clone(),
                Handler::new(
                    ctx.id(),
                    TypeId::of::<RegisterNameResponse>(),
                    RegisterNameResponse::TYPE_NAME,
                    move |envelope| {
                        let Some(response) = envelope.downcast::<RegisterNameResponse>() else {
                            return Ok(());
                        };
                        if let Err(err) = &response.result {
                            *failed.borrow_mut() = Some(err.clone());
                        }
                        done.set(true);
                        control.continue_init(actor);
                        Ok(())
                    },
                ),
                OwnerTag::Plugin,
            );
            ctx.send(
                registry.clone(),
                RegisterName {
                    name,
                    address: address.clone(),
                },
            );
        }

        if !discover_names.is_empty() {
            self.discover_remaining.set(discover_names.len());
            let remaining = self.discover_remaining.clone();
            let failed = self.discover_failed.clone();
            let client = address.clone();
            ctx.subscribe(
                address.clone(),
                Handler::new(
                    ctx.id(),
                    TypeId::of::<DiscoveryResponse>(),
                    DiscoveryResponse::TYPE_NAME,
                    move |envelope| {
                        let Some(response) = envelope.downcast::<DiscoveryResponse>() else {
                            return Ok(());
                        };
                        match &response.result {
                            Ok(server) => {
                                let link = Envelope::new(server.clone(), LinkRequest { client: client.clone() });
                                let _ = server.supervisor_handle().enqueue(link);
                            }
                            Err(err) => {
                                *failed.borrow_mut() = Some(err.clone());
                            }
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
            for name in discover_names {
                ctx.send(registry.clone(), DiscoveryRequest { name, requester: address.clone() });
            }
        }
    }

    fn handle_init(&mut self, ctx: &mut ActorContext) -> bool {
        if let Some(err) = self.register_failed.borrow_mut().take() {
            // Not ready: the queued shutdown takes over before this
            // plugin's init precondition is ever satisfied (§7).
            ctx.fail(err);
            return false;
        }
        if let Some(err) = self.discover_failed.borrow_mut().take() {
            ctx.fail(err);
            return false;
        }
        self.register_done.get() && self.discover_remaining.get() == 0
    }
}
