//! The server side of the name registry (§4.6, C10), grounded on the
//! original's `registry_t` (`registry.h`): a plain actor, built out of the
//! same 8-plugin pipeline as everything else, that answers
//! [`RegisterName`]/[`DeregisterRequest`]/[`DiscoveryRequest`] and resolves
//! outstanding [`DiscoveryPromise`]s as names are registered.
//!
//! Distinct from [`crate::actor::plugins::RegistryPlugin`], which is the
//! client side every actor installs when it wants to register or discover a
//! name.

use std::any::TypeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::actor::{ActorConfig, ActorContext};
use crate::address::{Address, AddressId};
use crate::error::{ErrorCode, ExtendedError};
use crate::message::{
    DeregisterRequest, DeregisterTarget, DiscoveryCancel, DiscoveryFuture, DiscoveryPromise, DiscoveryRequest,
    DiscoveryResponse, Envelope, Handler, Payload, RegisterName, RegisterNameResponse,
};
use crate::subscription::OwnerTag;
use crate::supervisor::Supervisor;
use crate::util::ActorId;

/// `registered_map_t`/`revese_map_t`/`promises_map_t` from the original,
/// collapsed into three plain maps behind one shared `Rc<RefCell<_>>` since
/// every handler below runs on the registry's own locality and never
/// crosses a thread boundary.
#[derive(Debug, Default)]
struct RegistryState {
    /// name -> the address registered under it.
    registered: HashMap<String, Address>,
    /// address -> every name it is currently registered under, so
    /// deregistering-by-address (e.g. when the owner shuts down) is O(names
    /// for that address) rather than a full scan.
    reverse: HashMap<AddressId, Vec<String>>,
    /// names with no registration yet, and who is waiting for one (§4.6
    /// race note: "a discovery_promise registered before the name exists is
    /// not an error; it is fulfilled the moment a matching register_name
    /// arrives").
    promises: HashMap<String, Vec<Address>>,
}

impl RegistryState {
    fn register(&mut self, name: String, address: Address) -> Result<Vec<Address>, ExtendedError> {
        if self.registered.contains_key(&name) {
            return Err(ExtendedError::new(
                format!("name {name:?} is already registered"),
                ErrorCode::AlreadyRegistered,
            ));
        }
        self.registered.insert(name.clone(), address.clone());
        self.reverse.entry(address.id()).or_default().push(name.clone());
        Ok(self.promises.remove(&name).unwrap_or_default())
    }

    fn deregister(&mut self, target: &DeregisterTarget) {
        match target {
            DeregisterTarget::Name(name) => {
                if let Some(address) = self.registered.remove(name) {
                    if let Some(names) = self.reverse.get_mut(&address.id()) {
                        names.retain(|n| n != name);
                    }
                }
            }
            DeregisterTarget::Address(address) => {
                if let Some(names) = self.reverse.remove(&address.id()) {
                    for name in names {
                        self.registered.remove(&name);
                    }
                }
            }
        }
    }

    fn discover(&self, name: &str) -> Result<Address, ExtendedError> {
        self.registered
            .get(name)
            .cloned()
            .ok_or_else(|| ExtendedError::new(format!("no registration for {name:?}"), ErrorCode::UnknownService))
    }

    fn promise(&mut self, name: String, waiter: Address) {
        self.promises.entry(name).or_default().push(waiter);
    }

    fn cancel_promise(&mut self, name: &str, waiter: &Address) {
        if let Some(waiters) = self.promises.get_mut(name) {
            waiters.retain(|w| w != waiter);
            if waiters.is_empty() {
                self.promises.remove(name);
            }
        }
    }
}

/// Builder for the registry actor's activation hook; `spawn` is the normal
/// entry point and wires up all five operations in one call.
pub struct RegistryActor;

impl RegistryActor {
    /// Spawn a registry child on `supervisor` with the default pipeline and
    /// `config` (typically [`ActorConfig::default`] -- a registry has no
    /// link targets or resource tokens of its own).
    pub fn spawn(supervisor: &mut Supervisor, config: ActorConfig) -> ActorId {
        supervisor.spawn_with_hook(config, Self::install)
    }

    fn install(ctx: &mut ActorContext<'_>) {
        let Some(address) = ctx.main_address().cloned() else {
            return;
        };
        let state = Rc::new(RefCell::new(RegistryState::default()));

        // on_reg (§4.6): the registering address doubles as its own reply
        // target, the same convention `RegistryPlugin` already assumes.
        {
            let state = state.clone();
            ctx.subscribe(
                address.clone(),
                Handler::new(ctx.id(), TypeId::of::<RegisterName>(), RegisterName::TYPE_NAME, move |envelope| {
                    let Some(request) = envelope.downcast::<RegisterName>() else {
                        return Ok(());
                    };
                    let outcome = state.borrow_mut().register(request.name.clone(), request.address.clone());
                    let result = match outcome {
                        Ok(waiters) => {
                            for waiter in waiters {
                                let future = Envelope::new(
                                    waiter.clone(),
                                    DiscoveryFuture {
                                        name: request.name.clone(),
                                        address: request.address.clone(),
                                    },
                                );
                                let _ = waiter.deliver(future);
                            }
                            Ok(())
                        }
                        Err(err) => Err(err),
                    };
                    let response = Envelope::new(request.address.clone(), RegisterNameResponse { result });
                    let _ = request.address.deliver(response);
                    Ok(())
                }),
                OwnerTag::Plugin,
            );
        }

        // on_dereg / on_dereg_service (§4.6): fire-and-forget, no response
        // type is defined for it in the original either.
        {
            let state = state.clone();
            ctx.subscribe(
                address.clone(),
                Handler::new(
                    ctx.id(),
                    TypeId::of::<DeregisterRequest>(),
                    DeregisterRequest::TYPE_NAME,
                    move |envelope| {
                        let Some(request) = envelope.downcast::<DeregisterRequest>() else {
                            return Ok(());
                        };
                        state.borrow_mut().deregister(&request.target);
                        Ok(())
                    },
                ),
                OwnerTag::Plugin,
            );
        }

        // on_discovery (§4.6): reply carries the requester's own address,
        // not the registry's, since `DiscoveryRequest` stamps it directly.
        {
            let state = state.clone();
            ctx.subscribe(
                address.clone(),
                Handler::new(
                    ctx.id(),
                    TypeId::of::<DiscoveryRequest>(),
                    DiscoveryRequest::TYPE_NAME,
                    move |envelope| {
                        let Some(request) = envelope.downcast::<DiscoveryRequest>() else {
                            return Ok(());
                        };
                        let result = state.borrow().discover(&request.name);
                        let response = Envelope::new(request.requester.clone(), DiscoveryResponse { result });
                        let _ = request.requester.deliver(response);
                        Ok(())
                    },
                ),
                OwnerTag::Plugin,
            );
        }

        // on_promise (§4.6 race note): register interest, to be fulfilled
        // the moment a matching `register_name` arrives.
        {
            let state = state.clone();
            ctx.subscribe(
                address.clone(),
                Handler::new(
                    ctx.id(),
                    TypeId::of::<DiscoveryPromise>(),
                    DiscoveryPromise::TYPE_NAME,
                    move |envelope| {
                        let Some(request) = envelope.downcast::<DiscoveryPromise>() else {
                            return Ok(());
                        };
                        let mut state = state.borrow_mut();
                        match state.discover(&request.name) {
                            Ok(resolved) => {
                                let future = Envelope::new(
                                    request.waiter.clone(),
                                    DiscoveryFuture {
                                        name: request.name.clone(),
                                        address: resolved,
                                    },
                                );
                                let _ = request.waiter.deliver(future);
                            }
                            Err(_) => state.promise(request.name.clone(), request.waiter.clone()),
                        }
                        Ok(())
                    },
                ),
                OwnerTag::Plugin,
            );
        }

        // on_cancel: withdraw a still-pending promise.
        {
            let state = state.clone();
            ctx.subscribe(
                address,
                Handler::new(
                    ctx.id(),
                    TypeId::of::<DiscoveryCancel>(),
                    DiscoveryCancel::TYPE_NAME,
                    move |envelope| {
                        let Some(request) = envelope.downcast::<DiscoveryCancel>() else {
                            return Ok(());
                        };
                        state.borrow_mut().cancel_promise(&request.name, &request.waiter);
                        Ok(())
                    },
                ),
                OwnerTag::Plugin,
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::supervisor::SupervisorConfig;

    #[test]
    fn register_then_discover_round_trips_through_queue() {
        let mut supervisor = Supervisor::new(SupervisorConfig::default());
        let registry = RegistryActor::spawn(&mut supervisor, ActorConfig::default());
        supervisor.run_until_idle();
        let registry_address = supervisor.main_address_of(registry).unwrap();

        let got = Rc::new(RefCell::new(None));
        let got_for_hook = got.clone();
        let registry_for_hook = registry_address.clone();
        let requester = supervisor.spawn_with_hook(ActorConfig::default(), move |ctx| {
            let Some(own) = ctx.main_address().cloned() else { return };
            ctx.subscribe(
                own.clone(),
                Handler::new(
                    ctx.id(),
                    TypeId::of::<RegisterNameResponse>(),
                    RegisterNameResponse::TYPE_NAME,
                    {
                        let got = got_for_hook.clone();
                        move |envelope| {
                            if let Some(response) = envelope.downcast::<RegisterNameResponse>() {
                                *got.borrow_mut() = Some(response.result.clone());
                            }
                            Ok(())
                        }
                    },
                ),
                OwnerTag::Plugin,
            );
            ctx.send(
                registry_for_hook.clone(),
                RegisterName {
                    name: "svc".to_string(),
                    address: own,
                },
            );
        });
        supervisor.run_until_idle();

        assert_eq!(supervisor.state_of(requester), Some(crate::actor::ActorState::Operational));
        assert!(matches!(got.borrow().as_ref(), Some(Ok(()))));
    }
}
