//! End-to-end scenario: discovery racing registration, plus the plain
//! register/discover/deregister round trip (R1).

#![allow(clippy::unwrap_used)]

use std::any::TypeId;
use std::cell::RefCell;
use std::rc::Rc;

use locality_rt::actor::ActorConfig;
use locality_rt::error::ErrorCode;
use locality_rt::message::{
    DeregisterRequest, DeregisterTarget, DiscoveryRequest, DiscoveryResponse, Handler, Payload, RegisterName,
    RegisterNameResponse,
};
use locality_rt::registry::RegistryActor;
use locality_rt::subscription::OwnerTag;
use locality_rt::supervisor::{Supervisor, SupervisorConfig};

fn discovery_listener(supervisor: &mut Supervisor, results: Rc<RefCell<Vec<Result<(), ErrorCode>>>>) -> locality_rt::address::Address {
    let id = supervisor.spawn_with_hook(ActorConfig::default(), move |ctx| {
        let Some(own) = ctx.main_address().cloned() else { return };
        ctx.subscribe(
            own,
            Handler::new(ctx.id(), TypeId::of::<DiscoveryResponse>(), DiscoveryResponse::TYPE_NAME, move |envelope| {
                if let Some(response) = envelope.downcast::<DiscoveryResponse>() {
                    results.borrow_mut().push(response.result.as_ref().map(|_| ()).map_err(|e| e.code()));
                }
                Ok(())
            }),
            OwnerTag::Plugin,
        );
    });
    supervisor.run_until_idle();
    supervisor.main_address_of(id).unwrap()
}

/// A `discovery_request` arriving before the matching `register_name` is a
/// legal outcome that resolves to `unknown_service`, not an error in the
/// registry itself (§4.6 race note).
#[test]
fn discovery_before_registration_resolves_to_unknown_service() {
    let mut supervisor = Supervisor::new(SupervisorConfig::default());
    let registry = RegistryActor::spawn(&mut supervisor, ActorConfig::default());
    supervisor.run_until_idle();
    let registry_address = supervisor.main_address_of(registry).unwrap();

    let results = Rc::new(RefCell::new(Vec::new()));
    let requester = discovery_listener(&mut supervisor, results.clone());

    // Ask before anyone has registered "svc".
    let registry_for_send = registry_address.clone();
    let requester_for_send = requester.clone();
    supervisor.spawn_with_hook(ActorConfig::default(), move |ctx| {
        ctx.send(
            registry_for_send,
            DiscoveryRequest { name: "svc".to_string(), requester: requester_for_send },
        );
    });
    supervisor.run_until_idle();

    assert_eq!(results.borrow().as_slice(), [Err(ErrorCode::UnknownService)]);
}

/// When `register_name` lands first, a subsequent `discovery_request`
/// resolves successfully.
#[test]
fn discovery_after_registration_resolves_successfully() {
    let mut supervisor = Supervisor::new(SupervisorConfig::default());
    let registry = RegistryActor::spawn(&mut supervisor, ActorConfig::default());
    supervisor.run_until_idle();
    let registry_address = supervisor.main_address_of(registry).unwrap();

    let results = Rc::new(RefCell::new(Vec::new()));
    let requester = discovery_listener(&mut supervisor, results.clone());

    let registry_for_register = registry_address.clone();
    let service_address_cell: Rc<RefCell<Option<locality_rt::address::Address>>> = Rc::new(RefCell::new(None));
    let service_address_for_hook = service_address_cell.clone();
    supervisor.spawn_with_hook(ActorConfig::default(), move |ctx| {
        let Some(own) = ctx.main_address().cloned() else { return };
        *service_address_for_hook.borrow_mut() = Some(own.clone());
        ctx.send(registry_for_register, RegisterName { name: "svc".to_string(), address: own });
    });
    supervisor.run_until_idle();

    let registry_for_discover = registry_address.clone();
    supervisor.spawn_with_hook(ActorConfig::default(), move |ctx| {
        ctx.send(registry_for_discover, DiscoveryRequest { name: "svc".to_string(), requester });
    });
    supervisor.run_until_idle();

    assert_eq!(results.borrow().as_slice(), [Ok(())]);
}

/// register -> discover (ok) -> deregister -> discover (unknown_service),
/// the full round trip R1 exercises.
#[test]
fn register_discover_deregister_discover_round_trips() {
    let mut supervisor = Supervisor::new(SupervisorConfig::default());
    let registry = RegistryActor::spawn(&mut supervisor, ActorConfig::default());
    supervisor.run_until_idle();
    let registry_address = supervisor.main_address_of(registry).unwrap();

    let results = Rc::new(RefCell::new(Vec::new()));
    let requester = discovery_listener(&mut supervisor, results.clone());

    let reg_addr1 = registry_address.clone();
    supervisor.spawn_with_hook(ActorConfig::default(), move |ctx| {
        let Some(own) = ctx.main_address().cloned() else { return };
        ctx.send(reg_addr1, RegisterName { name: "svc".to_string(), address: own });
    });
    supervisor.run_until_idle();

    let reg_addr2 = registry_address.clone();
    let requester_2 = requester.clone();
    supervisor.spawn_with_hook(ActorConfig::default(), move |ctx| {
        ctx.send(reg_addr2, DiscoveryRequest { name: "svc".to_string(), requester: requester_2 });
    });
    supervisor.run_until_idle();

    let reg_addr3 = registry_address.clone();
    supervisor.spawn_with_hook(ActorConfig::default(), move |ctx| {
        ctx.send(reg_addr3, DeregisterRequest { target: DeregisterTarget::Name("svc".to_string()) });
    });
    supervisor.run_until_idle();

    let reg_addr4 = registry_address.clone();
    supervisor.spawn_with_hook(ActorConfig::default(), move |ctx| {
        ctx.send(reg_addr4, DiscoveryRequest { name: "svc".to_string(), requester });
    });
    supervisor.run_until_idle();

    assert_eq!(results.borrow().as_slice(), [Ok(()), Err(ErrorCode::UnknownService)]);
}

/// Registering the same name twice is rejected (`already_registered`)
/// without disturbing the first registration.
#[test]
fn duplicate_registration_is_rejected() {
    let mut supervisor = Supervisor::new(SupervisorConfig::default());
    let registry = RegistryActor::spawn(&mut supervisor, ActorConfig::default());
    supervisor.run_until_idle();
    let registry_address = supervisor.main_address_of(registry).unwrap();

    let outcomes = Rc::new(RefCell::new(Vec::new()));

    for _ in 0..2 {
        let registry_for_send = registry_address.clone();
        let outcomes_for_hook = outcomes.clone();
        supervisor.spawn_with_hook(ActorConfig::default(), move |ctx| {
            let Some(own) = ctx.main_address().cloned() else { return };
            ctx.subscribe(
                own.clone(),
                Handler::new(
                    ctx.id(),
                    TypeId::of::<RegisterNameResponse>(),
                    RegisterNameResponse::TYPE_NAME,
                    move |envelope| {
                        if let Some(response) = envelope.downcast::<RegisterNameResponse>() {
                            outcomes_for_hook
                                .borrow_mut()
                                .push(response.result.as_ref().map(|_| ()).map_err(|e| e.code()));
                        }
                        Ok(())
                    },
                ),
                OwnerTag::Plugin,
            );
            ctx.send(registry_for_send, RegisterName { name: "dup".to_string(), address: own });
        });
        supervisor.run_until_idle();
    }

    assert_eq!(outcomes.borrow().as_slice(), [Ok(()), Err(ErrorCode::AlreadyRegistered)]);
}
