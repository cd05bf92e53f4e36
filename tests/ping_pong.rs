//! End-to-end scenario: two actors trade a plain (uncorrelated) message
//! back and forth for many rounds, then shut down cleanly.

#![allow(clippy::unwrap_used)]

use std::any::TypeId;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use locality_rt::actor::{ActorConfig, ActorState};
use locality_rt::address::Address;
use locality_rt::message::{Handler, Payload};
use locality_rt::subscription::OwnerTag;
use locality_rt::supervisor::{Supervisor, SupervisorConfig};

const ROUNDS: u32 = 10_000;

#[derive(Debug, Clone)]
struct Ping {
    from: Address,
    round: u32,
}
impl Payload for Ping {
    const TYPE_NAME: &'static str = "ping";
}

#[derive(Debug, Clone)]
struct Pong {
    from: Address,
    round: u32,
}
impl Payload for Pong {
    const TYPE_NAME: &'static str = "pong";
}

#[test]
fn ping_pong_runs_ten_thousand_rounds_then_both_actors_shut_down() {
    let mut supervisor = Supervisor::new(SupervisorConfig::default());
    let rounds_seen = Rc::new(Cell::new(0u32));

    let ponger = supervisor.spawn_with_hook(ActorConfig::default(), |ctx| {
        let Some(address) = ctx.main_address().cloned() else { return };
        ctx.subscribe(
            address,
            Handler::new(ctx.id(), TypeId::of::<Ping>(), Ping::TYPE_NAME, move |envelope| {
                if let Some(ping) = envelope.downcast::<Ping>() {
                    let reply = locality_rt::message::Envelope::new(
                        ping.from.clone(),
                        Pong { from: envelope.destination().clone(), round: ping.round },
                    );
                    let _ = ping.from.deliver(reply);
                }
                Ok(())
            }),
            OwnerTag::Plugin,
        );
    });
    supervisor.run_until_idle();
    let ponger_address = supervisor.main_address_of(ponger).unwrap();

    let rounds_for_hook = rounds_seen.clone();
    let pinger = supervisor.spawn_with_hook(ActorConfig::default(), move |ctx| {
        let Some(address) = ctx.main_address().cloned() else { return };
        let ponger_for_handler = ponger_address.clone();
        ctx.subscribe(
            address.clone(),
            Handler::new(ctx.id(), TypeId::of::<Pong>(), Pong::TYPE_NAME, move |envelope| {
                if let Some(pong) = envelope.downcast::<Pong>() {
                    rounds_for_hook.set(pong.round + 1);
                    if pong.round + 1 < ROUNDS {
                        let next = locality_rt::message::Envelope::new(
                            ponger_for_handler.clone(),
                            Ping { from: envelope.destination().clone(), round: pong.round + 1 },
                        );
                        let _ = ponger_for_handler.deliver(next);
                    }
                }
                Ok(())
            }),
            OwnerTag::Plugin,
        );
        ctx.send(ponger_address.clone(), Ping { from: address, round: 0 });
    });

    supervisor.run_until_idle();
    assert_eq!(rounds_seen.get(), ROUNDS);

    supervisor.begin_shutdown(pinger, None);
    supervisor.begin_shutdown(ponger, None);
    supervisor.run_until_idle();

    assert!(supervisor.state_of(pinger).is_none() || supervisor.state_of(pinger) == Some(ActorState::ShutDown));
    assert!(supervisor.state_of(ponger).is_none() || supervisor.state_of(ponger) == Some(ActorState::ShutDown));
    assert!(!supervisor.has_children());
}

/// B2: a message an actor sends to its own address is delivered after the
/// currently-running handler returns, never reentrantly from within `send`.
#[test]
fn self_send_is_delivered_after_the_current_handler_returns() {
    let mut supervisor = Supervisor::new(SupervisorConfig::default());
    let order = Rc::new(RefCell::new(Vec::new()));

    #[derive(Debug, Clone)]
    struct Kick(u32);
    impl Payload for Kick {
        const TYPE_NAME: &'static str = "kick";
    }

    let order_in_hook = order.clone();
    supervisor.spawn_with_hook(ActorConfig::default(), move |ctx| {
        let Some(address) = ctx.main_address().cloned() else { return };
        let order_in_handler = order_in_hook.clone();
        ctx.subscribe(
            address.clone(),
            Handler::new(ctx.id(), TypeId::of::<Kick>(), Kick::TYPE_NAME, move |envelope| {
                let Some(Kick(n)) = envelope.downcast::<Kick>().cloned() else { return Ok(()) };
                order_in_handler.borrow_mut().push(format!("enter:{n}"));
                if n < 3 {
                    let self_address = envelope.destination().clone();
                    let _ = self_address.deliver(locality_rt::message::Envelope::new(self_address.clone(), Kick(n + 1)));
                }
                order_in_handler.borrow_mut().push(format!("exit:{n}"));
                Ok(())
            }),
            OwnerTag::Plugin,
        );
        ctx.send(address, Kick(0));
    });

    supervisor.run_until_idle();

    let recorded = order.borrow().clone();
    // Every "enter" for round n is immediately followed by "exit" for round
    // n before the next round's "enter" appears -- the self-send never cuts
    // into the still-running handler.
    assert_eq!(
        recorded,
        vec![
            "enter:0", "exit:0", "enter:1", "exit:1", "enter:2", "exit:2", "enter:3", "exit:3",
        ]
    );
}
