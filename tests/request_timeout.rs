//! End-to-end scenario: a correlated request either gets a real reply or
//! times out, and the two outcomes are mutually exclusive (R3, P6).

#![allow(clippy::unwrap_used)]

use std::any::TypeId;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use locality_rt::actor::ActorConfig;
use locality_rt::message::{Envelope, Handler, Payload, RequestTimedOut};
use locality_rt::subscription::OwnerTag;
use locality_rt::supervisor::{Supervisor, SupervisorConfig};

#[derive(Debug, Clone)]
struct Ask;
impl Payload for Ask {
    const TYPE_NAME: &'static str = "ask";
}

#[derive(Debug, Clone)]
struct Answer;
impl Payload for Answer {
    const TYPE_NAME: &'static str = "answer";
}

#[derive(Debug, Default)]
enum Outcome {
    #[default]
    Nothing,
    Replied,
    TimedOut,
}

/// The responder always answers before the timeout fires: exactly one
/// `Answer` is observed and no `RequestTimedOut` ever arrives.
#[test]
fn request_resolved_by_a_timely_reply_never_times_out() {
    let mut supervisor = Supervisor::new(SupervisorConfig::default());

    let responder = supervisor.spawn_with_hook(ActorConfig::default(), |ctx| {
        let Some(address) = ctx.main_address().cloned() else { return };
        ctx.subscribe(
            address,
            Handler::new(ctx.id(), TypeId::of::<Ask>(), Ask::TYPE_NAME, |envelope| {
                if let Some(request_id) = envelope.request_id() {
                    let reply = Envelope::new(envelope.destination().clone(), Answer).with_request_id(request_id);
                    let _ = envelope.destination().deliver(reply);
                }
                Ok(())
            }),
            OwnerTag::Plugin,
        );
    });
    supervisor.run_until_idle();
    let responder_address = supervisor.main_address_of(responder).unwrap();

    let outcome = Rc::new(RefCell::new(Outcome::Nothing));
    let outcome_for_answer = outcome.clone();
    let outcome_for_timeout = outcome.clone();

    supervisor.spawn_with_hook(ActorConfig::default(), move |ctx| {
        let Some(own) = ctx.main_address().cloned() else { return };
        ctx.subscribe(
            own.clone(),
            Handler::new(ctx.id(), TypeId::of::<Answer>(), Answer::TYPE_NAME, move |_envelope| {
                *outcome_for_answer.borrow_mut() = Outcome::Replied;
                Ok(())
            }),
            OwnerTag::Plugin,
        );
        ctx.subscribe(
            own.clone(),
            Handler::new(ctx.id(), TypeId::of::<RequestTimedOut>(), RequestTimedOut::TYPE_NAME, move |_envelope| {
                *outcome_for_timeout.borrow_mut() = Outcome::TimedOut;
                Ok(())
            }),
            OwnerTag::Plugin,
        );
        ctx.request(responder_address, Ask, Duration::from_secs(30));
    });

    supervisor.run_until_idle();
    assert!(matches!(*outcome.borrow(), Outcome::Replied));
}

/// The responder never answers: the request times out and delivers a
/// single `RequestTimedOut` carrying the right request id, and no `Answer`
/// arrives afterwards (R3, P6 idempotent timeout-vs-reply race).
#[test]
fn request_with_no_reply_eventually_times_out() {
    let mut supervisor = Supervisor::new(SupervisorConfig::default());

    // Silent responder: subscribes to nothing, so `Ask` is never answered.
    let responder = supervisor.spawn(ActorConfig::default());
    supervisor.run_until_idle();
    let responder_address = supervisor.main_address_of(responder).unwrap();

    let outcome = Rc::new(RefCell::new(Outcome::Nothing));
    let outcome_for_answer = outcome.clone();
    let outcome_for_timeout = outcome.clone();

    supervisor.spawn_with_hook(ActorConfig::default(), move |ctx| {
        let Some(own) = ctx.main_address().cloned() else { return };
        ctx.subscribe(
            own.clone(),
            Handler::new(ctx.id(), TypeId::of::<Answer>(), Answer::TYPE_NAME, move |_envelope| {
                *outcome_for_answer.borrow_mut() = Outcome::Replied;
                Ok(())
            }),
            OwnerTag::Plugin,
        );
        ctx.subscribe(
            own.clone(),
            Handler::new(ctx.id(), TypeId::of::<RequestTimedOut>(), RequestTimedOut::TYPE_NAME, move |envelope| {
                assert!(envelope.downcast::<RequestTimedOut>().is_some());
                *outcome_for_timeout.borrow_mut() = Outcome::TimedOut;
                Ok(())
            }),
            OwnerTag::Plugin,
        );
        ctx.request(responder_address, Ask, Duration::from_millis(10));
    });

    // `run_until_idle` busy-spins until the 10ms timer is actually due --
    // short enough to keep this test fast, long enough not to race
    // scheduling jitter in CI.
    supervisor.run_until_idle();
    assert!(matches!(*outcome.borrow(), Outcome::TimedOut));
}
