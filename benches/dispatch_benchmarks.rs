//! Dispatch-path benchmarks: baseline costs of spawning actors and routing
//! messages through a supervisor's run queue.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::any::TypeId;
use std::cell::Cell;
use std::hint::black_box;
use std::rc::Rc;
use std::time::Duration;

use criterion::{criterion_group, criterion_main, Criterion};

use locality_rt::actor::ActorConfig;
use locality_rt::address::Address;
use locality_rt::message::{Handler, Payload};
use locality_rt::subscription::OwnerTag;
use locality_rt::supervisor::{Supervisor, SupervisorConfig};

#[derive(Debug, Clone)]
struct BenchMessage {
    value: u64,
}

impl Payload for BenchMessage {
    const TYPE_NAME: &'static str = "bench_message";
}

#[derive(Debug, Clone)]
struct BenchPing {
    reply_to: Address,
}

impl Payload for BenchPing {
    const TYPE_NAME: &'static str = "bench_ping";
}

#[derive(Debug, Clone)]
struct BenchPong;

impl Payload for BenchPong {
    const TYPE_NAME: &'static str = "bench_pong";
}

/// Spawn a single actor with the default 8-plugin pipeline and run it to
/// idle (init -> operational).
fn actor_spawn_single(c: &mut Criterion) {
    c.bench_function("actor_spawn_single", |b| {
        b.iter(|| {
            let mut supervisor = Supervisor::new(SupervisorConfig::default());
            let id = supervisor.spawn(ActorConfig::default());
            supervisor.run_until_idle();
            black_box(id);
        });
    });
}

/// Spawn 10 actors in one supervisor and run them all to operational.
fn actor_spawn_batch_small(c: &mut Criterion) {
    c.bench_function("actor_spawn_batch_small", |b| {
        b.iter(|| {
            let mut supervisor = Supervisor::new(SupervisorConfig::default());
            let mut ids = Vec::with_capacity(10);
            for _ in 0..10 {
                ids.push(supervisor.spawn(ActorConfig::default()));
            }
            supervisor.run_until_idle();
            black_box(ids);
        });
    });
}

/// Throughput of dispatching 100 self-addressed messages through one
/// actor's handler.
fn actor_message_throughput(c: &mut Criterion) {
    c.bench_function("actor_message_throughput", |b| {
        b.iter(|| {
            let mut supervisor = Supervisor::new(SupervisorConfig::default());
            let count = Rc::new(Cell::new(0u64));
            let count_in_hook = count.clone();

            supervisor.spawn_with_hook(ActorConfig::default(), move |ctx| {
                let Some(address) = ctx.main_address().cloned() else { return };
                ctx.subscribe(
                    address.clone(),
                    Handler::new(
                        ctx.id(),
                        TypeId::of::<BenchMessage>(),
                        BenchMessage::TYPE_NAME,
                        move |envelope| {
                            if let Some(msg) = envelope.downcast::<BenchMessage>() {
                                count_in_hook.set(count_in_hook.get() + msg.value);
                            }
                            Ok(())
                        },
                    ),
                    OwnerTag::Plugin,
                );
                for i in 0..100 {
                    ctx.send(address.clone(), BenchMessage { value: i });
                }
            });

            supervisor.run_until_idle();
            black_box(count.get());
        });
    });
}

/// Cost of one full request/reply round trip, including timer arm+cancel.
fn request_reply_round_trip(c: &mut Criterion) {
    c.bench_function("request_reply_round_trip", |b| {
        b.iter(|| {
            let mut supervisor = Supervisor::new(SupervisorConfig::default());

            let ponger = supervisor.spawn_with_hook(ActorConfig::default(), |ctx| {
                let Some(address) = ctx.main_address().cloned() else { return };
                ctx.subscribe(
                    address,
                    Handler::new(ctx.id(), TypeId::of::<BenchPing>(), BenchPing::TYPE_NAME, |envelope| {
                        if let Some(ping) = envelope.downcast::<BenchPing>() {
                            if let Some(request_id) = envelope.request_id() {
                                let reply = locality_rt::message::Envelope::new(ping.reply_to.clone(), BenchPong)
                                    .with_request_id(request_id);
                                let _ = ping.reply_to.deliver(reply);
                            }
                        }
                        Ok(())
                    }),
                    OwnerTag::Plugin,
                );
            });
            supervisor.run_until_idle();
            let ponger_address = supervisor.main_address_of(ponger).expect("ponger has a main address");

            supervisor.spawn_with_hook(ActorConfig::default(), move |ctx| {
                let Some(own) = ctx.main_address().cloned() else { return };
                ctx.subscribe(
                    own.clone(),
                    Handler::new(ctx.id(), TypeId::of::<BenchPong>(), BenchPong::TYPE_NAME, |_envelope| Ok(())),
                    OwnerTag::Plugin,
                );
                ctx.request(ponger_address, BenchPing { reply_to: own }, Duration::from_secs(1));
            });
            supervisor.run_until_idle();
        });
    });
}

fn configure_criterion() -> Criterion {
    Criterion::default()
        .sample_size(30)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(2))
        .without_plots()
}

criterion_group! {
    name = benches;
    config = configure_criterion();
    targets =
        actor_spawn_single,
        actor_spawn_batch_small,
        actor_message_throughput,
        request_reply_round_trip,
}

criterion_main!(benches);
