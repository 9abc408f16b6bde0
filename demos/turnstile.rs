//! Coin-Operated Turnstile
//!
//! This example wires a two-state machine to an event bus.
//!
//! Key concepts:
//! - States subscribe to events that only fire while they are current
//! - Handlers request transitions through the context they receive
//! - Prohibitions block a destination until the next committed transition
//! - The enable switch silences event dispatch without touching the state
//!
//! Run with: RUST_LOG=statebus=debug cargo run --example turnstile

use statebus::{state_keys, LocalBus, State, StateContext, StateMachineBuilder, Subscriptions};
use std::cell::Cell;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

state_keys! {
    enum Gate {
        Locked,
        Unlocked,
    }
}

struct Coin;
struct Push;

#[derive(Default)]
struct Till {
    coins: Cell<u32>,
    alarms: Cell<u32>,
}

struct Locked;

impl State<Till, Gate> for Locked {
    fn key(&self) -> Gate {
        Gate::Locked
    }

    fn subscribe(&self, subscriptions: &mut Subscriptions<'_, Self, Till, Gate>) {
        subscriptions
            .on::<Coin, _>(|_, _, ctx| {
                ctx.owner().coins.set(ctx.owner().coins.get() + 1);
                ctx.machine().set_next(Gate::Unlocked);
            })
            .on::<Push, _>(|_, _, ctx| {
                ctx.owner().alarms.set(ctx.owner().alarms.get() + 1);
                println!("  alarm: pushed while locked");
            });
    }

    fn on_enter(&self, _ctx: &StateContext<'_, Till, Gate>) {
        println!("  gate locked");
    }
}

struct Unlocked;

impl State<Till, Gate> for Unlocked {
    fn key(&self) -> Gate {
        Gate::Unlocked
    }

    fn subscribe(&self, subscriptions: &mut Subscriptions<'_, Self, Till, Gate>) {
        subscriptions.on::<Push, _>(|_, _, ctx| {
            ctx.machine().set_next(Gate::Locked);
        });
    }

    fn on_enter(&self, _ctx: &StateContext<'_, Till, Gate>) {
        println!("  gate unlocked");
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Turnstile Example ===\n");

    let bus = Rc::new(LocalBus::new());
    let till = Rc::new(Till::default());
    let machine = match StateMachineBuilder::<Till, Gate>::new(till.clone(), bus.clone())
        .state(Locked)
        .state(Unlocked)
        .build()
    {
        Ok(machine) => machine,
        Err(error) => {
            eprintln!("failed to build turnstile: {error}");
            return;
        }
    };

    println!("Push without paying:");
    bus.publish(&Push);

    println!("Insert coin, then push:");
    bus.publish(&Coin);
    bus.publish(&Push);

    println!("Maintenance mode, events ignored:");
    machine.set_enabled(false);
    bus.publish(&Coin);
    machine.set_enabled(true);

    println!("Unlocking is prohibited for the next transition:");
    machine.prohibit_state(Gate::Unlocked);
    println!("  {}", machine.set_next(Gate::Unlocked));
    machine.allow_all_states();

    println!("\nCurrent state: {:?}", machine.current_key().map(|gate| gate.name()));
    println!("Coins: {}, alarms: {}", till.coins.get(), till.alarms.get());
    println!("Transitions recorded: {}", machine.history().len());

    println!("\n=== Example Complete ===");
}
