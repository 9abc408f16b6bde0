//! End-to-end scenarios driving a machine through its public API.

use statebus::{
    state_keys, BuildError, LocalBus, State, StateContext, StateMachine, StateMachineBuilder,
    Subscriptions, TransitionOutcome,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

state_keys! {
    enum Phase {
        Idle,
        Running,
        Stopped,
    }
}

/// Counts lifecycle hooks and handler calls per state.
#[derive(Default)]
struct Counters {
    enters: RefCell<Vec<Phase>>,
    exits: RefCell<Vec<Phase>>,
    handled: RefCell<Vec<&'static str>>,
}

struct Work;

struct Plain(Phase);

impl State<Counters, Phase> for Plain {
    fn key(&self) -> Phase {
        self.0
    }

    fn on_enter(&self, ctx: &StateContext<'_, Counters, Phase>) {
        ctx.owner().enters.borrow_mut().push(self.0);
    }

    fn on_exit(&self, ctx: &StateContext<'_, Counters, Phase>) {
        ctx.owner().exits.borrow_mut().push(self.0);
    }
}

struct Worker {
    key: Phase,
    handler: &'static str,
}

impl State<Counters, Phase> for Worker {
    fn key(&self) -> Phase {
        self.key
    }

    fn subscribe(&self, subscriptions: &mut Subscriptions<'_, Self, Counters, Phase>) {
        subscriptions.on::<Work, _>(|state, _, ctx| {
            ctx.owner().handled.borrow_mut().push(state.handler);
        });
    }
}

fn new_machine() -> (Rc<LocalBus>, Rc<Counters>, StateMachine<Counters, Phase>) {
    let bus = Rc::new(LocalBus::new());
    let counters = Rc::new(Counters::default());
    let machine = StateMachine::new(counters.clone(), bus.clone());
    (bus, counters, machine)
}

#[test]
fn idle_running_stopped_walkthrough() {
    let (_bus, counters, machine) = new_machine();
    for key in Phase::ALL {
        machine.add(Plain(*key));
    }
    assert_eq!(machine.current_key(), Some(Phase::Idle));

    machine.set_next(Phase::Running);
    assert_eq!(machine.current_key(), Some(Phase::Running));
    assert_eq!(machine.previous_key(), Some(Phase::Idle));
    assert_eq!(*counters.exits.borrow(), vec![Phase::Idle]);
    assert_eq!(*counters.enters.borrow(), vec![Phase::Running]);

    machine.prohibit_state(Phase::Stopped);
    assert_eq!(
        machine.set_next(Phase::Stopped),
        TransitionOutcome::Prohibited(Phase::Stopped)
    );
    assert_eq!(machine.current_key(), Some(Phase::Running));
    assert_eq!(machine.previous_key(), Some(Phase::Idle));

    machine.allow_all_states();
    machine.set_next(Phase::Stopped);
    assert_eq!(machine.current_key(), Some(Phase::Stopped));
    assert_eq!(machine.previous_key(), Some(Phase::Running));
    assert_eq!(*counters.exits.borrow(), vec![Phase::Idle, Phase::Running]);
    assert_eq!(*counters.enters.borrow(), vec![Phase::Running, Phase::Stopped]);
}

#[test]
fn handlers_are_scoped_to_the_active_state() {
    let (bus, counters, machine) = new_machine();
    machine.add(Plain(Phase::Idle));
    machine.add(Worker {
        key: Phase::Running,
        handler: "h1",
    });
    machine.add(Worker {
        key: Phase::Stopped,
        handler: "h2",
    });

    bus.publish(&Work);
    assert!(counters.handled.borrow().is_empty());

    machine.set_next(Phase::Running);
    bus.publish(&Work);

    assert_eq!(*counters.handled.borrow(), vec!["h1"]);
}

#[test]
fn reenabling_restores_the_current_handler_only() {
    let (bus, counters, machine) = new_machine();
    machine.add(Worker {
        key: Phase::Idle,
        handler: "idle",
    });
    machine.add(Worker {
        key: Phase::Running,
        handler: "running",
    });

    machine.set_enabled(false);
    bus.publish(&Work);
    bus.publish(&Work);
    machine.set_next(Phase::Running);
    assert!(counters.handled.borrow().is_empty());

    machine.set_enabled(true);
    bus.publish(&Work);

    assert_eq!(*counters.handled.borrow(), vec!["running"]);
}

#[test]
fn allow_only_whitelist_gates_next_transition() {
    let (_bus, _counters, machine) = new_machine();
    for key in Phase::ALL {
        machine.add(Plain(*key));
    }
    machine.set_next(Phase::Stopped);

    machine.allow_only_states([Phase::Idle, Phase::Running]);

    assert!(!machine.set_next(Phase::Stopped).is_committed());
    assert!(machine.set_next(Phase::Idle).is_committed());
    assert!(machine.prohibited_states().is_empty());
}

/// Turnstile: a coin unlocks, a push locks again. The owner keeps the till.
mod turnstile {
    use super::*;

    state_keys! {
        pub enum Gate {
            Locked,
            Unlocked,
        }
    }

    pub struct Coin;
    pub struct Push;

    #[derive(Default)]
    pub struct Till {
        pub coins: Cell<u32>,
        pub passes: Cell<u32>,
        pub alarms: Cell<u32>,
    }

    pub struct Locked;

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
                });
        }
    }

    pub struct Unlocked;

    impl State<Till, Gate> for Unlocked {
        fn key(&self) -> Gate {
            Gate::Unlocked
        }

        fn subscribe(&self, subscriptions: &mut Subscriptions<'_, Self, Till, Gate>) {
            subscriptions.on::<Push, _>(|_, _, ctx| {
                ctx.machine().set_next(Gate::Locked);
            });
        }

        fn on_exit(&self, ctx: &StateContext<'_, Till, Gate>) {
            ctx.owner().passes.set(ctx.owner().passes.get() + 1);
        }
    }
}

#[test]
fn turnstile_built_with_builder() {
    use turnstile::*;

    let bus = Rc::new(LocalBus::new());
    let till = Rc::new(Till::default());
    let machine = StateMachineBuilder::<Till, Gate>::new(till.clone(), bus.clone())
        .state(Locked)
        .state(Unlocked)
        .build()
        .unwrap();

    bus.publish(&Push);
    bus.publish(&Coin);
    bus.publish(&Coin);
    bus.publish(&Push);
    bus.publish(&Push);

    assert_eq!(machine.current_key(), Some(Gate::Locked));
    assert_eq!(till.coins.get(), 1);
    assert_eq!(till.passes.get(), 1);
    assert_eq!(till.alarms.get(), 2);
    assert_eq!(
        machine.history().get_path(),
        vec![Gate::Locked, Gate::Unlocked, Gate::Locked]
    );
}

#[test]
fn builder_reports_duplicate_states() {
    use turnstile::*;

    let bus = Rc::new(LocalBus::new());
    let result = StateMachineBuilder::<Till, Gate>::new(Rc::new(Till::default()), bus)
        .state(Locked)
        .state(Locked)
        .build();

    assert_eq!(
        result.err(),
        Some(BuildError::DuplicateState {
            key: "Locked".to_string()
        })
    );
}

#[test]
fn two_machines_share_one_bus() {
    use turnstile::*;

    let bus = Rc::new(LocalBus::new());
    let left_till = Rc::new(Till::default());
    let right_till = Rc::new(Till::default());

    let left: StateMachine<Till, Gate> = StateMachine::new(left_till.clone(), bus.clone());
    left.add(Locked);
    left.add(Unlocked);
    let right: StateMachine<Till, Gate> = StateMachine::new(right_till.clone(), bus.clone());
    right.add(Unlocked);
    right.add(Locked);

    bus.publish(&Coin);
    assert_eq!(left.current_key(), Some(Gate::Unlocked));
    assert_eq!(right.current_key(), Some(Gate::Unlocked));
    assert_eq!(left_till.coins.get(), 1);
    assert_eq!(right_till.coins.get(), 0);

    drop(right);
    assert_eq!(bus.listener_count::<Push>(), 1);
    bus.publish(&Push);
    assert_eq!(left.current_key(), Some(Gate::Locked));
}
