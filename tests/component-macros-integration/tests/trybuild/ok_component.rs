use component_macros::Component;
use di_common::{Describe, Injected};
use std::sync::Arc;

pub trait Clock: Send + Sync {}

#[derive(Default, Component)]
#[component(singleton, provides(dyn Clock))]
struct SystemClock;

impl Clock for SystemClock {}

#[derive(Default, Component)]
struct Scheduler {
    #[inject]
    clock: Injected<Arc<dyn Clock>>,
}

fn main() {
    let descriptor = Scheduler::descriptor();
    assert_eq!(descriptor.levels()[0].fields().len(), 1);
    assert!(SystemClock::descriptor().is_singleton());
    assert!(!Scheduler::default().clock.is_set());
}
