use di_abstractions::{BindingKey, DiContainer};
use di_macros::injectable;

trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

#[injectable(provides(dyn Clock))]
struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        42
    }
}

fn main() {
    let container = di_impl::global::container();

    assert!(container.is_bound(&BindingKey::of::<FixedClock>()));
    assert!(container.is_bound(&BindingKey::of::<dyn Clock>()));
}
