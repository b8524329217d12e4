//! `#[injectable]` 自动注册到全局容器的集成测试
use di_abstractions::{BindingKey, DiContainer, Key, Lifetime};
use di_impl::{global, Autowired};
use di_macros::injectable;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_REQUEST: AtomicU64 = AtomicU64::new(1);

trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

#[injectable(provides(dyn Clock))]
struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        1_700_000_000
    }
}

#[injectable]
struct Scheduler {
    clock: Arc<dyn Clock>,
}

#[injectable(transient)]
struct RequestId {
    #[inject(default)]
    value: u64,
}

impl RequestId {
    fn next(&self) -> u64 {
        self.value + NEXT_REQUEST.fetch_add(1, Ordering::SeqCst)
    }
}

#[test]
fn test_types_are_registered_at_startup() {
    let container = global::container();

    assert!(container.is_bound(&BindingKey::of::<FixedClock>()));
    assert!(container.is_bound(&BindingKey::of::<dyn Clock>()));
    assert!(container.is_bound(&BindingKey::of::<Scheduler>()));
    assert!(container.is_bound(&BindingKey::of::<RequestId>()));
}

#[tokio::test]
async fn test_autowired_singleton_is_shared() {
    let first = Scheduler::autowired().await.unwrap();
    let second = Scheduler::autowired().await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.clock.now(), 1_700_000_000);
}

#[tokio::test]
async fn test_provided_interface_resolves() {
    let clock = global::get(Key::<dyn Clock>::of()).await.unwrap();

    assert_eq!(clock.now(), 1_700_000_000);
}

#[tokio::test]
async fn test_transient_flag_rebuilds() {
    let first = RequestId::autowired().await.unwrap();
    let second = RequestId::autowired().await.unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_ne!(first.next(), second.next());
}

#[test]
fn test_registered_lifetimes_are_described() {
    let bindings = global::container().bindings();
    let describe = |key: BindingKey| {
        bindings
            .iter()
            .find(|(bound, _)| *bound == key)
            .map(|(_, description)| description.clone())
            .unwrap()
    };

    let transient = format!("({})", Lifetime::Transient);
    let singleton = format!("({})", Lifetime::Singleton);

    assert!(describe(BindingKey::of::<RequestId>()).ends_with(&transient));
    assert!(describe(BindingKey::of::<Scheduler>()).ends_with(&singleton));
}
