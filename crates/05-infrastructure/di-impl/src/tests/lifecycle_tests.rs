//! 按需提供、释放与统计测试

use super::fixtures::{container, Service, B};
use crate::{Binding, BindingState, Container, Key};
use async_trait::async_trait;
use di_common::{BoxError, Constructor, ContainerConfig, Disposable, TypeDescriptor};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

static CLOSED: AtomicUsize = AtomicUsize::new(0);

#[derive(Default)]
struct Pool;

#[async_trait]
impl Disposable for Pool {
    async fn dispose(&self) -> Result<(), BoxError> {
        CLOSED.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct Leaky;

#[async_trait]
impl Disposable for Leaky {
    async fn dispose(&self) -> Result<(), BoxError> {
        Err("句柄未关闭".into())
    }
}

#[derive(Default)]
struct Widget;

#[tokio::test]
async fn test_provide_without_binding_is_absent() {
    let container = container();

    let provided = container.provide::<B>().await.expect("提供失败");
    assert!(provided.is_none());
    assert!(!container.is_registered::<B>());

    let service = container.provide::<dyn Service>().await.expect("提供失败");
    assert!(service.is_none());
}

#[tokio::test]
async fn test_provide_builds_component_and_uses_holders() {
    let container = container();
    container.describe(TypeDescriptor::of::<Widget>().component().default_constructor().build());

    let first = container.provide::<Widget>().await.expect("提供失败").expect("应当提供");
    let second = container.provide::<Widget>().await.expect("提供失败").expect("应当提供");
    assert!(!Arc::ptr_eq(&first, &second));

    let instance = Arc::new(B);
    container
        .register_instance(Binding::of::<B>().named("pinned"), instance.clone())
        .expect("注册失败");
    let pinned = container
        .provide_named::<B>("pinned")
        .await
        .expect("提供失败")
        .expect("应当提供");
    assert!(Arc::ptr_eq(&pinned, &instance));
}

#[tokio::test]
async fn test_release_disposes_each_instance_once() {
    let container = container();
    container.describe(TypeDescriptor::of::<Pool>().default_constructor().disposable().build());
    container.describe(TypeDescriptor::of::<Leaky>().default_constructor().disposable().build());

    let pool = Arc::new(Pool);
    container.register_instance(Binding::of::<Pool>(), pool.clone()).expect("注册失败");
    container
        .register_instance(Binding::of::<Pool>().named("alias"), pool)
        .expect("注册失败");
    container.register(Binding::of::<Leaky>()).expect("注册失败");
    container.register(Binding::of::<B>()).expect("注册失败");
    container.resolve::<Leaky>().await.expect("解析失败");
    container.resolve::<B>().await.expect("解析失败");

    let before = CLOSED.load(Ordering::SeqCst);
    let report = container.release().await;

    assert_eq!(CLOSED.load(Ordering::SeqCst) - before, 1);
    assert_eq!(report.disposed, 1);
    assert_eq!(report.failures.len(), 1);
    assert!(!report.is_clean());
    assert!(report.failures[0].type_name.ends_with("Leaky"));

    let stats = container.stats();
    assert_eq!(stats.registered_bindings, 0);
    assert_eq!(stats.cached_singletons, 0);
    assert!(!container.is_registered::<Pool>());
    assert_eq!(container.binding_state(&Key::of::<B>()), BindingState::Unresolved);
}

#[tokio::test]
async fn test_container_is_usable_after_release() {
    let container = container();
    container.register(Binding::of::<B>()).expect("注册失败");
    let before = container.resolve::<B>().await.expect("解析失败");

    container.release().await;
    container.register(Binding::of::<B>()).expect("释放后可以重新注册");
    let after = container.resolve::<B>().await.expect("解析失败");

    assert!(!Arc::ptr_eq(&before, &after));
}

#[test]
fn test_synchronous_caller_drives_resolution() {
    let container = container();
    container.register(Binding::of::<B>().singleton(true)).expect("注册失败");

    let first = tokio_test::block_on(container.resolve::<B>()).expect("解析失败");
    let second = tokio_test::block_on(container.resolve::<B>()).expect("解析失败");

    assert!(Arc::ptr_eq(&first, &second));
    let report = tokio_test::block_on(container.release());
    assert!(report.is_clean());
}

static SLOW_BUILT: AtomicUsize = AtomicUsize::new(0);

struct Slow {
    serial: usize,
}

fn slow_descriptor() -> TypeDescriptor {
    TypeDescriptor::of::<Slow>()
        .constructor(Constructor::new("new", |_| {
            std::thread::sleep(Duration::from_millis(200));
            Ok(Slow {
                serial: SLOW_BUILT.fetch_add(1, Ordering::SeqCst),
            })
        }))
        .build()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_release_discards_construction_in_progress() {
    let container = Container::from_config(ContainerConfig::default().with_blocking_construction(true));
    container.describe(slow_descriptor());
    container.register(Binding::of::<Slow>()).expect("注册失败");

    let pending = {
        let container = container.clone();
        tokio::spawn(async move { container.resolve::<Slow>().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(container.binding_state(&Key::of::<Slow>()), BindingState::InProgress);

    container.release().await;
    let stale = pending.await.expect("任务失败").expect("解析失败");

    let stats = container.stats();
    assert_eq!(stats.registered_bindings, 0);
    assert_eq!(stats.cached_singletons, 0);
    assert_eq!(stats.in_flight, 0);

    container.register(Binding::of::<Slow>()).expect("释放后可以重新注册");
    let fresh = container.resolve::<Slow>().await.expect("解析失败");
    assert!(!Arc::ptr_eq(&stale, &fresh));
    assert_ne!(stale.serial, fresh.serial);
}
