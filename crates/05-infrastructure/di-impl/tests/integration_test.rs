//! 容器行为场景测试

use di_common::{Constructor, Dependency, ErrorKind, TypeDescriptor};
use di_impl::{Binding, Container};
use std::sync::Arc;
use std::time::Duration;

trait Plugin: Send + Sync {}

#[derive(Default)]
struct B;

impl Plugin for B {}

struct A {
    items: Vec<Arc<B>>,
}

struct A2 {
    b: Arc<B>,
}

struct B1 {
    _b2: Arc<B2>,
}

struct B2 {
    _b1: Arc<B1>,
}

fn container() -> Container {
    Container::builder()
        .describe(
            TypeDescriptor::of::<B>()
                .default_constructor()
                .provides::<dyn Plugin>(|b| b)
                .build(),
        )
        .describe(
            TypeDescriptor::of::<A>()
                .constructor(
                    Constructor::new("new", |args| Ok(A { items: args.list::<B>(0)? }))
                        .inject()
                        .param(Dependency::list::<B>("items")),
                )
                .build(),
        )
        .describe(
            TypeDescriptor::of::<A2>()
                .constructor(
                    Constructor::new("new", |args| Ok(A2 { b: args.get::<B>(0)? }))
                        .inject()
                        .param(Dependency::single::<B>("b")),
                )
                .build(),
        )
        .describe(
            TypeDescriptor::of::<B1>()
                .singleton()
                .constructor(
                    Constructor::new("new", |args| Ok(B1 { _b2: args.get::<B2>(0)? }))
                        .inject()
                        .param(Dependency::single::<B2>("b2")),
                )
                .build(),
        )
        .describe(
            TypeDescriptor::of::<B2>()
                .singleton()
                .constructor(
                    Constructor::new("new", |args| Ok(B2 { _b1: args.get::<B1>(0)? }))
                        .inject()
                        .param(Dependency::single::<B1>("b1")),
                )
                .build(),
        )
        .build()
        .expect("构建容器失败")
}

/// 场景 1：单个绑定注入到列表参数
#[tokio::test]
async fn test_list_parameter_with_one_binding() {
    let container = container();
    container.register(Binding::of::<B>()).unwrap();

    let a = container.resolve::<A>().await.unwrap();
    assert_eq!(a.items.len(), 1);
}

/// 场景 2：两个限定符各自产生独立实例
#[tokio::test]
async fn test_list_parameter_with_two_qualifiers() {
    let container = container();
    container.register(Binding::of::<B>().named("b1")).unwrap();
    container.register(Binding::of::<B>().named("b2")).unwrap();

    let a = container.resolve::<A>().await.unwrap();
    assert_eq!(a.items.len(), 2);
    assert!(!Arc::ptr_eq(&a.items[0], &a.items[1]));
}

/// 场景 3：同一类型的第二个主实现被拒绝
#[tokio::test]
async fn test_two_primary_bindings() {
    let container = container();
    container.register(Binding::of::<B>().named("b1").primary(true)).unwrap();

    let error = container
        .register(Binding::of::<B>().named("b2").primary(true))
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::TooManyPrimaryImplementations);
}

/// 场景 4：无限定的单值参数选中主实现
#[tokio::test]
async fn test_primary_wins_for_single_parameter() {
    let container = container();
    container.register(Binding::of::<B>().named("b1").primary(true)).unwrap();
    container.register(Binding::of::<B>().named("b2")).unwrap();

    let a2 = container.resolve::<A2>().await.unwrap();
    let b1 = container.resolve_named::<B>("b1").await.unwrap();
    assert!(Arc::ptr_eq(&a2.b, &b1));
}

/// 场景 5：未注册的具体类型按需提供时为空，未注册的接口解析时报错
#[tokio::test]
async fn test_provide_versus_resolve_for_unregistered_types() {
    let container = container();

    assert!(container.provide::<B>().await.unwrap().is_none());

    let error = container.resolve::<dyn Plugin>().await.err().unwrap();
    assert_eq!(error.kind(), ErrorKind::NoImplementationRegistered);
}

/// 场景 6：单例之间的循环依赖不会栈溢出或死锁
#[tokio::test]
async fn test_singleton_cycle_fails_fast() {
    let container = container();

    let result = tokio::time::timeout(Duration::from_secs(5), container.resolve::<B1>())
        .await
        .expect("循环依赖解析超时");

    let error = result.err().unwrap();
    assert!(error.is_circular());
    assert!(matches!(
        error.kind(),
        ErrorKind::FailedInstantiation | ErrorKind::CircularDependency
    ));
}

/// 单例两次解析得到同一实例，原型得到不同实例
#[tokio::test]
async fn test_singleton_identity_and_prototype_freshness() {
    let container = container();
    container.register(Binding::of::<B>().named("single")).unwrap();

    let first = container.resolve_named::<B>("single").await.unwrap();
    let second = container.resolve_named::<B>("single").await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let prototype = Container::builder()
        .with_config(di_common::ContainerConfig::default().with_singleton_by_default(false))
        .describe(TypeDescriptor::of::<B>().default_constructor().build())
        .register(Binding::of::<B>())
        .build()
        .unwrap();
    let first = prototype.resolve::<B>().await.unwrap();
    let second = prototype.resolve::<B>().await.unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
}
