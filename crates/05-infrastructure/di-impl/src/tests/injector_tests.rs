//! 成员注入测试

use super::fixtures::{container, same_instance, Service, SetHolder, B};
use crate::{Binding, ConfigValueInjector, Container, CONFIG_ATTRIBUTE};
use async_trait::async_trait;
use di_abstractions::{ExtensionSet, FieldInjectorAdapter};
use di_common::{
    ConfigSection, ContainerConfig, ContainerError, Dependency, Field, FieldDescriptor, Injected, Instance,
    InstanceSet, Method, TypeDescriptor,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct Consumer {
    single: Injected<Arc<B>>,
    named: Injected<Arc<B>>,
    all: Injected<Vec<Arc<dyn Service>>>,
    unique: Injected<InstanceSet<dyn Service>>,
    via_method: Injected<Arc<B>>,
}

fn consumer_descriptor() -> TypeDescriptor {
    TypeDescriptor::of::<Consumer>()
        .default_constructor()
        .field(Field::single("single", |c: &Consumer| &c.single).inject())
        .field(Field::single("named", |c: &Consumer| &c.named).inject().named("b2"))
        .field(Field::list("all", |c: &Consumer| &c.all).inject())
        .field(Field::set("unique", |c: &Consumer| &c.unique).inject())
        .method(
            Method::new("wire", |c: &Consumer, args| {
                c.via_method.set(args.get::<B>(0)?);
                Ok(())
            })
            .inject()
            .param(Dependency::single::<B>("b").named("b1")),
        )
        .build()
}

/// 记录被询问字段的适配器
#[derive(Default)]
struct CountingAdapter {
    offered: Arc<AtomicUsize>,
}

#[async_trait]
impl FieldInjectorAdapter for CountingAdapter {
    fn name(&self) -> &str {
        "counting"
    }

    fn is_injectable(&self, field: &FieldDescriptor) -> bool {
        field.attribute("counted").is_some()
    }

    async fn inject(&self, _instance: &Instance, _field: &FieldDescriptor) -> Result<(), ContainerError> {
        self.offered.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct Settings {
    port: Injected<u32>,
    marker: Injected<Arc<B>>,
}

fn settings_descriptor() -> TypeDescriptor {
    TypeDescriptor::of::<Settings>()
        .default_constructor()
        .field(Field::value("port", |s: &Settings| &s.port).attribute(CONFIG_ATTRIBUTE, "server.port"))
        .field(
            Field::single("marker", |s: &Settings| &s.marker)
                .inject()
                .immutable()
                .attribute("counted", "yes"),
        )
        .build()
}

fn config_extensions() -> ExtensionSet {
    let section = ConfigSection::from_value(json!({ "server": { "port": 9090 } }));
    ExtensionSet::new().with_adapter(ConfigValueInjector::new(section))
}

#[tokio::test]
async fn test_fields_and_methods_are_injected() {
    let container = container();
    container.register(Binding::of::<B>().named("b1").primary(true)).expect("注册失败");
    container.register(Binding::of::<B>().named("b2")).expect("注册失败");
    container.describe(consumer_descriptor());

    let consumer = container.resolve::<Consumer>().await.expect("解析失败");
    let b1 = container.resolve_named::<B>("b1").await.expect("解析失败");
    let b2 = container.resolve_named::<B>("b2").await.expect("解析失败");

    assert!(Arc::ptr_eq(&consumer.single.get().expect("single"), &b1));
    assert!(Arc::ptr_eq(&consumer.named.get().expect("named"), &b2));
    assert!(Arc::ptr_eq(&consumer.via_method.get().expect("via_method"), &b1));
    assert_eq!(consumer.all.with(|all| all.map(Vec::len)), Some(2));
    assert_eq!(consumer.unique.with(|unique| unique.map(InstanceSet::len)), Some(2));
}

#[tokio::test]
async fn test_set_collapses_shared_instances() {
    let container = container();
    let shared = Arc::new(B);
    container
        .register_instance(Binding::of::<B>(), shared.clone())
        .expect("注册失败");
    container
        .register_instance(Binding::of::<dyn Service>(), shared.clone())
        .expect("注册失败");

    let list = container.resolve_many::<dyn Service>().await.expect("解析失败");
    let holder = container.resolve::<SetHolder>().await.expect("解析失败");

    assert_eq!(list.len(), 2);
    assert_eq!(holder.services.len(), 1);
    assert!(holder.services.iter().all(|service| same_instance(service, &shared)));
}

#[tokio::test]
async fn test_immutable_field_is_offered_to_adapters() {
    let container = container();
    let offered = Arc::new(AtomicUsize::new(0));
    container.add_field_injector_adapter(CountingAdapter {
        offered: offered.clone(),
    });
    container.add_field_injector_adapter(CountingAdapter {
        offered: offered.clone(),
    });
    container.describe(settings_descriptor());

    let settings = container.resolve::<Settings>().await.expect("解析失败");

    assert!(!settings.marker.is_set());
    assert_eq!(offered.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_config_values_are_injected_from_extensions() {
    let container = Container::builder()
        .with_extensions(config_extensions())
        .describe(settings_descriptor())
        .build()
        .expect("构建失败");

    let settings = container.resolve::<Settings>().await.expect("解析失败");
    assert_eq!(settings.port.get(), Some(9090));
}

#[tokio::test]
async fn test_ignore_auto_injectors_drops_plugin_adapters() {
    let container = Container::builder()
        .with_config(ContainerConfig::default().with_ignore_auto_injectors(true))
        .with_extensions(config_extensions())
        .describe(settings_descriptor())
        .build()
        .expect("构建失败");

    let settings = container.resolve::<Settings>().await.expect("解析失败");
    assert!(!settings.port.is_set());
}

#[tokio::test]
async fn test_inject_members_on_external_instance() {
    let container = container();
    container.register(Binding::of::<B>().named("b1").primary(true)).expect("注册失败");
    container.register(Binding::of::<B>().named("b2")).expect("注册失败");
    container.describe(consumer_descriptor());

    let external = Arc::new(Consumer::default());
    container.inject_members(&external).await.expect("注入失败");
    container.inject_members(&external).await.expect("重复注入失败");

    assert!(external.single.is_set());
    assert!(external.via_method.is_set());
    assert_eq!(container.stats().registered_bindings, 2);
}
