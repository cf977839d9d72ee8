//! 派生组件在容器中的端到端测试

use async_trait::async_trait;
use component_macros::Component;
use di_common::{AsyncInitializing, BoxError, ConfigSection, Disposable, Injected, InstanceSet};
use di_impl::{Binding, ConfigValueInjector, Container};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

pub trait Channel: Send + Sync {
    fn id(&self) -> &'static str;
}

#[derive(Default, Component)]
#[component(primary, provides(dyn Channel))]
pub struct ChannelImpl;

impl Channel for ChannelImpl {
    fn id(&self) -> &'static str {
        "default"
    }
}

#[derive(Default, Component)]
#[component(named = "sms", provides(dyn Channel))]
pub struct SmsChannel;

impl Channel for SmsChannel {
    fn id(&self) -> &'static str {
        "sms"
    }
}

static INITIALIZED: AtomicUsize = AtomicUsize::new(0);

#[derive(Default, Component)]
#[component(singleton, initializing, disposable, post_construct = "check")]
pub struct Dispatcher {
    #[inject]
    primary: Injected<Arc<dyn Channel>>,
    #[inject(named = "sms")]
    sms: Injected<Arc<dyn Channel>>,
    #[inject]
    all: Injected<Vec<Arc<dyn Channel>>>,
    #[inject]
    unique: Injected<InstanceSet<dyn Channel>>,
    #[config(path = "dispatcher.retries")]
    retries: Injected<u32>,
    checked: AtomicBool,
    disposed: AtomicBool,
}

impl Dispatcher {
    fn check(&self) -> Result<(), BoxError> {
        if !self.primary.is_set() {
            return Err("primary 尚未注入".into());
        }
        self.checked.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl AsyncInitializing for Dispatcher {
    async fn after_properties_set(&self) -> Result<(), BoxError> {
        INITIALIZED.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl Disposable for Dispatcher {
    async fn dispose(&self) -> Result<(), BoxError> {
        self.disposed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

fn container() -> Container {
    let mut section = ConfigSection::new();
    section.insert("dispatcher", serde_json::json!({ "retries": 3 }));

    let container = Container::new();
    container.describe_type::<ChannelImpl>();
    container.describe_type::<SmsChannel>();
    container.describe_type::<Dispatcher>();
    container.add_field_injector_adapter(ConfigValueInjector::new(section));
    container
}

#[tokio::test]
async fn test_derived_component_wiring() {
    let container = container();
    container
        .register(Binding::of::<dyn Channel>().to::<ChannelImpl>())
        .unwrap();
    container
        .register(Binding::of::<dyn Channel>().named("sms").to::<SmsChannel>())
        .unwrap();

    let dispatcher = container.resolve::<Dispatcher>().await.unwrap();

    assert_eq!(dispatcher.primary.get().unwrap().id(), "default");
    assert_eq!(dispatcher.sms.get().unwrap().id(), "sms");
    assert_eq!(dispatcher.all.get().unwrap().len(), 2);
    assert_eq!(dispatcher.unique.get().unwrap().len(), 2);
    assert_eq!(dispatcher.retries.get(), Some(3));
    assert!(dispatcher.checked.load(Ordering::SeqCst));
    assert!(INITIALIZED.load(Ordering::SeqCst) >= 1);

    let again = container.resolve::<Dispatcher>().await.unwrap();
    assert!(Arc::ptr_eq(&dispatcher, &again));

    let report = container.release().await;
    assert!(report.is_clean());
    assert!(dispatcher.disposed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_convention_discovers_derived_impl() {
    let container = container();

    let channel = container.resolve::<dyn Channel>().await.unwrap();
    assert_eq!(channel.id(), "default");

    let first = container.create::<ChannelImpl>().await.unwrap();
    let second = container.create::<ChannelImpl>().await.unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
}
