//! Centralized integration tests for the container (concurrency, configuration, bootstrap)
use async_trait::async_trait;
use di_abstractions::{ExtensionSet, LambdaProducer};
use di_common::{
    BoxError, ConfigSection, Constructor, ContainerConfig, Dependency, Field, Injected, TypeDescriptor,
};
use di_impl::{launch, Application, Binding, ConfigValueInjector, Container, Key, BindingState, CONFIG_ATTRIBUTE};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

static BUILT: [AtomicUsize; 4] = [
    AtomicUsize::new(0),
    AtomicUsize::new(0),
    AtomicUsize::new(0),
    AtomicUsize::new(0),
];

/// 构造较慢的单例，`N` 区分互不相关的类型
struct Slow<const N: usize>;

fn describe_slow<const N: usize>() -> TypeDescriptor {
    TypeDescriptor::of::<Slow<N>>()
        .singleton()
        .constructor(Constructor::new("new", |_| {
            BUILT[N].fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(50));
            Ok(Slow::<N>)
        }))
        .build()
}

/// 依赖两个慢单例的组件
struct Aggregate {
    left: Arc<Slow<2>>,
    right: Arc<Slow<3>>,
}

fn slow_container() -> Container {
    Container::builder()
        .with_config(ContainerConfig::default().with_blocking_construction(true))
        .describe(describe_slow::<0>())
        .describe(describe_slow::<1>())
        .describe(describe_slow::<2>())
        .describe(describe_slow::<3>())
        .describe(
            TypeDescriptor::of::<Aggregate>()
                .constructor(
                    Constructor::new("new", |args| {
                        Ok(Aggregate {
                            left: args.get::<Slow<2>>(0)?,
                            right: args.get::<Slow<3>>(1)?,
                        })
                    })
                    .inject()
                    .param(Dependency::single::<Slow<2>>("left"))
                    .param(Dependency::single::<Slow<3>>("right")),
                )
                .build(),
        )
        .build()
        .expect("构建容器失败")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_resolution_of_unrelated_singletons() -> anyhow::Result<()> {
    let container = slow_container();
    container.register(Binding::of::<Slow<0>>())?;
    container.register(Binding::of::<Slow<1>>())?;

    let mut handles = Vec::new();
    for i in 0..32 {
        let container = container.clone();
        handles.push(tokio::spawn(async move {
            if i % 2 == 0 {
                container.resolve::<Slow<0>>().await.map(|s| Arc::as_ptr(&s) as usize)
            } else {
                container.resolve::<Slow<1>>().await.map(|s| Arc::as_ptr(&s) as usize)
            }
        }));
    }

    let mut even = Vec::new();
    let mut odd = Vec::new();
    for (i, handle) in futures::future::join_all(handles).await.into_iter().enumerate() {
        let pointer = handle??;
        if i % 2 == 0 {
            even.push(pointer);
        } else {
            odd.push(pointer);
        }
    }

    even.dedup();
    odd.dedup();
    assert_eq!(even.len(), 1);
    assert_eq!(odd.len(), 1);
    assert_eq!(BUILT[0].load(Ordering::SeqCst), 1);
    assert_eq!(BUILT[1].load(Ordering::SeqCst), 1);
    assert_eq!(container.stats().in_flight, 0);
    assert_eq!(container.binding_state(&Key::of::<Slow<0>>()), BindingState::Resolved);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callers_share_nested_singletons() -> anyhow::Result<()> {
    let container = slow_container();

    let tasks = (0..16).map(|_| {
        let container = container.clone();
        tokio::spawn(async move { container.create::<Aggregate>().await })
    });
    let aggregates = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|joined| Ok(joined??))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let first = &aggregates[0];
    for aggregate in &aggregates {
        assert!(Arc::ptr_eq(&aggregate.left, &first.left));
        assert!(Arc::ptr_eq(&aggregate.right, &first.right));
    }
    assert_eq!(BUILT[2].load(Ordering::SeqCst), 1);
    assert_eq!(BUILT[3].load(Ordering::SeqCst), 1);
    Ok(())
}

/// 相互依赖的单例，依赖在构造完成后通过字段注入
struct Ping {
    pong: Injected<Arc<Pong>>,
}

struct Pong {
    ping: Injected<Arc<Ping>>,
}

fn ping_pong_container() -> Container {
    Container::builder()
        .with_config(ContainerConfig::default().with_blocking_construction(true))
        .describe(
            TypeDescriptor::of::<Ping>()
                .singleton()
                .constructor(Constructor::new("new", |_| {
                    std::thread::sleep(Duration::from_millis(100));
                    Ok(Ping { pong: Injected::new() })
                }))
                .field(Field::single("pong", |ping: &Ping| &ping.pong).inject())
                .build(),
        )
        .describe(
            TypeDescriptor::of::<Pong>()
                .singleton()
                .constructor(Constructor::new("new", |_| {
                    std::thread::sleep(Duration::from_millis(100));
                    Ok(Pong { ping: Injected::new() })
                }))
                .field(Field::single("ping", |pong: &Pong| &pong.ping).inject())
                .build(),
        )
        .build()
        .expect("构建容器失败")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cycle_entered_from_both_ends_by_separate_callers() -> anyhow::Result<()> {
    let container = ping_pong_container();

    let ping = {
        let container = container.clone();
        tokio::spawn(async move { container.resolve::<Ping>().await.map(|_| ()) })
    };
    let pong = {
        let container = container.clone();
        tokio::spawn(async move { container.resolve::<Pong>().await.map(|_| ()) })
    };

    let (ping, pong) = tokio::time::timeout(Duration::from_secs(5), async { (ping.await, pong.await) })
        .await
        .map_err(|_| anyhow::anyhow!("两端同时进入循环时解析未结束"))?;

    let ping_error = ping?.err().expect("Ping 应报告循环依赖");
    let pong_error = pong?.err().expect("Pong 应报告循环依赖");
    assert!(ping_error.is_circular(), "{ping_error}");
    assert!(pong_error.is_circular(), "{pong_error}");
    assert_eq!(container.stats().in_flight, 0);
    assert_eq!(container.stats().cached_singletons, 0);
    Ok(())
}

#[tokio::test]
async fn test_config_file_and_section_drive_container() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("container.toml");
    std::fs::write(
        &path,
        "singleton_by_default = false\nmax_resolution_depth = 16\n\n[server]\nport = 7070\n",
    )?;

    let config = ContainerConfig::load(Some(&path))?;
    assert!(!config.singleton_by_default);
    assert_eq!(config.max_resolution_depth, 16);

    #[derive(Default)]
    struct Server {
        port: Injected<u32>,
        host: Injected<String>,
    }

    let section = ConfigSection::load(&path)?;
    let container = Container::builder()
        .with_config(config)
        .with_extensions(ExtensionSet::new().with_adapter(ConfigValueInjector::new(section)))
        .describe(
            TypeDescriptor::of::<Server>()
                .default_constructor()
                .field(Field::value("port", |s: &Server| &s.port).attribute(CONFIG_ATTRIBUTE, "server.port"))
                .field(Field::value("host", |s: &Server| &s.host).attribute(CONFIG_ATTRIBUTE, "server.host"))
                .build(),
        )
        .build()?;

    let first = container.resolve::<Server>().await?;
    let second = container.resolve::<Server>().await?;
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(first.port.get(), Some(7070));
    assert!(!first.host.is_set());
    Ok(())
}

#[tokio::test]
async fn test_producer_binding_through_builder() -> anyhow::Result<()> {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let container = Container::builder()
        .register_producer(
            Binding::of::<String>().named("greeting"),
            LambdaProducer::new(move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                Ok(format!("hello #{n}"))
            }),
        )
        .build()?;

    assert_eq!(*container.resolve_named::<String>("greeting").await?, "hello #0");
    assert_eq!(*container.resolve_named::<String>("greeting").await?, "hello #1");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    Ok(())
}

struct Greeter;

#[derive(Default)]
struct DemoApp {
    greeter: Injected<Arc<Greeter>>,
    started: AtomicUsize,
}

#[async_trait]
impl Application for DemoApp {
    async fn setup(&self, container: &Container) -> Result<(), BoxError> {
        container.register_instance(Binding::of::<Greeter>(), Arc::new(Greeter))?;
        container.describe(
            TypeDescriptor::of::<DemoApp>()
                .field(Field::single("greeter", |app: &DemoApp| &app.greeter).inject())
                .build(),
        );
        Ok(())
    }

    async fn start(&self, _container: &Container) -> Result<(), BoxError> {
        if self.greeter.is_set() {
            self.started.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_application_bootstrap() {
    let container = Container::new();
    let app = Arc::new(DemoApp::default());

    launch(app.clone(), &container).await.expect("启动失败");

    assert_eq!(app.started.load(Ordering::SeqCst), 1);
    let report = container.release().await;
    assert!(report.is_clean());
    assert!(container.bindings().is_empty());
}
