//! # 示例应用程序
//!
//! 演示派生组件、命名绑定、配置值注入与容器托管的启动和释放流程

use async_trait::async_trait;
use clap::Parser;
use component_macros::Component;
use di_abstractions::LambdaProducer;
use di_common::{BoxError, ConfigSection, ContainerConfig, Disposable, Injected, InstanceSet};
use di_impl::{launch, Application, Binding, ConfigValueInjector, Container};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "组件容器示例应用")]
struct Args {
    /// 容器配置文件路径
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 应用配置文件路径，供配置值注入使用
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// 消息通道
pub trait Channel: Send + Sync {
    /// 通道名称
    fn name(&self) -> &str;
    /// 发送消息
    fn send(&self, message: &str) -> u64;
}

/// 默认通道
#[derive(Default, Component)]
#[component(primary, provides(dyn Channel))]
pub struct ChannelImpl {
    sent: AtomicU64,
}

impl Channel for ChannelImpl {
    fn name(&self) -> &str {
        "console"
    }

    fn send(&self, message: &str) -> u64 {
        info!("[console] {}", message);
        self.sent.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// 审计通道
#[derive(Default, Component)]
#[component(singleton, named = "audit", provides(dyn Channel), disposable)]
pub struct AuditChannel {
    sent: AtomicU64,
}

impl Channel for AuditChannel {
    fn name(&self) -> &str {
        "audit"
    }

    fn send(&self, message: &str) -> u64 {
        info!("[audit] {}", message);
        self.sent.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[async_trait]
impl Disposable for AuditChannel {
    async fn dispose(&self) -> Result<(), BoxError> {
        info!("审计通道关闭，共记录 {} 条", self.sent.load(Ordering::SeqCst));
        Ok(())
    }
}

/// 通知服务
#[derive(Default, Component)]
#[component(singleton)]
pub struct Notifier {
    #[inject]
    channel: Injected<Arc<dyn Channel>>,
    #[inject(named = "audit")]
    audit: Injected<Arc<dyn Channel>>,
    #[inject]
    broadcast: Injected<InstanceSet<dyn Channel>>,
    #[config(path = "notifier.prefix")]
    prefix: Injected<String>,
}

impl Notifier {
    fn notify(&self, message: &str) -> Result<(), BoxError> {
        let prefix = self.prefix.get().unwrap_or_default();
        let text = format!("{prefix}{message}");

        self.channel.get().ok_or("通道未注入")?.send(&text);
        self.audit.get().ok_or("审计通道未注入")?.send(&text);

        let targets = self.broadcast.get().ok_or("广播集合未注入")?;
        let names: Vec<_> = targets.iter().map(|channel| channel.name().to_string()).collect();
        info!("广播目标: {:?}", names);
        Ok(())
    }
}

/// 示例应用
#[derive(Default, Component)]
#[component(no_default)]
struct DemoApp {
    #[inject]
    notifier: Injected<Arc<Notifier>>,
    #[inject]
    greeting: Injected<Arc<String>>,
}

#[async_trait]
impl Application for DemoApp {
    async fn setup(&self, container: &Container) -> Result<(), BoxError> {
        container.describe_type::<ChannelImpl>();
        container.describe_type::<AuditChannel>();
        container.describe_type::<Notifier>();
        container.describe_type::<DemoApp>();

        container.register(Binding::of::<dyn Channel>().to::<ChannelImpl>())?;
        container.register(Binding::of::<dyn Channel>().to::<AuditChannel>())?;
        container.register_producer(
            Binding::of::<String>(),
            LambdaProducer::new(|| Ok(String::from("你好，容器"))),
        )?;
        Ok(())
    }

    async fn start(&self, _container: &Container) -> Result<(), BoxError> {
        let greeting = self.greeting.get().ok_or("问候语未注入")?;
        self.notifier.get().ok_or("通知服务未注入")?.notify(&greeting)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)))
        .init();

    info!("启动组件容器示例应用");

    let config = ContainerConfig::load(args.config.as_deref())?;
    info!("容器配置: {:?}", config);

    let settings = match &args.settings {
        Some(path) => ConfigSection::load(path)?,
        None => {
            let mut section = ConfigSection::new();
            section.insert("notifier", serde_json::json!({ "prefix": "[demo] " }));
            section
        }
    };

    let container = Container::builder()
        .with_config(config)
        .build()?;
    container.add_field_injector_adapter(ConfigValueInjector::new(settings));

    let app = Arc::new(DemoApp::default());
    if let Err(error) = launch(app, &container).await {
        warn!("应用启动失败: {}", error);
    }

    let stats = container.stats();
    info!(
        "绑定数 {}，已缓存单例 {}",
        stats.registered_bindings, stats.cached_singletons
    );

    let report = container.release().await;
    for failure in &report.failures {
        warn!("释放 {} 失败: {}", failure.type_name, failure.error);
    }
    info!("应用已关闭，释放实例 {} 个", report.disposed);
    Ok(())
}
