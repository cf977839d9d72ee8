//! 容器门面
//!
//! [`Container`] 是调用方持有的唯一入口，克隆代价很低，所有克隆共享同一份状态。

use crate::binding::{Binding, BindingKind, BindingState, Key};
use crate::context::ResolveContext;
use crate::shared::ContainerCore;
use crate::engine::Holder;
use crate::inspector::DescriptorInspector;
use crate::resolvers::{ConventionResolver, ImplementedByResolver};
use crate::runners::{InlineTaskRunner, TokioTaskRunner};
use di_abstractions::{
    AnnotationInspector, ErasedProducer, ExtensionSet, FieldInjectorAdapter, ImplementationResolver,
    InstanceProducer, TaskRunner,
};
use di_common::{
    BoxError, BoxValue, ContainerConfig, ContainerError, ContainerResult, Describe, ErrorKind, Instance,
    TypeCatalog, TypeDescriptor, TypeInfo,
};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 组件容器
#[derive(Clone)]
pub struct Container {
    core: Arc<ContainerCore>,
}

impl Container {
    /// 使用默认配置创建容器
    pub fn new() -> Self {
        Self::builder().assemble().0
    }

    /// 使用给定配置创建容器
    pub fn from_config(config: ContainerConfig) -> Self {
        Self::builder().with_config(config).assemble().0
    }

    /// 创建容器构建器
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    /// 容器配置
    pub fn config(&self) -> &ContainerConfig {
        &self.core.config
    }

    /// 类型目录
    pub fn catalog(&self) -> &Arc<TypeCatalog> {
        &self.core.catalog
    }

    /// 登记类型描述符
    pub fn describe(&self, descriptor: TypeDescriptor) {
        self.core.catalog.describe(descriptor);
    }

    /// 登记能自我描述的类型
    pub fn describe_type<T: Describe>(&self) {
        self.describe(T::descriptor());
    }

    // ---- 注册 ----

    /// 注册绑定，目标缺省时通过实现发现补全
    pub fn register(&self, binding: Binding) -> ContainerResult<()> {
        self.core.register(binding)?;
        Ok(())
    }

    /// 以已构造的实例注册单例绑定，目标类型取实例的具体类型
    pub fn register_instance<T: Send + Sync + 'static>(&self, binding: Binding, instance: Arc<T>) -> ContainerResult<()> {
        self.core.catalog.ensure::<T>();
        let runtime = TypeInfo::of::<T>();
        let binding = self.core.prepare(
            binding
                .to_type(runtime)
                .with_kind(BindingKind::Instance)
                .singleton(true),
        )?;
        let holder = Holder::Instance {
            value: instance,
            runtime,
        };
        self.core
            .engine
            .bind_holder(|| self.core.registry.insert(binding), holder)?;
        Ok(())
    }

    /// 注册生产者占位绑定，每次解析都会调用生产者
    pub fn register_producer<P: InstanceProducer>(&self, binding: Binding, producer: P) -> ContainerResult<()> {
        self.core.catalog.ensure::<P::Output>();
        let output = TypeInfo::of::<P::Output>();
        let binding = self
            .core
            .prepare(binding.to_type(output).with_kind(BindingKind::Producer))?;
        let producer: Arc<dyn ErasedProducer> = Arc::new(producer);
        self.core
            .engine
            .bind_holder(|| self.core.registry.insert(binding), Holder::Producer(producer))?;
        Ok(())
    }

    // ---- 解析 ----

    /// 解析无限定符的 `R`
    pub async fn resolve<R: ?Sized + Send + Sync + 'static>(&self) -> ContainerResult<Arc<R>> {
        self.resolve_named::<R>("").await
    }

    /// 按限定符解析 `R`
    pub async fn resolve_named<R: ?Sized + Send + Sync + 'static>(&self, qualifier: &str) -> ContainerResult<Arc<R>> {
        let requested = TypeInfo::of::<R>();
        let binding = self.core.find_binding(&requested, qualifier)?;
        let ctx = ResolveContext::new();
        let resolved = self.core.resolve(binding, &ctx).await?;
        unbox::<R>(self.core.cast(resolved, &requested)?)
    }

    /// 解析全部可赋值给 `R` 的绑定，按注册顺序
    pub async fn resolve_many<R: ?Sized + Send + Sync + 'static>(&self) -> ContainerResult<Vec<Arc<R>>> {
        let requested = TypeInfo::of::<R>();
        let ctx = ResolveContext::new();
        self.core
            .resolve_many(&requested, &ctx)
            .await?
            .into_iter()
            .map(unbox::<R>)
            .collect()
    }

    /// 总是构造一个全新的 `T`，忽略已有绑定与缓存
    pub async fn create<T: Send + Sync + 'static>(&self) -> ContainerResult<Arc<T>> {
        let binding = Binding::of::<T>().to::<T>();
        let ctx = ResolveContext::new().enter(binding.key());
        let resolved = self.core.construct(&binding, &ctx).await?;
        resolved.value.downcast::<T>().map_err(|_| {
            ContainerError::failed_instantiation(
                std::any::type_name::<T>(),
                "",
                format!("构造结果的类型为 {}", resolved.runtime),
            )
        })
    }

    /// 按需提供 `R`：没有显式绑定且发现不到实现时返回 `None`，否则构造新实例
    ///
    /// 已缓存的实例或生产者仍然使用缓存项。
    pub async fn provide<R: ?Sized + Send + Sync + 'static>(&self) -> ContainerResult<Option<Arc<R>>> {
        self.provide_named::<R>("").await
    }

    /// 按限定符按需提供 `R`
    pub async fn provide_named<R: ?Sized + Send + Sync + 'static>(
        &self,
        qualifier: &str,
    ) -> ContainerResult<Option<Arc<R>>> {
        let requested = TypeInfo::of::<R>();
        let explicit = match self.core.lookup_binding(&requested, qualifier) {
            Ok(found) => found,
            Err(error) if error.kind() == ErrorKind::NoQualifierRegistered => None,
            Err(error) => return Err(error),
        };

        let binding = match explicit {
            Some(binding) => binding,
            None => match self.core.discover(&requested, qualifier)? {
                Some(target) => Arc::new(
                    self.core
                        .prepare(Binding::for_type(requested).named(qualifier).to_type(target))?,
                ),
                None => {
                    debug!("没有可提供的实现: {}", requested);
                    return Ok(None);
                }
            },
        };

        let key = binding.key();
        let resolved = match self.core.engine.holder(&key) {
            Some(holder) => self.core.from_holder(&key, holder).await?,
            None => {
                let ctx = ResolveContext::new().enter(key);
                self.core.construct(&binding, &ctx).await?
            }
        };
        unbox::<R>(self.core.cast(resolved, &requested)?).map(Some)
    }

    /// 对外部构造的实例执行成员注入
    pub async fn inject_members<T: Send + Sync + 'static>(&self, instance: &Arc<T>) -> ContainerResult<()> {
        let ty = TypeInfo::of::<T>();
        let Some(descriptor) = self.core.catalog.get(&ty) else {
            debug!("类型 {} 没有描述符，跳过成员注入", ty);
            return Ok(());
        };
        let value: Instance = instance.clone();
        self.core
            .inject_members_of(&value, &descriptor, &ResolveContext::new())
            .await
    }

    // ---- 扩展 ----

    /// 追加实现解析器
    pub fn add_implementation_resolver(&self, resolver: impl ImplementationResolver + 'static) {
        info!("添加实现解析器: {}", resolver.name());
        self.core.resolvers.write().push(Arc::new(resolver));
    }

    /// 追加字段注入适配器
    pub fn add_field_injector_adapter(&self, adapter: impl FieldInjectorAdapter + 'static) {
        info!("添加字段注入适配器: {}", adapter.name());
        self.core.adapters.write().push(Arc::new(adapter));
    }

    // ---- 生命周期与诊断 ----

    /// 释放容器：对缓存中声明了释放能力的实例尽力调用释放钩子，然后清空注册表与缓存
    ///
    /// 同一实例被多个绑定缓存时只释放一次。
    pub async fn release(&self) -> ReleaseReport {
        let mut report = ReleaseReport::default();
        let mut seen = HashSet::new();

        for (key, value, runtime) in self.core.engine.cached_instances() {
            if !seen.insert(Arc::as_ptr(&value).cast::<()>() as usize) {
                continue;
            }
            let Some(disposer) = self
                .core
                .catalog
                .get(&runtime)
                .and_then(|descriptor| descriptor.disposer().cloned())
            else {
                continue;
            };

            match disposer(value).await {
                Ok(()) => {
                    debug!("已释放: {}", key);
                    report.disposed += 1;
                }
                Err(error) => {
                    warn!("释放 {} 失败: {}", key, error);
                    report.failures.push(DisposalFailure {
                        type_name: runtime.name().to_string(),
                        error,
                    });
                }
            }
        }

        self.core.engine.clear(&self.core.registry);
        info!(
            "容器已释放: 释放 {} 个实例, {} 个失败",
            report.disposed,
            report.failures.len()
        );
        report
    }

    /// 绑定的解析状态
    pub fn binding_state(&self, key: &Key) -> BindingState {
        self.core.engine.state(key)
    }

    /// 全部绑定，按注册顺序
    pub fn bindings(&self) -> Vec<Arc<Binding>> {
        self.core.registry.all()
    }

    /// 是否存在请求类型恰为 `R` 的绑定
    pub fn is_registered<R: ?Sized + 'static>(&self) -> bool {
        self.core.registry.contains_type(&TypeInfo::of::<R>())
    }

    /// 运行时统计
    pub fn stats(&self) -> ContainerStats {
        ContainerStats {
            registered_bindings: self.core.registry.len(),
            cached_singletons: self.core.engine.cached_instances().len(),
            in_flight: self.core.engine.in_flight_count(),
        }
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("config", &self.core.config)
            .field("stats", &self.stats())
            .finish()
    }
}

fn unbox<R: ?Sized + Send + Sync + 'static>(value: BoxValue) -> ContainerResult<Arc<R>> {
    value.downcast::<Arc<R>>().map(|value| *value).map_err(|_| {
        ContainerError::failed_instantiation(std::any::type_name::<R>(), "", "解析结果类型不匹配")
    })
}

/// 运行时统计
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerStats {
    /// 已注册的绑定数
    pub registered_bindings: usize,
    /// 已缓存的单例实例数
    pub cached_singletons: usize,
    /// 正在构造的绑定数
    pub in_flight: usize,
}

/// 单个实例的释放失败
#[derive(Debug)]
pub struct DisposalFailure {
    /// 实例的具体类型
    pub type_name: String,
    /// 释放钩子返回的错误
    pub error: BoxError,
}

/// 释放结果
#[derive(Debug, Default)]
pub struct ReleaseReport {
    /// 成功释放的实例数
    pub disposed: usize,
    /// 释放失败的实例
    pub failures: Vec<DisposalFailure>,
}

impl ReleaseReport {
    /// 是否全部释放成功
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

type PendingRegistration = Box<dyn FnOnce(&Container) -> ContainerResult<()> + Send>;

/// 容器构建器
pub struct ContainerBuilder {
    config: ContainerConfig,
    extensions: ExtensionSet,
    runner: Option<Arc<dyn TaskRunner>>,
    inspector: Option<Arc<dyn AnnotationInspector>>,
    catalog: Arc<TypeCatalog>,
    pending: Vec<PendingRegistration>,
}

impl ContainerBuilder {
    /// 创建构建器
    pub fn new() -> Self {
        Self {
            config: ContainerConfig::default(),
            extensions: ExtensionSet::new(),
            runner: None,
            inspector: None,
            catalog: Arc::new(TypeCatalog::new()),
            pending: Vec::new(),
        }
    }

    /// 设置配置
    pub fn with_config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// 设置插件扩展集合
    pub fn with_extensions(mut self, extensions: ExtensionSet) -> Self {
        self.extensions = extensions;
        self
    }

    /// 设置构造任务执行器，覆盖 `blocking_construction` 的选择
    pub fn with_task_runner(mut self, runner: impl TaskRunner + 'static) -> Self {
        self.runner = Some(Arc::new(runner));
        self
    }

    /// 设置元数据检查器
    pub fn with_inspector(mut self, inspector: impl AnnotationInspector + 'static) -> Self {
        self.inspector = Some(Arc::new(inspector));
        self
    }

    /// 使用已有的类型目录
    pub fn with_catalog(mut self, catalog: Arc<TypeCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    /// 登记类型描述符
    pub fn describe(self, descriptor: TypeDescriptor) -> Self {
        self.catalog.describe(descriptor);
        self
    }

    /// 登记能自我描述的类型
    pub fn describe_type<T: Describe>(self) -> Self {
        self.describe(T::descriptor())
    }

    /// 构建时注册绑定
    pub fn register(mut self, binding: Binding) -> Self {
        self.pending
            .push(Box::new(move |container: &Container| container.register(binding)));
        self
    }

    /// 构建时注册实例
    pub fn register_instance<T: Send + Sync + 'static>(mut self, binding: Binding, instance: Arc<T>) -> Self {
        self.pending.push(Box::new(move |container: &Container| {
            container.register_instance(binding, instance)
        }));
        self
    }

    /// 构建时注册生产者
    pub fn register_producer<P: InstanceProducer>(mut self, binding: Binding, producer: P) -> Self {
        self.pending.push(Box::new(move |container: &Container| {
            container.register_producer(binding, producer)
        }));
        self
    }

    /// 构建容器并执行登记的注册
    pub fn build(self) -> ContainerResult<Container> {
        let (container, pending) = self.assemble();
        for registration in pending {
            registration(&container)?;
        }
        info!("容器已创建: {} 个绑定", container.core.registry.len());
        Ok(container)
    }

    fn assemble(self) -> (Container, Vec<PendingRegistration>) {
        let Self {
            config,
            extensions,
            runner,
            inspector,
            catalog,
            pending,
        } = self;

        let runner: Arc<dyn TaskRunner> = match runner {
            Some(runner) => runner,
            None if config.blocking_construction => Arc::new(TokioTaskRunner),
            None => Arc::new(InlineTaskRunner),
        };
        let inspector: Arc<dyn AnnotationInspector> = match inspector {
            Some(inspector) => inspector,
            None => Arc::new(DescriptorInspector::new(catalog.clone())),
        };

        let mut resolvers: Vec<Arc<dyn ImplementationResolver>> =
            vec![Arc::new(ConventionResolver), Arc::new(ImplementedByResolver)];
        resolvers.extend(extensions.resolvers().iter().cloned());

        let adapters = if config.ignore_auto_injectors {
            if !extensions.adapters().is_empty() {
                info!("已忽略 {} 个插件字段注入适配器", extensions.adapters().len());
            }
            Vec::new()
        } else {
            extensions.adapters().to_vec()
        };

        debug!(
            "组装容器: 执行器 {}, {} 个实现解析器, {} 个字段适配器",
            runner.name(),
            resolvers.len(),
            adapters.len()
        );
        let core = ContainerCore::new(config, catalog, inspector, runner, resolvers, adapters);
        (
            Container {
                core: Arc::new(core),
            },
            pending,
        )
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ContainerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerBuilder")
            .field("config", &self.config)
            .field("extensions", &self.extensions)
            .field("catalog", &self.catalog)
            .field("pending", &self.pending.len())
            .finish()
    }
}
