//! 容器核心状态
//!
//! 注册表、解析引擎、组件工厂和成员注入器共享的唯一所有者。
//! 各部分的行为分别在注册表、引擎、工厂与注入器模块中实现。

use crate::engine::ResolutionEngine;
use crate::registry::BindingRegistry;
use di_abstractions::{AnnotationInspector, FieldInjectorAdapter, ImplementationResolver, TaskRunner};
use di_common::{ContainerConfig, TypeCatalog};
use parking_lot::RwLock;
use std::sync::Arc;

pub(crate) struct ContainerCore {
    pub(crate) config: ContainerConfig,
    pub(crate) catalog: Arc<TypeCatalog>,
    pub(crate) inspector: Arc<dyn AnnotationInspector>,
    pub(crate) runner: Arc<dyn TaskRunner>,
    pub(crate) resolvers: RwLock<Vec<Arc<dyn ImplementationResolver>>>,
    pub(crate) adapters: RwLock<Vec<Arc<dyn FieldInjectorAdapter>>>,
    pub(crate) registry: BindingRegistry,
    pub(crate) engine: ResolutionEngine,
}

impl ContainerCore {
    pub(crate) fn new(
        config: ContainerConfig,
        catalog: Arc<TypeCatalog>,
        inspector: Arc<dyn AnnotationInspector>,
        runner: Arc<dyn TaskRunner>,
        resolvers: Vec<Arc<dyn ImplementationResolver>>,
        adapters: Vec<Arc<dyn FieldInjectorAdapter>>,
    ) -> Self {
        Self {
            config,
            catalog,
            inspector,
            runner,
            resolvers: RwLock::new(resolvers),
            adapters: RwLock::new(adapters),
            registry: BindingRegistry::new(),
            engine: ResolutionEngine::new(),
        }
    }
}
