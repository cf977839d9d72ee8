//! 扩展集合
//!
//! 容器构造时由配置提供的插件能力，代替进程级的自动发现。

use crate::{FieldInjectorAdapter, ImplementationResolver};
use std::sync::Arc;

/// 插件扩展集合
#[derive(Clone, Default)]
pub struct ExtensionSet {
    resolvers: Vec<Arc<dyn ImplementationResolver>>,
    adapters: Vec<Arc<dyn FieldInjectorAdapter>>,
}

impl ExtensionSet {
    /// 创建空集合
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加实现解析器
    pub fn with_resolver(mut self, resolver: impl ImplementationResolver + 'static) -> Self {
        self.resolvers.push(Arc::new(resolver));
        self
    }

    /// 添加字段注入适配器
    pub fn with_adapter(mut self, adapter: impl FieldInjectorAdapter + 'static) -> Self {
        self.adapters.push(Arc::new(adapter));
        self
    }

    /// 实现解析器
    pub fn resolvers(&self) -> &[Arc<dyn ImplementationResolver>] {
        &self.resolvers
    }

    /// 字段注入适配器
    pub fn adapters(&self) -> &[Arc<dyn FieldInjectorAdapter>] {
        &self.adapters
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty() && self.adapters.is_empty()
    }
}

impl std::fmt::Debug for ExtensionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionSet")
            .field("resolvers", &self.resolvers.iter().map(|r| r.name()).collect::<Vec<_>>())
            .field("adapters", &self.adapters.iter().map(|a| a.name()).collect::<Vec<_>>())
            .finish()
    }
}
