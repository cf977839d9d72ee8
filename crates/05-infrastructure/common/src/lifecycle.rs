//! 组件生命周期能力

use crate::errors::BoxError;
use async_trait::async_trait;

/// 异步初始化能力
///
/// 构造、成员注入和构造后钩子全部完成后由工厂等待执行。
#[async_trait]
pub trait AsyncInitializing: Send + Sync {
    /// 属性设置完成后的初始化
    async fn after_properties_set(&self) -> Result<(), BoxError>;
}

/// 释放能力
///
/// 容器释放时对已缓存的实例尽力调用，失败会被收集而不会中断释放。
#[async_trait]
pub trait Disposable: Send + Sync {
    /// 释放资源
    async fn dispose(&self) -> Result<(), BoxError>;
}
