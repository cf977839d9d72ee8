//! 字段注入适配器抽象接口

use async_trait::async_trait;
use di_common::{ContainerError, FieldDescriptor, Instance};

/// 字段注入适配器 trait
///
/// 对未标记注入（或不可变）的字段，成员注入器按注册顺序询问每个适配器。
/// 多个适配器可以处理同一字段，重复注入同一实例时必须是安全的。
#[async_trait]
pub trait FieldInjectorAdapter: Send + Sync {
    /// 适配器名称
    fn name(&self) -> &str;

    /// 是否处理该字段
    fn is_injectable(&self, field: &FieldDescriptor) -> bool;

    /// 写入字段
    async fn inject(&self, instance: &Instance, field: &FieldDescriptor) -> Result<(), ContainerError>;
}
