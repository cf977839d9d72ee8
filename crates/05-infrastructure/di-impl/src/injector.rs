//! 成员注入器
//!
//! 从基类层到派生层依次处理字段与注入方法。

use crate::context::ResolveContext;
use crate::shared::ContainerCore;
use di_common::{Args, ContainerError, ContainerResult, Instance, TypeDescriptor};
use tracing::debug;

impl ContainerCore {
    /// 对实例执行成员注入
    pub(crate) async fn inject_members_of(
        &self,
        instance: &Instance,
        descriptor: &TypeDescriptor,
        ctx: &ResolveContext,
    ) -> ContainerResult<()> {
        let adapters = self.adapters.read().clone();

        for level in descriptor.levels() {
            for field in level.fields() {
                if field.is_inject() && field.is_mutable() {
                    let value = self.resolve_dependency(field.dependency(), ctx).await?;
                    field.assign(&**instance, value).map_err(|error| {
                        ContainerError::injection_failed(level.owner().name(), field.name(), error)
                    })?;
                    debug!("注入字段 {}.{}", level.owner().short_name(), field.name());
                    continue;
                }

                for adapter in adapters.iter().filter(|adapter| adapter.is_injectable(field)) {
                    debug!(
                        "字段适配器 {} 处理 {}.{}",
                        adapter.name(),
                        level.owner().short_name(),
                        field.name()
                    );
                    adapter.inject(instance, field).await?;
                }
            }

            for method in level.methods().iter().filter(|method| method.is_inject()) {
                let mut values = Vec::with_capacity(method.params().len());
                for param in method.params() {
                    values.push(Some(self.resolve_dependency(param, ctx).await?));
                }
                method
                    .invoke(&**instance, Args::new(method.name(), values))
                    .map_err(|error| {
                        ContainerError::injection_failed(level.owner().name(), method.name(), error)
                    })?;
                debug!("调用注入方法 {}.{}", level.owner().short_name(), method.name());
            }
        }

        Ok(())
    }
}
