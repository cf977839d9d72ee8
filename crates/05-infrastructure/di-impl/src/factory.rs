//! 组件工厂
//!
//! 选择构造函数、解析参数、调用构造、注入成员并执行生命周期钩子。

use crate::binding::Binding;
use crate::shared::ContainerCore;
use crate::context::ResolveContext;
use crate::engine::Resolved;
use di_common::{
    Args, ConstructorDescriptor, ContainerError, ContainerResult, ErrorKind, TypeDescriptor, Visibility,
};
use tracing::{debug, warn};

impl ContainerCore {
    /// 为绑定构造一个全新的实例
    pub(crate) async fn construct(&self, binding: &Binding, ctx: &ResolveContext) -> ContainerResult<Resolved> {
        let target = binding.construct_target();
        let qualifier = binding.qualifier();
        let descriptor = self.catalog.get(&target).ok_or_else(|| {
            ContainerError::failed_instantiation(target.name(), qualifier, "缺少类型描述")
        })?;

        let constructor = self.select_constructor(&descriptor, qualifier)?;
        let inject_all = constructor.is_injectable()
            || (self.config.implicit_sole_constructor_injection && descriptor.constructors().len() == 1);

        let mut values = Vec::with_capacity(constructor.params().len());
        for param in constructor.params() {
            if inject_all || param.is_inject() {
                let value = self
                    .resolve_dependency(param, ctx)
                    .await
                    .map_err(|error| wrap_cycle(binding, error))?;
                values.push(Some(value));
            } else {
                values.push(None);
            }
        }

        debug!("调用构造函数 {}::{}", target, constructor.name());
        let args = Args::new(target.name(), values);
        let invoker = constructor.invoker();
        let value = self
            .runner
            .run_blocking(Box::new(move || invoker(args)))
            .await
            .map_err(|error| ContainerError::instantiation_caused_by(target.name(), qualifier, error))?;

        self.inject_members_of(&value, &descriptor, ctx).await?;

        for level in descriptor.levels() {
            for hook in level.post_construct() {
                hook.invoke(&*value).map_err(|error| {
                    ContainerError::instantiation_caused_by(target.name(), qualifier, error)
                })?;
            }
        }

        if let Some(initializer) = descriptor.initializer() {
            initializer(value.clone()).await.map_err(|error| {
                ContainerError::instantiation_caused_by(target.name(), qualifier, error)
            })?;
        }

        Ok(Resolved { value, runtime: target })
    }

    /// 非私有构造函数中，标记为可注入的排在前面，取第一个
    fn select_constructor<'d>(
        &self,
        descriptor: &'d TypeDescriptor,
        qualifier: &str,
    ) -> ContainerResult<&'d ConstructorDescriptor> {
        let mut candidates: Vec<&ConstructorDescriptor> = descriptor
            .constructors()
            .iter()
            .filter(|constructor| constructor.visibility() != Visibility::Private)
            .collect();
        candidates.sort_by_key(|constructor| !constructor.is_injectable());

        let injectable = candidates.iter().filter(|c| c.is_injectable()).count();
        let ambiguous = injectable > 1 || (injectable == 0 && candidates.len() > 1);
        if ambiguous && self.config.warn_on_ambiguous_constructor {
            warn!(
                "类型 {} 有 {} 个候选构造函数，使用第一个",
                descriptor.type_info(),
                candidates.len()
            );
        }

        candidates.first().copied().ok_or_else(|| {
            ContainerError::failed_instantiation(descriptor.type_info().name(), qualifier, "没有可用的构造函数")
        })
    }
}

/// 参数解析中的循环依赖在当前构造边界被包装为实例化失败
fn wrap_cycle(binding: &Binding, error: ContainerError) -> ContainerError {
    if error.kind() != ErrorKind::CircularDependency {
        return error;
    }
    ContainerError::FailedInstantiation {
        type_name: binding.construct_target().name().to_string(),
        qualifier: binding.qualifier().to_string(),
        message: error.to_string(),
        source: Some(Box::new(error)),
    }
}
