//! 绑定注册表
//!
//! 保存绑定、校验注册不变量，并按请求类型建立索引。

use crate::binding::{Binding, BindingKind, Key};
use crate::shared::ContainerCore;
use di_common::{ContainerError, ContainerResult, TypeCatalog, TypeInfo};
use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Default)]
struct RegistryInner {
    /// 按注册顺序保存的绑定
    bindings: IndexMap<Key, Arc<Binding>>,
    /// 请求类型到键的索引
    type_index: HashMap<TypeInfo, IndexSet<Key>>,
}

/// 绑定注册表
#[derive(Default)]
pub(crate) struct BindingRegistry {
    inner: RwLock<RegistryInner>,
}

impl BindingRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// 插入绑定，重复键和第二个主实现都会被拒绝
    pub(crate) fn insert(&self, binding: Binding) -> ContainerResult<Arc<Binding>> {
        let mut inner = self.inner.write();
        Self::insert_locked(&mut inner, binding)
    }

    /// 插入绑定，键已存在时返回已有绑定
    pub(crate) fn insert_or_get(&self, binding: Binding) -> ContainerResult<Arc<Binding>> {
        let mut inner = self.inner.write();
        if let Some(existing) = inner.bindings.get(&binding.key()) {
            return Ok(existing.clone());
        }
        Self::insert_locked(&mut inner, binding)
    }

    fn insert_locked(inner: &mut RegistryInner, binding: Binding) -> ContainerResult<Arc<Binding>> {
        let key = binding.key();
        if inner.bindings.contains_key(&key) {
            return Err(ContainerError::DuplicateBinding {
                type_name: key.type_info().name().to_string(),
                qualifier: key.qualifier().to_string(),
            });
        }

        if binding.is_primary() {
            let has_primary = inner
                .type_index
                .get(binding.requested())
                .into_iter()
                .flatten()
                .filter_map(|existing| inner.bindings.get(existing))
                .any(|existing| existing.is_primary());
            if has_primary {
                return Err(ContainerError::TooManyPrimaryImplementations {
                    type_name: key.type_info().name().to_string(),
                    qualifier: key.qualifier().to_string(),
                });
            }
        }

        let binding = Arc::new(binding);
        inner
            .type_index
            .entry(*binding.requested())
            .or_default()
            .insert(key.clone());
        inner.bindings.insert(key, binding.clone());
        info!("注册绑定: {}", binding);
        Ok(binding)
    }

    pub(crate) fn get(&self, key: &Key) -> Option<Arc<Binding>> {
        self.inner.read().bindings.get(key).cloned()
    }

    /// 候选绑定：请求类型恰为 `ty` 的绑定在前，随后是请求类型可赋值给 `ty` 的绑定
    pub(crate) fn candidates(&self, ty: &TypeInfo, catalog: &TypeCatalog) -> Vec<Arc<Binding>> {
        let inner = self.inner.read();
        let mut candidates: Vec<Arc<Binding>> = inner
            .type_index
            .get(ty)
            .into_iter()
            .flatten()
            .filter_map(|key| inner.bindings.get(key).cloned())
            .collect();
        candidates.extend(
            inner
                .bindings
                .values()
                .filter(|binding| binding.requested() != ty && catalog.is_assignable(binding.requested(), ty))
                .cloned(),
        );
        candidates
    }

    /// 请求类型可赋值给 `ty` 的全部绑定，按注册顺序
    pub(crate) fn assignable_to(&self, ty: &TypeInfo, catalog: &TypeCatalog) -> Vec<Arc<Binding>> {
        self.inner
            .read()
            .bindings
            .values()
            .filter(|binding| catalog.is_assignable(binding.requested(), ty))
            .cloned()
            .collect()
    }

    pub(crate) fn all(&self) -> Vec<Arc<Binding>> {
        self.inner.read().bindings.values().cloned().collect()
    }

    pub(crate) fn contains_type(&self, ty: &TypeInfo) -> bool {
        self.inner
            .read()
            .type_index
            .get(ty)
            .is_some_and(|keys| !keys.is_empty())
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.read().bindings.len()
    }

    pub(crate) fn clear(&self) {
        let mut inner = self.inner.write();
        inner.bindings.clear();
        inner.type_index.clear();
    }
}

impl ContainerCore {
    /// 补全目标类型、校验绑定并计算有效的单例、主实现标记
    pub(crate) fn prepare(&self, binding: Binding) -> ContainerResult<Binding> {
        let requested = *binding.requested();
        let target = match binding.target() {
            Some(target) => *target,
            None => match self.discover(&requested, binding.qualifier())? {
                Some(found) => found,
                None if requested.is_abstract() => {
                    return Err(ContainerError::NoImplementationRegistered {
                        type_name: requested.name().to_string(),
                        qualifier: binding.qualifier().to_string(),
                    })
                }
                None => requested,
            },
        };

        match binding.kind() {
            BindingKind::Constructed if target.is_abstract() => {
                return Err(invalid_binding(&requested, &target, "目标类型是抽象类型"));
            }
            BindingKind::Constructed | BindingKind::Instance
                if !self.catalog.is_assignable(&target, &requested) =>
            {
                return Err(invalid_binding(&requested, &target, "目标类型不能赋值给请求类型"));
            }
            _ => {}
        }

        let qualifier = if binding.qualifier().is_empty() {
            self.inspector.qualifier_of(&target)
        } else {
            binding.qualifier().to_string()
        };

        let inspector = &self.inspector;
        let singleton = binding.is_singleton()
            || inspector.is_singleton(&requested)
            || inspector.is_singleton(&target)
            || (self.config.singleton_by_default
                && !inspector.is_prototype(&requested)
                && !inspector.is_prototype(&target));
        let primary =
            binding.is_primary() || inspector.is_primary(&requested) || inspector.is_primary(&target);

        Ok(binding
            .named(qualifier)
            .to_type(target)
            .singleton(singleton)
            .primary(primary))
    }

    /// 注册绑定
    pub(crate) fn register(&self, binding: Binding) -> ContainerResult<Arc<Binding>> {
        let binding = self.prepare(binding)?;
        self.registry.insert(binding)
    }

    /// 按类型与限定符查找绑定，必要时合成隐式绑定
    pub(crate) fn find_binding(&self, ty: &TypeInfo, qualifier: &str) -> ContainerResult<Arc<Binding>> {
        match self.select_candidate(ty, qualifier)? {
            Some(binding) => Ok(binding),
            None => self.synthesize(ty),
        }
    }

    /// 与 [`find_binding`](Self::find_binding) 相同，但没有候选时返回 `None` 而不合成
    pub(crate) fn lookup_binding(&self, ty: &TypeInfo, qualifier: &str) -> ContainerResult<Option<Arc<Binding>>> {
        self.select_candidate(ty, qualifier)
    }

    fn select_candidate(&self, ty: &TypeInfo, qualifier: &str) -> ContainerResult<Option<Arc<Binding>>> {
        let candidates = self.registry.candidates(ty, &self.catalog);

        if !qualifier.is_empty() {
            return candidates
                .into_iter()
                .find(|binding| binding.qualifier() == qualifier)
                .map(Some)
                .ok_or_else(|| ContainerError::NoQualifierRegistered {
                    type_name: ty.name().to_string(),
                    qualifier: qualifier.to_string(),
                });
        }

        match candidates.len() {
            0 => Ok(None),
            1 => Ok(candidates.into_iter().next()),
            count => candidates
                .into_iter()
                .find(|binding| binding.is_primary())
                .map(Some)
                .ok_or_else(|| ContainerError::TooManyCandidates {
                    type_name: ty.name().to_string(),
                    qualifier: qualifier.to_string(),
                    candidates: count,
                }),
        }
    }

    fn synthesize(&self, ty: &TypeInfo) -> ContainerResult<Arc<Binding>> {
        let target = match self.discover(ty, "")? {
            Some(found) => found,
            None if ty.is_abstract() => {
                return Err(ContainerError::NoImplementationRegistered {
                    type_name: ty.name().to_string(),
                    qualifier: String::new(),
                })
            }
            None => *ty,
        };
        let binding = self.prepare(Binding::for_type(*ty).to_type(target))?;
        debug!("合成隐式绑定: {}", binding);
        self.registry.insert_or_get(binding)
    }

    /// 依次询问实现解析器，第一个非空结果胜出
    pub(crate) fn discover(&self, ty: &TypeInfo, qualifier: &str) -> ContainerResult<Option<TypeInfo>> {
        let resolvers = self.resolvers.read().clone();
        for resolver in resolvers {
            let Some(candidate) = resolver.resolve(ty, &self.catalog) else {
                continue;
            };
            debug!("实现解析器 {} 为 {} 找到 {}", resolver.name(), ty, candidate);
            if !qualifier.is_empty() && self.inspector.qualifier_of(&candidate) != qualifier {
                return Err(ContainerError::NoQualifierRegistered {
                    type_name: ty.name().to_string(),
                    qualifier: qualifier.to_string(),
                });
            }
            return Ok(Some(candidate));
        }
        Ok(None)
    }
}

fn invalid_binding(requested: &TypeInfo, target: &TypeInfo, reason: &str) -> ContainerError {
    ContainerError::InvalidBinding {
        type_name: requested.name().to_string(),
        target: target.name().to_string(),
        reason: reason.to_string(),
    }
}
