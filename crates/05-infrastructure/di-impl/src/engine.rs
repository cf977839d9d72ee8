//! 解析引擎
//!
//! 每个绑定独立维护 UNRESOLVED → IN_PROGRESS → RESOLVED 状态：
//! 无关的单例可以并发构造；同一解析在构造期间重新进入自身时报告循环依赖，
//! 其他解析则等待构造完成后复用结果。

use crate::binding::{Binding, BindingState, Key};
use crate::context::{ResolutionId, ResolveContext};
use crate::shared::ContainerCore;
use crate::registry::BindingRegistry;
use dashmap::DashMap;
use di_abstractions::ErasedProducer;
use di_common::{BoxValue, Cardinality, ContainerError, ContainerResult, Dependency, Instance, TypeInfo};
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// 缓存项：单例实例或生产者
#[derive(Clone)]
pub(crate) enum Holder {
    Instance { value: Instance, runtime: TypeInfo },
    Producer(Arc<dyn ErasedProducer>),
}

/// 一次解析的结果，`runtime` 为实例的具体类型
pub(crate) struct Resolved {
    pub(crate) value: Instance,
    pub(crate) runtime: TypeInfo,
}

struct Slot {
    owner: ResolutionId,
    done: watch::Sender<bool>,
}

#[derive(Default)]
struct InFlightTable {
    slots: HashMap<Key, Slot>,
    /// 正在等待他人构造的解析及其等待的键
    waiting: HashMap<ResolutionId, Key>,
}

impl InFlightTable {
    /// `owner` 是否（直接或经等待链）在等待 `me`
    fn waits_on(&self, owner: ResolutionId, me: ResolutionId) -> bool {
        let mut visited = HashSet::new();
        let mut current = owner;
        while visited.insert(current) {
            if current == me {
                return true;
            }
            let Some(slot) = self.waiting.get(&current).and_then(|key| self.slots.get(key)) else {
                return false;
            };
            current = slot.owner;
        }
        false
    }
}

enum Claim<'a> {
    Cached(Holder),
    Build(InFlightGuard<'a>),
    Wait(watch::Receiver<bool>, WaitGuard<'a>),
}

/// 构造权，未正常结束（失败或被取消）时在析构中释放槽位
struct InFlightGuard<'a> {
    engine: &'a ResolutionEngine,
    key: Key,
    owner: ResolutionId,
    finished: bool,
}

impl InFlightGuard<'_> {
    /// 结束构造；槽位已被 [`clear`](ResolutionEngine::clear) 收回时结果不再缓存
    fn finish(mut self, holder: Option<Holder>) {
        self.finished = true;
        let mut table = self.engine.in_flight.lock();
        if !table.slots.get(&self.key).is_some_and(|slot| slot.owner == self.owner) {
            debug!("构造期间容器已释放，丢弃结果: {}", self.key);
            return;
        }
        if let Some(holder) = holder {
            self.engine.holders.insert(self.key.clone(), holder);
        }
        if let Some(slot) = table.slots.remove(&self.key) {
            let _ = slot.done.send(true);
        }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let mut table = self.engine.in_flight.lock();
        if table.slots.get(&self.key).is_some_and(|slot| slot.owner == self.owner) {
            table.slots.remove(&self.key);
        }
    }
}

struct WaitGuard<'a> {
    engine: &'a ResolutionEngine,
    id: ResolutionId,
}

impl Drop for WaitGuard<'_> {
    fn drop(&mut self) {
        self.engine.in_flight.lock().waiting.remove(&self.id);
    }
}

/// 缓存与构造中集合
#[derive(Default)]
pub(crate) struct ResolutionEngine {
    holders: DashMap<Key, Holder>,
    in_flight: Mutex<InFlightTable>,
}

impl ResolutionEngine {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn holder(&self, key: &Key) -> Option<Holder> {
        self.holders.get(key).map(|holder| holder.clone())
    }

    /// 在状态锁内注册绑定并写入缓存项，与 [`clear`](Self::clear) 互斥
    pub(crate) fn bind_holder(
        &self,
        register: impl FnOnce() -> ContainerResult<Arc<Binding>>,
        holder: Holder,
    ) -> ContainerResult<Arc<Binding>> {
        let _table = self.in_flight.lock();
        let binding = register()?;
        self.holders.insert(binding.key(), holder);
        Ok(binding)
    }

    pub(crate) fn state(&self, key: &Key) -> BindingState {
        let table = self.in_flight.lock();
        if self.holders.contains_key(key) {
            BindingState::Resolved
        } else if table.slots.contains_key(key) {
            BindingState::InProgress
        } else {
            BindingState::Unresolved
        }
    }

    /// 已缓存的实例，用于释放
    pub(crate) fn cached_instances(&self) -> Vec<(Key, Instance, TypeInfo)> {
        self.holders
            .iter()
            .filter_map(|entry| match entry.value() {
                Holder::Instance { value, runtime } => Some((entry.key().clone(), value.clone(), *runtime)),
                Holder::Producer(_) => None,
            })
            .collect()
    }

    pub(crate) fn cached_count(&self) -> usize {
        self.holders.len()
    }

    pub(crate) fn in_flight_count(&self) -> usize {
        self.in_flight.lock().slots.len()
    }

    /// 原子地清空缓存、注册表与构造中槽位
    ///
    /// 被收回槽位上的等待者会被唤醒，仍在进行的构造完成后不会写入缓存。
    pub(crate) fn clear(&self, registry: &BindingRegistry) {
        let mut table = self.in_flight.lock();
        registry.clear();
        self.holders.clear();
        for (_, slot) in table.slots.drain() {
            let _ = slot.done.send(true);
        }
        table.waiting.clear();
    }

    fn claim(&self, key: &Key, ctx: &ResolveContext) -> ContainerResult<Claim<'_>> {
        let mut table = self.in_flight.lock();
        if let Some(holder) = self.holder(key) {
            return Ok(Claim::Cached(holder));
        }

        if let Some(slot) = table.slots.get(key) {
            if slot.owner == ctx.id() || table.waits_on(slot.owner, ctx.id()) {
                return Err(ContainerError::CircularDependency {
                    type_name: key.type_info().name().to_string(),
                    qualifier: key.qualifier().to_string(),
                    chain: ctx.chain(key),
                });
            }
            let receiver = slot.done.subscribe();
            table.waiting.insert(ctx.id(), key.clone());
            return Ok(Claim::Wait(receiver, WaitGuard { engine: self, id: ctx.id() }));
        }

        let (done, _) = watch::channel(false);
        table.slots.insert(
            key.clone(),
            Slot {
                owner: ctx.id(),
                done,
            },
        );
        Ok(Claim::Build(InFlightGuard {
            engine: self,
            key: key.clone(),
            owner: ctx.id(),
            finished: false,
        }))
    }
}

impl ContainerCore {
    /// 解析一个绑定
    pub(crate) fn resolve<'a>(
        &'a self,
        binding: Arc<Binding>,
        ctx: &'a ResolveContext,
    ) -> BoxFuture<'a, ContainerResult<Resolved>> {
        Box::pin(async move {
            let key = binding.key();
            if ctx.depth() >= self.config.max_resolution_depth {
                return Err(ContainerError::failed_instantiation(
                    key.type_info().name(),
                    key.qualifier(),
                    format!("超过最大解析深度 {}", self.config.max_resolution_depth),
                ));
            }

            if let Some(holder) = self.engine.holder(&key) {
                return self.from_holder(&key, holder).await;
            }

            if !binding.is_singleton() {
                if ctx.contains(&key) {
                    return Err(ContainerError::CircularDependency {
                        type_name: key.type_info().name().to_string(),
                        qualifier: key.qualifier().to_string(),
                        chain: ctx.chain(&key),
                    });
                }
                let child = ctx.enter(key);
                return self.construct(&binding, &child).await;
            }

            loop {
                match self.engine.claim(&key, ctx)? {
                    Claim::Cached(holder) => return self.from_holder(&key, holder).await,
                    Claim::Wait(mut receiver, _waiting) => {
                        debug!("等待其他解析完成构造: {}", key);
                        // 发送端被丢弃同样表示构造结束
                        let _ = receiver.changed().await;
                    }
                    Claim::Build(guard) => {
                        let child = ctx.enter(key.clone());
                        return match self.construct(&binding, &child).await {
                            Ok(resolved) => {
                                guard.finish(Some(Holder::Instance {
                                    value: resolved.value.clone(),
                                    runtime: resolved.runtime,
                                }));
                                debug!("缓存单例: {}", key);
                                Ok(resolved)
                            }
                            Err(error) => {
                                guard.finish(None);
                                Err(error)
                            }
                        };
                    }
                }
            }
        })
    }

    pub(crate) async fn from_holder(&self, key: &Key, holder: Holder) -> ContainerResult<Resolved> {
        match holder {
            Holder::Instance { value, runtime } => Ok(Resolved { value, runtime }),
            Holder::Producer(producer) => {
                debug!("调用生产者 {}: {}", producer.name(), key);
                let value = producer.produce().await.map_err(|error| {
                    ContainerError::instantiation_caused_by(key.type_info().name(), key.qualifier(), error)
                })?;
                Ok(Resolved {
                    value,
                    runtime: producer.output_type(),
                })
            }
        }
    }

    /// 解析全部可赋值给 `ty` 的绑定，按注册顺序
    pub(crate) async fn resolve_many(&self, ty: &TypeInfo, ctx: &ResolveContext) -> ContainerResult<Vec<BoxValue>> {
        let bindings = self.registry.assignable_to(ty, &self.catalog);
        let mut values = Vec::with_capacity(bindings.len());
        for binding in bindings {
            let resolved = self.resolve(binding, ctx).await?;
            values.push(self.cast(resolved, ty)?);
        }
        Ok(values)
    }

    /// 解析依赖槽位并打包为槽位类型
    pub(crate) async fn resolve_dependency(
        &self,
        dependency: &Dependency,
        ctx: &ResolveContext,
    ) -> ContainerResult<BoxValue> {
        let element = dependency.element();
        let qualifier = self.inspector.dependency_qualifier(dependency);
        let values = match dependency.cardinality() {
            Cardinality::Single => {
                let binding = self.find_binding(element, &qualifier)?;
                let resolved = self.resolve(binding, ctx).await?;
                vec![self.cast(resolved, element)?]
            }
            Cardinality::List | Cardinality::Set => self.resolve_many(element, ctx).await?,
        };
        dependency.pack(values).ok_or_else(|| {
            ContainerError::failed_instantiation(
                element.name(),
                qualifier,
                format!("依赖 {} 的值类型不匹配", dependency.name()),
            )
        })
    }

    /// 把解析结果转换为 `Box<Arc<requested>>`
    pub(crate) fn cast(&self, resolved: Resolved, requested: &TypeInfo) -> ContainerResult<BoxValue> {
        let runtime = resolved.runtime;
        self.catalog
            .cast(resolved.value, &runtime, requested)
            .ok_or_else(|| {
                ContainerError::failed_instantiation(
                    requested.name(),
                    "",
                    format!("{} 无法转换为 {}", runtime, requested),
                )
            })
    }
}
