//! 类型目录
//!
//! 按类型标识保存 [`TypeDescriptor`]，提供可赋值性判断与实例转换。

use crate::descriptor::{BoxValue, Instance, TypeDescriptor};
use crate::metadata::TypeInfo;
use parking_lot::RwLock;
use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// 类型目录
#[derive(Default)]
pub struct TypeCatalog {
    descriptors: RwLock<HashMap<TypeId, Arc<TypeDescriptor>>>,
}

impl TypeCatalog {
    /// 创建空目录
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记描述符，返回被替换的旧描述符
    pub fn describe(&self, descriptor: TypeDescriptor) -> Option<Arc<TypeDescriptor>> {
        let info = *descriptor.type_info();
        debug!("登记类型描述: {}", info);
        self.descriptors.write().insert(info.id(), Arc::new(descriptor))
    }

    /// 确保具体类型至少有一个仅含自身转换的描述符
    pub fn ensure<T: Send + Sync + 'static>(&self) -> Arc<TypeDescriptor> {
        let info = TypeInfo::of::<T>();
        if let Some(existing) = self.get(&info) {
            return existing;
        }
        self.descriptors
            .write()
            .entry(info.id())
            .or_insert_with(|| Arc::new(TypeDescriptor::of::<T>().build()))
            .clone()
    }

    /// 查找描述符
    pub fn get(&self, info: &TypeInfo) -> Option<Arc<TypeDescriptor>> {
        self.descriptors.read().get(&info.id()).cloned()
    }

    /// 是否已登记
    pub fn contains(&self, info: &TypeInfo) -> bool {
        self.descriptors.read().contains_key(&info.id())
    }

    /// `from` 的实例能否当作 `to` 使用
    ///
    /// 自反；否则沿描述符声明的父类型传递查找 `to`。
    pub fn is_assignable(&self, from: &TypeInfo, to: &TypeInfo) -> bool {
        let mut pending = vec![*from];
        let mut visited = HashSet::new();
        while let Some(current) = pending.pop() {
            if current == *to {
                return true;
            }
            if !visited.insert(current.id()) {
                continue;
            }
            if let Some(descriptor) = self.get(&current) {
                if descriptor.can_cast_to(to) {
                    return true;
                }
                pending.extend(descriptor.supertypes().iter().copied());
            }
        }
        false
    }

    /// 把运行时类型为 `runtime` 的实例转换为 `Box<Arc<requested>>`
    pub fn cast(&self, instance: Instance, runtime: &TypeInfo, requested: &TypeInfo) -> Option<BoxValue> {
        self.get(runtime)
            .and_then(|descriptor| descriptor.cast(instance, requested))
    }

    /// 按类型路径查找描述符
    pub fn find_by_path(&self, path: &str) -> Option<Arc<TypeDescriptor>> {
        self.descriptors
            .read()
            .values()
            .find(|descriptor| descriptor.type_info().path() == path)
            .cloned()
    }

    /// 全部描述符
    pub fn descriptors(&self) -> Vec<Arc<TypeDescriptor>> {
        self.descriptors.read().values().cloned().collect()
    }

    /// 已登记数量
    pub fn len(&self) -> usize {
        self.descriptors.read().len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.descriptors.read().is_empty()
    }
}

impl std::fmt::Debug for TypeCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeCatalog")
            .field("descriptors", &self.len())
            .finish()
    }
}
