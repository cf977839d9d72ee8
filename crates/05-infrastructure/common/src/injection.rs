//! 注入单元
//!
//! 字段注入写入 [`Injected`]，集合型依赖以 [`InstanceSet`] 去重。

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// 可由容器在构造后写入的字段
pub struct Injected<T> {
    value: RwLock<Option<T>>,
}

impl<T> Injected<T> {
    /// 创建空单元
    pub fn new() -> Self {
        Self {
            value: RwLock::new(None),
        }
    }

    /// 写入值，覆盖旧值
    pub fn set(&self, value: T) {
        *self.value.write() = Some(value);
    }

    /// 是否已写入
    pub fn is_set(&self) -> bool {
        self.value.read().is_some()
    }

    /// 取出值并清空
    pub fn take(&self) -> Option<T> {
        self.value.write().take()
    }

    /// 以引用方式访问当前值
    pub fn with<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        f(self.value.read().as_ref())
    }
}

impl<T: Clone> Injected<T> {
    /// 获取当前值的副本
    pub fn get(&self) -> Option<T> {
        self.value.read().clone()
    }
}

impl<T> Default for Injected<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Injected<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Injected").field(&*self.value.read()).finish()
    }
}

/// 按实例身份去重的集合
pub struct InstanceSet<T: ?Sized> {
    items: Vec<Arc<T>>,
}

impl<T: ?Sized> InstanceSet<T> {
    /// 创建空集合
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// 插入实例，已存在同一实例时返回 false
    pub fn insert(&mut self, item: Arc<T>) -> bool {
        if self.contains(&item) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// 是否包含同一实例
    pub fn contains(&self, item: &Arc<T>) -> bool {
        self.items.iter().any(|existing| same_instance(existing, item))
    }

    /// 元素个数
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 按插入顺序遍历
    pub fn iter(&self) -> std::slice::Iter<'_, Arc<T>> {
        self.items.iter()
    }

    /// 转为有序列表
    pub fn into_vec(self) -> Vec<Arc<T>> {
        self.items
    }
}

fn same_instance<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    std::ptr::eq(Arc::as_ptr(a).cast::<()>(), Arc::as_ptr(b).cast::<()>())
}

impl<T: ?Sized> Default for InstanceSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Clone for InstanceSet<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
        }
    }
}

impl<T: ?Sized> FromIterator<Arc<T>> for InstanceSet<T> {
    fn from_iter<I: IntoIterator<Item = Arc<T>>>(iter: I) -> Self {
        let mut set = Self::new();
        for item in iter {
            set.insert(item);
        }
        set
    }
}

impl<'a, T: ?Sized> IntoIterator for &'a InstanceSet<T> {
    type Item = &'a Arc<T>;
    type IntoIter = std::slice::Iter<'a, Arc<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: ?Sized> fmt::Debug for InstanceSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceSet").field("len", &self.items.len()).finish()
    }
}
