//! 元数据定义
//!
//! 提供类型标识信息

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// 类型信息
///
/// 相等性与哈希只看 [`TypeId`]。非定长类型视为抽象类型：`dyn Trait` 之外，
/// `str` 与 `[T]` 同样无法直接构造，也归为抽象类型。
#[derive(Clone, Copy)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
    is_abstract: bool,
}

impl TypeInfo {
    /// 从类型获取类型信息
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            is_abstract: std::mem::size_of::<*const T>() != std::mem::size_of::<*const ()>(),
        }
    }

    /// 类型ID
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// 完整类型名称
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 是否为抽象类型（非定长类型，主要是 trait 对象）
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// 去掉 `dyn ` 前缀与附加约束后的类型路径
    pub fn path(&self) -> &'static str {
        let name = self.name.strip_prefix("dyn ").unwrap_or(self.name);
        name.split(" + ").next().unwrap_or(name)
    }

    /// 获取简短的类型名称（不包含模块路径）
    pub fn short_name(&self) -> &'static str {
        let base = self.base_path();
        base.rsplit("::").next().unwrap_or(base)
    }

    /// 类型所在模块路径
    pub fn module_path(&self) -> &'static str {
        self.base_path()
            .rsplit_once("::")
            .map_or("", |(module, _)| module)
    }

    fn base_path(&self) -> &'static str {
        let path = self.path();
        path.split('<').next().unwrap_or(path)
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
