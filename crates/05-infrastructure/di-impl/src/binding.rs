//! 绑定模型
//!
//! [`Key`] 标识一个绑定槽位，[`Binding`] 记录请求类型到目标的契约。

use di_common::TypeInfo;
use std::fmt;

/// 绑定键：(请求类型, 限定符)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key {
    type_info: TypeInfo,
    qualifier: String,
}

impl Key {
    /// 创建绑定键
    pub fn new(type_info: TypeInfo, qualifier: impl Into<String>) -> Self {
        Self {
            type_info,
            qualifier: qualifier.into(),
        }
    }

    /// 无限定符的键
    pub fn of<R: ?Sized + 'static>() -> Self {
        Self::new(TypeInfo::of::<R>(), String::new())
    }

    /// 带限定符的键
    pub fn named<R: ?Sized + 'static>(qualifier: impl Into<String>) -> Self {
        Self::new(TypeInfo::of::<R>(), qualifier)
    }

    /// 请求类型
    pub fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    /// 限定符
    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.qualifier.is_empty() {
            write!(f, "{}", self.type_info)
        } else {
            write!(f, "{}[{}]", self.type_info, self.qualifier)
        }
    }
}

/// 绑定的实例来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// 由组件工厂构造目标类型
    Constructed,
    /// 预先构造好的实例
    Instance,
    /// 每次解析都调用的生产者
    Producer,
}

/// 单个绑定的解析状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    /// 尚未解析
    Unresolved,
    /// 正在构造
    InProgress,
    /// 已缓存实例或生产者
    Resolved,
}

/// 绑定
#[derive(Debug, Clone)]
pub struct Binding {
    requested: TypeInfo,
    qualifier: String,
    target: Option<TypeInfo>,
    kind: BindingKind,
    singleton: bool,
    primary: bool,
}

impl Binding {
    /// 为请求类型 `R` 创建绑定
    pub fn of<R: ?Sized + 'static>() -> Self {
        Self::for_type(TypeInfo::of::<R>())
    }

    /// 为给定类型信息创建绑定
    pub fn for_type(requested: TypeInfo) -> Self {
        Self {
            requested,
            qualifier: String::new(),
            target: None,
            kind: BindingKind::Constructed,
            singleton: false,
            primary: false,
        }
    }

    /// 设置限定符
    pub fn named(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = qualifier.into();
        self
    }

    /// 设置目标类型
    pub fn to<T: ?Sized + 'static>(self) -> Self {
        self.to_type(TypeInfo::of::<T>())
    }

    /// 按类型信息设置目标类型
    pub fn to_type(mut self, target: TypeInfo) -> Self {
        self.target = Some(target);
        self
    }

    /// 显式单例标记，只能把元数据推导出的结果从 false 提升为 true
    pub fn singleton(mut self, singleton: bool) -> Self {
        self.singleton = singleton;
        self
    }

    /// 显式主实现标记
    pub fn primary(mut self, primary: bool) -> Self {
        self.primary = primary;
        self
    }

    pub(crate) fn with_kind(mut self, kind: BindingKind) -> Self {
        self.kind = kind;
        self
    }

    /// 绑定键
    pub fn key(&self) -> Key {
        Key::new(self.requested, self.qualifier.clone())
    }

    /// 请求类型
    pub fn requested(&self) -> &TypeInfo {
        &self.requested
    }

    /// 限定符
    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    /// 目标类型，未指定时在注册阶段由实现发现补全
    pub fn target(&self) -> Option<&TypeInfo> {
        self.target.as_ref()
    }

    /// 实例来源
    pub fn kind(&self) -> BindingKind {
        self.kind
    }

    /// 是否单例
    pub fn is_singleton(&self) -> bool {
        self.singleton
    }

    /// 是否主实现
    pub fn is_primary(&self) -> bool {
        self.primary
    }

    /// 构造时使用的目标类型
    pub(crate) fn construct_target(&self) -> TypeInfo {
        self.target.unwrap_or(self.requested)
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> ", self.key())?;
        match (&self.kind, &self.target) {
            (BindingKind::Producer, Some(target)) => write!(f, "生产者<{target}>"),
            (BindingKind::Instance, Some(target)) => write!(f, "实例<{target}>"),
            (_, Some(target)) => write!(f, "{target}"),
            (_, None) => f.write_str("?"),
        }
    }
}
