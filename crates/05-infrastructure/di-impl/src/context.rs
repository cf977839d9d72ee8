//! 解析上下文

use crate::binding::Key;
use std::fmt;
use uuid::Uuid;

/// 一次顶层解析的标识，嵌套解析共享同一标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResolutionId(Uuid);

impl ResolutionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ResolutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 解析上下文
#[derive(Debug, Clone)]
pub struct ResolveContext {
    id: ResolutionId,
    /// 当前解析链，仅用于诊断和原型绑定的自引用检测
    path: Vec<Key>,
}

impl ResolveContext {
    /// 创建新的顶层上下文
    pub fn new() -> Self {
        Self {
            id: ResolutionId::new(),
            path: Vec::new(),
        }
    }

    /// 解析标识
    pub fn id(&self) -> ResolutionId {
        self.id
    }

    /// 当前嵌套深度
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// 解析链中是否已有该键
    pub fn contains(&self, key: &Key) -> bool {
        self.path.contains(key)
    }

    /// 进入下一层
    pub fn enter(&self, key: Key) -> Self {
        let mut path = self.path.clone();
        path.push(key);
        Self { id: self.id, path }
    }

    /// 解析链的文本形式
    pub fn chain(&self, next: &Key) -> String {
        self.path
            .iter()
            .chain(std::iter::once(next))
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

impl Default for ResolveContext {
    fn default() -> Self {
        Self::new()
    }
}
