//! 实现发现抽象接口
//!
//! 请求的类型没有显式绑定时，由实现解析器按顺序给出候选实现类型。

use di_common::{TypeCatalog, TypeInfo};

/// 实现解析器 trait
///
/// 返回第一个非空结果的解析器胜出。
pub trait ImplementationResolver: Send + Sync {
    /// 解析器名称
    fn name(&self) -> &str;

    /// 为请求类型给出具体实现类型
    fn resolve(&self, requested: &TypeInfo, catalog: &TypeCatalog) -> Option<TypeInfo>;
}
