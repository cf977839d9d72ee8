//! 元数据检查器抽象接口

use di_common::{Dependency, TypeInfo};

/// 读取类型声明上的作用域、主实现与限定符标记
pub trait AnnotationInspector: Send + Sync {
    /// 是否显式标记为单例
    fn is_singleton(&self, ty: &TypeInfo) -> bool;

    /// 是否显式声明为原型
    fn is_prototype(&self, ty: &TypeInfo) -> bool;

    /// 是否标记为主实现
    fn is_primary(&self, ty: &TypeInfo) -> bool;

    /// 类型声明的限定符，空字符串表示无限定
    fn qualifier_of(&self, ty: &TypeInfo) -> String;

    /// 依赖槽位声明的限定符
    fn dependency_qualifier(&self, dependency: &Dependency) -> String {
        dependency.qualifier().to_string()
    }
}
