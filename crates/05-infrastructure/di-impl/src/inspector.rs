//! 基于类型描述符的元数据检查器

use di_abstractions::AnnotationInspector;
use di_common::{TypeCatalog, TypeInfo};
use std::sync::Arc;

/// 从 [`TypeCatalog`] 中读取标记，未登记的类型视为无标记
#[derive(Debug, Clone)]
pub struct DescriptorInspector {
    catalog: Arc<TypeCatalog>,
}

impl DescriptorInspector {
    /// 创建检查器
    pub fn new(catalog: Arc<TypeCatalog>) -> Self {
        Self { catalog }
    }

    fn flag(&self, ty: &TypeInfo, read: impl FnOnce(&di_common::TypeDescriptor) -> bool) -> bool {
        self.catalog.get(ty).is_some_and(|descriptor| read(&descriptor))
    }
}

impl AnnotationInspector for DescriptorInspector {
    fn is_singleton(&self, ty: &TypeInfo) -> bool {
        self.flag(ty, |descriptor| descriptor.is_singleton())
    }

    fn is_prototype(&self, ty: &TypeInfo) -> bool {
        self.flag(ty, |descriptor| descriptor.is_prototype())
    }

    fn is_primary(&self, ty: &TypeInfo) -> bool {
        self.flag(ty, |descriptor| descriptor.is_primary())
    }

    fn qualifier_of(&self, ty: &TypeInfo) -> String {
        self.catalog
            .get(ty)
            .map(|descriptor| descriptor.qualifier().to_string())
            .unwrap_or_default()
    }
}
