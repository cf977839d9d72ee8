//! 内置实现解析器

use di_abstractions::ImplementationResolver;
use di_common::{TypeCatalog, TypeInfo};

/// 命名约定解析器
///
/// 具体类型：描述符标记为组件时返回自身。
/// 抽象类型：依次查找同模块下的 `{Trait}Impl` 与 `imp::{Trait}Impl`，
/// 候选必须声明了到请求类型的转换。
#[derive(Debug, Default, Clone, Copy)]
pub struct ConventionResolver;

impl ConventionResolver {
    /// 创建解析器
    pub fn new() -> Self {
        Self
    }

    fn candidate_paths(requested: &TypeInfo) -> [String; 2] {
        let module = requested.module_path();
        let short = requested.short_name();
        if module.is_empty() {
            [format!("{short}Impl"), format!("imp::{short}Impl")]
        } else {
            [format!("{module}::{short}Impl"), format!("{module}::imp::{short}Impl")]
        }
    }
}

impl ImplementationResolver for ConventionResolver {
    fn name(&self) -> &str {
        "convention"
    }

    fn resolve(&self, requested: &TypeInfo, catalog: &TypeCatalog) -> Option<TypeInfo> {
        if !requested.is_abstract() {
            return catalog
                .get(requested)
                .filter(|descriptor| descriptor.is_component())
                .map(|descriptor| *descriptor.type_info());
        }

        Self::candidate_paths(requested)
            .iter()
            .filter_map(|path| catalog.find_by_path(path))
            .find(|descriptor| !descriptor.type_info().is_abstract() && descriptor.can_cast_to(requested))
            .map(|descriptor| *descriptor.type_info())
    }
}

/// 默认实现声明解析器
///
/// 读取抽象类型描述符上的 `implemented_by`。
#[derive(Debug, Default, Clone, Copy)]
pub struct ImplementedByResolver;

impl ImplementedByResolver {
    /// 创建解析器
    pub fn new() -> Self {
        Self
    }
}

impl ImplementationResolver for ImplementedByResolver {
    fn name(&self) -> &str {
        "implemented-by"
    }

    fn resolve(&self, requested: &TypeInfo, catalog: &TypeCatalog) -> Option<TypeInfo> {
        let declared = *catalog.get(requested)?.implemented_by()?;
        (!declared.is_abstract() && catalog.is_assignable(&declared, requested)).then_some(declared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use di_common::TypeDescriptor;
    use std::sync::Arc;

    pub trait Clock: Send + Sync {}

    #[derive(Default)]
    pub struct ClockImpl;
    impl Clock for ClockImpl {}

    pub trait Mailer: Send + Sync {}

    pub mod imp {
        #[derive(Default)]
        pub struct MailerImpl;
        impl super::Mailer for MailerImpl {}
    }

    pub trait Ledger: Send + Sync {}

    #[derive(Default)]
    pub struct PaperLedger;
    impl Ledger for PaperLedger {}

    #[derive(Default)]
    pub struct Plain;

    fn catalog() -> TypeCatalog {
        let catalog = TypeCatalog::new();
        catalog.describe(
            TypeDescriptor::of::<ClockImpl>()
                .default_constructor()
                .provides::<dyn Clock>(|c| c as Arc<dyn Clock>)
                .build(),
        );
        catalog.describe(
            TypeDescriptor::of::<imp::MailerImpl>()
                .default_constructor()
                .provides::<dyn Mailer>(|m| m as Arc<dyn Mailer>)
                .build(),
        );
        catalog.describe(
            TypeDescriptor::of::<PaperLedger>()
                .default_constructor()
                .provides::<dyn Ledger>(|l| l as Arc<dyn Ledger>)
                .build(),
        );
        catalog.describe(TypeDescriptor::abstract_of::<dyn Ledger>().implemented_by::<PaperLedger>().build());
        catalog.describe(TypeDescriptor::of::<Plain>().default_constructor().build());
        catalog
    }

    #[test]
    fn test_convention_finds_sibling_impl() {
        let catalog = catalog();
        let found = ConventionResolver.resolve(&TypeInfo::of::<dyn Clock>(), &catalog);
        assert_eq!(found, Some(TypeInfo::of::<ClockImpl>()));
    }

    #[test]
    fn test_convention_finds_impl_in_imp_module() {
        let catalog = catalog();
        let found = ConventionResolver.resolve(&TypeInfo::of::<dyn Mailer>(), &catalog);
        assert_eq!(found, Some(TypeInfo::of::<imp::MailerImpl>()));
    }

    #[test]
    fn test_convention_ignores_unmarked_concrete_types() {
        let catalog = catalog();
        assert_eq!(ConventionResolver.resolve(&TypeInfo::of::<Plain>(), &catalog), None);
        assert_eq!(ConventionResolver.resolve(&TypeInfo::of::<dyn Ledger>(), &catalog), None);
    }

    #[test]
    fn test_implemented_by_reads_declaration() {
        let catalog = catalog();
        let found = ImplementedByResolver.resolve(&TypeInfo::of::<dyn Ledger>(), &catalog);
        assert_eq!(found, Some(TypeInfo::of::<PaperLedger>()));
        assert_eq!(ImplementedByResolver.resolve(&TypeInfo::of::<dyn Clock>(), &catalog), None);
    }
}
