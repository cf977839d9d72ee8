//! # Component Macros
//!
//! 在编译期为结构体生成 `di_common::TypeDescriptor`，代替运行时反射。
//!
//! ## 核心宏
//!
//! - [`Component`](derive@Component) - 生成 `di_common::Describe` 实现
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use component_macros::Component;
//! use di_common::{Injected, InstanceSet};
//! use std::sync::Arc;
//!
//! #[derive(Default, Component)]
//! #[component(singleton, provides(dyn Notifier))]
//! pub struct EmailNotifier {
//!     #[inject(named = "smtp")]
//!     transport: Injected<Arc<dyn Transport>>,
//!     #[inject]
//!     filters: Injected<Vec<Arc<dyn Filter>>>,
//!     #[config(path = "email.sender")]
//!     sender: Injected<String>,
//! }
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod component;
mod utils;

/// 组件派生宏
///
/// 为结构体实现 `di_common::Describe`，描述符标记为组件，可被约定解析器直接选中。
///
/// # 结构体属性 `#[component(...)]`
///
/// - `singleton` / `prototype` - 作用域标记
/// - `primary` - 主实现
/// - `named = "q"` - 声明限定符
/// - `provides(dyn A, dyn B)` - 可向上转换到的抽象类型
/// - `initializing` / `disposable` - 生命周期能力，要求实现对应 trait
/// - `no_default` - 不生成基于 `Default` 的构造函数
///
/// # 字段属性
///
/// - `#[inject]` / `#[inject(named = "q")]` - 容器注入，字段类型为
///   `Injected<Arc<R>>`、`Injected<Vec<Arc<R>>>` 或 `Injected<InstanceSet<R>>`
/// - `#[config(path = "a.b")]` - 由配置值适配器填充的 `Injected<V>` 字段
#[proc_macro_derive(Component, attributes(component, inject, config))]
pub fn derive_component(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    component::derive_component_impl(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
