//! # Container Implementation
//!
//! 组件容器的具体实现：绑定注册表、解析引擎、组件工厂与成员注入器。
//!
//! ## 核心组件
//!
//! - [`Container`] - 容器门面，注册、解析、注入与释放的唯一入口
//! - [`ContainerBuilder`] - 组装配置、扩展集合与启动期注册
//! - [`Binding`] / [`Key`] - 绑定模型
//! - [`ConventionResolver`] / [`ImplementedByResolver`] - 内置实现发现
//! - [`ConfigValueInjector`] - 配置值字段适配器
//! - [`Application`] - 由容器托管启动的应用
//!
//! ## 并发模型
//!
//! 每个绑定独立维护解析状态，无关的单例可以并发构造。
//! 同一顶层解析在构造期间重新进入同一绑定时报告循环依赖。

pub mod adapters;
pub mod binding;
pub mod bootstrap;
pub mod container;
pub mod context;
pub mod inspector;
pub mod resolvers;
pub mod runners;

mod engine;
mod factory;
mod injector;
mod registry;
mod shared;

pub use adapters::*;
pub use binding::*;
pub use bootstrap::*;
pub use container::*;
pub use context::*;
pub use inspector::*;
pub use resolvers::*;
pub use runners::*;

#[cfg(test)]
mod tests;
