//! # Container Common
//!
//! 组件容器的公共类型：类型元数据、注入单元、生命周期能力、错误与配置。
//!
//! ## 核心类型
//!
//! - [`TypeInfo`] - 类型标识
//! - [`TypeDescriptor`] - 静态类型描述符，代替运行时反射
//! - [`TypeCatalog`] - 按类型标识保存描述符
//! - [`Injected`] / [`InstanceSet`] - 注入单元
//! - [`ContainerError`] - 容器错误
//! - [`ContainerConfig`] - 容器配置
//!
//! ## 设计原则
//!
//! - 元数据在编译期或启动期登记，解析时只做查表
//! - 抽象类型以 `dyn Trait` 表示，向上转换由描述符提供
//! - 异步优先的设计理念

pub mod catalog;
pub mod configuration;
pub mod descriptor;
pub mod errors;
pub mod injection;
pub mod lifecycle;
pub mod metadata;

pub use catalog::*;
pub use configuration::*;
pub use descriptor::*;
pub use errors::*;
pub use injection::*;
pub use lifecycle::*;
pub use metadata::*;
