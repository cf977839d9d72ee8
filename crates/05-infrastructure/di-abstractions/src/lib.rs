//! # Container Abstractions
//!
//! 组件容器的扩展能力接口，容器核心只通过这些 trait 与外部协作。
//!
//! ## 核心接口
//!
//! - [`ImplementationResolver`] - 实现发现
//! - [`AnnotationInspector`] - 元数据检查
//! - [`TaskRunner`] - 构造任务执行
//! - [`FieldInjectorAdapter`] - 非容器来源的字段注入
//! - [`InstanceProducer`] - 占位绑定的实例生产者

pub mod extension;
pub mod factory;
pub mod injector;
pub mod inspector;
pub mod resolver;
pub mod runner;

pub use extension::*;
pub use factory::*;
pub use injector::*;
pub use inspector::*;
pub use resolver::*;
pub use runner::*;
