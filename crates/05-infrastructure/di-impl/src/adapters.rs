//! 内置字段注入适配器

use async_trait::async_trait;
use di_abstractions::FieldInjectorAdapter;
use di_common::{BoxValue, ConfigSection, ContainerError, FieldDescriptor, Instance, TypeInfo};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// 字段属性键，值为配置路径
pub const CONFIG_ATTRIBUTE: &str = "config";

/// 配置值注入器
///
/// 处理带 `config` 属性的字段，按点分路径从 [`ConfigSection`] 读取值并转换为字段类型。
/// 路径不存在时保持字段不变。
#[derive(Debug, Clone)]
pub struct ConfigValueInjector {
    section: Arc<ConfigSection>,
}

impl ConfigValueInjector {
    /// 创建注入器
    pub fn new(section: ConfigSection) -> Self {
        Self {
            section: Arc::new(section),
        }
    }

    /// 共享已有的配置节
    pub fn shared(section: Arc<ConfigSection>) -> Self {
        Self { section }
    }

    fn convert(value: &Value, target: &TypeInfo) -> Option<BoxValue> {
        fn boxed<V: Send + Sync + 'static>(value: Option<V>) -> Option<BoxValue> {
            value.map(|value| Box::new(value) as BoxValue)
        }

        if *target == TypeInfo::of::<String>() {
            return boxed(match value {
                Value::String(text) => Some(text.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            });
        }
        if *target == TypeInfo::of::<bool>() {
            return boxed(value.as_bool().or_else(|| value.as_str()?.parse().ok()));
        }
        if *target == TypeInfo::of::<i64>() {
            return boxed(integer(value));
        }
        if *target == TypeInfo::of::<i32>() {
            return boxed(integer(value).and_then(|n| i32::try_from(n).ok()));
        }
        if *target == TypeInfo::of::<u64>() {
            return boxed(unsigned(value));
        }
        if *target == TypeInfo::of::<u32>() {
            return boxed(unsigned(value).and_then(|n| u32::try_from(n).ok()));
        }
        if *target == TypeInfo::of::<usize>() {
            return boxed(unsigned(value).and_then(|n| usize::try_from(n).ok()));
        }
        if *target == TypeInfo::of::<f64>() {
            return boxed(value.as_f64().or_else(|| value.as_str()?.parse().ok()));
        }
        if *target == TypeInfo::of::<Value>() {
            return boxed(Some(value.clone()));
        }
        None
    }
}

fn integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| value.as_str()?.trim().parse().ok())
}

fn unsigned(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| value.as_str()?.trim().parse().ok())
}

#[async_trait]
impl FieldInjectorAdapter for ConfigValueInjector {
    fn name(&self) -> &str {
        "config-value"
    }

    fn is_injectable(&self, field: &FieldDescriptor) -> bool {
        field.attribute(CONFIG_ATTRIBUTE).is_some()
    }

    async fn inject(&self, instance: &Instance, field: &FieldDescriptor) -> Result<(), ContainerError> {
        let Some(path) = field.attribute(CONFIG_ATTRIBUTE) else {
            return Ok(());
        };
        let Some(value) = self.section.get_path(path) else {
            debug!("配置项 {} 不存在，跳过字段 {}", path, field.name());
            return Ok(());
        };

        let converted = Self::convert(value, field.value_type()).ok_or_else(|| {
            ContainerError::injection_failed(
                field.value_type().name(),
                field.name(),
                format!("配置项 {path} 的值 {value} 无法转换为 {}", field.value_type()),
            )
        })?;

        field
            .assign(&**instance, converted)
            .map_err(|error| ContainerError::injection_failed(field.value_type().name(), field.name(), error))
    }
}
