//! 容器配置与配置节

use crate::errors::ContainerError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// 环境变量前缀，例如 `CONTAINER_IGNORE_AUTO_INJECTORS=true`
pub const ENV_PREFIX: &str = "CONTAINER";

/// 容器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// 不加载插件集合中的字段注入适配器
    pub ignore_auto_injectors: bool,
    /// 没有显式作用域标记的绑定按单例处理
    pub singleton_by_default: bool,
    /// 类型只有一个构造函数时视其为可注入构造函数
    pub implicit_sole_constructor_injection: bool,
    /// 构造函数在 tokio 阻塞线程池中执行
    pub blocking_construction: bool,
    /// 最大解析深度
    pub max_resolution_depth: usize,
    /// 存在多个候选构造函数时输出警告
    pub warn_on_ambiguous_constructor: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            ignore_auto_injectors: false,
            singleton_by_default: true,
            implicit_sole_constructor_injection: false,
            blocking_construction: false,
            max_resolution_depth: 100,
            warn_on_ambiguous_constructor: true,
        }
    }
}

impl ContainerConfig {
    /// 从可选配置文件和环境变量加载
    ///
    /// 文件不存在时忽略，环境变量优先于文件。
    pub fn load(path: Option<&Path>) -> Result<Self, ContainerError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// 仅从环境变量加载
    pub fn from_env() -> Result<Self, ContainerError> {
        Self::load(None)
    }

    /// 设置是否忽略插件字段适配器
    pub fn with_ignore_auto_injectors(mut self, ignore: bool) -> Self {
        self.ignore_auto_injectors = ignore;
        self
    }

    /// 设置默认单例
    pub fn with_singleton_by_default(mut self, enabled: bool) -> Self {
        self.singleton_by_default = enabled;
        self
    }

    /// 设置唯一构造函数隐式可注入
    pub fn with_implicit_sole_constructor_injection(mut self, enabled: bool) -> Self {
        self.implicit_sole_constructor_injection = enabled;
        self
    }

    /// 设置阻塞构造
    pub fn with_blocking_construction(mut self, enabled: bool) -> Self {
        self.blocking_construction = enabled;
        self
    }

    /// 设置最大解析深度
    pub fn with_max_resolution_depth(mut self, depth: usize) -> Self {
        self.max_resolution_depth = depth;
        self
    }
}

/// 配置节
///
/// 供字段适配器按点分路径读取配置值。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigSection {
    /// 配置数据
    pub data: HashMap<String, serde_json::Value>,
}

impl ConfigSection {
    /// 创建新的配置节
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 对象创建，非对象值得到空配置节
    pub fn from_value(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(map) => Self {
                data: map.into_iter().collect(),
            },
            _ => Self::new(),
        }
    }

    /// 从配置文件加载，格式由扩展名决定
    pub fn load(path: &Path) -> Result<Self, ContainerError> {
        let data = config::Config::builder()
            .add_source(config::File::from(path))
            .build()?
            .try_deserialize::<HashMap<String, serde_json::Value>>()?;
        Ok(Self { data })
    }

    /// 插入配置项
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    /// 获取顶层配置项
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// 按点分路径获取配置项，例如 `server.port`
    pub fn get_path(&self, path: &str) -> Option<&serde_json::Value> {
        let mut segments = path.split('.');
        let mut current = self.data.get(segments.next()?)?;
        for segment in segments {
            current = match current {
                serde_json::Value::Object(map) => map.get(segment)?,
                serde_json::Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// 绑定到具体类型
    pub fn bind<T>(&self) -> Result<T, ContainerError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let value = serde_json::Value::Object(
            self.data
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        );

        serde_json::from_value(value).map_err(|e| ContainerError::configuration(e.to_string()))
    }
}
