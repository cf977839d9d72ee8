//! 错误类型定义

use thiserror::Error;

/// 用户回调（构造函数、钩子、生产者）返回的通用错误
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 容器操作结果
pub type ContainerResult<T> = Result<T, ContainerError>;

/// 错误类别
///
/// 每个类别都有稳定的数字代码，便于日志检索和跨进程诊断。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 抽象类型既没有绑定也无法发现实现
    NoImplementationRegistered,
    /// 无可用构造函数、构造失败或被包装的循环依赖
    FailedInstantiation,
    /// 同一个 (类型, 限定符) 被重复注册
    DuplicateBinding,
    /// 给定限定符没有匹配的绑定
    NoQualifierRegistered,
    /// 多个无限定候选且没有主实现
    TooManyCandidates,
    /// 同一请求类型注册了第二个主实现
    TooManyPrimaryImplementations,
    /// 构造过程中重新进入了同一绑定
    CircularDependency,
    /// 目标类型为抽象类型或类型不兼容
    InvalidBinding,
    /// 成员注入失败
    InjectionFailed,
    /// 配置加载失败
    Configuration,
}

impl ErrorKind {
    /// 数字错误代码
    pub const fn code(self) -> u32 {
        match self {
            Self::NoImplementationRegistered => 1000,
            Self::FailedInstantiation => 1001,
            Self::DuplicateBinding => 1003,
            Self::NoQualifierRegistered => 1004,
            Self::TooManyCandidates => 1005,
            Self::TooManyPrimaryImplementations => 1006,
            Self::CircularDependency => 1008,
            Self::InvalidBinding => 1009,
            Self::InjectionFailed => 1010,
            Self::Configuration => 1999,
        }
    }
}

/// 容器错误类型
#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("未找到实现: {type_name} [{qualifier}]")]
    NoImplementationRegistered { type_name: String, qualifier: String },

    #[error("组件实例化失败: {type_name} [{qualifier}], 原因: {message}")]
    FailedInstantiation {
        type_name: String,
        qualifier: String,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("重复注册: {type_name} [{qualifier}]")]
    DuplicateBinding { type_name: String, qualifier: String },

    #[error("限定符未注册: {type_name} [{qualifier}]")]
    NoQualifierRegistered { type_name: String, qualifier: String },

    #[error("候选实现过多: {type_name} [{qualifier}], 共 {candidates} 个且没有主实现")]
    TooManyCandidates {
        type_name: String,
        qualifier: String,
        candidates: usize,
    },

    #[error("主实现过多: {type_name} [{qualifier}]")]
    TooManyPrimaryImplementations { type_name: String, qualifier: String },

    #[error("检测到循环依赖: {type_name} [{qualifier}], 解析链: {chain}")]
    CircularDependency {
        type_name: String,
        qualifier: String,
        chain: String,
    },

    #[error("无效绑定: {type_name} -> {target}, 原因: {reason}")]
    InvalidBinding {
        type_name: String,
        target: String,
        reason: String,
    },

    #[error("成员注入失败: {type_name}.{member}, 原因: {message}")]
    InjectionFailed {
        type_name: String,
        member: String,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("配置错误: {message}")]
    Configuration { message: String },
}

impl ContainerError {
    /// 错误类别
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NoImplementationRegistered { .. } => ErrorKind::NoImplementationRegistered,
            Self::FailedInstantiation { .. } => ErrorKind::FailedInstantiation,
            Self::DuplicateBinding { .. } => ErrorKind::DuplicateBinding,
            Self::NoQualifierRegistered { .. } => ErrorKind::NoQualifierRegistered,
            Self::TooManyCandidates { .. } => ErrorKind::TooManyCandidates,
            Self::TooManyPrimaryImplementations { .. } => ErrorKind::TooManyPrimaryImplementations,
            Self::CircularDependency { .. } => ErrorKind::CircularDependency,
            Self::InvalidBinding { .. } => ErrorKind::InvalidBinding,
            Self::InjectionFailed { .. } => ErrorKind::InjectionFailed,
            Self::Configuration { .. } => ErrorKind::Configuration,
        }
    }

    /// 数字错误代码
    pub const fn code(&self) -> u32 {
        self.kind().code()
    }

    /// 错误链中任意一层是否为循环依赖
    ///
    /// 工厂会把参数解析时遇到的循环依赖包装成实例化失败，
    /// 此方法沿 `source()` 链向下查找被包装的原始信号。
    pub fn is_circular(&self) -> bool {
        let mut current: Option<&(dyn std::error::Error + 'static)> = Some(self);
        while let Some(error) = current {
            if let Some(ContainerError::CircularDependency { .. }) = error.downcast_ref::<ContainerError>() {
                return true;
            }
            current = error.source();
        }
        false
    }

    /// 创建实例化失败错误
    pub fn failed_instantiation(
        type_name: impl Into<String>,
        qualifier: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::FailedInstantiation {
            type_name: type_name.into(),
            qualifier: qualifier.into(),
            message: message.into(),
            source: None,
        }
    }

    /// 创建携带原因的实例化失败错误
    pub fn instantiation_caused_by(
        type_name: impl Into<String>,
        qualifier: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        let source = source.into();
        Self::FailedInstantiation {
            type_name: type_name.into(),
            qualifier: qualifier.into(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// 创建成员注入失败错误
    pub fn injection_failed(
        type_name: impl Into<String>,
        member: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        let source = source.into();
        Self::InjectionFailed {
            type_name: type_name.into(),
            member: member.into(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// 创建配置错误
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

impl From<config::ConfigError> for ContainerError {
    fn from(error: config::ConfigError) -> Self {
        Self::configuration(error.to_string())
    }
}
