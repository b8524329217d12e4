//! 错误类型定义

use thiserror::Error;

/// 依赖注入错误类型
///
/// 所有变体对触发它的 `get` 调用都是终止性的：容器不会重试，也不会返回部分构建的对象图。
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("绑定未注册: {key}")]
    UnresolvedBinding { key: String },

    #[error("检测到循环依赖: {dependency_chain}")]
    CircularDependency { dependency_chain: String },

    #[error("参数无法注入: {owner}.{parameter} 的类型没有可解析的绑定键")]
    UnboundParameter { owner: String, parameter: String },

    #[error("类型不匹配: {key} 解析出的实例不是 {expected}")]
    TypeMismatch { key: String, expected: String },

    #[error("组件创建失败: {type_name}, 原因: {source}")]
    ComponentCreationFailed {
        type_name: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("解析深度超出限制: {key} (最大深度 {max_depth})")]
    ResolutionDepthExceeded { key: String, max_depth: usize },
}

impl DependencyError {
    /// 创建未注册绑定错误
    pub fn unresolved(key: impl Into<String>) -> Self {
        Self::UnresolvedBinding { key: key.into() }
    }

    /// 创建参数无法注入错误
    pub fn unbound_parameter(owner: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self::UnboundParameter {
            owner: owner.into(),
            parameter: parameter.into(),
        }
    }

    /// 包装工厂返回的错误
    pub fn creation_failed(
        type_name: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::ComponentCreationFailed {
            type_name: type_name.into(),
            source: source.into(),
        }
    }

    /// 是否为循环依赖错误
    pub fn is_circular(&self) -> bool {
        matches!(self, Self::CircularDependency { .. })
    }

    /// 是否为未注册绑定错误
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Self::UnresolvedBinding { .. })
    }
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置解析失败: {source}")]
    ParseError {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("配置验证失败: {message}")]
    ValidationError { message: String },
}

/// 容器组装错误类型
#[derive(Error, Debug)]
pub enum CompositionError {
    #[error("配置错误: {source}")]
    ConfigError {
        #[from]
        source: ConfigError,
    },

    #[error("依赖注入错误: {source}")]
    DependencyError {
        #[from]
        source: DependencyError,
    },

    #[error("容器组装失败: {message}")]
    BootstrapFailed { message: String },
}

/// 结果类型别名
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type CompositionResult<T> = Result<T, CompositionError>;
