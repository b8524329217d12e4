//! # DI Common
//!
//! 依赖注入容器各层共用的基础类型。
//!
//! ## 核心类型
//!
//! - [`DependencyError`] - 解析失败的错误分类
//! - [`Lifetime`] - 提供者的生命周期策略
//! - [`TypeInfo`] - 稳定的运行时类型标识

pub mod errors;
pub mod lifecycle;
pub mod metadata;

pub use errors::*;
pub use lifecycle::*;
pub use metadata::*;
