//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义绑定注册与依赖解析的核心接口。
//!
//! ## 核心接口
//!
//! - [`Key`] / [`BindingKey`] - 绑定键，能力类型加可选的类型参数
//! - [`Provider`] / [`Binding`] - 提供者与键的配对
//! - [`Injectable`] / [`Injected`] - 注入标记，声明构造参数
//! - [`Resolve`] - 依赖解析器接口
//! - [`DiContainer`] - 容器接口
//! - [`Module`] - 绑定模块

pub mod container;
pub mod factory;
pub mod injectable;
pub mod key;
pub mod module;
pub mod provider;
pub mod registry;
pub mod resolver;

pub use container::*;
pub use factory::*;
pub use injectable::*;
pub use key::*;
pub use module::*;
pub use provider::*;
pub use registry::*;
pub use resolver::*;

pub use di_common::{DependencyError, DependencyResult, Lifetime, TypeInfo};

/// 常用类型
pub mod prelude {
    pub use crate::{
        generic_key, inject, key, Arguments, Binding, BindingKey, DiContainer, GenericCapability,
        Injectable, InjectableExt, Injected, Key, Module, ParameterSignature, Provider, Resolve,
        ResolveExt, Upcast,
    };
    pub use di_common::{DependencyError, DependencyResult, Lifetime};
}
