//! 全局容器
//!
//! 进程内默认的容器实例。`#[injectable]` 生成的注册代码以及 [`Autowired`] 都使用它；
//! 需要隔离时直接创建 [`Container`]。

use crate::container::Container;
use async_trait::async_trait;
use di_abstractions::{
    Binding, DependencyResult, DiContainer, Injectable, Key, Module, Provider, ResolveExt,
};
use once_cell::sync::Lazy;
use std::sync::Arc;

static DEFAULT_CONTAINER: Lazy<Container> = Lazy::new(Container::new);

/// 全局容器
pub fn container() -> &'static Container {
    &DEFAULT_CONTAINER
}

/// 在全局容器的键下注册提供者
pub fn bind<T: ?Sized + Send + Sync + 'static>(key: Key<T>, provider: Provider<T>) {
    container().bind(key, provider);
}

/// 在全局容器中以类型本身为键注册可注入类型
pub fn add<C: Injectable>() {
    container().add::<C>();
}

/// 在全局容器中依次注册多个绑定
pub fn bind_all<I: IntoIterator<Item = Binding>>(bindings: I) {
    container().bind_all(bindings);
}

/// 在全局容器中安装模块
pub fn install(module: &dyn Module) {
    container().install(module);
}

/// 从全局容器解析
pub async fn get<T: ?Sized + Send + Sync + 'static>(key: Key<T>) -> DependencyResult<Arc<T>> {
    container().get(key).await
}

/// 从全局容器按类型自身解析
///
/// 与 [`di_abstractions::InjectableExt::inject`] 不同，这里遵循绑定的生命周期，
/// 单例绑定会得到共享的实例。
#[async_trait]
pub trait Autowired: Injectable {
    async fn autowired() -> DependencyResult<Arc<Self>> {
        get(Key::<Self>::of()).await
    }
}

impl<T: Injectable> Autowired for T {}
