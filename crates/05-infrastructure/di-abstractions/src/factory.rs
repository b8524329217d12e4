//! 注入工厂
//!
//! 把一个普通函数包装成可由容器调用的提供者：参数按签名解析，返回值即提供的实例。

use crate::injectable::{Arguments, ParameterSignature};
use crate::resolver::Resolve;
use di_common::{DependencyError, DependencyResult};
use futures::future::{self, BoxFuture};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

type FactoryFn<T> =
    Arc<dyn Fn(Arguments) -> BoxFuture<'static, DependencyResult<Arc<T>>> + Send + Sync>;

/// 带参数签名的工厂
pub struct Injected<T: ?Sized> {
    signature: Arc<ParameterSignature>,
    factory: FactoryFn<T>,
}

impl<T: ?Sized + Send + Sync + 'static> Injected<T> {
    /// 用签名与接收已补全参数的函数创建工厂
    pub fn new<F, Fut>(signature: ParameterSignature, factory: F) -> Self
    where
        F: Fn(Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = DependencyResult<Arc<T>>> + Send + 'static,
    {
        Self {
            signature: Arc::new(signature),
            factory: Arc::new(move |args: Arguments| {
                Box::pin(factory(args)) as BoxFuture<'static, DependencyResult<Arc<T>>>
            }),
        }
    }

    /// 工厂名称
    pub fn name(&self) -> &'static str {
        self.signature.owner()
    }

    pub fn signature(&self) -> &ParameterSignature {
        &self.signature
    }

    /// 解析全部参数后调用
    pub async fn call(&self, resolver: &dyn Resolve) -> DependencyResult<Arc<T>> {
        self.call_with(resolver, Arguments::new()).await
    }

    /// 部分参数由调用方提供，其余从解析器取得
    pub async fn call_with(
        &self,
        resolver: &dyn Resolve,
        overrides: Arguments,
    ) -> DependencyResult<Arc<T>> {
        let args = Arguments::resolve(&self.signature, resolver, overrides).await?;
        (self.factory)(args).await
    }

    /// 以调用方给出的全部参数直接调用，不经过解析器
    pub fn invoke(&self, args: Arguments) -> BoxFuture<'static, DependencyResult<Arc<T>>> {
        (self.factory)(args)
    }
}

impl<T: Send + Sync + 'static> Injected<T> {
    /// 包装一个无参数的同步函数
    pub fn from_fn<F>(name: &'static str, f: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::new(ParameterSignature::new(name), move |_args: Arguments| {
            future::ready(Ok::<_, DependencyError>(Arc::new(f())))
        })
    }
}

impl<T: ?Sized> Clone for Injected<T> {
    fn clone(&self) -> Self {
        Self {
            signature: self.signature.clone(),
            factory: self.factory.clone(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Injected<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injected")
            .field("signature", &self.signature)
            .finish()
    }
}

/// 创建注入工厂
pub fn inject<T, F, Fut>(signature: ParameterSignature, factory: F) -> Injected<T>
where
    T: ?Sized + Send + Sync + 'static,
    F: Fn(Arguments) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = DependencyResult<Arc<T>>> + Send + 'static,
{
    Injected::new(signature, factory)
}
