//! 依赖解析器抽象接口
//!
//! 提供按绑定键解析实例的能力

use crate::key::{BindingKey, Key};
use crate::provider::{downcast, Instance};
use async_trait::async_trait;
use di_common::{DependencyError, DependencyResult};
use std::sync::Arc;

/// 依赖解析器 trait
///
/// 容器本身以及每一层嵌套解析都实现该接口；构造函数只通过它取得依赖。
#[async_trait]
pub trait Resolve: Send + Sync {
    /// 解析指定键的实例
    async fn resolve_key(&self, key: &BindingKey) -> DependencyResult<Instance>;
}

/// 带类型的解析方法
#[async_trait]
pub trait ResolveExt: Resolve {
    /// 解析指定键并还原为其输出类型
    async fn get<T>(&self, key: Key<T>) -> DependencyResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let instance = self.resolve_key(key.binding()).await?;
        downcast::<T>(key.binding(), &instance)
    }

    /// 以 `T` 本身为键解析
    async fn resolve<T>(&self) -> DependencyResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.get(Key::<T>::of()).await
    }
}

impl<R: Resolve + ?Sized> ResolveExt for R {}

#[async_trait]
impl<R: Resolve + ?Sized> Resolve for Arc<R> {
    async fn resolve_key(&self, key: &BindingKey) -> DependencyResult<Instance> {
        (**self).resolve_key(key).await
    }
}

/// 解析上下文
///
/// 记录一次顶层 `get` 中正在构建的键。每进入一层嵌套解析就派生一个新的上下文，
/// 离开该层时派生出的上下文随之丢弃，因此不需要显式出栈。
#[derive(Debug, Clone, Default)]
pub struct ResolutionContext {
    /// 当前解析链，用于检测循环依赖
    resolution_chain: Vec<BindingKey>,
}

impl ResolutionContext {
    /// 创建新的解析上下文
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前解析深度
    pub fn depth(&self) -> usize {
        self.resolution_chain.len()
    }

    pub fn chain(&self) -> &[BindingKey] {
        &self.resolution_chain
    }

    pub fn contains(&self, key: &BindingKey) -> bool {
        self.resolution_chain.contains(key)
    }

    /// 添加键到解析链
    pub fn push_key(&mut self, key: BindingKey) -> DependencyResult<()> {
        if self.contains(&key) {
            return Err(DependencyError::CircularDependency {
                dependency_chain: self.describe_cycle(&key),
            });
        }
        self.resolution_chain.push(key);
        Ok(())
    }

    /// 从解析链中移除最后一个键
    pub fn pop_key(&mut self) -> Option<BindingKey> {
        self.resolution_chain.pop()
    }

    /// 派生进入 `key` 之后的子上下文
    pub fn enter(&self, key: &BindingKey) -> DependencyResult<Self> {
        let mut child = self.clone();
        child.push_key(*key)?;
        Ok(child)
    }

    fn describe_cycle(&self, key: &BindingKey) -> String {
        let start = self
            .resolution_chain
            .iter()
            .position(|entry| entry == key)
            .unwrap_or(0);

        self.resolution_chain[start..]
            .iter()
            .chain(std::iter::once(key))
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}
