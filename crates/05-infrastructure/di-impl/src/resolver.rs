//! 嵌套解析器
//!
//! 构造函数拿到的解析器携带当前的解析上下文，从而能在任意深度检测循环依赖。

use crate::container::Container;
use crate::singleton::ResolutionId;
use async_trait::async_trait;
use di_abstractions::{BindingKey, DependencyResult, Instance, Resolve, ResolutionContext};

/// 带解析上下文的解析器
pub(crate) struct ScopedResolver {
    container: Container,
    context: ResolutionContext,
    resolution: ResolutionId,
}

impl ScopedResolver {
    pub(crate) fn new(
        container: Container,
        context: ResolutionContext,
        resolution: ResolutionId,
    ) -> Self {
        Self {
            container,
            context,
            resolution,
        }
    }
}

#[async_trait]
impl Resolve for ScopedResolver {
    async fn resolve_key(&self, key: &BindingKey) -> DependencyResult<Instance> {
        self.container
            .resolve_in(key, &self.context, self.resolution)
            .await
    }
}
