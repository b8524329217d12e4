//! 依赖注入容器实现

use crate::registry::Registry;
use crate::resolver::ScopedResolver;
use crate::singleton::{ResolutionId, SingletonCache};
use async_trait::async_trait;
use di_abstractions::{
    Binding, BindingKey, BindingRegistry, Constructor, ContainerConfig, ContainerStats,
    DependencyError, DependencyResult, DiContainer, ErasedProvider, Instance, Module,
    ProviderSource, Resolve, ResolutionContext,
};
use parking_lot::Mutex;
use std::any::TypeId;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};
use uuid::Uuid;

/// 解析计数
#[derive(Debug, Default)]
struct ResolutionCounters {
    resolutions: AtomicU64,
    cache_hits: AtomicU64,
    provider_invocations: AtomicU64,
}

struct ContainerInner {
    id: Uuid,
    config: ContainerConfig,
    registry: Registry,
    singletons: SingletonCache,
    installed_modules: Mutex<HashSet<TypeId>>,
    counters: ResolutionCounters,
    next_resolution: AtomicU64,
}

/// 依赖注入容器
///
/// 克隆得到的是同一个容器的句柄。注册与解析都只需要共享引用，可以在多个任务间并发进行。
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

impl Container {
    /// 创建使用默认配置的容器
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    /// 创建使用指定配置的容器
    pub fn with_config(config: ContainerConfig) -> Self {
        let id = Uuid::new_v4();
        debug!(
            container = %id,
            "创建依赖注入容器: 默认生命周期 {}, 最大解析深度 {}",
            config.default_lifetime,
            config.max_resolution_depth
        );

        Self {
            inner: Arc::new(ContainerInner {
                id,
                config,
                registry: Registry::new(),
                singletons: SingletonCache::new(),
                installed_modules: Mutex::new(HashSet::new()),
                counters: ResolutionCounters::default(),
                next_resolution: AtomicU64::new(0),
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.inner.config
    }

    /// 所有绑定的诊断描述，按键排序
    pub fn bindings(&self) -> Vec<(BindingKey, String)> {
        let mut bindings: Vec<_> = self
            .inner
            .registry
            .entries()
            .into_iter()
            .map(|(key, provider)| (key, provider.describe()))
            .collect();
        bindings.sort_by_cached_key(|(key, _)| key.to_string());
        bindings
    }

    /// 键的单例是否已经构建
    pub fn is_cached(&self, key: &BindingKey) -> bool {
        self.inner.singletons.contains(key)
    }

    /// 统计信息快照
    pub fn stats(&self) -> ContainerStats {
        let counters = &self.inner.counters;
        ContainerStats {
            bound_keys: self.inner.registry.len(),
            cached_singletons: self.inner.singletons.len(),
            resolutions: counters.resolutions.load(Ordering::Relaxed),
            cache_hits: counters.cache_hits.load(Ordering::Relaxed),
            provider_invocations: counters.provider_invocations.load(Ordering::Relaxed),
        }
    }

    /// 在给定上下文中解析键
    ///
    /// `resolution` 标识发起解析的顶层 `get`，嵌套解析沿用同一个编号。
    pub(crate) async fn resolve_in(
        &self,
        key: &BindingKey,
        context: &ResolutionContext,
        resolution: ResolutionId,
    ) -> DependencyResult<Instance> {
        self.inner.counters.resolutions.fetch_add(1, Ordering::Relaxed);

        if let Some(instance) = self.inner.singletons.get(key) {
            self.inner.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
            trace!(container = %self.inner.id, "命中单例缓存: {}", key);
            return Ok(instance);
        }

        let context = context.enter(key)?;
        let max_depth = self.inner.config.max_resolution_depth;
        if context.depth() > max_depth {
            return Err(DependencyError::ResolutionDepthExceeded {
                key: key.to_string(),
                max_depth,
            });
        }

        let provider = self
            .inner
            .registry
            .provider(key)
            .ok_or_else(|| DependencyError::unresolved(key.to_string()))?;

        let construct = match provider.source() {
            ProviderSource::Instance(instance) => return Ok(instance.clone()),
            ProviderSource::Class { construct, .. } | ProviderSource::Factory { construct, .. } => {
                construct.clone()
            }
        };
        let resolver: Arc<dyn Resolve> = Arc::new(ScopedResolver::new(
            self.clone(),
            context.clone(),
            resolution,
        ));

        if provider.lifetime().is_cached() {
            self.inner
                .singletons
                .get_or_try_init(resolution, context.chain(), || {
                    self.invoke(key, &provider, construct, resolver)
                })
                .await
        } else {
            self.invoke(key, &provider, construct, resolver).await
        }
    }

    async fn invoke(
        &self,
        key: &BindingKey,
        provider: &ErasedProvider,
        construct: Constructor,
        resolver: Arc<dyn Resolve>,
    ) -> DependencyResult<Instance> {
        self.inner
            .counters
            .provider_invocations
            .fetch_add(1, Ordering::Relaxed);
        debug!(container = %self.inner.id, "调用提供者: {} ({})", key, provider.describe());

        construct(resolver).await
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("id", &self.inner.id)
            .field("config", &self.inner.config)
            .field("stats", &self.stats())
            .finish()
    }
}

#[async_trait]
impl Resolve for Container {
    async fn resolve_key(&self, key: &BindingKey) -> DependencyResult<Instance> {
        let resolution = self.inner.next_resolution.fetch_add(1, Ordering::Relaxed);
        self.resolve_in(key, &ResolutionContext::new(), resolution).await
    }
}

impl DiContainer for Container {
    fn bind_binding(&self, binding: Binding) {
        let (key, provider) = binding.into_parts();
        let provider = provider.with_default_lifetime(self.inner.config.default_lifetime);
        let description = provider.describe();

        match self.inner.registry.register(key, provider) {
            Some(_) => {
                debug!(container = %self.inner.id, "替换绑定: {} => {}", key, description);
                if self.inner.singletons.contains(&key) {
                    debug!(container = %self.inner.id, "已缓存的单例保持不变: {}", key);
                }
            }
            None => debug!(container = %self.inner.id, "注册绑定: {} => {}", key, description),
        }
    }

    fn install(&self, module: &dyn Module) {
        if !self.inner.installed_modules.lock().insert(module.module_id()) {
            debug!(container = %self.inner.id, "模块已安装，跳过: {}", module.name());
            return;
        }

        for import in module.imports() {
            self.install(import.as_ref());
        }

        let providers = module.providers();
        debug!(
            container = %self.inner.id,
            "安装模块: {} ({} 个绑定)",
            module.name(),
            providers.len()
        );
        self.bind_all(providers);
    }

    fn is_bound(&self, key: &BindingKey) -> bool {
        self.inner.registry.contains(key)
    }
}
