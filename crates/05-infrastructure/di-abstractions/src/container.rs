//! 依赖注入容器抽象接口
//!
//! 提供依赖注入容器的核心抽象

use crate::injectable::Injectable;
use crate::key::{BindingKey, Key};
use crate::module::Module;
use crate::provider::{Binding, Provider};
use crate::resolver::Resolve;
use di_common::{ConfigError, ConfigResult, Lifetime};
use serde::{Deserialize, Serialize};

/// 依赖注入容器 trait
///
/// 注册可以在任何时刻进行，包括已经发生过解析之后。解析方法来自 [`crate::ResolveExt`]。
pub trait DiContainer: Resolve {
    /// 注册绑定，同一个键后注册的覆盖先注册的
    fn bind_binding(&self, binding: Binding);

    /// 安装模块及其导入的模块
    fn install(&self, module: &dyn Module);

    /// 检查键是否已绑定
    fn is_bound(&self, key: &BindingKey) -> bool;

    /// 在键下注册提供者
    fn bind<T>(&self, key: Key<T>, provider: Provider<T>)
    where
        T: ?Sized + Send + Sync + 'static,
        Self: Sized,
    {
        self.bind_binding(Binding::new(key, provider));
    }

    /// 以类型本身为键注册可注入类型
    fn add<C: Injectable>(&self)
    where
        Self: Sized,
    {
        self.bind_binding(Binding::class::<C>());
    }

    /// 依次注册多个绑定
    fn bind_all<I>(&self, bindings: I)
    where
        I: IntoIterator<Item = Binding>,
        Self: Sized,
    {
        for binding in bindings {
            self.bind_binding(binding);
        }
    }
}

/// 容器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// 未显式指定生命周期的提供者采用的生命周期
    pub default_lifetime: Lifetime,
    /// 最大解析深度
    pub max_resolution_depth: usize,
}

impl ContainerConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_resolution_depth == 0 {
            return Err(ConfigError::ValidationError {
                message: "max_resolution_depth 必须大于 0".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            default_lifetime: Lifetime::Singleton,
            max_resolution_depth: 64,
        }
    }
}

/// 容器统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContainerStats {
    /// 已绑定的键数量
    pub bound_keys: usize,
    /// 已缓存的单例数量
    pub cached_singletons: usize,
    /// 解析请求总数（含嵌套解析）
    pub resolutions: u64,
    /// 命中单例缓存的次数
    pub cache_hits: u64,
    /// 调用提供者的次数
    pub provider_invocations: u64,
}
