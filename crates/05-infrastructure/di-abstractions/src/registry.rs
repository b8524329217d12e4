//! 绑定注册表抽象接口

use crate::key::BindingKey;
use crate::provider::ErasedProvider;

/// 绑定注册表 trait
///
/// 每个键至多一个提供者，后注册的覆盖先注册的。
pub trait BindingRegistry: Send + Sync {
    /// 注册提供者，返回被替换的旧提供者
    fn register(&self, key: BindingKey, provider: ErasedProvider) -> Option<ErasedProvider>;

    /// 获取提供者的副本
    fn provider(&self, key: &BindingKey) -> Option<ErasedProvider>;

    /// 检查键是否已绑定
    fn contains(&self, key: &BindingKey) -> bool;

    /// 所有已绑定的键与提供者
    fn entries(&self) -> Vec<(BindingKey, ErasedProvider)>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
