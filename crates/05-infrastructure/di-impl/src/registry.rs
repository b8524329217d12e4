//! 绑定注册表实现

use di_abstractions::{BindingKey, BindingRegistry, ErasedProvider};
use parking_lot::RwLock;
use std::collections::HashMap;

/// 基于读写锁的绑定注册表
///
/// 读取时只复制出提供者，锁不会跨越任何 await。
#[derive(Debug, Default)]
pub struct Registry {
    bindings: RwLock<HashMap<BindingKey, ErasedProvider>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BindingRegistry for Registry {
    fn register(&self, key: BindingKey, provider: ErasedProvider) -> Option<ErasedProvider> {
        self.bindings.write().insert(key, provider)
    }

    fn provider(&self, key: &BindingKey) -> Option<ErasedProvider> {
        self.bindings.read().get(key).cloned()
    }

    fn contains(&self, key: &BindingKey) -> bool {
        self.bindings.read().contains_key(key)
    }

    fn entries(&self) -> Vec<(BindingKey, ErasedProvider)> {
        self.bindings
            .read()
            .iter()
            .map(|(key, provider)| (*key, provider.clone()))
            .collect()
    }

    fn len(&self) -> usize {
        self.bindings.read().len()
    }
}
