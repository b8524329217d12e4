//! 组件生命周期

use serde::{Deserialize, Serialize};

/// 组件生命周期类型
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifetime {
    /// 单例模式 - 进程生命周期内只创建一个实例
    #[default]
    Singleton,
    /// 瞬时模式 - 每次解析都重新构建
    Transient,
}

impl Lifetime {
    /// 是否需要缓存解析结果
    pub fn is_cached(self) -> bool {
        matches!(self, Self::Singleton)
    }
}

impl std::fmt::Display for Lifetime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Singleton => f.write_str("singleton"),
            Self::Transient => f.write_str("transient"),
        }
    }
}
