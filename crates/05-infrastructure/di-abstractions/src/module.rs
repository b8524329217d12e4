//! 模块
//!
//! 模块把一组相关的绑定打包，并可以导入其他模块。

use crate::provider::Binding;
use std::any::TypeId;

/// 绑定模块
///
/// 安装时先深度优先安装 [`Module::imports`]，再注册本模块的 [`Module::providers`]。
/// 同一个模块类型在一个容器里只安装一次，因此菱形或循环导入都是安全的。
pub trait Module: Send + Sync + 'static {
    /// 模块名称，用于日志
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// 模块标识，用于去重
    fn module_id(&self) -> TypeId {
        TypeId::of::<Self>()
    }

    /// 导入的模块
    fn imports(&self) -> Vec<Box<dyn Module>> {
        Vec::new()
    }

    /// 本模块提供的绑定
    fn providers(&self) -> Vec<Binding>;
}
