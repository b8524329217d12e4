//! # 依赖注入具体实现
//!
//! 提供运行时依赖注入容器、绑定注册表、单例缓存和解析器实现。
//!
//! ```ignore
//! use di_impl::prelude::*;
//!
//! let container = Container::new();
//! container.bind(generic_key::<RepoOf, User>(), Provider::class::<UserSqlRepo>());
//! container.add::<UserService>();
//!
//! let service = container.resolve::<UserService>().await?;
//! ```

pub mod container;
pub mod global;
pub mod registry;
pub mod singleton;

mod resolver;

pub use container::Container;
pub use global::Autowired;
pub use registry::Registry;
pub use singleton::SingletonCache;

/// 常用类型
pub mod prelude {
    pub use crate::{global, Autowired, Container};
    pub use di_abstractions::prelude::*;
}
