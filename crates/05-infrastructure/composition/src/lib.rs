//! # DI Composition
//!
//! 容器组合层：读取容器配置、按需初始化日志、安装模块并构建 [`di_impl::Container`]。
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use di_composition::{CompositionBuilder, LoggingConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let container = CompositionBuilder::new()
//!         .add_config_file("config/di.toml")?
//!         .add_config_env_vars("APP")
//!         .with_logging(LoggingConfig::development())
//!         .build()?;
//!
//!     println!("容器: {}", container.id());
//!     Ok(())
//! }
//! ```

pub mod builder;

pub use builder::{CompositionBuilder, LoggingConfig};
pub use di_common::{CompositionError, CompositionResult};
