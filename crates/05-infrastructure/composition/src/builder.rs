//! 容器构建器

use di_abstractions::{Binding, ContainerConfig, DiContainer, Module};
use di_common::{CompositionError, CompositionResult, ConfigError, ConfigResult};
use di_impl::Container;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// 配置中容器设置所在的节
const CONTAINER_SECTION: &str = "container";

/// 环境变量的层级分隔符，例如 `APP__CONTAINER__MAX_RESOLUTION_DEPTH`
const ENV_SEPARATOR: &str = "__";

/// 容器构建器
///
/// 使用建造者模式组装容器：读取配置、按需初始化日志、安装模块、注册绑定。
pub struct CompositionBuilder {
    /// 配置文件列表，后添加的覆盖先添加的
    config_files: Vec<PathBuf>,
    /// 环境变量前缀
    env_prefix: Option<String>,
    /// 显式指定的容器配置，优先于配置源
    container_config: Option<ContainerConfig>,
    modules: Vec<Box<dyn Module>>,
    bindings: Vec<Binding>,
    /// 日志配置，`None` 表示不初始化日志
    logging: Option<LoggingConfig>,
}

impl CompositionBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self {
            config_files: Vec::new(),
            env_prefix: None,
            container_config: None,
            modules: Vec::new(),
            bindings: Vec::new(),
            logging: None,
        }
    }

    /// 添加配置文件，格式由扩展名决定（TOML / JSON / YAML）
    pub fn add_config_file<P: AsRef<Path>>(mut self, path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        debug!("添加配置文件: {}", path.display());
        self.config_files.push(path.to_path_buf());
        Ok(self)
    }

    /// 添加环境变量配置源
    pub fn add_config_env_vars<S: Into<String>>(mut self, prefix: S) -> Self {
        let prefix = prefix.into();
        debug!("添加环境变量配置源，前缀: {}", prefix);
        self.env_prefix = Some(prefix);
        self
    }

    /// 直接指定容器配置，忽略配置源中的 `[container]` 节
    pub fn with_container_config(mut self, config: ContainerConfig) -> Self {
        self.container_config = Some(config);
        self
    }

    /// 添加模块
    pub fn add_module<M: Module>(mut self, module: M) -> Self {
        debug!("添加模块: {}", module.name());
        self.modules.push(Box::new(module));
        self
    }

    /// 添加单个绑定，在所有模块之后注册
    pub fn add_binding(mut self, binding: Binding) -> Self {
        self.bindings.push(binding);
        self
    }

    /// 配置日志
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging = Some(config);
        self
    }

    /// 读取最终生效的容器配置
    pub fn load_container_config(&self) -> ConfigResult<ContainerConfig> {
        let config = match &self.container_config {
            Some(config) => config.clone(),
            None => self.read_config_sources()?,
        };
        config.validate()?;
        Ok(config)
    }

    fn read_config_sources(&self) -> ConfigResult<ContainerConfig> {
        let mut builder = config::Config::builder();
        for path in &self.config_files {
            builder = builder.add_source(config::File::from(path.as_path()));
        }
        if let Some(prefix) = &self.env_prefix {
            builder = builder.add_source(
                config::Environment::with_prefix(prefix)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            );
        }

        let settings = builder.build().map_err(parse_error)?;
        match settings.get::<ContainerConfig>(CONTAINER_SECTION) {
            Ok(config) => Ok(config),
            Err(config::ConfigError::NotFound(_)) => Ok(ContainerConfig::default()),
            Err(err) => Err(parse_error(err)),
        }
    }

    /// 构建容器
    pub fn build(self) -> CompositionResult<Container> {
        if let Some(logging) = &self.logging {
            logging.init()?;
        }

        let config = self.load_container_config()?;
        info!(
            "开始构建容器: {} 个模块, {} 个绑定",
            self.modules.len(),
            self.bindings.len()
        );

        let container = Container::with_config(config);
        for module in &self.modules {
            container.install(module.as_ref());
        }
        container.bind_all(self.bindings);

        info!(container = %container.id(), "容器构建完成");
        Ok(container)
    }
}

impl Default for CompositionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_error(err: config::ConfigError) -> ConfigError {
    ConfigError::ParseError {
        source: Box::new(err),
    }
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志级别，`RUST_LOG` 存在时以其为准
    pub level: tracing::Level,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否显示文件名
    pub show_file: bool,
    /// 是否显示行号
    pub show_line_number: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 创建开发环境日志配置
    pub fn development() -> Self {
        Self {
            level: tracing::Level::DEBUG,
            show_target: true,
            show_thread_ids: true,
            show_file: true,
            show_line_number: true,
            json_format: false,
        }
    }

    /// 创建生产环境日志配置
    pub fn production() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: false,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: true,
        }
    }

    /// 安装全局订阅者，已经安装过时返回错误
    pub fn init(&self) -> CompositionResult<()> {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.to_string().to_lowercase()));

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(self.show_target)
            .with_thread_ids(self.show_thread_ids)
            .with_file(self.show_file)
            .with_line_number(self.show_line_number);

        if self.json_format {
            subscriber.json().try_init()
        } else {
            subscriber.try_init()
        }
        .map_err(|e| CompositionError::BootstrapFailed {
            message: format!("日志初始化失败: {}", e),
        })?;

        info!("日志系统初始化完成");
        Ok(())
    }
}
