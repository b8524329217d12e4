//! # 用户服务演示
//!
//! 用注入标记声明仓储、用例、服务与控制器，由容器组装完整的对象图：
//! - 按实体类型区分的泛型仓储键
//! - 工厂提供的 API Key
//! - 模块与多重绑定组成的命令总线
//! - 手动提供参数绕过容器

use async_trait::async_trait;
use di_abstractions::{
    generic_key, Arguments, Binding, GenericCapability, InjectableExt, Key, Module, Provider,
    ResolveExt,
};
use di_composition::{CompositionBuilder, LoggingConfig};
use di_impl::Autowired;
use di_macros::{inject, injectable};
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
}

#[async_trait]
pub trait Repo<E>: Send + Sync {
    async fn get(&self, id: &str) -> E;
    async fn save(&self, entity: &E);
}

/// 按实体类型区分的仓储族
pub struct RepoOf;

impl<E: 'static> GenericCapability<E> for RepoOf {
    type Output = dyn Repo<E>;
}

#[inject(provides(dyn Repo<User>))]
pub struct UserSqlRepo {
    #[inject(default)]
    rows: Mutex<Vec<String>>,
}

#[async_trait]
impl Repo<User> for UserSqlRepo {
    async fn get(&self, id: &str) -> User {
        User {
            id: id.to_string(),
            name: "John".to_string(),
        }
    }

    async fn save(&self, entity: &User) {
        info!("保存用户 {} 到 SQL", entity.id);
        if let Ok(mut rows) = self.rows.lock() {
            rows.push(entity.id.clone());
        }
    }
}

#[derive(Debug, Clone)]
pub struct UserRequest {
    pub id: String,
    pub name: String,
}

#[async_trait]
pub trait UseCase: Send + Sync {
    fn name(&self) -> &'static str;
    async fn run(&self, request: UserRequest) -> User;
}

#[inject(provides(dyn UseCase))]
pub struct CreateUser {
    #[inject(key = generic_key::<RepoOf, User>())]
    repo: Arc<dyn Repo<User>>,
}

#[async_trait]
impl UseCase for CreateUser {
    fn name(&self) -> &'static str {
        "create_user"
    }

    async fn run(&self, request: UserRequest) -> User {
        let user = User {
            id: request.id,
            name: request.name,
        };
        self.repo.save(&user).await;
        user
    }
}

#[inject(provides(dyn UseCase))]
pub struct GetUser {
    #[inject(key = generic_key::<RepoOf, User>())]
    repo: Arc<dyn Repo<User>>,
}

#[async_trait]
impl UseCase for GetUser {
    fn name(&self) -> &'static str {
        "get_user"
    }

    async fn run(&self, request: UserRequest) -> User {
        self.repo.get(&request.id).await
    }
}

#[inject]
pub struct UserService {
    #[inject(key = generic_key::<RepoOf, User>())]
    repo: Arc<dyn Repo<User>>,
    create_user: Arc<CreateUser>,
}

impl UserService {
    pub async fn create_user(&self, request: UserRequest) -> User {
        self.create_user.run(request).await
    }

    pub async fn get_user(&self, id: &str) -> User {
        self.repo.get(id).await
    }
}

#[derive(Debug)]
pub struct ApiKey(String);

#[inject]
fn api_key() -> ApiKey {
    ApiKey("some-random-apikey".to_string())
}

#[inject]
pub struct UserController {
    service: Arc<UserService>,
    api_key: Arc<ApiKey>,
}

impl UserController {
    pub async fn get_user(&self, id: &str) -> User {
        self.service.get_user(id).await
    }
}

#[inject]
pub struct CommandBus {
    usecases: Arc<Vec<Arc<dyn UseCase>>>,
}

/// 启动时自动注册到全局容器
#[injectable]
pub struct Banner {
    #[inject(default)]
    greeting: String,
}

struct UserModule;

impl Module for UserModule {
    fn providers(&self) -> Vec<Binding> {
        vec![
            Binding::to::<dyn Repo<User>, UserSqlRepo>(generic_key::<RepoOf, User>()),
            Binding::class::<CreateUser>(),
            Binding::class::<UserService>(),
            Binding::class::<UserController>(),
            Binding::factory(api_key::injected()),
        ]
    }
}

struct CqrsModule;

impl Module for CqrsModule {
    fn imports(&self) -> Vec<Box<dyn Module>> {
        vec![Box::new(UserModule)]
    }

    fn providers(&self) -> Vec<Binding> {
        vec![
            Binding::many::<dyn UseCase>(vec![
                Provider::class::<CreateUser>(),
                Provider::class::<GetUser>(),
            ]),
            Binding::class::<CommandBus>(),
        ]
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let container = CompositionBuilder::new()
        .add_config_env_vars("USER_SERVICE")
        .with_logging(LoggingConfig::development())
        .add_module(CqrsModule)
        .build()?;

    let controller = container.get(Key::<UserController>::of()).await?;
    let user = controller.get_user("1").await;
    info!("控制器 API Key: {}, 查询到用户: {}", controller.api_key.0, user.name);

    let created = controller
        .service
        .create_user(UserRequest {
            id: "2".to_string(),
            name: "Jack".to_string(),
        })
        .await;
    info!("创建用户: {} ({})", created.name, created.id);

    let bus = container.get(Key::<CommandBus>::of()).await?;
    for usecase in bus.usecases.iter() {
        info!("命令总线用例: {}", usecase.name());
    }

    let manual = UserController::inject_with(
        &container,
        Arguments::new().with("api_key", Arc::new(ApiKey("manual-key".to_string()))),
    )
    .await?;
    info!("手动提供参数的控制器 API Key: {}", manual.api_key.0);

    let banner = Banner::autowired().await?;
    info!("全局容器中的 Banner: {:?}", banner.greeting);

    for (key, description) in container.bindings() {
        info!("绑定 {} => {}", key, description);
    }
    info!("容器统计: {:?}", container.stats());

    Ok(())
}
