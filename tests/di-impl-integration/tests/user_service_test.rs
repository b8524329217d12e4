//! 用户服务场景的端到端测试，全部手写 `Injectable` 实现，不依赖宏
use async_trait::async_trait;
use di_abstractions::{
    generic_key, Arguments, Binding, DependencyError, DependencyResult, DiContainer,
    GenericCapability, Injectable, InjectableExt, Injected, Key, Module, ParameterSignature,
    Provider, ResolveExt, Upcast,
};
use di_impl::Container;
use futures::future::BoxFuture;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
struct User {
    id: String,
    name: String,
}

#[derive(Debug, Clone, PartialEq)]
struct Order {
    id: String,
}

#[async_trait]
trait Repo<E>: Send + Sync {
    async fn get(&self, id: &str) -> E;
    async fn save(&self, entity: &E);
}

/// 按实体类型区分的仓储族
struct RepoOf;

impl<E: 'static> GenericCapability<E> for RepoOf {
    type Output = dyn Repo<E>;
}

#[derive(Default)]
struct UserSQLRepo {
    saved: Mutex<Vec<String>>,
}

#[async_trait]
impl Repo<User> for UserSQLRepo {
    async fn get(&self, id: &str) -> User {
        User {
            id: id.to_string(),
            name: "John".to_string(),
        }
    }

    async fn save(&self, entity: &User) {
        self.saved.lock().unwrap().push(entity.id.clone());
    }
}

impl Injectable for UserSQLRepo {
    fn signature() -> ParameterSignature {
        ParameterSignature::new("UserSQLRepo")
    }

    fn construct(_args: Arguments) -> DependencyResult<Self> {
        Ok(Self::default())
    }
}

impl Upcast<dyn Repo<User>> for UserSQLRepo {
    fn upcast(self: Arc<Self>) -> Arc<dyn Repo<User>> {
        self
    }
}

struct OrderSQLRepo;

#[async_trait]
impl Repo<Order> for OrderSQLRepo {
    async fn get(&self, id: &str) -> Order {
        Order { id: id.to_string() }
    }

    async fn save(&self, _entity: &Order) {}
}

impl Injectable for OrderSQLRepo {
    fn signature() -> ParameterSignature {
        ParameterSignature::new("OrderSQLRepo")
    }

    fn construct(_args: Arguments) -> DependencyResult<Self> {
        Ok(Self)
    }
}

impl Upcast<dyn Repo<Order>> for OrderSQLRepo {
    fn upcast(self: Arc<Self>) -> Arc<dyn Repo<Order>> {
        self
    }
}

#[derive(Debug, Clone)]
struct UserRequest {
    id: String,
    name: String,
}

impl UserRequest {
    fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}

#[async_trait]
trait UseCase: Send + Sync {
    fn name(&self) -> &'static str;
    async fn run(&self, request: UserRequest) -> User;
}

struct CreateUser {
    repo: Arc<dyn Repo<User>>,
}

impl Injectable for CreateUser {
    fn signature() -> ParameterSignature {
        ParameterSignature::new("CreateUser").parameter("repo", generic_key::<RepoOf, User>())
    }

    fn construct(mut args: Arguments) -> DependencyResult<Self> {
        Ok(Self {
            repo: args.take::<dyn Repo<User>>("repo")?,
        })
    }
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

impl Upcast<dyn UseCase> for CreateUser {
    fn upcast(self: Arc<Self>) -> Arc<dyn UseCase> {
        self
    }
}

struct GetUser {
    repo: Arc<dyn Repo<User>>,
}

impl Injectable for GetUser {
    fn signature() -> ParameterSignature {
        ParameterSignature::new("GetUser").parameter("repo", generic_key::<RepoOf, User>())
    }

    fn construct(mut args: Arguments) -> DependencyResult<Self> {
        Ok(Self {
            repo: args.take::<dyn Repo<User>>("repo")?,
        })
    }
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

impl Upcast<dyn UseCase> for GetUser {
    fn upcast(self: Arc<Self>) -> Arc<dyn UseCase> {
        self
    }
}

struct UserService {
    repo: Arc<dyn Repo<User>>,
    create_user: Arc<CreateUser>,
}

impl UserService {
    async fn create_user(&self, request: UserRequest) -> User {
        let user = self.create_user.run(request).await;
        self.repo.save(&user).await;
        user
    }

    async fn get_user(&self, id: &str) -> User {
        self.repo.get(id).await
    }
}

impl Injectable for UserService {
    fn signature() -> ParameterSignature {
        ParameterSignature::new("UserService")
            .parameter("repo", generic_key::<RepoOf, User>())
            .parameter("create_user", Key::<CreateUser>::of())
    }

    fn construct(mut args: Arguments) -> DependencyResult<Self> {
        Ok(Self {
            repo: args.take::<dyn Repo<User>>("repo")?,
            create_user: args.take::<CreateUser>("create_user")?,
        })
    }
}

#[derive(Debug)]
struct ApiKey {
    key: String,
}

fn api_key_factory() -> Injected<ApiKey> {
    Injected::from_fn("api_key_factory", || ApiKey {
        key: "some-random-apikey".to_string(),
    })
}

struct UserController {
    service: Arc<UserService>,
    api_key: String,
}

impl Injectable for UserController {
    fn signature() -> ParameterSignature {
        ParameterSignature::new("UserController")
            .parameter("service", Key::<UserService>::of())
            .parameter("api_key", Key::<ApiKey>::of())
    }

    fn construct(mut args: Arguments) -> DependencyResult<Self> {
        Ok(Self {
            service: args.take::<UserService>("service")?,
            api_key: args.take::<ApiKey>("api_key")?.key.clone(),
        })
    }
}

struct CommandBus {
    usecases: Arc<Vec<Arc<dyn UseCase>>>,
}

impl Injectable for CommandBus {
    fn signature() -> ParameterSignature {
        ParameterSignature::new("CommandBus")
            .parameter("usecases", Key::<Vec<Arc<dyn UseCase>>>::of())
    }

    fn construct(mut args: Arguments) -> DependencyResult<Self> {
        Ok(Self {
            usecases: args.take::<Vec<Arc<dyn UseCase>>>("usecases")?,
        })
    }
}

/// 返回闭包的工厂
type CreateUserFn = dyn Fn(UserRequest) -> BoxFuture<'static, User> + Send + Sync;

fn create_user_usecase() -> Injected<CreateUserFn> {
    Injected::new(
        ParameterSignature::new("create_user_usecase")
            .parameter("repo", generic_key::<RepoOf, User>()),
        |mut args: Arguments| async move {
            let repo = args.take::<dyn Repo<User>>("repo")?;
            let run: Arc<CreateUserFn> = Arc::new(move |request: UserRequest| {
                let repo = repo.clone();
                Box::pin(async move {
                    let user = User {
                        id: request.id,
                        name: request.name,
                    };
                    repo.save(&user).await;
                    user
                }) as BoxFuture<'static, User>
            });
            Ok::<_, DependencyError>(run)
        },
    )
}

fn user_container() -> Container {
    let container = Container::new();
    container.bind_all([
        Binding::to::<dyn Repo<User>, UserSQLRepo>(generic_key::<RepoOf, User>()),
        Binding::class::<CreateUser>(),
        Binding::class::<UserService>(),
        Binding::class::<UserController>(),
        Binding::factory(api_key_factory()),
    ]);
    container
}

#[tokio::test]
async fn test_controller_graph_is_wired() {
    let container = user_container();

    let controller = container.get(Key::<UserController>::of()).await.unwrap();
    let user = controller.service.get_user("1").await;

    assert_eq!(controller.api_key, "some-random-apikey");
    assert_eq!(user.name, "John");
}

#[tokio::test]
async fn test_singleton_repo_is_shared_across_graph() {
    let container = user_container();

    let controller = container.get(Key::<UserController>::of()).await.unwrap();
    let service = container.get(Key::<UserService>::of()).await.unwrap();
    let repo = container.get(generic_key::<RepoOf, User>()).await.unwrap();

    assert!(Arc::ptr_eq(&controller.service, &service));
    assert!(Arc::ptr_eq(&service.repo, &repo));
    assert!(Arc::ptr_eq(&service.create_user.repo, &repo));
}

#[tokio::test]
async fn test_api_key_factory_result_is_cached() {
    let container = Container::new();
    container.bind(Key::<ApiKey>::of(), Provider::factory(api_key_factory()));

    let first = container.get(Key::<ApiKey>::of()).await.unwrap();
    let second = container.get(Key::<ApiKey>::of()).await.unwrap();

    assert_eq!(first.key, "some-random-apikey");
    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn test_create_user_saves_through_repo() {
    let container = user_container();

    let service = container.get(Key::<UserService>::of()).await.unwrap();
    let user = service.create_user(UserRequest::new("2", "Jack")).await;

    assert_eq!(user.name, "Jack");
}

#[tokio::test]
async fn test_manual_construction_bypasses_container() {
    let container = Container::new();
    let service = Arc::new(UserService {
        repo: Arc::new(UserSQLRepo::default()),
        create_user: Arc::new(CreateUser {
            repo: Arc::new(UserSQLRepo::default()),
        }),
    });

    let controller = UserController::inject_with(
        &container,
        Arguments::new()
            .with("service", service.clone())
            .with(
                "api_key",
                Arc::new(ApiKey {
                    key: "manual".to_string(),
                }),
            ),
    )
    .await
    .unwrap();

    assert_eq!(controller.api_key, "manual");
    assert!(Arc::ptr_eq(&controller.service, &service));
    assert_eq!(container.stats().resolutions, 0);
}

#[tokio::test]
async fn test_partial_override_resolves_the_rest() {
    let container = user_container();

    let controller = UserController::inject_with(
        &container,
        Arguments::new().with(
            "api_key",
            Arc::new(ApiKey {
                key: "override".to_string(),
            }),
        ),
    )
    .await
    .unwrap();
    let service = container.get(Key::<UserService>::of()).await.unwrap();

    assert_eq!(controller.api_key, "override");
    assert!(Arc::ptr_eq(&controller.service, &service));
}

#[tokio::test]
async fn test_generic_repos_resolve_independently() {
    let container = Container::new();
    container.bind_all([
        Binding::to::<dyn Repo<User>, UserSQLRepo>(generic_key::<RepoOf, User>()),
        Binding::to::<dyn Repo<Order>, OrderSQLRepo>(generic_key::<RepoOf, Order>()),
    ]);

    let users = container.get(generic_key::<RepoOf, User>()).await.unwrap();
    let orders = container.get(generic_key::<RepoOf, Order>()).await.unwrap();

    assert_eq!(users.get("1").await.name, "John");
    assert_eq!(orders.get("9").await.id, "9");
    assert_eq!(container.stats().bound_keys, 2);
}

#[tokio::test]
async fn test_missing_repo_is_unresolved() {
    let container = Container::new();
    container.add::<UserService>();
    container.add::<CreateUser>();

    let err = container
        .get(Key::<UserService>::of())
        .await
        .err()
        .unwrap();

    assert!(err.is_unresolved());
    assert!(err.to_string().contains("RepoOf"));
}

#[tokio::test]
async fn test_bindings_added_after_consumer_are_found() {
    let container = Container::new();
    container.add::<UserController>();
    container.add::<UserService>();

    assert!(container.get(Key::<UserController>::of()).await.is_err());

    container.bind_all([
        Binding::to::<dyn Repo<User>, UserSQLRepo>(generic_key::<RepoOf, User>()),
        Binding::class::<CreateUser>(),
        Binding::factory(api_key_factory()),
    ]);
    let controller = container.get(Key::<UserController>::of()).await.unwrap();

    assert_eq!(controller.api_key, "some-random-apikey");
}

#[tokio::test]
async fn test_factory_returning_closure() {
    let container = user_container();
    container.bind_binding(Binding::factory(create_user_usecase()));

    let run = container.get(Key::<CreateUserFn>::of()).await.unwrap();
    let user = run(UserRequest::new("3", "Ann")).await;
    let again = container.get(Key::<CreateUserFn>::of()).await.unwrap();

    assert_eq!(user.id, "3");
    assert!(Arc::ptr_eq(&run, &again));
}

struct DummyModule;

impl Module for DummyModule {
    fn providers(&self) -> Vec<Binding> {
        vec![Binding::class::<UserController>()]
    }
}

struct UserModule;

impl Module for UserModule {
    fn imports(&self) -> Vec<Box<dyn Module>> {
        vec![Box::new(DummyModule)]
    }

    fn providers(&self) -> Vec<Binding> {
        vec![
            Binding::many::<dyn UseCase>(vec![
                Provider::class::<CreateUser>(),
                Provider::class::<GetUser>(),
            ]),
            Binding::to::<dyn Repo<User>, UserSQLRepo>(generic_key::<RepoOf, User>()),
            Binding::class::<CreateUser>(),
            Binding::class::<UserService>(),
            Binding::factory(api_key_factory()),
        ]
    }
}

struct CqrsModule;

impl Module for CqrsModule {
    fn providers(&self) -> Vec<Binding> {
        vec![Binding::class::<CommandBus>()]
    }
}

struct AppModule;

impl Module for AppModule {
    fn imports(&self) -> Vec<Box<dyn Module>> {
        vec![Box::new(UserModule), Box::new(CqrsModule)]
    }

    fn providers(&self) -> Vec<Binding> {
        Vec::new()
    }
}

#[tokio::test]
async fn test_command_bus_collects_use_cases_in_order() {
    let container = Container::new();
    container.install(&AppModule);

    let bus = container.get(Key::<CommandBus>::of()).await.unwrap();
    let names: Vec<_> = bus.usecases.iter().map(|usecase| usecase.name()).collect();
    let user = bus.usecases[0]
        .run(UserRequest::new("2", "Jack"))
        .await;

    assert_eq!(names, ["create_user", "get_user"]);
    assert_eq!(user.name, "Jack");
}

#[tokio::test]
async fn test_module_imports_are_installed() {
    let container = Container::new();
    container.install(&AppModule);

    let controller = container.get(Key::<UserController>::of()).await.unwrap();
    let repo = container.get(generic_key::<RepoOf, User>()).await.unwrap();

    assert_eq!(controller.api_key, "some-random-apikey");
    assert_eq!(repo.get("5").await.id, "5");
}
