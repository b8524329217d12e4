//! `#[inject]` 生成代码的集成测试
use async_trait::async_trait;
use di_abstractions::{
    generic_key, Arguments, Binding, DependencyError, DiContainer, GenericCapability, Injectable,
    InjectableExt, Key, Provider, ResolveExt,
};
use di_impl::Container;
use di_macros::inject;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
struct User {
    id: String,
    name: String,
}

#[async_trait]
trait Repo<E>: Send + Sync {
    async fn get(&self, id: &str) -> E;
}

struct RepoOf;

impl<E: 'static> GenericCapability<E> for RepoOf {
    type Output = dyn Repo<E>;
}

#[inject(provides(dyn Repo<User>))]
struct UserSqlRepo;

#[async_trait]
impl Repo<User> for UserSqlRepo {
    async fn get(&self, id: &str) -> User {
        User {
            id: id.to_string(),
            name: "John".to_string(),
        }
    }
}

#[inject]
struct UserService {
    #[inject(key = generic_key::<RepoOf, User>())]
    repo: Arc<dyn Repo<User>>,
}

#[derive(Debug)]
struct ApiKey(String);

#[inject]
fn api_key() -> ApiKey {
    ApiKey("some-random-apikey".to_string())
}

#[inject]
struct UserController {
    service: Arc<UserService>,
    api_key: Arc<ApiKey>,
    #[inject(default)]
    retries: u32,
}

#[inject]
struct Greeting {
    label: String,
}

#[inject]
fn memory_repo() -> Arc<dyn Repo<User>> {
    Arc::new(UserSqlRepo)
}

#[derive(Debug)]
struct PortUnavailable(u16);

impl std::fmt::Display for PortUnavailable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "端口不可用: {}", self.0)
    }
}

impl std::error::Error for PortUnavailable {}

#[inject(fallible)]
async fn listen_port(#[inject(default)] offset: u16) -> Result<u16, PortUnavailable> {
    let port = 8080 + offset;
    if port == 8081 {
        return Err(PortUnavailable(port));
    }
    Ok(port)
}

fn user_container() -> Container {
    let container = Container::new();
    container.bind_all([
        Binding::to::<dyn Repo<User>, UserSqlRepo>(generic_key::<RepoOf, User>()),
        Binding::class::<UserService>(),
        Binding::class::<UserController>(),
        Binding::factory(api_key::injected()),
    ]);
    container
}

#[test]
fn test_signature_follows_fields() {
    let signature = UserController::signature();

    assert_eq!(signature.owner(), "UserController");
    assert_eq!(signature.len(), 3);
    assert_eq!(signature.keys().count(), 2);
}

#[tokio::test]
async fn test_macro_graph_resolves() {
    let container = user_container();

    let controller = container.get(Key::<UserController>::of()).await.unwrap();
    let user = controller.service.repo.get("1").await;

    assert_eq!(controller.api_key.0, "some-random-apikey");
    assert_eq!(controller.retries, 0);
    assert_eq!(user.name, "John");
}

#[tokio::test]
async fn test_explicit_key_attribute_is_used() {
    let container = user_container();

    let service = container.get(Key::<UserService>::of()).await.unwrap();
    let repo = container.get(generic_key::<RepoOf, User>()).await.unwrap();

    assert!(Arc::ptr_eq(&service.repo, &repo));
}

#[tokio::test]
async fn test_default_field_accepts_override() {
    let container = user_container();

    let controller =
        UserController::inject_with(&container, Arguments::new().with_value("retries", 3_u32))
            .await
            .unwrap();

    assert_eq!(controller.retries, 3);
}

#[tokio::test]
async fn test_plain_field_must_be_supplied() {
    let container = Container::new();

    let err = Greeting::inject(&container).await.err().unwrap();
    let greeting = Greeting::inject_with(
        &container,
        Arguments::new().with_value("label", "hello".to_string()),
    )
    .await
    .unwrap();

    assert!(matches!(
        err,
        DependencyError::UnboundParameter { ref parameter, .. } if parameter == "label"
    ));
    assert_eq!(greeting.label, "hello");
}

#[tokio::test]
async fn test_fn_returning_arc_provides_trait_object() {
    let container = Container::new();
    container.bind(
        generic_key::<RepoOf, User>(),
        Provider::factory(memory_repo::injected()),
    );

    let repo = container.get(generic_key::<RepoOf, User>()).await.unwrap();

    assert_eq!(repo.get("7").await.id, "7");
}

#[tokio::test]
async fn test_fallible_factory_maps_error() {
    let container = Container::new();
    let factory = listen_port::injected();

    let port = factory.call(&container).await.unwrap();
    let err = factory
        .call_with(&container, Arguments::new().with_value("offset", 1_u16))
        .await
        .err()
        .unwrap();

    assert_eq!(*port, 8080);
    assert!(matches!(
        err,
        DependencyError::ComponentCreationFailed { ref type_name, .. } if type_name == "listen_port"
    ));
}

#[tokio::test]
async fn test_original_fn_is_kept() {
    assert_eq!(api_key().0, "some-random-apikey");
    assert_eq!(listen_port(2).await.unwrap(), 8082);
}
