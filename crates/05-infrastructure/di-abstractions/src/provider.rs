//! 提供者
//!
//! 提供者描述“如何得到”某个键的实例：构造一个类型、调用一个工厂，或返回一个现成的值。

use crate::factory::Injected;
use crate::injectable::{Injectable, InjectableExt};
use crate::key::{BindingKey, Key};
use crate::resolver::Resolve;
use di_common::{DependencyError, DependencyResult, Lifetime, TypeInfo};
use futures::future::{self, BoxFuture};
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// 类型擦除后的实例
///
/// 内部保存的是 `Arc<T>`，`T` 可以是 trait 对象。
pub type Instance = Arc<dyn Any + Send + Sync>;

/// 类型擦除后的构造函数
pub type Constructor =
    Arc<dyn Fn(Arc<dyn Resolve>) -> BoxFuture<'static, DependencyResult<Instance>> + Send + Sync>;

/// 擦除实例类型
pub fn erase<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Instance {
    Arc::new(value)
}

/// 还原实例类型
pub fn downcast<T: ?Sized + Send + Sync + 'static>(
    key: &BindingKey,
    instance: &Instance,
) -> DependencyResult<Arc<T>> {
    instance
        .downcast_ref::<Arc<T>>()
        .cloned()
        .ok_or_else(|| DependencyError::TypeMismatch {
            key: key.to_string(),
            expected: TypeInfo::of::<T>().to_string(),
        })
}

/// 把具体类型转换为它对外提供的形态
///
/// 每个类型都可以转换为自身；转换为 trait 对象的实现通常由 `#[inject(provides(...))]` 生成。
pub trait Upcast<T: ?Sized>: Send + Sync + 'static {
    fn upcast(self: Arc<Self>) -> Arc<T>;
}

impl<T: ?Sized + Send + Sync + 'static> Upcast<T> for T {
    fn upcast(self: Arc<Self>) -> Arc<T> {
        self
    }
}

/// 提供者来源
#[derive(Clone)]
pub enum ProviderSource {
    /// 构造一个可注入类型
    Class {
        type_info: TypeInfo,
        construct: Constructor,
    },
    /// 调用工厂
    Factory {
        name: &'static str,
        construct: Constructor,
    },
    /// 返回现成的值
    Instance(Instance),
}

impl ProviderSource {
    /// 产出一个实例
    pub fn invoke(
        &self,
        resolver: Arc<dyn Resolve>,
    ) -> BoxFuture<'static, DependencyResult<Instance>> {
        match self {
            Self::Class { construct, .. } | Self::Factory { construct, .. } => construct(resolver),
            Self::Instance(instance) => {
                Box::pin(future::ready(Ok::<_, DependencyError>(instance.clone())))
            }
        }
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::Class { .. } => ProviderKind::Class,
            Self::Factory { .. } => ProviderKind::Factory,
            Self::Instance(_) => ProviderKind::Instance,
        }
    }
}

impl fmt::Debug for ProviderSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class { type_info, .. } => f.debug_tuple("Class").field(&type_info.name).finish(),
            Self::Factory { name, .. } => f.debug_tuple("Factory").field(name).finish(),
            Self::Instance(_) => f.write_str("Instance"),
        }
    }
}

/// 提供者种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Class,
    Factory,
    Instance,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class => f.write_str("class"),
            Self::Factory => f.write_str("factory"),
            Self::Instance => f.write_str("instance"),
        }
    }
}

/// 产出 `T` 的提供者
///
/// 未显式指定生命周期时，绑定时采用容器的默认生命周期。
pub struct Provider<T: ?Sized> {
    source: ProviderSource,
    lifetime: Option<Lifetime>,
    _output: PhantomData<fn() -> Arc<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> Provider<T> {
    fn from_source(source: ProviderSource, lifetime: Option<Lifetime>) -> Self {
        Self {
            source,
            lifetime,
            _output: PhantomData,
        }
    }

    /// 构造可注入类型 `C`，并以 `T` 的形态提供
    pub fn class<C>() -> Self
    where
        C: Injectable + Upcast<T>,
    {
        let construct: Constructor = Arc::new(|resolver: Arc<dyn Resolve>| {
            Box::pin(async move {
                let value = C::inject(resolver.as_ref()).await?;
                Ok::<_, DependencyError>(erase::<T>(<C as Upcast<T>>::upcast(Arc::new(value))))
            }) as BoxFuture<'static, DependencyResult<Instance>>
        });

        Self::from_source(
            ProviderSource::Class {
                type_info: TypeInfo::of::<C>(),
                construct,
            },
            None,
        )
    }

    /// 调用注入工厂
    pub fn factory(factory: Injected<T>) -> Self {
        let name = factory.name();
        let construct: Constructor = Arc::new(move |resolver: Arc<dyn Resolve>| {
            let factory = factory.clone();
            Box::pin(async move { factory.call(resolver.as_ref()).await.map(erase) })
                as BoxFuture<'static, DependencyResult<Instance>>
        });

        Self::from_source(ProviderSource::Factory { name, construct }, None)
    }

    /// 调用一个无参数的闭包
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn() -> Arc<T> + Send + Sync + 'static,
    {
        let construct: Constructor = Arc::new(move |_resolver: Arc<dyn Resolve>| {
            let value = erase(f());
            Box::pin(future::ready(Ok::<_, DependencyError>(value)))
                as BoxFuture<'static, DependencyResult<Instance>>
        });

        Self::from_source(
            ProviderSource::Factory {
                name: std::any::type_name::<F>(),
                construct,
            },
            None,
        )
    }

    /// 返回现成的值；每次解析得到同一个实例
    pub fn instance(value: Arc<T>) -> Self {
        Self::from_source(ProviderSource::Instance(erase(value)), Some(Lifetime::Transient))
    }

    /// 每次解析都重新构建
    pub fn transient(self) -> Self {
        self.with_lifetime(Lifetime::Transient)
    }

    /// 首次解析后缓存
    pub fn singleton(self) -> Self {
        self.with_lifetime(Lifetime::Singleton)
    }

    pub fn with_lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    pub fn lifetime(&self) -> Option<Lifetime> {
        self.lifetime
    }

    pub fn source(&self) -> &ProviderSource {
        &self.source
    }

    /// 擦除输出类型
    pub fn into_erased(self) -> ErasedProvider {
        ErasedProvider {
            source: self.source,
            lifetime: self.lifetime,
            output: TypeInfo::of::<T>(),
        }
    }
}

impl<U: ?Sized + Send + Sync + 'static> Provider<Vec<Arc<U>>> {
    /// 依次调用每个子提供者，组成有序列表
    ///
    /// 列表默认是单例。子提供者的生命周期不起作用，缓存与否只取决于列表本身的生命周期。
    pub fn many(providers: Vec<Provider<U>>) -> Self {
        let sources: Arc<Vec<ProviderSource>> =
            Arc::new(providers.into_iter().map(|provider| provider.source).collect());
        let element_key = BindingKey::of::<U>();

        let construct: Constructor = Arc::new(move |resolver: Arc<dyn Resolve>| {
            let sources = sources.clone();
            Box::pin(async move {
                let mut items = Vec::with_capacity(sources.len());
                for source in sources.iter() {
                    let instance = source.invoke(resolver.clone()).await?;
                    items.push(downcast::<U>(&element_key, &instance)?);
                }
                Ok::<_, DependencyError>(erase(Arc::new(items)))
            }) as BoxFuture<'static, DependencyResult<Instance>>
        });

        Self::from_source(
            ProviderSource::Factory {
                name: std::any::type_name::<Vec<Arc<U>>>(),
                construct,
            },
            Some(Lifetime::Singleton),
        )
    }
}

impl<T: ?Sized> fmt::Debug for Provider<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("source", &self.source)
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

/// 擦除输出类型后的提供者，保存在注册表中
#[derive(Clone)]
pub struct ErasedProvider {
    source: ProviderSource,
    lifetime: Option<Lifetime>,
    output: TypeInfo,
}

impl ErasedProvider {
    pub fn source(&self) -> &ProviderSource {
        &self.source
    }

    pub fn kind(&self) -> ProviderKind {
        self.source.kind()
    }

    /// 生命周期；尚未确定时视为单例
    pub fn lifetime(&self) -> Lifetime {
        self.lifetime.unwrap_or_default()
    }

    /// 是否显式指定了生命周期
    pub fn has_explicit_lifetime(&self) -> bool {
        self.lifetime.is_some()
    }

    /// 未指定生命周期时采用给定的默认值
    pub fn with_default_lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime.get_or_insert(lifetime);
        self
    }

    /// 提供的输出类型
    pub fn output(&self) -> TypeInfo {
        self.output
    }

    /// 诊断描述，例如 `class UserSqlRepo -> dyn Repo<User> (singleton)`
    pub fn describe(&self) -> String {
        let origin = match &self.source {
            ProviderSource::Class { type_info, .. } => format!("class {type_info}"),
            ProviderSource::Factory { name, .. } => {
                format!("factory {}", TypeInfo { id: self.output.id, name: *name }.short_name())
            }
            ProviderSource::Instance(_) => "instance".to_string(),
        };
        format!("{} -> {} ({})", origin, self.output, self.lifetime())
    }
}

impl fmt::Debug for ErasedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// 键与提供者的配对，等待注册到容器
#[derive(Debug, Clone)]
pub struct Binding {
    key: BindingKey,
    provider: ErasedProvider,
}

impl Binding {
    pub fn new<T: ?Sized + Send + Sync + 'static>(key: Key<T>, provider: Provider<T>) -> Self {
        Self {
            key: *key.binding(),
            provider: provider.into_erased(),
        }
    }

    /// 以类型本身为键绑定可注入类型
    pub fn class<C: Injectable>() -> Self {
        Self::new(Key::<C>::of(), Provider::<C>::class::<C>())
    }

    /// 以工厂的返回类型为键绑定工厂
    pub fn factory<T: ?Sized + Send + Sync + 'static>(factory: Injected<T>) -> Self {
        Self::new(Key::<T>::of(), Provider::factory(factory))
    }

    /// 以接口类型 `I` 为键绑定实现 `C`
    pub fn bind<I, C>() -> Self
    where
        I: ?Sized + Send + Sync + 'static,
        C: Injectable + Upcast<I>,
    {
        Self::new(Key::<I>::of(), Provider::<I>::class::<C>())
    }

    /// 在给定键下绑定实现 `C`
    pub fn to<I, C>(key: Key<I>) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
        C: Injectable + Upcast<I>,
    {
        Self::new(key, Provider::<I>::class::<C>())
    }

    /// 以值的类型为键绑定现成的值
    pub fn instance<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self::new(Key::<T>::of(), Provider::instance(value))
    }

    /// 以 `Vec<Arc<T>>` 为键绑定一组提供者
    pub fn many<T: ?Sized + Send + Sync + 'static>(providers: Vec<Provider<T>>) -> Self {
        Self::new(Key::<Vec<Arc<T>>>::of(), Provider::many(providers))
    }

    /// 覆盖生命周期
    pub fn with_lifetime(mut self, lifetime: Lifetime) -> Self {
        self.provider.lifetime = Some(lifetime);
        self
    }

    pub fn transient(self) -> Self {
        self.with_lifetime(Lifetime::Transient)
    }

    pub fn singleton(self) -> Self {
        self.with_lifetime(Lifetime::Singleton)
    }

    pub fn key(&self) -> &BindingKey {
        &self.key
    }

    pub fn provider(&self) -> &ErasedProvider {
        &self.provider
    }

    pub fn into_parts(self) -> (BindingKey, ErasedProvider) {
        (self.key, self.provider)
    }
}
