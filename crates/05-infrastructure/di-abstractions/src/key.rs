//! 绑定键
//!
//! 绑定键标识“提供什么”：一个能力类型，外加可选的一个类型参数。
//! `(Repo, User)` 与 `(Repo, Order)` 是两个互不相关的键。

use di_common::TypeInfo;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// 注册表的查找键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingKey {
    capability: TypeInfo,
    type_argument: Option<TypeInfo>,
}

impl BindingKey {
    /// 以类型本身作为能力的键
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            capability: TypeInfo::of::<T>(),
            type_argument: None,
        }
    }

    /// 带一个类型参数的键
    pub fn parameterized<C: ?Sized + 'static, A: ?Sized + 'static>() -> Self {
        Self {
            capability: TypeInfo::of::<C>(),
            type_argument: Some(TypeInfo::of::<A>()),
        }
    }

    pub fn capability(&self) -> TypeInfo {
        self.capability
    }

    pub fn type_argument(&self) -> Option<TypeInfo> {
        self.type_argument
    }

    pub fn is_parameterized(&self) -> bool {
        self.type_argument.is_some()
    }
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.type_argument {
            Some(argument) => write!(f, "{}[{}]", self.capability, argument),
            None => write!(f, "{}", self.capability),
        }
    }
}

/// 由一个类型参数区分的能力族
///
/// 族本身通常是一个空结构体，`Output` 是按该参数解析出的类型。
///
/// ```ignore
/// struct RepoOf;
///
/// impl<E: Entity> GenericCapability<E> for RepoOf {
///     type Output = dyn Repo<E>;
/// }
///
/// let key = generic_key::<RepoOf, User>();
/// ```
pub trait GenericCapability<A: ?Sized + 'static>: 'static {
    /// 解析结果类型
    type Output: ?Sized + Send + Sync + 'static;
}

/// 带输出类型的绑定键
///
/// `T` 是解析结果的类型，可以是 trait 对象，例如 `Key<dyn Repo<User>>`。
pub struct Key<T: ?Sized> {
    binding: BindingKey,
    _output: PhantomData<fn() -> Arc<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> Key<T> {
    /// 以 `T` 本身作为能力的键
    pub fn of() -> Self {
        Self::from_binding(BindingKey::of::<T>())
    }

    /// 以任意能力与类型参数组成的键
    ///
    /// 不校验 `C`、`A` 与 `T` 的关系；优先使用 [`generic_key`]。
    pub fn parameterized<C: ?Sized + 'static, A: ?Sized + 'static>() -> Self {
        Self::from_binding(BindingKey::parameterized::<C, A>())
    }

    fn from_binding(binding: BindingKey) -> Self {
        Self {
            binding,
            _output: PhantomData,
        }
    }

    pub fn binding(&self) -> &BindingKey {
        &self.binding
    }

    /// 解析结果的类型信息
    pub fn output(&self) -> TypeInfo {
        TypeInfo::of::<T>()
    }
}

impl<T: ?Sized> Clone for Key<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Key<T> {}

impl<T: ?Sized> PartialEq for Key<T> {
    fn eq(&self, other: &Self) -> bool {
        self.binding == other.binding
    }
}

impl<T: ?Sized> Eq for Key<T> {}

impl<T: ?Sized> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Key").field(&self.binding).finish()
    }
}

impl<T: ?Sized> fmt::Display for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.binding, f)
    }
}

impl<T: ?Sized> From<Key<T>> for BindingKey {
    fn from(key: Key<T>) -> Self {
        key.binding
    }
}

/// 以 `T` 本身作为能力的键
pub fn key<T: ?Sized + Send + Sync + 'static>() -> Key<T> {
    Key::of()
}

/// 能力族 `C` 按类型参数 `A` 展开的键
pub fn generic_key<C, A>() -> Key<C::Output>
where
    C: GenericCapability<A> + ?Sized,
    A: ?Sized + 'static,
{
    Key::from_binding(BindingKey::parameterized::<C, A>())
}
