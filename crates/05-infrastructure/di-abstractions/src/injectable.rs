//! 注入标记
//!
//! 可注入类型通过 [`ParameterSignature`] 声明构造参数，容器按签名解析参数后调用
//! [`Injectable::construct`]。通常由 `#[inject]` / `#[injectable]` 宏生成。

use crate::key::{BindingKey, Key};
use crate::provider::{erase, Instance};
use crate::resolver::Resolve;
use async_trait::async_trait;
use di_common::{DependencyError, DependencyResult, TypeInfo};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// 参数的绑定方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterBinding {
    /// 按键解析
    Key(BindingKey),
    /// 使用默认值，不查注册表
    Default,
    /// 没有可解析的键，只能由调用方提供
    Unbound,
}

/// 构造参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: &'static str,
    pub binding: ParameterBinding,
}

/// 构造参数签名
#[derive(Debug, Clone)]
pub struct ParameterSignature {
    owner: &'static str,
    parameters: Vec<Parameter>,
}

impl ParameterSignature {
    pub fn new(owner: &'static str) -> Self {
        Self {
            owner,
            parameters: Vec::new(),
        }
    }

    /// 添加按键解析的参数
    pub fn parameter<T: ?Sized + Send + Sync + 'static>(
        self,
        name: &'static str,
        key: Key<T>,
    ) -> Self {
        self.push(name, ParameterBinding::Key(*key.binding()))
    }

    /// 添加使用默认值的参数
    pub fn defaulted(self, name: &'static str) -> Self {
        self.push(name, ParameterBinding::Default)
    }

    /// 添加无法解析的参数
    pub fn unbound(self, name: &'static str) -> Self {
        self.push(name, ParameterBinding::Unbound)
    }

    fn push(mut self, name: &'static str, binding: ParameterBinding) -> Self {
        self.parameters.push(Parameter { name, binding });
        self
    }

    pub fn owner(&self) -> &'static str {
        self.owner
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// 需要从注册表解析的键
    pub fn keys(&self) -> impl Iterator<Item = &BindingKey> {
        self.parameters.iter().filter_map(|p| match &p.binding {
            ParameterBinding::Key(key) => Some(key),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

enum Value {
    Shared(Instance),
    Owned(Box<dyn Any + Send>),
}

/// 构造参数值
///
/// 同时承载调用方提供的值与容器解析出的依赖。
#[derive(Default)]
pub struct Arguments {
    owner: &'static str,
    values: HashMap<&'static str, Value>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// 提供共享依赖
    pub fn with<T: ?Sized + Send + Sync + 'static>(
        mut self,
        name: &'static str,
        value: Arc<T>,
    ) -> Self {
        self.values.insert(name, Value::Shared(erase(value)));
        self
    }

    /// 提供按值传递的参数
    pub fn with_value<V: Send + 'static>(mut self, name: &'static str, value: V) -> Self {
        self.values.insert(name, Value::Owned(Box::new(value)));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 取出共享依赖
    pub fn take<T: ?Sized + Send + Sync + 'static>(
        &mut self,
        name: &'static str,
    ) -> DependencyResult<Arc<T>> {
        match self.values.remove(name) {
            Some(Value::Shared(instance)) => instance
                .downcast_ref::<Arc<T>>()
                .cloned()
                .ok_or_else(|| self.mismatch::<Arc<T>>(name)),
            Some(Value::Owned(value)) => value
                .downcast::<Arc<T>>()
                .map(|value| *value)
                .map_err(|_| self.mismatch::<Arc<T>>(name)),
            None => Err(DependencyError::unbound_parameter(self.owner, name)),
        }
    }

    /// 取出按值传递的参数
    pub fn take_value<V: Send + 'static>(&mut self, name: &'static str) -> DependencyResult<V> {
        match self.values.remove(name) {
            Some(Value::Owned(value)) => value
                .downcast::<V>()
                .map(|value| *value)
                .map_err(|_| self.mismatch::<V>(name)),
            Some(Value::Shared(_)) => Err(self.mismatch::<V>(name)),
            None => Err(DependencyError::unbound_parameter(self.owner, name)),
        }
    }

    /// 取出按值传递的参数；未提供时使用默认值
    pub fn take_value_or_default<V: Default + Send + 'static>(
        &mut self,
        name: &'static str,
    ) -> DependencyResult<V> {
        if self.contains(name) {
            self.take_value(name)
        } else {
            Ok(V::default())
        }
    }

    fn mismatch<T: ?Sized + 'static>(&self, name: &str) -> DependencyError {
        DependencyError::TypeMismatch {
            key: format!("{}.{}", self.owner, name),
            expected: TypeInfo::of::<T>().to_string(),
        }
    }

    /// 按签名补全参数
    ///
    /// 调用方已提供的参数不会查注册表；其余按键参数依次解析，默认值参数跳过，
    /// 无法解析的参数若未提供则报错。
    pub async fn resolve(
        signature: &ParameterSignature,
        resolver: &dyn Resolve,
        overrides: Arguments,
    ) -> DependencyResult<Arguments> {
        let mut values = overrides.values;

        for parameter in signature.parameters() {
            if values.contains_key(parameter.name) {
                continue;
            }
            match &parameter.binding {
                ParameterBinding::Key(key) => {
                    let instance = resolver.resolve_key(key).await?;
                    values.insert(parameter.name, Value::Shared(instance));
                }
                ParameterBinding::Default => {}
                ParameterBinding::Unbound => {
                    return Err(DependencyError::unbound_parameter(
                        signature.owner(),
                        parameter.name,
                    ));
                }
            }
        }

        Ok(Arguments {
            owner: signature.owner(),
            values,
        })
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.values.keys().collect();
        names.sort();
        f.debug_struct("Arguments")
            .field("owner", &self.owner)
            .field("names", &names)
            .finish()
    }
}

/// 可注入类型
pub trait Injectable: Send + Sync + Sized + 'static {
    /// 构造参数签名
    fn signature() -> ParameterSignature;

    /// 用已补全的参数构造实例
    fn construct(args: Arguments) -> DependencyResult<Self>;
}

/// 通过解析器构造可注入类型
///
/// 每次调用都构造一个新值；参数中的依赖按各自的生命周期解析。
#[async_trait]
pub trait InjectableExt: Injectable {
    async fn inject(resolver: &dyn Resolve) -> DependencyResult<Self> {
        Self::inject_with(resolver, Arguments::new()).await
    }

    /// 部分参数由调用方提供，其余从解析器取得
    async fn inject_with(resolver: &dyn Resolve, overrides: Arguments) -> DependencyResult<Self> {
        let args = Arguments::resolve(&Self::signature(), resolver, overrides).await?;
        Self::construct(args)
    }
}

impl<T: Injectable> InjectableExt for T {}
