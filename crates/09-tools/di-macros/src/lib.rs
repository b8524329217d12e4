//! # DI Macros
//!
//! 这个 crate 提供了注入标记的过程宏。
//!
//! ## 核心宏
//!
//! - [`inject`] - 为结构体生成 `Injectable` 实现，或把函数包装为注入工厂
//! - [`injectable`] - 在 `inject` 的基础上自动注册到全局容器
//!
//! ## 使用示例
//!
//! ```ignore
//! use di_macros::{inject, injectable};
//! use std::sync::Arc;
//!
//! #[injectable(provides(dyn Repo<User>))]
//! pub struct UserSqlRepo {
//!     pool: Arc<Pool>,
//! }
//!
//! #[inject]
//! pub struct CreateUser {
//!     #[inject(key = generic_key::<RepoOf, User>())]
//!     repo: Arc<dyn Repo<User>>,
//! }
//!
//! #[inject(fallible)]
//! fn api_key() -> Result<ApiKey, std::env::VarError> {
//!     std::env::var("API_KEY").map(ApiKey)
//! }
//! ```
//!
//! 生成的代码引用 `di_abstractions`；`#[injectable]` 还需要 `di_impl` 与 `ctor`。

use proc_macro::TokenStream;
use syn::{parse_macro_input, Item};

mod args;
mod inject;
mod injectable;
mod utils;

use args::InjectArgs;

/// 注入标记宏
///
/// # 结构体
///
/// 字段决定构造参数：
///
/// - `Arc<T>` 字段按 `Key::<T>::of()` 解析
/// - `#[inject(key = expr)]` 使用给定的键
/// - `#[inject(default)]` 使用 `Default::default()`
/// - 其他类型的字段无法解析，必须由调用方通过 `Arguments` 提供
///
/// 参数 `provides(dyn Trait, ...)` 生成到这些 trait 对象的 `Upcast` 实现。
///
/// # 函数
///
/// 保留原函数，并生成同名结构体，其 `injected()` 返回 `Injected<T>`。
/// 返回 `Arc<T>` 的函数提供 `T`；参数 `fallible` 表示函数返回 `Result<T, E>`。
///
/// ```ignore
/// #[inject]
/// async fn user_service(repo: Arc<dyn Repo<User>>) -> UserService {
///     UserService::new(repo)
/// }
///
/// container.bind_binding(Binding::factory(user_service::injected()));
/// ```
#[proc_macro_attribute]
pub fn inject(args: TokenStream, input: TokenStream) -> TokenStream {
    let inject_args = parse_macro_input!(args as InjectArgs);

    let expanded = match parse_macro_input!(input as Item) {
        Item::Struct(item) => {
            if inject_args.lifetime.is_some() {
                Err(syn::Error::new_spanned(
                    &item.ident,
                    "生命周期参数只能用于 #[injectable]",
                ))
            } else {
                inject::expand_struct(item, &inject_args)
            }
        }
        Item::Fn(item) => inject::expand_fn(item, &inject_args),
        other => Err(syn::Error::new_spanned(
            other,
            "#[inject] 只能用于结构体或函数",
        )),
    };

    expanded
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// 可注入组件宏
///
/// 与结构体上的 [`macro@inject`] 相同，另外在程序启动时把类型注册到
/// `di_impl::global` 容器，默认为单例。参数：
///
/// - `singleton` / `transient` - 注册的生命周期
/// - `provides(dyn Trait, ...)` - 同时以这些 trait 对象为键注册
///
/// ```ignore
/// #[injectable]
/// pub struct UserController {
///     service: Arc<UserService>,
/// }
///
/// let controller = UserController::autowired().await?;
/// ```
#[proc_macro_attribute]
pub fn injectable(args: TokenStream, input: TokenStream) -> TokenStream {
    let inject_args = parse_macro_input!(args as InjectArgs);

    let expanded = match parse_macro_input!(input as Item) {
        Item::Struct(item) => injectable::expand(item, &inject_args),
        other => Err(syn::Error::new_spanned(
            other,
            "#[injectable] 只能用于结构体",
        )),
    };

    expanded
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
