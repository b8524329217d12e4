//! `#[injectable]` 宏实现
//!
//! 在 `#[inject]` 的基础上，于程序启动时把类型注册到全局容器。

use crate::args::{InjectArgs, InjectLifetime};
use crate::inject::expand_struct;
use crate::utils::registration_ident;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{ItemStruct, Result};

pub fn expand(item: ItemStruct, args: &InjectArgs) -> Result<TokenStream> {
    let struct_name = item.ident.clone();
    let injectable = expand_struct(item, args)?;
    let registration = generate_registration_code(&struct_name, args);

    Ok(quote! {
        #injectable

        #registration
    })
}

/// 生成自动注册代码
fn generate_registration_code(struct_name: &syn::Ident, args: &InjectArgs) -> TokenStream {
    let registration_fn_name = registration_ident(struct_name);

    let lifetime = match args.lifetime.unwrap_or(InjectLifetime::Singleton) {
        InjectLifetime::Singleton => quote! { ::di_abstractions::Lifetime::Singleton },
        InjectLifetime::Transient => quote! { ::di_abstractions::Lifetime::Transient },
    };
    let interface_bindings = args.provides.iter().map(|target| {
        quote! {
            ::di_abstractions::DiContainer::bind_binding(
                container,
                ::di_abstractions::Binding::bind::<#target, #struct_name>().with_lifetime(#lifetime),
            );
        }
    });

    quote! {
        // 使用 ctor 在程序启动时自动注册
        #[::ctor::ctor]
        fn #registration_fn_name() {
            let container = ::di_impl::global::container();
            ::di_abstractions::DiContainer::bind_binding(
                container,
                ::di_abstractions::Binding::class::<#struct_name>().with_lifetime(#lifetime),
            );
            #( #interface_bindings )*
        }
    }
}
