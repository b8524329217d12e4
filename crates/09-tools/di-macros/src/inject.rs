//! `#[inject]` 宏实现
//!
//! 结构体：生成 `Injectable` 实现。函数：保留原函数，并生成同名的结构体，
//! 其 `injected()` 返回包装好的 `Injected` 工厂。

use crate::args::{InjectArgs, ParameterAttr};
use crate::utils::{arc_inner_type, extract_generic_type, is_result_type};
use proc_macro2::TokenStream;
use quote::{quote, ToTokens};
use syn::{
    spanned::Spanned, Error, Fields, FnArg, Ident, ItemFn, ItemStruct, Pat, Result, ReturnType,
    Type,
};

/// 一个待注入的参数
struct InjectedParameter {
    ident: Ident,
    /// 签名中的条目，例如 `.parameter("repo", Key::<dyn Repo>::of())`
    signature: TokenStream,
    /// 从 `args` 中取值的表达式
    extract: TokenStream,
}

impl InjectedParameter {
    fn new(ident: Ident, ty: &Type, attr: ParameterAttr) -> Result<Self> {
        let name = ident.to_string();

        let (signature, extract) = match (attr, arc_inner_type(ty)) {
            (ParameterAttr::Key(key), Some(inner)) => (
                quote! { .parameter(#name, #key) },
                quote! { args.take::<#inner>(#name)? },
            ),
            (ParameterAttr::Key(_), None) => {
                return Err(Error::new(
                    ty.span(),
                    "#[inject(key = ...)] 只能用于 Arc<T> 类型",
                ));
            }
            (ParameterAttr::Default, _) => (
                quote! { .defaulted(#name) },
                quote! { args.take_value_or_default::<#ty>(#name)? },
            ),
            (ParameterAttr::Inferred, Some(inner)) => (
                quote! { .parameter(#name, ::di_abstractions::Key::<#inner>::of()) },
                quote! { args.take::<#inner>(#name)? },
            ),
            (ParameterAttr::Inferred, None) => (
                quote! { .unbound(#name) },
                quote! { args.take_value::<#ty>(#name)? },
            ),
        };

        Ok(Self {
            ident,
            signature,
            extract,
        })
    }
}

/// 为结构体生成 `Injectable` 实现，返回去掉字段属性后的结构体与生成的代码
pub fn expand_struct(mut item: ItemStruct, args: &InjectArgs) -> Result<TokenStream> {
    if !item.generics.params.is_empty() {
        return Err(Error::new(
            item.generics.span(),
            "#[inject] 不支持泛型结构体",
        ));
    }
    if args.fallible {
        return Err(Error::new(
            item.ident.span(),
            "fallible 只能用于函数",
        ));
    }

    let struct_name = item.ident.clone();
    let owner = struct_name.to_string();

    let parameters = match &mut item.fields {
        Fields::Named(fields) => fields
            .named
            .iter_mut()
            .map(|field| {
                let attr = ParameterAttr::take_from(&mut field.attrs)?;
                let ident = field
                    .ident
                    .clone()
                    .ok_or_else(|| Error::new(field.span(), "字段缺少名称"))?;
                InjectedParameter::new(ident, &field.ty, attr)
            })
            .collect::<Result<Vec<_>>>()?,
        Fields::Unit => Vec::new(),
        Fields::Unnamed(fields) => {
            return Err(Error::new(
                fields.span(),
                "#[inject] 只支持具名字段结构体或单元结构体",
            ));
        }
    };

    let signature = parameters.iter().map(|p| &p.signature);
    let construct_body = if matches!(item.fields, Fields::Unit) {
        quote! { Self }
    } else {
        let idents = parameters.iter().map(|p| &p.ident);
        let extracts = parameters.iter().map(|p| &p.extract);
        quote! { Self { #( #idents: #extracts, )* } }
    };
    let upcasts = generate_upcasts(&struct_name, &args.provides);

    Ok(quote! {
        #item

        impl ::di_abstractions::Injectable for #struct_name {
            fn signature() -> ::di_abstractions::ParameterSignature {
                ::di_abstractions::ParameterSignature::new(#owner) #( #signature )*
            }

            #[allow(unused_mut, unused_variables)]
            fn construct(
                mut args: ::di_abstractions::Arguments,
            ) -> ::di_abstractions::DependencyResult<Self> {
                ::std::result::Result::Ok(#construct_body)
            }
        }

        #upcasts
    })
}

/// 生成 `Upcast` 实现
pub fn generate_upcasts(struct_name: &Ident, provides: &[Type]) -> TokenStream {
    let impls = provides.iter().map(|target| {
        quote! {
            impl ::di_abstractions::Upcast<#target> for #struct_name {
                fn upcast(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<#target> {
                    self
                }
            }
        }
    });

    quote! { #( #impls )* }
}

/// 工厂返回值的处理方式
enum FactoryOutput {
    /// 返回 `T`，包装为 `Arc<T>`
    Value(Type),
    /// 返回 `Arc<T>`
    Shared(Type),
}

impl FactoryOutput {
    fn from_type(ty: &Type) -> Self {
        match arc_inner_type(ty) {
            Some(inner) => FactoryOutput::Shared(inner.clone()),
            None => FactoryOutput::Value(ty.clone()),
        }
    }

    fn provided(&self) -> &Type {
        match self {
            FactoryOutput::Value(ty) | FactoryOutput::Shared(ty) => ty,
        }
    }

    fn wrap(&self, value: TokenStream) -> TokenStream {
        match self {
            FactoryOutput::Value(_) => quote! { ::std::sync::Arc::new(#value) },
            FactoryOutput::Shared(_) => value,
        }
    }
}

/// 为函数生成同名结构体与 `injected()` 工厂
pub fn expand_fn(mut item: ItemFn, args: &InjectArgs) -> Result<TokenStream> {
    if !item.sig.generics.params.is_empty() {
        return Err(Error::new(
            item.sig.generics.span(),
            "#[inject] 不支持泛型函数",
        ));
    }
    if !args.provides.is_empty() || args.lifetime.is_some() {
        return Err(Error::new(
            item.sig.ident.span(),
            "函数上只能使用 fallible 参数",
        ));
    }

    let fn_name = item.sig.ident.clone();
    let owner = fn_name.to_string();
    let vis = item.vis.clone();

    let parameters = item
        .sig
        .inputs
        .iter_mut()
        .map(|input| match input {
            FnArg::Receiver(receiver) => Err(Error::new(
                receiver.span(),
                "#[inject] 不支持方法，只支持自由函数",
            )),
            FnArg::Typed(pat_type) => {
                let attr = ParameterAttr::take_from(&mut pat_type.attrs)?;
                let ident = match pat_type.pat.as_ref() {
                    Pat::Ident(pat_ident) => pat_ident.ident.clone(),
                    other => {
                        return Err(Error::new(other.span(), "参数必须是简单标识符"));
                    }
                };
                InjectedParameter::new(ident, &pat_type.ty, attr)
            }
        })
        .collect::<Result<Vec<_>>>()?;

    let return_type = match &item.sig.output {
        ReturnType::Type(_, ty) => ty.as_ref().clone(),
        ReturnType::Default => {
            return Err(Error::new(item.sig.span(), "注入工厂必须有返回值"));
        }
    };
    if let Type::ImplTrait(impl_trait) = &return_type {
        return Err(Error::new_spanned(
            impl_trait,
            "注入工厂不能返回 impl Trait，请返回具体类型或 Arc<dyn Trait>",
        ));
    }

    let value_type = if args.fallible {
        if !is_result_type(&return_type) {
            return Err(Error::new(
                return_type.span(),
                "fallible 工厂必须返回 Result<T, E>",
            ));
        }
        extract_generic_type(&return_type)
            .cloned()
            .ok_or_else(|| Error::new(return_type.span(), "无法识别 Result 的成功类型"))?
    } else {
        return_type.clone()
    };
    let output = FactoryOutput::from_type(&value_type);
    let provided = output.provided();

    let signature = parameters.iter().map(|p| &p.signature);
    let idents: Vec<_> = parameters.iter().map(|p| &p.ident).collect();
    let extracts = parameters.iter().map(|p| &p.extract);

    let call = if item.sig.asyncness.is_some() {
        quote! { #fn_name( #( #idents ),* ).await }
    } else {
        quote! { #fn_name( #( #idents ),* ) }
    };
    let call = if args.fallible {
        quote! {
            #call.map_err(|err| ::di_abstractions::DependencyError::creation_failed(#owner, err))?
        }
    } else {
        call
    };
    let value = output.wrap(quote! { value });
    let provided_tokens = provided.to_token_stream();

    Ok(quote! {
        #item

        #[allow(non_camel_case_types, dead_code)]
        #vis struct #fn_name {}

        impl #fn_name {
            /// 参数从容器解析的工厂
            #[allow(unused_mut, unused_variables)]
            #vis fn injected() -> ::di_abstractions::Injected<#provided_tokens> {
                ::di_abstractions::Injected::new(
                    ::di_abstractions::ParameterSignature::new(#owner) #( #signature )*,
                    |mut args: ::di_abstractions::Arguments| async move {
                        #( let #idents = #extracts; )*
                        let value = #call;
                        ::std::result::Result::Ok::<_, ::di_abstractions::DependencyError>(#value)
                    },
                )
            }
        }
    })
}
