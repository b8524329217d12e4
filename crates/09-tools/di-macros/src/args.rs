//! 宏参数解析

use syn::{
    parse::Parse, parse::ParseStream, punctuated::Punctuated, Attribute, Expr, Meta, Result,
    Token, Type,
};

/// 注入生命周期
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectLifetime {
    Singleton,
    Transient,
}

/// `#[inject(...)]` / `#[injectable(...)]` 的参数
#[derive(Clone, Default)]
pub struct InjectArgs {
    /// 注册时使用的生命周期，只对 `#[injectable]` 有意义
    pub lifetime: Option<InjectLifetime>,
    /// 工厂返回 `Result`
    pub fallible: bool,
    /// 额外提供的 trait 对象类型
    pub provides: Vec<Type>,
}

impl Parse for InjectArgs {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut args = InjectArgs::default();

        let parsed = Punctuated::<Meta, Token![,]>::parse_terminated(input)?;

        for meta in parsed {
            match meta {
                Meta::Path(path) if path.is_ident("singleton") => {
                    args.lifetime = Some(InjectLifetime::Singleton);
                }
                Meta::Path(path) if path.is_ident("transient") => {
                    args.lifetime = Some(InjectLifetime::Transient);
                }
                Meta::Path(path) if path.is_ident("fallible") => {
                    args.fallible = true;
                }
                Meta::List(list) if list.path.is_ident("provides") => {
                    let types = list.parse_args_with(Punctuated::<Type, Token![,]>::parse_terminated)?;
                    args.provides.extend(types);
                }
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "未知参数，可用参数: singleton, transient, fallible, provides(...)",
                    ));
                }
            }
        }

        Ok(args)
    }
}

/// 字段或函数参数上的 `#[inject(...)]`
pub enum ParameterAttr {
    /// 未标注，按类型推断
    Inferred,
    /// `#[inject(key = expr)]`
    Key(Expr),
    /// `#[inject(default)]`
    Default,
}

impl ParameterAttr {
    /// 从属性列表中读取，并移除其中的 `#[inject]`
    pub fn take_from(attrs: &mut Vec<Attribute>) -> Result<Self> {
        let mut result = ParameterAttr::Inferred;

        for attr in attrs.iter().filter(|attr| attr.path().is_ident("inject")) {
            let parsed = attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
            for meta in parsed {
                match meta {
                    Meta::NameValue(nv) if nv.path.is_ident("key") => {
                        result = ParameterAttr::Key(nv.value);
                    }
                    Meta::Path(path) if path.is_ident("default") => {
                        result = ParameterAttr::Default;
                    }
                    other => {
                        return Err(syn::Error::new_spanned(
                            other,
                            "未知参数，可用参数: key = <表达式>, default",
                        ));
                    }
                }
            }
        }

        attrs.retain(|attr| !attr.path().is_ident("inject"));
        Ok(result)
    }
}
