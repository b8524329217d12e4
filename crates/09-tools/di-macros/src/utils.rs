//! 宏工具函数

use proc_macro2::Span;
use syn::{Ident, Type};

/// 从类型中提取第一个泛型参数
pub fn extract_generic_type(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    match &segment.arguments {
        syn::PathArguments::AngleBracketed(args) => match args.args.first() {
            Some(syn::GenericArgument::Type(inner_type)) => Some(inner_type),
            _ => None,
        },
        _ => None,
    }
}

/// 检查类型路径的最后一段是否为给定名称
fn last_segment_is(ty: &Type, name: &str) -> bool {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident == name)
            .unwrap_or(false),
        _ => false,
    }
}

/// 检查类型是否为 Result<T, E>
pub fn is_result_type(ty: &Type) -> bool {
    last_segment_is(ty, "Result")
}

/// 若类型为 Arc<T>，返回 T
pub fn arc_inner_type(ty: &Type) -> Option<&Type> {
    if last_segment_is(ty, "Arc") {
        extract_generic_type(ty)
    } else {
        None
    }
}

/// 将驼峰命名转换为蛇形命名
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    let chars: Vec<char> = s.chars().collect();

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() && i > 0 {
            let prev_is_lower = chars.get(i - 1).map_or(false, |c| c.is_lowercase());
            let next_is_lower = chars.get(i + 1).map_or(false, |c| c.is_lowercase());

            if prev_is_lower || next_is_lower {
                result.push('_');
            }
        }
        result.push(ch.to_lowercase().next().unwrap_or(ch));
    }

    result
}

/// 生成注册函数名，例如 `UserService` 得到 `__register_injectable_user_service`
pub fn registration_ident(type_name: &Ident) -> Ident {
    Ident::new(
        &format!("__register_injectable_{}", to_snake_case(&type_name.to_string())),
        Span::call_site(),
    )
}
