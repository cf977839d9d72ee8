//! 宏工具函数

use syn::{GenericArgument, PathArguments, Type};

/// 依赖字段的基数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Single,
    List,
    Set,
}

/// 类型路径最后一段的名称与其第一个泛型参数
fn last_segment(ty: &Type) -> Option<(String, Option<&Type>)> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    let inner = match &segment.arguments {
        PathArguments::AngleBracketed(args) => args.args.iter().find_map(|arg| match arg {
            GenericArgument::Type(inner) => Some(inner),
            _ => None,
        }),
        _ => None,
    };
    Some((segment.ident.to_string(), inner))
}

/// `Injected<V>` 中的 `V`
pub fn injected_value(ty: &Type) -> Option<&Type> {
    match last_segment(ty)? {
        (name, inner) if name == "Injected" => inner,
        _ => None,
    }
}

/// 把注入单元的值类型拆成 (基数, 元素类型)
pub fn dependency_shape(value: &Type) -> Option<(Shape, &Type)> {
    let (name, inner) = last_segment(value)?;
    let inner = inner?;
    match name.as_str() {
        "Arc" => Some((Shape::Single, inner)),
        "InstanceSet" => Some((Shape::Set, inner)),
        "Vec" => match last_segment(inner)? {
            (arc, Some(element)) if arc == "Arc" => Some((Shape::List, element)),
            _ => None,
        },
        _ => None,
    }
}
