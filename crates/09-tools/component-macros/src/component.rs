//! 组件派生宏实现

use crate::utils::{dependency_shape, injected_value, Shape};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{punctuated::Punctuated, Data, DeriveInput, Fields, Ident, LitStr, Result, Token, Type};

/// 组件作用域声明
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeFlag {
    Singleton,
    Prototype,
}

/// `#[component(...)]` 参数
#[derive(Default)]
pub struct ComponentArgs {
    pub scope: Option<ScopeFlag>,
    pub primary: bool,
    pub named: Option<String>,
    pub provides: Vec<Type>,
    pub initializing: bool,
    pub disposable: bool,
    pub no_default: bool,
    pub post_construct: Vec<Ident>,
}

impl ComponentArgs {
    /// 从结构体属性中解析
    pub fn from_attrs(attrs: &[syn::Attribute]) -> Result<Self> {
        let mut args = ComponentArgs::default();

        for attr in attrs.iter().filter(|attr| attr.path().is_ident("component")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("singleton") {
                    args.set_scope(ScopeFlag::Singleton, &meta)
                } else if meta.path.is_ident("prototype") {
                    args.set_scope(ScopeFlag::Prototype, &meta)
                } else if meta.path.is_ident("primary") {
                    args.primary = true;
                    Ok(())
                } else if meta.path.is_ident("named") {
                    let value: LitStr = meta.value()?.parse()?;
                    args.named = Some(value.value());
                    Ok(())
                } else if meta.path.is_ident("provides") {
                    let content;
                    syn::parenthesized!(content in meta.input);
                    let types = Punctuated::<Type, Token![,]>::parse_terminated(&content)?;
                    args.provides.extend(types);
                    Ok(())
                } else if meta.path.is_ident("initializing") {
                    args.initializing = true;
                    Ok(())
                } else if meta.path.is_ident("disposable") {
                    args.disposable = true;
                    Ok(())
                } else if meta.path.is_ident("no_default") {
                    args.no_default = true;
                    Ok(())
                } else if meta.path.is_ident("post_construct") {
                    let value: LitStr = meta.value()?.parse()?;
                    args.post_construct.push(value.parse()?);
                    Ok(())
                } else {
                    Err(meta.error("未知的 component 参数"))
                }
            })?;
        }

        Ok(args)
    }

    fn set_scope(&mut self, scope: ScopeFlag, meta: &syn::meta::ParseNestedMeta<'_>) -> Result<()> {
        match self.scope {
            Some(existing) if existing != scope => Err(meta.error("singleton 与 prototype 不能同时声明")),
            _ => {
                self.scope = Some(scope);
                Ok(())
            }
        }
    }
}

/// 字段上的注入声明
enum FieldKind {
    Inject { qualifier: Option<String> },
    Config { path: String },
}

fn field_kind(field: &syn::Field) -> Result<Option<FieldKind>> {
    let mut kind = None;

    for attr in &field.attrs {
        if attr.path().is_ident("inject") {
            let mut qualifier = None;
            if matches!(attr.meta, syn::Meta::List(_)) {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("named") {
                        let value: LitStr = meta.value()?.parse()?;
                        qualifier = Some(value.value());
                        Ok(())
                    } else {
                        Err(meta.error("未知的 inject 参数"))
                    }
                })?;
            }
            kind = Some(FieldKind::Inject { qualifier });
        } else if attr.path().is_ident("config") {
            let mut path = None;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("path") {
                    let value: LitStr = meta.value()?.parse()?;
                    path = Some(value.value());
                    Ok(())
                } else {
                    Err(meta.error("未知的 config 参数"))
                }
            })?;
            let path = path.ok_or_else(|| syn::Error::new_spanned(attr, "config 需要 path = \"...\""))?;
            if kind.is_some() {
                return Err(syn::Error::new_spanned(attr, "inject 与 config 不能同时用于一个字段"));
            }
            kind = Some(FieldKind::Config { path });
        }
    }

    Ok(kind)
}

fn field_tokens(field: &syn::Field) -> Result<Option<TokenStream>> {
    let Some(kind) = field_kind(field)? else {
        return Ok(None);
    };
    let ident = field
        .ident
        .as_ref()
        .ok_or_else(|| syn::Error::new_spanned(field, "只支持具名字段"))?;
    let name = ident.to_string();
    let value = injected_value(&field.ty)
        .ok_or_else(|| syn::Error::new_spanned(&field.ty, "注入字段的类型必须是 Injected<...>"))?;

    let tokens = match kind {
        FieldKind::Inject { qualifier } => {
            let (shape, element) = dependency_shape(value).ok_or_else(|| {
                syn::Error::new_spanned(
                    value,
                    "注入字段必须是 Injected<Arc<R>>、Injected<Vec<Arc<R>>> 或 Injected<InstanceSet<R>>",
                )
            })?;
            let builder = match shape {
                Shape::Single => quote!(single),
                Shape::List => quote!(list),
                Shape::Set => quote!(set),
            };
            let named = qualifier.map(|q| quote!(.named(#q)));
            quote! {
                .field(::di_common::Field::#builder::<#element>(#name, |this: &Self| &this.#ident).inject() #named)
            }
        }
        FieldKind::Config { path } => quote! {
            .field(::di_common::Field::value::<#value>(#name, |this: &Self| &this.#ident).attribute("config", #path))
        },
    };

    Ok(Some(tokens))
}

/// 生成 `Describe` 实现
pub fn derive_component_impl(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let args = ComponentArgs::from_attrs(&input.attrs)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named.named.iter().collect::<Vec<_>>(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(name, "Component 不支持元组结构体"));
            }
        },
        _ => return Err(syn::Error::new_spanned(name, "Component 只能用于结构体")),
    };

    let mut members = Vec::new();
    for field in fields {
        if let Some(tokens) = field_tokens(field)? {
            members.push(tokens);
        }
    }

    let scope = match args.scope {
        Some(ScopeFlag::Singleton) => Some(quote!(.singleton())),
        Some(ScopeFlag::Prototype) => Some(quote!(.prototype())),
        None => None,
    };
    let primary = args.primary.then(|| quote!(.primary()));
    let named = args.named.as_ref().map(|q| quote!(.named(#q)));
    let constructor = (!args.no_default).then(|| quote!(.default_constructor()));
    let provides = args.provides.iter().map(|ty| {
        quote!(.provides::<#ty>(|value: ::std::sync::Arc<Self>| -> ::std::sync::Arc<#ty> { value }))
    });
    let hooks = args.post_construct.iter().map(|hook| {
        let hook_name = hook.to_string();
        quote!(.post_construct(#hook_name, |this: &Self| this.#hook()))
    });
    let initializing = args.initializing.then(|| quote!(.initializing()));
    let disposable = args.disposable.then(|| quote!(.disposable()));

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::di_common::Describe for #name #ty_generics #where_clause {
            fn descriptor() -> ::di_common::TypeDescriptor {
                ::di_common::TypeDescriptor::of::<Self>()
                    .component()
                    #scope
                    #primary
                    #named
                    #constructor
                    #(#provides)*
                    #(#members)*
                    #(#hooks)*
                    #initializing
                    #disposable
                    .build()
            }
        }
    })
}
