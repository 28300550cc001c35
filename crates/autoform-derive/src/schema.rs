// File: autoform-derive/src/schema.rs
// Purpose: #[form] / #[form_field] attribute parsing and FormSchema generation

use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::meta::ParseNestedMeta;
use syn::{Attribute, Data, DeriveInput, Expr, ExprLit, ExprUnary, Fields, Lit, LitStr, Path, UnOp};

/// Options carried by the struct-level `#[form(...)]` marker
#[derive(Default)]
struct FormAttr {
    layout: Option<Path>,
    validator: Option<Path>,
    hint_provider: Option<Path>,
}

/// Options carried by a field-level `#[form_field(...)]` attribute
#[derive(Default)]
struct FormFieldAttr {
    key: Option<String>,
    label: Option<String>,
    hint: Option<String>,
    order: Option<f32>,
    layout: Option<Path>,
    validator: Option<Path>,
    hint_provider: Option<Path>,
}

/// One annotated struct field
struct AnnotatedField {
    ident: syn::Ident,
    name: String,
    attr: FormFieldAttr,
}

fn find_attr<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a Attribute> {
    attrs.iter().find(|attr| attr.path().is_ident(name))
}

fn parse_form_attr(attr: &Attribute) -> syn::Result<FormAttr> {
    let mut parsed = FormAttr::default();

    // A bare `#[form]` is a marker with no defaults
    if matches!(attr.meta, syn::Meta::Path(_)) {
        return Ok(parsed);
    }

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("layout") {
            parsed.layout = Some(meta.value()?.parse()?);
        } else if meta.path.is_ident("validator") {
            parsed.validator = Some(meta.value()?.parse()?);
        } else if meta.path.is_ident("hint_provider") {
            parsed.hint_provider = Some(meta.value()?.parse()?);
        } else {
            return Err(meta.error("unsupported #[form] option, expected `layout`, `validator` or `hint_provider`"));
        }
        Ok(())
    })?;

    Ok(parsed)
}

fn parse_form_field_attr(attr: &Attribute) -> syn::Result<FormFieldAttr> {
    let mut parsed = FormFieldAttr::default();

    if matches!(attr.meta, syn::Meta::Path(_)) {
        return Ok(parsed);
    }

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("key") {
            parsed.key = Some(parse_str(&meta)?);
        } else if meta.path.is_ident("label") {
            parsed.label = Some(parse_str(&meta)?);
        } else if meta.path.is_ident("hint") {
            parsed.hint = Some(parse_str(&meta)?);
        } else if meta.path.is_ident("order") {
            let expr: Expr = meta.value()?.parse()?;
            parsed.order = Some(parse_order(&expr)?);
        } else if meta.path.is_ident("layout") {
            parsed.layout = Some(meta.value()?.parse()?);
        } else if meta.path.is_ident("validator") {
            parsed.validator = Some(meta.value()?.parse()?);
        } else if meta.path.is_ident("hint_provider") {
            parsed.hint_provider = Some(meta.value()?.parse()?);
        } else {
            return Err(meta.error("unsupported #[form_field] option"));
        }
        Ok(())
    })?;

    Ok(parsed)
}

fn parse_str(meta: &ParseNestedMeta) -> syn::Result<String> {
    let lit: LitStr = meta.value()?.parse()?;
    Ok(lit.value())
}

/// Accepts `order = 3`, `order = 2.5` and `order = -1`
fn parse_order(expr: &Expr) -> syn::Result<f32> {
    match expr {
        Expr::Lit(ExprLit { lit: Lit::Int(i), .. }) => i.base10_parse::<f32>(),
        Expr::Lit(ExprLit { lit: Lit::Float(f), .. }) => f.base10_parse::<f32>(),
        Expr::Unary(ExprUnary { op: UnOp::Neg(_), expr, .. }) => parse_order(expr).map(|v| -v),
        other => Err(syn::Error::new_spanned(other, "`order` must be a numeric literal")),
    }
}

fn collect_fields(input: &DeriveInput) -> syn::Result<Vec<AnnotatedField>> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "Form only supports structs with named fields",
                ))
            }
        },
        _ => return Err(syn::Error::new_spanned(&input.ident, "Form only supports structs")),
    };

    let mut annotated = Vec::new();
    for field in fields {
        let Some(attr) = find_attr(&field.attrs, "form_field") else {
            continue;
        };
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        annotated.push(AnnotatedField {
            name: ident.unraw().to_string(),
            ident,
            attr: parse_form_field_attr(attr)?,
        });
    }
    Ok(annotated)
}

fn layout_ref(path: &Option<Path>) -> TokenStream {
    match path {
        Some(path) => quote! { ::core::option::Option::Some(::autoform::ProviderRef::layout::<#path>()) },
        None => quote! { ::core::option::Option::None },
    }
}

fn validator_ref(path: &Option<Path>) -> TokenStream {
    match path {
        Some(path) => quote! { ::core::option::Option::Some(::autoform::ProviderRef::validator::<#path>()) },
        None => quote! { ::core::option::Option::None },
    }
}

fn hint_provider_ref(path: &Option<Path>) -> TokenStream {
    match path {
        Some(path) => quote! { ::core::option::Option::Some(::autoform::ProviderRef::hint_provider::<#path>()) },
        None => quote! { ::core::option::Option::None },
    }
}

/// Generate the FormSchema implementation for a struct
pub fn impl_form_schema(input: &DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let form_attr = find_attr(&input.attrs, "form").map(parse_form_attr).transpose()?;
    let fields = collect_fields(input)?;

    let form_attrs_body = match &form_attr {
        Some(form) => {
            let layout = layout_ref(&form.layout);
            let validator = validator_ref(&form.validator);
            let hint_provider = hint_provider_ref(&form.hint_provider);
            quote! {
                ::core::option::Option::Some(::autoform::FormAttrs {
                    layout: #layout,
                    validator: #validator,
                    hint_provider: #hint_provider,
                })
            }
        }
        None => quote! { ::core::option::Option::None },
    };

    let specs = fields.iter().map(|field| {
        let field_name = &field.name;
        let key = field.attr.key.clone().unwrap_or_else(|| field.name.clone());
        let label = field.attr.label.clone().unwrap_or_default();
        let hint = field.attr.hint.clone().unwrap_or_default();
        let order = field.attr.order.unwrap_or(0.0);
        let layout = layout_ref(&field.attr.layout);
        let validator = validator_ref(&field.attr.validator);
        let hint_provider = hint_provider_ref(&field.attr.hint_provider);
        quote! {
            ::autoform::FieldSpec {
                field_name: #field_name,
                key: #key,
                label: #label,
                hint: #hint,
                order: #order,
                layout: #layout,
                validator: #validator,
                hint_provider: #hint_provider,
            }
        }
    });

    let read_arms = fields.iter().map(|field| {
        let ident = &field.ident;
        let field_name = &field.name;
        quote! {
            #field_name => ::autoform::__private::serde_json::to_value(&self.#ident).map_err(|source| {
                ::autoform::FieldAccessError::Conversion {
                    field: field_name.to_string(),
                    source,
                }
            }),
        }
    });

    let write_arms = fields.iter().map(|field| {
        let ident = &field.ident;
        let field_name = &field.name;
        quote! {
            #field_name => {
                self.#ident = ::autoform::__private::serde_json::from_value(value).map_err(|source| {
                    ::autoform::FieldAccessError::Conversion {
                        field: field_name.to_string(),
                        source,
                    }
                })?;
                ::core::result::Result::Ok(())
            }
        }
    });

    Ok(quote! {
        impl #impl_generics ::autoform::FormSchema for #name #ty_generics #where_clause {
            fn form_attrs() -> ::core::option::Option<::autoform::FormAttrs> {
                #form_attrs_body
            }

            fn field_specs() -> ::std::vec::Vec<::autoform::FieldSpec> {
                ::std::vec![#(#specs),*]
            }

            fn read_field(
                &self,
                field_name: &str,
            ) -> ::core::result::Result<::autoform::__private::serde_json::Value, ::autoform::FieldAccessError> {
                match field_name {
                    #(#read_arms)*
                    _ => ::core::result::Result::Err(::autoform::FieldAccessError::NoSuchField(field_name.to_string())),
                }
            }

            fn write_field(
                &mut self,
                field_name: &str,
                value: ::autoform::__private::serde_json::Value,
            ) -> ::core::result::Result<(), ::autoform::FieldAccessError> {
                match field_name {
                    #(#write_arms)*
                    _ => {
                        let _ = value;
                        ::core::result::Result::Err(::autoform::FieldAccessError::NoSuchField(field_name.to_string()))
                    }
                }
            }
        }
    })
}
