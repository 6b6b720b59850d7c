//! Procedural macros for gregor-dispatch

use darling::{FromDeriveInput, FromField, FromVariant};
use proc_macro::TokenStream;
use quote::{format_ident, quote};
use std::collections::HashMap;
use syn::{parse_macro_input, DeriveInput};

/// Container-level attributes for #[derive(Action)]
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(action), supports(enum_any))]
struct ActionOpts {
    ident: syn::Ident,
    data: darling::ast::Data<ActionVariant, ()>,

    /// Prefix for every type tag, e.g. `gregor` -> `gregor:pushState`
    #[darling(default)]
    namespace: Option<String>,
}

/// Variant-level attributes
#[derive(Debug, FromVariant)]
#[darling(attributes(action))]
struct ActionVariant {
    ident: syn::Ident,
    fields: darling::ast::Fields<ActionField>,

    /// Explicit type tag, bypasses the namespace
    #[darling(default)]
    rename: Option<String>,

    /// Marks a failure variant (`is_error() == true`)
    #[darling(default)]
    error: bool,

    /// Don't generate `create_*` for this variant
    #[darling(default)]
    skip_creator: bool,
}

#[derive(Debug, FromField)]
struct ActionField {
    ident: Option<syn::Ident>,
    ty: syn::Type,
}

/// Convert PascalCase to snake_case
fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}

/// Convert PascalCase to lowerCamelCase
fn to_lower_camel_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
    }
}

/// Type tag for a variant
fn type_tag(namespace: Option<&str>, variant: &ActionVariant) -> String {
    if let Some(ref explicit) = variant.rename {
        return explicit.clone();
    }
    let name = variant.ident.to_string();
    match namespace {
        Some(ns) => format!("{}:{}", ns, to_lower_camel_case(&name)),
        None => name,
    }
}

/// `create_*` constructor for one variant
fn creator(name: &syn::Ident, variant: &ActionVariant, tag: &str) -> proc_macro2::TokenStream {
    let variant_name = &variant.ident;
    let fn_name = format_ident!("create_{}", to_snake_case(&variant_name.to_string()));
    let doc = format!("Create a `{}` action.", tag);

    match variant.fields.style {
        darling::ast::Style::Unit => quote! {
            #[doc = #doc]
            pub fn #fn_name() -> Self {
                #name::#variant_name
            }
        },
        darling::ast::Style::Tuple => {
            let args: Vec<_> = (0..variant.fields.fields.len())
                .map(|i| {
                    if variant.fields.fields.len() == 1 {
                        format_ident!("payload")
                    } else {
                        format_ident!("arg{}", i)
                    }
                })
                .collect();
            let types = variant.fields.fields.iter().map(|f| &f.ty);
            quote! {
                #[doc = #doc]
                pub fn #fn_name(#(#args: #types),*) -> Self {
                    #name::#variant_name(#(#args),*)
                }
            }
        }
        darling::ast::Style::Struct => {
            let args: Vec<_> = variant
                .fields
                .fields
                .iter()
                .filter_map(|f| f.ident.as_ref())
                .collect();
            let types = variant.fields.fields.iter().map(|f| &f.ty);
            quote! {
                #[doc = #doc]
                pub fn #fn_name(#(#args: #types),*) -> Self {
                    #name::#variant_name { #(#args),* }
                }
            }
        }
    }
}

/// Derive macro for the Action trait
///
/// Generates:
/// - `impl Action` with `name()` returning the variant's type tag and
///   `is_error()` for variants marked `#[action(error)]`
/// - an associated `&'static str` constant per variant holding its tag
///   (`PushState` -> `PUSH_STATE`)
/// - `action_types()` listing every tag
/// - a `create_{variant}` constructor per variant
///
/// With `#[action(namespace = "gregor")]` tags are `"gregor:" + lowerCamel(variant)`,
/// otherwise the bare variant name. `#[action(rename = "...")]` sets a tag
/// explicitly.
///
/// # Example
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// #[action(namespace = "gregor")]
/// enum GregorAction {
///     PushState(PushStatePayload),
///     #[action(error)]
///     PushStateFailed { reason: String },
/// }
///
/// let action = GregorAction::create_push_state(payload);
/// assert_eq!(action.name(), "gregor:pushState");
/// assert_eq!(GregorAction::PUSH_STATE, "gregor:pushState");
/// assert!(!action.is_error());
/// ```
#[proc_macro_derive(Action, attributes(action))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let opts = match ActionOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return e.write_errors().into(),
    };

    let name = &opts.ident;

    let variants = match &opts.data {
        darling::ast::Data::Enum(variants) => variants,
        _ => {
            return syn::Error::new_spanned(&input, "Action can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    let tags: Vec<String> = variants
        .iter()
        .map(|v| type_tag(opts.namespace.as_deref(), v))
        .collect();

    // Tags are dispatch keys, a duplicate would shadow a variant
    let mut seen: HashMap<&str, &syn::Ident> = HashMap::new();
    for (v, tag) in variants.iter().zip(tags.iter()) {
        if let Some(previous) = seen.insert(tag.as_str(), &v.ident) {
            return syn::Error::new_spanned(
                &v.ident,
                format!("duplicate action type `{}` (also used by `{}`)", tag, previous),
            )
            .to_compile_error()
            .into();
        }
    }

    let name_arms = variants.iter().zip(tags.iter()).map(|(v, tag)| {
        let variant_name = &v.ident;
        quote! { #name::#variant_name { .. } => #tag }
    });

    let error_variants: Vec<_> = variants
        .iter()
        .filter(|v| v.error)
        .map(|v| {
            let variant_name = &v.ident;
            quote! { #name::#variant_name { .. } }
        })
        .collect();

    let is_error = if error_variants.is_empty() {
        quote! {}
    } else {
        quote! {
            fn is_error(&self) -> bool {
                matches!(self, #(#error_variants)|*)
            }
        }
    };

    let consts = variants.iter().zip(tags.iter()).map(|(v, tag)| {
        let const_name = format_ident!("{}", to_snake_case(&v.ident.to_string()).to_uppercase());
        let doc = format!("Type tag of [`{}::{}`].", name, v.ident);
        quote! {
            #[doc = #doc]
            pub const #const_name: &'static str = #tag;
        }
    });

    let creators = variants
        .iter()
        .zip(tags.iter())
        .filter(|(v, _)| !v.skip_creator)
        .map(|(v, tag)| creator(name, v, tag));

    let expanded = quote! {
        impl gregor_dispatch::Action for #name {
            fn name(&self) -> &'static str {
                match self {
                    #(#name_arms),*
                }
            }

            #is_error
        }

        impl #name {
            #(#consts)*

            /// Every type tag this action enum can produce
            pub fn action_types() -> &'static [&'static str] {
                &[#(#tags),*]
            }

            #(#creators)*
        }
    };

    TokenStream::from(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_conversion() {
        assert_eq!(to_snake_case("PushState"), "push_state");
        assert_eq!(to_snake_case("ChatUnreadUpdateFull"), "chat_unread_update_full");
        assert_eq!(to_lower_camel_case("PushState"), "pushState");
        assert_eq!(to_lower_camel_case("Clear"), "clear");
    }
}
