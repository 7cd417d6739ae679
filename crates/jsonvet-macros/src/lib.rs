//! Procedural macros for jsonvet
//!
//! This crate provides `#[derive(Schema)]`, which implements
//! `jsonvet::Describe` for a struct from its `#[vet(...)]` attributes.
//!
//! # Example
//!
//! ```rust,ignore
//! use jsonvet::prelude::*;
//!
//! #[derive(Deserialize, Schema)]
//! struct AbstractRequest {
//!     #[vet(required)]
//!     result: bool,
//! }
//!
//! #[derive(Deserialize, Schema)]
//! #[vet(parent = AbstractRequest)]
//! struct UserListResponse {
//!     #[vet(required(order = 1), not_null(order = 2), not_empty(order = 3), label = "UserList")]
//!     users: Vec<UserDto>,
//! }
//!
//! #[derive(Deserialize, Schema)]
//! struct UserDto {
//!     #[vet(required, pattern(regex = "[A-Za-z ]+", order = 2))]
//!     #[serde(rename = "userName")]
//!     name: String,
//! }
//! ```
//!
//! # Attributes
//!
//! On the struct:
//!
//! - `parent = Type` or `parent = "TypeName"` - fields validated before this type's own
//! - `name = "TypeName"` - name registered in the schema (defaults to the struct name)
//!
//! On fields:
//!
//! - `required`, `not_null`, `not_empty`
//! - `minimum(value = 0)`, `maximum(value = 10)` (or `minimum = 0`)
//! - `range(min = 0, max = 10)`
//! - `pattern(regex = "...")` (or `pattern = "..."`)
//! - `custom(rule = "id", rule = "other")`
//! - every rule accepts `order = N` and `message = "..."`
//! - `label = "LabelId"`, `display_name = "..."`
//! - `element = "TypeName"` - declared type of an object field or list elements
//! - `opaque` - do not infer an element type
//!
//! Without `element` or `opaque`, a field whose type (after unwrapping
//! `Option`, `Vec`, `Box` and the other containers) is not a primitive,
//! `String`, `Value` or a map is treated as a nested schema and must
//! implement `Describe` itself. Enums and foreign types such as `Uuid` or
//! `DateTime<Utc>` need `#[vet(opaque)]`.
//! - `skip` - leave the field out of the schema

mod attr;
mod types;

use attr::{FieldAttrs, Parent, SerdeField, TypeAttrs};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{quote, quote_spanned};
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

/// Derive `jsonvet::Describe` for a struct with named fields.
#[proc_macro_derive(Schema, attributes(vet))]
pub fn derive_schema(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_schema(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_schema(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let ident = &input.ident;
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            ident,
            "#[derive(Schema)] only supports structs",
        ));
    };
    let fields = match &data.fields {
        Fields::Named(named) => named.named.iter().collect::<Vec<_>>(),
        Fields::Unit => Vec::new(),
        Fields::Unnamed(_) => {
            return Err(syn::Error::new_spanned(
                ident,
                "#[derive(Schema)] requires named fields",
            ))
        }
    };

    let type_attrs = TypeAttrs::parse(&input.attrs)?;
    let type_name = type_attrs
        .name
        .as_ref()
        .map(|lit| lit.value())
        .unwrap_or_else(|| ident.unraw().to_string());
    let rename_all = attr::serde_rename_all(&input.attrs);
    let generics: Vec<String> = input
        .generics
        .type_params()
        .map(|p| p.ident.to_string())
        .collect();

    let mut parent_call = quote!();
    let mut dependencies = Vec::new();
    match &type_attrs.parent {
        Some(Parent::Name(name)) => parent_call = quote!(.parent(#name)),
        Some(Parent::Type(ty)) => {
            parent_call = quote!(.parent(<#ty as ::jsonvet::Describe>::type_name()));
            dependencies.push(quote!(<#ty as ::jsonvet::Describe>::register(schema);));
        }
        None => {}
    }

    let mut field_exprs = Vec::new();
    for field in fields {
        let attrs = FieldAttrs::parse(&field.attrs)?;
        let serde = SerdeField::parse(&field.attrs);
        if attrs.skip || serde.skip {
            continue;
        }
        if serde.flatten {
            return Err(syn::Error::new_spanned(
                field,
                "#[serde(flatten)] is not supported by #[derive(Schema)]; use #[vet(parent = ..)]",
            ));
        }

        let Some(field_ident) = &field.ident else {
            continue;
        };
        let name = field_ident.unraw().to_string();

        let alias = match (&serde.rename, &rename_all) {
            (Some(rename), _) => Some(rename.clone()),
            (None, Some(rule)) => match attr::rename_field(&name, rule) {
                Some(renamed) => Some(renamed).filter(|r| *r != name),
                None => {
                    return Err(syn::Error::new_spanned(
                        ident,
                        format!("unsupported serde rename_all rule `{rule}`"),
                    ))
                }
            },
            (None, None) => None,
        };
        let alias_call = alias.map(|a| quote!(.alias(#a)));

        let element_call = if let Some(element) = &attrs.element {
            Some(quote!(.element_type(#element)))
        } else if attrs.opaque {
            None
        } else {
            types::element_type(&field.ty, &generics).map(|ty| {
                dependencies.push(quote_spanned! {ty.span()=>
                    <#ty as ::jsonvet::Describe>::register(schema);
                });
                quote!(.element_type(<#ty as ::jsonvet::Describe>::type_name()))
            })
        };

        let label_call = attrs.label.as_ref().map(|l| quote!(.label(#l)));
        let display_call = attrs.display_name.as_ref().map(|d| quote!(.display_name(#d)));
        let rules = attrs.rules.iter().map(|rule| rule.to_tokens());

        field_exprs.push(quote! {
            ::jsonvet::FieldDescriptor::new(#name)
                #alias_call
                #element_call
                #label_call
                #display_call
                #(.rule(#rules))*
        });
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::jsonvet::Describe for #ident #ty_generics #where_clause {
            fn type_descriptor() -> ::jsonvet::TypeDescriptor {
                ::jsonvet::TypeDescriptor::new(#type_name)
                    #parent_call
                    #(.field(#field_exprs))*
            }

            fn register(schema: &mut ::jsonvet::Schema) {
                if schema.contains(#type_name) {
                    return;
                }
                schema.insert(<Self as ::jsonvet::Describe>::type_descriptor());
                #(#dependencies)*
            }

            fn type_name() -> ::std::string::String {
                ::std::string::String::from(#type_name)
            }
        }
    })
}
