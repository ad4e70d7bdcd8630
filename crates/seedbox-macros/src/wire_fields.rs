//! Implementation of `#[derive(WireFields)]`.
//!
//! Reads the `#[serde(...)]` attributes on the container and its fields and
//! generates a `wire_fields()` function returning the JSON key of every
//! public, non-skipped field in declaration order.

use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::meta::ParseNestedMeta;
use syn::{DeriveInput, LitStr, Result, Token};

use crate::case::RenameRule;

/// One slot in the generated field list.
enum Entry {
    /// A literal wire name.
    Name(String),
    /// A flattened record whose own names are spliced in at this position.
    Flatten(syn::Type),
}

/// The subset of serde's field attributes that affect the wire name.
#[derive(Default)]
struct FieldAttrs {
    rename: Option<String>,
    flatten: bool,
    skip: bool,
}

impl FieldAttrs {
    fn parse(field: &syn::Field) -> Result<Self> {
        let mut attrs = FieldAttrs::default();
        for attr in &field.attrs {
            if !attr.path().is_ident("serde") {
                continue;
            }
            attr.parse_nested_meta(|meta| attrs.parse_item(meta))?;
        }
        Ok(attrs)
    }

    fn parse_item(&mut self, meta: ParseNestedMeta) -> Result<()> {
        if meta.path.is_ident("rename") {
            self.rename = Some(parse_serialize_name(&meta)?);
        } else if meta.path.is_ident("flatten") {
            self.flatten = true;
        } else if meta.path.is_ident("skip")
            || meta.path.is_ident("skip_serializing")
            || meta.path.is_ident("skip_deserializing")
        {
            self.skip = true;
        } else {
            skip_value(&meta)?;
        }
        Ok(())
    }
}

fn parse_container_rule(input: &DeriveInput) -> Result<Option<RenameRule>> {
    let mut rule = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if !meta.path.is_ident("rename_all") {
                return skip_value(&meta);
            }
            let name = parse_serialize_name(&meta)?;
            rule = Some(RenameRule::parse(&name).ok_or_else(|| {
                meta.error(format!("unsupported rename_all rule {name:?}"))
            })?);
            Ok(())
        })?;
    }
    Ok(rule)
}

/// Parse either `key = "value"` or `key(serialize = "value", ...)`.
fn parse_serialize_name(meta: &ParseNestedMeta) -> Result<String> {
    if meta.input.peek(Token![=]) {
        let lit: LitStr = meta.value()?.parse()?;
        return Ok(lit.value());
    }

    let mut name = None;
    meta.parse_nested_meta(|nested| {
        if nested.path.is_ident("serialize") {
            let lit: LitStr = nested.value()?.parse()?;
            name = Some(lit.value());
            Ok(())
        } else {
            skip_value(&nested)
        }
    })?;
    name.ok_or_else(|| meta.error("expected a `serialize = \"...\"` name"))
}

/// Consume the value of a serde option we do not interpret.
fn skip_value(meta: &ParseNestedMeta) -> Result<()> {
    if meta.input.peek(Token![=]) {
        let _: syn::Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in meta.input);
        let _: TokenStream = content.parse()?;
    }
    Ok(())
}

/// `Option<T>` flattens like `T`.
fn flatten_target(ty: &syn::Type) -> &syn::Type {
    if let syn::Type::Path(path) = ty
        && path.qself.is_none()
        && let Some(last) = path.path.segments.last()
        && last.ident == "Option"
        && let syn::PathArguments::AngleBracketed(args) = &last.arguments
        && let Some(syn::GenericArgument::Type(inner)) = args.args.first()
    {
        return inner;
    }
    ty
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;

    let fields = match &input.data {
        syn::Data::Struct(data) => match &data.fields {
            syn::Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "WireFields only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "WireFields can only be derived for structs",
            ));
        }
    };

    let rule = parse_container_rule(&input)?;

    let mut entries = Vec::new();
    for field in fields {
        if !matches!(field.vis, syn::Visibility::Public(_)) {
            continue;
        }
        let Some(ident) = &field.ident else {
            continue;
        };
        let attrs = FieldAttrs::parse(field)?;
        if attrs.skip {
            continue;
        }
        if attrs.flatten {
            entries.push(Entry::Flatten(flatten_target(&field.ty).clone()));
            continue;
        }
        let declared = ident.unraw().to_string();
        let wire = match (attrs.rename, rule) {
            (Some(rename), _) => rename,
            (None, Some(rule)) => rule.apply(&declared),
            (None, None) => declared,
        };
        entries.push(Entry::Name(wire));
    }

    let pushes = entries.iter().map(|entry| match entry {
        Entry::Name(wire) => quote! {
            fields.push(#wire);
        },
        Entry::Flatten(ty) => quote! {
            fields.extend(<#ty as ::seedbox_rpc::fields::WireFields>::wire_fields());
        },
    });

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::seedbox_rpc::fields::WireFields for #name #ty_generics #where_clause {
            #[allow(unused_mut)]
            fn wire_fields() -> ::std::vec::Vec<&'static str> {
                let mut fields = ::std::vec::Vec::new();
                #(#pushes)*
                fields
            }
        }
    })
}
