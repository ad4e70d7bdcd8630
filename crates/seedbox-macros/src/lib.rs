#![deny(unsafe_code)]

//! Procedural macros for seedbox.
//!
//! - `#[derive(WireFields)]`: list a record's JSON wire field names at
//!   compile time, following the record's `serde` attributes

extern crate proc_macro;

mod case;
mod wire_fields;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Derive macro that lists the JSON field names a record uses on the wire.
///
/// Generates an implementation of `seedbox_rpc::fields::WireFields`. The
/// field list is derived from the declared shape and its `serde` attributes:
///
/// - `#[serde(flatten)]` fields contribute the nested record's names, in place
/// - `#[serde(skip)]`, `skip_serializing` and `skip_deserializing` exclude a field
/// - `#[serde(rename = "...")]` overrides the name; otherwise the container's
///   `#[serde(rename_all = "...")]` applies; otherwise the Rust field name
/// - fields that are not `pub` are ignored
///
/// # Example
///
/// ```ignore
/// use seedbox_macros::WireFields;
///
/// #[derive(serde::Deserialize, WireFields)]
/// #[serde(rename_all = "camelCase")]
/// struct Peer {
///     pub address: String,
///     pub client_name: String,
///     #[serde(rename = "isUTP")]
///     pub is_utp: bool,
/// }
///
/// assert_eq!(Peer::wire_fields(), ["address", "clientName", "isUTP"]);
/// ```
#[proc_macro_derive(WireFields, attributes(serde))]
pub fn derive_wire_fields(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    wire_fields::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
