//! Bundle reconstruction.
//!
//! Properties whose path ends at the current level become field initializers
//! in collection order. The rest are grouped by the next field on their path
//! and rebuilt as nested struct literals, groups sorted by field name so the
//! output is the same on every expansion.

use std::collections::BTreeMap;

use proc_macro2::TokenStream;
use quote::quote;
use syn::Ident;

use crate::analysis::collect::{Property, Value};

/// `Bundle { .. }` built from the flat parameters in scope.
pub fn bundle_expr(bundle: &Ident, properties: &[Property]) -> TokenStream {
    let initializers = initializers(bundle, properties);
    quote!(#bundle { #initializers })
}

/// Comma-separated field initializers for the top-level bundle.
pub fn initializers(bundle: &Ident, properties: &[Property]) -> TokenStream {
    let properties: Vec<&Property> = properties.iter().collect();
    level(bundle, &properties, 0)
}

fn level(bundle: &Ident, properties: &[&Property], depth: usize) -> TokenStream {
    let mut direct = Vec::new();
    let mut nested: BTreeMap<&str, Vec<&Property>> = BTreeMap::new();

    for &property in properties {
        match property.path.get(depth) {
            None => direct.push(property),
            Some(segment) => nested.entry(segment.name.as_str()).or_default().push(property),
        }
    }

    let mut parts: Vec<TokenStream> = direct
        .into_iter()
        .map(|property| {
            let ident = &property.ident;
            match &property.value {
                Value::Parameter => quote!(#ident),
                Value::Preset(expr) => quote!(#ident: #expr),
            }
        })
        .collect();

    for members in nested.values() {
        let segment = &members[0].path[depth];
        let field = &segment.field;
        let owner = &segment.owner;
        let inner = level(bundle, members, depth + 1);
        parts.push(quote!(#field: #owner::#bundle { #inner }));
    }

    quote!(#(#parts),*)
}
