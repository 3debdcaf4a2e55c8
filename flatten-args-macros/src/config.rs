//! Attribute arguments.
//!
//! Syntax: `#[flatten_args]` or
//! `#[flatten_args(struct_name = "Options", property_name = "options", constructor = "build")]`.
//! Anything that is not a `key = "literal"` pair is ignored.

use proc_macro2::TokenStream;
use syn::punctuated::Punctuated;
use syn::{Expr, Ident, Lit, Meta, Token};

pub const DEFAULT_STRUCT_NAME: &str = "Arguments";
pub const DEFAULT_PROPERTY_NAME: &str = "arguments";
pub const DEFAULT_CONSTRUCTOR: &str = "from_fields";

/// Resolved settings for one expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Name of the parameter bundle struct.
    pub struct_name: String,
    /// Name of the container field that stores the bundle.
    pub property_name: String,
    /// Name of the generated constructor.
    pub constructor: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            struct_name: DEFAULT_STRUCT_NAME.to_string(),
            property_name: DEFAULT_PROPERTY_NAME.to_string(),
            constructor: DEFAULT_CONSTRUCTOR.to_string(),
        }
    }
}

impl Config {
    /// Resolve settings from raw attribute tokens. Never fails.
    pub fn resolve(attr: TokenStream) -> Self {
        let mut config = Self::default();

        let parser = Punctuated::<Meta, Token![,]>::parse_terminated;
        let Ok(metas) = syn::parse::Parser::parse2(parser, attr) else {
            return config;
        };

        for meta in metas {
            let Meta::NameValue(pair) = meta else { continue };
            let Some(value) = string_literal(&pair.value) else { continue };
            let Some(key) = pair.path.get_ident() else { continue };

            match key.to_string().as_str() {
                "struct_name" if is_ident(&value) => config.struct_name = value,
                "property_name" if is_ident(&value) => config.property_name = value,
                "constructor" if is_ident(&value) => config.constructor = value,
                _ => {}
            }
        }

        config
    }

    /// Identifier for the generated constructor.
    pub fn constructor_ident(&self) -> Ident {
        syn::parse_str(&self.constructor)
            .unwrap_or_else(|_| Ident::new(DEFAULT_CONSTRUCTOR, proc_macro2::Span::call_site()))
    }
}

fn string_literal(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(lit) => match &lit.lit {
            Lit::Str(s) => Some(s.value()),
            _ => None,
        },
        _ => None,
    }
}

fn is_ident(value: &str) -> bool {
    syn::parse_str::<Ident>(value).is_ok()
}
