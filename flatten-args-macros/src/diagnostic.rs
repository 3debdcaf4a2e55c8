//! Compile errors raised by the expansion.

use proc_macro2::Span;
use thiserror::Error;

/// Structural failures. Each one aborts the expansion of a single module.
#[derive(Debug, Error)]
pub enum Diagnostic {
    #[error("#[flatten_args] must be applied to an inline module")]
    NotInlineModule,

    #[error("requires a nested type named '{0}'")]
    TargetBundleNotFound(String),

    #[error("'{0}' must be a struct with named fields")]
    UnsupportedBundle(String),

    #[error("requires a struct with a field named '{0}'")]
    ContainerNotFound(String),

    #[error("requires a constructor taking '{0}'")]
    MissingConstructor(String),

    #[error("cannot resolve '{name}' through the glob imports of '{module}'")]
    UnresolvedName { name: String, module: String },

    #[error("duplicate flattened parameter '{name}' (also declared at {first})")]
    DuplicateParameter { name: String, first: String },
}

impl Diagnostic {
    /// Attach the diagnostic to a source location.
    pub fn at(self, span: Span) -> syn::Error {
        syn::Error::new(span, self)
    }
}
