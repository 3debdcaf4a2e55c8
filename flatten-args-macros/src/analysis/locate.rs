//! Bundle and container lookup.

use syn::ext::IdentExt;

use crate::config::Config;
use crate::diagnostic::Diagnostic;
use crate::model::{Scope, TypeDecl};

/// The container struct and whether it holds nothing but the bundle.
#[derive(Debug, Clone, Copy)]
pub struct Container<'a> {
    pub decl: &'a TypeDecl,
    pub witness: bool,
}

/// Find the parameter bundle among the module's types.
pub fn bundle<'a>(scope: &'a Scope, config: &Config) -> syn::Result<&'a TypeDecl> {
    let Some(decl) = scope.find_type(&config.struct_name) else {
        return Err(
            Diagnostic::TargetBundleNotFound(config.struct_name.clone()).at(scope.ident.span())
        );
    };
    if decl.fields().is_none() {
        return Err(Diagnostic::UnsupportedBundle(config.struct_name.clone()).at(decl.ident.span()));
    }
    Ok(decl)
}

/// Find the first struct, other than the bundle, holding the bundle field.
pub fn container<'a>(scope: &'a Scope, config: &Config) -> syn::Result<Container<'a>> {
    scope
        .types()
        .filter(|decl| decl.ident.unraw() != config.struct_name)
        .find_map(|decl| {
            let fields = decl.fields()?;
            fields
                .iter()
                .any(|f| f.name == config.property_name)
                .then_some(Container {
                    decl,
                    witness: fields.len() == 1,
                })
        })
        .ok_or_else(|| {
            Diagnostic::ContainerNotFound(config.property_name.clone()).at(scope.ident.span())
        })
}
