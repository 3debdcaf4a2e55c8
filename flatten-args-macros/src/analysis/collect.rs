//! Property collection.
//!
//! Walks the bundle's fields in declaration order. A field typed
//! `owner::Arguments`, where `owner` is an inline module of the annotated
//! module declaring its own bundle struct, is expanded in place; every other
//! field becomes one flat parameter. Each property remembers the chain of
//! fields it was reached through so the bundle can be rebuilt later.

use std::collections::BTreeMap;

use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::visit_mut::{self, VisitMut};
use syn::punctuated::Punctuated;
use syn::{Ident, Path, PathSegment, Token, TraitBound, Type, TypePath};

use crate::diagnostic::Diagnostic;
use crate::model::{DefaultConstructor, Scope, StoredField, TypeDecl};

/// One step from a bundle into a nested bundle.
#[derive(Debug, Clone)]
pub struct Segment {
    /// Field holding the nested bundle, as written.
    pub field: Ident,
    /// Field name without the raw prefix.
    pub name: String,
    /// Module declaring the nested bundle.
    pub owner: Ident,
}

#[derive(Debug, Clone)]
pub enum Value {
    /// Supplied by the caller as a parameter of the same name.
    Parameter,
    /// Filled with a fixed expression.
    Preset(TokenStream),
}

#[derive(Debug, Clone)]
pub struct Property {
    pub ident: Ident,
    pub name: String,
    /// Declared type, rebased to resolve from the annotated module.
    pub ty: Type,
    pub doc: Vec<String>,
    pub path: Vec<Segment>,
    pub value: Value,
}

impl Property {
    pub fn is_parameter(&self) -> bool {
        matches!(self.value, Value::Parameter)
    }
}

#[derive(Debug, Clone)]
pub enum Collected {
    /// The bundle has a zero-parameter constructor; nothing to flatten.
    Defaults(DefaultConstructor),
    Properties(Vec<Property>),
}

pub struct Collector<'a> {
    scope: &'a Scope,
    bundle_name: &'a str,
}

impl<'a> Collector<'a> {
    pub fn new(scope: &'a Scope, bundle_name: &'a str) -> Self {
        Self { scope, bundle_name }
    }

    /// Flatten the top-level bundle. Fails on duplicate parameter names and on
    /// leaf types that cannot be named from the annotated module.
    pub fn collect(&self, bundle: &TypeDecl) -> syn::Result<Collected> {
        let collected = self.walk(bundle, None, &[])?;
        if let Collected::Properties(properties) = &collected {
            self.ensure_unique(properties)?;
        }
        Ok(collected)
    }

    fn walk(
        &self,
        bundle: &TypeDecl,
        owner: Option<&Scope>,
        path: &[Segment],
    ) -> syn::Result<Collected> {
        if let Some(ctor) = bundle.default_constructor() {
            return Ok(Collected::Defaults(ctor));
        }

        let generics: Vec<String> = bundle
            .generics
            .type_params()
            .map(|p| p.ident.to_string())
            .collect();
        let to_leaf =
            |field: &StoredField, value: Value| leaf(field, owner, &generics, path, value);

        let mut properties = Vec::new();
        for field in bundle.fields().unwrap_or_default() {
            let Some((module, nested)) = self.nested_bundle(field, owner, path) else {
                properties.push(to_leaf(field, Value::Parameter)?);
                continue;
            };

            let segment = Segment {
                field: field.ident.clone(),
                name: field.name.clone(),
                owner: module.ident.clone(),
            };
            let mut inner_path = path.to_vec();
            inner_path.push(segment);

            let module_ident = &module.ident;
            let bundle_ident = &nested.ident;
            let nested_ty = quote!(#module_ident::#bundle_ident);

            match self.walk(nested, Some(module), &inner_path)? {
                Collected::Defaults(ctor) => {
                    properties.push(to_leaf(field, Value::Preset(ctor.call(&nested_ty)))?);
                }
                Collected::Properties(inner) if inner.is_empty() => {
                    properties.push(to_leaf(field, Value::Preset(quote!(#nested_ty {})))?);
                }
                Collected::Properties(inner) => properties.extend(inner),
            }
        }

        Ok(Collected::Properties(properties))
    }

    /// Resolve a field type naming a bundle in a sibling inline module.
    ///
    /// From the annotated module that is `owner::Bundle` or
    /// `self::owner::Bundle`, from a nested module `super::owner::Bundle`.
    /// Any other shape or lookup failure leaves the field as an ordinary
    /// leaf, and so does a reference back into a module already on the path.
    fn nested_bundle(
        &self,
        field: &StoredField,
        from: Option<&Scope>,
        path: &[Segment],
    ) -> Option<(&'a Scope, &'a TypeDecl)> {
        let Type::Path(ty) = &field.ty else {
            return None;
        };
        if ty.qself.is_some() || ty.path.leading_colon.is_some() {
            return None;
        }

        let segments: Vec<_> = ty.path.segments.iter().collect();
        let (owner, last) = match (from, segments.as_slice()) {
            (None, [owner, last]) => (owner, last),
            (None, [first, owner, last]) if first.ident == "self" => (owner, last),
            (Some(_), [first, owner, last]) if first.ident == "super" => (owner, last),
            _ => return None,
        };
        if last.ident.unraw() != self.bundle_name {
            return None;
        }

        let owner_name = owner.ident.unraw().to_string();
        if path.iter().any(|s| s.owner.unraw() == owner_name) {
            return None;
        }

        let module = self.scope.find_module(&owner_name)?;
        let decl = module.find_type(self.bundle_name)?;
        decl.fields()?;
        Some((module, decl))
    }

    fn ensure_unique(&self, properties: &[Property]) -> syn::Result<()> {
        let mut seen: BTreeMap<&str, &Property> = BTreeMap::new();
        for property in properties.iter().filter(|p| p.is_parameter()) {
            if let Some(first) = seen.get(property.name.as_str()) {
                return Err(Diagnostic::DuplicateParameter {
                    name: property.name.clone(),
                    first: self.location(first),
                }
                .at(property.ident.span()));
            }
            seen.insert(&property.name, property);
        }
        Ok(())
    }

    fn location(&self, property: &Property) -> String {
        let mut parts = vec![self.bundle_name];
        parts.extend(property.path.iter().map(|s| s.name.as_str()));
        parts.push(&property.name);
        parts.join(".")
    }
}

fn leaf(
    field: &StoredField,
    owner: Option<&Scope>,
    generics: &[String],
    path: &[Segment],
    value: Value,
) -> syn::Result<Property> {
    let mut ty = field.ty.clone();
    if let Some(owner) = owner {
        let mut rebase = Rebase {
            owner,
            generics,
            error: None,
        };
        rebase.visit_type_mut(&mut ty);
        if let Some(error) = rebase.error {
            return Err(error);
        }
    }

    Ok(Property {
        ident: field.ident.clone(),
        name: field.name.clone(),
        ty,
        doc: field.doc.clone(),
        path: path.to_vec(),
        value,
    })
}

/// Names every module sees without importing them.
const PRELUDE: &[&str] = &[
    "bool", "char", "str", "u8", "u16", "u32", "u64", "u128", "usize", "i8", "i16", "i32", "i64",
    "i128", "isize", "f32", "f64", "Self", "Box", "String", "Vec", "Option", "Result", "Fn",
    "FnMut", "FnOnce", "Send", "Sync", "Sized", "Unpin", "Clone", "Copy", "Default", "Drop", "Eq",
    "PartialEq", "Ord", "PartialOrd", "AsRef", "AsMut", "From", "Into", "TryFrom", "TryInto",
    "Iterator", "IntoIterator", "DoubleEndedIterator", "ExactSizeIterator", "Extend",
    "FromIterator", "ToOwned", "ToString",
];

/// Rewrites type paths written inside a nested module so they resolve from
/// the annotated module.
struct Rebase<'a> {
    owner: &'a Scope,
    /// Type parameters of the nested bundle, left untouched.
    generics: &'a [String],
    error: Option<syn::Error>,
}

impl VisitMut for Rebase<'_> {
    fn visit_type_path_mut(&mut self, node: &mut TypePath) {
        if node.qself.is_none() {
            self.rebase(&mut node.path);
        }
        visit_mut::visit_type_path_mut(self, node);
    }

    fn visit_trait_bound_mut(&mut self, node: &mut TraitBound) {
        self.rebase(&mut node.path);
        visit_mut::visit_trait_bound_mut(self, node);
    }
}

impl Rebase<'_> {
    fn rebase(&mut self, path: &mut Path) {
        if path.leading_colon.is_some() {
            return;
        }
        let Some(head) = path.segments.first().map(|s| s.ident.clone()) else {
            return;
        };
        let name = head.unraw().to_string();

        if rebase_local(path, self.owner) {
            return;
        }
        if let Some(import) = self.owner.find_import(&name) {
            splice(path, &import.path);
            rebase_local(path, self.owner);
            return;
        }
        if path.segments.len() > 1
            || PRELUDE.contains(&name.as_str())
            || self.generics.contains(&name)
        {
            return;
        }

        // A bare name the module neither declares nor imports by name.
        let foreign: Vec<&Path> = self
            .owner
            .globs
            .iter()
            .filter(|g| !g.segments.first().is_some_and(|s| s.ident == "super"))
            .collect();
        let from_parent = foreign.len() < self.owner.globs.len();
        match foreign.as_slice() {
            [] => {}
            [glob] if !from_parent => {
                let mut prefix = (*glob).clone();
                prefix.segments.push(PathSegment::from(head));
                splice(path, &prefix);
                rebase_local(path, self.owner);
            }
            _ => {
                if self.error.is_none() {
                    self.error = Some(
                        Diagnostic::UnresolvedName {
                            name,
                            module: self.owner.ident.to_string(),
                        }
                        .at(head.span()),
                    );
                }
            }
        }
    }
}

/// Apply the rules that need nothing but the owner's own items:
/// `super::` is dropped, `self::` becomes `owner::`, and a leading name
/// declared in the owner gets the `owner::` prefix. Returns false when none
/// applies.
fn rebase_local(path: &mut Path, owner: &Scope) -> bool {
    if path.leading_colon.is_some() {
        return false;
    }
    let Some(first) = path.segments.first() else {
        return false;
    };
    let name = first.ident.unraw().to_string();

    if first.ident == "super" {
        path.segments = path.segments.iter().skip(1).cloned().collect();
    } else if first.ident == "self" {
        path.segments[0].ident = owner.ident.clone();
    } else if owner.find_type(&name).is_some() || owner.find_module(&name).is_some() {
        path.segments.insert(0, PathSegment::from(owner.ident.clone()));
    } else {
        return false;
    }
    true
}

/// Replace the leading segment of `path` with `target`, keeping its generic
/// arguments on the last segment of `target`.
fn splice(path: &mut Path, target: &Path) {
    let mut segments = path.segments.iter().cloned();
    let Some(head) = segments.next() else {
        return;
    };

    let mut spliced: Punctuated<PathSegment, Token![::]> = target.segments.clone();
    if let Some(last) = spliced.last_mut() {
        last.arguments = head.arguments;
    }
    spliced.extend(segments);

    path.leading_colon = target.leading_colon;
    path.segments = spliced;
}
