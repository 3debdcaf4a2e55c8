//! Read-only model of the annotated module.
//!
//! The expansion never looks at `syn` items directly after lowering: types,
//! nested modules, and the constructors found in inherent `impl` blocks are
//! gathered into a small tree that the analysis passes walk by name.

use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::punctuated::Punctuated;
use syn::{
    Attribute, Expr, Fields, FnArg, GenericArgument, Generics, Ident, ImplItem, ImplItemFn,
    Item, ItemImpl, ItemMod, Lit, Meta, Path, PathArguments, PathSegment, ReturnType, Type,
    UseTree, Visibility,
};

use crate::diagnostic::Diagnostic;

/// An inline module and its members, in declaration order.
#[derive(Debug, Clone)]
pub struct Scope {
    pub ident: Ident,
    pub members: Vec<Member>,
    /// Names brought in by `use`, in declaration order.
    pub imports: Vec<Import>,
    /// Prefixes of `use prefix::*` items.
    pub globs: Vec<Path>,
}

#[derive(Debug, Clone)]
pub enum Member {
    /// A struct, enum, union or type alias.
    Type(TypeDecl),
    /// A nested inline module.
    Module(Scope),
}

#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub ident: Ident,
    pub vis: Visibility,
    pub generics: Generics,
    pub shape: Shape,
    /// Receiver-less associated functions returning the type.
    pub constructors: Vec<Constructor>,
    /// Set by an explicit `impl Default for ..` block.
    pub explicit_default: bool,
}

#[derive(Debug, Clone)]
pub enum Shape {
    /// Struct with named fields.
    Record(Vec<StoredField>),
    /// Anything else: tuple or unit structs, enums, unions, aliases.
    Other,
}

#[derive(Debug, Clone)]
pub struct StoredField {
    /// Identifier as written, raw prefix included.
    pub ident: Ident,
    /// Identifier without the raw prefix.
    pub name: String,
    pub ty: Type,
    pub doc: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Constructor {
    pub ident: Ident,
    pub vis: Visibility,
    pub inputs: Vec<Type>,
    pub output: Type,
    pub doc: Vec<String>,
}

/// One name bound by a `use` item, as written in the module.
#[derive(Debug, Clone)]
pub struct Import {
    pub name: String,
    pub path: Path,
}

/// How a defaults-only bundle is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultConstructor {
    /// `Bundle::name()`
    Inherent(Ident),
    /// `Default::default()`, typed by the position it is used in.
    Trait,
}

impl Scope {
    /// Lower an inline module. Modules declared as `mod name;` are rejected.
    pub fn lower(module: &ItemMod) -> syn::Result<Self> {
        let Some((_, items)) = &module.content else {
            return Err(Diagnostic::NotInlineModule.at(module.ident.span()));
        };
        Ok(Self::lower_items(&module.ident, items))
    }

    fn lower_items(ident: &Ident, items: &[Item]) -> Self {
        let mut members = Vec::new();
        let mut imports = Vec::new();
        let mut globs = Vec::new();

        for item in items {
            match item {
                Item::Struct(s) => members.push(Member::Type(TypeDecl::new(
                    &s.ident,
                    &s.vis,
                    &s.generics,
                    Shape::lower(&s.fields),
                ))),
                Item::Enum(e) => members.push(Member::Type(TypeDecl::new(
                    &e.ident,
                    &e.vis,
                    &e.generics,
                    Shape::Other,
                ))),
                Item::Union(u) => members.push(Member::Type(TypeDecl::new(
                    &u.ident,
                    &u.vis,
                    &u.generics,
                    Shape::Other,
                ))),
                Item::Type(t) => members.push(Member::Type(TypeDecl::new(
                    &t.ident,
                    &t.vis,
                    &t.generics,
                    Shape::Other,
                ))),
                Item::Mod(m) => {
                    if let Some((_, inner)) = &m.content {
                        members.push(Member::Module(Self::lower_items(&m.ident, inner)));
                    }
                }
                Item::Use(u) => {
                    let root = Path {
                        leading_colon: u.leading_colon,
                        segments: Punctuated::new(),
                    };
                    lower_use(&u.tree, &root, &mut imports, &mut globs);
                }
                _ => {}
            }
        }

        // Impl blocks may precede the type they extend, so attach them last.
        let mut scope = Self {
            ident: ident.clone(),
            members,
            imports,
            globs,
        };
        for item in items {
            if let Item::Impl(block) = item {
                scope.attach_impl(block);
            }
        }
        scope
    }

    /// Attach an `impl` for `Name`, `self::Name`, `child::Name` or
    /// `self::child::Name`. Blocks for types outside the module are ignored.
    fn attach_impl(&mut self, block: &ItemImpl) {
        let Some(target) = impl_target(&block.self_ty) else {
            return;
        };
        let decl = match target.as_slice() {
            [name] => self.type_mut(name),
            [module, name] => self.module_mut(module).and_then(|m| m.type_mut(name)),
            _ => None,
        };
        let Some(decl) = decl else {
            return;
        };

        match &block.trait_ {
            None => {
                let owner = decl.ident.clone();
                decl.constructors.extend(block.items.iter().filter_map(|item| match item {
                    ImplItem::Fn(f) => Constructor::lower(f, &owner),
                    _ => None,
                }));
            }
            Some((None, path, _)) => {
                if path.segments.last().is_some_and(|s| s.ident == "Default") {
                    decl.explicit_default = true;
                }
            }
            Some(_) => {}
        }
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDecl> {
        self.members.iter().filter_map(|m| match m {
            Member::Type(t) => Some(t),
            Member::Module(_) => None,
        })
    }

    /// Type declared directly in this scope, matched on its unquoted name.
    pub fn find_type(&self, name: &str) -> Option<&TypeDecl> {
        self.types().find(|t| t.ident.unraw() == name)
    }

    /// Inline module declared directly in this scope.
    pub fn find_module(&self, name: &str) -> Option<&Self> {
        self.members.iter().find_map(|m| match m {
            Member::Module(s) if s.ident.unraw() == name => Some(s),
            _ => None,
        })
    }

    /// Name bound by a non-glob `use` in this scope.
    pub fn find_import(&self, name: &str) -> Option<&Import> {
        self.imports.iter().find(|i| i.name == name)
    }

    fn module_mut(&mut self, name: &str) -> Option<&mut Self> {
        self.members.iter_mut().find_map(|m| match m {
            Member::Module(s) if s.ident.unraw() == name => Some(s),
            _ => None,
        })
    }

    fn type_mut(&mut self, name: &str) -> Option<&mut TypeDecl> {
        self.members.iter_mut().find_map(|m| match m {
            Member::Type(t) if t.ident.unraw() == name => Some(t),
            _ => None,
        })
    }
}

impl TypeDecl {
    fn new(ident: &Ident, vis: &Visibility, generics: &Generics, shape: Shape) -> Self {
        Self {
            ident: ident.clone(),
            vis: vis.clone(),
            generics: generics.clone(),
            shape,
            constructors: Vec::new(),
            explicit_default: false,
        }
    }

    pub fn fields(&self) -> Option<&[StoredField]> {
        match &self.shape {
            Shape::Record(fields) => Some(fields),
            Shape::Other => None,
        }
    }

    /// The explicit zero-parameter constructor, if any. Fallible ones don't count.
    pub fn default_constructor(&self) -> Option<DefaultConstructor> {
        self.constructors
            .iter()
            .find(|c| c.inputs.is_empty() && is_self_type(&c.output, &self.ident))
            .map(|c| DefaultConstructor::Inherent(c.ident.clone()))
            .or_else(|| self.explicit_default.then_some(DefaultConstructor::Trait))
    }
}

impl Shape {
    fn lower(fields: &Fields) -> Self {
        match fields {
            Fields::Named(named) => Self::Record(
                named
                    .named
                    .iter()
                    .filter_map(|field| {
                        let ident = field.ident.clone()?;
                        Some(StoredField {
                            name: ident.unraw().to_string(),
                            ident,
                            ty: field.ty.clone(),
                            doc: doc_lines(&field.attrs),
                        })
                    })
                    .collect(),
            ),
            Fields::Unnamed(_) | Fields::Unit => Self::Other,
        }
    }
}

impl Constructor {
    /// `None` for methods, async or unsafe fns, and fns not returning the owner.
    fn lower(f: &ImplItemFn, owner: &Ident) -> Option<Self> {
        if f.sig.asyncness.is_some() || f.sig.unsafety.is_some() {
            return None;
        }
        let ReturnType::Type(_, output) = &f.sig.output else {
            return None;
        };
        if !returns_self(output, owner) {
            return None;
        }

        let mut inputs = Vec::with_capacity(f.sig.inputs.len());
        for input in &f.sig.inputs {
            match input {
                FnArg::Receiver(_) => return None,
                FnArg::Typed(pat) => inputs.push((*pat.ty).clone()),
            }
        }

        Some(Self {
            ident: f.sig.ident.clone(),
            vis: f.vis.clone(),
            inputs,
            output: (**output).clone(),
            doc: doc_lines(&f.attrs),
        })
    }

    /// Takes exactly one parameter of the bundle type itself.
    pub fn accepts(&self, bundle: &str) -> bool {
        let [Type::Path(input)] = self.inputs.as_slice() else {
            return false;
        };
        if input.qself.is_some() {
            return false;
        }
        let segments: Vec<_> = input.path.segments.iter().collect();
        match segments.as_slice() {
            [only] => only.ident.unraw() == bundle,
            [first, last] => first.ident == "self" && last.ident.unraw() == bundle,
            _ => false,
        }
    }
}

impl DefaultConstructor {
    /// Call expression building a value of `ty`.
    pub fn call(&self, ty: &TokenStream) -> TokenStream {
        match self {
            Self::Inherent(ident) => quote!(#ty::#ident()),
            Self::Trait => quote!(::core::default::Default::default()),
        }
    }
}

/// `Self` or the owner's own name.
pub fn is_self_type(ty: &Type, owner: &Ident) -> bool {
    let Type::Path(path) = ty else {
        return false;
    };
    if path.qself.is_some() || path.path.segments.len() != 1 {
        return false;
    }
    let ident = &path.path.segments[0].ident;
    ident == "Self" || ident.unraw() == owner.unraw()
}

/// Path and type arguments of a `...Result<..>` type.
pub fn result_arguments(ty: &Type) -> Option<(&Path, Vec<&Type>)> {
    let Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() {
        return None;
    }
    let last = path.path.segments.last()?;
    if last.ident != "Result" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &last.arguments else {
        return None;
    };
    let types = args
        .args
        .iter()
        .filter_map(|arg| match arg {
            GenericArgument::Type(t) => Some(t),
            _ => None,
        })
        .collect();
    Some((&path.path, types))
}

fn returns_self(ty: &Type, owner: &Ident) -> bool {
    is_self_type(ty, owner)
        || result_arguments(ty)
            .is_some_and(|(_, args)| args.first().is_some_and(|t| is_self_type(t, owner)))
}

/// Unquoted segments of an impl self type, `self::` stripped.
fn impl_target(ty: &Type) -> Option<Vec<String>> {
    let Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() || path.path.leading_colon.is_some() {
        return None;
    }
    let mut names: Vec<String> = path
        .path
        .segments
        .iter()
        .map(|s| s.ident.unraw().to_string())
        .collect();
    if names.first().is_some_and(|n| n == "self") {
        names.remove(0);
    }
    Some(names)
}

fn lower_use(tree: &UseTree, prefix: &Path, imports: &mut Vec<Import>, globs: &mut Vec<Path>) {
    let joined = |ident: &Ident| {
        let mut path = prefix.clone();
        path.segments.push(PathSegment::from(ident.clone()));
        path
    };

    match tree {
        UseTree::Path(p) => lower_use(&p.tree, &joined(&p.ident), imports, globs),
        UseTree::Name(n) if n.ident == "self" => {
            if let Some(last) = prefix.segments.last() {
                imports.push(Import {
                    name: last.ident.unraw().to_string(),
                    path: prefix.clone(),
                });
            }
        }
        UseTree::Name(n) => imports.push(Import {
            name: n.ident.unraw().to_string(),
            path: joined(&n.ident),
        }),
        UseTree::Rename(r) if r.rename == "_" => {}
        UseTree::Rename(r) => imports.push(Import {
            name: r.rename.unraw().to_string(),
            path: if r.ident == "self" { prefix.clone() } else { joined(&r.ident) },
        }),
        UseTree::Glob(_) => globs.push(prefix.clone()),
        UseTree::Group(g) => {
            for tree in &g.items {
                lower_use(tree, prefix, imports, globs);
            }
        }
    }
}

/// Lines of the `///` comments attached to an item, one leading space removed.
pub fn doc_lines(attrs: &[Attribute]) -> Vec<String> {
    let mut lines = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident("doc") {
            continue;
        }
        let Meta::NameValue(pair) = &attr.meta else {
            continue;
        };
        let Expr::Lit(lit) = &pair.value else {
            continue;
        };
        let Lit::Str(text) = &lit.lit else {
            continue;
        };
        for line in text.value().split('\n') {
            let line = line.trim_end_matches('\r');
            lines.push(line.strip_prefix(' ').unwrap_or(line).to_string());
        }
    }
    lines
}
