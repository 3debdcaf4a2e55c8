//! Error contract of the generated constructor.
//!
//! The generated constructor forwards to a container constructor taking the
//! bundle, and returns exactly what that constructor returns. A concrete
//! error type is spelled out rather than inferred, so callers in other crates
//! keep matching on it.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Path, Type};

use crate::model::{result_arguments, Constructor, Scope, TypeDecl};

#[derive(Debug, Clone)]
pub enum Effect {
    /// Returns `Self`.
    None,
    /// Returns a result whose error type is not spelled out, copied verbatim
    /// (`anyhow::Result<Self>`, `io::Result<Self>`, ..).
    Throws(Type),
    /// Returns `Result<Self, E>` with a concrete `E`.
    ThrowsTyped(Type),
}

impl Effect {
    pub fn of(ctor: &Constructor, scope: &Scope) -> Self {
        match result_arguments(&ctor.output) {
            None => Self::None,
            Some((path, args)) if args.len() == 2 && is_core_result(path, scope) => {
                Self::ThrowsTyped(args[1].clone())
            }
            Some(_) => Self::Throws(ctor.output.clone()),
        }
    }

    pub fn is_throwing(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Return type of the generated constructor.
    pub fn return_type(&self) -> TokenStream {
        match self {
            Self::None => quote!(Self),
            Self::Throws(ty) => quote!(#ty),
            Self::ThrowsTyped(error) => quote!(::core::result::Result<Self, #error>),
        }
    }
}

/// The constructor the generated one forwards to.
#[derive(Debug, Clone)]
pub struct Forwarding<'a> {
    pub ctor: &'a Constructor,
    pub effect: Effect,
}

/// Pick the bundle-accepting constructor, preferring a throwing one.
pub fn forwarding<'a>(
    container: &'a TypeDecl,
    bundle_name: &str,
    scope: &Scope,
) -> Option<Forwarding<'a>> {
    let accepting: Vec<&Constructor> = container
        .constructors
        .iter()
        .filter(|c| c.accepts(bundle_name))
        .collect();

    let ctor = accepting
        .iter()
        .copied()
        .find(|c| Effect::of(c, scope).is_throwing())
        .or_else(|| accepting.first().copied())?;

    Some(Forwarding {
        ctor,
        effect: Effect::of(ctor, scope),
    })
}

/// `Result`, `core::result::Result` or `std::result::Result`. A bare `Result`
/// only counts when the module does not declare its own.
fn is_core_result(path: &Path, scope: &Scope) -> bool {
    if path.leading_colon.is_none() && path.segments.len() == 1 {
        return scope.find_type("Result").is_none();
    }
    let names: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
    matches!(
        names.iter().map(String::as_str).collect::<Vec<_>>().as_slice(),
        ["core" | "std", "result", "Result"]
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::{parse_quote, ItemMod};

    fn pick(module: ItemMod) -> Option<(String, String)> {
        let scope = Scope::lower(&module).unwrap();
        let container = scope.find_type("Person").unwrap();
        forwarding(container, "Arguments", &scope)
            .map(|f| (f.ctor.ident.to_string(), f.effect.return_type().to_string()))
    }

    #[test]
    fn test_plain_constructor_has_no_effect() {
        let picked = pick(parse_quote! {
            mod m {
                pub struct Person { arguments: Arguments }
                impl Person { pub fn new(arguments: Arguments) -> Self { Self { arguments } } }
            }
        });
        assert_eq!(picked, Some(("new".into(), "Self".into())));
    }

    #[test]
    fn test_typed_error_is_spelled_out() {
        let picked = pick(parse_quote! {
            mod m {
                pub struct Person { arguments: Arguments }
                impl Person {
                    pub fn new(arguments: Arguments) -> Result<Person, ValidationError> { todo!() }
                }
            }
        });
        assert_eq!(
            picked,
            Some((
                "new".into(),
                ":: core :: result :: Result < Self , ValidationError >".into()
            ))
        );
    }

    #[test]
    fn test_qualified_core_result_is_typed() {
        let scope_module: ItemMod = parse_quote! {
            mod m {
                pub struct Person { arguments: Arguments }
                impl Person {
                    pub fn new(arguments: Arguments) -> std::result::Result<Self, errors::Invalid> { todo!() }
                }
            }
        };
        let scope = Scope::lower(&scope_module).unwrap();
        let picked = forwarding(scope.find_type("Person").unwrap(), "Arguments", &scope).unwrap();
        let Effect::ThrowsTyped(error) = picked.effect else {
            panic!("expected a typed effect");
        };
        assert_eq!(quote!(#error).to_string(), "errors :: Invalid");
    }

    #[test]
    fn test_untyped_results_are_copied() {
        let picked = pick(parse_quote! {
            mod m {
                pub struct Person { arguments: Arguments }
                impl Person {
                    pub fn new(arguments: Arguments) -> anyhow::Result<Self> { todo!() }
                }
            }
        });
        assert_eq!(picked.unwrap().1, "anyhow :: Result < Self >");
    }

    #[test]
    fn test_local_result_alias_is_untyped() {
        let picked = pick(parse_quote! {
            mod m {
                pub type Result<T, E = Error> = core::result::Result<T, E>;
                pub struct Person { arguments: Arguments }
                impl Person {
                    pub fn new(arguments: Arguments) -> Result<Self, Other> { todo!() }
                }
            }
        });
        assert_eq!(picked.unwrap().1, "Result < Self , Other >");
    }

    #[test]
    fn test_throwing_constructor_is_preferred() {
        let picked = pick(parse_quote! {
            mod m {
                pub struct Person { arguments: Arguments }
                impl Person {
                    pub fn new(arguments: Arguments) -> Self { Self { arguments } }
                    pub fn try_new(arguments: Arguments) -> Result<Self, Invalid> { todo!() }
                }
            }
        });
        assert_eq!(picked.unwrap().0, "try_new");
    }

    #[test]
    fn test_no_accepting_constructor() {
        let picked = pick(parse_quote! {
            mod m {
                pub struct Person { arguments: Arguments }
                impl Person { pub fn empty() -> Self { todo!() } }
            }
        });
        assert_eq!(picked, None);
    }
}
