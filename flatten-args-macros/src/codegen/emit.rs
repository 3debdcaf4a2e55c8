//! The generated `impl` block.

use proc_macro2::TokenStream;
use quote::quote;

use super::arguments;
use crate::analysis::collect::Collected;
use crate::analysis::docs::Documentation;
use crate::analysis::effect::Forwarding;
use crate::analysis::locate::Container;
use crate::config::Config;
use crate::diagnostic::Diagnostic;
use crate::model::TypeDecl;

/// Parameters past which clippy asks for a builder.
const MANY_ARGUMENTS: usize = 7;

/// Everything the analysis passes found for one container.
pub struct Generated<'a> {
    pub config: &'a Config,
    pub container: Container<'a>,
    pub bundle: &'a TypeDecl,
    pub collected: Collected,
    pub forwarding: Option<Forwarding<'a>>,
    pub docs: Documentation,
}

impl Generated<'_> {
    pub fn to_impl(&self) -> syn::Result<TokenStream> {
        let container = self.container.decl;
        let container_ident = &container.ident;
        let bundle_ident = &self.bundle.ident;
        let (impl_generics, ty_generics, where_clause) = container.generics.split_for_impl();
        let name = self.config.constructor_ident();

        let (params, value) = match &self.collected {
            Collected::Defaults(ctor) => (Vec::new(), ctor.call(&quote!(#bundle_ident))),
            Collected::Properties(properties) => {
                let params: Vec<TokenStream> = properties
                    .iter()
                    .filter(|p| p.is_parameter())
                    .map(|p| {
                        let ident = &p.ident;
                        let ty = &p.ty;
                        quote!(#ident: #ty)
                    })
                    .collect();
                (params, arguments::bundle_expr(bundle_ident, properties))
            }
        };

        let (vis, ret, body, throwing) = match &self.forwarding {
            Some(forwarding) => {
                let ctor = &forwarding.ctor.ident;
                (
                    &forwarding.ctor.vis,
                    forwarding.effect.return_type(),
                    quote!(Self::#ctor(#value)),
                    forwarding.effect.is_throwing(),
                )
            }
            None if self.container.witness => {
                let field = container
                    .fields()
                    .and_then(|fields| fields.iter().find(|f| f.name == self.config.property_name))
                    .map(|f| &f.ident);
                (&container.vis, quote!(Self), quote!(Self { #field: #value }), false)
            }
            None => {
                return Err(Diagnostic::MissingConstructor(self.config.struct_name.clone())
                    .at(container_ident.span()));
            }
        };

        let doc = self.docs.lines().into_iter().map(|line| {
            let text = if line.is_empty() { line } else { format!(" {line}") };
            quote!(#[doc = #text])
        });
        let must_use = (!self.container.witness && !throwing).then(|| quote!(#[must_use]));
        let many = (params.len() > MANY_ARGUMENTS)
            .then(|| quote!(#[allow(clippy::too_many_arguments)]));

        Ok(quote! {
            impl #impl_generics #container_ident #ty_generics #where_clause {
                #(#doc)*
                #must_use
                #many
                #vis fn #name(#(#params),*) -> #ret {
                    #body
                }
            }
        })
    }
}
