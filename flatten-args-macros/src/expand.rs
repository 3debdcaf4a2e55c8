//! Expansion pipeline: config, lookup, collection, then emission.

use proc_macro2::{Span, TokenStream};
use quote::ToTokens;
use syn::{Item, ItemMod};

use crate::analysis::collect::{Collected, Collector, Property};
use crate::analysis::docs::Documentation;
use crate::analysis::{effect, locate};
use crate::codegen::emit::Generated;
use crate::config::Config;
use crate::diagnostic::Diagnostic;
use crate::model::Scope;

/// Re-emit the annotated module with the generated constructor appended.
pub fn expand(attr: TokenStream, item: TokenStream) -> syn::Result<TokenStream> {
    let config = Config::resolve(attr);

    let Item::Mod(mut module) = syn::parse2::<Item>(item)? else {
        return Err(Diagnostic::NotInlineModule.at(Span::call_site()));
    };

    let generated = generate(&config, &module)?;
    if let Some((_, items)) = &mut module.content {
        items.push(Item::Verbatim(generated));
    }
    Ok(module.into_token_stream())
}

/// The `impl` block holding the flattened constructor.
pub fn generate(config: &Config, module: &ItemMod) -> syn::Result<TokenStream> {
    let scope = Scope::lower(module)?;
    let bundle = locate::bundle(&scope, config)?;
    let container = locate::container(&scope, config)?;
    let collected = Collector::new(&scope, &config.struct_name).collect(bundle)?;
    let forwarding = effect::forwarding(container.decl, &config.struct_name, &scope);

    let properties: &[Property] = match &collected {
        Collected::Properties(properties) => properties.as_slice(),
        Collected::Defaults(_) => &[],
    };
    let docs = Documentation::synthesize(container.decl, bundle, forwarding.as_ref(), properties);

    Generated {
        config,
        container,
        bundle,
        collected,
        forwarding,
        docs,
    }
    .to_impl()
}
