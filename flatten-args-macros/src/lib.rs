//! Proc macros for the flatten-args crate.
//!
//! The attribute reads an inline module, lowers it into a read-only model,
//! and appends one generated constructor to the container it finds there.
//!
//! ## Architecture
//!
//! - `config` - attribute arguments
//! - `model` - immutable view over the module's items
//! - `analysis` - bundle lookup, property collection, effect and docs
//! - `codegen` - argument reconstruction and the emitted `impl` block
//! - `expand` - the pipeline tying them together

use proc_macro::TokenStream;

mod analysis;
mod codegen;
mod config;
mod diagnostic;
mod expand;
mod model;

/// Adds a flattened convenience constructor to the container of an inline module.
///
/// Optional arguments:
/// - `struct_name = "Arguments"` - name of the parameter bundle struct
/// - `property_name = "arguments"` - name of the container field holding it
/// - `constructor = "from_fields"` - name of the generated function
#[proc_macro_attribute]
pub fn flatten_args(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand::expand(attr.into(), item.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
