//! Code generation for the flattened constructor.
//!
//! - `arguments` - rebuilds the bundle value from flat parameters
//! - `emit` - assembles the `impl` block

pub mod arguments;
pub mod emit;
