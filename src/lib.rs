//! flatten-args - Flattened convenience constructors for argument structs
//!
//! # Overview
//!
//! A common shape for validated types is a container holding one
//! `Arguments` struct, built through a constructor that takes the whole
//! struct. `#[flatten_args]` adds a second constructor taking every field of
//! that struct as its own parameter, recursing into fields that are
//! themselves argument structs of nested modules.
//!
//! # Quick Start
//!
//! ```
//! use flatten_args::flatten_args;
//!
//! #[flatten_args]
//! mod person {
//!     pub struct Arguments {
//!         pub name: String,
//!         pub age: u32,
//!     }
//!
//!     pub struct Person {
//!         pub arguments: Arguments,
//!     }
//!
//!     impl Person {
//!         pub fn new(arguments: Arguments) -> Self {
//!             Self { arguments }
//!         }
//!     }
//! }
//!
//! let person = person::Person::from_fields("Ada".to_string(), 36);
//! assert_eq!(person.arguments.age, 36);
//! ```
//!
//! # Recognised Items
//!
//! | Item | Role |
//! |------|------|
//! | `struct Arguments { .. }` | Parameter bundle, flattened field by field |
//! | `struct X { arguments: Arguments, .. }` | Container receiving the constructor |
//! | `fn new(arguments: Arguments) -> Self` | Forwarded to, `Result<Self, E>` keeps `E` |
//! | `field: inner::Arguments` | Nested bundle in `mod inner`, flattened recursively |
//! | `fn new() -> Self` / `impl Default` on a bundle | Defaults only, contributes no parameters |
//!
//! # Options
//!
//! | Option | Default |
//! |--------|---------|
//! | `struct_name` | `"Arguments"` |
//! | `property_name` | `"arguments"` |
//! | `constructor` | `"from_fields"` |
//!
//! # Nesting
//!
//! Nested bundles are looked up among the inline modules of the annotated
//! module, whatever module the referencing field lives in. Rebuilt values
//! are grouped by field name in sorted order, so the expansion is identical
//! on every build. Two leaves flattening to the same parameter name are a
//! compile error.

#![no_std]

pub use flatten_args_macros::flatten_args;
