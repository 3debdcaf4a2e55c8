//! Read-only passes over the lowered module.
//!
//! - `locate` - finds the bundle and the container
//! - `collect` - flattens the bundle into path-annotated properties
//! - `effect` - picks the forwarding constructor and its error contract
//! - `docs` - best-effort documentation for the generated constructor

pub mod collect;
pub mod docs;
pub mod effect;
pub mod locate;
