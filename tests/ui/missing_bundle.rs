//! Error: no bundle struct in the module

use flatten_args::flatten_args;

#[flatten_args]
mod person {
    pub struct Person {
        pub name: String,
    }
}

fn main() {}
