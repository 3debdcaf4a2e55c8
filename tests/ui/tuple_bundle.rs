//! Error: the bundle must have named fields

use flatten_args::flatten_args;

#[flatten_args]
mod person {
    pub struct Arguments(pub String);

    pub struct Person {
        pub arguments: Arguments,
    }
}

fn main() {}
