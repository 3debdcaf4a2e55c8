//! Error: container needs a constructor taking the bundle

use flatten_args::flatten_args;

#[flatten_args]
mod person {
    pub struct Arguments {
        pub name: String,
    }

    pub struct Person {
        pub arguments: Arguments,
        pub greeting: String,
    }
}

fn main() {}
