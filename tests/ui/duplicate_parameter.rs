//! Error: two flattened fields share a name

use flatten_args::flatten_args;

#[flatten_args]
mod jar {
    pub struct Arguments {
        pub open: bool,
        pub lid: lid::Arguments,
    }

    pub mod lid {
        pub struct Arguments {
            pub open: bool,
        }
    }

    pub struct Jar {
        pub arguments: Arguments,
    }
}

fn main() {}
