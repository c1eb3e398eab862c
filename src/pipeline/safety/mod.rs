pub mod red_flags;

pub use red_flags::*;
