pub mod prompt;
pub mod normalize;
pub mod severity;
pub mod engine;

pub use prompt::*;
pub use normalize::*;
pub use severity::*;
pub use engine::*;
