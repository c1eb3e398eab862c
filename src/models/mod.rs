pub mod enums;
pub mod intake;
pub mod triage;
pub mod session;

pub use enums::*;
pub use intake::*;
pub use triage::*;
pub use session::*;
