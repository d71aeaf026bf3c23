pub mod enums;
pub mod intake;

pub use enums::*;
pub use intake::*;
