pub mod intake;
pub mod interpret;
pub mod score;

pub use intake::*;
