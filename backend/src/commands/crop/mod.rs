pub mod recommend;
pub mod season;

pub use recommend::*;
