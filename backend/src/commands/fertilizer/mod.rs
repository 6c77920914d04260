pub mod application;
pub mod catalog;
pub mod history;
pub mod recommend;

pub use application::*;
pub use catalog::*;
pub use history::*;
pub use recommend::*;
