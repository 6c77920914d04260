pub mod crop;
pub mod farm;
pub mod fertilizer;
pub mod online;
pub mod soil;
pub mod system;
