pub mod model;
pub mod loader;
pub mod hierarchy;
pub mod treemap;
pub mod color;
pub mod dom;
pub mod render;
pub mod interaction;
pub mod config;
pub mod pipeline;
pub mod export;
pub mod search;
pub mod human;

pub use model::*;
pub use loader::*;
pub use hierarchy::*;
pub use pipeline::*;
