pub mod resource_handler;

pub use resource_handler::*;
