pub mod help_request_handler;

pub use help_request_handler::*;
