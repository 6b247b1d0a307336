//! Driver request handling

pub mod handler;

pub use handler::{Request, handle, parse_request};
