//! CLI command implementations

pub mod bootstrap;
pub mod note;
pub mod server;
pub mod tag;
