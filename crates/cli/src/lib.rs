// crates/cli/src/lib.rs
pub mod args;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod options;
pub mod parsers;
pub mod presentation;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
