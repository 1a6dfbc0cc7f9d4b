//! Small helpers shared by the harness crates.

pub mod env;
pub mod http;
pub mod path_processing;
pub mod redaction;

pub use env::non_empty_env;
pub use path_processing::expand_tilde;
pub use redaction::redact_sensitive;
