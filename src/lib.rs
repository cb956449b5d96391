//! Suggestor - catalog author suggestions
//!
//! Turns a single-keyword catalog search into high-confidence author
//! searches, optionally refined by a generative model and verified against
//! the catalog before they are offered.

pub mod config;
pub mod core;
pub mod server;

#[cfg(test)]
mod tests;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
