//! Bookshelf application library: the books module and the bootstrap that
//! wires it to a store and the HTTP server.

pub mod bootstrap;
pub mod modules;

pub use bootstrap::{build_app, build_registry, run};
