//! Wires a storage backend into the application services.

mod server;

pub use server::*;
