//! Startup configuration: a `--settings` CLI flag pointing at a TOML file.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;
