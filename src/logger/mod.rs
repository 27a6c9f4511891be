//! Process-wide `tracing` subscriber with a filter and output format that are
//! swapped in once settings are loaded.

mod logger;
pub use logger::*;

pub use tracing::{debug, error, info, trace, warn};
