//! CLI command implementations.

mod serve;
mod stats;

pub use serve::ServeCommand;
pub use stats::StatsCommand;
