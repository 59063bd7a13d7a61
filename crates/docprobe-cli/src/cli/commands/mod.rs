//! CLI command handlers, one per file.

mod config;
mod inspect;
mod resolve;

pub use config::run_config;
pub use inspect::run_inspect;
pub use resolve::run_resolve;

#[cfg(test)]
pub(crate) use config::render_config;
#[cfg(test)]
pub(crate) use resolve::exit_status;
