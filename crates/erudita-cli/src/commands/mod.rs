//! Command implementations.
//!
//! Each subcommand lives in its own module; this file re-exports the entry
//! points under dispatch-friendly names.

mod clean;
mod install;
mod list;
mod mcp;
mod remove;
mod show;
mod update;

pub use clean::run as clean_cache;
pub use install::{execute as install, InstallOptions};
pub use list::execute as list_packages;
pub use mcp::execute as serve_mcp;
pub use remove::execute as remove_packages;
pub use show::execute as show_package;
pub use update::execute as update_packages;
