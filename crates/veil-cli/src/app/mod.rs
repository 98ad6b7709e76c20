//! Application-level utilities for the Veil CLI.
//!
//! This module provides:
//! - Application context for unified CLI + config handling
//! - Path resolution for config and vault
//! - Password entry from the environment or terminal
//! - The unlock / work / lock cycle every command runs in

mod context;
mod prompt;
mod resolver;
mod vault;

pub use context::AppContext;
pub use resolver::resolve_config_path;
pub use vault::{run_session, SessionRun, Vault};
