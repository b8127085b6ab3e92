//! CLI layer - Command-line interface
//!
//! Contains argument parsing, output formatting, stop handling,
//! and the command handlers.

pub mod app;
pub mod args;
pub mod config_cmd;
pub mod presenter;
pub mod signals;

// Re-export commonly used types
pub use app::{
    run_add, run_delete, run_dictate, run_list, run_show, EXIT_ERROR, EXIT_SUCCESS,
    EXIT_USAGE_ERROR,
};
pub use args::{Cli, Commands, ConfigAction, DictateOptions};
pub use presenter::Presenter;
