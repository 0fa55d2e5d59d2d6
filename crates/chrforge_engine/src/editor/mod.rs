//! The command-driven editing surface: every document mutation goes through
//! [`EditCommand`] / [`crate::Project::apply`], which returns the exact
//! inverse command for the undo history.

pub mod undo_stack;
pub use undo_stack::*;

mod commands;
pub use commands::*;
