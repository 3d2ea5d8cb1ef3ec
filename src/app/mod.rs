//! Application runtime composition modules.

pub(crate) mod exit_handler;
pub(crate) mod input;
pub(crate) mod output;
pub(crate) mod picker;
pub(crate) mod runtime;
pub(crate) mod terminal;
