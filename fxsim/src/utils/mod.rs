//! Shared utilities for the fxsim CLI

pub mod format;
pub mod table;

pub use format::*;
pub use table::*;
