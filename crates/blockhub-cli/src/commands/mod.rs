//! CLI command handlers

pub mod import;
pub mod search;
pub mod status;
pub mod suggest;
