pub mod args;
pub mod config;
pub mod formula;
pub mod receipt;
