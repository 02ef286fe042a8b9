//! # tinytriple CLI library
//!
//! Argument parsing, configuration loading, and command implementations
//! for the `tinytriple` binary. Exposed as a library so integration tests
//! can drive commands without spawning a process.

pub mod cli;
pub mod config;
