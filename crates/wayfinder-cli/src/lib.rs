//! Wayfinder CLI library.
//!
//! This crate provides the command handlers, logging setup and output
//! formatting used by the `wayfinder-cli` binary.

pub mod commands;
pub mod logging;
pub mod output;
