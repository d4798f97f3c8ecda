//! VoxCard application library: CLI surface, configuration, deck loading
//! and runtime wiring for the `voxcard` binary.

pub mod cli;
pub mod config;
pub mod deck;
pub mod runtime;
