//! Intcode library.
//!
//! Provides the Intcode virtual machine, its I/O listeners, and helpers for wiring
//! several machines into threaded pipelines.

pub mod utils;
pub mod virtual_machine;
