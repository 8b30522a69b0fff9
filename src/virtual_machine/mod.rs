//! Intcode virtual machine.
//!
//! Executes programs encoded as a sequence of signed 64-bit integers held in
//! word-addressed memory. External controllers talk to a running program through
//! the [`listener::Listener`] callbacks.
//!
//! # Architecture
//!
//! - **Memory**: one `i64` per address plus a relative base, bounded to the loaded
//!   program by default or growable on demand (see [`vm::MemoryPolicy`])
//! - **Addressing modes**: position, immediate and relative, selected per operand
//!   by the decimal digits above the opcode
//! - **Execution model**: fetch-decode-execute until `HALT`; no step limit unless
//!   one is configured
//! - **I/O**: inputs are pulled from the listener, outputs are pushed to it and
//!   also collected by the VM
//!
//! # Modules
//!
//! - [`errors`]: Load and execution error types
//! - [`isa`]: Instruction catalogue, decoding and mnemonics
//! - [`operand`]: Addressing modes and operand resolution
//! - [`program`]: Program text parsing and patching
//! - [`listener`]: The I/O boundary and the stock listeners
//! - [`pipeline`]: Threaded chains and rings of VMs
//! - [`disassembler`]: Human-readable program listings
//! - [`vm`]: Core virtual machine, memory model and run configuration

pub mod disassembler;
pub mod errors;
pub mod isa;
pub mod listener;
pub mod operand;
pub mod pipeline;
pub mod program;
pub mod vm;

pub use vm::{run, run_for_answer, run_with_inputs};
