//! Core virtual machine implementation.
//!
//! The VM runs a fetch-decode-execute loop over word-addressed [`Memory`] until a
//! `HALT` instruction is reached. Input and output instructions go through the
//! caller's [`Listener`]; every output is also collected by the VM and returned
//! when the run finishes. Arithmetic wraps at 64 bits.

mod context;
mod memory;
mod stats;

pub use context::ExecConfig;
pub use memory::{DEFAULT_GROWABLE_LIMIT, Memory, MemoryPolicy};
pub use stats::ExecStats;

use crate::trace;
use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::isa::Instruction;
use crate::virtual_machine::listener::{InputQueue, Listener};
use crate::virtual_machine::operand::{Source, Target};
use crate::virtual_machine::program::Program;

/// Execution state reported by [`VM::step`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    /// More instructions remain.
    Running,
    /// A `HALT` instruction has been executed.
    Halted,
}

/// Intcode virtual machine.
///
/// Owns its memory and relative base exclusively; nothing is shared between
/// instances, so VMs on different threads only interact through their listeners.
pub struct VM {
    /// Program memory and relative base.
    memory: Memory,
    /// Instruction pointer (address of the next instruction).
    ip: usize,
    config: ExecConfig,
    /// Every value emitted by output instructions, in order.
    outputs: Vec<i64>,
    stats: ExecStats,
    halted: bool,
}

impl VM {
    /// Creates a VM with a fresh copy of `program` loaded at address 0.
    pub fn new(program: &Program, config: ExecConfig) -> Self {
        Self {
            memory: Memory::new(program.words().to_vec(), config.memory),
            ip: 0,
            config,
            outputs: Vec::new(),
            stats: ExecStats::new(),
            halted: false,
        }
    }

    /// Executes instructions until the program halts.
    ///
    /// Returns every value produced by output instructions, in production order.
    /// Any error aborts the run immediately.
    pub fn run<L: Listener>(&mut self, listener: &mut L) -> Result<Vec<i64>, VMError> {
        while self.step(listener)? == Status::Running {}
        Ok(self.outputs.clone())
    }

    /// Executes a single instruction.
    ///
    /// Calling `step` on a halted VM is a no-op that reports [`Status::Halted`] again.
    pub fn step<L: Listener>(&mut self, listener: &mut L) -> Result<Status, VMError> {
        if self.halted {
            return Ok(Status::Halted);
        }
        if let Some(limit) = self.config.step_limit
            && self.stats.total() >= limit
        {
            return Err(VMError::StepLimitExceeded { limit });
        }

        let instruction = Instruction::decode(&self.memory, self.ip)?;
        if self.config.trace {
            trace!(
                "{:>6} rb={:<6} {}",
                self.ip,
                self.memory.relative_base(),
                instruction
            );
        }
        self.stats.record(instruction.opcode());
        let next_ip = self.ip + instruction.width();

        match instruction {
            Instruction::Add { a, b, dst } => {
                let value = self.load(a)?.wrapping_add(self.load(b)?);
                self.store(dst, value)?;
            }
            Instruction::Mul { a, b, dst } => {
                let value = self.load(a)?.wrapping_mul(self.load(b)?);
                self.store(dst, value)?;
            }
            Instruction::Input { dst } => {
                let value = listener.on_read_requested()?;
                self.store(dst, value)?;
            }
            Instruction::Output { src } => {
                let value = self.load(src)?;
                self.outputs.push(value);
                listener.on_store_requested(value)?;
            }
            Instruction::JumpIfTrue { cond, target } => {
                if self.load(cond)? != 0 {
                    return self.jump(target);
                }
            }
            Instruction::JumpIfFalse { cond, target } => {
                if self.load(cond)? == 0 {
                    return self.jump(target);
                }
            }
            Instruction::LessThan { a, b, dst } => {
                let value = (self.load(a)? < self.load(b)?) as i64;
                self.store(dst, value)?;
            }
            Instruction::Equals { a, b, dst } => {
                let value = (self.load(a)? == self.load(b)?) as i64;
                self.store(dst, value)?;
            }
            Instruction::AdjustRelativeBase { delta } => {
                let delta = self.load(delta)?;
                self.memory.adjust_relative_base(delta);
            }
            Instruction::Halt { .. } => {
                self.halted = true;
                return Ok(Status::Halted);
            }
        }

        self.ip = next_ip;
        Ok(Status::Running)
    }

    /// Returns the current memory contents.
    pub fn memory(&self) -> &[i64] {
        self.memory.as_slice()
    }

    /// Returns the address of the next instruction.
    pub fn ip(&self) -> usize {
        self.ip
    }

    pub fn relative_base(&self) -> i64 {
        self.memory.relative_base()
    }

    /// Returns the outputs produced so far.
    pub fn outputs(&self) -> &[i64] {
        &self.outputs
    }

    pub fn stats(&self) -> &ExecStats {
        &self.stats
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    fn load(&self, operand: Source) -> Result<i64, VMError> {
        operand.resolve(&self.memory)
    }

    fn store(&mut self, operand: Target, value: i64) -> Result<(), VMError> {
        operand.store(&mut self.memory, value)
    }

    /// Moves the instruction pointer to the address `target` resolves to.
    fn jump(&mut self, target: Source) -> Result<Status, VMError> {
        let address = self.load(target)?;
        self.ip = usize::try_from(address).map_err(|_| VMError::InvalidAddress {
            address,
            capacity: self.memory.len(),
        })?;
        Ok(Status::Running)
    }
}

/// Runs `program` to completion against `listener` with the default configuration.
pub fn run<L: Listener>(program: &Program, listener: &mut L) -> Result<Vec<i64>, VMError> {
    VM::new(program, ExecConfig::default()).run(listener)
}

/// Runs `program` with a preloaded list of inputs.
pub fn run_with_inputs(
    program: &Program,
    inputs: impl IntoIterator<Item = i64>,
) -> Result<Vec<i64>, VMError> {
    run(program, &mut InputQueue::new(inputs))
}

/// Runs `program` with preloaded inputs and returns its final output.
///
/// Returns [`VMError::NoOutput`] if the program halts without emitting anything.
pub fn run_for_answer(
    program: &Program,
    inputs: impl IntoIterator<Item = i64>,
) -> Result<i64, VMError> {
    run_with_inputs(program, inputs)?
        .last()
        .copied()
        .ok_or(VMError::NoOutput)
}

#[cfg(test)]
mod tests;
