//! Addressing modes and the operand types they resolve through.
//!
//! Reads go through [`Source`], which supports every mode. Writes go through
//! [`Target`], which has no immediate variant: a destination encoded in immediate
//! mode is rejected when the instruction is decoded, so there is no immediate write
//! path to reach at execution time.

use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::vm::Memory;
use std::fmt;

/// Addressing mode selected by one decimal digit of an instruction word.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    /// Operand is an absolute address.
    Position = 0,
    /// Operand is the value itself.
    Immediate = 1,
    /// Operand is an offset from the relative base.
    Relative = 2,
}

impl Mode {
    /// Maps a mode digit to its [`Mode`]; `ip` is only used for error context.
    pub fn from_digit(digit: i64, ip: usize) -> Result<Mode, VMError> {
        match digit {
            0 => Ok(Mode::Position),
            1 => Ok(Mode::Immediate),
            2 => Ok(Mode::Relative),
            _ => Err(VMError::InvalidAddressingMode { mode: digit, ip }),
        }
    }
}

/// Readable operand.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Source {
    Position(i64),
    Immediate(i64),
    Relative(i64),
}

impl Source {
    pub const fn new(mode: Mode, raw: i64) -> Self {
        match mode {
            Mode::Position => Source::Position(raw),
            Mode::Immediate => Source::Immediate(raw),
            Mode::Relative => Source::Relative(raw),
        }
    }

    pub const fn mode(&self) -> Mode {
        match self {
            Source::Position(_) => Mode::Position,
            Source::Immediate(_) => Mode::Immediate,
            Source::Relative(_) => Mode::Relative,
        }
    }

    /// Returns the operand word as it appears in the program.
    pub const fn raw(&self) -> i64 {
        match self {
            Source::Position(v) | Source::Immediate(v) | Source::Relative(v) => *v,
        }
    }

    /// Resolves the operand to the value it denotes.
    pub fn resolve(self, memory: &Memory) -> Result<i64, VMError> {
        match self {
            Source::Position(address) => memory.read(address),
            Source::Immediate(value) => Ok(value),
            Source::Relative(offset) => memory.read_relative(offset),
        }
    }
}

/// Writable operand.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Target {
    Position(i64),
    Relative(i64),
}

impl Target {
    /// Builds a destination operand.
    ///
    /// Returns [`VMError::ImmediateDestination`] for [`Mode::Immediate`]; `operand` is
    /// the 1-based operand slot used in the error.
    pub fn new(mode: Mode, raw: i64, ip: usize, operand: usize) -> Result<Self, VMError> {
        match mode {
            Mode::Position => Ok(Target::Position(raw)),
            Mode::Relative => Ok(Target::Relative(raw)),
            Mode::Immediate => Err(VMError::ImmediateDestination { ip, operand }),
        }
    }

    pub const fn mode(&self) -> Mode {
        match self {
            Target::Position(_) => Mode::Position,
            Target::Relative(_) => Mode::Relative,
        }
    }

    pub const fn raw(&self) -> i64 {
        match self {
            Target::Position(v) | Target::Relative(v) => *v,
        }
    }

    /// Writes `value` to the address this operand denotes.
    pub fn store(self, memory: &mut Memory, value: i64) -> Result<(), VMError> {
        match self {
            Target::Position(address) => memory.write(address, value),
            Target::Relative(offset) => memory.write_relative(offset, value),
        }
    }
}

fn fmt_relative(f: &mut fmt::Formatter<'_>, offset: i64) -> fmt::Result {
    if offset < 0 {
        write!(f, "[rb-{}]", offset.unsigned_abs())
    } else {
        write!(f, "[rb+{offset}]")
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Position(address) => write!(f, "[{address}]"),
            Source::Immediate(value) => write!(f, "{value}"),
            Source::Relative(offset) => fmt_relative(f, *offset),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Position(address) => write!(f, "[{address}]"),
            Target::Relative(offset) => fmt_relative(f, *offset),
        }
    }
}
