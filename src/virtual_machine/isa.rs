//! Instruction Set Architecture (ISA) definitions.
//!
//! The [`for_each_instruction!`](crate::for_each_instruction) macro holds the
//! canonical instruction table and invokes a callback macro for code generation,
//! so the opcode catalogue is written down exactly once.
//!
//! This module generates:
//! - The [`Opcode`] enum with its numeric codes, mnemonics and arities
//! - The [`Instruction`] enum, one variant per opcode carrying typed operands
//! - [`Instruction::decode`], which reads an instruction out of [`Memory`]
//!
//! # Encoding
//!
//! An instruction is one word followed by its operand words. The two low decimal
//! digits of the first word select the opcode; the remaining digits, read right to
//! left, give the addressing mode of operand 1, 2 and 3. Missing digits mean
//! position mode.
//!
//! ```text
//!   1002,4,3,4
//!   ^^^^ opcode 02 (MUL), modes: op1 = 0 (position), op2 = 1 (immediate), op3 = 0
//! ```

use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::operand::{Mode, Source, Target};
use crate::virtual_machine::vm::Memory;
use std::fmt;

/// Invokes a callback macro with the complete instruction definition list.
#[macro_export]
macro_rules! for_each_instruction {
    ($callback:ident) => {
        $callback! {
            /// ADD a, b, dst ; dst = a + b
            Add = 1, "ADD" => [a: Src, b: Src, dst: Dst],
            /// MUL a, b, dst ; dst = a * b
            Mul = 2, "MUL" => [a: Src, b: Src, dst: Dst],
            /// IN dst ; dst = next input from the listener
            Input = 3, "IN" => [dst: Dst],
            /// OUT src ; emit src to the listener
            Output = 4, "OUT" => [src: Src],
            /// JNZ cond, target ; if cond != 0 then ip = target
            JumpIfTrue = 5, "JNZ" => [cond: Src, target: Src],
            /// JZ cond, target ; if cond == 0 then ip = target
            JumpIfFalse = 6, "JZ" => [cond: Src, target: Src],
            /// LT a, b, dst ; dst = (a < b) as 1 or 0
            LessThan = 7, "LT" => [a: Src, b: Src, dst: Dst],
            /// EQ a, b, dst ; dst = (a == b) as 1 or 0
            Equals = 8, "EQ" => [a: Src, b: Src, dst: Dst],
            /// ARB delta ; relative base += delta
            AdjustRelativeBase = 9, "ARB" => [delta: Src],
            /// HALT ; stop execution
            Halt = 99, "HALT" => [],
        }
    };
}

#[macro_export]
macro_rules! define_instructions {
    (
        $(
            $(#[$doc:meta])*
            $name:ident = $opcode:literal, $mnemonic:literal => [
                $( $field:ident : $kind:ident ),* $(,)?
            ]
        ),* $(,)?
    ) => {
        // =========================
        // Opcode catalogue
        // =========================
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
        pub enum Opcode {
            $(
                $(#[$doc])*
                $name = $opcode,
            )*
        }

        impl Opcode {
            /// Every opcode, in table order.
            pub const ALL: &'static [Opcode] = &[ $( Opcode::$name, )* ];

            /// Looks up the opcode for the two low digits of an instruction word.
            pub fn from_code(code: i64, ip: usize) -> Result<Self, VMError> {
                match code {
                    $( $opcode => Ok(Opcode::$name), )*
                    _ => Err(VMError::UnsupportedOpcode { opcode: code, ip }),
                }
            }

            /// Returns the numeric code of this opcode.
            pub const fn code(&self) -> i64 {
                *self as i64
            }

            /// Returns the disassembly mnemonic for this opcode.
            pub const fn mnemonic(&self) -> &'static str {
                match self {
                    $( Opcode::$name => $mnemonic, )*
                }
            }

            /// Returns the number of operand words following the opcode word.
            pub const fn arity(&self) -> usize {
                match self {
                    $( Opcode::$name => define_instructions!(@count $( $field )*), )*
                }
            }
        }

        // =========================
        // Decoded instructions
        // =========================
        #[derive(Copy, Clone, Debug, Eq, PartialEq)]
        pub enum Instruction {
            $(
                $(#[$doc])*
                $name { $( $field: define_instructions!(@ty $kind), )* },
            )*
        }

        impl Instruction {
            /// Decodes the instruction starting at `ip`.
            ///
            /// Fails with [`VMError::UnsupportedOpcode`] for unknown opcodes,
            /// [`VMError::InvalidAddressingMode`] for a bad mode digit,
            /// [`VMError::ImmediateDestination`] for an immediate destination, and
            /// [`VMError::InvalidAddress`] if an operand lies outside memory.
            pub fn decode(memory: &Memory, ip: usize) -> Result<Self, VMError> {
                let word = memory.read(ip as i64)?;
                let opcode = Opcode::from_code(word % 100, ip)?;
                let mut operands = OperandReader::new(memory, ip, word);
                match opcode {
                    $(
                        Opcode::$name => {
                            $( let $field = define_instructions!(@read operands, $kind)?; )*
                            Ok(Instruction::$name { $( $field, )* })
                        }
                    )*
                }
            }

            pub const fn opcode(&self) -> Opcode {
                match self {
                    $( Instruction::$name { .. } => Opcode::$name, )*
                }
            }

            /// Returns how many words this instruction occupies.
            pub const fn width(&self) -> usize {
                1 + self.opcode().arity()
            }
        }

        impl fmt::Display for Instruction {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $(
                        Instruction::$name { $( $field, )* } => {
                            let operands: Vec<String> = vec![ $( $field.to_string(), )* ];
                            if operands.is_empty() {
                                write!(f, "{}", $mnemonic)
                            } else {
                                write!(f, "{} {}", $mnemonic, operands.join(", "))
                            }
                        }
                    )*
                }
            }
        }
    };

    // ---------- counting ----------
    (@count) => { 0usize };
    (@count $head:ident $( $tail:ident )*) => { 1usize + define_instructions!(@count $( $tail )*) };

    // ---------- types ----------
    (@ty Src) => { Source };
    (@ty Dst) => { Target };

    // ---------- decoding ----------
    (@read $operands:ident, Src) => { $operands.source() };
    (@read $operands:ident, Dst) => { $operands.target() };
}

/// Sequential reader over the operand words of one instruction.
struct OperandReader<'a> {
    memory: &'a Memory,
    ip: usize,
    /// Instruction word with the opcode digits stripped.
    modes: i64,
    /// 1-based index of the next operand.
    slot: usize,
}

impl<'a> OperandReader<'a> {
    fn new(memory: &'a Memory, ip: usize, word: i64) -> Self {
        Self {
            memory,
            ip,
            modes: word / 100,
            slot: 1,
        }
    }

    /// Consumes the next mode digit and operand word.
    fn next(&mut self) -> Result<(Mode, i64), VMError> {
        let mode = Mode::from_digit(self.modes % 10, self.ip)?;
        self.modes /= 10;
        let raw = self.memory.read(self.ip as i64 + self.slot as i64)?;
        self.slot += 1;
        Ok((mode, raw))
    }

    fn source(&mut self) -> Result<Source, VMError> {
        let (mode, raw) = self.next()?;
        Ok(Source::new(mode, raw))
    }

    fn target(&mut self) -> Result<Target, VMError> {
        let slot = self.slot;
        let (mode, raw) = self.next()?;
        Target::new(mode, raw, self.ip, slot)
    }
}

for_each_instruction!(define_instructions);
