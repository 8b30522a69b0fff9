//! Linear disassembly of Intcode programs.
//!
//! Intcode freely mixes code and data, so the listing is a best effort: words are
//! decoded sequentially from address 0, and anything that does not decode as an
//! instruction is emitted as a single `DATA` word.

use crate::virtual_machine::isa::Instruction;
use crate::virtual_machine::program::Program;
use crate::virtual_machine::vm::{Memory, MemoryPolicy};
use std::fmt;

/// One line of a listing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Line {
    Instruction {
        address: usize,
        instruction: Instruction,
    },
    Data {
        address: usize,
        value: i64,
    },
}

impl Line {
    pub fn address(&self) -> usize {
        match self {
            Line::Instruction { address, .. } | Line::Data { address, .. } => *address,
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Line::Instruction {
                address,
                instruction,
            } => write!(f, "{address:>6}: {instruction}"),
            Line::Data { address, value } => write!(f, "{address:>6}: DATA {value}"),
        }
    }
}

/// Disassembles `program` into a listing.
pub fn disassemble(program: &Program) -> Vec<Line> {
    let memory = Memory::new(program.words().to_vec(), MemoryPolicy::Bounded);
    let mut lines = Vec::new();
    let mut address = 0;

    while address < memory.len() {
        match Instruction::decode(&memory, address) {
            Ok(instruction) => {
                lines.push(Line::Instruction {
                    address,
                    instruction,
                });
                address += instruction.width();
            }
            Err(_) => {
                lines.push(Line::Data {
                    address,
                    value: program.words()[address],
                });
                address += 1;
            }
        }
    }
    lines
}

/// Renders the listing of `program` as text, one line per entry.
pub fn render(program: &Program) -> String {
    disassemble(program)
        .iter()
        .map(Line::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
