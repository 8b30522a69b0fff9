//! Program text representation.
//!
//! A program is a comma-separated list of signed decimal integers, for example
//! `1,9,10,3,2,3,11,0,99,30,40,50`. Whitespace around tokens (including a trailing
//! newline) and a single trailing comma are accepted.

use crate::virtual_machine::errors::VMError;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Parsed Intcode program: the initial memory image of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    words: Vec<i64>,
}

impl Program {
    pub fn new(words: Vec<i64>) -> Self {
        Self { words }
    }

    /// Parses comma-separated program text.
    pub fn parse(text: &str) -> Result<Self, VMError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Self::default());
        }
        let text = text.strip_suffix(',').unwrap_or(text);

        let words = text
            .split(',')
            .enumerate()
            .map(|(index, token)| {
                let token = token.trim();
                token.parse::<i64>().map_err(|_| VMError::ParseError {
                    index,
                    token: token.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { words })
    }

    /// Reads and parses a program file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, VMError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn words(&self) -> &[i64] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Overwrites the word at `address` before the program is run.
    pub fn patch(&mut self, address: usize, value: i64) -> Result<(), VMError> {
        let capacity = self.words.len();
        let slot = self
            .words
            .get_mut(address)
            .ok_or(VMError::InvalidAddress {
                address: address as i64,
                capacity,
            })?;
        *slot = value;
        Ok(())
    }

    /// Returns a copy of this program with `address` overwritten.
    pub fn with_patch(&self, address: usize, value: i64) -> Result<Self, VMError> {
        let mut patched = self.clone();
        patched.patch(address, value)?;
        Ok(patched)
    }
}

impl FromStr for Program {
    type Err = VMError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Vec<i64>> for Program {
    fn from(words: Vec<i64>) -> Self {
        Self::new(words)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, word) in self.words.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{word}")?;
        }
        Ok(())
    }
}
