use thiserror::Error;

/// Errors that can occur while loading or executing an Intcode program.
///
/// Every variant is fatal for the run that raised it: the execution loop never
/// retries, and outputs collected before the failure are not guaranteed complete.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VMError {
    /// A read or write targeted an address outside memory (or a negative one).
    #[error("invalid address {address} (memory holds {capacity} cells)")]
    InvalidAddress { address: i64, capacity: usize },
    /// Opcode is not part of the instruction catalogue.
    #[error("unsupported opcode {opcode} at ip {ip}")]
    UnsupportedOpcode { opcode: i64, ip: usize },
    /// Mode digit outside position (0), immediate (1) and relative (2).
    #[error("invalid addressing mode {mode} at ip {ip}")]
    InvalidAddressingMode { mode: i64, ip: usize },
    /// A destination operand was encoded in immediate mode.
    #[error("operand {operand} of instruction at ip {ip} is a destination in immediate mode")]
    ImmediateDestination { ip: usize, operand: usize },
    /// A preloaded listener was asked for more input than it was given.
    #[error("input requested but no values remain")]
    InputExhausted,
    /// A channel listener's upstream went away before producing a value.
    #[error("input channel closed")]
    ChannelClosed,
    /// Growable memory was asked to extend past its configured limit.
    #[error("address {address} exceeds the memory limit of {limit} cells")]
    MemoryLimitExceeded { address: i64, limit: usize },
    /// The optional step budget ran out before the program halted.
    #[error("step limit of {limit} instructions exceeded")]
    StepLimitExceeded { limit: u64 },
    /// The program halted without emitting any output.
    #[error("program halted without producing output")]
    NoOutput,
    /// Program text contained something other than a signed integer.
    #[error("invalid program token {token:?} at index {index}")]
    ParseError { index: usize, token: String },
    /// File I/O error while loading a program.
    #[error("io error: {0}")]
    Io(String),
    /// Failure raised by a listener implementation; the VM only propagates it.
    #[error("listener error: {0}")]
    Listener(String),
}

impl From<std::io::Error> for VMError {
    fn from(err: std::io::Error) -> Self {
        VMError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = VMError::InvalidAddress {
            address: -3,
            capacity: 5,
        };
        assert_eq!(err.to_string(), "invalid address -3 (memory holds 5 cells)");

        let err = VMError::UnsupportedOpcode { opcode: 42, ip: 7 };
        assert_eq!(err.to_string(), "unsupported opcode 42 at ip 7");
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert!(matches!(VMError::from(io), VMError::Io(msg) if msg == "missing"));
    }
}
