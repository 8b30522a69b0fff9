use super::memory::MemoryPolicy;

/// Per-run configuration handed to [`VM::new`](super::VM::new).
///
/// The default reproduces the classic machine: bounded memory, no step budget and
/// no tracing.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ExecConfig {
    /// Behaviour for addresses past the end of the loaded program.
    pub memory: MemoryPolicy,
    /// Maximum number of instructions to execute before failing. `None` runs until halt.
    pub step_limit: Option<u64>,
    /// Log every decoded instruction at trace level.
    pub trace: bool,
}

impl ExecConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_memory(mut self, memory: MemoryPolicy) -> Self {
        self.memory = memory;
        self
    }

    pub fn with_step_limit(mut self, limit: u64) -> Self {
        self.step_limit = Some(limit);
        self
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }
}
