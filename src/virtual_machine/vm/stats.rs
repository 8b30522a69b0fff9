use crate::virtual_machine::isa::Opcode;

/// Opcode codes are two decimal digits, so a flat table covers every one of them.
const OPCODE_SLOTS: usize = 100;

/// Executed-instruction counters for one run, in a flat array indexed by opcode code.
#[derive(Clone, Debug)]
pub struct ExecStats {
    counts: [u64; OPCODE_SLOTS],
    total: u64,
}

impl Default for ExecStats {
    fn default() -> Self {
        Self {
            counts: [0; OPCODE_SLOTS],
            total: 0,
        }
    }
}

impl ExecStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn record(&mut self, opcode: Opcode) {
        let slot = &mut self.counts[opcode.code() as usize];
        *slot = slot.saturating_add(1);
        self.total = self.total.saturating_add(1);
    }

    /// Returns how many instructions with `opcode` were executed.
    pub fn count(&self, opcode: Opcode) -> u64 {
        self.counts[opcode.code() as usize]
    }

    /// Returns the number of executed instructions.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Returns an iterator over all opcodes and their counts, in table order.
    pub fn iter(&self) -> impl Iterator<Item = (Opcode, u64)> + '_ {
        Opcode::ALL.iter().map(|op| (*op, self.count(*op)))
    }
}
