use crate::virtual_machine::errors::VMError;

/// Default cell cap for [`MemoryPolicy::growable`].
pub const DEFAULT_GROWABLE_LIMIT: usize = 1 << 24;

/// How memory reacts to addresses past the end of the loaded program.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum MemoryPolicy {
    /// Memory is exactly the loaded program; any access past it fails with
    /// [`VMError::InvalidAddress`].
    #[default]
    Bounded,
    /// Reads past the end return 0 and writes extend memory with zeroed cells,
    /// up to `limit` cells in total.
    Growable { limit: usize },
}

impl MemoryPolicy {
    /// Growable memory capped at [`DEFAULT_GROWABLE_LIMIT`] cells.
    pub const fn growable() -> Self {
        MemoryPolicy::Growable {
            limit: DEFAULT_GROWABLE_LIMIT,
        }
    }
}

/// Word-addressed VM memory plus the relative base used by relative-mode operands.
///
/// Memory is created once per run from the program words and discarded with the VM.
#[derive(Clone, Debug)]
pub struct Memory {
    cells: Vec<i64>,
    relative_base: i64,
    policy: MemoryPolicy,
}

impl Memory {
    pub fn new(cells: Vec<i64>, policy: MemoryPolicy) -> Self {
        Self {
            cells,
            relative_base: 0,
            policy,
        }
    }

    /// Returns the number of allocated cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.cells
    }

    pub fn policy(&self) -> MemoryPolicy {
        self.policy
    }

    pub fn relative_base(&self) -> i64 {
        self.relative_base
    }

    /// Moves the relative base by `delta`.
    pub fn adjust_relative_base(&mut self, delta: i64) {
        self.relative_base = self.relative_base.wrapping_add(delta);
    }

    /// Reads the cell at `address`.
    ///
    /// Under [`MemoryPolicy::Growable`], unallocated cells below the limit read as 0.
    pub fn read(&self, address: i64) -> Result<i64, VMError> {
        let index = self.checked_index(address)?;
        match self.cells.get(index) {
            Some(value) => Ok(*value),
            None => match self.policy {
                MemoryPolicy::Bounded => Err(self.out_of_range(address)),
                MemoryPolicy::Growable { limit } if index < limit => Ok(0),
                MemoryPolicy::Growable { limit } => {
                    Err(VMError::MemoryLimitExceeded { address, limit })
                }
            },
        }
    }

    /// Writes `value` at `address`, growing memory if the policy allows it.
    pub fn write(&mut self, address: i64, value: i64) -> Result<(), VMError> {
        let index = self.checked_index(address)?;
        if index >= self.cells.len() {
            match self.policy {
                MemoryPolicy::Bounded => return Err(self.out_of_range(address)),
                MemoryPolicy::Growable { limit } if index < limit => {
                    self.cells.resize(index + 1, 0);
                }
                MemoryPolicy::Growable { limit } => {
                    return Err(VMError::MemoryLimitExceeded { address, limit });
                }
            }
        }
        self.cells[index] = value;
        Ok(())
    }

    /// Reads the cell at `relative_base + offset`.
    pub fn read_relative(&self, offset: i64) -> Result<i64, VMError> {
        self.read(self.relative_address(offset)?)
    }

    /// Writes the cell at `relative_base + offset`.
    pub fn write_relative(&mut self, offset: i64, value: i64) -> Result<(), VMError> {
        let address = self.relative_address(offset)?;
        self.write(address, value)
    }

    fn relative_address(&self, offset: i64) -> Result<i64, VMError> {
        self.relative_base.checked_add(offset).ok_or(VMError::InvalidAddress {
            address: self.relative_base.saturating_add(offset),
            capacity: self.cells.len(),
        })
    }

    /// Rejects negative addresses and converts the rest to a vector index.
    fn checked_index(&self, address: i64) -> Result<usize, VMError> {
        usize::try_from(address).map_err(|_| self.out_of_range(address))
    }

    fn out_of_range(&self, address: i64) -> VMError {
        VMError::InvalidAddress {
            address,
            capacity: self.cells.len(),
        }
    }
}
