//! The VM's I/O boundary.
//!
//! A [`Listener`] is the controller attached to a running program: the VM asks it
//! for a value on every input instruction and hands it every value the program
//! outputs. The VM never checks how the two callbacks are interleaved; any
//! sequencing rules belong to the controller.
//!
//! Three listener shapes are provided:
//! - [`InputQueue`]: inputs supplied up front, outputs recorded.
//! - [`Reactive`]: each input computed on demand from the outputs seen so far.
//! - [`ChannelListener`]: inputs pulled from a thread-safe FIFO, outputs pushed to
//!   another one, used to chain VMs running on separate threads.

use crate::trace;
use crate::virtual_machine::errors::VMError;
use std::collections::VecDeque;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// Controller callbacks invoked by the execution loop.
pub trait Listener {
    /// Supplies the value for an input instruction. May block.
    fn on_read_requested(&mut self) -> Result<i64, VMError>;

    /// Observes a value produced by an output instruction.
    fn on_store_requested(&mut self, value: i64) -> Result<(), VMError>;
}

impl<L: Listener + ?Sized> Listener for &mut L {
    fn on_read_requested(&mut self) -> Result<i64, VMError> {
        (**self).on_read_requested()
    }

    fn on_store_requested(&mut self, value: i64) -> Result<(), VMError> {
        (**self).on_store_requested(value)
    }
}

impl<L: Listener + ?Sized> Listener for Box<L> {
    fn on_read_requested(&mut self) -> Result<i64, VMError> {
        (**self).on_read_requested()
    }

    fn on_store_requested(&mut self, value: i64) -> Result<(), VMError> {
        (**self).on_store_requested(value)
    }
}

/// Preloaded listener: reads pop from a FIFO of inputs, stores are recorded.
#[derive(Clone, Debug, Default)]
pub struct InputQueue {
    inputs: VecDeque<i64>,
    outputs: Vec<i64>,
}

impl InputQueue {
    pub fn new(inputs: impl IntoIterator<Item = i64>) -> Self {
        Self {
            inputs: inputs.into_iter().collect(),
            outputs: Vec::new(),
        }
    }

    /// Queues another input behind the existing ones.
    pub fn push(&mut self, value: i64) {
        self.inputs.push_back(value);
    }

    /// Returns the number of inputs not yet consumed.
    pub fn remaining(&self) -> usize {
        self.inputs.len()
    }

    /// Returns every output observed so far, in production order.
    pub fn outputs(&self) -> &[i64] {
        &self.outputs
    }

    /// Takes the recorded outputs, leaving the record empty.
    pub fn take_outputs(&mut self) -> Vec<i64> {
        std::mem::take(&mut self.outputs)
    }
}

impl Listener for InputQueue {
    fn on_read_requested(&mut self) -> Result<i64, VMError> {
        self.inputs.pop_front().ok_or(VMError::InputExhausted)
    }

    fn on_store_requested(&mut self, value: i64) -> Result<(), VMError> {
        self.outputs.push(value);
        Ok(())
    }
}

/// On-demand listener: every read calls `next_input` with all outputs observed so far.
pub struct Reactive<F> {
    next_input: F,
    outputs: Vec<i64>,
}

impl<F> Reactive<F>
where
    F: FnMut(&[i64]) -> Result<i64, VMError>,
{
    pub fn new(next_input: F) -> Self {
        Self {
            next_input,
            outputs: Vec::new(),
        }
    }

    pub fn outputs(&self) -> &[i64] {
        &self.outputs
    }
}

impl<F> Listener for Reactive<F>
where
    F: FnMut(&[i64]) -> Result<i64, VMError>,
{
    fn on_read_requested(&mut self) -> Result<i64, VMError> {
        (self.next_input)(&self.outputs)
    }

    fn on_store_requested(&mut self, value: i64) -> Result<(), VMError> {
        self.outputs.push(value);
        Ok(())
    }
}

/// Sending half of an Intcode value channel.
pub type ValueSender = UnboundedSender<i64>;
/// Receiving half of an Intcode value channel.
pub type ValueReceiver = UnboundedReceiver<i64>;

/// Creates an unbounded, ordering-preserving FIFO for wiring VMs together.
pub fn channel() -> (ValueSender, ValueReceiver) {
    unbounded_channel()
}

/// Channel-backed listener for VMs running on their own thread.
///
/// Reads block the calling thread until a value arrives. If every sender has been
/// dropped and the queue is empty, the read fails with [`VMError::ChannelClosed`]
/// instead of blocking forever. Outputs go to the optional downstream sender; a
/// downstream that has already gone away is ignored, since a halted consumer can no
/// longer observe anything.
///
/// Must not be driven from inside an async runtime worker; run the VM on a plain
/// thread (or a blocking task) instead.
pub struct ChannelListener {
    input: ValueReceiver,
    output: Option<ValueSender>,
}

impl ChannelListener {
    pub fn new(input: ValueReceiver) -> Self {
        Self {
            input,
            output: None,
        }
    }

    /// Forwards every output to `output`.
    pub fn with_output(mut self, output: Option<ValueSender>) -> Self {
        self.output = output;
        self
    }
}

impl Listener for ChannelListener {
    fn on_read_requested(&mut self) -> Result<i64, VMError> {
        self.input.blocking_recv().ok_or(VMError::ChannelClosed)
    }

    fn on_store_requested(&mut self, value: i64) -> Result<(), VMError> {
        if let Some(output) = &self.output
            && output.send(value).is_err()
        {
            trace!("downstream closed, dropping output {value}");
        }
        Ok(())
    }
}
