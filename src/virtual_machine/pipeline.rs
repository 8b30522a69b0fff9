//! Threaded VM pipelines.
//!
//! A [`Pipeline`] runs one VM per stage, each on its own thread, with stage `i`'s
//! outputs feeding stage `i + 1`'s inputs through a [`ChannelListener`]. With
//! feedback enabled the last stage also feeds the first, forming a ring. Blocking
//! reads give natural backpressure: a stage waits until its upstream produces.
//!
//! When a stage stops (halt or error) its channels are dropped, so a consumer that
//! is still waiting on it fails with [`VMError::ChannelClosed`] instead of hanging.

use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::listener::{ChannelListener, channel};
use crate::virtual_machine::program::Program;
use crate::virtual_machine::vm::{ExecConfig, VM};
use crate::{error, trace};
use std::thread;

/// A chain of VMs running the same program.
#[derive(Clone, Debug)]
pub struct Pipeline {
    program: Program,
    config: ExecConfig,
    /// Initial inputs queued for each stage, in stage order.
    stages: Vec<Vec<i64>>,
    feedback: bool,
}

impl Pipeline {
    pub fn new(program: Program) -> Self {
        Self {
            program,
            config: ExecConfig::default(),
            stages: Vec::new(),
            feedback: false,
        }
    }

    /// Sets the configuration every stage runs with.
    pub fn with_config(mut self, config: ExecConfig) -> Self {
        self.config = config;
        self
    }

    /// Appends a stage whose input queue starts with `inputs`.
    pub fn stage(mut self, inputs: impl IntoIterator<Item = i64>) -> Self {
        self.stages.push(inputs.into_iter().collect());
        self
    }

    /// Routes the last stage's outputs back into the first stage.
    pub fn with_feedback(mut self, feedback: bool) -> Self {
        self.feedback = feedback;
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Runs every stage to completion and returns the last stage's outputs.
    ///
    /// `seed` is queued into the first stage after its own initial inputs. An empty
    /// pipeline passes `seed` straight through. If any stage fails, the first
    /// failure that is not a [`VMError::ChannelClosed`] knock-on effect is returned.
    pub fn run(&self, seed: &[i64]) -> Result<Vec<i64>, VMError> {
        let count = self.stages.len();
        if count == 0 {
            return Ok(seed.to_vec());
        }

        let (senders, receivers): (Vec<_>, Vec<_>) = (0..count).map(|_| channel()).unzip();
        for (sender, inputs) in senders.iter().zip(&self.stages) {
            for value in inputs {
                // Receivers are still alive here; sending cannot fail.
                let _ = sender.send(*value);
            }
        }
        for value in seed {
            let _ = senders[0].send(*value);
        }

        let listeners: Vec<ChannelListener> = receivers
            .into_iter()
            .enumerate()
            .map(|(i, receiver)| {
                let downstream = if i + 1 < count {
                    Some(senders[i + 1].clone())
                } else if self.feedback {
                    Some(senders[0].clone())
                } else {
                    None
                };
                ChannelListener::new(receiver).with_output(downstream)
            })
            .collect();
        // Only listeners may hold senders from here on, so a finished stage closes
        // its downstream channel.
        drop(senders);

        let results: Vec<Result<Vec<i64>, VMError>> = thread::scope(|scope| {
            let handles: Vec<_> = listeners
                .into_iter()
                .enumerate()
                .map(|(i, mut listener)| {
                    let program = &self.program;
                    let config = self.config.clone();
                    scope.spawn(move || {
                        let mut vm = VM::new(program, config);
                        let result = vm.run(&mut listener);
                        trace!("stage {i} finished after {} steps", vm.stats().total());
                        result
                    })
                })
                .collect();

            handles
                .into_iter()
                .enumerate()
                .map(|(i, handle)| {
                    handle
                        .join()
                        .unwrap_or_else(|_| Err(VMError::Listener(format!("stage {i} panicked"))))
                })
                .collect()
        });

        let mut last = Vec::new();
        let mut knock_on = None;
        for (i, result) in results.into_iter().enumerate() {
            match result {
                Ok(outputs) => last = outputs,
                Err(VMError::ChannelClosed) => {
                    knock_on.get_or_insert(VMError::ChannelClosed);
                }
                Err(err) => {
                    error!("pipeline stage {i} failed: {err}");
                    return Err(err);
                }
            }
        }
        match knock_on {
            Some(err) => Err(err),
            None => Ok(last),
        }
    }
}
