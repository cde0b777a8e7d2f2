//! I/O ports: queued input words and the output buffer

use snx_spec::Word;
use std::collections::VecDeque;

#[derive(Debug, Clone, Default)]
pub struct IoHandler {
    inputs: VecDeque<Word>,
    outputs: Vec<Word>,
}

impl IoHandler {
    pub fn read(&mut self) -> Option<Word> {
        self.inputs.pop_front()
    }

    pub fn write(&mut self, value: Word) {
        self.outputs.push(value);
    }

    pub fn push_inputs(&mut self, values: impl IntoIterator<Item = Word>) {
        self.inputs.extend(values);
    }

    pub fn outputs(&self) -> &[Word] {
        &self.outputs
    }

    pub fn take_outputs(&mut self) -> Vec<Word> {
        std::mem::take(&mut self.outputs)
    }

    /// Queued inputs not yet consumed by IN
    pub fn pending_inputs(&self) -> usize {
        self.inputs.len()
    }
}
