//! Caller-supplied callbacks
//!
//! Hooks run inline with the step that triggers them. A hook that returns
//! an error stops the simulator; the error comes back from `step` wrapped
//! in `RuntimeError::Hook`.

use snx_spec::Word;
use std::fmt;

pub type HookError = Box<dyn std::error::Error + Send + Sync>;
pub type HookResult<T = ()> = std::result::Result<T, HookError>;

pub type InputFn = Box<dyn FnMut() -> HookResult<Word>>;
pub type OutputFn = Box<dyn FnMut(Word) -> HookResult>;
pub type OobFn = Box<dyn FnMut(&OobEvent<'_>) -> HookResult>;
pub type TraceFn = Box<dyn FnMut(&TraceEvent<'_>) -> HookResult>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Load,
    Store,
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AccessKind::Load => "load",
            AccessKind::Store => "store",
        })
    }
}

/// Memory access outside `mem_size`, reported before the default handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OobEvent<'a> {
    pub kind: AccessKind,
    pub address: Word,
    pub pc: u32,
    pub text: &'a str,
    pub mem_size: u32,
}

/// One executed step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent<'a> {
    pub pc: u32,
    pub next_pc: u32,
    pub text: &'a str,
    pub registers: &'a [Word],
}

#[derive(Default)]
pub struct Hooks {
    pub input: Option<InputFn>,
    pub output: Option<OutputFn>,
    pub oob: Option<OobFn>,
    pub trace: Option<TraceFn>,
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("input", &self.input.is_some())
            .field("output", &self.output.is_some())
            .field("oob", &self.oob.is_some())
            .field("trace", &self.trace.is_some())
            .finish()
    }
}
