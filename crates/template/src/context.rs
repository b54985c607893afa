//! Per-render variable and state storage

use crate::{
    error::RenderWarning,
    value::{Dictionary, Value},
};
use indexmap::IndexMap;
use tracing::debug;

/// Mutable state owned by a single render call: a stack of variable frames
/// plus the process-like stores that persist for the duration of the render
/// (counters, cycle iterators, recorded diagnostics).
///
/// Lookup resolves against the innermost frame first. Iteration tags push an
/// overlay frame per pass; `assign` writes to the outermost frame so that
/// assignments made inside a loop body survive the loop.
#[derive(Debug)]
pub struct RenderContext {
    /// Variable frames, outermost first. Never empty; the first frame holds
    /// the globals supplied by the embedder.
    frames: Vec<Dictionary>,
    /// Named counters for `increment`/`decrement`. Disjoint from the
    /// variable frames: a counter named `x` never collides with a variable
    /// named `x`.
    counters: IndexMap<String, i64>,
    /// Cycle iterators, keyed by group name or by the canonical form of the
    /// cycle's value list. Each holds the index of the next value to emit.
    cycles: IndexMap<String, usize>,
    /// Soft diagnostics recorded while parsing expressions and scopes
    warnings: Vec<RenderWarning>,
}

impl RenderContext {
    pub fn new(globals: Dictionary) -> Self {
        Self {
            frames: vec![globals],
            counters: IndexMap::new(),
            cycles: IndexMap::new(),
            warnings: Vec::new(),
        }
    }

    /// Resolve a variable name against the frame stack, innermost first
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    /// Bind a variable in the outermost frame
    pub fn assign(&mut self, name: impl Into<String>, value: Value) {
        // The stack is never empty
        if let Some(frame) = self.frames.first_mut() {
            frame.insert(name.into(), value);
        }
    }

    /// Push an overlay frame. Every push is paired with a [Self::pop_frame]
    /// when the owning scope closes or re-enters.
    pub(crate) fn push_frame(&mut self, overlay: Dictionary) {
        self.frames.push(overlay);
    }

    /// Pop the innermost overlay frame. The globals frame is never popped.
    pub(crate) fn pop_frame(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Advance the named counter, returning the value to emit: the counter's
    /// value *before* incrementing (first emission is 0)
    pub(crate) fn increment(&mut self, name: &str) -> i64 {
        let counter = self.counters.entry(name.to_owned()).or_insert(0);
        let emitted = *counter;
        *counter += 1;
        emitted
    }

    /// Decrement the named counter, returning the value to emit: the
    /// counter's value *after* decrementing (first emission is -1)
    pub(crate) fn decrement(&mut self, name: &str) -> i64 {
        let counter = self.counters.entry(name.to_owned()).or_insert(0);
        *counter -= 1;
        *counter
    }

    /// Get the next index for the cycle iterator under `key`, advancing it.
    /// Indexes wrap around `len`.
    pub(crate) fn cycle_next(&mut self, key: String, len: usize) -> usize {
        let next = self.cycles.entry(key).or_insert(0);
        let index = *next % len;
        *next = (index + 1) % len;
        index
    }

    /// Record a soft diagnostic. The render continues.
    pub(crate) fn record(&mut self, warning: RenderWarning) {
        debug!(%warning, "recorded render diagnostic");
        self.warnings.push(warning);
    }

    /// Diagnostics recorded so far, in source order
    pub fn warnings(&self) -> &[RenderWarning] {
        &self.warnings
    }

    pub(crate) fn into_warnings(self) -> Vec<RenderWarning> {
        self.warnings
    }
}
