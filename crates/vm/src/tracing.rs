//! Per-step observation.
//!
//! [`StepTracer`] emits one JSON object per executed instruction onto a
//! caller-provided writer: PC, opcode and mnemonic, gas before the step,
//! the step's cost, depth, the stack contents, an optional memory prefix,
//! the refund counter, and the error if the step failed. Write failures are
//! logged and do not disturb execution.
//!
//! [`Debugger`] adds breakpoints on bytecode PCs, a step mode that pauses
//! before every instruction, a step counter, and pause/resume control. It is
//! driven through [`crate::vm::VM::run_with_debugger`].

use crate::{errors::VMError, opcodes::Opcode};
use ethereum_types::U256;
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::io::Write;

/// State captured immediately before a step executes.
#[derive(Debug, Clone)]
pub struct StepSnapshot {
    pub pc: u32,
    pub opcode: u8,
    pub gas: i64,
    pub depth: usize,
    pub stack: Vec<U256>,
    pub memory: Option<Vec<u8>>,
    pub refund: u64,
}

#[derive(Serialize)]
struct StepRecord<'a> {
    pc: u32,
    op: u8,
    #[serde(rename = "opName")]
    op_name: &'static str,
    gas: u64,
    #[serde(rename = "gasCost")]
    gas_cost: u64,
    depth: usize,
    stack: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    memory: Option<&'a str>,
    refund: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub struct StepTracer {
    out: Option<Box<dyn Write + Send>>,
    steps_emitted: u64,
}

impl std::fmt::Debug for StepTracer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepTracer")
            .field("enabled", &self.out.is_some())
            .field("steps_emitted", &self.steps_emitted)
            .finish()
    }
}

impl Default for StepTracer {
    fn default() -> Self {
        Self::disabled()
    }
}

impl StepTracer {
    pub fn disabled() -> Self {
        Self {
            out: None,
            steps_emitted: 0,
        }
    }

    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Some(out),
            steps_emitted: 0,
        }
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        self.out.is_some()
    }

    pub fn steps_emitted(&self) -> u64 {
        self.steps_emitted
    }

    /// Write the record for a finished step. `gas_after` is the remaining
    /// gas once the handler ran; the difference to the snapshot is the
    /// reported cost.
    pub fn emit(&mut self, snapshot: &StepSnapshot, gas_after: i64, error: Option<&VMError>) {
        let Some(out) = self.out.as_mut() else {
            return;
        };

        let gas_before = snapshot.gas.max(0);
        let memory_hex = snapshot.memory.as_deref().map(hex_string);
        let record = StepRecord {
            pc: snapshot.pc,
            op: snapshot.opcode,
            op_name: Opcode::from(snapshot.opcode).mnemonic(),
            gas: gas_before as u64,
            gas_cost: gas_before.saturating_sub(gas_after.max(0)) as u64,
            depth: snapshot.depth,
            stack: snapshot.stack.iter().map(|word| format!("{word:#x}")).collect(),
            memory: memory_hex.as_deref(),
            refund: snapshot.refund,
            error: error.map(|error| error.to_string()),
        };

        match serde_json::to_string(&record) {
            Ok(line) => {
                if let Err(error) = writeln!(out, "{line}") {
                    tracing::warn!(%error, "step trace write failed");
                } else {
                    self.steps_emitted += 1;
                }
            }
            Err(error) => tracing::warn!(%error, "step trace serialization failed"),
        }
    }
}

fn hex_string(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(2 + bytes.len() * 2);
    text.push_str("0x");
    for byte in bytes {
        text.push_str(&format!("{byte:02x}"));
    }
    text
}

/// Why [`crate::vm::VM::run_with_debugger`] returned.
#[derive(Debug)]
pub enum DebugEvent {
    /// Step mode or an explicit pause stopped before the instruction at `pc`.
    Paused { pc: usize },
    /// A breakpoint stopped before the instruction at `pc`.
    Breakpoint { pc: usize },
    /// The frame ran to completion.
    Completed(crate::errors::ExecutionReport),
}

#[derive(Debug, Default)]
pub struct Debugger {
    breakpoints: FxHashSet<usize>,
    pub step_mode: bool,
    paused: bool,
    /// Set after a pause so the next resume executes the instruction the
    /// debugger stopped on instead of stopping again.
    skip_once: bool,
    pub steps_executed: u64,
}

impl Debugger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_breakpoint(&mut self, pc: usize) {
        self.breakpoints.insert(pc);
    }

    pub fn remove_breakpoint(&mut self, pc: usize) {
        self.breakpoints.remove(&pc);
    }

    pub fn has_breakpoint(&self, pc: usize) -> bool {
        self.breakpoints.contains(&pc)
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Decide whether to stop before the instruction at `pc`. A pause arms
    /// `skip_once` via [`Debugger::stopped_at`], so resuming makes progress.
    pub(crate) fn should_stop(&mut self, pc: usize) -> bool {
        if self.skip_once {
            self.skip_once = false;
            return false;
        }
        self.paused || self.step_mode || self.breakpoints.contains(&pc)
    }

    pub(crate) fn stopped_at(&mut self, pc: usize) -> DebugEvent {
        self.paused = true;
        self.skip_once = true;
        if self.has_breakpoint(pc) && !self.step_mode {
            DebugEvent::Breakpoint { pc }
        } else {
            DebugEvent::Paused { pc }
        }
    }
}
