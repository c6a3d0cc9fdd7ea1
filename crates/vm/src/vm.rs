//! The frame interpreter.
//!
//! Dispatch is a threaded-code loop over the plan's instruction stream: fetch
//! the handler slot at `stream_idx`, advance, make one indirect call. Each
//! handler consumes its own metadata slot, so the loop itself never inspects
//! opcodes. Terminal handlers report `Halt`; execution errors unwind through
//! `Result` to frame entry and become the frame's outcome.

use crate::{
    cache::PlanCache,
    call_frame::CallFrame,
    code::Code,
    constants::MEMORY_TRACE_LIMIT,
    environment::{EVMConfig, Environment},
    errors::{ExecutionReport, TxResult, VMError},
    opcode_handlers::{DEFAULT_HANDLERS, OpcodeResult},
    opcodes::Opcode,
    plan::Plan,
    planner::Planner,
    stack::Stack,
    substate::Substate,
    tracing::{DebugEvent, Debugger, StepSnapshot, StepTracer},
};
use bytes::Bytes;
use std::sync::Arc;
use tracing::debug;

pub struct VM {
    pub current_call_frame: CallFrame,
    pub env: Environment,
    pub substate: Substate,
    pub tracer: StepTracer,
}

impl VM {
    /// Analyze and plan `code`, then build a frame around the plan.
    pub fn new(code: Bytes, initial_gas: u64, config: EVMConfig) -> Result<Self, VMError> {
        let code = Code::analyze(code, config.max_bytecode_size)?;
        let planner = Planner::new(&DEFAULT_HANDLERS, config.fusion);
        let plan = Arc::new(planner.plan(code)?);
        Ok(Self::with_plan(plan, initial_gas, config))
    }

    /// Build a frame around a plan borrowed from the analysis cache.
    pub fn with_cache(
        cache: &mut PlanCache,
        code: Bytes,
        initial_gas: u64,
        config: EVMConfig,
    ) -> Result<Self, VMError> {
        let planner = Planner::new(&DEFAULT_HANDLERS, config.fusion);
        let plan = cache.get_or_insert(code, &planner, config.max_bytecode_size)?;
        Ok(Self::with_plan(plan, initial_gas, config))
    }

    pub fn with_plan(plan: Arc<Plan>, initial_gas: u64, config: EVMConfig) -> Self {
        let current_call_frame = CallFrame::new(plan, initial_gas, &config, 0);
        Self {
            current_call_frame,
            env: Environment::new(initial_gas, config),
            substate: Substate::new(),
            tracer: StepTracer::disabled(),
        }
    }

    pub fn set_tracer(&mut self, tracer: StepTracer) {
        self.tracer = tracer;
    }

    /// Run the frame to completion and report the outcome.
    pub fn execute(&mut self) -> Result<ExecutionReport, VMError> {
        let result = self.run();
        self.finish(result)
    }

    /// Rewind the frame and transaction state for a fresh run over the same
    /// plan.
    pub fn reset(&mut self, new_gas: u64) {
        self.current_call_frame.reset(new_gas);
        self.env.initial_gas = new_gas;
        self.substate.clear();
    }

    /// Execute until a debugger stop, an error, or completion.
    pub fn run_with_debugger(&mut self, debugger: &mut Debugger) -> Result<DebugEvent, VMError> {
        loop {
            let pc = self.pc();
            if debugger.should_stop(pc) {
                return Ok(debugger.stopped_at(pc));
            }
            match self.step_inner() {
                Ok(OpcodeResult::Continue) => debugger.steps_executed += 1,
                Ok(OpcodeResult::Halt) => {
                    debugger.steps_executed += 1;
                    return Ok(DebugEvent::Completed(self.finish(Ok(()))?));
                }
                Err(error) => return Ok(DebugEvent::Completed(self.finish(Err(error))?)),
            }
        }
    }

    fn run(&mut self) -> Result<(), VMError> {
        loop {
            match self.step_inner()? {
                OpcodeResult::Continue => {}
                OpcodeResult::Halt => return Ok(()),
            }
        }
    }

    /// One dispatch: fetch the handler, run it, trace if enabled.
    fn step_inner(&mut self) -> Result<OpcodeResult, VMError> {
        let frame = &mut self.current_call_frame;
        let fetch_idx = frame.stream_idx;
        let handler = frame.plan.next_handler(&mut frame.stream_idx)?;

        if !self.tracer.enabled() {
            return handler(self);
        }

        let snapshot = self.capture_step(fetch_idx);
        let result = handler(self);
        self.tracer.emit(
            &snapshot,
            self.current_call_frame.gas_remaining,
            result.as_ref().err(),
        );
        result
    }

    fn capture_step(&self, stream_idx: usize) -> StepSnapshot {
        let frame = &self.current_call_frame;
        let origin = frame.plan.origin(stream_idx);
        let memory = self.env.config.trace_memory.then(|| {
            let len = frame.memory.size().min(MEMORY_TRACE_LIMIT);
            frame.memory.slice(0, len).unwrap_or(&[]).to_vec()
        });
        StepSnapshot {
            pc: origin.pc,
            opcode: origin.opcode,
            gas: frame.gas_remaining,
            depth: frame.depth,
            stack: frame.stack.contents().to_vec(),
            memory,
            refund: self.substate.refunded_gas,
        }
    }

    /// Map the raw run result onto the frame's report, applying the gas
    /// rules: REVERT keeps unused gas and output, every other failure
    /// consumes the frame's gas and returns nothing.
    fn finish(&mut self, run_result: Result<(), VMError>) -> Result<ExecutionReport, VMError> {
        let frame = &mut self.current_call_frame;
        let report = match run_result {
            Ok(()) => ExecutionReport {
                result: TxResult::Success,
                gas_used: frame.gas_used(),
                gas_remaining: clamp_gas(frame.gas_remaining),
                output: frame.return_data.clone(),
            },
            Err(error) if error.is_internal() => return Err(error),
            Err(error) => {
                if !error.is_revert() {
                    frame.gas_remaining = 0;
                }
                ExecutionReport {
                    result: TxResult::Revert(error.clone()),
                    gas_used: frame.gas_used(),
                    gas_remaining: clamp_gas(frame.gas_remaining),
                    output: if error.is_revert() {
                        frame.return_data.clone()
                    } else {
                        Bytes::new()
                    },
                }
            }
        };

        debug!(
            success = report.is_success(),
            gas_used = report.gas_used,
            output_len = report.output.len(),
            "frame completed"
        );
        Ok(report)
    }

    // Observation API

    pub fn gas_remaining(&self) -> u64 {
        clamp_gas(self.current_call_frame.gas_remaining)
    }

    /// Initial gas minus remaining, clamped at zero.
    pub fn gas_used(&self) -> u64 {
        self.current_call_frame.gas_used()
    }

    /// Logical bytecode PC of the next instruction to execute.
    pub fn pc(&self) -> usize {
        let frame = &self.current_call_frame;
        frame.plan.origin(frame.stream_idx).pc as usize
    }

    /// Opcode of the next instruction to execute. Synthetic opcodes are
    /// reported as such.
    pub fn current_opcode(&self) -> Opcode {
        let frame = &self.current_call_frame;
        Opcode::from(frame.plan.origin(frame.stream_idx).opcode)
    }

    pub fn bytecode_len(&self) -> usize {
        self.current_call_frame.plan.code().len()
    }

    pub fn stack_size(&self) -> usize {
        self.current_call_frame.stack.len()
    }

    pub fn stack(&self) -> &Stack {
        &self.current_call_frame.stack
    }

    /// Bottom-indexed stack item as a big-endian 32-byte word.
    pub fn stack_item(&self, index: usize) -> Result<[u8; 32], VMError> {
        let word = self.current_call_frame.stack.item(index)?;
        Ok(word.to_big_endian())
    }

    pub fn memory_size(&self) -> usize {
        self.current_call_frame.memory.size()
    }

    pub fn memory_slice(&self, offset: usize, len: usize) -> Result<&[u8], VMError> {
        self.current_call_frame.memory.slice(offset, len)
    }
}

fn clamp_gas(gas: i64) -> u64 {
    u64::try_from(gas.max(0)).unwrap_or(0)
}
