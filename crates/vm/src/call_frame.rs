//! Per-invocation execution state.

use crate::{
    environment::EVMConfig,
    errors::VMError,
    memory::Memory,
    plan::{BlockInfo, Plan},
    stack::Stack,
};
use bytes::Bytes;
use ethereum_types::U256;
use std::sync::Arc;

#[derive(Debug)]
pub struct CallFrame {
    /// Gas the frame was created with.
    pub gas_limit: u64,
    /// Signed so that the out-of-gas condition is simply going negative.
    pub gas_remaining: i64,
    /// Position in the plan's instruction stream, not a bytecode PC.
    pub stream_idx: usize,
    pub stack: Stack,
    pub memory: Memory,
    pub plan: Arc<Plan>,
    /// Output bytes set by RETURN and REVERT.
    pub return_data: Bytes,
    pub depth: usize,
}

impl CallFrame {
    pub fn new(plan: Arc<Plan>, gas_limit: u64, config: &EVMConfig, depth: usize) -> Self {
        Self {
            gas_limit,
            gas_remaining: i64::try_from(gas_limit).unwrap_or(i64::MAX),
            stream_idx: 0,
            stack: Stack::new(config.stack_capacity),
            memory: Memory::new(config.memory_initial_capacity, config.memory_limit),
            plan,
            return_data: Bytes::new(),
            depth,
        }
    }

    /// Rewind to the frame's initial state with a fresh gas budget. The plan
    /// is immutable and stays.
    pub fn reset(&mut self, gas_limit: u64) {
        self.gas_limit = gas_limit;
        self.gas_remaining = i64::try_from(gas_limit).unwrap_or(i64::MAX);
        self.stream_idx = 0;
        self.stack.clear();
        self.memory.clear();
        self.return_data = Bytes::new();
    }

    #[inline]
    pub fn consume_gas(&mut self, amount: u64) -> Result<(), VMError> {
        let amount = i64::try_from(amount).unwrap_or(i64::MAX);
        self.gas_remaining = self.gas_remaining.saturating_sub(amount);
        if self.gas_remaining < 0 {
            return Err(VMError::OutOfGas);
        }
        Ok(())
    }

    /// Up-front charge and stack validation when entering a block. After
    /// this passes, handlers inside the block skip base gas and stack arity
    /// checks.
    pub fn enter_block(&mut self, block: BlockInfo) -> Result<(), VMError> {
        self.consume_gas(u64::from(block.base_gas))?;
        let height = self.stack.len();
        if height < usize::from(block.min_stack) {
            return Err(VMError::StackUnderflow);
        }
        if height + usize::from(block.max_stack) > self.stack.capacity() {
            return Err(VMError::StackOverflow);
        }
        Ok(())
    }

    /// Consume this instruction's metadata slot as an inline value.
    #[inline]
    pub fn next_value(&mut self) -> Result<u64, VMError> {
        self.plan.value_at(&mut self.stream_idx)
    }

    /// Consume this instruction's metadata slot as block metadata.
    #[inline]
    pub fn next_block(&mut self) -> Result<BlockInfo, VMError> {
        self.plan.block_at(&mut self.stream_idx)
    }

    /// Dereference a spilled PUSH constant.
    #[inline]
    pub fn constant(&self, index: u64) -> Result<U256, VMError> {
        self.plan.constant(index).copied()
    }

    /// Gas spent so far, clamped at zero for failed frames.
    pub fn gas_used(&self) -> u64 {
        let remaining = u64::try_from(self.gas_remaining.max(0)).unwrap_or(0);
        self.gas_limit.saturating_sub(remaining)
    }
}
