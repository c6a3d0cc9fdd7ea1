//! Construction-time configuration.
//!
//! A VM instance is specialized for its configuration when it is built;
//! nothing on the hot path re-reads these fields per instruction.

use crate::constants::{
    DEFAULT_MAX_BYTECODE_SIZE, DEFAULT_MAX_CALL_DEPTH, DEFAULT_MAX_INPUT_SIZE,
    DEFAULT_MEMORY_INITIAL_CAPACITY, DEFAULT_MEMORY_LIMIT, DEFAULT_STACK_CAPACITY,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EVMConfig {
    pub max_call_depth: usize,
    pub max_input_size: usize,
    pub stack_capacity: usize,
    pub max_bytecode_size: usize,
    pub memory_initial_capacity: usize,
    pub memory_limit: usize,
    /// Include a memory prefix in step traces.
    pub trace_memory: bool,
    /// Let the planner fuse PUSH+operation pairs.
    pub fusion: bool,
}

impl Default for EVMConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            max_input_size: DEFAULT_MAX_INPUT_SIZE,
            stack_capacity: DEFAULT_STACK_CAPACITY,
            max_bytecode_size: DEFAULT_MAX_BYTECODE_SIZE,
            memory_initial_capacity: DEFAULT_MEMORY_INITIAL_CAPACITY,
            memory_limit: DEFAULT_MEMORY_LIMIT,
            trace_memory: false,
            fusion: true,
        }
    }
}

/// Frame-independent execution context.
#[derive(Debug, Clone)]
pub struct Environment {
    pub initial_gas: u64,
    pub config: EVMConfig,
}

impl Environment {
    pub fn new(initial_gas: u64, config: EVMConfig) -> Self {
        Self {
            initial_gas,
            config,
        }
    }
}
