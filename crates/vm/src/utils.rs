//! Helpers for assembling programs and VMs, shared by tests and tooling.

use crate::{
    environment::EVMConfig,
    errors::VMError,
    operations::Operation,
    vm::VM,
};
use bytes::Bytes;

pub const TEST_INITIAL_GAS: u64 = 1_000_000;

pub fn ops_to_bytecode(operations: &[Operation]) -> Bytes {
    operations
        .iter()
        .flat_map(|operation| operation.to_bytecode())
        .collect::<Bytes>()
}

pub fn new_vm_with_ops(operations: &[Operation]) -> Result<VM, VMError> {
    new_vm_with_ops_and_gas(operations, TEST_INITIAL_GAS)
}

pub fn new_vm_with_ops_and_gas(operations: &[Operation], gas: u64) -> Result<VM, VMError> {
    VM::new(ops_to_bytecode(operations), gas, EVMConfig::default())
}

pub fn new_vm_with_ops_and_config(
    operations: &[Operation],
    gas: u64,
    config: EVMConfig,
) -> Result<VM, VMError> {
    VM::new(ops_to_bytecode(operations), gas, config)
}
