// Push Operations (33)
// Opcodes: PUSH0, PUSH1 .. PUSH32

use super::{OpcodeResult, VM};
use crate::errors::VMError;
use ethereum_types::U256;

// PUSH0 operation
pub fn op_push0(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    vm.current_call_frame.stack.push_unchecked(U256::zero());
    Ok(OpcodeResult::Continue)
}

// PUSH1..=PUSH8: the payload sits inline in the metadata slot.
pub fn op_push_inline(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let frame = &mut vm.current_call_frame;
    let value = frame.next_value()?;
    frame.stack.push_unchecked(U256::from(value));
    Ok(OpcodeResult::Continue)
}

// PUSH9..=PUSH32: the metadata slot holds a constants index.
pub fn op_push_pointer(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let frame = &mut vm.current_call_frame;
    let index = frame.next_value()?;
    let value = frame.constant(index)?;
    frame.stack.push_unchecked(value);
    Ok(OpcodeResult::Continue)
}
