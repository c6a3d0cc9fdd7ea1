// System Operations (5)
// Opcodes: STOP, RETURN, REVERT, INVALID, SELFDESTRUCT

use super::{OpcodeResult, VM, word_to_address, word_to_usize};
use crate::{constants::gas_cost, errors::VMError};
use bytes::Bytes;

// STOP operation
pub fn op_stop(_vm: &mut VM) -> Result<OpcodeResult, VMError> {
    Ok(OpcodeResult::Halt)
}

// RETURN operation
pub fn op_return(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let frame = &mut vm.current_call_frame;
    let offset = word_to_usize(frame.stack.pop_unchecked())?;
    let size = word_to_usize(frame.stack.pop_unchecked())?;

    let expansion = frame.memory.expansion_cost(offset, size)?;
    frame.consume_gas(expansion)?;

    frame.return_data = Bytes::from(frame.memory.load_range(offset, size)?);
    Ok(OpcodeResult::Halt)
}

// REVERT operation: keeps the output bytes and the unused gas; the error
// variant marks the outcome.
pub fn op_revert(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let frame = &mut vm.current_call_frame;
    let offset = word_to_usize(frame.stack.pop_unchecked())?;
    let size = word_to_usize(frame.stack.pop_unchecked())?;

    let expansion = frame.memory.expansion_cost(offset, size)?;
    frame.consume_gas(expansion)?;

    frame.return_data = Bytes::from(frame.memory.load_range(offset, size)?);
    Err(VMError::RevertOpcode)
}

// INVALID operation, also the handler for every unimplemented byte.
pub fn op_invalid(_vm: &mut VM) -> Result<OpcodeResult, VMError> {
    Err(VMError::InvalidOpcode)
}

// SELFDESTRUCT operation: charges the cold-account surcharge and halts.
// The state effects belong to the host, which is outside this crate.
pub fn op_selfdestruct(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let beneficiary = word_to_address(vm.current_call_frame.stack.pop_unchecked());
    if !vm.substate.is_address_warm(&beneficiary) {
        vm.current_call_frame
            .consume_gas(gas_cost::COLD_ADDRESS_ACCESS)?;
    }
    vm.substate.access_address(beneficiary);
    Ok(OpcodeResult::Halt)
}
