// Stack, Memory and Flow Operations (12)
// Opcodes: POP, MLOAD, MSTORE, MSTORE8, JUMP, JUMPI, PC, MSIZE, GAS,
// JUMPDEST, MCOPY, plus the synthetic BEGINBLOCK

use super::{OpcodeResult, VM, word_count, word_to_usize};
use crate::{constants::gas_cost, errors::VMError};
use ethereum_types::U256;

// POP operation
pub fn op_pop(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    vm.current_call_frame.stack.pop_unchecked();
    Ok(OpcodeResult::Continue)
}

// MLOAD operation
pub fn op_mload(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let frame = &mut vm.current_call_frame;
    let offset = word_to_usize(frame.stack.pop_unchecked())?;

    let expansion = frame.memory.expansion_cost(offset, 32)?;
    frame.consume_gas(expansion)?;

    let value = frame.memory.load_word(offset)?;
    frame.stack.push_unchecked(value);
    Ok(OpcodeResult::Continue)
}

// MSTORE operation
pub fn op_mstore(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let frame = &mut vm.current_call_frame;
    let offset = word_to_usize(frame.stack.pop_unchecked())?;
    let value = frame.stack.pop_unchecked();

    let expansion = frame.memory.expansion_cost(offset, 32)?;
    frame.consume_gas(expansion)?;

    frame.memory.store_word(offset, value)?;
    Ok(OpcodeResult::Continue)
}

// MSTORE8 operation
pub fn op_mstore8(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let frame = &mut vm.current_call_frame;
    let offset = word_to_usize(frame.stack.pop_unchecked())?;
    let value = frame.stack.pop_unchecked();

    let expansion = frame.memory.expansion_cost(offset, 1)?;
    frame.consume_gas(expansion)?;

    frame.memory.store_byte(offset, value.byte(0))?;
    Ok(OpcodeResult::Continue)
}

// JUMP operation
pub fn op_jump(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let frame = &mut vm.current_call_frame;
    let target = frame.stack.pop_unchecked();
    frame.stream_idx = frame.plan.resolve_jump(target)?;
    Ok(OpcodeResult::Continue)
}

// JUMPI operation: fall-through lands on the BEGINBLOCK the planner left
// behind this instruction.
pub fn op_jumpi(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let frame = &mut vm.current_call_frame;
    let target = frame.stack.pop_unchecked();
    let condition = frame.stack.pop_unchecked();
    if !condition.is_zero() {
        frame.stream_idx = frame.plan.resolve_jump(target)?;
    }
    Ok(OpcodeResult::Continue)
}

// PC operation: the bytecode PC travels in the metadata slot because the
// interpreter itself only sees stream indices.
pub fn op_pc(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let frame = &mut vm.current_call_frame;
    let pc = frame.next_value()?;
    frame.stack.push_unchecked(U256::from(pc));
    Ok(OpcodeResult::Continue)
}

// MSIZE operation
pub fn op_msize(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let frame = &mut vm.current_call_frame;
    let size = frame.memory.size();
    frame.stack.push_unchecked(U256::from(size));
    Ok(OpcodeResult::Continue)
}

// GAS operation: observes gas net of the whole current block's static cost.
pub fn op_gas(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let frame = &mut vm.current_call_frame;
    let remaining = u64::try_from(frame.gas_remaining.max(0)).unwrap_or(0);
    frame.stack.push_unchecked(U256::from(remaining));
    Ok(OpcodeResult::Continue)
}

// JUMPDEST operation: charges its block and validates the stack bounds.
pub fn op_jumpdest(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let frame = &mut vm.current_call_frame;
    let block = frame.next_block()?;
    frame.enter_block(block)?;
    Ok(OpcodeResult::Continue)
}

// BEGINBLOCK synthetic: same checks as JUMPDEST, placed at stream head and
// on JUMPI fall-through paths.
pub fn op_begin_block(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let frame = &mut vm.current_call_frame;
    let block = frame.next_block()?;
    frame.enter_block(block)?;
    Ok(OpcodeResult::Continue)
}

// MCOPY operation
pub fn op_mcopy(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let frame = &mut vm.current_call_frame;
    let dst = word_to_usize(frame.stack.pop_unchecked())?;
    let src = word_to_usize(frame.stack.pop_unchecked())?;
    let len = word_to_usize(frame.stack.pop_unchecked())?;
    if len == 0 {
        return Ok(OpcodeResult::Continue);
    }

    let expansion = frame.memory.expansion_cost(dst.max(src), len)?;
    let dynamic = gas_cost::MCOPY_DYNAMIC_BASE.saturating_mul(word_count(len));
    frame.consume_gas(expansion.saturating_add(dynamic))?;

    frame.memory.copy_within(src, dst, len)?;
    Ok(OpcodeResult::Continue)
}
