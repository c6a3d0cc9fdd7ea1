// Synthetic fused PUSH+operation pairs (10)
//
// The planner substitutes these for adjacent PUSH+{ADD,MUL,DIV,JUMP,JUMPI}
// pairs. Inline variants read the PUSH payload from the metadata slot,
// pointer variants dereference the constants array. Arithmetic variants
// rewrite the top of the stack in place, eliminating the push/pop pair; the
// jump variants never touch the stack for the target at all.

use super::{OpcodeResult, VM};
use crate::errors::VMError;
use ethereum_types::U256;

fn inline_operand(vm: &mut VM) -> Result<U256, VMError> {
    let value = vm.current_call_frame.next_value()?;
    Ok(U256::from(value))
}

fn pointer_operand(vm: &mut VM) -> Result<U256, VMError> {
    let index = vm.current_call_frame.next_value()?;
    vm.current_call_frame.constant(index)
}

fn fused_add(vm: &mut VM, operand: U256) -> Result<OpcodeResult, VMError> {
    let top = vm.current_call_frame.stack.peek_mut()?;
    *top = operand.overflowing_add(*top).0;
    Ok(OpcodeResult::Continue)
}

fn fused_mul(vm: &mut VM, operand: U256) -> Result<OpcodeResult, VMError> {
    let top = vm.current_call_frame.stack.peek_mut()?;
    *top = operand.overflowing_mul(*top).0;
    Ok(OpcodeResult::Continue)
}

// The pushed value is the dividend: `PUSH x; DIV` computes x / top.
fn fused_div(vm: &mut VM, operand: U256) -> Result<OpcodeResult, VMError> {
    let top = vm.current_call_frame.stack.peek_mut()?;
    *top = if top.is_zero() {
        U256::zero()
    } else {
        operand / *top
    };
    Ok(OpcodeResult::Continue)
}

fn fused_jump(vm: &mut VM, target: U256) -> Result<OpcodeResult, VMError> {
    let frame = &mut vm.current_call_frame;
    frame.stream_idx = frame.plan.resolve_jump(target)?;
    Ok(OpcodeResult::Continue)
}

fn fused_jumpi(vm: &mut VM, target: U256) -> Result<OpcodeResult, VMError> {
    let frame = &mut vm.current_call_frame;
    let condition = frame.stack.pop_unchecked();
    if !condition.is_zero() {
        frame.stream_idx = frame.plan.resolve_jump(target)?;
    }
    Ok(OpcodeResult::Continue)
}

pub fn op_push_add_inline(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let operand = inline_operand(vm)?;
    fused_add(vm, operand)
}

pub fn op_push_add_pointer(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let operand = pointer_operand(vm)?;
    fused_add(vm, operand)
}

pub fn op_push_mul_inline(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let operand = inline_operand(vm)?;
    fused_mul(vm, operand)
}

pub fn op_push_mul_pointer(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let operand = pointer_operand(vm)?;
    fused_mul(vm, operand)
}

pub fn op_push_div_inline(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let operand = inline_operand(vm)?;
    fused_div(vm, operand)
}

pub fn op_push_div_pointer(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let operand = pointer_operand(vm)?;
    fused_div(vm, operand)
}

pub fn op_push_jump_inline(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let target = inline_operand(vm)?;
    fused_jump(vm, target)
}

pub fn op_push_jump_pointer(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let target = pointer_operand(vm)?;
    fused_jump(vm, target)
}

pub fn op_push_jumpi_inline(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let target = inline_operand(vm)?;
    fused_jumpi(vm, target)
}

pub fn op_push_jumpi_pointer(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let target = pointer_operand(vm)?;
    fused_jumpi(vm, target)
}
