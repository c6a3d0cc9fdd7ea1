// Comparison & Bitwise Logic Operations (14)
// Opcodes: LT, GT, SLT, SGT, EQ, ISZERO, AND, OR, XOR, NOT, BYTE, SHL, SHR, SAR

use super::{OpcodeResult, VM, arithmetic::is_negative};
use crate::errors::VMError;
use ethereum_types::U256;

fn bool_to_word(condition: bool) -> U256 {
    if condition { U256::one() } else { U256::zero() }
}

// LT operation
pub fn op_lt(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let stack = &mut vm.current_call_frame.stack;
    let lho = stack.pop_unchecked();
    let rho = stack.pop_unchecked();
    stack.push_unchecked(bool_to_word(lho < rho));
    Ok(OpcodeResult::Continue)
}

// GT operation
pub fn op_gt(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let stack = &mut vm.current_call_frame.stack;
    let lho = stack.pop_unchecked();
    let rho = stack.pop_unchecked();
    stack.push_unchecked(bool_to_word(lho > rho));
    Ok(OpcodeResult::Continue)
}

// SLT operation (signed less than)
pub fn op_slt(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let stack = &mut vm.current_call_frame.stack;
    let lho = stack.pop_unchecked();
    let rho = stack.pop_unchecked();
    let result = match (is_negative(lho), is_negative(rho)) {
        (true, false) => true,
        (false, true) => false,
        // Same sign: two's complement ordering matches unsigned ordering.
        _ => lho < rho,
    };
    stack.push_unchecked(bool_to_word(result));
    Ok(OpcodeResult::Continue)
}

// SGT operation (signed greater than)
pub fn op_sgt(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let stack = &mut vm.current_call_frame.stack;
    let lho = stack.pop_unchecked();
    let rho = stack.pop_unchecked();
    let result = match (is_negative(lho), is_negative(rho)) {
        (true, false) => false,
        (false, true) => true,
        _ => lho > rho,
    };
    stack.push_unchecked(bool_to_word(result));
    Ok(OpcodeResult::Continue)
}

// EQ operation
pub fn op_eq(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let stack = &mut vm.current_call_frame.stack;
    let lho = stack.pop_unchecked();
    let rho = stack.pop_unchecked();
    stack.push_unchecked(bool_to_word(lho == rho));
    Ok(OpcodeResult::Continue)
}

// ISZERO operation
pub fn op_iszero(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let stack = &mut vm.current_call_frame.stack;
    let operand = stack.pop_unchecked();
    stack.push_unchecked(bool_to_word(operand.is_zero()));
    Ok(OpcodeResult::Continue)
}

// AND operation
pub fn op_and(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let stack = &mut vm.current_call_frame.stack;
    let lho = stack.pop_unchecked();
    let rho = stack.pop_unchecked();
    stack.push_unchecked(lho & rho);
    Ok(OpcodeResult::Continue)
}

// OR operation
pub fn op_or(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let stack = &mut vm.current_call_frame.stack;
    let lho = stack.pop_unchecked();
    let rho = stack.pop_unchecked();
    stack.push_unchecked(lho | rho);
    Ok(OpcodeResult::Continue)
}

// XOR operation
pub fn op_xor(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let stack = &mut vm.current_call_frame.stack;
    let lho = stack.pop_unchecked();
    let rho = stack.pop_unchecked();
    stack.push_unchecked(lho ^ rho);
    Ok(OpcodeResult::Continue)
}

// NOT operation
pub fn op_not(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let stack = &mut vm.current_call_frame.stack;
    let operand = stack.pop_unchecked();
    stack.push_unchecked(!operand);
    Ok(OpcodeResult::Continue)
}

// BYTE operation: byte `index` of the value, most significant first.
pub fn op_byte(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let stack = &mut vm.current_call_frame.stack;
    let index = stack.pop_unchecked();
    let value = stack.pop_unchecked();
    let result = if index < U256::from(32) {
        U256::from(value.byte(31 - index.low_u64() as usize))
    } else {
        U256::zero()
    };
    stack.push_unchecked(result);
    Ok(OpcodeResult::Continue)
}

// SHL operation
pub fn op_shl(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let stack = &mut vm.current_call_frame.stack;
    let shift = stack.pop_unchecked();
    let value = stack.pop_unchecked();
    let result = if shift < U256::from(256) {
        value << shift.low_u64() as usize
    } else {
        U256::zero()
    };
    stack.push_unchecked(result);
    Ok(OpcodeResult::Continue)
}

// SHR operation
pub fn op_shr(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let stack = &mut vm.current_call_frame.stack;
    let shift = stack.pop_unchecked();
    let value = stack.pop_unchecked();
    let result = if shift < U256::from(256) {
        value >> shift.low_u64() as usize
    } else {
        U256::zero()
    };
    stack.push_unchecked(result);
    Ok(OpcodeResult::Continue)
}

// SAR operation: arithmetic right shift, the sign bit fills in.
pub fn op_sar(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let stack = &mut vm.current_call_frame.stack;
    let shift = stack.pop_unchecked();
    let value = stack.pop_unchecked();

    let negative = is_negative(value);
    let result = if shift >= U256::from(256) {
        if negative { !U256::zero() } else { U256::zero() }
    } else {
        let shift = shift.low_u64() as usize;
        let shifted = value >> shift;
        if negative && shift > 0 {
            // Fill the vacated high bits with ones.
            shifted | (!U256::zero() << (256 - shift))
        } else {
            shifted
        }
    };
    stack.push_unchecked(result);
    Ok(OpcodeResult::Continue)
}
