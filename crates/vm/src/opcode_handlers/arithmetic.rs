// Arithmetic Operations (11)
// Opcodes: ADD, SUB, MUL, DIV, SDIV, MOD, SMOD, ADDMOD, MULMOD, EXP, SIGNEXTEND

use super::{OpcodeResult, VM};
use crate::{constants::gas_cost, errors::VMError};
use ethereum_types::{U256, U512};

// ADD operation
pub fn op_add(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let stack = &mut vm.current_call_frame.stack;
    let augend = stack.pop_unchecked();
    let addend = stack.pop_unchecked();
    stack.push_unchecked(augend.overflowing_add(addend).0);
    Ok(OpcodeResult::Continue)
}

// SUB operation
pub fn op_sub(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let stack = &mut vm.current_call_frame.stack;
    let minuend = stack.pop_unchecked();
    let subtrahend = stack.pop_unchecked();
    stack.push_unchecked(minuend.overflowing_sub(subtrahend).0);
    Ok(OpcodeResult::Continue)
}

// MUL operation
pub fn op_mul(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let stack = &mut vm.current_call_frame.stack;
    let multiplicand = stack.pop_unchecked();
    let multiplier = stack.pop_unchecked();
    stack.push_unchecked(multiplicand.overflowing_mul(multiplier).0);
    Ok(OpcodeResult::Continue)
}

// DIV operation
pub fn op_div(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let stack = &mut vm.current_call_frame.stack;
    let dividend = stack.pop_unchecked();
    let divisor = stack.pop_unchecked();
    let quotient = if divisor.is_zero() {
        U256::zero()
    } else {
        dividend / divisor
    };
    stack.push_unchecked(quotient);
    Ok(OpcodeResult::Continue)
}

// SDIV operation
pub fn op_sdiv(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let stack = &mut vm.current_call_frame.stack;
    let dividend = stack.pop_unchecked();
    let divisor = stack.pop_unchecked();
    if divisor.is_zero() {
        stack.push_unchecked(U256::zero());
        return Ok(OpcodeResult::Continue);
    }

    let dividend_is_negative = is_negative(dividend);
    let divisor_is_negative = is_negative(divisor);
    let dividend = abs(dividend);
    let divisor = abs(divisor);

    let quotient = dividend / divisor;
    let quotient = if dividend_is_negative ^ divisor_is_negative {
        negate(quotient)
    } else {
        quotient
    };

    stack.push_unchecked(quotient);
    Ok(OpcodeResult::Continue)
}

// MOD operation
pub fn op_modulus(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let stack = &mut vm.current_call_frame.stack;
    let dividend = stack.pop_unchecked();
    let divisor = stack.pop_unchecked();
    let remainder = if divisor.is_zero() {
        U256::zero()
    } else {
        dividend % divisor
    };
    stack.push_unchecked(remainder);
    Ok(OpcodeResult::Continue)
}

// SMOD operation: the result takes the sign of the dividend.
pub fn op_smod(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let stack = &mut vm.current_call_frame.stack;
    let dividend = stack.pop_unchecked();
    let divisor = stack.pop_unchecked();
    if divisor.is_zero() {
        stack.push_unchecked(U256::zero());
        return Ok(OpcodeResult::Continue);
    }

    let dividend_is_negative = is_negative(dividend);
    let remainder = abs(dividend) % abs(divisor);
    let remainder = if dividend_is_negative {
        negate(remainder)
    } else {
        remainder
    };

    stack.push_unchecked(remainder);
    Ok(OpcodeResult::Continue)
}

// ADDMOD operation
pub fn op_addmod(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let stack = &mut vm.current_call_frame.stack;
    let augend = U512::from(stack.pop_unchecked());
    let addend = U512::from(stack.pop_unchecked());
    let divisor = U512::from(stack.pop_unchecked());
    if divisor.is_zero() {
        stack.push_unchecked(U256::zero());
        return Ok(OpcodeResult::Continue);
    }
    let remainder = (augend + addend) % divisor;
    stack.push_unchecked(low_word(remainder));
    Ok(OpcodeResult::Continue)
}

// MULMOD operation
pub fn op_mulmod(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let stack = &mut vm.current_call_frame.stack;
    let multiplicand = U512::from(stack.pop_unchecked());
    let multiplier = U512::from(stack.pop_unchecked());
    let divisor = U512::from(stack.pop_unchecked());
    if divisor.is_zero() {
        stack.push_unchecked(U256::zero());
        return Ok(OpcodeResult::Continue);
    }
    let remainder = (multiplicand * multiplier) % divisor;
    stack.push_unchecked(low_word(remainder));
    Ok(OpcodeResult::Continue)
}

// EXP operation
pub fn op_exp(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let frame = &mut vm.current_call_frame;
    let base = frame.stack.pop_unchecked();
    let exponent = frame.stack.pop_unchecked();

    // 50 gas per byte of exponent on top of the static cost.
    let exponent_bytes = (exponent.bits() as u64).div_ceil(8);
    frame.consume_gas(gas_cost::EXP_DYNAMIC_BASE.saturating_mul(exponent_bytes))?;

    frame
        .stack
        .push_unchecked(base.overflowing_pow(exponent).0);
    Ok(OpcodeResult::Continue)
}

// SIGNEXTEND operation
pub fn op_signextend(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let stack = &mut vm.current_call_frame.stack;
    let byte_size = stack.pop_unchecked();
    let value_to_extend = stack.pop_unchecked();

    if byte_size >= U256::from(31) {
        // Sign byte already at the top; the value is unchanged.
        stack.push_unchecked(value_to_extend);
        return Ok(OpcodeResult::Continue);
    }

    let sign_bit_index = 8 * byte_size.low_u64() as usize + 7;
    let is_negative = value_to_extend.bit(sign_bit_index);
    let sign_bit_mask = (U256::one() << sign_bit_index) - U256::one();
    let result = if is_negative {
        value_to_extend | !sign_bit_mask
    } else {
        value_to_extend & sign_bit_mask
    };
    stack.push_unchecked(result);
    Ok(OpcodeResult::Continue)
}

/// Most significant bit set means negative in two's complement.
pub(super) fn is_negative(value: U256) -> bool {
    value.bit(255)
}

/// Two's complement negation.
pub(super) fn negate(value: U256) -> U256 {
    (!value).overflowing_add(U256::one()).0
}

pub(super) fn abs(value: U256) -> U256 {
    if is_negative(value) {
        negate(value)
    } else {
        value
    }
}

/// Low 256 bits of a 512-bit intermediate; callers guarantee the value fits.
fn low_word(value: U512) -> U256 {
    U256([value.0[0], value.0[1], value.0[2], value.0[3]])
}
