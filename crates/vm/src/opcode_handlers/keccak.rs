// KECCAK256 (1)

use super::{OpcodeResult, VM, word_count, word_to_usize};
use crate::{constants::gas_cost, errors::VMError};
use ethereum_types::U256;
use sha3::{Digest, Keccak256};

// KECCAK256 operation: hash a memory range.
pub fn op_keccak256(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    let frame = &mut vm.current_call_frame;
    let offset = word_to_usize(frame.stack.pop_unchecked())?;
    let size = word_to_usize(frame.stack.pop_unchecked())?;

    let expansion = frame.memory.expansion_cost(offset, size)?;
    let dynamic = gas_cost::KECCAK256_DYNAMIC_BASE.saturating_mul(word_count(size));
    frame.consume_gas(expansion.saturating_add(dynamic))?;

    let data = frame.memory.load_range(offset, size)?;
    let digest = Keccak256::digest(&data);
    frame
        .stack
        .push_unchecked(U256::from_big_endian(&digest));
    Ok(OpcodeResult::Continue)
}
