// Swap Operations (16)
// Opcodes: SWAP1 .. SWAP16

use super::{OpcodeResult, VM};
use crate::errors::VMError;

// SWAPn operation
pub fn op_swap<const DEPTH: usize>(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    vm.current_call_frame.stack.swap(DEPTH)?;
    Ok(OpcodeResult::Continue)
}
