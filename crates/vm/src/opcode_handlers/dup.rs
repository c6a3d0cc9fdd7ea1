// Duplication Operations (16)
// Opcodes: DUP1 .. DUP16

use super::{OpcodeResult, VM};
use crate::errors::VMError;

// DUPn operation: the depth is fixed per instantiation, one handler per
// opcode in the table.
pub fn op_dup<const DEPTH: usize>(vm: &mut VM) -> Result<OpcodeResult, VMError> {
    vm.current_call_frame.stack.dup(DEPTH)?;
    Ok(OpcodeResult::Continue)
}
