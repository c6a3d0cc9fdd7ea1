//! Raw bytecode plus the jump-destination analysis derived from it.
//!
//! A single linear scan classifies every byte as either the first byte of an
//! instruction or immediate data of a preceding PUSH. A 0x5B inside PUSH
//! immediate data is never a valid jump target, so JUMPDEST marking depends
//! on the same scan.

use crate::{errors::VMError, opcodes::Opcode};
use bitvec::prelude::*;
use bytes::Bytes;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code {
    bytes: Bytes,
    op_starts: BitVec,
    jumpdests: BitVec,
}

impl Code {
    /// Scan `bytes` once, marking opcode starts and valid JUMPDESTs.
    ///
    /// A PUSH whose immediate runs past the end of the code is allowed; the
    /// missing bytes read as zero when the value is materialized.
    pub fn analyze(bytes: Bytes, max_bytecode_size: usize) -> Result<Self, VMError> {
        if bytes.len() > max_bytecode_size {
            return Err(VMError::BytecodeTooLarge);
        }

        let mut op_starts = bitvec![0; bytes.len()];
        let mut jumpdests = bitvec![0; bytes.len()];

        let mut pc = 0;
        while pc < bytes.len() {
            let opcode = Opcode::from(bytes[pc]);
            op_starts.set(pc, true);
            if opcode == Opcode::JUMPDEST {
                jumpdests.set(pc, true);
            }
            // Immediate bytes stay unmarked whatever their value.
            pc += 1 + opcode.push_len();
        }

        Ok(Self {
            bytes,
            op_starts,
            jumpdests,
        })
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// True iff byte `pc` starts an instruction (is not PUSH immediate data).
    pub fn is_op_start(&self, pc: usize) -> bool {
        self.op_starts.get(pc).is_some_and(|bit| *bit)
    }

    /// True iff `pc` is a JUMPDEST that is also an instruction start.
    pub fn is_jumpdest(&self, pc: usize) -> bool {
        self.jumpdests.get(pc).is_some_and(|bit| *bit)
    }

    /// The `count` immediate bytes following the PUSH at `pc`, zero-extended
    /// past the end of the code.
    pub fn immediate(&self, pc: usize, count: usize) -> [u8; 32] {
        let count = count.min(32);
        let mut buffer = [0u8; 32];
        let start = pc + 1;
        for i in 0..count {
            buffer[32 - count + i] = self.bytes.get(start + i).copied().unwrap_or(0);
        }
        buffer
    }
}
