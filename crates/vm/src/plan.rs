//! Runtime representation of translated bytecode.
//!
//! A plan is a flat stream of word-sized slots. Even positions within an
//! instruction hold the handler, metadata (when the opcode carries any)
//! follows in the next slot. Which shape a slot has is a property of the
//! position and of the opcode the handler was compiled for, so accessors
//! take the expectation from the caller and report a typed internal error
//! on mismatch instead of re-deriving anything at run time.

use crate::{
    code::Code,
    errors::{InternalError, VMError},
    opcode_handlers::OpcodeHandler,
    opcodes::Opcode,
};
use ethereum_types::U256;
use rustc_hash::FxHashMap;

/// Precomputed straight-line block metadata, packed to a stream slot.
///
/// `base_gas` is the summed static cost of the block. `min_stack` is the
/// height the block requires on entry, `max_stack` the peak growth above the
/// entry height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockInfo {
    pub base_gas: u32,
    pub min_stack: u16,
    pub max_stack: u16,
}

/// One stream slot. The tag is implicit in the position: handlers sit at
/// instruction starts, `Value`/`Block` only ever directly after their
/// handler.
#[derive(Debug, Clone, Copy)]
pub enum StreamElement {
    Handler(OpcodeHandler),
    /// Inline PUSH payload, bytecode PC, or constants index.
    Value(u64),
    Block(BlockInfo),
}

/// Maps a stream slot back to the bytecode position and opcode it came from.
/// Metadata slots repeat their instruction's entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamOrigin {
    pub pc: u32,
    pub opcode: u8,
}

#[derive(Debug)]
pub struct Plan {
    pub(crate) stream: Vec<StreamElement>,
    pub(crate) constants: Vec<U256>,
    /// Defined exactly at JUMPDESTs: bytecode PC -> stream index of the
    /// JUMPDEST handler.
    pub(crate) jump_table: FxHashMap<usize, usize>,
    pub(crate) origins: Vec<StreamOrigin>,
    code: Code,
}

impl Plan {
    pub(crate) fn new(
        stream: Vec<StreamElement>,
        constants: Vec<U256>,
        jump_table: FxHashMap<usize, usize>,
        origins: Vec<StreamOrigin>,
        code: Code,
    ) -> Self {
        debug_assert_eq!(stream.len(), origins.len());
        Self {
            stream,
            constants,
            jump_table,
            origins,
            code,
        }
    }

    pub fn code(&self) -> &Code {
        &self.code
    }

    pub fn stream_len(&self) -> usize {
        self.stream.len()
    }

    pub fn constants_len(&self) -> usize {
        self.constants.len()
    }

    /// Fetch the handler at `idx` and step past it.
    #[inline]
    pub fn next_handler(&self, idx: &mut usize) -> Result<OpcodeHandler, VMError> {
        match self.stream.get(*idx) {
            Some(StreamElement::Handler(handler)) => {
                *idx += 1;
                Ok(*handler)
            }
            Some(_) => Err(InternalError::ExpectedHandlerSlot.into()),
            None => Err(InternalError::StreamOutOfBounds.into()),
        }
    }

    /// Fetch the inline value at `idx` and step past it. Only handlers whose
    /// opcode emits a value slot may call this.
    #[inline]
    pub fn value_at(&self, idx: &mut usize) -> Result<u64, VMError> {
        match self.stream.get(*idx) {
            Some(StreamElement::Value(value)) => {
                *idx += 1;
                Ok(*value)
            }
            Some(_) => Err(InternalError::ExpectedValueSlot.into()),
            None => Err(InternalError::StreamOutOfBounds.into()),
        }
    }

    /// Fetch the block metadata at `idx` and step past it.
    #[inline]
    pub fn block_at(&self, idx: &mut usize) -> Result<BlockInfo, VMError> {
        match self.stream.get(*idx) {
            Some(StreamElement::Block(block)) => {
                *idx += 1;
                Ok(*block)
            }
            Some(_) => Err(InternalError::ExpectedBlockSlot.into()),
            None => Err(InternalError::StreamOutOfBounds.into()),
        }
    }

    /// Dereference a spilled PUSH constant.
    #[inline]
    pub fn constant(&self, index: u64) -> Result<&U256, VMError> {
        usize::try_from(index)
            .ok()
            .and_then(|index| self.constants.get(index))
            .ok_or_else(|| InternalError::ConstantOutOfRange.into())
    }

    /// Resolve a dynamic jump target to the stream index of its JUMPDEST.
    ///
    /// Succeeds iff the target is an instruction start that is a JUMPDEST;
    /// anything else (including 0x5B bytes inside PUSH immediates) is an
    /// invalid jump.
    pub fn resolve_jump(&self, target: U256) -> Result<usize, VMError> {
        if target > U256::from(u64::MAX) {
            return Err(VMError::InvalidJump);
        }
        let pc = usize::try_from(target.low_u64()).map_err(|_| VMError::InvalidJump)?;
        match self.jump_table.get(&pc) {
            Some(idx) if self.code.is_jumpdest(pc) => Ok(*idx),
            _ => Err(VMError::InvalidJump),
        }
    }

    /// Bytecode PC and opcode behind a stream index. Past the end of the
    /// stream this reports the terminal STOP sentinel.
    pub fn origin(&self, idx: usize) -> StreamOrigin {
        self.origins
            .get(idx)
            .or_else(|| self.origins.last())
            .copied()
            .unwrap_or(StreamOrigin {
                pc: 0,
                opcode: Opcode::STOP.as_u8(),
            })
    }

    /// Human readable listing of the translated stream, one instruction per
    /// line with its bytecode PC, stream index and decoded metadata.
    pub fn disassembly(&self) -> String {
        use std::fmt::Write;

        let mut listing = String::new();
        let mut idx = 0;
        while idx < self.stream.len() {
            let origin = self.origin(idx);
            let opcode = Opcode::from(origin.opcode);
            let _ = write!(
                listing,
                "{:>5}  {:04x}  {}",
                idx,
                origin.pc,
                opcode.mnemonic()
            );

            match self.stream.get(idx + 1) {
                Some(StreamElement::Value(value)) => {
                    if uses_constants_index(opcode) {
                        match self.constant(*value) {
                            Ok(word) => {
                                let _ = write!(listing, " [{value}] = {word:#x}");
                            }
                            Err(_) => {
                                let _ = write!(listing, " [{value}]");
                            }
                        }
                    } else {
                        let _ = write!(listing, " {value:#x}");
                    }
                    idx += 2;
                }
                Some(StreamElement::Block(block)) => {
                    let _ = write!(
                        listing,
                        " gas={} min_stack={} max_stack={}",
                        block.base_gas, block.min_stack, block.max_stack
                    );
                    idx += 2;
                }
                _ => idx += 1,
            }
            listing.push('\n');
        }
        listing
    }
}

/// Whether this opcode's metadata slot is a constants index rather than an
/// inline value.
fn uses_constants_index(opcode: Opcode) -> bool {
    matches!(
        opcode,
        Opcode::PUSH_ADD_POINTER
            | Opcode::PUSH_MUL_POINTER
            | Opcode::PUSH_DIV_POINTER
            | Opcode::PUSH_JUMP_POINTER
            | Opcode::PUSH_JUMPI_POINTER
    ) || (opcode.is_push() && opcode.push_len() > crate::constants::MAX_INLINE_PUSH_BYTES)
}
