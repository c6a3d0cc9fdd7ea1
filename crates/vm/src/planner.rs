//! Bytecode-to-plan translation.
//!
//! One pass in bytecode order. Every instruction becomes one handler slot,
//! followed by a metadata slot when the opcode carries any (PUSH payloads,
//! the PC value, JUMPDEST block records). Adjacent PUSH+{ADD,MUL,DIV,JUMP,
//! JUMPI} pairs fuse into one synthetic instruction when enabled; fusion
//! never changes observable semantics.
//!
//! Block metadata (summed static gas, entry stack bounds) is computed over
//! the raw bytecode, so fused and unfused plans of the same code charge
//! identically. BEGINBLOCK records are placed at the stream head and on the
//! fall-through side of every JUMPI so that the whole stream is partitioned
//! into checked blocks.

use crate::{
    code::Code,
    constants::MAX_INLINE_PUSH_BYTES,
    errors::VMError,
    opcode_handlers::HandlerTable,
    opcodes::{Opcode, opcode_info},
    plan::{BlockInfo, Plan, StreamElement, StreamOrigin},
};
use ethereum_types::U256;
use rustc_hash::FxHashMap;
use tracing::debug;

/// Opcodes that end a straight-line block.
fn is_block_terminator(opcode: Opcode) -> bool {
    matches!(
        opcode,
        Opcode::JUMP
            | Opcode::JUMPI
            | Opcode::STOP
            | Opcode::RETURN
            | Opcode::REVERT
            | Opcode::INVALID
            | Opcode::SELFDESTRUCT
    )
}

/// The synthetic opcode replacing `PUSHn operation`, if the pair fuses.
fn fused_opcode(operation: Opcode, inline: bool) -> Option<Opcode> {
    let fused = match (operation, inline) {
        (Opcode::ADD, true) => Opcode::PUSH_ADD_INLINE,
        (Opcode::ADD, false) => Opcode::PUSH_ADD_POINTER,
        (Opcode::MUL, true) => Opcode::PUSH_MUL_INLINE,
        (Opcode::MUL, false) => Opcode::PUSH_MUL_POINTER,
        (Opcode::DIV, true) => Opcode::PUSH_DIV_INLINE,
        (Opcode::DIV, false) => Opcode::PUSH_DIV_POINTER,
        (Opcode::JUMP, true) => Opcode::PUSH_JUMP_INLINE,
        (Opcode::JUMP, false) => Opcode::PUSH_JUMP_POINTER,
        (Opcode::JUMPI, true) => Opcode::PUSH_JUMPI_INLINE,
        (Opcode::JUMPI, false) => Opcode::PUSH_JUMPI_POINTER,
        _ => return None,
    };
    Some(fused)
}

pub struct Planner<'h> {
    handlers: &'h HandlerTable,
    fusion: bool,
}

impl<'h> Planner<'h> {
    pub fn new(handlers: &'h HandlerTable, fusion: bool) -> Self {
        Self { handlers, fusion }
    }

    /// Translate analyzed bytecode into a plan. Pure: the same code always
    /// yields the same stream, constants and jump table.
    pub fn plan(&self, code: Code) -> Result<Plan, VMError> {
        let mut emitter = Emitter {
            handlers: self.handlers,
            stream: Vec::new(),
            constants: Vec::new(),
            jump_table: FxHashMap::default(),
            origins: Vec::new(),
        };

        // Frame entry runs the same block validation a JUMPDEST does.
        emitter.emit_block_entry(&code, 0);

        let bytes = code.bytes().clone();
        let mut pc = 0;
        while pc < bytes.len() {
            let byte = bytes[pc];
            let opcode = Opcode::from(byte);

            if opcode.is_push() {
                pc = self.plan_push(&mut emitter, &code, pc, opcode);
                continue;
            }

            match opcode {
                Opcode::JUMPDEST => {
                    emitter.jump_table.insert(pc, emitter.stream.len());
                    emitter.emit_handler(Opcode::JUMPDEST, pc);
                    let block = block_metadata(&code, pc, true);
                    emitter.emit(StreamElement::Block(block), pc, Opcode::JUMPDEST);
                }
                Opcode::PC => {
                    emitter.emit_handler(Opcode::PC, pc);
                    emitter.emit(StreamElement::Value(pc as u64), pc, Opcode::PC);
                }
                Opcode::JUMPI => {
                    emitter.emit_handler(Opcode::JUMPI, pc);
                    // The not-taken path enters a fresh block.
                    emitter.emit_block_entry(&code, pc + 1);
                }
                _ => {
                    // PUSH0 and every other metadata-free opcode, including
                    // unimplemented bytes, which decode to INVALID.
                    emitter.emit_handler(opcode, pc);
                }
            }
            pc += 1;
        }

        // Running off the end of code is an implicit STOP.
        emitter.emit_handler(Opcode::STOP, bytes.len());

        debug!(
            code_len = bytes.len(),
            stream_len = emitter.stream.len(),
            constants = emitter.constants.len(),
            jumpdests = emitter.jump_table.len(),
            fusion = self.fusion,
            "planned bytecode"
        );

        Ok(Plan::new(
            emitter.stream,
            emitter.constants,
            emitter.jump_table,
            emitter.origins,
            code,
        ))
    }

    /// Emit a PUSH, fused with the following operation when possible.
    /// Returns the PC after everything consumed.
    fn plan_push(&self, emitter: &mut Emitter<'_>, code: &Code, pc: usize, push: Opcode) -> usize {
        let count = push.push_len();
        let next_pc = pc + 1 + count;
        let inline = count <= MAX_INLINE_PUSH_BYTES;

        if self.fusion && next_pc < code.len() && code.is_op_start(next_pc) {
            let operation = Opcode::from(code.bytes()[next_pc]);
            if let Some(fused) = fused_opcode(operation, inline) {
                emitter.emit_handler(fused, pc);
                emitter.emit_push_payload(code, pc, count, inline, fused);
                if operation == Opcode::JUMPI {
                    emitter.emit_block_entry(code, next_pc + 1);
                }
                return next_pc + 1;
            }
        }

        emitter.emit_handler(push, pc);
        emitter.emit_push_payload(code, pc, count, inline, push);
        next_pc
    }
}

struct Emitter<'h> {
    handlers: &'h HandlerTable,
    stream: Vec<StreamElement>,
    constants: Vec<U256>,
    jump_table: FxHashMap<usize, usize>,
    origins: Vec<StreamOrigin>,
}

impl Emitter<'_> {
    fn emit(&mut self, element: StreamElement, pc: usize, opcode: Opcode) {
        self.stream.push(element);
        self.origins.push(StreamOrigin {
            pc: pc as u32,
            opcode: opcode.as_u8(),
        });
    }

    fn emit_handler(&mut self, opcode: Opcode, pc: usize) {
        self.emit(
            StreamElement::Handler(self.handlers.handler(opcode.as_u8())),
            pc,
            opcode,
        );
    }

    /// Inline payloads go straight into the slot; anything wider than a
    /// machine word spills to the constants array and the slot stores the
    /// index.
    fn emit_push_payload(
        &mut self,
        code: &Code,
        pc: usize,
        count: usize,
        inline: bool,
        opcode: Opcode,
    ) {
        let immediate = code.immediate(pc, count);
        if inline {
            let mut word = [0u8; 8];
            word.copy_from_slice(&immediate[24..]);
            self.emit(StreamElement::Value(u64::from_be_bytes(word)), pc, opcode);
        } else {
            let index = self.constants.len() as u64;
            self.constants.push(U256::from_big_endian(&immediate));
            self.emit(StreamElement::Value(index), pc, opcode);
        }
    }

    /// `{BEGINBLOCK, Block}` pair for the block starting at `start_pc`.
    fn emit_block_entry(&mut self, code: &Code, start_pc: usize) {
        self.emit_handler(Opcode::BEGINBLOCK, start_pc);
        let block = block_metadata(code, start_pc, false);
        self.emit(StreamElement::Block(block), start_pc, Opcode::BEGINBLOCK);
    }
}

/// Analyze the straight-line block starting at `start_pc`.
///
/// The scan stops at a control-flow boundary; the boundary instruction's
/// cost and arity belong to this block, except a JUMPDEST, which opens (and
/// is charged in) its own block. `leading_jumpdest` is set when `start_pc`
/// itself is the block's JUMPDEST.
fn block_metadata(code: &Code, start_pc: usize, leading_jumpdest: bool) -> BlockInfo {
    let mut base_gas: u64 = 0;
    let mut height: i64 = 0;
    let mut lowest: i64 = 0;
    let mut peak: i64 = 0;

    let mut pc = start_pc;
    while pc < code.len() {
        let byte = code.bytes()[pc];
        let opcode = Opcode::from(byte);

        if opcode == Opcode::JUMPDEST && !(leading_jumpdest && pc == start_pc) {
            break;
        }
        // Unimplemented bytes fault the frame, so nothing after them runs.
        let Some(info) = opcode_info(byte) else {
            break;
        };

        base_gas = base_gas.saturating_add(info.base_gas);
        height -= i64::from(info.stack_inputs);
        lowest = lowest.min(height);
        height += i64::from(info.stack_outputs);
        peak = peak.max(height);

        if is_block_terminator(opcode) {
            break;
        }
        pc += 1 + opcode.push_len();
    }

    BlockInfo {
        base_gas: u32::try_from(base_gas).unwrap_or(u32::MAX),
        min_stack: u16::try_from(-lowest).unwrap_or(u16::MAX),
        max_stack: u16::try_from(peak.max(0)).unwrap_or(u16::MAX),
    }
}
