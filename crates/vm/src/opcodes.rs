//! Opcode identifiers and their static attributes.
//!
//! The range 0xB0..=0xBA is reserved for synthetic opcodes the planner may
//! emit: fused PUSH+operation pairs (inline and pointer variants, depending
//! on whether the PUSH payload fits a stream slot) and BEGINBLOCK, the
//! block-entry check instruction placed at the stream head and on the
//! fall-through side of every JUMPI.

#[derive(Debug, PartialEq, Eq, Clone, Copy, PartialOrd, strum::EnumIter, strum::IntoStaticStr)]
#[allow(non_camel_case_types)]
#[repr(u8)]
pub enum Opcode {
    // Stop and Arithmetic Operations
    STOP = 0x00,
    ADD = 0x01,
    MUL = 0x02,
    SUB = 0x03,
    DIV = 0x04,
    SDIV = 0x05,
    MOD = 0x06,
    SMOD = 0x07,
    ADDMOD = 0x08,
    MULMOD = 0x09,
    EXP = 0x0A,
    SIGNEXTEND = 0x0B,

    // Comparison & Bitwise Logic Operations
    LT = 0x10,
    GT = 0x11,
    SLT = 0x12,
    SGT = 0x13,
    EQ = 0x14,
    ISZERO = 0x15,
    AND = 0x16,
    OR = 0x17,
    XOR = 0x18,
    NOT = 0x19,
    BYTE = 0x1A,
    SHL = 0x1B,
    SHR = 0x1C,
    SAR = 0x1D,

    // KECCAK256
    KECCAK256 = 0x20,

    // Stack, Memory and Flow Operations
    POP = 0x50,
    MLOAD = 0x51,
    MSTORE = 0x52,
    MSTORE8 = 0x53,
    JUMP = 0x56,
    JUMPI = 0x57,
    PC = 0x58,
    MSIZE = 0x59,
    GAS = 0x5A,
    JUMPDEST = 0x5B,
    MCOPY = 0x5E,

    // Push Operations
    PUSH0 = 0x5F,
    PUSH1 = 0x60,
    PUSH2 = 0x61,
    PUSH3 = 0x62,
    PUSH4 = 0x63,
    PUSH5 = 0x64,
    PUSH6 = 0x65,
    PUSH7 = 0x66,
    PUSH8 = 0x67,
    PUSH9 = 0x68,
    PUSH10 = 0x69,
    PUSH11 = 0x6A,
    PUSH12 = 0x6B,
    PUSH13 = 0x6C,
    PUSH14 = 0x6D,
    PUSH15 = 0x6E,
    PUSH16 = 0x6F,
    PUSH17 = 0x70,
    PUSH18 = 0x71,
    PUSH19 = 0x72,
    PUSH20 = 0x73,
    PUSH21 = 0x74,
    PUSH22 = 0x75,
    PUSH23 = 0x76,
    PUSH24 = 0x77,
    PUSH25 = 0x78,
    PUSH26 = 0x79,
    PUSH27 = 0x7A,
    PUSH28 = 0x7B,
    PUSH29 = 0x7C,
    PUSH30 = 0x7D,
    PUSH31 = 0x7E,
    PUSH32 = 0x7F,

    // Duplication Operations
    DUP1 = 0x80,
    DUP2 = 0x81,
    DUP3 = 0x82,
    DUP4 = 0x83,
    DUP5 = 0x84,
    DUP6 = 0x85,
    DUP7 = 0x86,
    DUP8 = 0x87,
    DUP9 = 0x88,
    DUP10 = 0x89,
    DUP11 = 0x8A,
    DUP12 = 0x8B,
    DUP13 = 0x8C,
    DUP14 = 0x8D,
    DUP15 = 0x8E,
    DUP16 = 0x8F,

    // Swap Operations
    SWAP1 = 0x90,
    SWAP2 = 0x91,
    SWAP3 = 0x92,
    SWAP4 = 0x93,
    SWAP5 = 0x94,
    SWAP6 = 0x95,
    SWAP7 = 0x96,
    SWAP8 = 0x97,
    SWAP9 = 0x98,
    SWAP10 = 0x99,
    SWAP11 = 0x9A,
    SWAP12 = 0x9B,
    SWAP13 = 0x9C,
    SWAP14 = 0x9D,
    SWAP15 = 0x9E,
    SWAP16 = 0x9F,

    // Synthetic fused pairs and block entry
    PUSH_ADD_INLINE = 0xB0,
    PUSH_ADD_POINTER = 0xB1,
    PUSH_MUL_INLINE = 0xB2,
    PUSH_MUL_POINTER = 0xB3,
    PUSH_DIV_INLINE = 0xB4,
    PUSH_DIV_POINTER = 0xB5,
    PUSH_JUMP_INLINE = 0xB6,
    PUSH_JUMP_POINTER = 0xB7,
    PUSH_JUMPI_INLINE = 0xB8,
    PUSH_JUMPI_POINTER = 0xB9,
    BEGINBLOCK = 0xBA,

    // System Operations
    RETURN = 0xF3,
    REVERT = 0xFD,
    INVALID = 0xFE,
    SELFDESTRUCT = 0xFF,
}

impl Opcode {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Mnemonic used by the tracer.
    pub fn mnemonic(self) -> &'static str {
        self.into()
    }

    pub const fn is_push(self) -> bool {
        let byte = self as u8;
        byte >= Opcode::PUSH1 as u8 && byte <= Opcode::PUSH32 as u8
    }

    /// Number of immediate bytes following a PUSH1..=PUSH32.
    pub const fn push_len(self) -> usize {
        let byte = self as u8;
        if byte >= Opcode::PUSH1 as u8 && byte <= Opcode::PUSH32 as u8 {
            (byte - Opcode::PUSH1 as u8) as usize + 1
        } else {
            0
        }
    }
}

impl From<u8> for Opcode {
    /// Total mapping: bytes without an implemented handler decode to INVALID.
    fn from(byte: u8) -> Self {
        match byte {
            0x00 => Opcode::STOP,
            0x01 => Opcode::ADD,
            0x02 => Opcode::MUL,
            0x03 => Opcode::SUB,
            0x04 => Opcode::DIV,
            0x05 => Opcode::SDIV,
            0x06 => Opcode::MOD,
            0x07 => Opcode::SMOD,
            0x08 => Opcode::ADDMOD,
            0x09 => Opcode::MULMOD,
            0x0A => Opcode::EXP,
            0x0B => Opcode::SIGNEXTEND,
            0x10 => Opcode::LT,
            0x11 => Opcode::GT,
            0x12 => Opcode::SLT,
            0x13 => Opcode::SGT,
            0x14 => Opcode::EQ,
            0x15 => Opcode::ISZERO,
            0x16 => Opcode::AND,
            0x17 => Opcode::OR,
            0x18 => Opcode::XOR,
            0x19 => Opcode::NOT,
            0x1A => Opcode::BYTE,
            0x1B => Opcode::SHL,
            0x1C => Opcode::SHR,
            0x1D => Opcode::SAR,
            0x20 => Opcode::KECCAK256,
            0x50 => Opcode::POP,
            0x51 => Opcode::MLOAD,
            0x52 => Opcode::MSTORE,
            0x53 => Opcode::MSTORE8,
            0x56 => Opcode::JUMP,
            0x57 => Opcode::JUMPI,
            0x58 => Opcode::PC,
            0x59 => Opcode::MSIZE,
            0x5A => Opcode::GAS,
            0x5B => Opcode::JUMPDEST,
            0x5E => Opcode::MCOPY,
            0x5F => Opcode::PUSH0,
            0x60 => Opcode::PUSH1,
            0x61 => Opcode::PUSH2,
            0x62 => Opcode::PUSH3,
            0x63 => Opcode::PUSH4,
            0x64 => Opcode::PUSH5,
            0x65 => Opcode::PUSH6,
            0x66 => Opcode::PUSH7,
            0x67 => Opcode::PUSH8,
            0x68 => Opcode::PUSH9,
            0x69 => Opcode::PUSH10,
            0x6A => Opcode::PUSH11,
            0x6B => Opcode::PUSH12,
            0x6C => Opcode::PUSH13,
            0x6D => Opcode::PUSH14,
            0x6E => Opcode::PUSH15,
            0x6F => Opcode::PUSH16,
            0x70 => Opcode::PUSH17,
            0x71 => Opcode::PUSH18,
            0x72 => Opcode::PUSH19,
            0x73 => Opcode::PUSH20,
            0x74 => Opcode::PUSH21,
            0x75 => Opcode::PUSH22,
            0x76 => Opcode::PUSH23,
            0x77 => Opcode::PUSH24,
            0x78 => Opcode::PUSH25,
            0x79 => Opcode::PUSH26,
            0x7A => Opcode::PUSH27,
            0x7B => Opcode::PUSH28,
            0x7C => Opcode::PUSH29,
            0x7D => Opcode::PUSH30,
            0x7E => Opcode::PUSH31,
            0x7F => Opcode::PUSH32,
            0x80 => Opcode::DUP1,
            0x81 => Opcode::DUP2,
            0x82 => Opcode::DUP3,
            0x83 => Opcode::DUP4,
            0x84 => Opcode::DUP5,
            0x85 => Opcode::DUP6,
            0x86 => Opcode::DUP7,
            0x87 => Opcode::DUP8,
            0x88 => Opcode::DUP9,
            0x89 => Opcode::DUP10,
            0x8A => Opcode::DUP11,
            0x8B => Opcode::DUP12,
            0x8C => Opcode::DUP13,
            0x8D => Opcode::DUP14,
            0x8E => Opcode::DUP15,
            0x8F => Opcode::DUP16,
            0x90 => Opcode::SWAP1,
            0x91 => Opcode::SWAP2,
            0x92 => Opcode::SWAP3,
            0x93 => Opcode::SWAP4,
            0x94 => Opcode::SWAP5,
            0x95 => Opcode::SWAP6,
            0x96 => Opcode::SWAP7,
            0x97 => Opcode::SWAP8,
            0x98 => Opcode::SWAP9,
            0x99 => Opcode::SWAP10,
            0x9A => Opcode::SWAP11,
            0x9B => Opcode::SWAP12,
            0x9C => Opcode::SWAP13,
            0x9D => Opcode::SWAP14,
            0x9E => Opcode::SWAP15,
            0x9F => Opcode::SWAP16,
            0xB0 => Opcode::PUSH_ADD_INLINE,
            0xB1 => Opcode::PUSH_ADD_POINTER,
            0xB2 => Opcode::PUSH_MUL_INLINE,
            0xB3 => Opcode::PUSH_MUL_POINTER,
            0xB4 => Opcode::PUSH_DIV_INLINE,
            0xB5 => Opcode::PUSH_DIV_POINTER,
            0xB6 => Opcode::PUSH_JUMP_INLINE,
            0xB7 => Opcode::PUSH_JUMP_POINTER,
            0xB8 => Opcode::PUSH_JUMPI_INLINE,
            0xB9 => Opcode::PUSH_JUMPI_POINTER,
            0xBA => Opcode::BEGINBLOCK,
            0xF3 => Opcode::RETURN,
            0xFD => Opcode::REVERT,
            0xFF => Opcode::SELFDESTRUCT,
            _ => Opcode::INVALID,
        }
    }
}

/// Static attributes of one opcode: base gas and stack arity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeInfo {
    pub base_gas: u64,
    pub stack_inputs: u8,
    pub stack_outputs: u8,
}

const fn info(base_gas: u64, stack_inputs: u8, stack_outputs: u8) -> OpcodeInfo {
    OpcodeInfo {
        base_gas,
        stack_inputs,
        stack_outputs,
    }
}

/// Compile-time attribute table, indexed by raw opcode byte.
///
/// Returns `None` for bytes without an implemented handler; the planner
/// treats those as block terminators since executing one faults the frame.
pub const fn opcode_info(byte: u8) -> Option<OpcodeInfo> {
    use crate::constants::gas_cost::*;
    Some(match byte {
        0x00 => info(STOP, 0, 0),
        0x01 => info(ADD, 2, 1),
        0x02 => info(MUL, 2, 1),
        0x03 => info(SUB, 2, 1),
        0x04 => info(DIV, 2, 1),
        0x05 => info(SDIV, 2, 1),
        0x06 => info(MOD, 2, 1),
        0x07 => info(SMOD, 2, 1),
        0x08 => info(ADDMOD, 3, 1),
        0x09 => info(MULMOD, 3, 1),
        0x0A => info(EXP_STATIC, 2, 1),
        0x0B => info(SIGNEXTEND, 2, 1),
        0x10 => info(LT, 2, 1),
        0x11 => info(GT, 2, 1),
        0x12 => info(SLT, 2, 1),
        0x13 => info(SGT, 2, 1),
        0x14 => info(EQ, 2, 1),
        0x15 => info(ISZERO, 1, 1),
        0x16 => info(AND, 2, 1),
        0x17 => info(OR, 2, 1),
        0x18 => info(XOR, 2, 1),
        0x19 => info(NOT, 1, 1),
        0x1A => info(BYTE, 2, 1),
        0x1B => info(SHL, 2, 1),
        0x1C => info(SHR, 2, 1),
        0x1D => info(SAR, 2, 1),
        0x20 => info(KECCAK256_STATIC, 2, 1),
        0x50 => info(POP, 1, 0),
        0x51 => info(MLOAD_STATIC, 1, 1),
        0x52 => info(MSTORE_STATIC, 2, 0),
        0x53 => info(MSTORE8_STATIC, 2, 0),
        0x56 => info(JUMP, 1, 0),
        0x57 => info(JUMPI, 2, 0),
        0x58 => info(PC, 0, 1),
        0x59 => info(MSIZE, 0, 1),
        0x5A => info(GAS, 0, 1),
        0x5B => info(JUMPDEST, 0, 0),
        0x5E => info(MCOPY_STATIC, 3, 0),
        0x5F => info(PUSH0, 0, 1),
        0x60..=0x7F => info(PUSHN, 0, 1),
        byte @ 0x80..=0x8F => {
            // DUPn reads depth n and grows by one.
            let n = byte - 0x7F;
            info(DUPN, n, n + 1)
        }
        byte @ 0x90..=0x9F => {
            // SWAPn touches depth n + 1 and leaves the height unchanged.
            let n = byte - 0x8F;
            info(SWAPN, n + 1, n + 1)
        }
        // Fused pairs carry the combined base gas of both halves.
        0xB0 | 0xB1 => info(PUSHN + ADD, 1, 1),
        0xB2 | 0xB3 => info(PUSHN + MUL, 1, 1),
        0xB4 | 0xB5 => info(PUSHN + DIV, 1, 1),
        0xB6 | 0xB7 => info(PUSHN + JUMP, 0, 0),
        0xB8 | 0xB9 => info(PUSHN + JUMPI, 1, 0),
        0xBA => info(0, 0, 0),
        0xF3 => info(RETURN, 2, 0),
        0xFD => info(REVERT, 2, 0),
        0xFE => info(INVALID, 0, 0),
        0xFF => info(SELFDESTRUCT_STATIC, 1, 0),
        _ => return None,
    })
}
