//! Programmatic bytecode construction, used by the tests and the runner's
//! examples.

use crate::opcodes::Opcode;
use bytes::Bytes;
use ethereum_types::U256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Stop,
    Add,
    Mul,
    Sub,
    Div,
    Sdiv,
    Mod,
    Smod,
    Addmod,
    Mulmod,
    Exp,
    SignExtend,
    Lt,
    Gt,
    Slt,
    Sgt,
    Eq,
    IsZero,
    And,
    Or,
    Xor,
    Not,
    Byte,
    Shl,
    Shr,
    Sar,
    Keccak256,
    Pop,
    Mload,
    Mstore,
    Mstore8,
    Jump,
    Jumpi,
    Pc,
    Msize,
    Gas,
    Jumpdest,
    Mcopy,
    Push0,
    /// `(n, value)`: PUSHn with `value`'s low `n` bytes as the immediate.
    Push((u8, U256)),
    Dup(u8),
    Swap(u8),
    Return,
    Revert,
    Invalid,
    SelfDestruct,
}

impl Operation {
    pub fn to_bytecode(&self) -> Bytes {
        match self {
            Operation::Stop => Bytes::copy_from_slice(&[Opcode::STOP.as_u8()]),
            Operation::Add => Bytes::copy_from_slice(&[Opcode::ADD.as_u8()]),
            Operation::Mul => Bytes::copy_from_slice(&[Opcode::MUL.as_u8()]),
            Operation::Sub => Bytes::copy_from_slice(&[Opcode::SUB.as_u8()]),
            Operation::Div => Bytes::copy_from_slice(&[Opcode::DIV.as_u8()]),
            Operation::Sdiv => Bytes::copy_from_slice(&[Opcode::SDIV.as_u8()]),
            Operation::Mod => Bytes::copy_from_slice(&[Opcode::MOD.as_u8()]),
            Operation::Smod => Bytes::copy_from_slice(&[Opcode::SMOD.as_u8()]),
            Operation::Addmod => Bytes::copy_from_slice(&[Opcode::ADDMOD.as_u8()]),
            Operation::Mulmod => Bytes::copy_from_slice(&[Opcode::MULMOD.as_u8()]),
            Operation::Exp => Bytes::copy_from_slice(&[Opcode::EXP.as_u8()]),
            Operation::SignExtend => Bytes::copy_from_slice(&[Opcode::SIGNEXTEND.as_u8()]),
            Operation::Lt => Bytes::copy_from_slice(&[Opcode::LT.as_u8()]),
            Operation::Gt => Bytes::copy_from_slice(&[Opcode::GT.as_u8()]),
            Operation::Slt => Bytes::copy_from_slice(&[Opcode::SLT.as_u8()]),
            Operation::Sgt => Bytes::copy_from_slice(&[Opcode::SGT.as_u8()]),
            Operation::Eq => Bytes::copy_from_slice(&[Opcode::EQ.as_u8()]),
            Operation::IsZero => Bytes::copy_from_slice(&[Opcode::ISZERO.as_u8()]),
            Operation::And => Bytes::copy_from_slice(&[Opcode::AND.as_u8()]),
            Operation::Or => Bytes::copy_from_slice(&[Opcode::OR.as_u8()]),
            Operation::Xor => Bytes::copy_from_slice(&[Opcode::XOR.as_u8()]),
            Operation::Not => Bytes::copy_from_slice(&[Opcode::NOT.as_u8()]),
            Operation::Byte => Bytes::copy_from_slice(&[Opcode::BYTE.as_u8()]),
            Operation::Shl => Bytes::copy_from_slice(&[Opcode::SHL.as_u8()]),
            Operation::Shr => Bytes::copy_from_slice(&[Opcode::SHR.as_u8()]),
            Operation::Sar => Bytes::copy_from_slice(&[Opcode::SAR.as_u8()]),
            Operation::Keccak256 => Bytes::copy_from_slice(&[Opcode::KECCAK256.as_u8()]),
            Operation::Pop => Bytes::copy_from_slice(&[Opcode::POP.as_u8()]),
            Operation::Mload => Bytes::copy_from_slice(&[Opcode::MLOAD.as_u8()]),
            Operation::Mstore => Bytes::copy_from_slice(&[Opcode::MSTORE.as_u8()]),
            Operation::Mstore8 => Bytes::copy_from_slice(&[Opcode::MSTORE8.as_u8()]),
            Operation::Jump => Bytes::copy_from_slice(&[Opcode::JUMP.as_u8()]),
            Operation::Jumpi => Bytes::copy_from_slice(&[Opcode::JUMPI.as_u8()]),
            Operation::Pc => Bytes::copy_from_slice(&[Opcode::PC.as_u8()]),
            Operation::Msize => Bytes::copy_from_slice(&[Opcode::MSIZE.as_u8()]),
            Operation::Gas => Bytes::copy_from_slice(&[Opcode::GAS.as_u8()]),
            Operation::Jumpdest => Bytes::copy_from_slice(&[Opcode::JUMPDEST.as_u8()]),
            Operation::Mcopy => Bytes::copy_from_slice(&[Opcode::MCOPY.as_u8()]),
            Operation::Push0 => Bytes::copy_from_slice(&[Opcode::PUSH0.as_u8()]),
            Operation::Push((n_bytes, value)) => {
                let n_bytes = (*n_bytes).clamp(1, 32);
                let word = value.to_big_endian();
                let mut bytes = vec![Opcode::PUSH1.as_u8() + n_bytes - 1];
                bytes.extend_from_slice(&word[32 - n_bytes as usize..]);
                Bytes::from(bytes)
            }
            Operation::Dup(depth) => {
                let depth = (*depth).clamp(1, 16);
                Bytes::copy_from_slice(&[Opcode::DUP1.as_u8() + depth - 1])
            }
            Operation::Swap(depth) => {
                let depth = (*depth).clamp(1, 16);
                Bytes::copy_from_slice(&[Opcode::SWAP1.as_u8() + depth - 1])
            }
            Operation::Return => Bytes::copy_from_slice(&[Opcode::RETURN.as_u8()]),
            Operation::Revert => Bytes::copy_from_slice(&[Opcode::REVERT.as_u8()]),
            Operation::Invalid => Bytes::copy_from_slice(&[Opcode::INVALID.as_u8()]),
            Operation::SelfDestruct => Bytes::copy_from_slice(&[Opcode::SELFDESTRUCT.as_u8()]),
        }
    }
}
