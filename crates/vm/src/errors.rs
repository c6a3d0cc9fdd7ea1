//! Error taxonomy of the interpreter.
//!
//! Errors partition into execution errors ([`VMError`] variants produced by
//! running bytecode, which complete the frame with a revert outcome) and
//! programming errors ([`InternalError`], which indicate a bug and propagate
//! as hard failures). The stable integer mapping used at the external
//! boundary lives in [`ErrorCode`].

use bytes::Bytes;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VMError {
    #[error("Stack underflow")]
    StackUnderflow,
    #[error("Stack overflow")]
    StackOverflow,
    #[error("Out of gas")]
    OutOfGas,
    #[error("Invalid jump destination")]
    InvalidJump,
    #[error("Invalid opcode")]
    InvalidOpcode,
    #[error("Out of bounds access")]
    OutOfBounds,
    #[error("Offset or size does not fit a machine word")]
    VeryLargeNumber,
    #[error("Bytecode larger than the configured maximum")]
    BytecodeTooLarge,
    #[error("Memory limit reached")]
    MemoryLimitReached,
    #[error("Max call depth reached")]
    MaxCallDepthReached,
    #[error("Revert opcode")]
    RevertOpcode,
    #[error("Internal error: {0}")]
    Internal(#[from] InternalError),
}

impl VMError {
    /// Internal errors are bugs and must not be reported as a frame outcome.
    pub fn is_internal(&self) -> bool {
        matches!(self, VMError::Internal(_))
    }

    /// REVERT is the only failure that returns output bytes and keeps the
    /// unused gas.
    pub fn is_revert(&self) -> bool {
        matches!(self, VMError::RevertOpcode)
    }
}

/// Failures that can only arise from a malformed plan or a handler consuming
/// the stream out of step. Surfacing one of these is a bug.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InternalError {
    #[error("Stream slot is not a handler")]
    ExpectedHandlerSlot,
    #[error("Stream slot is not an inline value")]
    ExpectedValueSlot,
    #[error("Stream slot is not block metadata")]
    ExpectedBlockSlot,
    #[error("Constant index out of range")]
    ConstantOutOfRange,
    #[error("Arithmetic overflow in gas accounting")]
    GasOverflow,
    #[error("Slipped outside the instruction stream")]
    StreamOutOfBounds,
}

/// Outcome of a completed frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxResult {
    Success,
    Revert(VMError),
}

/// What the caller gets back from [`crate::vm::VM::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    pub result: TxResult,
    pub gas_used: u64,
    pub gas_remaining: u64,
    pub output: Bytes,
}

impl ExecutionReport {
    pub fn is_success(&self) -> bool {
        matches!(self.result, TxResult::Success)
    }
}

/// Stable integer codes for the external boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,
    StackOverflow = 1,
    StackUnderflow = 2,
    OutOfGas = 3,
    InvalidJump = 4,
    InvalidOpcode = 5,
    OutOfBounds = 6,
    AllocationFailed = 7,
    BytecodeTooLarge = 8,
    Stopped = 9,
    NullPointer = 10,
}

impl ErrorCode {
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Human readable description for a boundary code.
    pub const fn describe(self) -> &'static str {
        match self {
            ErrorCode::Success => "success",
            ErrorCode::StackOverflow => "stack overflow",
            ErrorCode::StackUnderflow => "stack underflow",
            ErrorCode::OutOfGas => "out of gas",
            ErrorCode::InvalidJump => "invalid jump destination",
            ErrorCode::InvalidOpcode => "invalid opcode",
            ErrorCode::OutOfBounds => "out of bounds access",
            ErrorCode::AllocationFailed => "allocation failed",
            ErrorCode::BytecodeTooLarge => "bytecode too large",
            ErrorCode::Stopped => "execution stopped",
            ErrorCode::NullPointer => "null pointer",
        }
    }
}

impl From<&VMError> for ErrorCode {
    fn from(error: &VMError) -> Self {
        match error {
            VMError::StackUnderflow => ErrorCode::StackUnderflow,
            VMError::StackOverflow => ErrorCode::StackOverflow,
            VMError::OutOfGas => ErrorCode::OutOfGas,
            VMError::InvalidJump => ErrorCode::InvalidJump,
            VMError::InvalidOpcode => ErrorCode::InvalidOpcode,
            VMError::OutOfBounds | VMError::VeryLargeNumber => ErrorCode::OutOfBounds,
            VMError::BytecodeTooLarge => ErrorCode::BytecodeTooLarge,
            VMError::MemoryLimitReached | VMError::MaxCallDepthReached => {
                ErrorCode::AllocationFailed
            }
            VMError::RevertOpcode => ErrorCode::Stopped,
            VMError::Internal(_) => ErrorCode::NullPointer,
        }
    }
}
