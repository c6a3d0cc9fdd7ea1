use bytes::Bytes;
use ethereum_types::U256;
use hex_literal::hex;
use plevm::{
    EVMConfig, Operation, PlanCache, TxResult, VM, VMError,
    errors::ErrorCode,
    opcodes::Opcode,
    utils::{TEST_INITIAL_GAS, new_vm_with_ops, new_vm_with_ops_and_gas, ops_to_bytecode},
};
use std::sync::Arc;

// cargo test -p 'plevm'

fn run_ops(operations: &[Operation]) -> (VM, plevm::ExecutionReport) {
    let mut vm = new_vm_with_ops(operations).unwrap();
    let report = vm.execute().unwrap();
    (vm, report)
}

fn top_of_stack(vm: &mut VM) -> U256 {
    vm.current_call_frame.stack.pop().unwrap()
}

#[test]
fn add_op() {
    let (mut vm, report) = run_ops(&[
        Operation::Push((1, U256::from(5))),
        Operation::Push((1, U256::from(3))),
        Operation::Add,
        Operation::Stop,
    ]);

    assert!(report.is_success());
    assert_eq!(top_of_stack(&mut vm), U256::from(8));
    // PUSH + PUSH + ADD static gas, charged at block entry.
    assert_eq!(report.gas_used, 9);
}

#[test]
fn mul_op() {
    let (mut vm, _) = run_ops(&[
        Operation::Push((1, U256::from(2))),
        Operation::Push((1, U256::from(4))),
        Operation::Mul,
        Operation::Stop,
    ]);

    assert_eq!(top_of_stack(&mut vm), U256::from(8));
}

#[test]
fn sub_op() {
    // 5 - 3 = 2
    let (mut vm, _) = run_ops(&[
        Operation::Push((1, U256::from(3))),
        Operation::Push((1, U256::from(5))),
        Operation::Sub,
        Operation::Stop,
    ]);

    assert_eq!(top_of_stack(&mut vm), U256::from(2));
}

#[test]
fn sub_op_wraps_on_underflow() {
    // 0 - 1 = U256::MAX
    let (mut vm, _) = run_ops(&[
        Operation::Push((1, U256::one())),
        Operation::Push0,
        Operation::Sub,
        Operation::Stop,
    ]);

    assert_eq!(top_of_stack(&mut vm), U256::MAX);
}

#[test]
fn div_op() {
    // 11 / 2 = 5
    let (mut vm, _) = run_ops(&[
        Operation::Push((1, U256::from(2))),
        Operation::Push((1, U256::from(11))),
        Operation::Div,
        Operation::Stop,
    ]);

    assert_eq!(top_of_stack(&mut vm), U256::from(5));

    // In EVM: 10 / 0 = 0
    let (mut vm, _) = run_ops(&[
        Operation::Push((1, U256::zero())),
        Operation::Push((1, U256::from(10))),
        Operation::Div,
        Operation::Stop,
    ]);

    assert_eq!(top_of_stack(&mut vm), U256::zero());
}

#[test]
fn sdiv_op_with_negative_operands() {
    // -6 / 2 = -3
    let minus_six = U256::zero().overflowing_sub(U256::from(6)).0;
    let minus_three = U256::zero().overflowing_sub(U256::from(3)).0;
    let (mut vm, _) = run_ops(&[
        Operation::Push((1, U256::from(2))),
        Operation::Push((32, minus_six)),
        Operation::Sdiv,
        Operation::Stop,
    ]);

    assert_eq!(top_of_stack(&mut vm), minus_three);
}

#[test]
fn modulus_ops() {
    // 10 % 3 = 1
    let (mut vm, _) = run_ops(&[
        Operation::Push((1, U256::from(3))),
        Operation::Push((1, U256::from(10))),
        Operation::Mod,
        Operation::Stop,
    ]);
    assert_eq!(top_of_stack(&mut vm), U256::one());

    // -10 smod 3 = -1: the result takes the dividend's sign.
    let minus_ten = U256::zero().overflowing_sub(U256::from(10)).0;
    let minus_one = U256::MAX;
    let (mut vm, _) = run_ops(&[
        Operation::Push((1, U256::from(3))),
        Operation::Push((32, minus_ten)),
        Operation::Smod,
        Operation::Stop,
    ]);
    assert_eq!(top_of_stack(&mut vm), minus_one);
}

#[test]
fn addmod_and_mulmod_use_wide_intermediates() {
    // (MAX + 2) % 3 == (2^256 + 1) % 3 == 2... computed without truncation.
    let (mut vm, _) = run_ops(&[
        Operation::Push((1, U256::from(3))),
        Operation::Push((1, U256::from(2))),
        Operation::Push((32, U256::MAX)),
        Operation::Addmod,
        Operation::Stop,
    ]);
    // MAX = 2^256 - 1 is divisible by 3, so (MAX + 2) % 3 = 2.
    assert_eq!(top_of_stack(&mut vm), U256::from(2));

    // (MAX * MAX) % 7 without truncation.
    let (mut vm, _) = run_ops(&[
        Operation::Push((1, U256::from(7))),
        Operation::Push((32, U256::MAX)),
        Operation::Push((32, U256::MAX)),
        Operation::Mulmod,
        Operation::Stop,
    ]);
    // MAX = 2^256 - 1 is 1 mod 7, so MAX * MAX is 1 mod 7.
    assert_eq!(top_of_stack(&mut vm), U256::one());
}

#[test]
fn exp_op_charges_per_exponent_byte() {
    // 2^10 = 1024
    let (mut vm, report) = run_ops(&[
        Operation::Push((1, U256::from(10))),
        Operation::Push((1, U256::from(2))),
        Operation::Exp,
        Operation::Stop,
    ]);

    assert_eq!(top_of_stack(&mut vm), U256::from(1024));
    // 3 + 3 + 10 static, plus 50 for the single exponent byte.
    assert_eq!(report.gas_used, 16 + 50);
}

#[test]
fn signextend_op() {
    // Extending 0xFF from byte 0 gives -1.
    let (mut vm, _) = run_ops(&[
        Operation::Push((1, U256::from(0xFF))),
        Operation::Push((1, U256::zero())),
        Operation::SignExtend,
        Operation::Stop,
    ]);
    assert_eq!(top_of_stack(&mut vm), U256::MAX);

    // 0x7F has a clear sign bit: unchanged.
    let (mut vm, _) = run_ops(&[
        Operation::Push((1, U256::from(0x7F))),
        Operation::Push((1, U256::zero())),
        Operation::SignExtend,
        Operation::Stop,
    ]);
    assert_eq!(top_of_stack(&mut vm), U256::from(0x7F));
}

#[test]
fn comparison_ops() {
    // 1 < 2
    let (mut vm, _) = run_ops(&[
        Operation::Push((1, U256::from(2))),
        Operation::Push((1, U256::one())),
        Operation::Lt,
        Operation::Stop,
    ]);
    assert_eq!(top_of_stack(&mut vm), U256::one());

    // 2 > 1
    let (mut vm, _) = run_ops(&[
        Operation::Push((1, U256::one())),
        Operation::Push((1, U256::from(2))),
        Operation::Gt,
        Operation::Stop,
    ]);
    assert_eq!(top_of_stack(&mut vm), U256::one());

    // -1 < 1 signed
    let (mut vm, _) = run_ops(&[
        Operation::Push((1, U256::one())),
        Operation::Push((32, U256::MAX)),
        Operation::Slt,
        Operation::Stop,
    ]);
    assert_eq!(top_of_stack(&mut vm), U256::one());

    // 1 > -1 signed
    let (mut vm, _) = run_ops(&[
        Operation::Push((32, U256::MAX)),
        Operation::Push((1, U256::one())),
        Operation::Sgt,
        Operation::Stop,
    ]);
    assert_eq!(top_of_stack(&mut vm), U256::one());

    // eq and iszero
    let (mut vm, _) = run_ops(&[
        Operation::Push((1, U256::from(7))),
        Operation::Push((1, U256::from(7))),
        Operation::Eq,
        Operation::Stop,
    ]);
    assert_eq!(top_of_stack(&mut vm), U256::one());

    let (mut vm, _) = run_ops(&[
        Operation::Push0,
        Operation::IsZero,
        Operation::Stop,
    ]);
    assert_eq!(top_of_stack(&mut vm), U256::one());
}

#[test]
fn bitwise_ops() {
    let (mut vm, _) = run_ops(&[
        Operation::Push((1, U256::from(0b1100))),
        Operation::Push((1, U256::from(0b1010))),
        Operation::And,
        Operation::Stop,
    ]);
    assert_eq!(top_of_stack(&mut vm), U256::from(0b1000));

    let (mut vm, _) = run_ops(&[
        Operation::Push((1, U256::from(0b1100))),
        Operation::Push((1, U256::from(0b1010))),
        Operation::Or,
        Operation::Stop,
    ]);
    assert_eq!(top_of_stack(&mut vm), U256::from(0b1110));

    let (mut vm, _) = run_ops(&[
        Operation::Push((1, U256::from(0b1100))),
        Operation::Push((1, U256::from(0b1010))),
        Operation::Xor,
        Operation::Stop,
    ]);
    assert_eq!(top_of_stack(&mut vm), U256::from(0b0110));

    let (mut vm, _) = run_ops(&[Operation::Push0, Operation::Not, Operation::Stop]);
    assert_eq!(top_of_stack(&mut vm), U256::MAX);
}

#[test]
fn byte_op() {
    // Byte 31 is the least significant one.
    let (mut vm, _) = run_ops(&[
        Operation::Push((2, U256::from(0xABCD))),
        Operation::Push((1, U256::from(31))),
        Operation::Byte,
        Operation::Stop,
    ]);
    assert_eq!(top_of_stack(&mut vm), U256::from(0xCD));

    // Out of range reads as zero.
    let (mut vm, _) = run_ops(&[
        Operation::Push((2, U256::from(0xABCD))),
        Operation::Push((1, U256::from(32))),
        Operation::Byte,
        Operation::Stop,
    ]);
    assert_eq!(top_of_stack(&mut vm), U256::zero());
}

#[test]
fn shift_ops() {
    let (mut vm, _) = run_ops(&[
        Operation::Push((1, U256::one())),
        Operation::Push((1, U256::from(4))),
        Operation::Shl,
        Operation::Stop,
    ]);
    assert_eq!(top_of_stack(&mut vm), U256::from(16));

    let (mut vm, _) = run_ops(&[
        Operation::Push((1, U256::from(16))),
        Operation::Push((1, U256::from(4))),
        Operation::Shr,
        Operation::Stop,
    ]);
    assert_eq!(top_of_stack(&mut vm), U256::one());

    // Shifts of 256 or more produce zero.
    let (mut vm, _) = run_ops(&[
        Operation::Push((1, U256::one())),
        Operation::Push((2, U256::from(256))),
        Operation::Shl,
        Operation::Stop,
    ]);
    assert_eq!(top_of_stack(&mut vm), U256::zero());

    // SAR keeps the sign.
    let (mut vm, _) = run_ops(&[
        Operation::Push((32, U256::MAX)),
        Operation::Push((1, U256::from(8))),
        Operation::Sar,
        Operation::Stop,
    ]);
    assert_eq!(top_of_stack(&mut vm), U256::MAX);
}

#[test]
fn keccak256_op() {
    // Hash of 32 zero bytes.
    let (mut vm, report) = run_ops(&[
        Operation::Push((1, U256::from(32))),
        Operation::Push((1, U256::zero())),
        Operation::Keccak256,
        Operation::Stop,
    ]);

    let expected = U256::from_big_endian(&hex!(
        "290decd9548b62a8d60345a988386fc84ba6bc95484008f6362f93160ef3e563"
    ));
    assert_eq!(top_of_stack(&mut vm), expected);
    // Static 3 + 3 + 30, dynamic 6 per word + 3 expansion for one word.
    assert_eq!(report.gas_used, 36 + 9);
}

#[test]
fn pop_dup_swap_ops() {
    let (mut vm, _) = run_ops(&[
        Operation::Push((1, U256::from(1))),
        Operation::Push((1, U256::from(2))),
        Operation::Pop,
        Operation::Stop,
    ]);
    assert_eq!(top_of_stack(&mut vm), U256::one());

    let (mut vm, _) = run_ops(&[
        Operation::Push((1, U256::from(1))),
        Operation::Push((1, U256::from(2))),
        Operation::Dup(2),
        Operation::Stop,
    ]);
    assert_eq!(top_of_stack(&mut vm), U256::one());

    let (mut vm, _) = run_ops(&[
        Operation::Push((1, U256::from(1))),
        Operation::Push((1, U256::from(2))),
        Operation::Push((1, U256::from(3))),
        Operation::Swap(2),
        Operation::Stop,
    ]);
    assert_eq!(top_of_stack(&mut vm), U256::one());
    assert_eq!(*vm.current_call_frame.stack.item(0).unwrap(), U256::from(3));
}

#[test]
fn mstore_mload_round_trip() {
    let value = U256::from(0xDEADBEEFu64);
    let (mut vm, _) = run_ops(&[
        Operation::Push((32, value)),
        Operation::Push((1, U256::from(64))),
        Operation::Mstore,
        Operation::Push((1, U256::from(64))),
        Operation::Mload,
        Operation::Stop,
    ]);

    assert_eq!(top_of_stack(&mut vm), value);
    assert_eq!(vm.memory_size(), 96);
}

#[test]
fn mstore8_stores_the_low_byte() {
    let (vm, _) = run_ops(&[
        Operation::Push((2, U256::from(0xAABB))),
        Operation::Push((1, U256::zero())),
        Operation::Mstore8,
        Operation::Stop,
    ]);

    assert_eq!(vm.memory_slice(0, 1).unwrap(), &[0xBB]);
}

#[test]
fn msize_tracks_word_aligned_growth() {
    let (mut vm, _) = run_ops(&[
        Operation::Push((1, U256::zero())),
        Operation::Mload,
        Operation::Pop,
        Operation::Msize,
        Operation::Stop,
    ]);

    assert_eq!(top_of_stack(&mut vm), U256::from(32));
}

#[test]
fn mcopy_moves_memory() {
    let value = U256::from(0x1234);
    let (mut vm, _) = run_ops(&[
        Operation::Push((32, value)),
        Operation::Push((1, U256::zero())),
        Operation::Mstore,
        Operation::Push((1, U256::from(32))), // len
        Operation::Push((1, U256::zero())),   // src
        Operation::Push((1, U256::from(64))), // dst
        Operation::Mcopy,
        Operation::Push((1, U256::from(64))),
        Operation::Mload,
        Operation::Stop,
    ]);

    assert_eq!(top_of_stack(&mut vm), value);
}

#[test]
fn memory_expansion_cost_at_offset_1000() {
    // Writing one byte at offset 1000 grows memory to 1024 bytes and costs
    // 3 * 32 + 32^2 / 512 = 98 on top of the static block cost.
    let (vm, report) = run_ops(&[
        Operation::Push((1, U256::from(0xFF))),
        Operation::Push((2, U256::from(1000))),
        Operation::Mstore8,
        Operation::Stop,
    ]);

    assert_eq!(vm.memory_size(), 1024);
    assert_eq!(report.gas_used, 9 + 98);
}

#[test]
fn pc_op_reports_bytecode_position() {
    let (mut vm, _) = run_ops(&[
        Operation::Push((1, U256::one())),
        Operation::Pop,
        Operation::Pc,
        Operation::Stop,
    ]);

    // PUSH1 is two bytes, POP one: PC sits at 3.
    assert_eq!(top_of_stack(&mut vm), U256::from(3));
}

#[test]
fn gas_op_observes_remaining_gas() {
    let (mut vm, _) = run_ops(&[Operation::Gas, Operation::Stop]);
    // The whole entry block (GAS + STOP) was charged before GAS ran.
    assert_eq!(top_of_stack(&mut vm), U256::from(TEST_INITIAL_GAS - 2));
}

#[test]
fn jump_op() {
    // PUSH1 6, JUMP, JUMPDEST(3), STOP, STOP, JUMPDEST(6), STOP
    let mut vm = VM::new(
        Bytes::copy_from_slice(&hex!("6006565b00005b00")),
        TEST_INITIAL_GAS,
        EVMConfig::default(),
    )
    .unwrap();
    let report = vm.execute().unwrap();

    assert!(report.is_success());
    // PUSH + JUMP, then the JUMPDEST block at 6.
    assert_eq!(report.gas_used, 3 + 8 + 1);
}

#[test]
fn jump_into_push_data_is_invalid() {
    // PUSH1 2, JUMP, PUSH1 0x5B, STOP: PC 2 is the JUMP itself, and the
    // 0x5B at PC 4 is immediate data.
    let mut vm = VM::new(
        Bytes::copy_from_slice(&hex!("600256605b00")),
        TEST_INITIAL_GAS,
        EVMConfig::default(),
    )
    .unwrap();
    let report = vm.execute().unwrap();

    assert!(matches!(
        report.result,
        TxResult::Revert(VMError::InvalidJump)
    ));
    // Exceptional halts consume the frame's gas.
    assert_eq!(report.gas_remaining, 0);
    assert_eq!(report.gas_used, TEST_INITIAL_GAS);
}

#[test]
fn jumpi_not_zero() {
    let operations = [
        Operation::Push((32, U256::one())),
        Operation::Push((32, U256::from(68))),
        Operation::Jumpi,
        Operation::Stop, // should skip this one
        Operation::Jumpdest,
        Operation::Push((32, U256::from(10))),
        Operation::Stop,
    ];
    let (mut vm, report) = run_ops(&operations);

    assert_eq!(top_of_stack(&mut vm), U256::from(10));
    assert_eq!(report.gas_used, 20);
}

#[test]
fn jumpi_for_zero() {
    let operations = [
        Operation::Push((32, U256::from(100))),
        Operation::Push((32, U256::zero())),
        Operation::Push((32, U256::from(100))),
        Operation::Jumpi,
        Operation::Stop,
        Operation::Jumpdest,
        Operation::Push((32, U256::from(10))),
        Operation::Stop,
    ];
    let (mut vm, report) = run_ops(&operations);

    // Condition was zero: fell through to STOP with the first push intact.
    assert_eq!(top_of_stack(&mut vm), U256::from(100));
    assert_eq!(report.gas_used, 3 + 3 + 3 + 10);
}

#[test]
fn jump_position_bigger_than_program_bytecode_size() {
    let operations = [
        Operation::Push((32, U256::from(5000))),
        Operation::Jump,
        Operation::Stop,
    ];
    let (_, report) = run_ops(&operations);

    assert!(matches!(
        report.result,
        TxResult::Revert(VMError::InvalidJump)
    ));
}

#[test]
fn out_of_gas_before_the_first_instruction() {
    let mut vm = new_vm_with_ops_and_gas(
        &[
            Operation::Push((1, U256::from(5))),
            Operation::Push((1, U256::from(3))),
            Operation::Add,
            Operation::Stop,
        ],
        0,
    )
    .unwrap();
    let report = vm.execute().unwrap();

    assert!(matches!(report.result, TxResult::Revert(VMError::OutOfGas)));
    // The block charge failed up front: nothing executed.
    assert!(vm.current_call_frame.stack.is_empty());
    assert_eq!(vm.memory_size(), 0);
}

#[test]
fn stack_underflow_is_caught_at_block_entry() {
    let (_, report) = run_ops(&[Operation::Add, Operation::Stop]);
    assert!(matches!(
        report.result,
        TxResult::Revert(VMError::StackUnderflow)
    ));
}

#[test]
fn stack_overflow_is_caught_at_block_entry() {
    let mut operations = vec![Operation::Push0; 1025];
    operations.push(Operation::Stop);
    let (_, report) = run_ops(&operations);
    assert!(matches!(
        report.result,
        TxResult::Revert(VMError::StackOverflow)
    ));
}

#[test]
fn return_op_copies_memory_out() {
    let value = U256::from(0xCAFE);
    let (_, report) = run_ops(&[
        Operation::Push((32, value)),
        Operation::Push((1, U256::zero())),
        Operation::Mstore,
        Operation::Push((1, U256::from(32))),
        Operation::Push((1, U256::zero())),
        Operation::Return,
    ]);

    assert!(report.is_success());
    assert_eq!(report.output, Bytes::from(value.to_big_endian().to_vec()));
}

#[test]
fn revert_preserves_output_and_unused_gas() {
    let value = U256::from(0xBEEF);
    let (_, report) = run_ops(&[
        Operation::Push((32, value)),
        Operation::Push((1, U256::zero())),
        Operation::Mstore,
        Operation::Push((1, U256::from(32))),
        Operation::Push((1, U256::zero())),
        Operation::Revert,
    ]);

    assert!(matches!(
        report.result,
        TxResult::Revert(VMError::RevertOpcode)
    ));
    assert_eq!(report.output, Bytes::from(value.to_big_endian().to_vec()));
    assert!(report.gas_remaining > 0);
    assert!(report.gas_used < TEST_INITIAL_GAS);
}

#[test]
fn invalid_op_consumes_all_gas() {
    let (_, report) = run_ops(&[Operation::Invalid]);
    assert!(matches!(
        report.result,
        TxResult::Revert(VMError::InvalidOpcode)
    ));
    assert_eq!(report.gas_remaining, 0);
    assert!(report.output.is_empty());
}

#[test]
fn unimplemented_opcode_faults_like_invalid() {
    // 0x54 (SLOAD) has no handler in this build.
    let mut vm = VM::new(
        Bytes::copy_from_slice(&[0x54, 0x00]),
        TEST_INITIAL_GAS,
        EVMConfig::default(),
    )
    .unwrap();
    let report = vm.execute().unwrap();
    assert!(matches!(
        report.result,
        TxResult::Revert(VMError::InvalidOpcode)
    ));
}

#[test]
fn selfdestruct_charges_cold_access_and_halts() {
    let (vm, report) = run_ops(&[
        Operation::Push((1, U256::from(0xAA))),
        Operation::SelfDestruct,
        Operation::Stop, // unreachable
    ]);

    assert!(report.is_success());
    // PUSH + SELFDESTRUCT static, plus the cold account surcharge.
    assert_eq!(report.gas_used, 3 + 5000 + 2600);
    let beneficiary = ethereum_types::Address::from_low_u64_be(0xAA);
    assert!(vm.substate.is_address_warm(&beneficiary));
}

#[test]
fn gas_usage_is_monotone_across_a_loop() {
    // JUMPDEST, PUSH1 0, JUMP: loops until gas runs out.
    let mut vm = VM::new(
        Bytes::copy_from_slice(&hex!("5b600056")),
        1_000,
        EVMConfig::default(),
    )
    .unwrap();
    let report = vm.execute().unwrap();

    assert!(matches!(report.result, TxResult::Revert(VMError::OutOfGas)));
    assert_eq!(report.gas_used, 1_000);
}

#[test]
fn fusion_is_observably_equivalent_on_the_raw_pair_program() {
    // PUSH1 10, ADD, PUSH1 11, ADD, STOP needs one stack item on entry, so
    // both renditions fail identically at block validation.
    let raw = Bytes::copy_from_slice(&hex!("600a01600b0100"));
    let fused_config = EVMConfig {
        fusion: true,
        ..Default::default()
    };
    let unfused_config = EVMConfig {
        fusion: false,
        ..Default::default()
    };

    let mut fused_vm = VM::new(raw.clone(), TEST_INITIAL_GAS, fused_config).unwrap();
    let mut unfused_vm = VM::new(raw, TEST_INITIAL_GAS, unfused_config).unwrap();

    let fused = fused_vm.execute().unwrap();
    let unfused = unfused_vm.execute().unwrap();
    assert_eq!(fused, unfused);
}

#[test]
fn fusion_equivalence_on_a_working_program() {
    // PUSH1 0, PUSH1 10, ADD, PUSH1 11, ADD, STOP => 0x15 on top.
    let operations = [
        Operation::Push((1, U256::zero())),
        Operation::Push((1, U256::from(0x0A))),
        Operation::Add,
        Operation::Push((1, U256::from(0x0B))),
        Operation::Add,
        Operation::Stop,
    ];
    let raw = ops_to_bytecode(&operations);

    let fused_config = EVMConfig {
        fusion: true,
        ..Default::default()
    };
    let unfused_config = EVMConfig {
        fusion: false,
        ..Default::default()
    };

    let mut fused_vm = VM::new(raw.clone(), TEST_INITIAL_GAS, fused_config).unwrap();
    let mut unfused_vm = VM::new(raw, TEST_INITIAL_GAS, unfused_config).unwrap();

    let fused = fused_vm.execute().unwrap();
    let unfused = unfused_vm.execute().unwrap();

    assert_eq!(fused, unfused);
    assert_eq!(top_of_stack(&mut fused_vm), U256::from(0x15));
    assert_eq!(top_of_stack(&mut unfused_vm), U256::from(0x15));

    // Each fused pair saves a stream slot over separate push + add.
    assert!(
        fused_vm.current_call_frame.plan.stream_len()
            < unfused_vm.current_call_frame.plan.stream_len()
    );
}

#[test]
fn fused_pointer_variant_handles_wide_operands() {
    // PUSH32 (MAX - 1), fused with ADD through the constants array.
    let operations = [
        Operation::Push((1, U256::one())),
        Operation::Push((32, U256::MAX.overflowing_sub(U256::one()).0)),
        Operation::Add,
        Operation::Stop,
    ];
    let (mut vm, _) = run_ops(&operations);
    assert_eq!(top_of_stack(&mut vm), U256::MAX);
    assert!(vm.current_call_frame.plan.constants_len() > 0);
}

#[test]
fn fused_jump_takes_the_immediate_target() {
    // PUSH1 4, JUMP, INVALID, JUMPDEST, PUSH1 7, STOP
    let mut vm = VM::new(
        Bytes::copy_from_slice(&hex!("600456fe5b600700")),
        TEST_INITIAL_GAS,
        EVMConfig::default(),
    )
    .unwrap();
    let report = vm.execute().unwrap();

    assert!(report.is_success());
    assert_eq!(top_of_stack(&mut vm), U256::from(7));
}

#[test]
fn observation_api_reports_frame_state() {
    let operations = [
        Operation::Push((1, U256::from(21))),
        Operation::Push((1, U256::from(2))),
        Operation::Mul,
        Operation::Stop,
    ];
    let (vm, _) = run_ops(&operations);

    assert_eq!(vm.bytecode_len(), 6);
    assert_eq!(vm.stack_size(), 1);

    let item = vm.stack_item(0).unwrap();
    assert_eq!(item[31], 42);
    assert_eq!(&item[..31], &[0u8; 31]);

    assert_eq!(vm.gas_used() + vm.gas_remaining(), TEST_INITIAL_GAS);
}

#[test]
fn reset_reruns_the_same_plan() {
    let operations = [
        Operation::Push((1, U256::from(5))),
        Operation::Push((1, U256::from(3))),
        Operation::Add,
        Operation::Stop,
    ];
    let mut vm = new_vm_with_ops(&operations).unwrap();

    let first = vm.execute().unwrap();
    vm.reset(TEST_INITIAL_GAS);
    assert_eq!(vm.gas_used(), 0);
    let second = vm.execute().unwrap();

    assert_eq!(first, second);
}

#[test]
fn cached_plans_are_shared_between_frames() {
    let code = ops_to_bytecode(&[
        Operation::Push((1, U256::one())),
        Operation::Pop,
        Operation::Stop,
    ]);
    let mut cache = PlanCache::new(8);

    let vm_a = VM::with_cache(&mut cache, code.clone(), TEST_INITIAL_GAS, EVMConfig::default())
        .unwrap();
    let vm_b =
        VM::with_cache(&mut cache, code, TEST_INITIAL_GAS, EVMConfig::default()).unwrap();

    assert_eq!(cache.len(), 1);
    assert!(Arc::ptr_eq(
        &vm_a.current_call_frame.plan,
        &vm_b.current_call_frame.plan
    ));
}

#[test]
fn error_codes_map_outcomes_for_the_boundary() {
    let (_, report) = run_ops(&[Operation::Add, Operation::Stop]);
    let TxResult::Revert(error) = &report.result else {
        panic!("expected a revert outcome");
    };
    assert_eq!(ErrorCode::from(error).code(), 2);
    assert_eq!(ErrorCode::from(error).describe(), "stack underflow");
}

#[test]
fn current_opcode_tracks_the_next_instruction() {
    let operations = [Operation::Push((1, U256::one())), Operation::Stop];
    let vm = new_vm_with_ops(&operations).unwrap();
    // Before execution the next instruction is the entry block check.
    assert_eq!(vm.current_opcode(), Opcode::BEGINBLOCK);
    assert_eq!(vm.pc(), 0);
}
