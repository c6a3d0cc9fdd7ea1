//! Command line runner: execute hex bytecode through the plevm interpreter.

use clap::Parser;
use plevm::{EVMConfig, ErrorCode, TxResult, VM, tracing::StepTracer};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "plevm", about = "Run EVM bytecode through the plan interpreter")]
struct Cli {
    /// Bytecode as hex, with or without a 0x prefix.
    #[arg(long)]
    code: String,

    /// Initial gas for the frame.
    #[arg(long, default_value_t = 1_000_000)]
    gas: u64,

    /// Emit one JSON step record per executed instruction to stderr.
    #[arg(long)]
    trace: bool,

    /// Include a memory prefix in step records.
    #[arg(long)]
    trace_memory: bool,

    /// Translate without PUSH+operation fusion.
    #[arg(long)]
    no_fusion: bool,

    /// Print the translated instruction stream instead of executing.
    #[arg(long)]
    disasm: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("plevm: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let raw = cli.code.trim().trim_start_matches("0x");
    let code = hex::decode(raw)?;

    let config = EVMConfig {
        trace_memory: cli.trace_memory,
        fusion: !cli.no_fusion,
        ..Default::default()
    };

    let mut vm = VM::new(code.into(), cli.gas, config)?;
    if cli.disasm {
        print!("{}", vm.current_call_frame.plan.disassembly());
        return Ok(ExitCode::SUCCESS);
    }
    if cli.trace {
        vm.set_tracer(StepTracer::new(Box::new(std::io::stderr())));
    }

    let report = vm.execute()?;

    let outcome_code = match &report.result {
        TxResult::Success => {
            println!("outcome:  success");
            ErrorCode::Success
        }
        TxResult::Revert(error) => {
            println!("outcome:  {error}");
            ErrorCode::from(error)
        }
    };
    println!("gas used: {}", report.gas_used);
    println!("gas left: {}", report.gas_remaining);
    if !report.output.is_empty() {
        println!("output:   0x{}", hex::encode(&report.output));
    }
    for index in (0..vm.stack_size()).rev() {
        let item = vm.stack_item(index)?;
        println!("stack[{index}]: 0x{}", hex::encode(item));
    }

    Ok(ExitCode::from(
        u8::try_from(outcome_code.code()).unwrap_or(u8::MAX),
    ))
}
