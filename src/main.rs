//! Intcode program runner.
//!
//! Loads a program file, runs it with the given inputs and prints each output on
//! its own line.
//!
//! # Usage
//! ```text
//! intcode <program> [OPTIONS]
//! ```
//!
//! # Arguments
//! - `program`: File holding comma-separated Intcode
//!
//! # Options
//! - `-i, --input <value>`: Queue an input value (repeatable, also accepts `a,b,c`)
//! - `--grow [limit]`: Let memory grow past the program (default limit 16M cells)
//! - `--max-steps <n>`: Abort after executing `n` instructions
//! - `--trace`: Log every executed instruction
//! - `--stats`: Print executed-instruction counts after the run
//! - `--disasm`: Print a listing instead of running
//!
//! # Environment
//! `INTCODE_LOG` sets the log level (`trace`, `info`, `warn`, `error`).

use intcode::utils::log::{self, Level};
use intcode::virtual_machine::disassembler;
use intcode::virtual_machine::listener::InputQueue;
use intcode::virtual_machine::program::Program;
use intcode::virtual_machine::vm::{DEFAULT_GROWABLE_LIMIT, ExecConfig, MemoryPolicy, VM};
use intcode::{error, info, warn};
use std::env;
use std::path::Path;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage(&args[0]);
        process::exit(if args.len() < 2 { 1 } else { 0 });
    }

    if let Ok(value) = env::var("INTCODE_LOG") {
        match value.parse::<Level>() {
            Ok(level) => log::set_level(level),
            Err(e) => warn!("ignoring INTCODE_LOG: {e}"),
        }
    }

    let program_path = &args[1];
    let mut inputs: Vec<i64> = Vec::new();
    let mut config = ExecConfig::default();
    let mut show_stats = false;
    let mut disasm = false;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            k @ ("--input" | "-i") => {
                i += 1;
                if i >= args.len() {
                    error!("{k} requires an argument");
                    process::exit(1);
                }
                for token in args[i].split(',') {
                    let value = token.trim().parse::<i64>().unwrap_or_else(|_| {
                        error!("Invalid input value: '{}' is not an integer", token);
                        process::exit(1);
                    });
                    inputs.push(value);
                }
                i += 1;
            }
            "--grow" => {
                let mut limit = DEFAULT_GROWABLE_LIMIT;
                // Optional limit, as long as the next arg is not another flag
                if i + 1 < args.len() && !args[i + 1].starts_with('-') {
                    i += 1;
                    limit = args[i].parse::<usize>().unwrap_or_else(|_| {
                        error!("Invalid memory limit: '{}' is not a valid number", args[i]);
                        process::exit(1);
                    });
                }
                config = config.with_memory(MemoryPolicy::Growable { limit });
                i += 1;
            }
            "--max-steps" => {
                i += 1;
                if i >= args.len() {
                    error!("--max-steps requires an argument");
                    process::exit(1);
                }
                let limit = args[i].parse::<u64>().unwrap_or_else(|_| {
                    error!("Invalid step limit: '{}' is not a valid number", args[i]);
                    process::exit(1);
                });
                config = config.with_step_limit(limit);
                i += 1;
            }
            "--trace" => {
                config = config.with_trace(true);
                log::set_level(Level::Trace);
                i += 1;
            }
            "--stats" => {
                show_stats = true;
                i += 1;
            }
            "--disasm" => {
                disasm = true;
                i += 1;
            }
            other => {
                error!("Unexpected argument: {}\n", other);
                print_usage(&args[0]);
                process::exit(1);
            }
        }
    }

    if !Path::new(program_path).exists() {
        error!("Program file does not exist: {}", program_path);
        process::exit(1);
    }

    let program = match Program::from_file(program_path) {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to load program: {}", e);
            process::exit(1);
        }
    };

    if disasm {
        println!("{}", disassembler::render(&program));
        return;
    }

    let mut listener = InputQueue::new(inputs);
    let mut vm = VM::new(&program, config);
    let result = vm.run(&mut listener);

    // Outputs produced before a failure are still useful for debugging.
    for value in vm.outputs() {
        println!("{value}");
    }

    if show_stats {
        print_stats(&vm);
    }

    if let Err(e) = result {
        error!("Execution failed at ip {}: {}", vm.ip(), e);
        process::exit(1);
    }

    if listener.remaining() > 0 {
        warn!("{} input value(s) were never read", listener.remaining());
    }
    info!(
        "Halted after {} instructions ({} cells of memory)",
        vm.stats().total(),
        vm.memory().len()
    );
}

fn print_stats(vm: &VM) {
    let stats = vm.stats();
    let total = stats.total();
    let name_w = stats
        .iter()
        .map(|(op, _)| op.mnemonic().len())
        .max()
        .unwrap_or(0)
        .max("total".len());
    let count_w = total.to_string().len();

    eprintln!("Instruction counts:");
    for (opcode, count) in stats.iter() {
        if count == 0 {
            continue;
        }
        let percent = (count as f64 / total as f64) * 100.0;
        eprintln!(
            "{:<name_w$} {:>count_w$} ({:>5.1}%)",
            opcode.mnemonic(),
            count,
            percent,
        );
    }
    eprintln!("{:<name_w$} {:>count_w$}", "total", total);
}

const USAGE: &str = "\
Intcode Runner

USAGE:
    {program} <program> [OPTIONS]

ARGS:
    <program>    File holding comma-separated Intcode

OPTIONS:
    -i, --input <value>   Queue an input value (repeatable, accepts a,b,c)
    --grow [limit]        Let memory grow past the program (limit in cells)
    --max-steps <n>       Abort after executing n instructions
    --trace               Log every executed instruction
    --stats               Print executed-instruction counts after the run
    --disasm              Print a listing instead of running
    -h, --help            Print this help message

ENVIRONMENT:
    INTCODE_LOG    Log level: trace, info, warn or error (default info)

EXAMPLES:
    # Run with two inputs
    {program} day5.txt -i 5 -i 8

    # Run a program that needs extra memory, with tracing
    {program} day9.txt --grow --trace -i 1
";

fn print_usage(program: &str) {
    eprintln!("{}", USAGE.replace("{program}", program));
}
