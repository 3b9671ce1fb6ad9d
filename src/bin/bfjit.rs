//! `bfjit` — compiles a Brainfuck program to native code and runs it
//! in-process.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use bf::jit::Jit;
use bf::{parse, BfError, Interpreter, ParseOptions, VERSION_BANNER_PROGRAM};

/// Just-in-time compile and run a Brainfuck program.
#[derive(Parser)]
#[command(name = "bfjit", disable_version_flag = true)]
struct Cli {
    /// Dump a disassembly of the generated machine code instead of running it.
    #[arg(short = 'p', long = "print")]
    print: bool,

    /// Print a version banner and exit.
    #[arg(short = 'v', long = "version")]
    version: bool,

    /// Brainfuck source file to compile and run.
    source: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.version {
        return match print_version_banner() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("bfjit: {e}");
                e.exit_code()
            }
        };
    }

    let Some(source) = cli.source else {
        eprintln!("usage: bfjit [-h|--help] [-v|--version] [-p|--print] <source-file>");
        return ExitCode::FAILURE;
    };

    match run(&source, cli.print) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("bfjit: {e}");
            e.exit_code()
        }
    }
}

fn run(source: &std::path::Path, print: bool) -> Result<(), BfError> {
    let src = std::fs::read(source)?;
    let prog = parse(&src, &ParseOptions::compiler())?;

    let jit = Jit::compile(&prog);
    if print {
        jit.disasm();
    } else {
        jit.run()?;
    }
    Ok(())
}

/// Interpret [`VERSION_BANNER_PROGRAM`] to produce the `-v`/`--version`
/// banner, rather than printing a literal string constant.
fn print_version_banner() -> Result<(), BfError> {
    let prog = parse(VERSION_BANNER_PROGRAM.as_bytes(), &ParseOptions::interpreter())
        .expect("version banner program is a fixed, known-good Brainfuck program");
    let mut interp = Interpreter::new(&prog, false);
    interp.run(std::io::empty(), std::io::stdout())
}
