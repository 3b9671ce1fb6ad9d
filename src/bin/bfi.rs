//! `bfi` — the Brainfuck bytecode interpreter.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use bf::{parse, BfError, Interpreter, ParseOptions, VERSION_BANNER_PROGRAM};

/// Run a Brainfuck program over the optimizing bytecode interpreter.
#[derive(Parser)]
#[command(name = "bfi", disable_version_flag = true)]
struct Cli {
    /// Print the parsed intermediate representation instead of executing it.
    #[arg(short = 'p', long = "print-ast")]
    print_ast: bool,

    /// Print a version banner and exit.
    #[arg(short = 'v', long = "version")]
    version: bool,

    /// Enable strict-mode tape semantics: trap instead of silently wrapping
    /// pointer or cell arithmetic.
    #[arg(long)]
    strict: bool,

    /// Brainfuck source file to run.
    source: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.version {
        return match print_version_banner() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("bfi: {e}");
                e.exit_code()
            }
        };
    }

    let Some(source) = cli.source else {
        eprintln!("usage: bfi [-h|--help] [-v|--version] [-p|--print-ast] [--strict] <source-file>");
        return ExitCode::FAILURE;
    };

    match run(&source, cli.print_ast, cli.strict) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("bfi: {e}");
            e.exit_code()
        }
    }
}

fn run(source: &std::path::Path, print_ast: bool, strict: bool) -> Result<(), BfError> {
    let src = std::fs::read(source)?;

    let opts = ParseOptions {
        strict,
        ..ParseOptions::interpreter()
    };
    let prog = parse(&src, &opts)?;

    if print_ast {
        print!("{}", prog.dump());
        return Ok(());
    }

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut interp = Interpreter::new(&prog, strict);
    interp.run(stdin.lock(), stdout.lock())?;
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
