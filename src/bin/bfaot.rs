//! `bfaot` — ahead-of-time Brainfuck compiler: emits a relocatable object
//! and links it into a standalone executable, or JIT-interprets in-process
//! when asked to skip the link step.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use bf::jit::Jit;
use bf::{aot, parse, BfError, Interpreter, ParseOptions, VERSION_BANNER_PROGRAM};

/// Ahead-of-time compile a Brainfuck program to a native executable.
#[derive(Parser)]
#[command(name = "bfaot", disable_version_flag = true)]
struct Cli {
    /// Instruct the backend to dump the generated code instead of linking it.
    #[arg(short = 'd', long = "dump")]
    dump: bool,

    /// JIT-compile and run in-process instead of emitting a linked object.
    #[arg(short = 'e', long = "execute")]
    execute: bool,

    /// Target executable path.
    #[arg(short = 'o', long = "outfile", default_value = "bf.out")]
    outfile: PathBuf,

    /// Print a version banner and exit.
    #[arg(short = 'v', long = "version")]
    version: bool,

    /// Brainfuck source file to compile.
    source: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.version {
        return match print_version_banner() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("bfaot: {e}");
                e.exit_code()
            }
        };
    }

    let Some(source) = cli.source else {
        eprintln!(
            "usage: bfaot [-h|--help] [-v|--version] [-d|--dump] [-e|--execute] [-o FILE] <source-file>"
        );
        return ExitCode::FAILURE;
    };

    match run(&source, cli.dump, cli.execute, &cli.outfile) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("bfaot: {e}");
            e.exit_code()
        }
    }
}

fn run(source: &std::path::Path, dump: bool, execute: bool, outfile: &std::path::Path) -> Result<(), BfError> {
    let src = std::fs::read(source)?;
    let prog = parse(&src, &ParseOptions::compiler())?;

    if execute {
        Jit::compile(&prog).run()?;
        return Ok(());
    }

    if dump {
        aot::dump(&prog);
        return Ok(());
    }

    let object = aot::emit_object(&prog)?;
    aot::link_executable(&object, outfile)?;
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
