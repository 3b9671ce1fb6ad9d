//! A Brainfuck front end, bytecode interpreter, and `x86-64` JIT compiler.
//!
//! The pipeline is: a source buffer is folded by [`parse`] into a frozen,
//! peephole-optimized [`Program`]; the resulting IR is then either walked
//! directly by [`Interpreter`] or lowered to native machine code by
//! [`jit::Jit`] (in-process) or [`aot`] (a standalone linked executable).
//!
//! The low-level `x86-64` encoder ([`Asm`] and the traits in [`insn`]) is the
//! "external codegen library" the JIT lowering in [`jit`] is built against —
//! one trait per instruction mnemonic, label-based relocation, and a small
//! `mmap`-backed [`Runtime`] to execute the emitted bytes.
//!
//! ```rust
//! use bf::{parse, Interpreter, ParseOptions};
//!
//! let prog = parse(b"++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.\
//!                     +++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.",
//!                   &ParseOptions::interpreter())
//!     .unwrap();
//!
//! let mut out = Vec::new();
//! Interpreter::new(&prog, false).run(&b""[..], &mut out).unwrap();
//! assert_eq!(out, b"Hello World!\n");
//! ```

mod asm;
mod disasm;
mod error;
mod imm;
mod interp;
mod ir;
mod label;
mod mem;
mod parse;
mod reg;
mod rt;
mod tape;

pub mod aot;
pub mod insn;
pub mod jit;
pub mod prelude;

pub use asm::Asm;
pub use error::{BfError, ParseError, RuntimeTrap};
pub use imm::{Imm16, Imm32, Imm64, Imm8};
pub use interp::Interpreter;
pub use ir::{Op, Program};
pub use label::Label;
pub use mem::{Mem16, Mem32, Mem64, Mem8, MemOp};
pub use parse::{parse, ParseOptions};
pub use reg::{Reg16, Reg32, Reg64, Reg8};
pub use rt::Runtime;
pub use tape::Tape;

/// Number of cells on the tape, per the canonical Brainfuck memory model.
pub const TAPE_SIZE: usize = 30_000;

/// A Brainfuck program that prints `"Hello World!\n"`, interpreted at
/// startup by `-v`/`--version` to produce the version banner instead of a
/// literal string constant. This is the well known program originally
/// written by Urban Muller to demonstrate the language.
pub const VERSION_BANNER_PROGRAM: &str =
    "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";
