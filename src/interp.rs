//! Direct-dispatch interpreter executing a [`Program`] over a [`Tape`].

use std::io::{Read, Write};

use crate::error::{BfError, RuntimeTrap};
use crate::ir::{Op, Program};
use crate::tape::Tape;

/// Executes a parsed [`Program`] over a fresh [`Tape`], reading from `input`
/// and writing to `output`.
pub struct Interpreter<'p> {
    prog: &'p Program,
    tape: Tape,
}

impl<'p> Interpreter<'p> {
    /// Create an interpreter for `prog`, with a freshly zeroed tape.
    pub fn new(prog: &'p Program, strict: bool) -> Interpreter<'p> {
        Interpreter {
            prog,
            tape: Tape::new(strict),
        }
    }

    /// Run the program to completion (its `END` instruction), reading
    /// standard-input-style bytes from `input` and writing to `output`.
    ///
    /// A write failure on `output` (eg a closed stdout / broken pipe) aborts
    /// execution and is reported as [`BfError::Io`], per spec.md §7's "output
    /// device write failure during execution (reported, execution aborts)".
    pub fn run<R: Read, W: Write>(&mut self, mut input: R, mut output: W) -> Result<(), BfError> {
        let ops = self.prog.ops();
        let mut pc = 0usize;

        loop {
            match ops[pc] {
                Op::Add { n, off } => {
                    self.apply_offset(off)?;
                    self.tape.add(n)?;
                    pc += 1;
                }
                Op::Sub { n, off } => {
                    self.apply_offset(off)?;
                    self.tape.sub(n)?;
                    pc += 1;
                }
                Op::Read { off } => {
                    self.apply_offset(off)?;
                    let mut byte = [0u8; 1];
                    match input.read(&mut byte) {
                        Ok(0) => self.tape.set(0xFF),
                        Ok(_) => self.tape.set(byte[0]),
                        Err(_) => self.tape.set(0xFF),
                    }
                    pc += 1;
                }
                Op::Put { off } => {
                    self.apply_offset(off)?;
                    let byte = [self.tape.get()];
                    output.write_all(&byte)?;
                    pc += 1;
                }
                Op::Zero { off } => {
                    self.apply_offset(off)?;
                    self.tape.set(0);
                    pc += 1;
                }
                Op::Scan { stride, off } => {
                    self.apply_offset(off)?;
                    while self.tape.get() != 0 {
                        self.apply_offset(stride)?;
                    }
                    pc += 1;
                }
                Op::JmpFwd { off, target } => {
                    self.apply_offset(off)?;
                    if self.tape.get() == 0 {
                        pc = target;
                    } else {
                        pc += 1;
                    }
                }
                Op::JmpBck { off, target } => {
                    self.apply_offset(off)?;
                    if self.tape.get() != 0 {
                        pc = target;
                    } else {
                        pc += 1;
                    }
                }
                Op::End => {
                    output.flush()?;
                    return Ok(());
                }
            }
        }
    }

    #[cold]
    fn trap_cold(e: RuntimeTrap) -> RuntimeTrap {
        e
    }

    fn apply_offset(&mut self, off: i32) -> Result<(), RuntimeTrap> {
        if off == 0 {
            return Ok(());
        }
        self.tape.move_ptr(off).map_err(Self::trap_cold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{parse, ParseOptions};

    fn run_str(src: &str, stdin: &[u8]) -> Vec<u8> {
        let prog = parse(src.as_bytes(), &ParseOptions::interpreter()).unwrap();
        let mut interp = Interpreter::new(&prog, false);
        let mut out = Vec::new();
        interp.run(stdin, &mut out).unwrap();
        out
    }

    #[test]
    fn hello_world() {
        let src = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";
        assert_eq!(run_str(src, b""), b"Hello World!\n");
    }

    #[test]
    fn echo_until_zero_byte() {
        assert_eq!(run_str(",[.,]", b"abc\0xyz"), b"abc");
    }

    #[test]
    fn cell_wrap_on_decrement_from_zero() {
        assert_eq!(run_str("-.", b""), &[0xFFu8]);
    }

    #[test]
    fn scan_loop_scenario() {
        assert_eq!(run_str("+++>+++>+++<<[>]+.", b""), &[0x04u8]);
    }

    #[test]
    fn empty_program_is_a_noop() {
        assert_eq!(run_str("", b""), b"");
    }

    #[test]
    fn read_at_eof_sets_cell_to_0xff() {
        assert_eq!(run_str(",.", b""), &[0xFFu8]);
    }

    #[test]
    fn strict_mode_traps_pointer_underflow() {
        let prog = parse(b"<", &ParseOptions { strict: true, ..ParseOptions::interpreter() }).unwrap();
        let mut interp = Interpreter::new(&prog, true);
        let mut out = Vec::new();
        assert!(interp.run(&b""[..], &mut out).is_err());
    }

    #[test]
    fn running_same_program_twice_yields_identical_output() {
        let src = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";
        assert_eq!(run_str(src, b""), run_str(src, b""));
    }

    /// A writer that always fails, standing in for a closed stdout / broken
    /// pipe.
    struct FailingWriter;

    impl std::io::Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn output_write_failure_aborts_with_io_error() {
        let prog = parse(b"+.", &ParseOptions::interpreter()).unwrap();
        let mut interp = Interpreter::new(&prog, false);
        let err = interp.run(&b""[..], FailingWriter).unwrap_err();
        assert!(matches!(err, BfError::Io(_)));
    }
}
