//! Lowering of a [`Program`] to native x86-64 machine code via the
//! `asm`/`insn` encoder, and a runtime to execute the result in-process.
//!
//! The generated function has the ABI `extern "C" fn(tape_ptr: *mut u8)`:
//! one pointer argument (the tape base, in `rdi`), no return value. The
//! tape base lives in the callee-saved `rbx` for the function's lifetime
//! and the tape index lives in the callee-saved `r12`, zero-initialized in
//! the prologue — both survive the `call`s to the I/O trampolines below
//! without needing to be saved around them.

use std::cell::Cell;
use std::io::{Read, Write};

use crate::error::BfError;
use crate::ir::{Op, Program};
use crate::prelude::*;
use crate::Runtime;

/// How a lowering pass emits the call for a `READ`/`PUT` instruction: either
/// a baked-in address of an in-process trampoline (the JIT) or a relocatable
/// `call rel32` against an external symbol (the ahead-of-time object
/// emitter in `crate::aot`). Parameterizing [`lower_with`] over this keeps
/// the two lowering passes from drifting apart, since everything else about
/// turning a [`Program`] into machine code is identical between them.
pub(crate) trait IoEmitter {
    /// Emit a call that leaves the read byte in `al`.
    fn emit_read(&mut self, asm: &mut Asm);
    /// Emit a call that reads the byte to write from `dil`.
    fn emit_write(&mut self, asm: &mut Asm);
}

/// [`IoEmitter`] used for in-process JIT compilation: calls the
/// [`bf_getchar`]/[`bf_putchar`] trampolines via their absolute address.
struct Trampolines;

impl IoEmitter for Trampolines {
    fn emit_read(&mut self, asm: &mut Asm) {
        asm.mov(Reg64::rax, Imm64::from(bf_getchar as usize as u64));
        asm.call(Reg64::rax);
    }

    fn emit_write(&mut self, asm: &mut Asm) {
        asm.mov(Reg64::rax, Imm64::from(bf_putchar as usize as u64));
        asm.call(Reg64::rax);
    }
}

/// Lower `prog` to a standalone buffer of x86-64 machine code implementing
/// `extern "C" fn(*mut u8)`, using `io` to emit each `READ`/`PUT`'s call.
///
/// `[`/`]` pairs are lowered with a stack of `(head, end)` label pairs, one
/// pushed per `JmpFwd` and popped by its matching `JmpBck` — mirroring the
/// teacher's `examples/bf.rs` `BrainfuckJit`, which walks tokens directly
/// and binds each loop's head label the moment it reaches that point in the
/// body, rather than resolving it lazily from a jump target recorded
/// elsewhere. This crate's IR already carries resolved `target` indices (for
/// the interpreter's direct `pc` jumps), but lowering does not need them:
/// since the parser guarantees every bracket is balanced, the stack
/// reconstructs exactly the same pairing the IR indices encode, and unlike
/// an index-keyed label map it can never end up creating a label for a
/// *backward* reference that the forward scan has already passed without
/// binding it.
pub(crate) fn lower_with(prog: &Program, io: &mut dyn IoEmitter) -> Vec<u8> {
    let mut asm = Asm::new();
    let tape = MemOp::IndirectBaseIndex(Reg64::rbx, Reg64::r12);

    // Prologue: save callee-saved regs, load tape base, zero tape index.
    asm.push(Reg64::rbx);
    asm.push(Reg64::r12);
    asm.mov(Reg64::rbx, Reg64::rdi);
    asm.xor(Reg64::r12, Reg64::r12);

    // Stack of (head, end) label pairs for not-yet-closed `[`s, one pushed
    // per `JmpFwd` and popped by its matching `JmpBck`.
    let mut label_stack: Vec<(Label, Label)> = Vec::new();

    for op in prog.ops() {
        match *op {
            Op::Add { n, off } => {
                apply_offset(&mut asm, off);
                if n == 1 {
                    asm.inc(Mem8::from(tape));
                } else {
                    asm.add(Mem8::from(tape), Imm8::from(n));
                }
            }
            Op::Sub { n, off } => {
                apply_offset(&mut asm, off);
                if n == 1 {
                    asm.dec(Mem8::from(tape));
                } else {
                    asm.sub(Mem8::from(tape), Imm8::from(n));
                }
            }
            Op::Zero { off } => {
                apply_offset(&mut asm, off);
                asm.mov(Mem8::from(tape), Imm8::from(0u8));
            }
            Op::Read { off } => {
                apply_offset(&mut asm, off);
                io.emit_read(&mut asm);
                asm.mov(Mem8::from(tape), Reg8::al);
            }
            Op::Put { off } => {
                apply_offset(&mut asm, off);
                asm.mov(Reg8::dil, Mem8::from(tape));
                io.emit_write(&mut asm);
            }
            Op::Scan { stride, off } => {
                apply_offset(&mut asm, off);
                let mut head = Label::new();
                let mut end = Label::new();

                asm.bind(&mut head);
                asm.cmp(Mem8::from(tape), Imm8::from(0u8));
                asm.jz(&mut end);
                asm.add(Reg64::r12, Imm32::from(stride));
                asm.cmp(Mem8::from(tape), Imm8::from(0u8));
                asm.jnz(&mut head);
                asm.bind(&mut end);
            }
            Op::JmpFwd { off, .. } => {
                apply_offset(&mut asm, off);
                asm.cmp(Mem8::from(tape), Imm8::from(0u8));

                let mut pair = (Label::new(), Label::new());
                // Skip to `end` (pair.1) when the loop's entry cell is zero.
                asm.jz(&mut pair.1);
                // `head` (pair.0) marks the body's first instruction, which
                // is exactly where execution is once the `jz` falls through.
                asm.bind(&mut pair.0);
                label_stack.push(pair);
            }
            Op::JmpBck { off, .. } => {
                apply_offset(&mut asm, off);
                asm.cmp(Mem8::from(tape), Imm8::from(0u8));

                let mut pair = label_stack
                    .pop()
                    .expect("parser guarantees every JmpBck has a matching JmpFwd");
                asm.jnz(&mut pair.0);
                // `end` (pair.1) marks the loop's exit, exactly where
                // execution is once the `jnz` falls through.
                asm.bind(&mut pair.1);
            }
            Op::End => {
                asm.pop(Reg64::r12);
                asm.pop(Reg64::rbx);
                asm.ret();
            }
        }
    }

    debug_assert!(label_stack.is_empty(), "unbalanced brackets survived parsing");

    asm.into_code()
}

/// Lower `prog` for in-process JIT execution: `READ`/`PUT` call the
/// [`bf_getchar`]/[`bf_putchar`] trampolines directly.
pub fn lower(prog: &Program) -> Vec<u8> {
    lower_with(prog, &mut Trampolines)
}

fn apply_offset(asm: &mut Asm, off: i32) {
    if off != 0 {
        asm.add(Reg64::r12, Imm32::from(off));
    }
}

thread_local! {
    /// Set by [`bf_putchar`] when a write to stdout fails, since the
    /// trampoline's `extern "C" fn(u8)` ABI has no room for a `Result`.
    /// [`Jit::run`] checks and clears this after the compiled function
    /// returns, surfacing it the same way [`crate::Interpreter::run`]
    /// surfaces a failed `output.write_all`.
    static IO_ERROR: Cell<Option<std::io::ErrorKind>> = Cell::new(None);
}

/// `extern "C" fn(u8)` trampoline called by JIT-compiled `PUT` instructions.
extern "C" fn bf_putchar(byte: u8) {
    if let Err(e) = std::io::stdout().write_all(&[byte]) {
        IO_ERROR.with(|cell| cell.set(Some(e.kind())));
    }
}

/// `extern "C" fn() -> u8` trampoline called by JIT-compiled `READ`
/// instructions. Returns `0xFF` on EOF or any read error, per the fixed
/// EOF-handling rule.
extern "C" fn bf_getchar() -> u8 {
    let mut buf = [0u8; 1];
    match std::io::stdin().read(&mut buf) {
        Ok(1) => buf[0],
        _ => 0xFF,
    }
}

/// An in-process just-in-time compiled [`Program`].
pub struct Jit {
    rt: Runtime,
    code: Vec<u8>,
    entry: extern "C" fn(*mut u8),
}

impl Jit {
    /// Lower and load `prog` into an executable page, ready to run.
    pub fn compile(prog: &Program) -> Jit {
        let code = lower(prog);
        let mut rt = Runtime::new();
        // SAFETY: `code` is produced by `lower`, which always emits a valid
        // `extern "C" fn(*mut u8)` body (prologue through `ret`).
        let entry = unsafe { rt.add_code::<extern "C" fn(*mut u8)>(&code) };
        Jit { rt, code, entry }
    }

    /// Run the compiled program against a freshly allocated tape.
    ///
    /// I/O happens through the [`bf_putchar`]/[`bf_getchar`] trampolines,
    /// which always go through the process's real stdin/stdout — there is
    /// no way to redirect them to an in-memory buffer the way the
    /// interpreter's [`crate::Interpreter::run`] can. A write failure during
    /// execution (eg a closed stdout / broken pipe) is reported as
    /// [`BfError::Io`] once the compiled function returns, same as the
    /// interpreter reports one immediately.
    pub fn run(&self) -> Result<(), BfError> {
        IO_ERROR.with(|cell| cell.set(None));

        let mut tape = [0u8; crate::TAPE_SIZE];
        (self.entry)(tape.as_mut_ptr());

        match IO_ERROR.with(|cell| cell.take()) {
            Some(kind) => Err(BfError::Io(std::io::Error::from(kind))),
            None => Ok(()),
        }
    }

    /// Print a textual disassembly of the generated code (`-p`/`--print`),
    /// via `ndisasm` if available.
    pub fn disasm(&self) {
        self.rt.disasm();
    }

    /// The raw machine code buffer, reused by the ahead-of-time emitter.
    pub fn code(&self) -> &[u8] {
        &self.code
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{parse, ParseOptions};

    #[test]
    fn lowering_clear_cell_emits_mov_byte_zero() {
        let prog = parse(b"[-]", &ParseOptions::compiler()).unwrap();
        let code = lower(&prog);
        // push rbx; push r12; mov rbx,rdi; xor r12,r12; mov byte[rbx+r12],0; pop r12; pop rbx; ret
        assert_eq!(code.first(), Some(&0x53)); // push rbx
        assert_eq!(code.last(), Some(&0xc3)); // ret
    }

    #[test]
    fn lowering_empty_program_is_prologue_epilogue_only() {
        let prog = parse(b"", &ParseOptions::compiler()).unwrap();
        let code = lower(&prog);
        assert_eq!(
            code,
            vec![
                0x53, // push rbx
                0x41, 0x54, // push r12
                0x48, 0x89, 0xfb, // mov rbx, rdi
                0x4d, 0x31, 0xe4, // xor r12, r12
                0x41, 0x5c, // pop r12
                0x5b, // pop rbx
                0xc3, // ret
            ]
        );
    }

    /// Regression test for a general (non `Zero`/`Scan`) bracket loop, the
    /// exact shape `parse.rs`'s own `general_bracket_linking_targets` test
    /// comments as `"+[-.]"`. Lowering it used to panic: the `JmpBck`'s
    /// target is a backward IR reference that an index-keyed label map never
    /// got the chance to bind before the forward scan passed it.
    #[test]
    fn lowering_general_loop_does_not_panic() {
        let prog = parse(b"+[-.]", &ParseOptions::compiler()).unwrap();
        let code = lower(&prog);
        assert_eq!(code.first(), Some(&0x53)); // push rbx
        assert_eq!(code.last(), Some(&0xc3)); // ret
    }

    #[test]
    fn lowering_hello_world_does_not_panic() {
        let src = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";
        let prog = parse(src.as_bytes(), &ParseOptions::compiler()).unwrap();
        let code = lower(&prog);
        assert_eq!(code.last(), Some(&0xc3)); // ret
    }

    #[test]
    fn lowering_nested_general_loops_does_not_panic() {
        let prog = parse(b"++[>++[>+<-]<-]", &ParseOptions::compiler()).unwrap();
        let code = lower(&prog);
        assert_eq!(code.last(), Some(&0xc3)); // ret
    }
}
