//! Tokenizer and optimizing parser: folds a Brainfuck source buffer into a
//! frozen [`Program`].

use crate::error::ParseError;
use crate::ir::{Op, Program};

/// Bracket nesting depth the parser's bracket stack tolerates before
/// failing with [`ParseError::NestingTooDeep`].
pub const MAX_NESTING: usize = 256;

/// Default source size cap used by the interpreter binary.
pub const DEFAULT_MAX_LEN_INTERP: usize = 8 * 1024 * 1024;

/// Default source size cap used by the JIT/AOT binaries.
pub const DEFAULT_MAX_LEN_COMPILE: usize = 1024 * 1024;

/// Parser configuration.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Maximum accepted source length in bytes.
    pub max_source_len: usize,
    /// Whether the resulting [`Program`] will be run with strict-mode tape
    /// semantics. The parser itself does not behave differently either way;
    /// this only flows through so callers can build `ParseOptions` once and
    /// hand it to both parsing and execution.
    pub strict: bool,
}

impl ParseOptions {
    /// Options for the interpreter binary: 8 MiB cap, wrapping semantics.
    pub fn interpreter() -> ParseOptions {
        ParseOptions {
            max_source_len: DEFAULT_MAX_LEN_INTERP,
            strict: false,
        }
    }

    /// Options for the JIT/AOT binaries: 1 MiB cap, wrapping semantics.
    pub fn compiler() -> ParseOptions {
        ParseOptions {
            max_source_len: DEFAULT_MAX_LEN_COMPILE,
            strict: false,
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions::interpreter()
    }
}

/// Parse a Brainfuck source buffer into a frozen [`Program`].
pub fn parse(src: &[u8], opts: &ParseOptions) -> Result<Program, ParseError> {
    if src.len() > opts.max_source_len {
        return Err(ParseError::SourceTooLarge {
            len: src.len(),
            limit: opts.max_source_len,
        });
    }

    Parser::new(src).run()
}

/// Whether `b` is one of the eight significant Brainfuck characters.
fn is_bf_char(b: u8) -> bool {
    matches!(b, b'+' | b'-' | b'>' | b'<' | b'.' | b',' | b'[' | b']')
}

struct Parser<'a> {
    src: &'a [u8],
    pos: usize,
    ops: Vec<Op>,
    /// Pending pointer displacement accumulated from `>`/`<` runs, folded
    /// into the next emitted instruction (rule 1).
    pending_off: i32,
    /// Stack of IR indices of not-yet-closed `JMP_FWD` instructions.
    brackets: Vec<(usize, usize)>,
}

impl<'a> Parser<'a> {
    fn new(src: &'a [u8]) -> Parser<'a> {
        Parser {
            src,
            pos: 0,
            ops: Vec::new(),
            pending_off: 0,
            brackets: Vec::new(),
        }
    }

    /// Advance past comment bytes and return the next significant byte
    /// without consuming it, or `None` at end of input.
    fn peek(&self) -> Option<u8> {
        let mut i = self.pos;
        while i < self.src.len() {
            if is_bf_char(self.src[i]) {
                return Some(self.src[i]);
            }
            i += 1;
        }
        None
    }

    /// Like [`Parser::peek`] but skips comments past the current position
    /// first, used for the `[ - ]` and `[ x ]` look-aheads.
    fn peek_at(&self, mut i: usize) -> Option<(u8, usize)> {
        while i < self.src.len() {
            if is_bf_char(self.src[i]) {
                return Some((self.src[i], i));
            }
            i += 1;
        }
        None
    }

    fn run(mut self) -> Result<Program, ParseError> {
        while let Some(c) = self.peek() {
            match c {
                b'+' => self.run_add(),
                b'-' => self.run_sub(),
                b'>' => self.run_move(1),
                b'<' => self.run_move(-1),
                b'.' => self.emit_simple(Op::Put { off: self.take_off() }),
                b',' => self.emit_simple(Op::Read { off: self.take_off() }),
                b'[' => self.open_bracket()?,
                b']' => self.close_bracket()?,
                _ => unreachable!("peek only returns significant bytes"),
            }
        }

        if let Some(&(_, pos)) = self.brackets.last() {
            return Err(ParseError::UnmatchedOpen { pos });
        }

        self.ops.push(Op::End);
        Ok(Program::new(self.ops))
    }

    /// Consume and return the pending pointer-move accumulator, resetting
    /// it to zero (rule 1: the accumulator resets after any non-move op).
    fn take_off(&mut self) -> i32 {
        std::mem::take(&mut self.pending_off)
    }

    fn emit_simple(&mut self, op: Op) {
        self.ops.push(op);
        self.advance_one();
    }

    /// Advance the cursor past exactly one significant character (and any
    /// preceding comment bytes).
    fn advance_one(&mut self) {
        while !is_bf_char(self.src[self.pos]) {
            self.pos += 1;
        }
        self.pos += 1;
    }

    fn run_move(&mut self, step: i32) {
        self.pending_off += step;
        self.advance_one();
    }

    /// Rule 2: fuse a run of identical `+`/`-` into one `ADD`/`SUB`, but
    /// only when no pointer move has intervened since the last one (an
    /// intervening move means the run targets a different cell).
    fn run_add(&mut self) {
        let off = self.take_off();
        match self.ops.last_mut() {
            Some(Op::Add { n, off: last_off }) if *last_off == off => {
                *n = n.wrapping_add(1);
            }
            _ => self.ops.push(Op::Add { n: 1, off }),
        }
        self.advance_one();
    }

    fn run_sub(&mut self) {
        let off = self.take_off();
        match self.ops.last_mut() {
            Some(Op::Sub { n, off: last_off }) if *last_off == off => {
                *n = n.wrapping_add(1);
            }
            _ => self.ops.push(Op::Sub { n: 1, off }),
        }
        self.advance_one();
    }

    /// Rule 3: recognize the `[-]`/`[+]` clear-cell idiom before falling
    /// back to general bracket linking (rule 5).
    fn open_bracket(&mut self) -> Result<(), ParseError> {
        let open_pos = self.pos;
        self.advance_one(); // past '['

        if let Some((mid, mid_pos)) = self.peek_at(self.pos) {
            if mid == b'+' || mid == b'-' {
                if let Some((b']', close_pos)) = self.peek_at(mid_pos + 1) {
                    let off = self.take_off();
                    self.ops.push(Op::Zero { off });
                    self.pos = close_pos + 1;
                    return Ok(());
                }
            }
        }

        // General case (rule 5): emit JMP_FWD with an unresolved target and
        // push this op's index and source position for diagnostics.
        let off = self.take_off();
        let idx = self.ops.len();
        self.ops.push(Op::JmpFwd { off, target: usize::MAX });
        if self.brackets.len() >= MAX_NESTING {
            return Err(ParseError::NestingTooDeep {
                pos: open_pos,
                limit: MAX_NESTING,
            });
        }
        self.brackets.push((idx, open_pos));
        Ok(())
    }

    /// Rule 4 (scan-loop) and rule 5 (general bracket linking).
    fn close_bracket(&mut self) -> Result<(), ParseError> {
        let close_pos = self.pos;
        let (open_idx, _) = self
            .brackets
            .pop()
            .ok_or(ParseError::UnmatchedClose { pos: close_pos })?;

        // Rule 4: if the loop body emitted nothing but left a pending
        // pointer-move accumulator, the whole loop collapses to SCAN.
        if self.ops.len() == open_idx + 1 && self.pending_off != 0 {
            let Op::JmpFwd { off, .. } = self.ops[open_idx] else {
                unreachable!("bracket stack only ever holds JmpFwd indices")
            };
            let stride = std::mem::take(&mut self.pending_off);
            self.ops[open_idx] = Op::Scan { stride, off };
            self.advance_one();
            return Ok(());
        }

        // Rule 5: general linking. Any pending moves fold into the
        // backward jump's offset like any other instruction.
        let off = self.take_off();
        let back_idx = self.ops.len();
        self.ops.push(Op::JmpBck {
            off,
            target: open_idx + 1,
        });

        let fwd_target = back_idx + 1;
        match &mut self.ops[open_idx] {
            Op::JmpFwd { target, .. } => *target = fwd_target,
            _ => unreachable!("bracket stack only ever holds JmpFwd indices"),
        }

        self.advance_one();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(src: &str) -> Program {
        parse(src.as_bytes(), &ParseOptions::interpreter()).unwrap()
    }

    #[test]
    fn empty_input_is_just_end() {
        let prog = parse_ok("");
        assert_eq!(prog.ops(), &[Op::End]);
    }

    #[test]
    fn all_comments_is_just_end() {
        let prog = parse_ok("this is all comment text");
        assert_eq!(prog.ops(), &[Op::End]);
    }

    #[test]
    fn clear_cell_idiom() {
        let prog = parse_ok("[-]");
        assert_eq!(prog.ops(), &[Op::Zero { off: 0 }, Op::End]);
    }

    #[test]
    fn clear_cell_with_leading_offset() {
        let prog = parse_ok(">[-]<");
        assert_eq!(prog.ops(), &[Op::Zero { off: 1 }, Op::End]);
    }

    #[test]
    fn scan_loop_idiom() {
        let prog = parse_ok("[>]");
        assert_eq!(prog.ops(), &[Op::Scan { stride: 1, off: 0 }, Op::End]);
    }

    #[test]
    fn pointer_coalescing_with_trailing_move_discarded() {
        let prog = parse_ok(">>>+<<<");
        assert_eq!(prog.ops(), &[Op::Add { n: 1, off: 3 }, Op::End]);
    }

    #[test]
    fn additive_run_length_fusion() {
        let prog = parse_ok("+++++");
        assert_eq!(prog.ops(), &[Op::Add { n: 5, off: 0 }, Op::End]);
    }

    #[test]
    fn general_bracket_linking_targets() {
        let prog = parse_ok("+[-.]");
        let ops = prog.ops();
        // ADD(1,0), JMP_FWD(target=5), SUB(1,0), PUT(0), JMP_BCK(target=2), END
        assert_eq!(ops.len(), 6);
        assert!(matches!(ops[1], Op::JmpFwd { target: 5, .. }));
        assert!(matches!(ops[4], Op::JmpBck { target: 2, .. }));
    }

    #[test]
    fn unmatched_close_bracket_errors() {
        let err = parse(b"]", &ParseOptions::interpreter()).unwrap_err();
        assert!(matches!(err, ParseError::UnmatchedClose { pos: 0 }));
    }

    #[test]
    fn unmatched_open_bracket_errors() {
        let err = parse(b"[[]", &ParseOptions::interpreter()).unwrap_err();
        assert!(matches!(err, ParseError::UnmatchedOpen { pos: 0 }));
    }

    #[test]
    fn nesting_to_256_succeeds_257_fails() {
        let ok: String = "[".repeat(256) + &"]".repeat(256);
        assert!(parse(ok.as_bytes(), &ParseOptions::interpreter()).is_ok());

        let too_deep: String = "[".repeat(257) + &"]".repeat(257);
        let err = parse(too_deep.as_bytes(), &ParseOptions::interpreter()).unwrap_err();
        assert!(matches!(err, ParseError::NestingTooDeep { limit: 256, .. }));
    }

    #[test]
    fn oversize_source_errors() {
        let opts = ParseOptions {
            max_source_len: 4,
            strict: false,
        };
        let err = parse(b"+++++", &opts).unwrap_err();
        assert!(matches!(err, ParseError::SourceTooLarge { len: 5, limit: 4 }));
    }

    #[test]
    fn parsing_is_deterministic() {
        let src = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";
        let a = parse_ok(src);
        let b = parse_ok(src);
        assert_eq!(a, b);
    }
}
