//! End-to-end tests against the public crate API: parse a whole Brainfuck
//! program, run it over the interpreter, and check its output — the six
//! concrete scenarios plus the IR-shape boundary cases.

use bf::{parse, Interpreter, ParseOptions};

fn run(src: &str, stdin: &[u8]) -> Vec<u8> {
    let prog = parse(src.as_bytes(), &ParseOptions::interpreter()).unwrap();
    let mut out = Vec::new();
    Interpreter::new(&prog, false).run(stdin, &mut out).unwrap();
    out
}

#[test]
fn hello_world_short_form() {
    let src = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";
    assert_eq!(run(src, b""), b"Hello World!\n");
}

#[test]
fn echo_until_zero_byte() {
    assert_eq!(run(",[.,]", b"abc\0xyz"), b"abc");
}

#[test]
fn cell_wrap_prints_0xff() {
    assert_eq!(run("-.", b""), &[0xFFu8]);
}

#[test]
fn pointer_coalescing_dump() {
    let prog = parse(b">>>+<<<", &ParseOptions::interpreter()).unwrap();
    assert_eq!(prog.dump(), "ADD(1, 3)\nEND\n");
}

#[test]
fn scan_loop_scenario() {
    assert_eq!(run("+++>+++>+++<<[>]+.", b""), &[0x04u8]);
}

#[test]
fn mismatched_brackets_fail_before_any_output() {
    // "[[]" has one more '[' than ']': the outer bracket is left without a
    // matching close by the time input runs out.
    let err = parse(b"[[]", &ParseOptions::interpreter()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("bracket"), "message was: {msg}");
}

#[test]
fn empty_program_and_all_comment_program_behave_identically() {
    assert_eq!(run("", b""), b"");
    assert_eq!(run("this is all a comment", b""), b"");
}

#[test]
fn dump_format_is_stable_across_reparses() {
    let src = "++[>++<-]>.";
    let a = parse(src.as_bytes(), &ParseOptions::interpreter()).unwrap();
    let b = parse(src.as_bytes(), &ParseOptions::interpreter()).unwrap();
    assert_eq!(a.dump(), b.dump());
}
