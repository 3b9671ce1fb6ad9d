//! Ahead-of-time object-file emission and linking.
//!
//! Lowers a [`Program`] via the same [`crate::jit::lower_with`] routine the
//! in-process JIT uses, with one difference: `READ`/`PUT` become `call
//! rel32` instructions against undefined `getchar`/`putchar` symbols instead
//! of baked-in addresses of this process's I/O trampolines. Baked-in
//! addresses only make sense for the in-process JIT, which runs in the same
//! process as the Rust functions it calls; a standalone linked executable
//! needs the real libc symbols, resolved by the linker. The two lowering
//! passes share everything else — opcode-by-opcode encoding, the bracket
//! label-stack scheme — by going through the same `IoEmitter`-parameterized
//! routine rather than hand-duplicating it.

use std::path::Path;
use std::process::Command;

use object::write::{Object, Relocation, StandardSegment, Symbol, SymbolSection};
use object::{
    Architecture, BinaryFormat, Endianness, RelocationEncoding, RelocationKind, SectionKind,
    SymbolFlags, SymbolKind, SymbolScope,
};

use crate::error::BfError;
use crate::ir::Program;
use crate::jit::{lower_with, IoEmitter};
use crate::Asm;

/// Symbol name of the generated Brainfuck entry point inside the emitted
/// object, and the function the generated `main` stub calls.
pub const ENTRY_SYMBOL: &str = "bf_main";

/// [`IoEmitter`] used for ahead-of-time object emission: emits a `call
/// rel32` against an as-yet-undefined external symbol for each `READ`/`PUT`,
/// recording the byte offset of the placeholder `disp32` so [`emit_object`]
/// can attach an ELF relocation there once the symbol and section exist.
struct ExternCalls {
    relocs: Vec<(usize, &'static str)>,
}

impl ExternCalls {
    fn emit_call(&mut self, asm: &mut Asm, symbol: &'static str) {
        asm.emit(&[0xe8]);
        self.relocs.push((asm.len(), symbol));
        asm.emit(&[0, 0, 0, 0]);
    }
}

impl IoEmitter for ExternCalls {
    fn emit_read(&mut self, asm: &mut Asm) {
        self.emit_call(asm, "getchar");
    }

    fn emit_write(&mut self, asm: &mut Asm) {
        self.emit_call(asm, "putchar");
    }
}

/// Lower `prog`, recording the byte offset of every `READ`/`PUT` call site so
/// [`emit_object`] can attach an external relocation there.
fn lower_relocatable(prog: &Program) -> (Vec<u8>, Vec<(usize, &'static str)>) {
    let mut io = ExternCalls { relocs: Vec::new() };
    let code = lower_with(prog, &mut io);
    (code, io.relocs)
}

/// Emit `prog` as a relocatable ELF object exposing [`ENTRY_SYMBOL`] as
/// `extern "C" fn(*mut u8)`, leaving `getchar`/`putchar` as undefined
/// symbols for the linker to resolve against libc.
pub fn emit_object(prog: &Program) -> Result<Vec<u8>, BfError> {
    let (code, relocs) = lower_relocatable(prog);

    let mut obj = Object::new(BinaryFormat::Elf, Architecture::X86_64, Endianness::Little);

    let text = obj.add_section(
        obj.segment_name(StandardSegment::Text).to_vec(),
        b".text".to_vec(),
        SectionKind::Text,
    );
    obj.section_mut(text).set_data(code.clone(), 16);

    obj.add_symbol(Symbol {
        name: ENTRY_SYMBOL.as_bytes().to_vec(),
        value: 0,
        size: code.len() as u64,
        kind: SymbolKind::Text,
        scope: SymbolScope::Linkage,
        weak: false,
        section: SymbolSection::Section(text),
        flags: SymbolFlags::None,
    });

    for (offset, name) in relocs {
        let symbol = obj.add_symbol(Symbol {
            name: name.as_bytes().to_vec(),
            value: 0,
            size: 0,
            kind: SymbolKind::Text,
            scope: SymbolScope::Unknown,
            weak: false,
            section: SymbolSection::Undefined,
            flags: SymbolFlags::None,
        });
        obj.add_relocation(
            text,
            Relocation {
                offset: offset as u64,
                symbol,
                kind: RelocationKind::PltRelative,
                encoding: RelocationEncoding::Generic,
                size: 32,
                addend: -4,
            },
        )
        .map_err(|e| BfError::Codegen(e.to_string()))?;
    }

    obj.write().map_err(|e| BfError::Codegen(e.to_string()))
}

/// Dump a disassembly of the machine code that would be embedded in the
/// object (`-d`/`--dump`), via `ndisasm` if available.
pub fn dump(prog: &Program) {
    let (code, _relocs) = lower_relocatable(prog);
    crate::disasm::disasm(&code);
}

/// Link a previously emitted object into a standalone executable at
/// `outfile`.
///
/// Writes `object_bytes` and a tiny generated C stub (a `main` that
/// allocates a zeroed [`crate::TAPE_SIZE`]-byte tape and calls
/// [`ENTRY_SYMBOL`]) into a scratch directory, then shells out to the host
/// `cc` to compile and link them together. Writing a native linker from
/// scratch is out of scope (see spec.md §1 Non-goals); shelling out to `cc`
/// is the same escape hatch real ahead-of-time Brainfuck compilers take
/// when they don't carry their own linker.
pub fn link_executable(object_bytes: &[u8], outfile: &Path) -> Result<(), BfError> {
    let dir = std::env::temp_dir().join(format!("bfaot-{}", std::process::id()));
    std::fs::create_dir_all(&dir)?;

    let obj_path = dir.join("bf.o");
    let stub_path = dir.join("stub.c");
    std::fs::write(&obj_path, object_bytes)?;
    std::fs::write(&stub_path, stub_source())?;

    let result = Command::new("cc")
        .arg(&stub_path)
        .arg(&obj_path)
        .arg("-o")
        .arg(outfile)
        .status();

    let _ = std::fs::remove_dir_all(&dir);

    let status = result?;
    if !status.success() {
        return Err(BfError::Codegen(format!("cc exited with status {status}")));
    }
    Ok(())
}

fn stub_source() -> String {
    format!(
        "#include <string.h>\n\
         extern void {entry}(unsigned char *);\n\
         int main(void) {{\n\
         \u{20}   static unsigned char tape[{size}];\n\
         \u{20}   memset(tape, 0, sizeof(tape));\n\
         \u{20}   {entry}(tape);\n\
         \u{20}   return 0;\n\
         }}\n",
        entry = ENTRY_SYMBOL,
        size = crate::TAPE_SIZE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{parse, ParseOptions};

    #[test]
    fn lowering_relocatable_records_getchar_and_putchar_relocations() {
        let prog = parse(b",.", &ParseOptions::compiler()).unwrap();
        let (_code, relocs) = lower_relocatable(&prog);
        let names: Vec<&str> = relocs.iter().map(|(_, name)| *name).collect();
        assert_eq!(names, vec!["getchar", "putchar"]);
    }

    #[test]
    fn lowering_relocatable_empty_program_is_prologue_epilogue_only() {
        let prog = parse(b"", &ParseOptions::compiler()).unwrap();
        let (code, relocs) = lower_relocatable(&prog);
        assert!(relocs.is_empty());
        assert_eq!(code.first(), Some(&0x53)); // push rbx
        assert_eq!(code.last(), Some(&0xc3)); // ret
    }

    #[test]
    fn emit_object_produces_a_nonempty_elf_blob() {
        let prog = parse(b"+.", &ParseOptions::compiler()).unwrap();
        let bytes = emit_object(&prog).unwrap();
        // ELF magic.
        assert_eq!(&bytes[0..4], b"\x7fELF");
    }
}
