//! Memory operand addressing modes used by the tape-cell instructions.

use crate::reg::Reg;
use crate::Reg64;

/// An untyped memory operand. Width (`8`/`16`/`32`/`64`) is picked up either
/// from the register operand it is paired with (eg `mov reg, MemOp`) or,
/// when no register operand disambiguates it, by wrapping it in one of
/// [`MemOp8`], [`MemOp16`], [`MemOp32`], [`MemOp64`].
#[derive(Debug, Clone, Copy)]
pub enum MemOp {
    /// `[base]`, eg `mov rax, [rbx]`.
    Indirect(Reg64),
    /// `[base + disp]`, eg `mov rax, [rbx + 0x10]`.
    IndirectDisp(Reg64, i32),
    /// `[base + index]`, eg `mov rax, [rbx + r12]`.
    IndirectBaseIndex(Reg64, Reg64),
}

impl MemOp {
    /// The base register of the addressing mode.
    pub(crate) fn base(&self) -> Reg64 {
        match *self {
            MemOp::Indirect(base) => base,
            MemOp::IndirectDisp(base, _) => base,
            MemOp::IndirectBaseIndex(base, _) => base,
        }
    }

    /// The index register of the addressing mode, or `rax` (index 0, never
    /// emitted in the `SIB` byte unless paired with a real base) if the
    /// mode has no index.
    pub(crate) fn index(&self) -> Reg64 {
        match *self {
            MemOp::Indirect(_) | MemOp::IndirectDisp(_, _) => Reg64::rax,
            MemOp::IndirectBaseIndex(_, index) => index,
        }
    }

    pub(crate) fn rex_needed(&self) -> bool {
        self.base().is_ext() || self.index().is_ext()
    }
}

macro_rules! impl_memop_width {
    ($( #[$doc:meta] $name:ident )+) => {
        $(
        #[$doc]
        #[derive(Debug, Clone, Copy)]
        pub struct $name(pub(crate) MemOp);

        impl From<MemOp> for $name {
            fn from(mem: MemOp) -> Self {
                $name(mem)
            }
        }

        impl std::ops::Deref for $name {
            type Target = MemOp;

            fn deref(&self) -> &MemOp {
                &self.0
            }
        }
        )+
    };
}

impl_memop_width!(
    /// A [`MemOp`] explicitly tagged as an 8 bit wide memory operand, for
    /// instructions (eg `inc [mem]`) that have no register operand to infer
    /// the width from.
    Mem8
    /// A [`MemOp`] explicitly tagged as a 16 bit wide memory operand.
    Mem16
    /// A [`MemOp`] explicitly tagged as a 32 bit wide memory operand.
    Mem32
    /// A [`MemOp`] explicitly tagged as a 64 bit wide memory operand.
    Mem64
);
