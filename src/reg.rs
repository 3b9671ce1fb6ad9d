//! General purpose register operands, in all four operand widths.

/// Trait implemented by all register operand kinds, giving the assembler
/// uniform access to the bits it needs for `REX`/`ModR/M` encoding.
pub(crate) trait Reg: Copy {
    /// The 4 bit register index (`REX.[RXB]` extension bit included).
    fn idx(self) -> u8;

    /// Whether this register needs a `REX` prefix to be addressable at all,
    /// independent of whether the instruction itself needs one (eg the low
    /// byte registers `spl`/`bpl`/`sil`/`dil` require a `REX` prefix to
    /// disambiguate them from `ah`/`ch`/`dh`/`bh`).
    fn need_rex(self) -> bool;

    /// Whether `REX.W` must be set to select the 64 bit operand form.
    fn rexw(self) -> bool;

    /// Whether the register index lies in the extended `r8`-`r15` range.
    fn is_ext(self) -> bool {
        self.idx() >= 8
    }

    /// Whether using this register as a memory operand base requires a `SIB`
    /// byte (true for `rsp`/`r12`, whose low 3 bits collide with the `SIB`
    /// escape).
    fn need_sib(self) -> bool {
        self.idx() & 0b111 == 0b100
    }

    /// Whether using this register as a memory operand base without a
    /// displacement is reinterpreted as `rip`-relative addressing (true for
    /// `rbp`/`r13`), and therefore requires a forced `disp8` of `0`.
    fn is_pc_rel(self) -> bool {
        self.idx() & 0b111 == 0b101
    }
}

macro_rules! impl_reg {
    ($name:ident, rexw: $rexw:expr, need_rex: $need_rex:expr, $( $variant:ident = $idx:expr ),+ $(,)?) => {
        /// General purpose register operand.
        #[allow(non_camel_case_types, missing_docs)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $variant ),+
        }

        impl Reg for $name {
            fn idx(self) -> u8 {
                match self {
                    $( Self::$variant => $idx ),+
                }
            }

            fn need_rex(self) -> bool {
                let need_rex: fn(Self) -> bool = $need_rex;
                need_rex(self)
            }

            fn rexw(self) -> bool {
                $rexw
            }
        }
    };
}

impl_reg!(
    Reg64, rexw: true, need_rex: |_| true,
    rax = 0, rcx = 1, rdx = 2, rbx = 3, rsp = 4, rbp = 5, rsi = 6, rdi = 7,
    r8 = 8, r9 = 9, r10 = 10, r11 = 11, r12 = 12, r13 = 13, r14 = 14, r15 = 15,
);

impl_reg!(
    Reg32, rexw: false, need_rex: |r| r.is_ext(),
    eax = 0, ecx = 1, edx = 2, ebx = 3, esp = 4, ebp = 5, esi = 6, edi = 7,
    r8d = 8, r9d = 9, r10d = 10, r11d = 11, r12d = 12, r13d = 13, r14d = 14, r15d = 15,
);

impl_reg!(
    Reg16, rexw: false, need_rex: |r| r.is_ext(),
    ax = 0, cx = 1, dx = 2, bx = 3, sp = 4, bp = 5, si = 6, di = 7,
    r8w = 8, r9w = 9, r10w = 10, r11w = 11, r12w = 12, r13w = 13, r14w = 14, r15w = 15,
);

/// 8 bit general purpose register operand.
///
/// The low byte registers `spl`/`bpl`/`sil`/`dil` always need a `REX` prefix
/// (even a plain "empty" `0x40`) to select them instead of the legacy
/// `ah`/`ch`/`dh`/`bh` encodings that share the same index.
#[allow(non_camel_case_types, missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg8 {
    al,
    cl,
    dl,
    bl,
    spl,
    bpl,
    sil,
    dil,
    r8l,
    r9l,
    r10l,
    r11l,
    r12l,
    r13l,
    r14l,
    r15l,
}

impl Reg for Reg8 {
    fn idx(self) -> u8 {
        use Reg8::*;
        match self {
            al => 0,
            cl => 1,
            dl => 2,
            bl => 3,
            spl => 4,
            bpl => 5,
            sil => 6,
            dil => 7,
            r8l => 8,
            r9l => 9,
            r10l => 10,
            r11l => 11,
            r12l => 12,
            r13l => 13,
            r14l => 14,
            r15l => 15,
        }
    }

    fn need_rex(self) -> bool {
        use Reg8::*;
        self.is_ext() || matches!(self, spl | bpl | sil | dil)
    }

    fn rexw(self) -> bool {
        false
    }
}
