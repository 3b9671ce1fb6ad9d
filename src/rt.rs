//! A simple runtime which can be used to execute emitted instructions.

use core::ffi::c_void;
use core::num::NonZeroUsize;
use nix::sys::mman::{mmap, mprotect, munmap, MapFlags, ProtFlags};

use crate::disasm;

/// A simple `mmap`ed runtime with executable pages.
///
/// The allocated page starts out writable so [`Runtime::add_code`] can copy
/// the assembler's output into it; once copied the page is mprotected
/// read-execute, matching W^X.
pub struct Runtime {
    buf: *mut c_void,
    len: usize,
    /// The last blob of code copied in, kept around so [`Runtime::disasm`]
    /// has something to feed `ndisasm`.
    code_len: usize,
}

impl Runtime {
    /// Create a new [Runtime] backed by a single anonymous, writable page.
    pub fn new() -> Runtime {
        let len = NonZeroUsize::new(4096).unwrap();
        let buf = unsafe {
            mmap(
                None,
                len,
                ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
                MapFlags::MAP_PRIVATE | MapFlags::MAP_ANONYMOUS,
                0, /* fd */
                0, /* off */
            )
            .expect("failed to mmap Runtime code buffer")
        };

        Runtime {
            buf,
            len: len.get(),
            code_len: 0,
        }
    }

    /// Copy `code` into the runtime's page, make it executable, and
    /// reinterpret its entry point as `F`.
    ///
    /// # Safety
    ///
    /// The caller must ensure `code` is valid machine code implementing the
    /// calling convention `F` expects.
    pub unsafe fn add_code<F>(&mut self, code: impl AsRef<[u8]>) -> F {
        let code = code.as_ref();
        assert!(code.len() <= self.len, "code does not fit into Runtime page");

        unsafe { std::ptr::copy_nonoverlapping(code.as_ptr(), self.buf.cast(), code.len()) };
        self.code_len = code.len();

        unsafe {
            mprotect(self.buf, self.len, ProtFlags::PROT_READ | ProtFlags::PROT_EXEC)
                .expect("failed to mprotect Runtime code buffer RX")
        };

        unsafe { std::mem::transmute_copy(&self.buf) }
    }

    /// Disassemble the code currently held by the runtime and print it to
    /// stdout. A no-op if `ndisasm` is unavailable.
    pub fn disasm(&self) {
        if self.code_len == 0 {
            return;
        }
        let code = unsafe { std::slice::from_raw_parts(self.buf.cast::<u8>(), self.code_len) };
        disasm::disasm(code);
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        unsafe {
            munmap(self.buf, self.len).expect("failed to munmap Runtime");
        }
    }
}
