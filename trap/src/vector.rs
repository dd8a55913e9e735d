//! Hardware entry points.
//!
//! On `riscv32` this emits a vectored `mtvec` table and one trampoline per
//! entry. A trampoline saves the caller-saved registers, calls into Rust and
//! returns with `mret`; if the handler halts, it never comes back.
//!
//! Vector layout (`mcause` code -> entry):
//!
//! | slot | entry |
//! |------|-------|
//! | 0    | `_exception_handler` |
//! | 3    | `_software_isr` |
//! | 7    | `_timer_isr` |
//! | 11   | `_external_isr` |
//! | else | `_exception_handler`, which halts on the unexpected cause |
//!
//! `_nmi_handler` is exported for platforms that jump to it directly.

use crate::{Dispatcher, TrapTable};
use spin::Once;

static DEFAULT: Dispatcher = Dispatcher::new(TrapTable::DEFAULT);
static INSTALLED: Once<Dispatcher> = Once::new();

/// The dispatcher hardware traps are routed through.
///
/// Falls back to the default table until [`install`] has run.
#[inline]
pub fn dispatcher() -> &'static Dispatcher {
    INSTALLED.get().unwrap_or(&DEFAULT)
}

/// Registers `table` and points `mtvec` at the vector table.
///
/// Only the first call takes effect.
pub fn install(table: TrapTable) {
    INSTALLED.call_once(|| Dispatcher::new(table));
    set_mtvec();
}

#[cfg(target_arch = "riscv32")]
fn set_mtvec() {
    use riscv::register::mtvec::{self, TrapMode};
    extern "C" {
        fn _vector_table();
    }
    unsafe { mtvec::write(_vector_table as usize, TrapMode::Vectored) }
}

#[cfg(not(target_arch = "riscv32"))]
fn set_mtvec() {}

#[cfg(target_arch = "riscv32")]
mod entry {
    use crate::{halt, Hart, Outcome, TrapContext, TrapEntry};
    use core::arch::global_asm;

    fn enter(entry: TrapEntry) {
        let mut hart = Hart;
        let platform = match entry {
            TrapEntry::Exception => None,
            _ => platform::get(),
        };
        let mut ctx = TrapContext {
            csr: &mut hart,
            platform,
        };
        if super::dispatcher().dispatch(entry, &mut ctx) == Outcome::Halt {
            halt()
        }
    }

    extern "C" fn nmi() {
        enter(TrapEntry::Nmi)
    }

    extern "C" fn exception() {
        enter(TrapEntry::Exception)
    }

    extern "C" fn software() {
        enter(TrapEntry::Software)
    }

    extern "C" fn timer() {
        enter(TrapEntry::Timer)
    }

    extern "C" fn external() {
        enter(TrapEntry::External)
    }

    // Frame: ra, t0-t6, a0-a7 (16 words)
    global_asm!(
        r#"
    .macro TRAP_ENTRY name, handler
    .section .text.trap
    .globl \name
    .balign 4
\name:
    addi sp, sp, -64
    sw ra,   0(sp)
    sw t0,   4(sp)
    sw t1,   8(sp)
    sw t2,  12(sp)
    sw t3,  16(sp)
    sw t4,  20(sp)
    sw t5,  24(sp)
    sw t6,  28(sp)
    sw a0,  32(sp)
    sw a1,  36(sp)
    sw a2,  40(sp)
    sw a3,  44(sp)
    sw a4,  48(sp)
    sw a5,  52(sp)
    sw a6,  56(sp)
    sw a7,  60(sp)
    call \handler
    lw ra,   0(sp)
    lw t0,   4(sp)
    lw t1,   8(sp)
    lw t2,  12(sp)
    lw t3,  16(sp)
    lw t4,  20(sp)
    lw t5,  24(sp)
    lw t6,  28(sp)
    lw a0,  32(sp)
    lw a1,  36(sp)
    lw a2,  40(sp)
    lw a3,  44(sp)
    lw a4,  48(sp)
    lw a5,  52(sp)
    lw a6,  56(sp)
    lw a7,  60(sp)
    addi sp, sp, 64
    mret
    .endm

    TRAP_ENTRY _nmi_handler, {nmi}
    TRAP_ENTRY _exception_handler, {exception}
    TRAP_ENTRY _software_isr, {software}
    TRAP_ENTRY _timer_isr, {timer}
    TRAP_ENTRY _external_isr, {external}

    .section .text.trap
    .globl _vector_table
    .balign 64
    .option push
    .option norvc
_vector_table:
    j _exception_handler
    j _exception_handler
    j _exception_handler
    j _software_isr
    j _exception_handler
    j _exception_handler
    j _exception_handler
    j _timer_isr
    j _exception_handler
    j _exception_handler
    j _exception_handler
    j _external_isr
    .option pop
"#,
        nmi = sym nmi,
        exception = sym exception,
        software = sym software,
        timer = sym timer,
        external = sym external,
    );
}
