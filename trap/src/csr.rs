use riscv::register::{mcause, mepc, mie, mstatus};

/// The machine-mode CSRs a trap handler touches.
///
/// [`Hart`] goes to the real registers; tests substitute a fake to inject
/// synthetic causes and observe `mepc`.
pub trait MachineCsr {
    /// Raw `mcause`.
    fn mcause(&self) -> usize;
    /// Saved return address.
    fn mepc(&self) -> usize;
    /// Overwrite the saved return address.
    fn set_mepc(&mut self, pc: usize);
    /// Set `mie.MTIE`.
    fn enable_timer_interrupt(&mut self);
    /// Set `mstatus.MIE`.
    fn enable_global_interrupts(&mut self);
}

/// The CSRs of the running hart.
#[derive(Debug, Default, Clone, Copy)]
pub struct Hart;

#[allow(unused_unsafe)]
impl MachineCsr for Hart {
    #[inline]
    fn mcause(&self) -> usize {
        mcause::read().bits()
    }

    #[inline]
    fn mepc(&self) -> usize {
        mepc::read()
    }

    #[inline]
    fn set_mepc(&mut self, pc: usize) {
        unsafe { mepc::write(pc) }
    }

    #[inline]
    fn enable_timer_interrupt(&mut self) {
        unsafe { mie::set_mtimer() }
    }

    #[inline]
    fn enable_global_interrupts(&mut self) {
        unsafe { mstatus::set_mie() }
    }
}
