#![no_std]

//! trap: machine-mode trap dispatch for a single RISC-V hart
//!
//! Hardware enters through one of five entry points. Each entry is routed
//! through a fixed [`TrapTable`] to a handler that either returns from the
//! trap or halts the hart for good:
//!
//! ```text
//! Idle -> Dispatching -> Handling -> Idle     (Outcome::Return, mret)
//!                                 -> Halted   (Outcome::Halt, spin forever)
//! ```

mod csr;
mod vector;

pub use csr::{Hart, MachineCsr};
pub use vector::{dispatcher, install};

use core::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use numeric_enum_macro::numeric_enum;
use platform::Platform;
use timer::Timer;

/// Width of the `ecall` instruction; the return address is moved past it.
pub const ECALL_WIDTH: usize = 4;

/// `mcause` bit that marks an interrupt.
pub const INTERRUPT_BIT: usize = 1 << (usize::BITS - 1);

numeric_enum! {
    #[repr(usize)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Exception {
        InstructionMisaligned = 0,
        InstructionFault = 1,
        IllegalInstruction = 2,
        Breakpoint = 3,
        LoadMisaligned = 4,
        LoadFault = 5,
        StoreMisaligned = 6,
        StoreFault = 7,
        MachineEnvCall = 11,
    }
}

/// Why a synchronous trap was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cause {
    Exception(Exception),
    /// Anything outside the set above, interrupts included. Holds the raw value.
    Unknown(usize),
}

impl Cause {
    /// Decodes a raw `mcause` value.
    pub fn from_mcause(bits: usize) -> Self {
        if bits & INTERRUPT_BIT != 0 {
            return Cause::Unknown(bits);
        }
        Exception::try_from(bits).map_or(Cause::Unknown(bits), Cause::Exception)
    }
}

/// The hardware entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapEntry {
    Nmi = 0,
    Exception = 1,
    Software = 2,
    Timer = 3,
    External = 4,
}

/// What the entry point does once the handler is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Return from the trap with `mret`.
    Return,
    /// Spin forever. There is no recovery path.
    Halt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TrapState {
    Idle = 0,
    Dispatching = 1,
    Handling = 2,
    Halted = 3,
}

impl TrapState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => TrapState::Dispatching,
            2 => TrapState::Handling,
            3 => TrapState::Halted,
            _ => TrapState::Idle,
        }
    }
}

/// What a handler gets to work with.
pub struct TrapContext<'a> {
    pub csr: &'a mut dyn MachineCsr,
    /// `None` on the exception path, which may run before the runtime is set up.
    pub platform: Option<&'a Platform>,
}

pub type Handler = fn(&mut TrapContext<'_>) -> Outcome;

/// One handler per entry point.
#[derive(Clone, Copy)]
pub struct TrapTable {
    handlers: [Handler; 5],
}

impl TrapTable {
    pub const DEFAULT: TrapTable = TrapTable {
        handlers: [
            handlers::nmi,
            handlers::exception,
            handlers::software,
            handlers::timer,
            handlers::external,
        ],
    };

    /// Replaces the handler of `entry`.
    pub fn with(mut self, entry: TrapEntry, handler: Handler) -> Self {
        self.handlers[entry as usize] = handler;
        self
    }

    #[inline]
    pub fn handler(&self, entry: TrapEntry) -> Handler {
        self.handlers[entry as usize]
    }
}

impl Default for TrapTable {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A trap table plus the state of the trap in progress.
pub struct Dispatcher {
    table: TrapTable,
    state: AtomicU8,
}

impl Dispatcher {
    pub const fn new(table: TrapTable) -> Self {
        Self {
            table,
            state: AtomicU8::new(TrapState::Idle as u8),
        }
    }

    #[inline]
    pub fn state(&self) -> TrapState {
        TrapState::from_u8(self.state.load(Ordering::Acquire))
    }

    #[inline]
    fn enter(&self, state: TrapState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Runs the handler of `entry`. Once halted, every later trap halts too.
    pub fn dispatch(&self, entry: TrapEntry, ctx: &mut TrapContext<'_>) -> Outcome {
        if self.state() == TrapState::Halted {
            return Outcome::Halt;
        }
        self.enter(TrapState::Dispatching);
        let handler = self.table.handler(entry);
        self.enter(TrapState::Handling);
        let outcome = handler(ctx);
        self.enter(match outcome {
            Outcome::Return => TrapState::Idle,
            Outcome::Halt => TrapState::Halted,
        });
        outcome
    }
}

static TICKS: AtomicUsize = AtomicUsize::new(0);

/// Number of timer interrupts handled so far.
#[inline]
pub fn ticks() -> usize {
    TICKS.load(Ordering::Relaxed)
}

/// The default handlers.
pub mod handlers {
    use super::*;

    pub fn nmi(_: &mut TrapContext<'_>) -> Outcome {
        report("unexpected non-maskable interrupt");
        Outcome::Halt
    }

    /// Synchronous exceptions.
    ///
    /// Must not touch the console or the platform: it can run before either
    /// is initialized.
    pub fn exception(ctx: &mut TrapContext<'_>) -> Outcome {
        match Cause::from_mcause(ctx.csr.mcause()) {
            // ecall is a no-op syscall on this platform
            Cause::Exception(Exception::MachineEnvCall) => {
                let pc = ctx.csr.mepc();
                ctx.csr.set_mepc(pc.wrapping_add(ECALL_WIDTH));
                Outcome::Return
            }
            // Fault causes are placeholders with no recovery yet; returning
            // re-executes the faulting instruction.
            Cause::Exception(_) => Outcome::Return,
            Cause::Unknown(_) => Outcome::Halt,
        }
    }

    pub fn software(_: &mut TrapContext<'_>) -> Outcome {
        report("unexpected machine software interrupt");
        Outcome::Halt
    }

    /// Rearms the deadline one tick period from now.
    pub fn timer(ctx: &mut TrapContext<'_>) -> Outcome {
        let Some(platform) = ctx.platform else {
            report("timer interrupt without a platform");
            return Outcome::Halt;
        };
        Timer::new(platform).arm(platform.tick_period());
        let n = TICKS.fetch_add(1, Ordering::Relaxed) + 1;
        log::trace!("tick {n}");
        Outcome::Return
    }

    pub fn external(_: &mut TrapContext<'_>) -> Outcome {
        report("unexpected machine external interrupt");
        Outcome::Halt
    }
}

/// Reports a trap the hart is about to halt on.
///
/// Goes through `log` when errors are enabled there and straight to the
/// console otherwise, so the report survives `LOG=off` and an unset level.
fn report(msg: &str) {
    if log::log_enabled!(log::Level::Error) {
        log::error!("{msg}");
    } else if let Some(console) = minirt_console::console() {
        console.put_str(msg);
        console.put_char(b'\n');
    }
}

/// Arms the first deadline and turns on the timer interrupt.
///
/// Each enable is issued exactly once; call this once at startup.
pub fn start_ticking(csr: &mut dyn MachineCsr, platform: &Platform) {
    Timer::new(platform).arm(platform.tick_period());
    csr.enable_timer_interrupt();
    csr.enable_global_interrupts();
}

/// Spins forever.
pub fn halt() -> ! {
    loop {
        core::hint::spin_loop();
    }
}
