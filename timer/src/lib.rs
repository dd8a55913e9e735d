//! timer: machine timer deadline arming
//!
//! There is exactly one deadline, held in `mtimecmp`. The hardware fires one
//! interrupt once `mtime` reaches it and nothing more: the timer interrupt
//! handler has to arm the next deadline every time or ticking stops.

#![no_std]

use platform::Platform;

/// The counter/compare register pair of one platform.
#[derive(Debug, Clone, Copy)]
pub struct Timer<'a> {
    platform: &'a Platform,
}

impl<'a> Timer<'a> {
    pub const fn new(platform: &'a Platform) -> Self {
        Self { platform }
    }

    /// Current counter value.
    #[cfg(not(target_pointer_width = "32"))]
    #[inline]
    pub fn now(&self) -> u64 {
        self.platform.mtime().read()
    }

    /// Current counter value.
    ///
    /// A 64-bit load is two word loads here, so the halves are read separately
    /// and reconciled with [`read_split`].
    #[cfg(target_pointer_width = "32")]
    pub fn now(&self) -> u64 {
        use platform::{Read, Reg};
        let addr = self.platform.mtime().addr();
        let lo = unsafe { Reg::<u32, Read>::new(addr) };
        let hi = unsafe { Reg::<u32, Read>::new(addr + 4) };
        read_split(|| hi.read(), || lo.read())
    }

    /// Currently armed deadline.
    #[inline]
    pub fn deadline(&self) -> u64 {
        self.platform.mtimecmp().read()
    }

    /// Arms one interrupt `period` units from now and returns the deadline.
    ///
    /// The counter is read once, immediately before the compare write.
    pub fn arm(&self, period: u64) -> u64 {
        let deadline = self.now().wrapping_add(period);
        self.platform.mtimecmp().write(deadline);
        deadline
    }
}

/// Reads a 64-bit counter that is only accessible as two 32-bit halves.
///
/// Reads high, low, high and retries until both high reads agree, so a carry
/// out of the low word between the loads is never observed.
pub fn read_split(mut high: impl FnMut() -> u32, mut low: impl FnMut() -> u32) -> u64 {
    loop {
        let hi = high();
        let lo = low();
        if high() == hi {
            return ((hi as u64) << 32) | lo as u64;
        }
    }
}

/// Arms the next timer interrupt on the global platform.
///
/// Does nothing if no platform has been registered.
pub fn arm_timeout(period: u64) {
    if let Some(platform) = platform::get() {
        Timer::new(platform).arm(period);
    }
}
