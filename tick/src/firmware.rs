//! Periodic tick demo.
//!
//! Boots, prints a banner, arms the machine timer and then reports every tick
//! the timer handler counts.

use core::panic::PanicInfo;
use linker::DataLayout;
use minirt_console::{init_console, log, printf, set_log_level, UartConsole};
use trap::{Hart, TrapTable};

// Keep the newlib stubs linked in for C objects that need them.
use newlib_stubs as _;

include!(concat!(env!("OUT_DIR"), "/platform.rs"));

static BOARD: platform::Platform = PLATFORM;
static UART: UartConsole = UartConsole::new(&PLATFORM);

linker::boot0!(rust_main);

/// Main entry point after `gp` and `sp` are set up.
extern "C" fn rust_main() -> ! {
    // .data and .bss have to be in place before any static is touched
    let layout = DataLayout::locate();
    unsafe {
        layout.init_data();
        layout.zero_bss();
    }

    platform::init(&BOARD);
    init_console(&UART);
    set_log_level(option_env!("LOG"));
    trap::install(TrapTable::DEFAULT);

    printf!(
        "minirt on %s: uart 0x%.8x, tick every %d\n",
        PLATFORM_NAME,
        BOARD.uart() as u32,
        BOARD.tick_period() as i32,
    );
    log::debug!("data {:#x?}, bss {:#x?}", layout.data(), layout.bss());

    trap::start_ticking(&mut Hart, &BOARD);
    printf!("Enabled timer\n");

    let mut seen = 0;
    loop {
        let n = trap::ticks();
        if n != seen {
            seen = n;
            printf!("tick %d, next at 0x%.8x\n", n as i32, timer::Timer::new(&BOARD).deadline() as u32);
        }
        unsafe { riscv::asm::wfi() };
    }
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    minirt_console::println!("{}", info);
    trap::halt()
}
