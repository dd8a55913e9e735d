//! minirt-console: UART 输出、`printf` 格式化引擎、`print!`/`println!` 与 `log::Log`
//!
//! 正常流程与 trap 上下文共用同一个输出设备且不加锁：
//! 两个上下文的输出可能以字节为粒度交错，这是被接受的竞争。
//! 在 trap 上下文中持有自旋锁会在单核上死锁，所以这里不引入锁。

#![no_std]

pub extern crate log;

mod itoa;
mod printf;
mod uart;

pub use itoa::{format_integer, IntBuf, INT_BUF_LEN};
pub use printf::{format_and_emit, printf, putchar, puts, Arg};
pub use uart::UartConsole;

use core::fmt;
use log::{Level, LevelFilter, Log, Metadata, Record};
use spin::Once;

/// 字节输出设备
///
/// `put_char` 每次调用必须恰好产生一次设备写入，不缓冲、不转换换行。
/// 它可能在 trap 上下文中被调用，实现中不能加锁。
pub trait Console: Sync {
    /// 写出一个字节
    fn put_char(&self, c: u8);

    /// 逐字节写出 `s`
    fn put_str(&self, s: &str) {
        for byte in s.bytes() {
            self.put_char(byte);
        }
    }
}

/// 启动时注入的输出设备
static CONSOLE: Once<&'static dyn Console> = Once::new();

/// 注入输出设备并把 `log` 接到它上面
///
/// 只有第一次调用生效。
pub fn init_console(console: &'static dyn Console) {
    CONSOLE.call_once(|| console);
    let _ = log::set_logger(&Logger);
}

/// 已注册的全局控制台
#[inline]
pub fn console() -> Option<&'static dyn Console> {
    CONSOLE.get().copied()
}

/// 按 `LOG` 环境变量的取值设置日志级别
///
/// `env` 为 `None` 或无法识别时设置为 `Trace`，大小写不敏感。
pub fn set_log_level(env: Option<&str>) {
    let level = match env {
        Some(s) if s.eq_ignore_ascii_case("error") => LevelFilter::Error,
        Some(s) if s.eq_ignore_ascii_case("warn") => LevelFilter::Warn,
        Some(s) if s.eq_ignore_ascii_case("info") => LevelFilter::Info,
        Some(s) if s.eq_ignore_ascii_case("debug") => LevelFilter::Debug,
        Some(s) if s.eq_ignore_ascii_case("off") => LevelFilter::Off,
        _ => LevelFilter::Trace,
    };
    log::set_max_level(level);
}

/// 内部打印函数，供宏使用；控制台未初始化时丢弃输出
#[doc(hidden)]
pub fn _print(args: fmt::Arguments) {
    if let Some(console) = console() {
        let _ = fmt::write(&mut ConsoleWriter { console }, args);
    }
}

/// `core::fmt` 到输出设备的适配
struct ConsoleWriter {
    console: &'static dyn Console,
}

impl fmt::Write for ConsoleWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.console.put_str(s);
        Ok(())
    }
}

/// 带 ANSI 颜色级别标签的 logger
struct Logger;

impl Log for Logger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let Some(console) = console() else {
            return;
        };
        let (color, level) = match record.level() {
            Level::Error => ("31", "ERROR"),
            Level::Warn => ("93", " WARN"),
            Level::Info => ("34", " INFO"),
            Level::Debug => ("32", "DEBUG"),
            Level::Trace => ("90", "TRACE"),
        };

        // \x1b[{color}m[{level:>5}] {args}\x1b[0m\n
        console.put_str("\x1b[");
        console.put_str(color);
        console.put_str("m[");
        console.put_str(level);
        console.put_str("] ");
        let _ = fmt::write(&mut ConsoleWriter { console }, *record.args());
        console.put_str("\x1b[0m\n");
    }

    fn flush(&self) {}
}

/// Rust 风格格式化输出，不追加换行
#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => {
        $crate::_print(format_args!($($arg)*));
    };
}

/// Rust 风格格式化输出，追加 `\n`
#[macro_export]
macro_rules! println {
    () => {
        $crate::_print(format_args!("\n"));
    };
    ($($arg:tt)*) => {
        {
            $crate::_print(format_args!($($arg)*));
            $crate::_print(format_args!("\n"));
        }
    };
}

/// C 风格格式化输出宏，返回输出的字符数
///
/// ```no_run
/// minirt_console::printf!("pc = 0x%.8x, %s\n", 0x8000_0000u32, "ok");
/// ```
#[macro_export]
macro_rules! printf {
    ($fmt:expr $(, $arg:expr)* $(,)?) => {
        $crate::printf($fmt, &[$($crate::Arg::from($arg)),*])
    };
}
