#![no_std]

//! newlib 系统调用桩
//!
//! 为链接 newlib 的 C 代码提供最小的系统调用实现：
//! 写操作逐字节交给已注册的控制台，其余调用返回固定值。
//! 在 `target_os = "none"` 上同时以 C 符号名（`_write` 等）导出。
//!
//! 不提供 `_sbrk`（不支持动态内存分配）。

use minirt_console::{console, Console};

/// 标准输入文件描述符
pub const STDIN: i32 = 0;

/// 标准输出文件描述符
pub const STDOUT: i32 = 1;

/// 标准错误文件描述符
pub const STDERR: i32 = 2;

/// 将 `buf` 的每个字节写到控制台，返回写入的字节数
///
/// 所有文件描述符都写到同一个设备。控制台未初始化时丢弃数据，但仍报告全部写入。
pub fn write(_fd: i32, buf: &[u8]) -> isize {
    if let Some(console) = console() {
        for &b in buf {
            console.put_char(b);
        }
    }
    buf.len() as isize
}

/// 没有可关闭的文件
pub fn close(_fd: i32) -> i32 {
    -1
}

/// 所有描述符都是终端
pub fn isatty(_fd: i32) -> i32 {
    1
}

/// 字符设备不支持定位，总是返回 0
pub fn lseek(_fd: i32, _offset: i32, _whence: i32) -> i32 {
    0
}

/// 没有其他进程可发信号
pub fn kill(_pid: i32, _sig: i32) {}

/// 没有进程标识
pub fn getpid() -> i32 {
    -1
}

/// 字符设备文件类型
pub const S_IFCHR: u32 = 0o020000;

/// riscv32 newlib `struct stat` 的开头部分
///
/// `_fstat` 只写 `st_mode`，其后的字段保持调用方的内容不变。
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    pub st_dev: i16,
    pub st_ino: u16,
    pub st_mode: u32,
}

/// 所有描述符都是字符设备，newlib 的 stdio 据此选择行缓冲
pub fn fstat(_fd: i32, st: &mut Stat) -> i32 {
    st.st_mode = S_IFCHR;
    0
}

#[cfg(target_os = "none")]
mod exports {
    #[no_mangle]
    extern "C" fn _write(file: i32, buf: *const u8, nbytes: i32) -> i32 {
        if buf.is_null() || nbytes <= 0 {
            return 0;
        }
        let buf = unsafe { core::slice::from_raw_parts(buf, nbytes as usize) };
        super::write(file, buf) as i32
    }

    #[no_mangle]
    extern "C" fn _close(fd: i32) -> i32 {
        super::close(fd)
    }

    #[no_mangle]
    extern "C" fn _isatty(fd: i32) -> i32 {
        super::isatty(fd)
    }

    #[no_mangle]
    extern "C" fn _lseek(fd: i32, offset: i32, whence: i32) -> i32 {
        super::lseek(fd, offset, whence)
    }

    #[no_mangle]
    extern "C" fn _kill(pid: i32, sig: i32) {
        super::kill(pid, sig)
    }

    #[no_mangle]
    extern "C" fn _getpid() -> i32 {
        super::getpid()
    }

    #[no_mangle]
    extern "C" fn _fstat(fd: i32, st: *mut super::Stat) -> i32 {
        match unsafe { st.as_mut() } {
            Some(st) => super::fstat(fd, st),
            None => -1,
        }
    }
}
