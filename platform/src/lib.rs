//! platform: 设备寄存器地址配置与 volatile 寄存器抽象
//!
//! 所有设备访问都经过 [`Reg`]，保证每次读写都是一次独立的、不可消除、不可重排的
//! volatile 访问。设备地址不以字面量出现在各模块中，而是集中在 [`Platform`] 里，
//! 启动时通过 [`init`] 注入为全局配置。

#![no_std]

use core::marker::PhantomData;
use spin::Once;

/// 只读访问纪律
#[derive(Debug, Clone, Copy)]
pub struct Read;

/// 只写访问纪律
#[derive(Debug, Clone, Copy)]
pub struct Write;

/// 读写访问纪律
#[derive(Debug, Clone, Copy)]
pub struct ReadWrite;

/// 位于固定地址的单个设备寄存器
///
/// `T` 决定访问宽度（`u8`、`u32`、`u64`），`Dir` 决定允许的访问方向。
#[derive(Debug)]
#[repr(transparent)]
pub struct Reg<T, Dir = ReadWrite> {
    addr: usize,
    _marker: PhantomData<(T, Dir)>,
}

impl<T, Dir> Clone for Reg<T, Dir> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, Dir> Copy for Reg<T, Dir> {}

impl<T: Copy, Dir> Reg<T, Dir> {
    /// 在 `addr` 处构造寄存器
    ///
    /// # Safety
    ///
    /// `addr` 必须指向一个按 `T` 对齐、在整个程序运行期间都有效的设备寄存器
    /// （或测试中模拟寄存器组的一块内存）。
    pub const unsafe fn new(addr: usize) -> Self {
        Self {
            addr,
            _marker: PhantomData,
        }
    }

    /// 寄存器地址
    #[inline]
    pub const fn addr(&self) -> usize {
        self.addr
    }
}

impl<T: Copy> Reg<T, Read> {
    #[inline]
    pub fn read(&self) -> T {
        unsafe { (self.addr as *const T).read_volatile() }
    }
}

impl<T: Copy> Reg<T, Write> {
    #[inline]
    pub fn write(&self, val: T) {
        unsafe { (self.addr as *mut T).write_volatile(val) }
    }
}

impl<T: Copy> Reg<T, ReadWrite> {
    #[inline]
    pub fn read(&self) -> T {
        unsafe { (self.addr as *const T).read_volatile() }
    }

    #[inline]
    pub fn write(&self, val: T) {
        unsafe { (self.addr as *mut T).write_volatile(val) }
    }
}

/// 输出设备数据寄存器的宽度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// 单字节寄存器，按字节写入
    Byte,
    /// 32 位寄存器，字节零扩展后按字写入
    Word,
}

/// 平台配置：一个平台上核心用到的全部设备地址
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    mtime: usize,
    mtimecmp: usize,
    uart: usize,
    uart_width: Width,
    tick_period: u64,
}

impl Platform {
    /// 构造平台配置
    ///
    /// # Safety
    ///
    /// `mtime` 与 `mtimecmp` 必须是 8 字节对齐的 64 位计数器/比较寄存器地址，
    /// `uart` 必须是按 `uart_width` 对齐的输出数据寄存器地址，
    /// 且它们在整个程序运行期间都有效。
    pub const unsafe fn new(
        mtime: usize,
        mtimecmp: usize,
        uart: usize,
        uart_width: Width,
        tick_period: u64,
    ) -> Self {
        Self {
            mtime,
            mtimecmp,
            uart,
            uart_width,
            tick_period,
        }
    }

    /// 定时器计数寄存器（只读）
    #[inline]
    pub fn mtime(&self) -> Reg<u64, Read> {
        unsafe { Reg::new(self.mtime) }
    }

    /// 定时器比较寄存器
    #[inline]
    pub fn mtimecmp(&self) -> Reg<u64, ReadWrite> {
        unsafe { Reg::new(self.mtimecmp) }
    }

    /// 输出设备数据寄存器地址
    #[inline]
    pub const fn uart(&self) -> usize {
        self.uart
    }

    #[inline]
    pub const fn uart_width(&self) -> Width {
        self.uart_width
    }

    /// 定时器中断的固定周期（计数单位）
    #[inline]
    pub const fn tick_period(&self) -> u64 {
        self.tick_period
    }
}

/// 全局平台配置单例
static PLATFORM: Once<&'static Platform> = Once::new();

/// 注入全局平台配置
///
/// 只有首次调用生效，之后的调用被忽略。
pub fn init(platform: &'static Platform) {
    PLATFORM.call_once(|| platform);
}

/// 读取全局平台配置，未初始化时返回 `None`
#[inline]
pub fn get() -> Option<&'static Platform> {
    PLATFORM.get().copied()
}
