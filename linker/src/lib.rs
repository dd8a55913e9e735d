#![no_std]

//! linker crate 提供固件链接脚本、启动入口和数据段初始化

/// 链接脚本文本（字节序列）
///
/// 该链接脚本用于 RISC-V 单核微控制器：代码与只读数据放在 FLASH，
/// `.data` 在 RAM 中运行、在 FLASH 中加载，`.bss` 只占 RAM。
/// 存储区域由链接时同目录下的 `memory.x` 提供。
pub const SCRIPT: &[u8] = include_bytes!("linker.ld");

/// 数据段布局
///
/// 所有地址都按 4 字节对齐，区间左闭右开。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataLayout {
    load: usize,
    sdata: usize,
    edata: usize,
    sbss: usize,
    ebss: usize,
}

impl DataLayout {
    /// 由显式地址构造布局
    pub const fn new(load: usize, sdata: usize, edata: usize, sbss: usize, ebss: usize) -> Self {
        Self {
            load,
            sdata,
            edata,
            sbss,
            ebss,
        }
    }

    /// 通过读取链接符号地址定位布局
    pub fn locate() -> Self {
        extern "C" {
            static _data_load_address: u32;
            static _sdata: u32;
            static _edata: u32;
            static _sbss: u32;
            static _ebss: u32;
        }

        unsafe {
            Self {
                load: &_data_load_address as *const u32 as usize,
                sdata: &_sdata as *const u32 as usize,
                edata: &_edata as *const u32 as usize,
                sbss: &_sbss as *const u32 as usize,
                ebss: &_ebss as *const u32 as usize,
            }
        }
    }

    /// `.data` 的加载地址
    pub fn load_address(&self) -> usize {
        self.load
    }

    /// `.data` 的运行地址区间
    pub fn data(&self) -> core::ops::Range<usize> {
        self.sdata..self.edata
    }

    /// `.bss` 区间
    pub fn bss(&self) -> core::ops::Range<usize> {
        self.sbss..self.ebss
    }

    /// 将 `.data` 的初值从加载地址逐字拷贝到运行地址
    ///
    /// 加载地址与运行地址相同时什么也不做。
    ///
    /// # Safety
    ///
    /// 必须在任何静态变量被使用之前调用，且布局中的地址必须有效。
    pub unsafe fn init_data(&self) {
        if self.load == self.sdata {
            return;
        }
        let mut src = self.load as *const u32;
        let mut dst = self.sdata as *mut u32;
        let end = self.edata as *mut u32;
        while dst < end {
            core::ptr::write_volatile(dst, core::ptr::read_volatile(src));
            src = src.add(1);
            dst = dst.add(1);
        }
    }

    /// 将 `.bss` 逐字清零
    ///
    /// # Safety
    ///
    /// 同 [`DataLayout::init_data`]。
    pub unsafe fn zero_bss(&self) {
        let mut ptr = self.sbss as *mut u32;
        let end = self.ebss as *mut u32;
        while ptr < end {
            core::ptr::write_volatile(ptr, 0);
            ptr = ptr.add(1);
        }
    }
}

/// 定义固件启动入口 `_start`
///
/// 设置全局指针与栈指针（栈顶为链接脚本中的 `_stack_top`），然后跳转到 `$entry`。
/// `$entry` 必须是 `extern "C" fn() -> !`。
///
/// # 示例
/// ```ignore
/// linker::boot0!(rust_main);
/// ```
#[macro_export]
macro_rules! boot0 {
    ($entry:ident) => {
        core::arch::global_asm!(
            ".section .text.entry",
            ".globl _start",
            "_start:",
            ".option push",
            ".option norelax",
            "    la gp, __global_pointer$",
            ".option pop",
            "    la sp, _stack_top",
            "    j {entry}",
            entry = sym $entry,
        );
    };
}
