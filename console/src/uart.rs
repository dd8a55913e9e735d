use crate::Console;
use platform::{Platform, Reg, Width, Write};

/// 内存映射的 UART 风格输出设备
///
/// 设备被假定总是就绪，没有握手或反压。
#[derive(Debug, Clone, Copy)]
pub struct UartConsole {
    addr: usize,
    width: Width,
}

impl UartConsole {
    /// 以平台配置中的输出寄存器构造
    pub const fn new(platform: &Platform) -> Self {
        Self {
            addr: platform.uart(),
            width: platform.uart_width(),
        }
    }

    /// 向输出寄存器写一个字节
    ///
    /// 每次调用恰好产生一次硬件写入，调用顺序即设备观察到的顺序。
    #[inline]
    pub fn write_byte(&self, value: u8) {
        // Platform::new 保证了地址的有效性与对齐
        match self.width {
            Width::Byte => unsafe { Reg::<u8, Write>::new(self.addr) }.write(value),
            Width::Word => unsafe { Reg::<u32, Write>::new(self.addr) }.write(value as u32),
        }
    }
}

impl Console for UartConsole {
    #[inline]
    fn put_char(&self, c: u8) {
        self.write_byte(c);
    }
}
