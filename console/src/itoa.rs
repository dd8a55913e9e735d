//! 整数到文本的转换，与 I/O 无关

/// 转换缓冲区容量：32 位二进制数字 + 符号 + 结束符
pub const INT_BUF_LEN: usize = 34;

/// 一次转换使用的定长暂存缓冲区
pub type IntBuf = [u8; INT_BUF_LEN];

const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// 将 `value` 按 `base` 进制转换为文本，结果写入 `buf` 并以 `&str` 返回
///
/// - `base` 不在 `[2, 36]` 内时返回空串；
/// - `0` 总是得到 `"0"`；
/// - 只有十进制才给负数加 `-` 前缀，其他进制按 `u32` 的补码位模式转换；
/// - 大于 9 的数位使用小写字母 `a`..`z`。
pub fn format_integer(value: i32, base: u32, buf: &mut IntBuf) -> &str {
    if !(2..=36).contains(&base) {
        return "";
    }
    if value == 0 {
        buf[0] = b'0';
        return as_str(&buf[..1]);
    }

    let negative = value < 0 && base == 10;
    let mut num = if negative {
        value.unsigned_abs()
    } else {
        value as u32
    };

    // 低位在前收集余数
    let mut len = 0;
    while num != 0 {
        buf[len] = DIGITS[(num % base) as usize];
        num /= base;
        len += 1;
    }
    if negative {
        buf[len] = b'-';
        len += 1;
    }
    buf[..len].reverse();
    as_str(&buf[..len])
}

#[inline]
fn as_str(bytes: &[u8]) -> &str {
    // 只写入过 ASCII 数字、字母与 '-'
    unsafe { core::str::from_utf8_unchecked(bytes) }
}
