//! `printf` 风格的格式化输出引擎
//!
//! 与 C 的可变参数不同，参数以带类型标签的 [`Arg`] 切片显式传入，
//! 每个转换说明符按从左到右的顺序消费一个参数。

use crate::{itoa::{format_integer, IntBuf, INT_BUF_LEN}, Console};
use core::slice::Iter;

/// 一个格式化参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg<'a> {
    /// 有符号整数，供 `%d` 使用
    Int(i32),
    /// 无符号整数，供 `%x`、`%o`、`%b` 与 `%.*` 使用
    Uint(u32),
    /// 字节串，供 `%s` 使用；遇到 NUL 或切片末尾即视为结束
    Str(&'a [u8]),
}

impl Arg<'_> {
    /// 取有符号值，无符号值按位重解释，字符串视为 0
    #[inline]
    fn as_i32(&self) -> i32 {
        match *self {
            Arg::Int(v) => v,
            Arg::Uint(v) => v as i32,
            Arg::Str(_) => 0,
        }
    }

    /// 取无符号值，有符号值按位重解释，字符串视为 0
    #[inline]
    fn as_u32(&self) -> u32 {
        match *self {
            Arg::Int(v) => v as u32,
            Arg::Uint(v) => v,
            Arg::Str(_) => 0,
        }
    }

    /// 取字节串，数值参数视为空串
    #[inline]
    fn as_bytes(&self) -> &[u8] {
        match *self {
            Arg::Str(s) => s,
            _ => b"",
        }
    }
}

impl From<i32> for Arg<'_> {
    fn from(value: i32) -> Self {
        Arg::Int(value)
    }
}

impl From<u32> for Arg<'_> {
    fn from(value: u32) -> Self {
        Arg::Uint(value)
    }
}

impl<'a> From<&'a str> for Arg<'a> {
    fn from(value: &'a str) -> Self {
        Arg::Str(value.as_bytes())
    }
}

impl<'a> From<&'a [u8]> for Arg<'a> {
    fn from(value: &'a [u8]) -> Self {
        Arg::Str(value)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Arg<'a> {
    fn from(value: &'a [u8; N]) -> Self {
        Arg::Str(value)
    }
}

/// 记录已输出字符数的输出端
struct Emitter<'a> {
    out: &'a dyn Console,
    count: usize,
}

impl Emitter<'_> {
    #[inline]
    fn put(&mut self, c: u8) {
        self.out.put_char(c);
        self.count += 1;
    }

    /// 输出到第一个 NUL 或末尾为止
    fn puts(&mut self, s: &[u8]) {
        for &c in s.iter().take_while(|&&c| c != 0) {
            self.put(c);
        }
    }

    /// 恰好输出 `n` 个字节，不理会其中的 NUL；`n` 超出切片长度时截到切片末尾
    fn put_exact(&mut self, s: &[u8], n: usize) {
        for &c in s.iter().take(n) {
            self.put(c);
        }
    }

    /// 左侧补 `'0'` 直到长度达到 `width`，从不截断
    fn put_padded(&mut self, digits: &str, width: usize) {
        for _ in digits.len()..width {
            self.put(b'0');
        }
        self.puts(digits.as_bytes());
    }
}

/// 按 `format` 格式化 `args` 并逐字符写入 `out`，返回输出的字符数
///
/// 支持的转换：
///
/// | 说明符 | 参数 | 行为 |
/// |---|---|---|
/// | `d` | `Int` | 十进制 |
/// | `x` | `Uint` | 小写十六进制，精度表示左补零的最小位数 |
/// | `o` | `Uint` | 八进制 |
/// | `b` | `Uint` | 二进制 |
/// | `s` | `Str` | 字符串，精度表示恰好输出的字节数 |
/// | `%` | 无 | 字面量 `%` |
/// | 其他 | `Str` | 按字符串处理 |
///
/// 精度写作 `.N` 或 `.*`（由下一个参数给出），只对当前这一个转换有效。
///
/// 参数个数与类型必须与说明符匹配，这是调用方的约定：
/// 类型不符时数值按位重解释、字符串与数值互视为空/零，
/// 参数不足时对应的转换不输出任何内容。
pub fn format_and_emit(out: &dyn Console, format: impl AsRef<[u8]>, args: &[Arg<'_>]) -> usize {
    let mut emitter = Emitter { out, count: 0 };
    let mut args = args.iter();
    let mut buf: IntBuf = [0; INT_BUF_LEN];
    let mut fmt = format.as_ref().iter().copied().take_while(|&c| c != 0);

    while let Some(c) = fmt.next() {
        if c != b'%' {
            emitter.put(c);
            continue;
        }

        let mut spec = fmt.next();
        let mut precision = None;
        if spec == Some(b'.') {
            spec = fmt.next();
            if spec == Some(b'*') {
                precision = Some(next_arg(&mut args).map_or(0, |a| a.as_u32() as usize));
                spec = fmt.next();
            } else {
                let mut n = 0usize;
                while let Some(d @ b'0'..=b'9') = spec {
                    n = n.saturating_mul(10).saturating_add((d - b'0') as usize);
                    spec = fmt.next();
                }
                precision = Some(n);
            }
        }

        // 格式串以 '%' 结尾
        let Some(spec) = spec else { break };
        if spec == b'%' {
            emitter.put(b'%');
            continue;
        }
        let Some(arg) = next_arg(&mut args) else {
            continue;
        };
        match spec {
            b'd' => emitter.puts(format_integer(arg.as_i32(), 10, &mut buf).as_bytes()),
            b'x' => {
                let digits = format_integer(arg.as_u32() as i32, 16, &mut buf);
                emitter.put_padded(digits, precision.unwrap_or(0));
            }
            b'o' => emitter.puts(format_integer(arg.as_u32() as i32, 8, &mut buf).as_bytes()),
            b'b' => emitter.puts(format_integer(arg.as_u32() as i32, 2, &mut buf).as_bytes()),
            b's' => match precision {
                Some(n) => emitter.put_exact(arg.as_bytes(), n),
                None => emitter.puts(arg.as_bytes()),
            },
            _ => emitter.puts(arg.as_bytes()),
        }
    }
    emitter.count
}

#[inline]
fn next_arg<'a, 'b>(args: &mut Iter<'b, Arg<'a>>) -> Option<Arg<'a>> {
    args.next().copied()
}

/// 使用全局控制台的 [`format_and_emit`]；控制台未初始化时不输出并返回 0
pub fn printf(format: impl AsRef<[u8]>, args: &[Arg<'_>]) -> usize {
    match crate::console() {
        Some(console) => format_and_emit(console, format, args),
        None => 0,
    }
}

/// 输出字符串（到第一个 NUL 为止，不追加换行），返回输出的字符数
pub fn puts(s: impl AsRef<[u8]>) -> usize {
    match crate::console() {
        Some(console) => {
            let mut emitter = Emitter { out: console, count: 0 };
            emitter.puts(s.as_ref());
            emitter.count
        }
        None => 0,
    }
}

/// 输出单个字符，返回输出的字符数
pub fn putchar(c: u8) -> usize {
    match crate::console() {
        Some(console) => {
            console.put_char(c);
            1
        }
        None => 0,
    }
}
