//! console (minirt-console) crate 功能性验证测试
//!
//! 这些测试验证 console crate 对外提供的 API 的正确性。
//! 测试在用户态环境运行，使用 std。

use minirt_console::{
    format_and_emit, format_integer, init_console, printf, putchar, puts, set_log_level, Arg,
    Console, IntBuf, UartConsole, INT_BUF_LEN,
};
use platform::{Platform, Width};
use std::sync::{Arc, Mutex, Once};

// 测试用的 Console 实现
struct TestConsole {
    output: Arc<Mutex<Vec<u8>>>,
}

impl Console for TestConsole {
    fn put_char(&self, c: u8) {
        self.output.lock().unwrap().push(c);
    }
}

fn local() -> (TestConsole, Arc<Mutex<Vec<u8>>>) {
    let output = Arc::new(Mutex::new(Vec::new()));
    (
        TestConsole {
            output: output.clone(),
        },
        output,
    )
}

// 格式化到本地 console，返回 (输出, 返回的字符数)
fn emit(format: &str, args: &[Arg]) -> (String, usize) {
    let (console, output) = local();
    let n = format_and_emit(&console, format, args);
    let bytes = output.lock().unwrap().clone();
    (String::from_utf8(bytes).unwrap(), n)
}

fn itoa(value: i32, base: u32) -> String {
    let mut buf: IntBuf = [0; INT_BUF_LEN];
    format_integer(value, base, &mut buf).to_string()
}

// 共享的全局 console：CONSOLE 只能初始化一次，所有用到全局输出的测试共用它，
// 并用一把锁串行化，防止并行测试互相污染缓冲区
static SHARED_OUTPUT: Mutex<Option<Arc<Mutex<Vec<u8>>>>> = Mutex::new(None);
static SHARED_CONSOLE_INIT: Once = Once::new();
static GLOBAL_LOCK: Mutex<()> = Mutex::new(());

fn shared_output() -> Arc<Mutex<Vec<u8>>> {
    SHARED_CONSOLE_INIT.call_once(|| {
        let (console, output) = local();
        init_console(Box::leak(Box::new(console)));
        *SHARED_OUTPUT.lock().unwrap() = Some(output);
    });
    SHARED_OUTPUT.lock().unwrap().as_ref().unwrap().clone()
}

fn take_output() -> String {
    let output = shared_output();
    let bytes = std::mem::take(&mut *output.lock().unwrap());
    String::from_utf8(bytes).unwrap()
}

// ---------------------------------------------------------------------------
// format_integer
// ---------------------------------------------------------------------------

#[test]
fn test_format_integer_zero_every_base() {
    for base in 2..=36 {
        assert_eq!(itoa(0, base), "0", "base {base}");
    }
}

#[test]
fn test_format_integer_invalid_base() {
    for base in [0, 1, 37, 100, u32::MAX] {
        assert_eq!(itoa(12345, base), "", "base {base}");
        assert_eq!(itoa(0, base), "", "base {base}");
    }
}

#[test]
fn test_format_integer_decimal() {
    assert_eq!(itoa(42, 10), "42");
    assert_eq!(itoa(-42, 10), "-42");
    assert_eq!(itoa(i32::MAX, 10), "2147483647");
    assert_eq!(itoa(i32::MIN, 10), "-2147483648");
}

#[test]
fn test_format_integer_negative_non_decimal_is_unsigned() {
    // 非十进制的负数按补码位模式转换，没有符号
    assert_eq!(itoa(-1, 16), "ffffffff");
    assert_eq!(itoa(-1, 2), "1".repeat(32));
    assert_eq!(itoa(-1, 8), "37777777777");
    assert_eq!(itoa(i32::MIN, 16), "80000000");
}

#[test]
fn test_format_integer_letters_lowercase() {
    assert_eq!(itoa(0xab, 16), "ab");
    assert_eq!(itoa(35, 36), "z");
    assert_eq!(itoa(36, 36), "10");
    assert_eq!(itoa(255, 2), "11111111");
}

#[test]
fn test_format_integer_parses_back() {
    let samples = [
        1, -1, 7, -7, 10, 255, -255, 4096, 65535, 1 << 20, -(1 << 20), 123_456_789,
        i32::MAX, i32::MIN,
    ];
    for base in 2..=36u32 {
        for &v in &samples {
            let s = itoa(v, base);
            if base == 10 {
                assert_eq!(i32::from_str_radix(&s, 10).unwrap(), v);
            } else {
                assert!(!s.starts_with('-'));
                assert_eq!(u32::from_str_radix(&s, base).unwrap(), v as u32, "{v} base {base}");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// format_and_emit
// ---------------------------------------------------------------------------

#[test]
fn test_printf_plain_text() {
    assert_eq!(emit("hello world\n", &[]), ("hello world\n".into(), 12));
}

#[test]
fn test_printf_stops_at_nul() {
    let (console, output) = local();
    let n = format_and_emit(&console, b"abc\0def", &[]);
    assert_eq!(n, 3);
    assert_eq!(output.lock().unwrap().as_slice(), b"abc");
}

#[test]
fn test_printf_conversions() {
    let (s, n) = emit(
        "%d %x %o %b %s",
        &[
            Arg::Int(-12),
            Arg::Uint(0xbeef),
            Arg::Uint(8),
            Arg::Uint(5),
            Arg::from("str"),
        ],
    );
    assert_eq!(s, "-12 beef 10 101 str");
    assert_eq!(n, s.len());
}

#[test]
fn test_printf_literal_percent() {
    assert_eq!(emit("100%%", &[]), ("100%".into(), 4));
    // '%%' 不消费参数
    assert_eq!(emit("%%%d", &[Arg::Int(3)]).0, "%3");
}

#[test]
fn test_printf_hex_precision() {
    assert_eq!(emit("%.*x", &[Arg::Uint(4), Arg::Uint(0xab)]).0, "00ab");
    assert_eq!(emit("%.*x", &[Arg::Uint(1), Arg::Uint(0xab)]).0, "ab");
    assert_eq!(emit("%.4x", &[Arg::Uint(0xab)]).0, "00ab");
    assert_eq!(emit("%.8x", &[Arg::Uint(0)]).0, "00000000");
    assert_eq!(emit("%.2x", &[Arg::Uint(0x12345)]).0, "12345");
}

#[test]
fn test_printf_hex_of_negative_is_twos_complement() {
    assert_eq!(emit("%x", &[Arg::Uint(u32::MAX)]).0, "ffffffff");
    assert_eq!(emit("%x", &[Arg::Int(-1)]).0, "ffffffff");
}

#[test]
fn test_printf_string_precision_exact() {
    // 恰好输出 N 个字节，即使其中没有结束符或含有 NUL
    let buf: &[u8] = b"abcdefgh";
    let (console, output) = local();
    let n = format_and_emit(&console, "[%.*s]", &[Arg::Uint(5), Arg::Str(buf)]);
    assert_eq!(n, 7);
    assert_eq!(output.lock().unwrap().as_slice(), b"[abcde]");

    let (console, output) = local();
    let n = format_and_emit(&console, "%.4s", &[Arg::Str(b"a\0bcd")]);
    assert_eq!(n, 4);
    assert_eq!(output.lock().unwrap().as_slice(), b"a\0bc");
}

#[test]
fn test_printf_string_precision_beyond_slice() {
    // N 超出切片长度时在切片末尾停止，计数只包含实际输出
    assert_eq!(emit("<%.*s>", &[Arg::Uint(10), Arg::from("abc")]), ("<abc>".into(), 5));
    assert_eq!(emit("%.9s", &[Arg::from("xy")]), ("xy".into(), 2));
}

#[test]
fn test_printf_precision_ignored_for_d_o_b() {
    assert_eq!(emit("%.4d", &[Arg::Int(7)]), ("7".into(), 1));
    assert_eq!(emit("%.4o", &[Arg::Uint(8)]), ("10".into(), 2));
    assert_eq!(emit("%.8b", &[Arg::Uint(5)]), ("101".into(), 3));
    // .* 仍然消费一个参数
    assert_eq!(emit("%.*d|%d", &[Arg::Uint(6), Arg::Int(-3), Arg::Int(4)]).0, "-3|4");
}

#[test]
fn test_printf_string_without_precision_stops_at_nul() {
    assert_eq!(emit("%s|", &[Arg::Str(b"ab\0cd")]).0, "ab|");
}

#[test]
fn test_printf_precision_does_not_leak() {
    // 第一个转换的精度不能影响后面的转换
    let (s, _) = emit(
        "%.*s-%s-%x",
        &[
            Arg::Uint(2),
            Arg::from("abcdef"),
            Arg::from("xyz"),
            Arg::Uint(0xf),
        ],
    );
    assert_eq!(s, "ab-xyz-f");

    let (s, _) = emit("%.6x %x", &[Arg::Uint(1), Arg::Uint(2)]);
    assert_eq!(s, "000001 2");
}

#[test]
fn test_printf_unknown_specifier_as_string() {
    assert_eq!(emit("<%q>", &[Arg::from("fallback")]).0, "<fallback>");
}

#[test]
fn test_printf_argument_order() {
    let (s, _) = emit(
        "%s=%d,%s=%x",
        &[Arg::from("a"), Arg::Int(1), Arg::from("b"), Arg::Uint(0x1f)],
    );
    assert_eq!(s, "a=1,b=1f");
}

#[test]
fn test_printf_missing_arguments_emit_nothing() {
    assert_eq!(emit("x%dy%s", &[]), ("xy".into(), 2));
}

#[test]
fn test_printf_trailing_percent() {
    assert_eq!(emit("abc%", &[]), ("abc".into(), 3));
}

#[test]
fn test_arg_from_conversions() {
    assert_eq!(Arg::from(-3i32), Arg::Int(-3));
    assert_eq!(Arg::from(3u32), Arg::Uint(3));
    assert_eq!(Arg::from("hi"), Arg::Str(b"hi"));
    assert_eq!(Arg::from(&b"hi"[..]), Arg::Str(b"hi"));
    assert_eq!(Arg::from(b"hi"), Arg::Str(b"hi"));
}

// ---------------------------------------------------------------------------
// UartConsole
// ---------------------------------------------------------------------------

#[test]
fn test_uart_console_byte_register() {
    let bank: &'static mut [u64; 3] = Box::leak(Box::new([0; 3]));
    let base = bank.as_mut_ptr() as usize;
    let p = unsafe { Platform::new(base, base + 8, base + 16, Width::Byte, 1) };
    let uart = UartConsole::new(&p);

    uart.write_byte(b'A');
    assert_eq!(unsafe { *((base + 16) as *const u8) }, b'A');
    uart.put_char(b'B');
    assert_eq!(unsafe { *((base + 16) as *const u8) }, b'B');
    // 字节寄存器只写一个字节
    assert_eq!(unsafe { *((base + 17) as *const u8) }, 0);
}

#[test]
fn test_uart_console_word_register() {
    let bank: &'static mut [u64; 3] = Box::leak(Box::new([u64::MAX; 3]));
    let base = bank.as_mut_ptr() as usize;
    let p = unsafe { Platform::new(base, base + 8, base + 16, Width::Word, 1) };
    let uart = UartConsole::new(&p);

    uart.write_byte(b'z');
    assert_eq!(unsafe { *((base + 16) as *const u32) }, b'z' as u32);
}

// ---------------------------------------------------------------------------
// 全局 console
// ---------------------------------------------------------------------------

#[test]
fn test_global_printf_counts() {
    let _guard = GLOBAL_LOCK.lock().unwrap();
    shared_output();
    take_output();

    let n = printf("tick %d\n", &[Arg::Int(7)]);
    assert_eq!(take_output(), "tick 7\n");
    assert_eq!(n, 7);

    let n = minirt_console::printf!("%s:%.4x", "pc", 0x1fu32);
    assert_eq!(take_output(), "pc:001f");
    assert_eq!(n, 7);
}

#[test]
fn test_global_puts_putchar() {
    let _guard = GLOBAL_LOCK.lock().unwrap();
    shared_output();
    take_output();

    assert_eq!(puts("hello"), 5);
    assert_eq!(putchar(b'!'), 1);
    assert_eq!(puts(b"ab\0cd"), 2);
    assert_eq!(take_output(), "hello!ab");
}

#[test]
fn test_print_macros() {
    let _guard = GLOBAL_LOCK.lock().unwrap();
    shared_output();
    take_output();

    minirt_console::print!("a{}", 1);
    minirt_console::println!();
    minirt_console::println!("b {:#x}", 255);
    assert_eq!(take_output(), "a1\nb 0xff\n");
}

#[test]
fn test_log_integration() {
    let _guard = GLOBAL_LOCK.lock().unwrap();
    shared_output();
    take_output();
    set_log_level(Some("TRACE"));

    log::trace!("trace message");
    log::error!("error message");
    let out = take_output();
    assert!(out.contains("[TRACE] trace message"));
    assert!(out.contains("\x1b[31m[ERROR] error message\x1b[0m\n"));

    set_log_level(Some("warn"));
    log::info!("hidden");
    assert!(!take_output().contains("hidden"));
    set_log_level(None);
}
