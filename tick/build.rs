use serde_derive::Deserialize;
use std::{collections::BTreeMap, env, fs, path::PathBuf};

/// platform.toml 中的一节
#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Board {
    mtime: u64,
    mtimecmp: u64,
    uart: u64,
    uart_width: UartWidth,
    tick_period: u64,
    flash: Region,
    ram: Region,
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum UartWidth {
    Byte,
    Word,
}

#[derive(Deserialize)]
struct Region {
    origin: u64,
    length: u64,
}

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());

    // 读取平台配置
    let config = fs::read_to_string(manifest_dir.join("platform.toml"))
        .expect("Failed to read platform.toml");
    let boards: BTreeMap<String, Board> =
        toml::from_str(&config).expect("Failed to parse platform.toml");
    let name = env::var("PLATFORM").unwrap_or_else(|_| "newlib".into());
    let board = boards
        .get(&name)
        .unwrap_or_else(|| panic!("unknown platform `{name}` in platform.toml"));

    // 生成平台常量
    let width = match board.uart_width {
        UartWidth::Byte => "Byte",
        UartWidth::Word => "Word",
    };
    let platform_rs = format!(
        "// Auto-generated file from build.rs\n\
         // Do not edit manually\n\n\
         pub const PLATFORM_NAME: &str = {name:?};\n\n\
         pub const PLATFORM: platform::Platform = unsafe {{\n    \
             platform::Platform::new({:#x}, {:#x}, {:#x}, platform::Width::{width}, {})\n\
         }};\n",
        board.mtime, board.mtimecmp, board.uart, board.tick_period,
    );
    fs::write(out_dir.join("platform.rs"), platform_rs).expect("Failed to write platform.rs");

    // 存储布局与链接脚本
    let memory_x = format!(
        "MEMORY\n{{\n    FLASH : ORIGIN = {:#x}, LENGTH = {:#x}\n    RAM : ORIGIN = {:#x}, LENGTH = {:#x}\n}}\n",
        board.flash.origin, board.flash.length, board.ram.origin, board.ram.length,
    );
    fs::write(out_dir.join("memory.x"), memory_x).expect("Failed to write memory.x");
    let linker_script_path = out_dir.join("linker.ld");
    fs::write(&linker_script_path, linker::SCRIPT).expect("Failed to write linker.ld");

    // 只有裸机目标才使用链接脚本，主机上构建的是占位程序
    if env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("none") {
        println!("cargo:rustc-link-search={}", out_dir.display());
        println!("cargo:rustc-link-arg=-T{}", linker_script_path.display());
    }

    // 触发重建条件
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=platform.toml");
    println!("cargo:rerun-if-env-changed=PLATFORM");
    println!("cargo:rerun-if-env-changed=LOG");
}
