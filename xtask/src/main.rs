//! 构建与运行固件的主机端工具
//!
//! ```text
//! cargo xtask build --platform newlib --log info
//! cargo xtask qemu --log trace
//! ```

use clap::{Args, Parser, Subcommand};
use once_cell::sync::Lazy;
use os_xtask_utils::{Cargo, CommandExt, Qemu};
use std::path::{Path, PathBuf};

/// 固件目标三元组
const TARGET: &str = "riscv32imac-unknown-none-elf";

static PROJECT: Lazy<&'static Path> =
    Lazy::new(|| Path::new(env!("CARGO_MANIFEST_DIR")).parent().unwrap());

static TARGET_DIR: Lazy<PathBuf> = Lazy::new(|| PROJECT.join("target").join(TARGET));

#[derive(Parser)]
#[clap(name = "xtask", about = "Build and run the minirt tick firmware")]
struct Cli {
    #[clap(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// 构建固件
    Build(BuildArgs),
    /// 在 QEMU virt 上构建并运行固件
    Qemu(QemuArgs),
}

#[derive(Args)]
struct BuildArgs {
    /// platform.toml 中的平台名
    #[clap(long, default_value = "newlib")]
    platform: String,
    /// 日志级别（error/warn/info/debug/trace/off）
    #[clap(long)]
    log: Option<String>,
    /// 以 release 配置构建
    #[clap(long)]
    release: bool,
}

#[derive(Args)]
struct QemuArgs {
    /// 日志级别（error/warn/info/debug/trace/off）
    #[clap(long)]
    log: Option<String>,
    /// 以 release 配置构建
    #[clap(long)]
    release: bool,
}

fn main() {
    match Cli::parse().command {
        Cmd::Build(args) => {
            let elf = args.make();
            println!("{}", elf.display());
        }
        Cmd::Qemu(args) => args.run(),
    }
}

impl BuildArgs {
    /// 构建固件并返回 ELF 路径
    fn make(&self) -> PathBuf {
        Cargo::build()
            .package("tick")
            .env("PLATFORM", &self.platform)
            .optional(&self.log, |cargo, log| {
                cargo.env("LOG", log);
            })
            .conditional(self.release, |cargo| {
                cargo.release();
            })
            .target(TARGET)
            .invoke();
        TARGET_DIR
            .join(if self.release { "release" } else { "debug" })
            .join("tick")
    }
}

impl QemuArgs {
    fn run(self) {
        let elf = BuildArgs {
            platform: "qemu".into(),
            log: self.log,
            release: self.release,
        }
        .make();

        Qemu::system("riscv32")
            .args(["-machine", "virt"])
            .args(["-bios", "none"])
            .arg("-nographic")
            .arg("-kernel")
            .arg(elf)
            .invoke();
    }
}
