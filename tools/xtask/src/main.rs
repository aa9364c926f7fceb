//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `cov-runtime`: 运行 tween-runtime 覆盖率
//! - `config-check`: 检查 Tween 配置文件（过渡函数名、属性名、时长）
//! - `simulate`: 按固定帧率模拟播放 Tween 配置并输出每帧属性值

use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};
use std::rc::Rc;

use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tween_runtime::{
    Juggler, JugglerEvent, PropertyBag, PropertyKind, TransitionRegistry, TweenConfig,
};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "xtask", about = "开发辅助工具")]
struct Cli {
    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: XtaskCommand,
}

#[derive(Subcommand)]
enum XtaskCommand {
    /// 运行 fmt、clippy、test 门禁检查
    CheckAll,
    /// 运行 tween-runtime 覆盖率报告
    CovRuntime,
    /// 检查 Tween 配置文件（默认 assets/tweens/）
    ConfigCheck {
        /// 配置文件或目录
        path: Option<PathBuf>,
    },
    /// 模拟播放 Tween 配置
    Simulate {
        /// 配置文件
        path: PathBuf,
        /// 帧率
        #[arg(long, default_value_t = 60.0)]
        fps: f32,
        /// 最多模拟的帧数
        #[arg(long = "frames", default_value_t = 600)]
        max_frames: u32,
        /// 初始属性值，格式 `name=value`，可重复
        #[arg(long = "from", value_name = "NAME=VALUE")]
        initial: Vec<String>,
        /// 以 JSON 行输出
        #[arg(long)]
        json: bool,
    },
}

fn run(step: &str, cmd: &mut Command) -> anyhow::Result<()> {
    eprintln!("\n==> {step}");
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("{step} failed with {status}");
    }
    Ok(())
}

fn ensure_cargo_llvm_cov_available() -> anyhow::Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.args(["llvm-cov", "--version"]);
    let status = cmd.status();
    match status {
        Ok(s) if s.success() => Ok(()),
        _ => anyhow::bail!(
            "cargo llvm-cov 不可用。\n\
请先安装：\n\
  - cargo install cargo-llvm-cov\n\
  - rustup component add llvm-tools-preview\n\
然后重试。"
        ),
    }
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        XtaskCommand::CheckAll => {
            let mut fmt = Command::new("cargo");
            fmt.args(["fmt", "--all", "--", "--check"]);
            run("cargo fmt --all -- --check", &mut fmt)?;

            let mut clippy = Command::new("cargo");
            clippy.args(["clippy", "--workspace", "--all-targets"]);
            run("cargo clippy --workspace --all-targets", &mut clippy)?;

            let mut test = Command::new("cargo");
            test.args(["test", "--workspace"]);
            run("cargo test --workspace", &mut test)?;
        }
        XtaskCommand::CovRuntime => {
            ensure_cargo_llvm_cov_available()?;

            let mut cov = Command::new("cargo");
            cov.args(["llvm-cov", "-p", "tween-runtime", "--all-features", "--html"]);
            run("cargo llvm-cov -p tween-runtime --all-features --html", &mut cov)?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        XtaskCommand::ConfigCheck { path } => {
            config_check(path.as_deref())?;
        }
        XtaskCommand::Simulate {
            path,
            fps,
            max_frames,
            initial,
            json,
        } => {
            simulate(&path, fps, max_frames, &initial, json)?;
        }
    }

    Ok(())
}

//=============================================================================
// config-check 命令实现
//=============================================================================

/// 默认配置目录（相对于 workspace root）
const DEFAULT_CONFIG_DIR: &str = "assets/tweens";

/// 执行配置检查
fn config_check(path: Option<&Path>) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_DIR));

    let files = if path.is_file() {
        vec![path.to_path_buf()]
    } else if path.is_dir() {
        collect_config_files(path)
    } else {
        anyhow::bail!(
            "路径不存在: {}\n请在 workspace 根目录运行，或指定配置路径",
            path.display()
        );
    };

    if files.is_empty() {
        eprintln!("未找到配置文件（.json）");
        return Ok(());
    }

    eprintln!("==> 检查 {} 个配置文件...\n", files.len());

    let registry = TransitionRegistry::new();
    let mut error_count = 0;
    for file in &files {
        let config_id = file.display().to_string();
        match TweenConfig::load(file) {
            Ok(config) => {
                for e in config.validate(&registry) {
                    eprintln!("[ERROR] {}: {}", config_id, e);
                    error_count += 1;
                }
            }
            Err(e) => {
                eprintln!("[ERROR] {}: {}", config_id, e);
                error_count += 1;
            }
        }
    }

    eprintln!("─────────────────────────────────────────────────────");
    eprintln!("检查完成: {} 个配置", files.len());
    if error_count > 0 {
        eprintln!("❌ {} 个错误", error_count);
        anyhow::bail!("配置检查发现错误");
    }
    eprintln!("✅ 检查通过，无错误");
    Ok(())
}

/// 收集目录下的所有配置文件
fn collect_config_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

//=============================================================================
// simulate 命令实现
//=============================================================================

fn simulate(
    path: &Path,
    fps: f32,
    max_frames: u32,
    initial: &[String],
    json: bool,
) -> anyhow::Result<()> {
    if !fps.is_finite() || fps <= 0.0 {
        anyhow::bail!("无效的帧率: {fps}");
    }

    let config = TweenConfig::load(path)?;
    let registry = TransitionRegistry::new();

    let target = Rc::new(seed_target(&config)?);
    for pair in initial {
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("无效的初始值 '{pair}'，应为 name=value"))?;
        let value: f32 = value.trim().parse()?;
        target.insert(name.trim(), value);
    }

    let mut juggler = Juggler::new();
    juggler.add_tween(config.build(&target, &registry)?);
    juggler.take_events();

    let dt = 1.0 / fps;
    for frame in 1..=max_frames {
        juggler.advance(dt);

        if json {
            println!("{}", serde_json::to_string(&target.snapshot())?);
        } else {
            let values: Vec<String> = target
                .snapshot()
                .iter()
                .map(|(name, value)| format!("{name}={value:.3}"))
                .collect();
            println!("{:>5} {:>8.3}s  {}", frame, juggler.elapsed_time(), values.join(" "));
        }

        for event in juggler.take_events() {
            if let JugglerEvent::Chained { from, to } = event {
                info!(from = %from, to = %to, "开始后续 Tween");
            }
        }

        if juggler.is_empty() {
            info!(frames = frame, "模拟完成");
            return Ok(());
        }
    }

    info!(max_frames, "达到最大帧数，模拟中止");
    Ok(())
}

/// 为配置链中出现的每个属性建立初始值为 0 的槽位
fn seed_target(config: &TweenConfig) -> anyhow::Result<PropertyBag> {
    let bag = PropertyBag::new();
    let mut current = Some(config);
    while let Some(c) = current {
        for name in c.properties.keys() {
            let (attribute, _) = PropertyKind::parse(name)?;
            if bag.get(attribute).is_none() {
                bag.insert(attribute, 0.0);
            }
        }
        current = c.next.as_deref();
    }
    Ok(bag)
}
