use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use leakscan_core::{load_config, scan_with_options, Profile, ScanConfig, ScanOptions, DEFAULT_MAX_FILE_SIZE};
use std::path::PathBuf;
use tracing::info;

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(name = "leakscan", version, about = "扫描目录中包含敏感字面量的文件")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 扫描目录并生成报告文件
    Scan(ScanArgs),
}

#[derive(clap::Args, Debug, Default)]
struct ScanArgs {
    /// 扫描根目录
    #[arg(long)]
    input: PathBuf,

    /// 敏感字面量（区分大小写的子串匹配）
    #[arg(long)]
    pattern: Option<String>,

    /// 最大扫描文件大小（字节）；超过则只报告“跳过”
    #[arg(long)]
    max_file_size: Option<u64>,

    /// 报告档位：verbose（逐行文本）或 brief（CSV）
    #[arg(long, value_parser = ["verbose", "brief"])]
    profile: Option<String>,

    /// 报告文件路径（默认 result.txt / result.csv）
    #[arg(long)]
    output: Option<PathBuf>,

    /// 同时输出到控制台
    #[arg(long)]
    console: bool,

    /// 配置文件路径（TOML）；命令行参数优先
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // 初始化日志（支持通过 RUST_LOG 控制等级，例如 info、debug）
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan(args) => {
            let config = match &args.config {
                Some(path) => load_config(path)?,
                None => ScanConfig::default(),
            };
            let opts = resolve_options(args, config)?;
            info!(root = ?opts.root, output = ?opts.output, profile = %opts.profile, "starting scan");

            let stats = scan_with_options(&opts).context("scan failed")?;
            info!(
                sensitive = stats.sensitive,
                non_sensitive = stats.non_sensitive,
                skipped = stats.skipped,
                failed = stats.failed,
                "scan finished"
            );
        }
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // 日志写到 stderr，stdout 留给控制台报告
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// 合并命令行与配置文件：命令行优先，其次配置文件，最后默认值
fn resolve_options(args: ScanArgs, config: ScanConfig) -> Result<ScanOptions> {
    let Some(pattern) = args.pattern.or(config.pattern) else {
        bail!("a sensitive pattern is required (--pattern or `pattern` in the config file)");
    };
    let profile = match args.profile {
        Some(p) => p.parse::<Profile>().map_err(anyhow::Error::msg)?,
        None => config.profile.unwrap_or_default(),
    };
    let output = args
        .output
        .or(config.output)
        .unwrap_or_else(|| profile.default_output());

    Ok(ScanOptions {
        root: args.input,
        pattern,
        max_file_size: args.max_file_size.or(config.max_file_size).unwrap_or(DEFAULT_MAX_FILE_SIZE),
        profile,
        output,
        console: args.console || config.console.unwrap_or(false),
    })
}
