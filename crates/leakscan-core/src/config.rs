//! 配置文件加载（TOML）
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::options::Profile;

/// 配置文件结构；所有键均可省略，命令行参数优先
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScanConfig {
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub max_file_size: Option<u64>,
    #[serde(default)]
    pub profile: Option<Profile>,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub console: Option<bool>,
}

/// 从 TOML 文件加载配置
pub fn load_config(path: &Path) -> Result<ScanConfig> {
    let txt = std::fs::read_to_string(path)
        .with_context(|| format!("read config file {}", path.display()))?;
    parse_config(&txt).with_context(|| format!("parse config file {}", path.display()))
}

pub fn parse_config(txt: &str) -> Result<ScanConfig> {
    Ok(toml::from_str(txt)?)
}
