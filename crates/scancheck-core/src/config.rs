//! 策略配置文件加载（TOML）
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::errors::ConfigError;
use crate::options::{AdvancePolicy, SequencerPolicy};

/// `[policy]` 段；缺省字段沿用默认策略
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PolicySection {
    #[serde(default)]
    advance: Option<AdvancePolicy>,
    /// 0 表示关闭自动回退
    #[serde(default)]
    undo_grace_secs: Option<u64>,
    #[serde(default)]
    mismatch_flash_ms: Option<u64>,
}

/// 顶层配置文件结构
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    policy: PolicySection,
}

/// 从 TOML 文本解析策略
pub fn parse_policy(txt: &str) -> Result<SequencerPolicy, ConfigError> {
    let parsed: ConfigFile = toml::from_str(txt)?;
    let mut policy = SequencerPolicy::default();
    let section = parsed.policy;

    if let Some(advance) = section.advance {
        policy.advance = advance;
    }
    match section.undo_grace_secs {
        Some(0) => policy.undo_grace = None,
        Some(secs) => policy.undo_grace = Some(Duration::from_secs(secs)),
        None => {}
    }
    if let Some(ms) = section.mismatch_flash_ms {
        policy.mismatch_flash = Duration::from_millis(ms);
    }

    Ok(policy)
}

/// 从 TOML 配置文件加载策略
pub fn load_policy(path: &Path) -> Result<SequencerPolicy, ConfigError> {
    let txt = std::fs::read_to_string(path)?;
    parse_policy(&txt)
}
