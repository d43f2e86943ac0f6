//! 序列器策略（模块）
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::ConfigError;

/// 默认撤销跳过后的宽限期
pub const DEFAULT_UNDO_GRACE: Duration = Duration::from_secs(5);
/// 默认比对失败闪烁时长
pub const DEFAULT_MISMATCH_FLASH: Duration = Duration::from_millis(2000);

/// 游标推进策略
/// - StopAtSkipped：停在第一个 Pending 或 Skipped 条目（当前行为）
/// - PassSkipped：越过 Skipped，只停在 Pending（早期行为）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdvancePolicy {
    #[default]
    StopAtSkipped,
    PassSkipped,
}

impl AdvancePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            AdvancePolicy::StopAtSkipped => "stop-at-skipped",
            AdvancePolicy::PassSkipped => "pass-skipped",
        }
    }
}

impl FromStr for AdvancePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stop-at-skipped" => Ok(AdvancePolicy::StopAtSkipped),
            "pass-skipped" => Ok(AdvancePolicy::PassSkipped),
            other => Err(ConfigError::UnknownAdvance(other.to_string())),
        }
    }
}

/// 序列器策略
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencerPolicy {
    /// 游标推进策略
    pub advance: AdvancePolicy,
    /// 撤销跳过后的宽限期；None 表示撤销永久生效
    pub undo_grace: Option<Duration>,
    /// 比对失败闪烁持续时间，到期自动清除
    pub mismatch_flash: Duration,
}

impl Default for SequencerPolicy {
    fn default() -> Self {
        Self {
            advance: AdvancePolicy::StopAtSkipped,
            undo_grace: Some(DEFAULT_UNDO_GRACE),
            mismatch_flash: DEFAULT_MISMATCH_FLASH,
        }
    }
}

impl SequencerPolicy {
    /// 判断某状态在推进时是否可停留
    pub(crate) fn stops_at(&self, status: crate::types::ItemStatus) -> bool {
        use crate::types::ItemStatus::*;
        match status {
            Pending => true,
            Skipped => self.advance == AdvancePolicy::StopAtSkipped,
            Matched => false,
        }
    }
}
