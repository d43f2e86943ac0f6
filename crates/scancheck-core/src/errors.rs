//! 错误类型
use thiserror::Error;

/// 清单加载失败；任何一种都不会安装部分清单
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("missing required column(s): {}", missing.join(", "))]
    MissingRequiredColumns { missing: Vec<&'static str> },
    #[error("no scannable rows in the list")]
    EmptyCatalog,
}

/// 调用方违反命令约定时返回
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("nothing to skip: every item has been passed")]
    NothingToSkip,
    #[error("index {index} is out of range (catalog has {len} items)")]
    InvalidIndex { index: usize, len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no list loaded")]
    NoCatalog,
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Sequence(#[from] SequenceError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unknown advance policy `{0}` (expected stop-at-skipped or pass-skipped)")]
    UnknownAdvance(String),
}
