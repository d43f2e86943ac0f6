//! 扫描核对核心库
//!
//! 设计要点：
//! - 清单加载一次即固定，下标是条目在会话内唯一的稳定句柄。
//! - 序列器持有全部状态（条目状态、游标、跳过队列），不使用全局变量。
//! - 展示层只消费 `SequencerEvent`，从不反向读取或改写状态。
//! - 定时行为（闪烁清除、撤销宽限）以 `(index, generation)` 标识，过期任务不会误改后来的状态。

mod catalog;
mod config;
mod errors;
mod events;
mod options;
mod report;
mod sequencer;
mod session;
mod timers;
mod types;

pub use catalog::{load_catalog, load_catalog_file, load_catalog_with_summary, LoadSummary};
pub use config::{load_policy, parse_policy};
pub use errors::{ConfigError, LoadError, SequenceError, SessionError};
pub use events::{EventSink, NullSink, SequencerEvent};
pub use options::{AdvancePolicy, SequencerPolicy, DEFAULT_MISMATCH_FLASH, DEFAULT_UNDO_GRACE};
pub use report::{ReportRow, SessionReport};
pub use sequencer::Sequencer;
pub use session::Session;
pub use types::{
    Catalog, Cursor, Item, ItemStatus, Progress, ScanOutcome, UNKNOWN_COLOR, UNKNOWN_LOCATION,
    UNKNOWN_MODEL, UNKNOWN_STORAGE,
};
