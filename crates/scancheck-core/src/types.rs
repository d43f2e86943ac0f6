//! 公共类型（对外暴露）
use serde::Serialize;

/// 可选字段缺失时的占位值
pub const UNKNOWN_MODEL: &str = "Unknown Model";
pub const UNKNOWN_STORAGE: &str = "Unknown Storage";
pub const UNKNOWN_COLOR: &str = "Unknown Color";
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

/// 清单中的单个条目（加载后不可变）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    /// 订单号（Order 列）
    pub order_label: String,
    /// 扫描比对值（ESN 列），非空，不保证唯一
    pub identifier: String,
    pub model: String,
    /// 规格一，例如容量（Capacity 列）
    pub variant1: String,
    /// 规格二，例如颜色（Color 列）
    pub variant2: String,
    pub location: String,
}

/// 有序条目清单；下标即条目在整个会话中的稳定身份
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    items: Vec<Item>,
}

impl Catalog {
    pub(crate) fn from_items(items: Vec<Item>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// 条目状态：任一时刻每个下标恰好处于其中一种
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Pending,
    Matched,
    Skipped,
}

/// 游标：指向下一次扫描要比对的条目，或已越过末尾
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cursor {
    At(usize),
    PastEnd,
}

impl Cursor {
    pub fn index(self) -> Option<usize> {
        match self {
            Cursor::At(i) => Some(i),
            Cursor::PastEnd => None,
        }
    }
}

/// 一次扫描提交的结果（比对失败不是错误）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// 匹配成功，携带推进前的下标
    Matched(usize),
    /// 与当前条目不符，状态不变
    Mismatch { index: usize },
    /// 游标已越过末尾
    NoMoreItems,
}

/// 进度统计（便于 CLI 打印）
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub total: usize,
    pub matched: usize,
    pub skipped: usize,
    pub pending: usize,
}
