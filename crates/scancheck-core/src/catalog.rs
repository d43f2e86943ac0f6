//! 清单加载（逗号分隔文本，首行为表头）
use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

use crate::errors::LoadError;
use crate::types::{
    Catalog, Item, UNKNOWN_COLOR, UNKNOWN_LOCATION, UNKNOWN_MODEL, UNKNOWN_STORAGE,
};

/// 必需列（小写，比对前已去空白）
const COL_ORDER: &str = "order";
const COL_IDENTIFIER: &str = "esn";
/// 可选列
const COL_MODEL: &str = "model";
const COL_VARIANT1: &str = "capacity";
const COL_VARIANT2: &str = "color";
const COL_LOCATION: &str = "location";

/// 加载统计信息（便于 CLI 打印）
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    /// 非空数据行数
    pub rows_read: usize,
    /// 单元格少于表头而被跳过的行
    pub malformed_rows: usize,
    /// 标识为空而被跳过的行
    pub missing_identifier_rows: usize,
    pub items: usize,
}

/// 表头中各列的位置
struct Columns {
    width: usize,
    order: usize,
    identifier: usize,
    model: Option<usize>,
    variant1: Option<usize>,
    variant2: Option<usize>,
    location: Option<usize>,
}

impl Columns {
    fn from_header(line: &str) -> Result<Self, LoadError> {
        let headers: Vec<String> = line.split(',').map(|h| h.trim().to_lowercase()).collect();
        let find = |name: &str| headers.iter().position(|h| h == name);

        let order = find(COL_ORDER);
        let identifier = find(COL_IDENTIFIER);
        let (order, identifier) = match (order, identifier) {
            (Some(o), Some(i)) => (o, i),
            (o, i) => {
                let mut missing = Vec::new();
                if o.is_none() { missing.push(COL_ORDER); }
                if i.is_none() { missing.push(COL_IDENTIFIER); }
                return Err(LoadError::MissingRequiredColumns { missing });
            }
        };

        Ok(Self {
            width: headers.len(),
            order,
            identifier,
            model: find(COL_MODEL),
            variant1: find(COL_VARIANT1),
            variant2: find(COL_VARIANT2),
            location: find(COL_LOCATION),
        })
    }
}

/// 取可选单元格；列缺失或单元格为空时回退到占位值
fn optional_cell(cells: &[&str], col: Option<usize>, fallback: &str) -> String {
    col.and_then(|c| cells.get(c))
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| fallback.to_string())
}

/// 解析清单文本，返回按行序排列的 Catalog
pub fn load_catalog(text: &str) -> Result<Catalog, LoadError> {
    load_catalog_with_summary(text).map(|(catalog, _)| catalog)
}

/// 同 `load_catalog`，并附带跳过行统计
pub fn load_catalog_with_summary(text: &str) -> Result<(Catalog, LoadSummary), LoadError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text.lines().enumerate();

    let header = lines.next().map(|(_, l)| l).unwrap_or("");
    let cols = Columns::from_header(header)?;

    let mut summary = LoadSummary::default();
    let mut items = Vec::new();

    for (idx, line) in lines {
        // 行号从 1 开始，表头为第 1 行
        let line_no = idx + 1;
        if line.trim().is_empty() { continue; }
        summary.rows_read += 1;

        let cells: Vec<&str> = line.split(',').map(str::trim).collect();
        if cells.len() < cols.width {
            debug!(line = line_no, cells = cells.len(), expected = cols.width, "skipping malformed row");
            summary.malformed_rows += 1;
            continue;
        }

        let identifier = cells[cols.identifier];
        if identifier.is_empty() {
            debug!(line = line_no, "skipping row without identifier");
            summary.missing_identifier_rows += 1;
            continue;
        }

        items.push(Item {
            order_label: cells[cols.order].to_string(),
            identifier: identifier.to_string(),
            model: optional_cell(&cells, cols.model, UNKNOWN_MODEL),
            variant1: optional_cell(&cells, cols.variant1, UNKNOWN_STORAGE),
            variant2: optional_cell(&cells, cols.variant2, UNKNOWN_COLOR),
            location: optional_cell(&cells, cols.location, UNKNOWN_LOCATION),
        });
    }

    if items.is_empty() {
        return Err(LoadError::EmptyCatalog);
    }
    summary.items = items.len();
    Ok((Catalog::from_items(items), summary))
}

/// 读取文件并解析；`LoadError` 仍可通过 downcast 取回
pub fn load_catalog_file(path: &Path) -> Result<(Catalog, LoadSummary)> {
    let txt = std::fs::read_to_string(path)
        .with_context(|| format!("read list file {}", path.display()))?;
    let loaded = load_catalog_with_summary(&txt)
        .with_context(|| format!("load list file {}", path.display()))?;
    Ok(loaded)
}
