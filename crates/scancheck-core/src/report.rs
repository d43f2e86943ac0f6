//! 会话报告（JSON 导出）
use serde::Serialize;

use crate::sequencer::Sequencer;
use crate::types::{Cursor, ItemStatus, Progress};

/// 单个条目的状态行
#[derive(Debug, Clone, Serialize)]
pub struct ReportRow<'a> {
    pub index: usize,
    pub order_label: &'a str,
    pub identifier: &'a str,
    pub status: ItemStatus,
}

/// 对应报告文件的顶层结构
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport<'a> {
    pub progress: Progress,
    pub cursor: Cursor,
    pub skipped_order: &'a [usize],
    pub items: Vec<ReportRow<'a>>,
}

impl<'a> SessionReport<'a> {
    pub fn from_sequencer(seq: &'a Sequencer) -> Self {
        let items = seq
            .catalog()
            .iter()
            .zip(seq.statuses())
            .enumerate()
            .map(|(index, (item, status))| ReportRow {
                index,
                order_label: &item.order_label,
                identifier: &item.identifier,
                status: *status,
            })
            .collect();
        Self {
            progress: seq.progress(),
            cursor: seq.cursor(),
            skipped_order: seq.skipped_order(),
            items,
        }
    }

    /// 以缩进格式写出 JSON
    pub fn write_json(&self, out: &mut dyn std::io::Write) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(&mut *out, self)?;
        writeln!(out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::load_catalog;
    use crate::events::NullSink;
    use crate::options::SequencerPolicy;
    use std::time::Instant;

    #[test]
    fn report_reflects_progress_and_statuses() {
        let catalog = load_catalog("Order,ESN\n1,A1\n2,B2\n").unwrap();
        let mut seq = Sequencer::new(catalog, SequencerPolicy::default(), &mut NullSink);
        seq.submit_scan("A1", Instant::now(), &mut NullSink);
        seq.skip_current(&mut NullSink).unwrap();

        let report = SessionReport::from_sequencer(&seq);
        let mut buf = Vec::new();
        report.write_json(&mut buf).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(v["progress"]["matched"], 1);
        assert_eq!(v["progress"]["skipped"], 1);
        assert_eq!(v["cursor"], "past_end");
        assert_eq!(v["skipped_order"], serde_json::json!([1]));
        assert_eq!(v["items"][0]["status"], "matched");
        assert_eq!(v["items"][1]["identifier"], "B2");
        assert_eq!(v["items"][1]["status"], "skipped");
    }
}
