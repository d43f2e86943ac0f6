//! 终端渲染：只根据事件与清单输出文本
use scancheck_core::{Catalog, Cursor, Item, ItemStatus, Progress, Sequencer, SequencerEvent};
use std::io::{self, Write};

fn item_line(index: usize, item: &Item) -> String {
    format!(
        "#{:<4} {:<10} {:<20} {} / {} / {} @ {}",
        index, item.order_label, item.identifier, item.model, item.variant1, item.variant2, item.location
    )
}

fn status_mark(status: ItemStatus) -> &'static str {
    match status {
        ItemStatus::Pending => "[ ]",
        ItemStatus::Matched => "[x]",
        ItemStatus::Skipped => "[~]",
    }
}

/// 渲染一批事件
pub fn events(out: &mut dyn Write, events: &[SequencerEvent], catalog: &Catalog, progress: Progress) -> io::Result<()> {
    for event in events {
        match event {
            SequencerEvent::StatusChanged { index, status } => {
                let id = catalog.get(*index).map(|i| i.identifier.as_str()).unwrap_or("?");
                match status {
                    ItemStatus::Matched => writeln!(out, "OK    #{index} {id}")?,
                    ItemStatus::Skipped => writeln!(out, "SKIP  #{index} {id}")?,
                    ItemStatus::Pending => writeln!(out, "BACK  #{index} {id}")?,
                }
            }
            SequencerEvent::CursorChanged(Cursor::At(index)) => {
                if let Some(item) = catalog.get(*index) {
                    writeln!(out, "NEXT  {}", item_line(*index, item))?;
                }
            }
            SequencerEvent::CursorChanged(Cursor::PastEnd) => {
                writeln!(
                    out,
                    "END   no more items ({} matched, {} skipped, {} pending of {})",
                    progress.matched, progress.skipped, progress.pending, progress.total
                )?;
            }
            SequencerEvent::MismatchFlash { index, duration } => {
                writeln!(out, "MISS  #{index} scan does not match ({}s)", duration.as_secs_f32())?;
            }
            // 闪烁清除在纯文本终端中无可见效果
            SequencerEvent::MismatchCleared { .. } => {}
            SequencerEvent::SkippedListChanged(list) => {
                if list.is_empty() {
                    writeln!(out, "      skipped list is empty")?;
                } else {
                    let ids: Vec<String> = list.iter().map(|i| format!("#{i}")).collect();
                    writeln!(out, "      skipped: {}", ids.join(" "))?;
                }
            }
        }
    }
    Ok(())
}

/// 打印整张清单及状态
pub fn table(out: &mut dyn Write, seq: &Sequencer) -> io::Result<()> {
    let cursor = seq.cursor().index();
    for (index, item) in seq.catalog().iter().enumerate() {
        let mark = seq.status(index).map(status_mark).unwrap_or("[?]");
        let arrow = if cursor == Some(index) { ">" } else { " " };
        writeln!(out, "{arrow}{mark} {}", item_line(index, item))?;
    }
    let p = seq.progress();
    writeln!(out, "{} matched, {} skipped, {} pending of {}", p.matched, p.skipped, p.pending, p.total)
}

/// 打印被跳过的条目（按跳过顺序）
pub fn skipped(out: &mut dyn Write, seq: &Sequencer) -> io::Result<()> {
    if seq.skipped_order().is_empty() {
        return writeln!(out, "no skipped items");
    }
    for &index in seq.skipped_order() {
        if let Some(item) = seq.catalog().get(index) {
            writeln!(out, "  {}", item_line(index, item))?;
        }
    }
    writeln!(out, "use :undo <#> to return to an item")
}

/// 打印清单（check 子命令）
pub fn catalog(out: &mut dyn Write, catalog: &Catalog) -> io::Result<()> {
    for (index, item) in catalog.iter().enumerate() {
        writeln!(out, "{}", item_line(index, item))?;
    }
    Ok(())
}

pub const HELP: &str = "\
type or scan an identifier and press Enter to check it against the highlighted item
  :skip          skip the highlighted item
  :undo <#>      return to a skipped item
  :skipped       list skipped items
  :status        show every item
  :load <file>   load a new list (discards progress)
  :help          show this help
  :quit          exit";
