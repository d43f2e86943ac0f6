use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossbeam_channel::{self as channel, Receiver, RecvTimeoutError};
use scancheck_core::{
    load_catalog_file, load_policy, AdvancePolicy, ScanOutcome, SequencerEvent, SequencerPolicy,
    Session, SessionError, SessionReport,
};
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

mod render;

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(name = "scancheck", version, about = "拣货清单扫描核对")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 加载清单并打印解析结果
    Check {
        /// 清单文件（CSV，需包含 Order 与 ESN 列）
        #[arg(long)]
        list: PathBuf,
    },
    /// 交互式逐条扫描核对
    Run {
        /// 清单文件（CSV，需包含 Order 与 ESN 列）
        #[arg(long)]
        list: PathBuf,

        /// 策略配置文件（TOML），可选
        #[arg(long)]
        config: Option<PathBuf>,

        /// 推进策略：stop-at-skipped 或 pass-skipped（覆盖配置文件）
        #[arg(long, value_parser = ["stop-at-skipped", "pass-skipped"])]
        advance: Option<String>,

        /// 撤销跳过后的宽限秒数（覆盖配置文件）
        #[arg(long, conflicts_with = "no_undo_grace")]
        undo_grace_secs: Option<u64>,

        /// 撤销跳过永久生效，不自动回退
        #[arg(long)]
        no_undo_grace: bool,

        /// 结束时写出会话报告（JSON）
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // 初始化日志（支持通过 RUST_LOG 控制等级，例如 info、debug）
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { list } => {
            let (catalog, summary) = load_catalog_file(&list)?;
            let stdout = io::stdout();
            let mut out = stdout.lock();
            render::catalog(&mut out, &catalog)?;
            info!(
                items = summary.items,
                rows_read = summary.rows_read,
                malformed_rows = summary.malformed_rows,
                missing_identifier_rows = summary.missing_identifier_rows,
                "list loaded"
            );
        }
        Commands::Run { list, config, advance, undo_grace_secs, no_undo_grace, report } => {
            // 组装策略：默认值 → 配置文件 → 命令行参数
            let mut policy = match &config {
                Some(path) => load_policy(path).with_context(|| format!("load config {}", path.display()))?,
                None => SequencerPolicy::default(),
            };
            if let Some(a) = advance {
                policy.advance = a.parse::<AdvancePolicy>()?;
            }
            if let Some(secs) = undo_grace_secs {
                policy.undo_grace = (secs > 0).then(|| Duration::from_secs(secs));
            }
            if no_undo_grace {
                policy.undo_grace = None;
            }
            info!(?list, advance = policy.advance.as_str(), undo_grace = ?policy.undo_grace, "starting session");

            let mut session = Session::new(policy, Vec::new());
            load_into(&mut session, &list)?;

            let stdout = io::stdout();
            let mut out = stdout.lock();
            flush_events(&mut out, &mut session)?;
            writeln!(out, "{}", render::HELP)?;

            run_loop(&mut out, &mut session, spawn_stdin_reader())?;

            if let (Some(path), Some(seq)) = (report, session.sequencer()) {
                let mut file = BufWriter::new(File::create(&path).context("create report file")?);
                SessionReport::from_sequencer(seq).write_json(&mut file)?;
                file.flush().context("flush report file")?;
                info!(?path, "report written");
            }
            if let Some(seq) = session.sequencer() {
                let p = seq.progress();
                info!(matched = p.matched, skipped = p.skipped, pending = p.pending, total = p.total, "session finished");
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // 日志写 stderr，避免与 stdout 上的清单输出交错
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// 后台线程逐行读取 stdin；输入结束时通道关闭
fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = channel::bounded::<String>(64);
    std::thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() { break; }
        }
    });
    rx
}

fn load_into(session: &mut Session<Vec<SequencerEvent>>, path: &Path) -> Result<()> {
    let (catalog, summary) = load_catalog_file(path)?;
    if summary.malformed_rows + summary.missing_identifier_rows > 0 {
        warn!(
            malformed_rows = summary.malformed_rows,
            missing_identifier_rows = summary.missing_identifier_rows,
            "some rows were skipped"
        );
    }
    info!(items = summary.items, "list loaded");
    session.install(catalog);
    Ok(())
}

/// 渲染并清空事件缓冲
fn flush_events(out: &mut dyn Write, session: &mut Session<Vec<SequencerEvent>>) -> Result<()> {
    let events = std::mem::take(session.sink_mut());
    if let Some(seq) = session.sequencer() {
        render::events(out, &events, seq.catalog(), seq.progress())?;
    }
    out.flush()?;
    Ok(())
}

/// 主循环：等待输入或下一个定时任务到期
fn run_loop(out: &mut dyn Write, session: &mut Session<Vec<SequencerEvent>>, lines: Receiver<String>) -> Result<()> {
    loop {
        let deadline = session.sequencer().and_then(|s| s.next_deadline());
        let received = match deadline {
            Some(d) => lines.recv_deadline(d),
            None => lines.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        session.poll_timers(Instant::now());
        let line = match received {
            Ok(line) => line,
            Err(RecvTimeoutError::Timeout) => {
                flush_events(out, session)?;
                continue;
            }
            Err(RecvTimeoutError::Disconnected) => break,
        };

        let keep_going = handle_line(out, session, line.trim())?;
        flush_events(out, session)?;
        if !keep_going { break; }
    }
    Ok(())
}

/// 处理一行输入；返回 false 表示退出
fn handle_line(out: &mut dyn Write, session: &mut Session<Vec<SequencerEvent>>, line: &str) -> Result<bool> {
    let Some(command) = line.strip_prefix(':') else {
        if line.is_empty() { return Ok(true); }
        if let Ok(ScanOutcome::NoMoreItems) = session.submit_scan(line, Instant::now()) {
            writeln!(out, "no more items left to scan")?;
        }
        return Ok(true);
    };

    let mut parts = command.split_whitespace();
    match parts.next().unwrap_or("") {
        "skip" | "s" => report_error(out, session.skip_current())?,
        "undo" | "u" => match parts.next().map(str::parse::<usize>) {
            Some(Ok(index)) => report_error(out, session.undo_skip(index, Instant::now()))?,
            _ => writeln!(out, "usage: :undo <#>")?,
        },
        "skipped" => {
            if let Some(seq) = session.sequencer() { render::skipped(out, seq)?; }
        }
        "status" => {
            if let Some(seq) = session.sequencer() { render::table(out, seq)?; }
        }
        "load" => match parts.next() {
            Some(path) => {
                if let Err(e) = load_into(session, Path::new(path)) {
                    error!(error = %format!("{e:#}"), "list not loaded");
                    writeln!(out, "list not loaded, keeping current list")?;
                }
            }
            None => writeln!(out, "usage: :load <file>")?,
        },
        "help" | "h" => writeln!(out, "{}", render::HELP)?,
        "quit" | "q" => return Ok(false),
        other => writeln!(out, "unknown command :{other} (try :help)")?,
    }
    Ok(true)
}

fn report_error(out: &mut dyn Write, res: std::result::Result<(), SessionError>) -> io::Result<()> {
    match res {
        Ok(()) => Ok(()),
        Err(e) => {
            warn!(error = %e, "command rejected");
            writeln!(out, "{e}")
        }
    }
}
