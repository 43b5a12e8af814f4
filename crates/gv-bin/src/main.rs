//! gridvi entrypoint: replay a key script over a grid file.
use anyhow::{Context, Result, anyhow};
use clap::Parser;
use core_actions::{Interpreter, KeyOutcome, ModeRequest};
use core_config::{GridConfig, LogConfig, load_from};
use core_events::{KeyEvent, parse_keys};
use core_grid::{GridAccessor, Position, SparseGrid};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "gridvi", version, about = "Replay vi-style key scripts over a sparse grid")]
struct Args {
    /// Grid file: one row per line, spaces are empty cells.
    #[arg(long)]
    grid: PathBuf,
    /// Key script in key notation (`d2w`, `f<Space>`, `<Esc>`).
    #[arg(long)]
    keys: String,
    /// Starting cursor as `X,Y`.
    #[arg(long, value_parser = parse_cursor, default_value = "0,0")]
    cursor: Position,
    /// Configuration file path (overrides discovery of `gridvi.toml`).
    #[arg(long = "config")]
    config: Option<PathBuf>,
}

fn parse_cursor(s: &str) -> Result<Position, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got `{s}`"))?;
    let x = x.trim().parse().map_err(|e| format!("bad column `{x}`: {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("bad row `{y}`: {e}"))?;
    Ok(Position::new(x, y))
}

fn configure_logging(log: &LogConfig) -> Result<Option<WorkerGuard>> {
    let log_path = Path::new(&log.file);
    let log_dir = log_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_name = log_path
        .file_name()
        .ok_or_else(|| anyhow!("log file `{}` has no file name", log.file))?;
    if log_path.exists() {
        let _ = std::fs::remove_file(log_path);
    }

    // RUST_LOG wins over the configured directive.
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&log.filter)
            .with_context(|| format!("invalid log filter `{}`", log.filter))?,
    };
    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Ok(Some(guard)),
        // Global subscriber already installed; drop guard so the writer shuts down.
        Err(_err) => Ok(None),
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

/// Build the host grid from text, applying the configured glyph sets and
/// minimum dimensions.
fn build_grid(text: &str, cfg: &GridConfig) -> Result<SparseGrid> {
    let rows: Vec<&str> = text.lines().collect();
    let width = rows
        .iter()
        .map(|r| r.chars().count())
        .max()
        .unwrap_or(0)
        .max(cfg.width.unwrap_or(0));
    let height = rows.len().max(cfg.height.unwrap_or(0));
    let reward = cfg.reward.clone();
    let mut grid = SparseGrid::from_rows_sized(&rows, width, height)?
        .with_reward(move |o| reward.contains(o.glyph));
    let protected = grid.protect_where(|o| cfg.is_protected(o.glyph));
    info!(
        target: "runtime",
        width,
        height,
        occupied = grid.occupied(),
        protected,
        "grid_loaded"
    );
    Ok(grid)
}

fn load_grid(path: &Path, cfg: &GridConfig) -> Result<SparseGrid> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading grid file {}", path.display()))?;
    build_grid(&text, cfg).with_context(|| format!("building grid from {}", path.display()))
}

/// What happened while replaying a script.
#[derive(Debug, Default)]
struct ReplaySummary {
    echoes: Vec<String>,
    removed: usize,
    rewarded: bool,
    mode_requests: Vec<ModeRequest>,
    unhandled: Vec<KeyEvent>,
    cancelled: usize,
}

fn replay(
    interp: &mut Interpreter,
    grid: &mut SparseGrid,
    cursor: &mut Position,
    keys: &[KeyEvent],
) -> ReplaySummary {
    let mut summary = ReplaySummary::default();
    for key in keys {
        match interp.feed(grid, cursor, key) {
            KeyOutcome::Pending => {}
            KeyOutcome::Cancelled => summary.cancelled += 1,
            KeyOutcome::NotHandled(key) => {
                debug!(target: "runtime", key = %key, "key_not_handled");
                summary.unhandled.push(key);
            }
            KeyOutcome::ModeSwitch { request, echo } => {
                summary.echoes.push(echo);
                summary.mode_requests.push(request);
            }
            KeyOutcome::Executed(report) => {
                summary.removed += report.removed;
                summary.rewarded |= report.rewarded;
                summary.echoes.push(report.echo);
            }
        }
    }
    summary
}

fn print_summary<W: Write>(
    out: &mut W,
    grid: &SparseGrid,
    cursor: Position,
    summary: &ReplaySummary,
    pending: &str,
) -> io::Result<()> {
    for row in grid.render_rows() {
        writeln!(out, "|{row}")?;
    }
    writeln!(out, "cursor: {},{}", cursor.x, cursor.y)?;
    writeln!(out, "commands: {}", summary.echoes.join(" "))?;
    writeln!(out, "removed: {}", summary.removed)?;
    writeln!(out, "rewarded: {}", summary.rewarded)?;
    if !summary.mode_requests.is_empty() {
        writeln!(out, "mode requests: {:?}", summary.mode_requests)?;
    }
    if !summary.unhandled.is_empty() {
        let keys: Vec<String> = summary.unhandled.iter().map(ToString::to_string).collect();
        writeln!(out, "not handled: {}", keys.join(" "))?;
    }
    if summary.cancelled > 0 {
        writeln!(out, "cancelled: {}", summary.cancelled)?;
    }
    if !pending.is_empty() {
        writeln!(out, "pending: {pending}")?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_from(args.config.clone())?;
    let _log_guard = configure_logging(&config.file.log)?;
    install_panic_hook();
    info!(target: "runtime", grid = %args.grid.display(), "startup");

    let mut grid = load_grid(&args.grid, &config.file.grid)?;
    let keys =
        parse_keys(&args.keys).with_context(|| format!("parsing key script `{}`", args.keys))?;
    let mut interp = Interpreter::from_config(&config);
    let mut cursor = args.cursor;
    if cursor.x >= grid.width() || cursor.y >= grid.height() {
        warn!(target: "runtime", x = cursor.x, y = cursor.y, "start_cursor_clamped");
    }

    let summary = replay(&mut interp, &mut grid, &mut cursor, &keys);
    print_summary(
        &mut io::stdout().lock(),
        &grid,
        cursor,
        &summary,
        &interp.pending_echo(),
    )?;
    info!(
        target: "runtime",
        commands = summary.echoes.len(),
        removed = summary.removed,
        rewarded = summary.rewarded,
        "shutdown"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(
        text: &str,
        script: &str,
        cursor: (usize, usize),
    ) -> (SparseGrid, Position, ReplaySummary) {
        let mut grid = build_grid(text, &GridConfig::default()).unwrap();
        let mut cursor = Position::new(cursor.0, cursor.1);
        let mut interp = Interpreter::new();
        let keys = parse_keys(script).unwrap();
        let summary = replay(&mut interp, &mut grid, &mut cursor, &keys);
        (grid, cursor, summary)
    }

    #[test]
    fn cursor_argument_parses() {
        assert_eq!(parse_cursor("3,4"), Ok(Position::new(3, 4)));
        assert_eq!(parse_cursor(" 0 , 7"), Ok(Position::new(0, 7)));
        assert!(parse_cursor("3").is_err());
        assert!(parse_cursor("a,1").is_err());
    }

    #[test]
    fn args_parse_with_defaults() {
        let args = Args::try_parse_from(["gridvi", "--grid", "g.txt", "--keys", "dw"]).unwrap();
        assert_eq!(args.cursor, Position::origin());
        assert_eq!(args.keys, "dw");
        assert!(args.config.is_none());
    }

    #[test]
    fn configured_glyphs_are_protected_and_rewarding() {
        let (grid, _, summary) = run("a#*b\ncd", "d$", (0, 0));
        assert_eq!(grid.render_rows(), vec![" #", "cd"]);
        assert_eq!(summary.removed, 3);
        assert!(summary.rewarded);
    }

    #[test]
    fn configured_dimensions_pad_the_grid() {
        let cfg = GridConfig {
            width: Some(10),
            height: Some(4),
            ..GridConfig::default()
        };
        let grid = build_grid("ab\n", &cfg).unwrap();
        assert_eq!((grid.width(), grid.height()), (10, 4));
    }

    #[test]
    fn empty_grid_file_is_an_error() {
        assert!(build_grid("", &GridConfig::default()).is_err());
    }

    #[test]
    fn summary_lists_outcomes() {
        let (grid, cursor, summary) = run("foo bar\nbaz", "wzd<Esc>ji", (0, 0));
        let mut out = Vec::new();
        print_summary(&mut out, &grid, cursor, &summary, "").unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "|foo bar\n|baz\ncursor: 4,1\ncommands: w j i\nremoved: 0\nrewarded: false\n\
             mode requests: [Insert]\nnot handled: z\ncancelled: 1\n"
        );
    }

    #[test]
    fn load_grid_reads_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "x y\n").unwrap();
        let grid = load_grid(tmp.path(), &GridConfig::default()).unwrap();
        assert_eq!(grid.occupied(), 2);
        assert!(load_grid(Path::new("__missing_grid__.txt"), &GridConfig::default()).is_err());
    }
}
