//! Graph command implementation
//!
//! Resolves settings, builds the query plan and hands it to the watch loop.

use anyhow::{Context, Result};
use colored::Colorize;
use crossterm::{cursor::Show, execute};
use std::io::{self, IsTerminal};
use std::time::Duration;
use tracing::info;

use promchart::{
    chart::{ChartKind, ChartSpec},
    client::MetricsClient,
    config::{self, Settings},
    signals,
    watch::{LoopExit, QueryPlan, QueryWindow, WatchLoop},
};

use crate::cli::Cli;

/// Shows the cursor again if anything unwinds mid-draw
struct CursorGuard;

impl Drop for CursorGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), Show);
    }
}

/// Execute the graph command
pub async fn execute(cli: Cli) -> Result<()> {
    let settings = config::load_settings(cli.config.as_deref(), &cli.overrides())
        .context("Error loading config")?;
    info!(
        url = %settings.prometheus_url,
        width = settings.width,
        height = settings.height,
        "Settings resolved"
    );

    let plan = build_plan(&cli, &settings)?;
    let client = MetricsClient::new(&settings.prometheus_url, settings.timeout())?;

    let mut stdout = io::stdout();
    let styled = stdout.is_terminal();
    let mut watch_loop = WatchLoop::new(&client, plan).styled(styled);

    if cli.watch {
        watch_loop = watch_loop.every(Duration::from_secs(cli.interval));
        println!("{} {}", "Watching query:".cyan(), cli.query);
        println!("{} {}s", "Refresh interval:".cyan(), cli.interval);
        println!("{}", "Press Ctrl+C to stop".dimmed());
        println!();
    }

    let (shutdown_tx, signal_task) = signals::setup_signal_handlers()?;
    let _cursor = styled.then_some(CursorGuard);

    let exit = watch_loop.run(&mut stdout, shutdown_tx.subscribe()).await;
    signal_task.abort();

    if exit? == LoopExit::Interrupted && cli.watch {
        println!("\n{}", "Stopped watching.".yellow());
    }
    Ok(())
}

/// Turn flags and settings into the fixed per-process query description
fn build_plan(cli: &Cli, settings: &Settings) -> Result<QueryPlan> {
    let (window, kind, default_title) = match &cli.range {
        Some(range) => (
            QueryWindow::Range {
                lookback: range.lookback,
                step: cli.step.clone(),
            },
            ChartKind::Line,
            format!("Query: {} (last {})", cli.query, range.text),
        ),
        None => (
            QueryWindow::Instant,
            ChartKind::Bar,
            format!("Query: {}", cli.query),
        ),
    };

    let title = cli.title.clone().unwrap_or(default_title);
    let spec = ChartSpec::new(settings.width, settings.height, title, kind)?;

    Ok(QueryPlan {
        expr: cli.query.clone(),
        window,
        spec,
    })
}
