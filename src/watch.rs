//! Query/render cycles, run once or repeatedly until interrupted
//!
//! A cycle queries the server, turns the response into series, draws the chart
//! and writes it out. Cycles never overlap. In watch mode the loop sleeps for
//! the refresh interval between cycles; an interrupt ends the loop during the
//! sleep or while a query is in flight, but never half-way through writing a
//! chart.

use chrono::{Local, Utc};
use crossterm::{
    cursor::MoveTo,
    queue,
    terminal::{Clear, ClearType},
};
use std::io::Write;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info};

use crate::chart::{self, ChartSpec, Rendered};
use crate::client::MetricsClient;
use crate::error::Result;
use crate::series::QueryResult;
use crate::signals::ShutdownSignal;

/// Time span a query covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryWindow {
    /// A single evaluation at the server's current time
    Instant,
    /// `lookback` ending now, sampled every `step`
    Range { lookback: Duration, step: String },
}

/// Everything that stays fixed across cycles
#[derive(Debug, Clone)]
pub struct QueryPlan {
    pub expr: String,
    pub window: QueryWindow,
    pub spec: ChartSpec,
}

/// How the loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// One-shot cycle finished
    Completed,
    /// Stopped by a shutdown signal
    Interrupted,
}

/// `(start, end)` in unix seconds for a window ending at `now`
pub fn range_window(now: i64, lookback: Duration) -> (i64, i64) {
    let lookback = i64::try_from(lookback.as_secs()).unwrap_or(i64::MAX);
    (now.saturating_sub(lookback), now)
}

/// Drives query/render cycles for one plan
pub struct WatchLoop<'a> {
    client: &'a MetricsClient,
    plan: QueryPlan,
    interval: Option<Duration>,
    styled: bool,
}

impl<'a> WatchLoop<'a> {
    /// One-shot loop; call [`WatchLoop::every`] to keep refreshing
    pub fn new(client: &'a MetricsClient, plan: QueryPlan) -> Self {
        Self {
            client,
            plan,
            interval: None,
            styled: false,
        }
    }

    /// Repeat cycles every `interval` until interrupted
    pub fn every(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Emit colors and cursor/clear control sequences
    pub fn styled(mut self, styled: bool) -> Self {
        self.styled = styled;
        self
    }

    pub fn is_watching(&self) -> bool {
        self.interval.is_some()
    }

    /// Run until the one-shot cycle completes or a shutdown arrives
    ///
    /// A failed cycle ends the loop with that error in both modes.
    pub async fn run<W: Write>(
        &self,
        out: &mut W,
        mut shutdown: broadcast::Receiver<ShutdownSignal>,
    ) -> Result<LoopExit> {
        if let Some(interval) = self.interval {
            info!(
                expr = %self.plan.expr,
                interval_secs = interval.as_secs_f64(),
                "Watching query"
            );
        }

        loop {
            tokio::select! {
                cycle = self.run_cycle(out) => {
                    if let Err(err) = cycle {
                        debug!(kind = err.kind(), error = %err, "Render cycle failed");
                        return Err(err);
                    }
                }
                _ = wait_for_shutdown(&mut shutdown) => {
                    debug!("Shutdown received during query");
                    return Ok(LoopExit::Interrupted);
                }
            }

            let Some(interval) = self.interval else {
                return Ok(LoopExit::Completed);
            };

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = wait_for_shutdown(&mut shutdown) => {
                    debug!("Shutdown received while sleeping");
                    return Ok(LoopExit::Interrupted);
                }
            }
        }
    }

    /// Query, render and write one chart
    pub async fn run_cycle<W: Write>(&self, out: &mut W) -> Result<Rendered> {
        let result = self.fetch().await?;
        let rendered = chart::render(&result, &self.plan.spec)?;

        if let Some(interval) = self.interval {
            self.write_header(out, interval)?;
        }
        rendered.write_to(out, self.styled)?;

        debug!(
            series = result.series.len(),
            drawn = rendered.is_chart(),
            "Render cycle finished"
        );
        Ok(rendered)
    }

    /// Issue the plan's query with a window ending now
    async fn fetch(&self) -> Result<QueryResult> {
        match &self.plan.window {
            QueryWindow::Instant => self.client.query(&self.plan.expr).await,
            QueryWindow::Range { lookback, step } => {
                let (start, end) = range_window(Utc::now().timestamp(), *lookback);
                self.client
                    .query_range(&self.plan.expr, start, end, step)
                    .await
            }
        }
    }

    /// Replace the previous frame with a status line
    fn write_header<W: Write>(&self, out: &mut W, interval: Duration) -> Result<()> {
        if self.styled {
            queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
        } else {
            writeln!(out)?;
        }
        writeln!(
            out,
            "{}",
            header_line(interval, &self.plan.expr, &Local::now().format("%H:%M:%S").to_string())
        )?;
        Ok(())
    }
}

/// Status line shown above each refreshed chart
fn header_line(interval: Duration, expr: &str, clock: &str) -> String {
    format!(
        "Every {}s: {}   Last update: {}",
        interval.as_secs(),
        expr,
        clock
    )
}

/// Resolve once a shutdown is broadcast; a closed channel never resolves
async fn wait_for_shutdown(shutdown: &mut broadcast::Receiver<ShutdownSignal>) {
    match shutdown.recv().await {
        Ok(_) | Err(RecvError::Lagged(_)) => {}
        Err(RecvError::Closed) => std::future::pending::<()>().await,
    }
}
