use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use promchart::config::Overrides;
use promchart::duration::parse_duration;

/// `--range` as typed plus its parsed length
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeArg {
    pub text: String,
    pub lookback: Duration,
}

fn parse_range(input: &str) -> promchart::Result<RangeArg> {
    Ok(RangeArg {
        text: input.to_string(),
        lookback: parse_duration(input)?,
    })
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "promchart",
    version,
    about = "Graph Prometheus metrics in your terminal",
    disable_help_flag = true
)]
pub struct Cli {
    /// Prometheus server URL [default: http://localhost:9090]
    #[arg(short, long)]
    pub url: Option<String>,

    /// PromQL expression to execute
    #[arg(short, long)]
    pub query: String,

    /// Look back this far and draw a line chart (e.g., 1h, 30m); instant bar chart if omitted
    #[arg(short, long, value_parser = parse_range)]
    pub range: Option<RangeArg>,

    /// Query step size for range queries
    #[arg(short, long, default_value = "15s")]
    pub step: String,

    /// Custom title for the chart
    #[arg(short, long)]
    pub title: Option<String>,

    /// Chart width in terminal cells [default: 120]
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    pub width: Option<u16>,

    /// Chart height in terminal cells [default: 30]
    #[arg(short = 'h', long, value_parser = clap::value_parser!(u16).range(1..))]
    pub height: Option<u16>,

    /// Configuration file path (YAML, TOML or JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Continuously refresh the chart
    #[arg(long)]
    pub watch: bool,

    /// Refresh interval in seconds (with --watch)
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,

    /// Print help
    #[arg(long, action = clap::ArgAction::Help)]
    pub help: Option<bool>,
}

impl Cli {
    /// Flag values that take precedence over the config file and environment
    pub fn overrides(&self) -> Overrides {
        Overrides {
            prometheus_url: self.url.clone(),
            width: self.width,
            height: self.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_instant() {
        let cli = Cli::try_parse_from(["promchart", "-q", "up"]).unwrap();
        assert_eq!(cli.query, "up");
        assert!(cli.range.is_none());
        assert_eq!(cli.step, "15s");
        assert_eq!(cli.interval, 30);
        assert!(!cli.watch);
        assert!(cli.width.is_none());
    }

    #[test]
    fn test_cli_parsing_range_watch() {
        let args = [
            "promchart", "-q", "rate(http_requests_total[5m])", "-r", "1h", "-s", "30s", "--watch",
            "--interval", "10", "-w", "100", "-h", "25",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        let range = cli.range.unwrap();
        assert_eq!(range.text, "1h");
        assert_eq!(range.lookback, Duration::from_secs(3600));
        assert_eq!(cli.step, "30s");
        assert!(cli.watch);
        assert_eq!(cli.interval, 10);
        assert_eq!(cli.width, Some(100));
        assert_eq!(cli.height, Some(25));
    }

    #[test]
    fn test_cli_rejects_bad_range() {
        let result = Cli::try_parse_from(["promchart", "-q", "up", "-r", "5w"]);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("unknown unit 'w'"));
    }

    #[test]
    fn test_long_help_still_available() {
        let err = Cli::try_parse_from(["promchart", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_requires_query() {
        assert!(Cli::try_parse_from(["promchart"]).is_err());
    }

    #[test]
    fn test_cli_rejects_zero_interval() {
        assert!(Cli::try_parse_from(["promchart", "-q", "up", "--interval", "0"]).is_err());
    }

    #[test]
    fn test_overrides_pass_flags_through() {
        let cli = Cli::try_parse_from(["promchart", "-q", "up", "-u", "http://prom:9090", "-w", "80"])
            .unwrap();
        let overrides = cli.overrides();
        assert_eq!(overrides.prometheus_url.as_deref(), Some("http://prom:9090"));
        assert_eq!(overrides.width, Some(80));
        assert!(overrides.height.is_none());
    }
}
