//! Command implementations for the CLI
//!
//! - graph: query the metrics server and draw the result, once or on repeat

pub mod graph;
