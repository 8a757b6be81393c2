//! Tracing configuration for inspecting emission.
//!
//! Three output formats, chosen by `CSZ_LOG_FORMAT`:
//!
//! - `text` (default): flat `tracing-subscriber` lines
//! - `tree`: indented spans via `tracing-tree`
//! - `json`: one JSON object per event
//!
//! ```bash
//! CSZ_LOG=debug CSZ_LOG_FORMAT=tree cargo test -p csz-emitter
//! CSZ_LOG="csz_emitter::emitter=trace,csz_runtime=debug" CSZ_LOG_FORMAT=json ...
//! ```
//!
//! Nothing is installed unless `CSZ_LOG` or `RUST_LOG` is set.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Tree,
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var("CSZ_LOG_FORMAT").unwrap_or_default())
    }
}

/// `CSZ_LOG` takes precedence over `RUST_LOG`; both use `RUST_LOG` syntax.
fn build_filter() -> EnvFilter {
    match std::env::var("CSZ_LOG") {
        Ok(val) => EnvFilter::builder().parse_lossy(val),
        Err(_) => EnvFilter::from_default_env(),
    }
}

/// Install the global subscriber, writing to stderr.
///
/// Returns `false` when no log variable is set or a subscriber is already
/// installed.
pub fn init_tracing() -> bool {
    if std::env::var_os("CSZ_LOG").is_none() && std::env::var_os("RUST_LOG").is_none() {
        return false;
    }

    let filter = build_filter();
    match LogFormat::from_env() {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_span_retrace(true)
                .with_targets(true);
            Registry::default().with(filter).with(tree_layer).try_init().is_ok()
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(json_layer).try_init().is_ok()
        }
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok(),
    }
}
