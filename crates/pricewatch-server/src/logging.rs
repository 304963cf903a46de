//! Logging configuration and initialization.
//!
//! Presets pick a baseline per `pricewatch::*` target; `--log` overrides
//! adjust single targets on top. `RUST_LOG`, when set, replaces both.

use clap::ValueEnum;
use std::collections::BTreeMap;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const TARGET_PREFIX: &str = "pricewatch::";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging preset levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogPreset {
    /// Startup, store lifecycle and failed requests
    #[default]
    Production,
    /// Adds request traces
    Verbose,
    /// Per-command store activity
    Debug,
    /// Everything
    Trace,
    /// Warnings and errors only
    Quiet,
}

impl LogPreset {
    /// Pick a preset from CLI flags. The quietest explicit flag wins.
    pub fn from_flags(verbose: bool, debug: bool, trace: bool, quiet: bool) -> Self {
        match (quiet, trace, debug, verbose) {
            (true, ..) => LogPreset::Quiet,
            (_, true, ..) => LogPreset::Trace,
            (_, _, true, _) => LogPreset::Debug,
            (_, _, _, true) => LogPreset::Verbose,
            _ => LogPreset::Production,
        }
    }

    fn directives(self) -> &'static [&'static str] {
        match self {
            LogPreset::Production => &[
                "pricewatch::startup=info",
                "pricewatch::api=info",
                "pricewatch::store=info",
                "tower_http=warn",
            ],
            LogPreset::Verbose => &["pricewatch=info", "tower_http=info"],
            LogPreset::Debug => &["pricewatch=debug", "tower_http=debug"],
            LogPreset::Trace => &["pricewatch=trace", "tower_http=trace"],
            LogPreset::Quiet => &["pricewatch=warn", "tower_http=error"],
        }
    }
}

/// Logging configuration built from CLI arguments.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub preset: LogPreset,
    /// Per-target level overrides, keyed by full target name
    pub overrides: BTreeMap<String, Level>,
    pub format: LogFormat,
}

impl LogConfig {
    /// Build from a preset and raw `TARGET=LEVEL` strings.
    ///
    /// Each string may hold several comma-separated pairs. Short targets are
    /// prefixed with `pricewatch::`. Malformed pairs are skipped.
    pub fn new(preset: LogPreset, log_overrides: &[String], format: LogFormat) -> Self {
        let overrides = log_overrides
            .iter()
            .flat_map(|s| s.split(','))
            .filter_map(|pair| {
                let (target, level) = pair.split_once('=')?;
                let level: Level = level.trim().parse().ok()?;
                Some((qualify_target(target.trim()), level))
            })
            .collect();

        Self {
            preset,
            overrides,
            format,
        }
    }

    /// Build an EnvFilter from this configuration.
    pub fn build_filter(&self) -> EnvFilter {
        if let Ok(env_filter) = EnvFilter::try_from_default_env() {
            return env_filter;
        }

        let directives = self
            .preset
            .directives()
            .iter()
            .map(|d| d.to_string())
            .chain(
                self.overrides
                    .iter()
                    .map(|(target, level)| format!("{}={}", target, level)),
            )
            .collect::<Vec<_>>()
            .join(",");

        EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

fn qualify_target(target: &str) -> String {
    if target.starts_with(TARGET_PREFIX) || target == "pricewatch" || target == "tower_http" {
        target.to_string()
    } else {
        format!("{}{}", TARGET_PREFIX, target)
    }
}

/// Initialize the tracing subscriber with the given configuration.
pub fn init(config: &LogConfig) {
    let filter = config.build_filter();

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(true).with_thread_ids(false))
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_span_events(FmtSpan::CLOSE),
                )
                .init();
        }
    }
}
