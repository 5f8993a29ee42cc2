use std::path::PathBuf;

use clap::builder::{
	Styles,
	styling::{AnsiColor, Effects},
};
use tracing_subscriber::EnvFilter;

pub const VERSION: &str = concat!(
	env!("CARGO_PKG_VERSION"),
	"-",
	env!("VERGEN_GIT_SHA"),
	"-",
	env!("VERGEN_CARGO_TARGET_TRIPLE"),
);

/// Fallback directive when `service.log_level` does not parse.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Location of the pulse TOML configuration.
#[derive(Debug, Clone, clap::Args)]
pub struct ConfigArgs {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
}

pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.literal(AnsiColor::Magenta.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Green.on_default())
}

/// Filter for `service.log_level`; `RUST_LOG`-style directives are accepted.
pub fn log_filter(level: &str) -> EnvFilter {
	EnvFilter::try_new(level.trim()).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

pub fn init_tracing(level: &str) {
	tracing_subscriber::fmt().with_env_filter(log_filter(level)).init();
}
