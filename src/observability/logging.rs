//! Subscriber setup for the `athena` binary.
//!
//! Library code only emits `tracing` events. The binary installs a stderr
//! subscriber whose level comes from `-v` flags unless `ATHENA_LOG_LEVEL`
//! holds a full filter directive.

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

use crate::cli::args::ColorChoice;

/// Environment variable holding a full `EnvFilter` directive.
pub const LOG_LEVEL_ENV: &str = "ATHENA_LOG_LEVEL";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// Plain text, coloured when stderr is a terminal.
    #[default]
    Human,
    /// One JSON object per event.
    Json,
}

/// Level for a count of `-v` flags; saturates at `trace`.
#[must_use]
pub const fn verbosity_to_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn build_filter(verbosity: u8) -> EnvFilter {
    match EnvFilter::try_from_env(LOG_LEVEL_ENV) {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(verbosity_to_directive(verbosity)),
    }
}

impl ColorChoice {
    /// Resolves `auto` against stderr and `NO_COLOR`.
    #[must_use]
    pub fn ansi_on_stderr(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
        }
    }
}

/// Installs the global subscriber on stderr.
///
/// Targets are shown from `-vv` upward. A second call is a no-op.
pub fn init_logging(format: LogFormat, verbosity: u8, color: ColorChoice) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(build_filter(verbosity))
        .with_target(verbosity >= 2)
        .with_writer(std::io::stderr);

    let installed = match format {
        LogFormat::Human => builder.with_ansi(color.ansi_on_stderr()).try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if installed.is_err() {
        tracing::trace!("subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_saturates_at_trace() {
        let levels: Vec<_> = [0, 1, 2, 3, 200].into_iter().map(verbosity_to_directive).collect();
        assert_eq!(levels, ["warn", "info", "debug", "trace", "trace"]);
    }

    #[test]
    fn explicit_colour_choices_ignore_the_terminal() {
        assert!(ColorChoice::Always.ansi_on_stderr());
        assert!(!ColorChoice::Never.ansi_on_stderr());
    }

    #[test]
    fn repeated_init_is_harmless() {
        init_logging(LogFormat::Json, 3, ColorChoice::Never);
        init_logging(LogFormat::Human, 0, ColorChoice::Auto);
    }
}
