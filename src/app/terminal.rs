//! Terminal capabilities and tracing setup.

use std::io::{self, IsTerminal};

use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

/// What the attached terminal can show, decided once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TerminalProfile {
    pub(crate) color: bool,
    pub(crate) progress_bars: bool,
}

impl TerminalProfile {
    pub(crate) fn detect(cli: &Cli) -> Self {
        let dumb = std::env::var("TERM").is_ok_and(|term| term.eq_ignore_ascii_case("dumb"));
        let no_color_env = std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty());
        Self::from_signals(&Signals {
            no_color_flag: cli.no_color,
            no_color_env,
            dumb,
            stderr_is_terminal: io::stderr().is_terminal(),
            quiet: cli.quiet,
        })
    }

    fn from_signals(signals: &Signals) -> Self {
        Self {
            color: !(signals.no_color_flag || signals.no_color_env || signals.dumb),
            progress_bars: signals.stderr_is_terminal && !signals.quiet && !signals.dumb,
        }
    }
}

struct Signals {
    no_color_flag: bool,
    no_color_env: bool,
    dumb: bool,
    stderr_is_terminal: bool,
    quiet: bool,
}

/// Directive used when `-q`/`-v` are given, or as the `RUST_LOG` fallback.
pub(crate) fn cli_log_directive(verbose: u8, quiet: bool) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    }
}

/// Installs the stderr subscriber. Explicit flags override `RUST_LOG`.
pub(crate) fn init_tracing(cli: &Cli, profile: TerminalProfile) {
    let directive = cli_log_directive(cli.verbose, cli.quiet);
    let flags_given = cli.quiet || cli.verbose > 0;
    let filter = if flags_given {
        EnvFilter::new(directive)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive))
    };
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_ansi(profile.color)
        .with_target(false)
        .with_env_filter(filter)
        .try_init();
}
