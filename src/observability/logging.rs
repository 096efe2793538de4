//! Structured logging.
//!
//! `RUST_LOG` wins when set. Otherwise the configured level applies to this
//! crate, and the `-d` flag raises it to `debug` for this crate and `tower_http`.
//! With `-d`, backend dumps are always enabled on their own target, whatever
//! `RUST_LOG` says about the rest.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Target of the `-d` backend response dumps.
pub const BACKEND_DUMP_TARGET: &str = "token_proxy::backend_dump";

/// Default filter directives for a log level and debug flag.
pub fn default_directives(log_level: &str, debug: bool) -> String {
    if debug {
        "token_proxy=debug,tower_http=debug".to_string()
    } else {
        format!("token_proxy={},tower_http=info", log_level)
    }
}

/// Effective filter directives given the `RUST_LOG` value, if any.
pub fn filter_directives(rust_log: Option<&str>, log_level: &str, debug: bool) -> String {
    let mut directives = match rust_log.map(str::trim) {
        Some(env) if !env.is_empty() => env.to_string(),
        _ => default_directives(log_level, debug),
    };
    if debug {
        directives.push_str(&format!(",{}=info", BACKEND_DUMP_TARGET));
    }
    directives
}

/// Install the global subscriber. Logs go to stderr.
pub fn init_logging(log_level: &str, debug: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directives = filter_directives(rust_log.as_deref(), log_level, debug);

    // A malformed RUST_LOG falls back to the configured defaults.
    let filter = EnvFilter::try_new(&directives).unwrap_or_else(|e| {
        eprintln!("Ignoring invalid {}: {}", EnvFilter::DEFAULT_ENV, e);
        EnvFilter::new(filter_directives(None, log_level, debug))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_flag_overrides_level() {
        assert_eq!(default_directives("warn", false), "token_proxy=warn,tower_http=info");
        assert_eq!(default_directives("warn", true), "token_proxy=debug,tower_http=debug");
    }

    #[test]
    fn rust_log_takes_precedence() {
        assert_eq!(filter_directives(Some("warn"), "debug", false), "warn");
        assert_eq!(
            filter_directives(Some("  "), "warn", false),
            "token_proxy=warn,tower_http=info"
        );
    }

    #[test]
    fn debug_flag_keeps_backend_dump_under_quiet_rust_log() {
        assert_eq!(
            filter_directives(Some("warn"), "info", true),
            "warn,token_proxy::backend_dump=info"
        );
        assert_eq!(
            filter_directives(None, "info", true),
            "token_proxy=debug,tower_http=debug,token_proxy::backend_dump=info"
        );
    }

    #[test]
    fn directives_parse() {
        assert!(EnvFilter::try_new(default_directives("info", false)).is_ok());
        assert!(EnvFilter::try_new(filter_directives(Some("warn"), "info", true)).is_ok());
    }
}
