use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, filter::Targets, fmt, prelude::*};

const APP_TARGET: &str = "subtrack";

/// Warnings stay on without `--verbose` so rate fallbacks reach the user.
fn app_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    }
}

/// Installs the global subscriber on stderr. `RUST_LOG` overrides the level.
pub fn init_logging(verbose: bool) {
    let level = app_level(verbose);
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .pretty()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(Targets::new().with_target(APP_TARGET, level))
        .with(env_filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_level() {
        assert_eq!(app_level(true), LevelFilter::DEBUG);
        assert_eq!(app_level(false), LevelFilter::WARN);
    }
}
