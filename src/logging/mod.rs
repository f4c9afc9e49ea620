use crate::cli::TracingFormat;
use crate::config::Config;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt::format::JsonFields};

/// Default filter directives for the given base level.
///
/// The HTTP transaction logger is noisy and stays at `warn` unless debug mode
/// is on, in which case every request-service call is traced.
pub fn default_directives(base_level: &str, debug_mode: bool) -> String {
    if debug_mode {
        "warn,plexboxd=debug,plexboxd::ombi::middleware=debug".to_owned()
    } else {
        format!("warn,plexboxd={base_level},plexboxd::ombi::middleware=warn")
    }
}

/// Configure and initialize logging for the application.
pub fn setup_logging(config: &Config, tracing_format: TracingFormat, debug_mode: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.log_level, debug_mode)));

    match tracing_format {
        TracingFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(true)
                        .with_writer(std::io::stderr)
                        .compact(),
                )
                .init();
        }
        TracingFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(true)
                        .with_writer(std::io::stderr)
                        .json()
                        .fmt_fields(JsonFields::new()),
                )
                .init();
        }
    }
}
