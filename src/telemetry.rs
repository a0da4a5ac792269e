//! Tracing setup for the CLI and embedding applications.

use tracing_subscriber::EnvFilter;

/// Stdout log rendering.
#[derive(Debug, Clone, Copy, Default)]
pub enum LogFormat {
    Pretty,
    #[default]
    Compact,
    Json,
}

/// Install the global subscriber.
///
/// The default level follows `verbosity`; the `IPFSD_LOG` env var takes
/// precedence with full filter syntax.
pub fn init(verbosity: u8, format: LogFormat) {
    let filter = EnvFilter::builder()
        .with_default_directive(level_from_verbosity(verbosity).into())
        .with_env_var("IPFSD_LOG")
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    match format {
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn level_from_verbosity(verbosity: u8) -> tracing::metadata::LevelFilter {
    match verbosity {
        0 => tracing::metadata::LevelFilter::ERROR,
        1 => tracing::metadata::LevelFilter::INFO,
        _ => tracing::metadata::LevelFilter::DEBUG,
    }
}
